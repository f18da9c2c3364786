//! In-memory collaborators and candle builders for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use cipherwatch::alerts::AlertStore;
use cipherwatch::error::{DetectorError, Result};
use cipherwatch::indicators::compute_indicators;
use cipherwatch::jobs::context::JobContext;
use cipherwatch::metrics::Metrics;
use cipherwatch::models::indicators::{Candle, IndicatorParams};
use cipherwatch::models::signal::{AlertEvent, SignalKind};
use cipherwatch::models::timeframe::Timeframe;
use cipherwatch::services::instruments::StaticInstruments;
use cipherwatch::services::market_data::MarketDataProvider;
use cipherwatch::services::notifier::NotificationSink;
use cipherwatch::signals::{SignalEvaluator, SignalSet};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub fn start_time() -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 0).unwrap()
}

/// Closed candles spaced by `timeframe`, with a 1.0 range around each close.
pub fn candles_from_closes(closes: &[f64], timeframe: Timeframe) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Candle::new(
                open,
                close.max(open) + 0.5,
                close.min(open) - 0.5,
                close,
                1_000.0,
                start_time() + timeframe.duration() * i as i32,
            )
            .with_closed(true)
        })
        .collect()
}

pub fn sine_closes(count: usize, period: f64, amplitude: f64) -> Vec<f64> {
    (0..count)
        .map(|i| 100.0 + amplitude * (2.0 * std::f64::consts::PI * i as f64 / period).sin())
        .collect()
}

/// Appends an in-progress bar that must never be evaluated.
pub fn with_open_bar(mut candles: Vec<Candle>, timeframe: Timeframe) -> Vec<Candle> {
    let last = candles.last().cloned().expect("non-empty series");
    let open_bar = Candle::new(
        last.close,
        last.close * 1.5,
        last.close * 0.5,
        last.close * 0.5,
        10.0,
        last.timestamp + timeframe.duration(),
    );
    candles.push(open_bar);
    candles
}

/// A series whose latest closed bar carries `kind`, plus one open bar.
/// Returns the candles and the signals on that bar.
pub fn series_ending_with(kind: SignalKind, timeframe: Timeframe) -> (Vec<Candle>, SignalSet) {
    let candles = candles_from_closes(&sine_closes(199, 50.0, 10.0), timeframe);
    let series = compute_indicators(&candles, &IndicatorParams::default()).unwrap();
    let evaluator = SignalEvaluator::default();
    let index = (0..series.len())
        .rev()
        .find(|&i| evaluator.evaluate(&series, i).contains(&kind))
        .expect("sine series produces the signal");
    let signals = evaluator.evaluate(&series, index);
    let closed = candles[..=index].to_vec();
    (with_open_bar(closed, timeframe), signals)
}

/// Steadily falling closes: RSI pinned at 0.
pub fn falling_series(count: usize, timeframe: Timeframe) -> Vec<Candle> {
    let closes: Vec<f64> = (0..count).map(|i| 500.0 - i as f64).collect();
    with_open_bar(candles_from_closes(&closes, timeframe), timeframe)
}

#[derive(Default)]
pub struct FakeMarketData {
    candles: HashMap<(String, Timeframe), Vec<Candle>>,
    failing: HashSet<String>,
    delay: Option<std::time::Duration>,
    pub calls: AtomicUsize,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl FakeMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(mut self, symbol: &str, timeframe: Timeframe, candles: Vec<Candle>) -> Self {
        self.candles.insert((symbol.to_string(), timeframe), candles);
        self
    }

    pub fn failing_for(mut self, symbol: &str) -> Self {
        self.failing.insert(symbol.to_string());
        self
    }

    pub fn with_delay(mut self, delay: std::time::Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl MarketDataProvider for FakeMarketData {
    async fn get_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(symbol) {
            return Err(DetectorError::UpstreamFetch {
                symbol: symbol.to_string(),
                timeframe,
                message: "connection reset".to_string(),
            });
        }
        let candles = self
            .candles
            .get(&(symbol.to_string(), timeframe))
            .cloned()
            .ok_or_else(|| DetectorError::UpstreamFetch {
                symbol: symbol.to_string(),
                timeframe,
                message: "unknown symbol".to_string(),
            })?;
        let start = candles.len().saturating_sub(limit);
        Ok(candles[start..].to_vec())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(String, AlertEvent)>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn events(&self) -> Vec<AlertEvent> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(_, event)| event.clone())
            .collect()
    }
}

#[async_trait]
impl NotificationSink for RecordingNotifier {
    async fn send(&self, destination: &str, alert: &AlertEvent) -> Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((destination.to_string(), alert.clone()));
        if self.fail {
            return Err(DetectorError::NotificationDelivery {
                destination: destination.to_string(),
                message: "chat API unavailable".to_string(),
            });
        }
        Ok(())
    }
}

pub struct TestHarness {
    pub market: Arc<FakeMarketData>,
    pub notifier: Arc<RecordingNotifier>,
    pub store: Arc<AlertStore>,
    pub metrics: Arc<Metrics>,
    pub context: Arc<JobContext>,
}

impl TestHarness {
    pub fn new(market: FakeMarketData, symbols: &[&str], notifier: RecordingNotifier) -> Self {
        let market = Arc::new(market);
        let notifier = Arc::new(notifier);
        let store = Arc::new(AlertStore::new());
        let metrics = Arc::new(Metrics::new().expect("Should create metrics"));
        let context = Arc::new(JobContext::new(
            market.clone(),
            Arc::new(StaticInstruments::new(symbols.iter())),
            notifier.clone(),
            store.clone(),
            Some(metrics.clone()),
        ));
        Self {
            market,
            notifier,
            store,
            metrics,
            context,
        }
    }
}

pub fn hours(n: i64) -> Duration {
    Duration::hours(n)
}
