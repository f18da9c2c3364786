use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV bar. `timestamp` is the bar open time and identifies the bar
/// within its series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    /// Set by the price provider once the bar's interval has elapsed.
    #[serde(default)]
    pub closed: bool,
}

impl Candle {
    pub fn new(
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
            closed: false,
        }
    }

    pub fn with_closed(mut self, closed: bool) -> Self {
        self.closed = closed;
        self
    }

    /// hlc3
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }
}

/// Drops the trailing bar unless the provider marked it closed.
pub fn closed_bars(candles: &[Candle]) -> &[Candle] {
    match candles.last() {
        Some(last) if !last.closed => &candles[..candles.len() - 1],
        _ => candles,
    }
}

/// Lookback lengths for every indicator in an [`IndicatorFrame`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorParams {
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub rsi_period: usize,
    pub wt_channel_len: usize,
    pub wt_average_len: usize,
    pub wt_ma_len: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            ema_fast: 9,
            ema_slow: 21,
            rsi_period: 14,
            wt_channel_len: 9,
            wt_average_len: 12,
            wt_ma_len: 3,
        }
    }
}

/// Indicator values for one bar, aligned with the source candle.
///
/// Values are `None` until the indicator's own lookback is satisfied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorFrame {
    pub timestamp: DateTime<Utc>,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ema_fast: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ema_slow: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wt1: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wt2: Option<f64>,
}

impl IndicatorFrame {
    pub fn new(candle: &Candle) -> Self {
        Self {
            timestamp: candle.timestamp,
            high: candle.high,
            low: candle.low,
            close: candle.close,
            ema_fast: None,
            ema_slow: None,
            rsi: None,
            wt1: None,
            wt2: None,
        }
    }

    /// `(wt1, wt2)` once both WaveTrend lines are defined.
    pub fn wavetrend(&self) -> Option<(f64, f64)> {
        Some((self.wt1?, self.wt2?))
    }
}

/// Indicator frames for a whole candle series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSeries {
    pub frames: Vec<IndicatorFrame>,
    /// Index of the first bar at which every indicator is defined.
    pub warmup: usize,
}

impl IndicatorSeries {
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn latest_index(&self) -> Option<usize> {
        self.frames.len().checked_sub(1)
    }

    pub fn latest(&self) -> Option<&IndicatorFrame> {
        self.frames.last()
    }
}
