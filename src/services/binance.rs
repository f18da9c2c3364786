//! Binance spot REST candle provider

use crate::error::{DetectorError, Result};
use crate::models::indicators::Candle;
use crate::models::timeframe::Timeframe;
use crate::services::market_data::MarketDataProvider;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.binance.com";
const KLINES_PATH: &str = "/api/v3/klines";
/// Binance rejects larger `limit` values.
pub const MAX_LIMIT: usize = 1000;

pub struct BinanceCandleProvider {
    base_url: String,
    client: Client,
}

impl BinanceCandleProvider {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| DetectorError::configuration(format!("http client: {}", e)))?;
        Ok(Self::with_client(base_url, client))
    }

    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch_klines(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>> {
        let fetch_error = |message: String| DetectorError::UpstreamFetch {
            symbol: symbol.to_string(),
            timeframe,
            message,
        };

        let url = format!("{}{}", self.base_url, KLINES_PATH);
        let limit = limit.clamp(1, MAX_LIMIT).to_string();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("symbol", symbol),
                ("interval", timeframe.label()),
                ("limit", limit.as_str()),
            ])
            .send()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(fetch_error(format!("HTTP {}: {}", status, body)));
        }

        let rows: Vec<Vec<Value>> = response
            .json()
            .await
            .map_err(|e| fetch_error(format!("malformed klines payload: {}", e)))?;

        let now = Utc::now();
        let candles = rows
            .iter()
            .map(|row| parse_kline(row, now))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(fetch_error)?;

        debug!(
            symbol = %symbol,
            timeframe = %timeframe,
            count = candles.len(),
            "BinanceCandleProvider: fetched {} candles for {} {}",
            candles.len(),
            symbol,
            timeframe
        );
        Ok(candles)
    }
}

#[async_trait]
impl MarketDataProvider for BinanceCandleProvider {
    async fn get_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>> {
        let (native, factor) = native_interval(timeframe);
        if factor == 1 {
            return self.fetch_klines(symbol, timeframe, limit).await;
        }
        // One extra bucket covers a partial leading group.
        let native_limit = limit.saturating_add(1).saturating_mul(factor);
        let candles = self.fetch_klines(symbol, native, native_limit).await?;
        let mut resampled = resample(&candles, timeframe, factor);
        let start = resampled.len().saturating_sub(limit);
        Ok(resampled.split_off(start))
    }
}

/// Timeframes the klines endpoint does not serve, with the native interval
/// they are aggregated from and the bars per bucket.
fn native_interval(timeframe: Timeframe) -> (Timeframe, usize) {
    match timeframe {
        Timeframe::Hour3 => (Timeframe::Hour1, 3),
        other => (other, 1),
    }
}

/// Groups native bars into `timeframe` buckets aligned to the Unix epoch.
///
/// A bucket is closed once it holds `factor` closed bars. An incomplete
/// bucket is kept only at the end of the series, as the open bar.
pub fn resample(candles: &[Candle], timeframe: Timeframe, factor: usize) -> Vec<Candle> {
    let width = timeframe.seconds();
    let mut groups: Vec<(i64, Vec<&Candle>)> = Vec::new();
    for candle in candles {
        let bucket = candle.timestamp.timestamp().div_euclid(width);
        match groups.last_mut() {
            Some((current, members)) if *current == bucket => members.push(candle),
            _ => groups.push((bucket, vec![candle])),
        }
    }

    let last = groups.len().saturating_sub(1);
    groups
        .iter()
        .enumerate()
        .filter_map(|(i, (bucket, members))| {
            let complete = members.len() == factor;
            if !complete && i != last {
                return None;
            }
            let first = members.first()?;
            let final_bar = members.last()?;
            let timestamp = DateTime::from_timestamp(bucket * width, 0)?;
            Some(Candle {
                timestamp,
                open: first.open,
                high: members.iter().map(|c| c.high).fold(f64::MIN, f64::max),
                low: members.iter().map(|c| c.low).fold(f64::MAX, f64::min),
                close: final_bar.close,
                volume: members.iter().map(|c| c.volume).sum(),
                closed: complete && members.iter().all(|c| c.closed),
            })
        })
        .collect()
}

/// `[open_time, open, high, low, close, volume, close_time, ...]`, prices as strings.
fn parse_kline(row: &[Value], now: DateTime<Utc>) -> std::result::Result<Candle, String> {
    if row.len() < 7 {
        return Err(format!("kline row has {} fields, expected at least 7", row.len()));
    }
    let open_time = millis(&row[0], "open time")?;
    let close_time = millis(&row[6], "close time")?;
    Ok(Candle::new(
        number(&row[1], "open")?,
        number(&row[2], "high")?,
        number(&row[3], "low")?,
        number(&row[4], "close")?,
        number(&row[5], "volume")?,
        open_time,
    )
    .with_closed(close_time < now))
}

fn millis(value: &Value, field: &str) -> std::result::Result<DateTime<Utc>, String> {
    value
        .as_i64()
        .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
        .ok_or_else(|| format!("invalid {}: {}", field, value))
}

fn number(value: &Value, field: &str) -> std::result::Result<f64, String> {
    let parsed = match value {
        Value::String(s) => s.parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    };
    parsed
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("invalid {}: {}", field, value))
}
