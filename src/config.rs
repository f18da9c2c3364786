//! Environment-driven configuration

use crate::error::{DetectorError, Result};
use crate::indicators::warmup_length;
use crate::models::indicators::IndicatorParams;
use crate::models::timeframe::Timeframe;
use crate::services::binance::{DEFAULT_BASE_URL, MAX_LIMIT};
use crate::services::instruments::normalize_symbols;
use crate::signals::thresholds::SignalThresholds;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_SYMBOLS: &[&str] = &["BTCUSDT", "ETHUSDT", "BNBUSDT", "ADAUSDT", "DOGEUSDT"];

/// `ENVIRONMENT`, defaulting to `sandbox`.
pub fn get_environment() -> String {
    env::var("ENVIRONMENT").unwrap_or_else(|_| "sandbox".to_string())
}

/// Job intervals in minutes; zero disables a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobIntervals {
    pub price_check: u64,
    pub vmc_cipher: u64,
    pub buy_opportunity: u64,
    pub short_term_downtrend: u64,
    pub vmc_opportunities: u64,
    pub short_term_uptrend: u64,
}

impl Default for JobIntervals {
    fn default() -> Self {
        Self {
            price_check: 5,
            vmc_cipher: 15,
            buy_opportunity: 30,
            short_term_downtrend: 12,
            vmc_opportunities: 60,
            short_term_uptrend: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: String,
    pub symbols: Vec<String>,
    pub watchlist_file: Option<PathBuf>,
    pub lock_file: PathBuf,
    pub candle_limit: usize,
    pub intervals: JobIntervals,
    pub vmc_timeframes: Vec<Timeframe>,
    pub binance_base_url: String,
    pub alert_webhook_url: Option<String>,
    pub alert_destination: String,
    pub params: IndicatorParams,
    pub thresholds: SignalThresholds,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: "sandbox".to_string(),
            symbols: normalize_symbols(DEFAULT_SYMBOLS.iter()),
            watchlist_file: None,
            lock_file: PathBuf::from("cipherwatch.lock"),
            candle_limit: 200,
            intervals: JobIntervals::default(),
            vmc_timeframes: vec![Timeframe::Hour1, Timeframe::Hour4],
            binance_base_url: DEFAULT_BASE_URL.to_string(),
            alert_webhook_url: None,
            alert_destination: "default".to_string(),
            params: IndicatorParams::default(),
            thresholds: SignalThresholds::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Blank values
    /// count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let symbols = match get("TRACKED_SYMBOLS") {
            Some(raw) => normalize_symbols(raw.split(',')),
            None => defaults.symbols,
        };
        if symbols.is_empty() {
            return Err(DetectorError::configuration("TRACKED_SYMBOLS is empty"));
        }

        let vmc_timeframes = match get("VMC_TIMEFRAMES") {
            Some(raw) => parse_timeframes(&raw)?,
            None => defaults.vmc_timeframes,
        };

        let intervals = JobIntervals {
            price_check: parse_or(
                &get,
                "PRICE_CHECK_INTERVAL_MINUTES",
                defaults.intervals.price_check,
            )?,
            vmc_cipher: parse_or(
                &get,
                "VMC_CIPHER_INTERVAL_MINUTES",
                defaults.intervals.vmc_cipher,
            )?,
            buy_opportunity: parse_or(
                &get,
                "BUY_OPPORTUNITY_INTERVAL_MINUTES",
                defaults.intervals.buy_opportunity,
            )?,
            short_term_downtrend: parse_or(
                &get,
                "DOWNTREND_INTERVAL_MINUTES",
                defaults.intervals.short_term_downtrend,
            )?,
            vmc_opportunities: parse_or(
                &get,
                "VMC_OPPORTUNITIES_INTERVAL_MINUTES",
                defaults.intervals.vmc_opportunities,
            )?,
            short_term_uptrend: parse_or(
                &get,
                "UPTREND_INTERVAL_MINUTES",
                defaults.intervals.short_term_uptrend,
            )?,
        };

        let config = Self {
            environment: get("ENVIRONMENT").unwrap_or(defaults.environment),
            symbols,
            watchlist_file: get("WATCHLIST_FILE").map(PathBuf::from),
            lock_file: get("LOCK_FILE").map(PathBuf::from).unwrap_or(defaults.lock_file),
            candle_limit: parse_or(&get, "CANDLE_LIMIT", defaults.candle_limit)?,
            intervals,
            vmc_timeframes,
            binance_base_url: get("BINANCE_BASE_URL").unwrap_or(defaults.binance_base_url),
            alert_webhook_url: get("ALERT_WEBHOOK_URL"),
            alert_destination: get("ALERT_DESTINATION").unwrap_or(defaults.alert_destination),
            params: defaults.params,
            thresholds: defaults.thresholds,
        };
        config.validate()?;
        Ok(config)
    }

    /// Each fetch must leave enough closed bars to evaluate one bar past the
    /// warm-up, and stay within what the exchange serves in one request.
    pub fn validate(&self) -> Result<()> {
        let required = warmup_length(&self.params) + 2;
        if self.candle_limit < required {
            return Err(DetectorError::configuration(format!(
                "CANDLE_LIMIT must be at least {} (got {})",
                required, self.candle_limit
            )));
        }
        if self.candle_limit > MAX_LIMIT {
            return Err(DetectorError::configuration(format!(
                "CANDLE_LIMIT must be at most {} (got {})",
                MAX_LIMIT, self.candle_limit
            )));
        }
        if self.vmc_timeframes.is_empty() {
            return Err(DetectorError::configuration("VMC_TIMEFRAMES is empty"));
        }
        Ok(())
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(value) => value.trim().parse().map_err(|_| {
            DetectorError::configuration(format!("{} has an invalid value '{}'", key, value))
        }),
        None => Ok(default),
    }
}

fn parse_timeframes(raw: &str) -> Result<Vec<Timeframe>> {
    let mut timeframes = Vec::new();
    for label in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let timeframe = label
            .parse::<Timeframe>()
            .map_err(|e| DetectorError::configuration(format!("VMC_TIMEFRAMES: {}", e)))?;
        if !timeframes.contains(&timeframe) {
            timeframes.push(timeframe);
        }
    }
    Ok(timeframes)
}
