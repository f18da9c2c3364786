//! Error types for the detection engine

use crate::indicators::IndicatorError;
use crate::models::timeframe::Timeframe;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DetectorError {
    /// Too few closed candles to cover the indicator warm-up.
    #[error("insufficient data: need {required} candles, got {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("upstream fetch failed for {symbol} {timeframe}: {message}")]
    UpstreamFetch {
        symbol: String,
        timeframe: Timeframe,
        message: String,
    },

    #[error("notification delivery to '{destination}' failed: {message}")]
    NotificationDelivery { destination: String, message: String },

    #[error("another instance is already running (pid {pid}, lock file {})", .path.display())]
    DuplicateInstance { pid: u32, path: PathBuf },

    #[error("lock file {}: {source}", .path.display())]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration error: {message}")]
    Configuration { message: String },
}

impl DetectorError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Short label used for log fields and metric labels.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::InsufficientData { .. } => "insufficient_data",
            Self::UpstreamFetch { .. } => "upstream_fetch",
            Self::NotificationDelivery { .. } => "notification_delivery",
            Self::DuplicateInstance { .. } => "duplicate_instance",
            Self::Lock { .. } => "lock",
            Self::Configuration { .. } => "configuration",
        }
    }
}

impl From<IndicatorError> for DetectorError {
    fn from(err: IndicatorError) -> Self {
        match err {
            IndicatorError::InsufficientData {
                required,
                available,
            } => Self::InsufficientData {
                required,
                available,
            },
            other => Self::configuration(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, DetectorError>;
