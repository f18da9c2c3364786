//! Job types for the detection sweeps

use crate::error::Result;
use crate::jobs::context::JobContext;
use crate::models::signal::{AlertEvent, AlertKey, AlertKind, FrameSnapshot};
use crate::models::timeframe::Timeframe;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A rule match on one instrument, before dedup.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub kind: AlertKind,
    /// Timeframe the dedup key is recorded under.
    pub timeframe: Timeframe,
    /// Every timeframe the rule looked at.
    pub timeframes: Vec<Timeframe>,
    pub bar_timestamp: DateTime<Utc>,
    pub snapshot: Vec<FrameSnapshot>,
}

impl Detection {
    pub fn key(&self, symbol: &str) -> AlertKey {
        AlertKey {
            symbol: symbol.to_string(),
            timeframe: self.timeframe,
            kind: self.kind,
            bar_timestamp: self.bar_timestamp,
        }
    }

    pub fn into_event(self, symbol: &str, detected_at: DateTime<Utc>) -> AlertEvent {
        AlertEvent {
            symbol: symbol.to_string(),
            timeframes: self.timeframes,
            kind: self.kind,
            bar_timestamp: self.bar_timestamp,
            snapshot: self.snapshot,
            detected_at,
        }
    }
}

/// A named sweep run by the scheduler on a fixed interval.
#[async_trait]
pub trait DetectionJob: Send + Sync {
    fn name(&self) -> &str;

    /// Timeframes fetched for each instrument.
    fn timeframes(&self) -> Vec<Timeframe>;

    /// Evaluates one instrument. Errors skip only this instrument.
    async fn detect(&self, ctx: &JobContext, symbol: &str) -> Result<Vec<Detection>>;
}

/// Outcome of one job tick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TickReport {
    pub job: String,
    pub instruments: usize,
    pub evaluated: usize,
    pub skipped: usize,
    /// Detections accepted by dedup.
    pub emitted: usize,
    pub suppressed: usize,
    pub delivery_failures: usize,
}

impl TickReport {
    pub fn new(job: impl Into<String>) -> Self {
        Self {
            job: job.into(),
            ..Self::default()
        }
    }
}
