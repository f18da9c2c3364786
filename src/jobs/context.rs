//! Job context for dependency injection

use crate::alerts::AlertStore;
use crate::config::AppConfig;
use crate::metrics::Metrics;
use crate::models::indicators::IndicatorParams;
use crate::services::instruments::InstrumentSource;
use crate::services::market_data::MarketDataProvider;
use crate::services::notifier::NotificationSink;
use crate::signals::thresholds::SignalThresholds;
use std::sync::Arc;

/// Evaluation knobs shared by every job.
#[derive(Debug, Clone)]
pub struct DetectionSettings {
    pub params: IndicatorParams,
    pub thresholds: SignalThresholds,
    /// Bars requested per fetch, including the possibly unclosed last one.
    pub candle_limit: usize,
    /// Opaque destination handed to the notification sink.
    pub destination: String,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            params: IndicatorParams::default(),
            thresholds: SignalThresholds::default(),
            candle_limit: 200,
            destination: "default".to_string(),
        }
    }
}

impl DetectionSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            params: config.params.clone(),
            thresholds: config.thresholds.clone(),
            candle_limit: config.candle_limit,
            destination: config.alert_destination.clone(),
        }
    }
}

/// Everything a job tick reads from or writes to.
///
/// The alert store is the only shared mutable state; the other collaborators
/// are read-only from the job's point of view.
pub struct JobContext {
    pub data_provider: Arc<dyn MarketDataProvider + Send + Sync>,
    pub instruments: Arc<dyn InstrumentSource + Send + Sync>,
    pub notifier: Arc<dyn NotificationSink + Send + Sync>,
    pub alert_store: Arc<AlertStore>,
    pub metrics: Option<Arc<Metrics>>,
    pub settings: DetectionSettings,
}

impl JobContext {
    pub fn new(
        data_provider: Arc<dyn MarketDataProvider + Send + Sync>,
        instruments: Arc<dyn InstrumentSource + Send + Sync>,
        notifier: Arc<dyn NotificationSink + Send + Sync>,
        alert_store: Arc<AlertStore>,
        metrics: Option<Arc<Metrics>>,
    ) -> Self {
        Self {
            data_provider,
            instruments,
            notifier,
            alert_store,
            metrics,
            settings: DetectionSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: DetectionSettings) -> Self {
        self.settings = settings;
        self
    }
}
