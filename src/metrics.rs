//! Prometheus metrics for the detection jobs

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

pub struct Metrics {
    pub registry: Registry,
    pub instruments_evaluated_total: IntCounterVec,
    pub instruments_skipped_total: IntCounterVec,
    pub alerts_emitted_total: IntCounterVec,
    pub alerts_suppressed_total: IntCounterVec,
    pub alert_delivery_failures_total: IntCounterVec,
    pub overlapping_ticks_skipped_total: IntCounterVec,
    pub job_tick_duration_seconds: HistogramVec,
    pub alert_store_keys: IntGauge,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("cipherwatch".to_string()), None)?;

        let instruments_evaluated_total = IntCounterVec::new(
            Opts::new(
                "instruments_evaluated_total",
                "Instruments fully evaluated by a job tick",
            ),
            &["job"],
        )?;
        let instruments_skipped_total = IntCounterVec::new(
            Opts::new(
                "instruments_skipped_total",
                "Instruments skipped during a job tick",
            ),
            &["job", "reason"],
        )?;
        let alerts_emitted_total = IntCounterVec::new(
            Opts::new("alerts_emitted_total", "Alerts accepted by dedup"),
            &["job", "kind"],
        )?;
        let alerts_suppressed_total = IntCounterVec::new(
            Opts::new(
                "alerts_suppressed_total",
                "Detections suppressed because the alert key was already emitted",
            ),
            &["job", "kind"],
        )?;
        let alert_delivery_failures_total = IntCounterVec::new(
            Opts::new(
                "alert_delivery_failures_total",
                "Accepted alerts the notification sink failed to deliver",
            ),
            &["job"],
        )?;
        let overlapping_ticks_skipped_total = IntCounterVec::new(
            Opts::new(
                "overlapping_ticks_skipped_total",
                "Ticks skipped because the previous run of the job was still in progress",
            ),
            &["job"],
        )?;
        let job_tick_duration_seconds = HistogramVec::new(
            HistogramOpts::new("job_tick_duration_seconds", "Wall time of one job tick")
                .buckets(vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]),
            &["job"],
        )?;
        let alert_store_keys = IntGauge::new("alert_store_keys", "Keys held by the dedup store")?;

        registry.register(Box::new(instruments_evaluated_total.clone()))?;
        registry.register(Box::new(instruments_skipped_total.clone()))?;
        registry.register(Box::new(alerts_emitted_total.clone()))?;
        registry.register(Box::new(alerts_suppressed_total.clone()))?;
        registry.register(Box::new(alert_delivery_failures_total.clone()))?;
        registry.register(Box::new(overlapping_ticks_skipped_total.clone()))?;
        registry.register(Box::new(job_tick_duration_seconds.clone()))?;
        registry.register(Box::new(alert_store_keys.clone()))?;

        Ok(Self {
            registry,
            instruments_evaluated_total,
            instruments_skipped_total,
            alerts_emitted_total,
            alerts_suppressed_total,
            alert_delivery_failures_total,
            overlapping_ticks_skipped_total,
            job_tick_duration_seconds,
            alert_store_keys,
        })
    }

    /// Text exposition of every registered metric.
    pub fn export(&self) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
