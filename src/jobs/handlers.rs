//! Job tick execution: instrument sweep, dedup and delivery

use crate::error::DetectorError;
use crate::jobs::context::JobContext;
use crate::jobs::types::{Detection, DetectionJob, TickReport};
use chrono::Utc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Runs one tick of `job` over the current instrument set.
///
/// Instruments are processed in the order the source returns them. A failure
/// on one instrument is logged and skipped; it never aborts the sweep.
pub async fn run_tick(job: &dyn DetectionJob, ctx: &JobContext) -> TickReport {
    let start = Instant::now();
    let name = job.name();
    let mut report = TickReport::new(name);

    let instruments = match ctx.instruments.list_tracked_instruments().await {
        Ok(instruments) => instruments,
        Err(e) => {
            error!(
                job = %name,
                error = %e,
                "{}: failed to list tracked instruments, tick skipped",
                name
            );
            return report;
        }
    };
    report.instruments = instruments.len();

    debug!(
        job = %name,
        instruments = instruments.len(),
        "{}: tick started for {} instruments",
        name,
        instruments.len()
    );

    for symbol in &instruments {
        match job.detect(ctx, symbol).await {
            Ok(detections) => {
                report.evaluated += 1;
                if let Some(ref metrics) = ctx.metrics {
                    metrics
                        .instruments_evaluated_total
                        .with_label_values(&[name])
                        .inc();
                }
                publish(name, ctx, symbol, detections, &mut report).await;
            }
            Err(e) => {
                report.skipped += 1;
                log_skip(name, symbol, &e);
                if let Some(ref metrics) = ctx.metrics {
                    metrics
                        .instruments_skipped_total
                        .with_label_values(&[name, e.reason()])
                        .inc();
                }
            }
        }
    }

    let elapsed = start.elapsed();
    if let Some(ref metrics) = ctx.metrics {
        metrics
            .job_tick_duration_seconds
            .with_label_values(&[name])
            .observe(elapsed.as_secs_f64());
        metrics.alert_store_keys.set(ctx.alert_store.len() as i64);
    }

    info!(
        job = %name,
        instruments = report.instruments,
        evaluated = report.evaluated,
        skipped = report.skipped,
        emitted = report.emitted,
        suppressed = report.suppressed,
        delivery_failures = report.delivery_failures,
        elapsed_ms = elapsed.as_millis() as u64,
        "{}: tick finished ({} evaluated, {} skipped, {} alerts)",
        name,
        report.evaluated,
        report.skipped,
        report.emitted
    );
    report
}

fn log_skip(job: &str, symbol: &str, err: &DetectorError) {
    match err {
        DetectorError::InsufficientData { .. } | DetectorError::UpstreamFetch { .. } => {
            warn!(
                job = %job,
                symbol = %symbol,
                reason = err.reason(),
                error = %err,
                "{}: skipping {}: {}",
                job,
                symbol,
                err
            );
        }
        _ => {
            error!(
                job = %job,
                symbol = %symbol,
                reason = err.reason(),
                error = %err,
                "{}: skipping {}: {}",
                job,
                symbol,
                err
            );
        }
    }
}

/// Dedups `detections` and hands accepted ones to the notification sink.
///
/// Delivery is at most once: the dedup mark is consumed before sending, so a
/// failed delivery drops the alert for that bar.
pub async fn publish(
    job: &str,
    ctx: &JobContext,
    symbol: &str,
    detections: Vec<Detection>,
    report: &mut TickReport,
) {
    for detection in detections {
        let key = detection.key(symbol);
        let kind = detection.kind.as_str();

        if !ctx.alert_store.should_emit(&key) {
            report.suppressed += 1;
            debug!(
                job = %job,
                symbol = %symbol,
                kind = kind,
                timeframe = %key.timeframe,
                bar = %key.bar_timestamp,
                "{}: {} {} already alerted for bar {}",
                job,
                symbol,
                kind,
                key.bar_timestamp
            );
            if let Some(ref metrics) = ctx.metrics {
                metrics
                    .alerts_suppressed_total
                    .with_label_values(&[job, kind])
                    .inc();
            }
            continue;
        }

        report.emitted += 1;
        if let Some(ref metrics) = ctx.metrics {
            metrics
                .alerts_emitted_total
                .with_label_values(&[job, kind])
                .inc();
        }

        let event = detection.into_event(symbol, Utc::now());
        info!(
            job = %job,
            symbol = %symbol,
            kind = kind,
            timeframe = %key.timeframe,
            bar = %event.bar_timestamp,
            "{}: new alert {} {} on {} bar {}",
            job,
            symbol,
            kind,
            key.timeframe,
            event.bar_timestamp
        );

        if let Err(e) = ctx
            .notifier
            .send(&ctx.settings.destination, &event)
            .await
        {
            report.delivery_failures += 1;
            error!(
                job = %job,
                symbol = %symbol,
                kind = kind,
                destination = %ctx.settings.destination,
                error = %e,
                "{}: alert {} {} dropped, not retried: {}",
                job,
                symbol,
                kind,
                e
            );
            if let Some(ref metrics) = ctx.metrics {
                metrics
                    .alert_delivery_failures_total
                    .with_label_values(&[job])
                    .inc();
            }
        }
    }
}
