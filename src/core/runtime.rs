//! Wiring from configuration to scheduled jobs

use crate::config::AppConfig;
use crate::core::scheduler::{JobScheduler, ScheduledJob};
use crate::error::Result;
use crate::jobs::context::JobContext;
use crate::jobs::sweep::RuleSweep;
use crate::jobs::types::DetectionJob;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Every detection sweep, minus any whose interval is zero.
pub fn build_jobs(config: &AppConfig) -> Vec<ScheduledJob> {
    let intervals = &config.intervals;
    let candidates = [
        (RuleSweep::price_check(), intervals.price_check),
        (
            RuleSweep::vmc_cipher(&config.vmc_timeframes),
            intervals.vmc_cipher,
        ),
        (
            RuleSweep::buy_opportunity(&config.thresholds),
            intervals.buy_opportunity,
        ),
        (
            RuleSweep::short_term_downtrend(&config.thresholds),
            intervals.short_term_downtrend,
        ),
        (RuleSweep::vmc_opportunities(), intervals.vmc_opportunities),
        (RuleSweep::short_term_uptrend(), intervals.short_term_uptrend),
    ];

    candidates
        .into_iter()
        .filter_map(|(sweep, minutes)| {
            if minutes == 0 {
                info!(job = %sweep.name(), "{} disabled", sweep.name());
                return None;
            }
            Some(ScheduledJob::new(
                Arc::new(sweep),
                Duration::from_secs(minutes * 60),
            ))
        })
        .collect()
}

/// Age past which no job can still evaluate a bar: the longest
/// `candle_limit` window over every timeframe any job fetches.
pub fn alert_retention(jobs: &[ScheduledJob], candle_limit: usize) -> chrono::Duration {
    let longest = jobs
        .iter()
        .flat_map(|j| j.job.timeframes())
        .map(|tf| tf.seconds())
        .max()
        .unwrap_or(0);
    let bars = i64::try_from(candle_limit).unwrap_or(i64::MAX);
    // chrono durations are bounded by i64 milliseconds.
    chrono::Duration::seconds(longest.saturating_mul(bars).min(i64::MAX / 1_000))
}

/// Scheduler for every enabled job, compacting the alert store once per cycle.
pub fn build_scheduler(config: &AppConfig, context: Arc<JobContext>) -> Result<JobScheduler> {
    let jobs = build_jobs(config);
    let retention = alert_retention(&jobs, config.candle_limit);
    let scheduler = JobScheduler::new(jobs, context)?;
    let cycle = scheduler.cycle().unwrap_or(Duration::from_secs(60));
    Ok(scheduler.with_compaction(cycle, retention))
}
