//! Fixed-interval scheduler for the detection jobs

use crate::error::{DetectorError, Result};
use crate::jobs::context::JobContext;
use crate::jobs::handlers::run_tick;
use crate::jobs::types::DetectionJob;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// A job and the interval it runs on.
#[derive(Clone)]
pub struct ScheduledJob {
    pub job: Arc<dyn DetectionJob>,
    pub interval: Duration,
}

impl ScheduledJob {
    pub fn new(job: Arc<dyn DetectionJob>, interval: Duration) -> Self {
        Self { job, interval }
    }

    pub fn name(&self) -> &str {
        self.job.name()
    }
}

/// Idle/Running flag for one job.
#[derive(Debug, Default)]
pub struct JobState {
    running: AtomicBool,
}

impl JobState {
    /// Moves Idle -> Running. `None` if a run is already in progress.
    pub fn try_begin(self: &Arc<Self>) -> Option<RunGuard> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunGuard {
                state: Arc::clone(self),
            })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// Returns the job to Idle when dropped, including when the run is aborted.
#[derive(Debug)]
pub struct RunGuard {
    state: Arc<JobState>,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.state.running.store(false, Ordering::Release);
    }
}

/// Drops dedup keys for bars older than `retention`. Returns how many were removed.
pub fn compact_alerts(ctx: &JobContext, retention: chrono::Duration) -> usize {
    let cutoff = Utc::now() - retention;
    let removed = ctx.alert_store.compact(cutoff);
    if let Some(ref metrics) = ctx.metrics {
        metrics.alert_store_keys.set(ctx.alert_store.len() as i64);
    }
    debug!(
        removed = removed,
        remaining = ctx.alert_store.len(),
        cutoff = %cutoff,
        "JobScheduler: compacted alert store, removed {} keys",
        removed
    );
    removed
}

/// Logs the metrics text exposition and returns it. `None` when the context
/// carries no metrics or the export fails.
pub fn log_metrics(ctx: &JobContext) -> Option<String> {
    let metrics = ctx.metrics.as_ref()?;
    match metrics.export() {
        Ok(exposition) => {
            info!(metrics = %exposition, "JobScheduler: metrics snapshot");
            Some(exposition)
        }
        Err(e) => {
            warn!(error = %e, "JobScheduler: failed to export metrics");
            None
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Compaction {
    interval: Duration,
    retention: chrono::Duration,
}

/// Runs every job on its own timer. Ticks of the same job never overlap: a
/// tick that fires while the previous run is still in progress is skipped.
pub struct JobScheduler {
    jobs: Vec<ScheduledJob>,
    context: Arc<JobContext>,
    compaction: Option<Compaction>,
    handles: Arc<RwLock<Vec<JoinHandle<()>>>>,
}

impl JobScheduler {
    pub fn new(jobs: Vec<ScheduledJob>, context: Arc<JobContext>) -> Result<Self> {
        if jobs.is_empty() {
            return Err(DetectorError::configuration("no detection jobs enabled"));
        }
        if let Some(job) = jobs.iter().find(|j| j.interval.is_zero()) {
            return Err(DetectorError::configuration(format!(
                "job '{}' has a zero interval",
                job.name()
            )));
        }

        for job in &jobs {
            info!(
                job = %job.name(),
                interval_secs = job.interval.as_secs(),
                "JobScheduler: {} every {}s",
                job.name(),
                job.interval.as_secs()
            );
        }

        Ok(Self {
            jobs,
            context,
            compaction: None,
            handles: Arc::new(RwLock::new(Vec::new())),
        })
    }

    /// Compacts the alert store every `interval`, dropping keys older than
    /// `retention`, and logs a metrics snapshot on the same tick.
    pub fn with_compaction(mut self, interval: Duration, retention: chrono::Duration) -> Self {
        self.compaction = Some(Compaction {
            interval,
            retention,
        });
        self
    }

    pub fn jobs(&self) -> &[ScheduledJob] {
        &self.jobs
    }

    /// Shortest job interval, used as the scheduler cycle.
    pub fn cycle(&self) -> Option<Duration> {
        self.jobs.iter().map(|j| j.interval).min()
    }

    /// Start every job loop. The first tick of each job fires immediately.
    pub async fn start(&self) -> Result<()> {
        let mut handles = self.handles.write().await;
        if !handles.is_empty() {
            return Err(DetectorError::configuration("scheduler already started"));
        }

        for scheduled in &self.jobs {
            let scheduled = scheduled.clone();
            let context = self.context.clone();
            handles.push(tokio::spawn(job_loop(scheduled, context)));
        }

        if let Some(compaction) = self.compaction {
            if !compaction.interval.is_zero() {
                let context = self.context.clone();
                handles.push(tokio::spawn(compaction_loop(context, compaction)));
            }
        }

        info!(
            jobs = self.jobs.len(),
            "JobScheduler: started {} jobs",
            self.jobs.len()
        );
        Ok(())
    }

    /// Stop every loop. In-flight ticks are abandoned; alerts already
    /// accepted stay marked in the store.
    pub async fn stop(&self) {
        let mut handles = self.handles.write().await;
        if handles.is_empty() {
            return;
        }
        for handle in handles.drain(..) {
            handle.abort();
        }
        info!("JobScheduler: stopped");
    }

    pub async fn is_running(&self) -> bool {
        let handles = self.handles.read().await;
        !handles.is_empty()
    }
}

async fn job_loop(scheduled: ScheduledJob, context: Arc<JobContext>) {
    let name = scheduled.name().to_string();
    let state = Arc::new(JobState::default());
    let mut ticker = tokio::time::interval(scheduled.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // Dropping the set on abort cancels any in-flight tick.
    let mut in_flight = JoinSet::new();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let Some(guard) = state.try_begin() else {
                    warn!(
                        job = %name,
                        "{}: previous run still in progress, skipping tick",
                        name
                    );
                    if let Some(ref metrics) = context.metrics {
                        metrics
                            .overlapping_ticks_skipped_total
                            .with_label_values(&[name.as_str()])
                            .inc();
                    }
                    continue;
                };
                let job = scheduled.job.clone();
                let context = context.clone();
                in_flight.spawn(async move {
                    let _guard = guard;
                    run_tick(job.as_ref(), &context).await;
                });
            }
            Some(result) = in_flight.join_next(), if !in_flight.is_empty() => {
                if let Err(e) = result {
                    if e.is_panic() {
                        error!(job = %name, error = %e, "{}: tick panicked", name);
                    }
                }
            }
        }
    }
}

async fn compaction_loop(context: Arc<JobContext>, compaction: Compaction) {
    let mut ticker = tokio::time::interval(compaction.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick completes immediately; nothing to compact at startup.
    ticker.tick().await;
    loop {
        ticker.tick().await;
        compact_alerts(&context, compaction.retention);
        log_metrics(&context);
    }
}
