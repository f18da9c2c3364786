//! Cipherwatch Worker
//!
//! Runs the detection jobs on their fixed intervals until interrupted.
//! At most one worker may run against a given lock file.

use cipherwatch::alerts::AlertStore;
use cipherwatch::config::AppConfig;
use cipherwatch::core::lock::InstanceLock;
use cipherwatch::core::runtime::build_scheduler;
use cipherwatch::error::DetectorError;
use cipherwatch::jobs::context::{DetectionSettings, JobContext};
use cipherwatch::logging;
use cipherwatch::metrics::Metrics;
use cipherwatch::services::binance::BinanceCandleProvider;
use cipherwatch::services::instruments::{InstrumentSource, StaticInstruments, WatchlistInstruments};
use cipherwatch::services::market_data::MarketDataProvider;
use cipherwatch::services::notifier::{LogNotifier, NotificationSink, WebhookNotifier};
use dotenvy::dotenv;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env if present
    dotenv().ok();

    logging::init_logging();

    let config = AppConfig::from_env()?;
    info!("Starting Cipherwatch Worker");
    info!(environment = %config.environment, "Environment");

    // Must happen before any collaborator is built.
    let _lock = match InstanceLock::acquire(&config.lock_file) {
        Ok(lock) => lock,
        Err(e @ DetectorError::DuplicateInstance { .. }) => {
            error!(error = %e, "Refusing to start: {}", e);
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };

    let metrics = Arc::new(Metrics::new()?);

    info!(base_url = %config.binance_base_url, "Using Binance candle provider");
    let data_provider: Arc<dyn MarketDataProvider + Send + Sync> =
        Arc::new(BinanceCandleProvider::new(config.binance_base_url.clone())?);

    let static_instruments = StaticInstruments::new(&config.symbols);
    let instruments: Arc<dyn InstrumentSource + Send + Sync> = match config.watchlist_file {
        Some(ref path) => {
            info!(path = %path.display(), "Tracking watchlists from {}", path.display());
            Arc::new(WatchlistInstruments::new(static_instruments, path.clone()))
        }
        None => Arc::new(static_instruments),
    };
    info!(symbols = ?config.symbols, "Tracked symbols: {}", config.symbols.join(", "));

    let notifier: Arc<dyn NotificationSink + Send + Sync> = match config.alert_webhook_url {
        Some(ref url) => {
            info!("Delivering alerts to webhook");
            Arc::new(WebhookNotifier::new(url.clone())?)
        }
        None => {
            info!("No ALERT_WEBHOOK_URL set, alerts go to the log");
            Arc::new(LogNotifier)
        }
    };

    let job_context = Arc::new(
        JobContext::new(
            data_provider,
            instruments,
            notifier,
            Arc::new(AlertStore::new()),
            Some(metrics.clone()),
        )
        .with_settings(DetectionSettings::from_config(&config)),
    );

    info!("Starting job scheduler...");
    let scheduler = build_scheduler(&config, job_context)?;
    scheduler.start().await?;

    info!("Worker started, waiting for shutdown signal...");
    shutdown_signal().await;

    info!("Shutting down worker...");
    scheduler.stop().await;
    info!("Worker stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
