//! Cipherwatch: periodic WaveTrend/RSI signal detection with deduplicated alerts.

pub mod alerts;
pub mod common;
pub mod config;
pub mod core;
pub mod error;
pub mod indicators;
pub mod jobs;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod signals;

pub use error::{DetectorError, Result};
