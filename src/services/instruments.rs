//! Tracked-instrument sources

use crate::error::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Read at the start of every job tick. Iteration order is the evaluation order.
#[async_trait]
pub trait InstrumentSource {
    async fn list_tracked_instruments(&self) -> Result<Vec<String>>;
}

/// Trims, upper-cases and de-duplicates symbols, keeping first-seen order.
pub fn normalize_symbols<I, S>(symbols: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    symbols
        .into_iter()
        .map(|s| s.as_ref().trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.clone()))
        .collect()
}

#[derive(Debug, Clone)]
pub struct StaticInstruments {
    symbols: Vec<String>,
}

impl StaticInstruments {
    pub fn new<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            symbols: normalize_symbols(symbols),
        }
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }
}

#[async_trait]
impl InstrumentSource for StaticInstruments {
    async fn list_tracked_instruments(&self) -> Result<Vec<String>> {
        Ok(self.symbols.clone())
    }
}

#[derive(Debug, Deserialize)]
struct PreferencesFile {
    #[serde(default)]
    users: Vec<UserPreferences>,
}

#[derive(Debug, Deserialize)]
struct UserPreferences {
    #[allow(dead_code)]
    user_id: i64,
    #[serde(default)]
    watchlist: Vec<String>,
    #[serde(default = "default_alert_notifications")]
    alert_notifications: bool,
}

fn default_alert_notifications() -> bool {
    true
}

/// Static symbols extended with the watchlists of users who have alerts on.
///
/// The preferences file is read on every call and never written.
#[derive(Debug, Clone)]
pub struct WatchlistInstruments {
    base: StaticInstruments,
    path: PathBuf,
}

impl WatchlistInstruments {
    pub fn new(base: StaticInstruments, path: impl Into<PathBuf>) -> Self {
        Self {
            base,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_watchlists(&self) -> std::result::Result<Vec<String>, String> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| e.to_string())?;
        let prefs: PreferencesFile = serde_json::from_str(&raw).map_err(|e| e.to_string())?;
        Ok(prefs
            .users
            .into_iter()
            .filter(|user| user.alert_notifications)
            .flat_map(|user| user.watchlist)
            .collect())
    }
}

#[async_trait]
impl InstrumentSource for WatchlistInstruments {
    async fn list_tracked_instruments(&self) -> Result<Vec<String>> {
        match self.read_watchlists().await {
            Ok(extra) => {
                let symbols = normalize_symbols(self.base.symbols().iter().chain(extra.iter()));
                debug!(
                    path = %self.path.display(),
                    count = symbols.len(),
                    "WatchlistInstruments: {} tracked instruments",
                    symbols.len()
                );
                Ok(symbols)
            }
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "WatchlistInstruments: cannot read preferences file, using static symbols"
                );
                Ok(self.base.symbols().to_vec())
            }
        }
    }
}
