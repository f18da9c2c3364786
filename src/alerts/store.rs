//! Process-wide dedup store for emitted alerts

use crate::models::signal::AlertKey;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

/// Keys already alerted in this process.
///
/// Not persisted: a restart forgets every key.
#[derive(Debug, Default)]
pub struct AlertStore {
    emitted: Mutex<HashSet<AlertKey>>,
}

impl AlertStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn keys(&self) -> MutexGuard<'_, HashSet<AlertKey>> {
        // A panic while holding the guard cannot leave the set half-updated.
        self.emitted.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Marks `key` as emitted and returns whether it was new.
    ///
    /// The check and the mark happen under one lock, so concurrent callers
    /// with the same key see `true` exactly once.
    pub fn should_emit(&self, key: &AlertKey) -> bool {
        self.keys().insert(key.clone())
    }

    pub fn contains(&self, key: &AlertKey) -> bool {
        self.keys().contains(key)
    }

    pub fn clear(&self) {
        self.keys().clear();
    }

    pub fn len(&self) -> usize {
        self.keys().len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys().is_empty()
    }

    /// Drops keys whose bar opened before `cutoff`. Returns how many were removed.
    pub fn compact(&self, cutoff: DateTime<Utc>) -> usize {
        let mut keys = self.keys();
        let before = keys.len();
        keys.retain(|key| key.bar_timestamp >= cutoff);
        before - keys.len()
    }
}
