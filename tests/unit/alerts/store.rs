//! Unit tests for the alert dedup store

use crate::support::ts;
use cipherwatch::alerts::AlertStore;
use cipherwatch::models::signal::{AlertKey, AlertKind, SignalKind};
use cipherwatch::models::timeframe::Timeframe;
use std::sync::atomic::{AtomicUsize, Ordering};

fn key(symbol: &str, bar: usize) -> AlertKey {
    AlertKey {
        symbol: symbol.to_string(),
        timeframe: Timeframe::Hour1,
        kind: AlertKind::Signal(SignalKind::GreenCircle),
        bar_timestamp: ts(bar),
    }
}

#[test]
fn test_should_emit_once() {
    let store = AlertStore::new();
    assert!(store.should_emit(&key("BTCUSDT", 1)));
    assert!(!store.should_emit(&key("BTCUSDT", 1)));
    assert!(!store.should_emit(&key("BTCUSDT", 1)));
    assert_eq!(store.len(), 1);
}

#[test]
fn test_distinct_keys() {
    let store = AlertStore::new();
    assert!(store.should_emit(&key("BTCUSDT", 1)));
    assert!(store.should_emit(&key("BTCUSDT", 2)));
    assert!(store.should_emit(&key("ETHUSDT", 1)));

    let mut gold = key("BTCUSDT", 1);
    gold.kind = AlertKind::Signal(SignalKind::GoldCircle);
    assert!(store.should_emit(&gold));

    let mut four_hour = key("BTCUSDT", 1);
    four_hour.timeframe = Timeframe::Hour4;
    assert!(store.should_emit(&four_hour));
    assert_eq!(store.len(), 5);
}

#[test]
fn test_concurrent_should_emit() {
    let store = AlertStore::new();
    let accepted = AtomicUsize::new(0);
    let target = key("BTCUSDT", 7);

    std::thread::scope(|scope| {
        for _ in 0..16 {
            scope.spawn(|| {
                for _ in 0..100 {
                    if store.should_emit(&target) {
                        accepted.fetch_add(1, Ordering::SeqCst);
                    }
                }
            });
        }
    });

    assert_eq!(accepted.load(Ordering::SeqCst), 1);
}

#[test]
fn test_clear_makes_keys_eligible_again() {
    let store = AlertStore::new();
    assert!(store.should_emit(&key("BTCUSDT", 1)));
    store.clear();
    assert!(store.is_empty());
    assert!(store.should_emit(&key("BTCUSDT", 1)));
}

#[test]
fn test_compact_drops_old_bars() {
    let store = AlertStore::new();
    for bar in 0..10 {
        store.should_emit(&key("BTCUSDT", bar));
    }
    let removed = store.compact(ts(6));
    assert_eq!(removed, 6);
    assert_eq!(store.len(), 4);
    assert!(!store.contains(&key("BTCUSDT", 5)));
    assert!(store.contains(&key("BTCUSDT", 6)));
    assert!(store.should_emit(&key("BTCUSDT", 5)));
}
