//! Unit tests for tracked-instrument sources

use cipherwatch::services::instruments::{
    normalize_symbols, InstrumentSource, StaticInstruments, WatchlistInstruments,
};
use std::path::PathBuf;

fn prefs_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "cipherwatch-prefs-{}-{}.json",
        name,
        std::process::id()
    ))
}

#[test]
fn test_normalize_symbols_keeps_first_seen_order() {
    let symbols = normalize_symbols(["eth", " BTC ", "ETH", "", "sol"]);
    assert_eq!(symbols, vec!["ETH", "BTC", "SOL"]);
}

#[tokio::test]
async fn test_static_instruments() {
    let source = StaticInstruments::new(["btcusdt", "ethusdt"]);
    let symbols = source.list_tracked_instruments().await.unwrap();
    assert_eq!(symbols, vec!["BTCUSDT", "ETHUSDT"]);
}

#[tokio::test]
async fn test_watchlists_extend_static_set() {
    let path = prefs_path("extend");
    let prefs = serde_json::json!({
        "users": [
            { "user_id": 1, "watchlist": ["solusdt", "BTCUSDT"] },
            { "user_id": 2, "watchlist": ["xrpusdt"], "alert_notifications": false },
            { "user_id": 3 }
        ]
    });
    std::fs::write(&path, prefs.to_string()).unwrap();

    let source = WatchlistInstruments::new(StaticInstruments::new(["BTCUSDT", "ETHUSDT"]), &path);
    let symbols = source.list_tracked_instruments().await.unwrap();
    assert_eq!(symbols, vec!["BTCUSDT", "ETHUSDT", "SOLUSDT"]);

    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn test_unreadable_preferences_fall_back() {
    let path = prefs_path("missing");
    let _ = std::fs::remove_file(&path);
    let source = WatchlistInstruments::new(StaticInstruments::new(["BTCUSDT"]), &path);
    assert_eq!(source.list_tracked_instruments().await.unwrap(), vec!["BTCUSDT"]);

    std::fs::write(&path, "{ not json").unwrap();
    assert_eq!(source.list_tracked_instruments().await.unwrap(), vec!["BTCUSDT"]);
    let _ = std::fs::remove_file(&path);
}
