//! Unit tests for EMA indicator

use crate::support::candles_from_closes;
use cipherwatch::indicators::trend::{calculate_ema, ema_series, ema_warmup};

#[test]
fn test_ema_insufficient_data() {
    let candles = candles_from_closes(&[100.0; 10]);
    assert!(calculate_ema(&candles, 20).is_none());
}

#[test]
fn test_ema_known_values() {
    let candles = candles_from_closes(&[1.0, 2.0, 3.0, 4.0, 5.0]);
    assert_eq!(calculate_ema(&candles, 3), Some(4.0));
}

#[test]
fn test_ema_first_value_at_warmup() {
    let candles = candles_from_closes(&[10.0; 30]);
    let series = ema_series(&candles, 21);
    assert_eq!(ema_warmup(21), 20);
    assert!(series[19].is_none());
    assert_eq!(series[20], Some(10.0));
}
