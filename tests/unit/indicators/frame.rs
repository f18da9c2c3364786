//! Unit tests for full indicator frame computation

use crate::support::{candles_from_closes, flat_candles, sine_closes, ts};
use chrono::Duration;
use cipherwatch::indicators::{compute_indicators, warmup_index, warmup_length, IndicatorError};
use cipherwatch::models::indicators::IndicatorParams;

#[test]
fn test_warmup_defaults() {
    let params = IndicatorParams::default();
    assert_eq!(warmup_index(&params), 29);
    assert_eq!(warmup_length(&params), 30);
}

#[test]
fn test_insufficient_data() {
    let params = IndicatorParams::default();
    let err = compute_indicators(&flat_candles(29, 10.0), &params).unwrap_err();
    assert_eq!(
        err,
        IndicatorError::InsufficientData {
            required: 30,
            available: 29
        }
    );
}

#[test]
fn test_invalid_parameter() {
    let params = IndicatorParams {
        rsi_period: 0,
        ..IndicatorParams::default()
    };
    let err = compute_indicators(&flat_candles(100, 10.0), &params).unwrap_err();
    assert_eq!(err, IndicatorError::InvalidParameter { name: "rsi_period" });
}

#[test]
fn test_frames_aligned_with_candles() {
    let candles = candles_from_closes(&sine_closes(100, 30.0, 6.0));
    let series = compute_indicators(&candles, &IndicatorParams::default()).unwrap();
    assert_eq!(series.len(), candles.len());
    assert_eq!(series.warmup, 29);
    for (frame, candle) in series.frames.iter().zip(&candles) {
        assert_eq!(frame.timestamp, candle.timestamp);
        assert_eq!(frame.high, candle.high);
        assert_eq!(frame.low, candle.low);
        assert_eq!(frame.close, candle.close);
    }
    let first_full = &series.frames[series.warmup];
    assert!(first_full.ema_fast.is_some());
    assert!(first_full.ema_slow.is_some());
    assert!(first_full.rsi.is_some());
    assert!(first_full.wavetrend().is_some());
    assert!(series.frames[series.warmup - 1].wt2.is_none());
}

#[test]
fn test_constant_price_frames() {
    let series = compute_indicators(&flat_candles(60, 5.0), &IndicatorParams::default()).unwrap();
    let latest = series.latest().unwrap();
    assert_eq!(latest.rsi, Some(100.0));
    assert_eq!(latest.wavetrend(), Some((0.0, 0.0)));
    assert_eq!(latest.ema_fast, Some(5.0));
}

#[test]
fn test_timestamp_gaps_do_not_change_values() {
    let closes = sine_closes(80, 20.0, 4.0);
    let regular = candles_from_closes(&closes);
    let mut gapped = regular.clone();
    for candle in gapped.iter_mut().skip(40) {
        candle.timestamp = candle.timestamp + Duration::hours(5);
    }
    assert!(gapped[40].timestamp > ts(44));

    let params = IndicatorParams::default();
    let a = compute_indicators(&regular, &params).unwrap();
    let b = compute_indicators(&gapped, &params).unwrap();
    for (x, y) in a.frames.iter().zip(&b.frames) {
        assert_eq!(x.wt1, y.wt1);
        assert_eq!(x.rsi, y.rsi);
    }
}
