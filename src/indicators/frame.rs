//! Full indicator frame computation for a candle series

use crate::indicators::error::IndicatorError;
use crate::indicators::momentum::{rsi_series, rsi_warmup, wavetrend_series, wavetrend_warmup};
use crate::indicators::trend::{ema_series, ema_warmup};
use crate::models::indicators::{Candle, IndicatorFrame, IndicatorParams, IndicatorSeries};

/// Index of the first bar at which every indicator in the frame is defined.
pub fn warmup_index(params: &IndicatorParams) -> usize {
    [
        ema_warmup(params.ema_fast),
        ema_warmup(params.ema_slow),
        rsi_warmup(params.rsi_period),
        wavetrend_warmup(
            params.wt_channel_len,
            params.wt_average_len,
            params.wt_ma_len,
        ),
    ]
    .into_iter()
    .max()
    .unwrap_or(0)
}

/// Minimum number of candles `compute_indicators` accepts.
pub fn warmup_length(params: &IndicatorParams) -> usize {
    warmup_index(params) + 1
}

pub fn validate_params(params: &IndicatorParams) -> Result<(), IndicatorError> {
    let lookbacks = [
        ("ema_fast", params.ema_fast),
        ("ema_slow", params.ema_slow),
        ("rsi_period", params.rsi_period),
        ("wt_channel_len", params.wt_channel_len),
        ("wt_average_len", params.wt_average_len),
        ("wt_ma_len", params.wt_ma_len),
    ];
    match lookbacks.iter().find(|(_, value)| *value == 0) {
        Some((name, _)) => Err(IndicatorError::InvalidParameter { name: *name }),
        None => Ok(()),
    }
}

/// Computes one [`IndicatorFrame`] per candle.
///
/// Lookbacks are counted in bars, so gaps in the timestamp sequence are
/// treated like any other adjacent pair of bars.
pub fn compute_indicators(
    candles: &[Candle],
    params: &IndicatorParams,
) -> Result<IndicatorSeries, IndicatorError> {
    validate_params(params)?;

    let required = warmup_length(params);
    if candles.len() < required {
        return Err(IndicatorError::InsufficientData {
            required,
            available: candles.len(),
        });
    }

    let ema_fast = ema_series(candles, params.ema_fast);
    let ema_slow = ema_series(candles, params.ema_slow);
    let rsi = rsi_series(candles, params.rsi_period);
    let wavetrend = wavetrend_series(
        candles,
        params.wt_channel_len,
        params.wt_average_len,
        params.wt_ma_len,
    );

    let frames = candles
        .iter()
        .enumerate()
        .map(|(i, candle)| IndicatorFrame {
            ema_fast: ema_fast[i],
            ema_slow: ema_slow[i],
            rsi: rsi[i],
            wt1: wavetrend.wt1[i],
            wt2: wavetrend.wt2[i],
            ..IndicatorFrame::new(candle)
        })
        .collect();

    Ok(IndicatorSeries {
        frames,
        warmup: warmup_index(params),
    })
}
