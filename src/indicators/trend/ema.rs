//! EMA (Exponential Moving Average) indicator

use crate::common::math;
use crate::models::indicators::Candle;

/// EMA of closes, aligned with `candles`.
pub fn ema_series(candles: &[Candle], period: usize) -> Vec<Option<f64>> {
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    math::ema_series(&closes, period)
}

/// EMA value at the last candle.
pub fn calculate_ema(candles: &[Candle], period: usize) -> Option<f64> {
    ema_series(candles, period).last().copied().flatten()
}

/// Index of the first defined EMA value.
pub fn ema_warmup(period: usize) -> usize {
    period.saturating_sub(1)
}
