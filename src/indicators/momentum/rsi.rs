//! RSI (Relative Strength Index) indicator
//!
//! Wilder smoothing: the first average gain/loss is the simple mean of the
//! first `period` changes, later ones are `(prev * (period - 1) + x) / period`.

use crate::models::indicators::Candle;

/// RSI = 100 - (100 / (1 + RS)), pinned to 100 when the average loss is zero.
pub fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - (100.0 / (1.0 + rs))
}

pub fn rsi_series(candles: &[Candle], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; candles.len()];
    if period == 0 || candles.len() <= period {
        return out;
    }

    let change = |i: usize| candles[i].close - candles[i - 1].close;
    let p = period as f64;

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for i in 1..=period {
        let delta = change(i);
        if delta > 0.0 {
            avg_gain += delta;
        } else {
            avg_loss -= delta;
        }
    }
    avg_gain /= p;
    avg_loss /= p;
    out[period] = Some(rsi_from_averages(avg_gain, avg_loss));

    for (i, slot) in out.iter_mut().enumerate().skip(period + 1) {
        let delta = change(i);
        let (gain, loss) = if delta > 0.0 { (delta, 0.0) } else { (0.0, -delta) };
        avg_gain = (avg_gain * (p - 1.0) + gain) / p;
        avg_loss = (avg_loss * (p - 1.0) + loss) / p;
        *slot = Some(rsi_from_averages(avg_gain, avg_loss));
    }

    out
}

/// RSI at the last candle.
pub fn calculate_rsi(candles: &[Candle], period: usize) -> Option<f64> {
    rsi_series(candles, period).last().copied().flatten()
}

pub fn rsi_warmup(period: usize) -> usize {
    period
}
