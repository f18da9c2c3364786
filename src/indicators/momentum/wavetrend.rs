//! WaveTrend oscillator
//!
//! esa = EMA(hlc3, channel)
//! de  = EMA(|hlc3 - esa|, channel)
//! ci  = (hlc3 - esa) / (0.015 * de)
//! wt1 = EMA(ci, average)
//! wt2 = SMA(wt1, ma)

use crate::common::math;
use crate::models::indicators::Candle;

const CHANNEL_SCALE: f64 = 0.015;

#[derive(Debug, Clone, PartialEq)]
pub struct WaveTrend {
    pub wt1: Vec<Option<f64>>,
    pub wt2: Vec<Option<f64>>,
}

/// Channel index for one bar. A flat channel (`de == 0`) reads as 0.
pub fn channel_index(deviation: f64, mean_deviation: f64) -> f64 {
    if mean_deviation == 0.0 {
        return 0.0;
    }
    deviation / (CHANNEL_SCALE * mean_deviation)
}

pub fn wavetrend_series(
    candles: &[Candle],
    channel_len: usize,
    average_len: usize,
    ma_len: usize,
) -> WaveTrend {
    let hlc3: Vec<f64> = candles.iter().map(Candle::typical_price).collect();

    let esa = math::ema_series(&hlc3, channel_len);
    let (esa_start, esa_tail) = math::defined_tail(&esa);

    let deviation: Vec<f64> = esa_tail
        .iter()
        .enumerate()
        .map(|(j, e)| hlc3[esa_start + j] - e)
        .collect();
    let abs_deviation: Vec<f64> = deviation.iter().map(|d| d.abs()).collect();
    let de = math::ema_series(&abs_deviation, channel_len);

    let ci: Vec<Option<f64>> = deviation
        .iter()
        .zip(de)
        .map(|(d, de)| de.map(|de| channel_index(*d, de)))
        .collect();
    let ci = math::pad_front(ci, esa_start);

    let (ci_start, ci_tail) = math::defined_tail(&ci);
    let wt1 = math::pad_front(math::ema_series(&ci_tail, average_len), ci_start);

    let (wt1_start, wt1_tail) = math::defined_tail(&wt1);
    let wt2 = math::pad_front(math::sma_series(&wt1_tail, ma_len), wt1_start);

    WaveTrend { wt1, wt2 }
}

/// Index of the first bar with both lines defined.
pub fn wavetrend_warmup(channel_len: usize, average_len: usize, ma_len: usize) -> usize {
    2 * channel_len.saturating_sub(1) + average_len.saturating_sub(1) + ma_len.saturating_sub(1)
}
