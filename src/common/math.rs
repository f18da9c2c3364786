//! Series helpers shared by the indicator implementations.
//!
//! Every `*_series` function returns a vector aligned with its input, with
//! `None` in the positions the lookback does not yet cover.

/// Smoothing factor for an EMA of `period`.
pub fn ema_alpha(period: usize) -> f64 {
    2.0 / (period as f64 + 1.0)
}

/// Single EMA step.
pub fn ema_from_previous(value: f64, previous: f64, period: usize) -> f64 {
    let alpha = ema_alpha(period);
    alpha * value + (1.0 - alpha) * previous
}

pub fn sma(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    let window = &values[values.len() - period..];
    Some(window.iter().sum::<f64>() / period as f64)
}

/// EMA seeded with the simple average of the first `period` values.
pub fn ema_series(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }

    let mut previous = values[..period].iter().sum::<f64>() / period as f64;
    out[period - 1] = Some(previous);
    for (i, value) in values.iter().enumerate().skip(period) {
        previous = ema_from_previous(*value, previous, period);
        out[i] = Some(previous);
    }
    out
}

/// Rolling simple moving average.
pub fn sma_series(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }

    let mut sum: f64 = values[..period].iter().sum();
    out[period - 1] = Some(sum / period as f64);
    for i in period..values.len() {
        sum += values[i] - values[i - period];
        out[i] = Some(sum / period as f64);
    }
    out
}

/// Shifts a series computed on `full[offset..]` back into alignment with `full`.
pub fn pad_front(tail: Vec<Option<f64>>, offset: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; offset];
    out.extend(tail);
    out
}

/// The defined suffix of a series and the index it starts at.
pub fn defined_tail(series: &[Option<f64>]) -> (usize, Vec<f64>) {
    let start = series
        .iter()
        .position(Option::is_some)
        .unwrap_or(series.len());
    let tail = series[start..].iter().map_while(|v| *v).collect();
    (start, tail)
}
