//! Price/oscillator divergence on confirmed pivots.
//!
//! A pivot is only known once `pivot_window` bars have closed after it, so a
//! divergence is reported on the bar that confirms the newer pivot.

use crate::models::indicators::IndicatorFrame;
use crate::signals::thresholds::SignalThresholds;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DivergenceKind {
    /// Higher high in price, wt1 high no higher than the previous one.
    Bearish,
    /// Lower low in price, wt1 low no lower than the previous one.
    Bullish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Divergence {
    pub kind: DivergenceKind,
    pub pivot: usize,
    pub previous_pivot: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Extreme {
    High,
    Low,
}

fn price(frame: &IndicatorFrame, extreme: Extreme) -> f64 {
    match extreme {
        Extreme::High => frame.high,
        Extreme::Low => frame.low,
    }
}

/// Strict pivot against `window` bars on each side.
fn is_pivot(frames: &[IndicatorFrame], p: usize, window: usize, extreme: Extreme) -> bool {
    if p < window || p + window >= frames.len() {
        return false;
    }
    let center = price(&frames[p], extreme);
    (1..=window).all(|k| {
        let left = price(&frames[p - k], extreme);
        let right = price(&frames[p + k], extreme);
        match extreme {
            Extreme::High => center > left && center > right,
            Extreme::Low => center < left && center < right,
        }
    })
}

fn previous_pivot(
    frames: &[IndicatorFrame],
    pivot: usize,
    window: usize,
    range: usize,
    extreme: Extreme,
) -> Option<usize> {
    let lower = pivot.saturating_sub(range).max(window);
    (lower..pivot)
        .rev()
        .find(|&q| frames[q].wt1.is_some() && is_pivot(frames, q, window, extreme))
}

/// Checks whether bar `index` confirms a divergence. Only `frames[..=index]`
/// is consulted.
pub fn detect_divergence(
    frames: &[IndicatorFrame],
    index: usize,
    thresholds: &SignalThresholds,
) -> Option<Divergence> {
    let window = thresholds.pivot_window.max(1);
    let frames = frames.get(..=index)?;
    let pivot = index.checked_sub(window)?;
    let pivot_wt1 = frames[pivot].wt1?;

    if is_pivot(frames, pivot, window, Extreme::High)
        && thresholds
            .bearish_divergence_min
            .map_or(true, |min| pivot_wt1 >= min)
    {
        if let Some(q) = previous_pivot(
            frames,
            pivot,
            window,
            thresholds.divergence_range,
            Extreme::High,
        ) {
            let previous_wt1 = frames[q].wt1?;
            if frames[pivot].high > frames[q].high && pivot_wt1 <= previous_wt1 {
                return Some(Divergence {
                    kind: DivergenceKind::Bearish,
                    pivot,
                    previous_pivot: q,
                });
            }
        }
    }

    if is_pivot(frames, pivot, window, Extreme::Low)
        && thresholds
            .bullish_divergence_max
            .map_or(true, |max| pivot_wt1 <= max)
    {
        if let Some(q) = previous_pivot(
            frames,
            pivot,
            window,
            thresholds.divergence_range,
            Extreme::Low,
        ) {
            let previous_wt1 = frames[q].wt1?;
            if frames[pivot].low < frames[q].low && pivot_wt1 >= previous_wt1 {
                return Some(Divergence {
                    kind: DivergenceKind::Bullish,
                    pivot,
                    previous_pivot: q,
                });
            }
        }
    }

    None
}
