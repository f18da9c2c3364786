//! Per-bar WaveTrend signal classification

use crate::models::indicators::IndicatorSeries;
use crate::models::signal::SignalKind;
use crate::signals::divergence::detect_divergence;
use crate::signals::thresholds::SignalThresholds;
use std::collections::BTreeSet;

/// Signals on one bar, iterated in evaluation order.
pub type SignalSet = BTreeSet<SignalKind>;

/// `fast` moved strictly above `slow` between two bars.
pub fn crossed_up(prev_fast: f64, prev_slow: f64, fast: f64, slow: f64) -> bool {
    prev_fast <= prev_slow && fast > slow
}

/// `fast` moved strictly below `slow` between two bars.
pub fn crossed_down(prev_fast: f64, prev_slow: f64, fast: f64, slow: f64) -> bool {
    prev_fast >= prev_slow && fast < slow
}

/// First index a signal may be reported at: crossings need a warmed-up prior bar.
pub fn first_evaluable_index(series: &IndicatorSeries) -> usize {
    series.warmup + 1
}

#[derive(Debug, Clone, Default)]
pub struct SignalEvaluator {
    thresholds: SignalThresholds,
}

impl SignalEvaluator {
    pub fn new(thresholds: SignalThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &SignalThresholds {
        &self.thresholds
    }

    /// Classifies the bar at `index`.
    ///
    /// Indices inside the warm-up (or past the end) yield an empty set.
    pub fn evaluate(&self, series: &IndicatorSeries, index: usize) -> SignalSet {
        let mut signals = SignalSet::new();
        if index < first_evaluable_index(series) || index >= series.len() {
            return signals;
        }

        let t = &self.thresholds;
        let previous = &series.frames[index - 1];
        let current = &series.frames[index];

        if let (Some((prev_wt1, prev_wt2)), Some((wt1, wt2))) =
            (previous.wavetrend(), current.wavetrend())
        {
            if crossed_up(prev_wt1, prev_wt2, wt1, wt2) && prev_wt1 < t.oversold {
                signals.insert(SignalKind::GreenCircle);
                if current.rsi.is_some_and(|rsi| rsi < t.rsi_oversold) {
                    signals.insert(SignalKind::GoldCircle);
                }
            }

            if crossed_down(prev_wt1, prev_wt2, wt1, wt2) && prev_wt1 > t.overbought {
                signals.insert(SignalKind::RedCircle);
            }
        }

        if detect_divergence(&series.frames[..=index], index, t).is_some() {
            signals.insert(SignalKind::PurpleTriangle);
        }

        signals
    }

    /// Classifies the most recent bar of the series.
    pub fn evaluate_latest(&self, series: &IndicatorSeries) -> SignalSet {
        match series.latest_index() {
            Some(index) => self.evaluate(series, index),
            None => SignalSet::new(),
        }
    }
}
