//! Cross-timeframe composite conditions.
//!
//! A composite pairs an indicator threshold on one timeframe with a discrete
//! signal on another. Each side is evaluated on its own series at its own
//! index; the frames are never merged.

use crate::models::indicators::{IndicatorFrame, IndicatorSeries};
use crate::models::signal::{CompositeCondition, SignalKind};
use crate::models::timeframe::Timeframe;
use crate::signals::evaluator::SignalEvaluator;
use crate::signals::thresholds::SignalThresholds;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorField {
    EmaFast,
    EmaSlow,
    Rsi,
    Wt1,
    Wt2,
}

impl IndicatorField {
    pub fn value(&self, frame: &IndicatorFrame) -> Option<f64> {
        match self {
            IndicatorField::EmaFast => frame.ema_fast,
            IndicatorField::EmaSlow => frame.ema_slow,
            IndicatorField::Rsi => frame.rsi,
            IndicatorField::Wt1 => frame.wt1,
            IndicatorField::Wt2 => frame.wt2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    LessThan,
    LessOrEqual,
    GreaterThan,
    GreaterOrEqual,
}

impl Comparison {
    pub fn holds(&self, lhs: f64, rhs: f64) -> bool {
        match self {
            Comparison::LessThan => lhs < rhs,
            Comparison::LessOrEqual => lhs <= rhs,
            Comparison::GreaterThan => lhs > rhs,
            Comparison::GreaterOrEqual => lhs >= rhs,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorThreshold {
    pub field: IndicatorField,
    pub comparison: Comparison,
    pub value: f64,
}

impl IndicatorThreshold {
    /// Undefined indicator values never match.
    pub fn matches(&self, frame: &IndicatorFrame) -> bool {
        self.field
            .value(frame)
            .is_some_and(|value| self.comparison.holds(value, self.value))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeRule {
    pub condition: CompositeCondition,
    pub threshold_timeframe: Timeframe,
    pub threshold: IndicatorThreshold,
    pub signal_timeframe: Timeframe,
    pub signal: SignalKind,
}

impl CompositeRule {
    /// Built-in definition of `condition` under the given thresholds.
    pub fn for_condition(condition: CompositeCondition, thresholds: &SignalThresholds) -> Self {
        match condition {
            CompositeCondition::ShortTermDowntrend => Self {
                condition,
                threshold_timeframe: Timeframe::Hour4,
                threshold: IndicatorThreshold {
                    field: IndicatorField::Rsi,
                    comparison: Comparison::LessThan,
                    value: thresholds.downtrend_rsi_max,
                },
                signal_timeframe: Timeframe::Hour1,
                signal: SignalKind::RedCircle,
            },
            CompositeCondition::OversoldBounce => Self {
                condition,
                threshold_timeframe: Timeframe::Hour4,
                threshold: IndicatorThreshold {
                    field: IndicatorField::Rsi,
                    comparison: Comparison::LessThan,
                    value: thresholds.rsi_oversold,
                },
                signal_timeframe: Timeframe::Hour1,
                signal: SignalKind::GreenCircle,
            },
        }
    }
}

/// One timeframe's series positioned at the bar under evaluation.
#[derive(Debug, Clone, Copy)]
pub struct TimeframeView<'a> {
    pub timeframe: Timeframe,
    pub series: &'a IndicatorSeries,
    pub index: usize,
}

impl<'a> TimeframeView<'a> {
    pub fn new(timeframe: Timeframe, series: &'a IndicatorSeries, index: usize) -> Self {
        Self {
            timeframe,
            series,
            index,
        }
    }

    /// View on the most recent bar, `None` for an empty series.
    pub fn latest(timeframe: Timeframe, series: &'a IndicatorSeries) -> Option<Self> {
        Some(Self::new(timeframe, series, series.latest_index()?))
    }

    /// The frame at `index`, if it is past the warm-up.
    pub fn frame(&self) -> Option<&'a IndicatorFrame> {
        if self.index < self.series.warmup {
            return None;
        }
        self.series.frames.get(self.index)
    }
}

/// True when the threshold holds on `threshold_view` and the rule's signal
/// fires on `signal_view`.
pub fn evaluate_composite(
    rule: &CompositeRule,
    evaluator: &SignalEvaluator,
    threshold_view: &TimeframeView<'_>,
    signal_view: &TimeframeView<'_>,
) -> bool {
    let Some(frame) = threshold_view.frame() else {
        return false;
    };
    if !rule.threshold.matches(frame) {
        return false;
    }
    evaluator
        .evaluate(signal_view.series, signal_view.index)
        .contains(&rule.signal)
}
