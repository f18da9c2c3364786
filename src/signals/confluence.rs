//! Multi-timeframe confluence rules.
//!
//! Each leg is checked on its own timeframe's latest closed bar and the rule
//! holds only when every leg does. Legs never share frames across timeframes.

use crate::common::math::{defined_tail, ema_series, sma};
use crate::models::indicators::{IndicatorFrame, IndicatorSeries};
use crate::models::signal::{ConfluenceCondition, SignalKind};
use crate::models::timeframe::Timeframe;
use crate::signals::composite::TimeframeView;
use crate::signals::evaluator::SignalEvaluator;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const UPTREND_EMA_FAST: usize = 8;
pub const UPTREND_EMA_SLOW: usize = 14;
/// Bars in the RSI moving average the 1h RSI must clear.
pub const RSI_AVERAGE_PERIOD: usize = 9;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegCheck {
    /// The evaluator reports this signal on the bar.
    Signal(SignalKind),
    /// Close strictly above the EMA of closes for every listed period.
    CloseAboveEmas(Vec<usize>),
    /// EMA of closes over `fast` strictly above the one over `slow`.
    EmaAbove { fast: usize, slow: usize },
    /// RSI strictly above its simple average over the last `period` bars.
    RsiAboveAverage { period: usize },
}

impl LegCheck {
    /// Frames inside the warm-up never match.
    pub fn holds(&self, evaluator: &SignalEvaluator, view: &TimeframeView<'_>) -> bool {
        let Some(frame) = view.frame() else {
            return false;
        };
        let history = &view.series.frames[..=view.index];
        match self {
            LegCheck::Signal(kind) => evaluator.evaluate(view.series, view.index).contains(kind),
            LegCheck::CloseAboveEmas(periods) => {
                !periods.is_empty()
                    && periods.iter().all(|period| {
                        close_ema(history, *period).is_some_and(|ema| frame.close > ema)
                    })
            }
            LegCheck::EmaAbove { fast, slow } => {
                match (close_ema(history, *fast), close_ema(history, *slow)) {
                    (Some(fast), Some(slow)) => fast > slow,
                    _ => false,
                }
            }
            LegCheck::RsiAboveAverage { period } => match frame.rsi {
                Some(rsi) => rsi_average(history, *period).is_some_and(|average| rsi > average),
                None => false,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfluenceLeg {
    pub timeframe: Timeframe,
    pub check: LegCheck,
}

impl ConfluenceLeg {
    pub fn new(timeframe: Timeframe, check: LegCheck) -> Self {
        Self { timeframe, check }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfluenceRule {
    pub condition: ConfluenceCondition,
    pub legs: Vec<ConfluenceLeg>,
}

impl ConfluenceRule {
    pub fn for_condition(condition: ConfluenceCondition) -> Self {
        let green =
            |timeframe| ConfluenceLeg::new(timeframe, LegCheck::Signal(SignalKind::GreenCircle));
        let legs = match condition {
            ConfluenceCondition::PerfectBuy => vec![green(Timeframe::Week1)],
            ConfluenceCondition::GreatBuy => vec![
                green(Timeframe::Hour3),
                green(Timeframe::Hour4),
                green(Timeframe::Hour12),
            ],
            ConfluenceCondition::ShortTermUptrend => vec![
                ConfluenceLeg::new(
                    Timeframe::Min30,
                    LegCheck::EmaAbove {
                        fast: UPTREND_EMA_FAST,
                        slow: UPTREND_EMA_SLOW,
                    },
                ),
                ConfluenceLeg::new(
                    Timeframe::Hour1,
                    LegCheck::RsiAboveAverage {
                        period: RSI_AVERAGE_PERIOD,
                    },
                ),
                ConfluenceLeg::new(
                    Timeframe::Hour4,
                    LegCheck::CloseAboveEmas(vec![UPTREND_EMA_FAST, UPTREND_EMA_SLOW]),
                ),
            ],
        };
        Self { condition, legs }
    }

    /// Distinct leg timeframes, shortest first.
    pub fn timeframes(&self) -> Vec<Timeframe> {
        let mut timeframes: Vec<Timeframe> = self.legs.iter().map(|leg| leg.timeframe).collect();
        timeframes.sort();
        timeframes.dedup();
        timeframes
    }

    /// Shortest leg timeframe; alerts are keyed on its latest bar.
    pub fn key_timeframe(&self) -> Option<Timeframe> {
        self.legs.iter().map(|leg| leg.timeframe).min()
    }
}

/// True when every leg holds on the latest bar of its timeframe's series.
/// A leg whose timeframe is missing or empty fails the rule.
pub fn evaluate_confluence(
    rule: &ConfluenceRule,
    evaluator: &SignalEvaluator,
    series: &BTreeMap<Timeframe, IndicatorSeries>,
) -> bool {
    !rule.legs.is_empty()
        && rule.legs.iter().all(|leg| {
            series
                .get(&leg.timeframe)
                .and_then(|s| TimeframeView::latest(leg.timeframe, s))
                .is_some_and(|view| leg.check.holds(evaluator, &view))
        })
}

/// EMA of closes at the last frame of `history`.
fn close_ema(history: &[IndicatorFrame], period: usize) -> Option<f64> {
    let closes: Vec<f64> = history.iter().map(|f| f.close).collect();
    ema_series(&closes, period).last().copied().flatten()
}

/// Mean RSI over the last `period` frames, which must all be defined.
fn rsi_average(history: &[IndicatorFrame], period: usize) -> Option<f64> {
    let rsi: Vec<Option<f64>> = history.iter().map(|f| f.rsi).collect();
    let (start, tail) = defined_tail(&rsi);
    if start + tail.len() != rsi.len() {
        return None;
    }
    sma(&tail, period)
}
