//! Rule-driven detection sweeps

use crate::error::Result;
use crate::indicators::compute_indicators;
use crate::jobs::context::JobContext;
use crate::jobs::types::{Detection, DetectionJob};
use crate::models::indicators::{closed_bars, IndicatorSeries};
use crate::models::signal::{
    AlertKind, CompositeCondition, ConfluenceCondition, FrameSnapshot, ScreenCondition,
};
use crate::models::timeframe::Timeframe;
use crate::signals::composite::{evaluate_composite, CompositeRule, TimeframeView};
use crate::signals::confluence::{evaluate_confluence, ConfluenceRule};
use crate::signals::evaluator::SignalEvaluator;
use crate::signals::screens::evaluate_screen;
use crate::signals::thresholds::SignalThresholds;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tracing::debug;

pub const PRICE_CHECK: &str = "price_check";
pub const VMC_CIPHER: &str = "vmc_cipher";
pub const BUY_OPPORTUNITY: &str = "buy_opportunity";
pub const SHORT_TERM_DOWNTREND: &str = "short_term_downtrend";
pub const VMC_OPPORTUNITIES: &str = "vmc_opportunities";
pub const SHORT_TERM_UPTREND: &str = "short_term_uptrend";

#[derive(Debug, Clone, PartialEq)]
pub enum DetectionRule {
    /// Every signal kind on the latest closed bar of one timeframe.
    Signals(Timeframe),
    Composite(CompositeRule),
    Screen {
        condition: ScreenCondition,
        timeframe: Timeframe,
    },
    Confluence(ConfluenceRule),
}

impl DetectionRule {
    pub fn timeframes(&self) -> Vec<Timeframe> {
        match self {
            DetectionRule::Signals(timeframe) => vec![*timeframe],
            DetectionRule::Composite(rule) => {
                vec![rule.threshold_timeframe, rule.signal_timeframe]
            }
            DetectionRule::Screen { timeframe, .. } => vec![*timeframe],
            DetectionRule::Confluence(rule) => rule.timeframes(),
        }
    }
}

/// Fetches candles, keeps closed bars and computes the indicator series.
pub async fn load_series(
    ctx: &JobContext,
    symbol: &str,
    timeframe: Timeframe,
) -> Result<IndicatorSeries> {
    let candles = ctx
        .data_provider
        .get_candles(symbol, timeframe, ctx.settings.candle_limit)
        .await?;
    let closed = closed_bars(&candles);
    Ok(compute_indicators(closed, &ctx.settings.params)?)
}

/// A job that loads each timeframe once per instrument and applies its rules
/// to the latest closed bar.
#[derive(Debug, Clone)]
pub struct RuleSweep {
    name: String,
    rules: Vec<DetectionRule>,
}

impl RuleSweep {
    pub fn new(name: impl Into<String>, rules: Vec<DetectionRule>) -> Self {
        Self {
            name: name.into(),
            rules,
        }
    }

    pub fn rules(&self) -> &[DetectionRule] {
        &self.rules
    }

    /// Basic checks: extreme RSI on 4h.
    pub fn price_check() -> Self {
        Self::new(
            PRICE_CHECK,
            vec![DetectionRule::Screen {
                condition: ScreenCondition::RsiExtremeOversold,
                timeframe: Timeframe::Hour4,
            }],
        )
    }

    /// WaveTrend signals on each of `timeframes`.
    pub fn vmc_cipher(timeframes: &[Timeframe]) -> Self {
        Self::new(
            VMC_CIPHER,
            timeframes.iter().copied().map(DetectionRule::Signals).collect(),
        )
    }

    pub fn buy_opportunity(thresholds: &SignalThresholds) -> Self {
        Self::new(
            BUY_OPPORTUNITY,
            vec![
                DetectionRule::Screen {
                    condition: ScreenCondition::BuyOpportunity,
                    timeframe: Timeframe::Hour4,
                },
                DetectionRule::Composite(CompositeRule::for_condition(
                    CompositeCondition::OversoldBounce,
                    thresholds,
                )),
            ],
        )
    }

    pub fn short_term_downtrend(thresholds: &SignalThresholds) -> Self {
        Self::new(
            SHORT_TERM_DOWNTREND,
            vec![DetectionRule::Composite(CompositeRule::for_condition(
                CompositeCondition::ShortTermDowntrend,
                thresholds,
            ))],
        )
    }

    /// Weekly Green Circle (perfect buy) and a Green Circle on each of
    /// 3h, 4h and 12h at once (great buy).
    pub fn vmc_opportunities() -> Self {
        Self::new(
            VMC_OPPORTUNITIES,
            vec![
                DetectionRule::Confluence(ConfluenceRule::for_condition(
                    ConfluenceCondition::PerfectBuy,
                )),
                DetectionRule::Confluence(ConfluenceRule::for_condition(
                    ConfluenceCondition::GreatBuy,
                )),
            ],
        )
    }

    pub fn short_term_uptrend() -> Self {
        Self::new(
            SHORT_TERM_UPTREND,
            vec![DetectionRule::Confluence(ConfluenceRule::for_condition(
                ConfluenceCondition::ShortTermUptrend,
            ))],
        )
    }

    fn apply(
        &self,
        rule: &DetectionRule,
        series: &BTreeMap<Timeframe, IndicatorSeries>,
        evaluator: &SignalEvaluator,
        detections: &mut Vec<Detection>,
    ) {
        match rule {
            DetectionRule::Signals(timeframe) => {
                let Some(view) = series
                    .get(timeframe)
                    .and_then(|s| TimeframeView::latest(*timeframe, s))
                else {
                    return;
                };
                let Some(frame) = view.frame() else {
                    return;
                };
                for kind in evaluator.evaluate(view.series, view.index) {
                    detections.push(Detection {
                        kind: AlertKind::Signal(kind),
                        timeframe: *timeframe,
                        timeframes: vec![*timeframe],
                        bar_timestamp: frame.timestamp,
                        snapshot: vec![FrameSnapshot {
                            timeframe: *timeframe,
                            frame: frame.clone(),
                        }],
                    });
                }
            }
            DetectionRule::Composite(composite) => {
                let threshold_view = series
                    .get(&composite.threshold_timeframe)
                    .and_then(|s| TimeframeView::latest(composite.threshold_timeframe, s));
                let signal_view = series
                    .get(&composite.signal_timeframe)
                    .and_then(|s| TimeframeView::latest(composite.signal_timeframe, s));
                let (Some(threshold_view), Some(signal_view)) = (threshold_view, signal_view)
                else {
                    return;
                };
                if !evaluate_composite(composite, evaluator, &threshold_view, &signal_view) {
                    return;
                }
                let (Some(threshold_frame), Some(signal_frame)) =
                    (threshold_view.frame(), signal_view.frame())
                else {
                    return;
                };
                detections.push(Detection {
                    kind: AlertKind::Composite(composite.condition),
                    timeframe: composite.signal_timeframe,
                    timeframes: vec![composite.threshold_timeframe, composite.signal_timeframe],
                    bar_timestamp: signal_frame.timestamp,
                    snapshot: vec![
                        FrameSnapshot {
                            timeframe: composite.threshold_timeframe,
                            frame: threshold_frame.clone(),
                        },
                        FrameSnapshot {
                            timeframe: composite.signal_timeframe,
                            frame: signal_frame.clone(),
                        },
                    ],
                });
            }
            DetectionRule::Screen {
                condition,
                timeframe,
            } => {
                let Some(view) = series
                    .get(timeframe)
                    .and_then(|s| TimeframeView::latest(*timeframe, s))
                else {
                    return;
                };
                if !evaluate_screen(*condition, view.series, view.index, evaluator.thresholds()) {
                    return;
                }
                let Some(frame) = view.frame() else {
                    return;
                };
                detections.push(Detection {
                    kind: AlertKind::Screen(*condition),
                    timeframe: *timeframe,
                    timeframes: vec![*timeframe],
                    bar_timestamp: frame.timestamp,
                    snapshot: vec![FrameSnapshot {
                        timeframe: *timeframe,
                        frame: frame.clone(),
                    }],
                });
            }
            DetectionRule::Confluence(confluence) => {
                if !evaluate_confluence(confluence, evaluator, series) {
                    return;
                }
                let snapshot: Vec<FrameSnapshot> = confluence
                    .timeframes()
                    .into_iter()
                    .filter_map(|timeframe| {
                        let view = TimeframeView::latest(timeframe, series.get(&timeframe)?)?;
                        Some(FrameSnapshot {
                            timeframe,
                            frame: view.frame()?.clone(),
                        })
                    })
                    .collect();
                let Some(key_timeframe) = confluence.key_timeframe() else {
                    return;
                };
                let Some(bar_timestamp) = snapshot
                    .iter()
                    .find(|s| s.timeframe == key_timeframe)
                    .map(|s| s.frame.timestamp)
                else {
                    return;
                };
                detections.push(Detection {
                    kind: AlertKind::Confluence(confluence.condition),
                    timeframe: key_timeframe,
                    timeframes: confluence.timeframes(),
                    bar_timestamp,
                    snapshot,
                });
            }
        }
    }
}

#[async_trait]
impl DetectionJob for RuleSweep {
    fn name(&self) -> &str {
        &self.name
    }

    fn timeframes(&self) -> Vec<Timeframe> {
        let mut timeframes: Vec<Timeframe> =
            self.rules.iter().flat_map(DetectionRule::timeframes).collect();
        timeframes.sort();
        timeframes.dedup();
        timeframes
    }

    async fn detect(&self, ctx: &JobContext, symbol: &str) -> Result<Vec<Detection>> {
        let mut series = BTreeMap::new();
        for timeframe in self.timeframes() {
            series.insert(timeframe, load_series(ctx, symbol, timeframe).await?);
        }

        let evaluator = SignalEvaluator::new(ctx.settings.thresholds.clone());
        let mut detections = Vec::new();
        for rule in &self.rules {
            self.apply(rule, &series, &evaluator, &mut detections);
        }

        debug!(
            job = %self.name,
            symbol = %symbol,
            detections = detections.len(),
            "{}: {} detections for {}",
            self.name,
            detections.len(),
            symbol
        );
        Ok(detections)
    }
}
