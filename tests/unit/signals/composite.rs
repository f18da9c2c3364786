//! Unit tests for cross-timeframe composites

use crate::support::{blank_frame, single_frame_series, wavetrend_series};
use cipherwatch::models::indicators::{IndicatorFrame, IndicatorSeries};
use cipherwatch::models::signal::{CompositeCondition, SignalKind};
use cipherwatch::models::timeframe::Timeframe;
use cipherwatch::signals::{
    evaluate_composite, Comparison, CompositeRule, IndicatorField, IndicatorThreshold,
    SignalEvaluator, SignalThresholds, TimeframeView,
};

fn rsi_series(rsi: f64) -> IndicatorSeries {
    single_frame_series(IndicatorFrame {
        rsi: Some(rsi),
        ..blank_frame(0)
    })
}

fn red_circle_series() -> IndicatorSeries {
    wavetrend_series(&[(65.0, 62.0), (58.0, 60.0)], 50.0, 0)
}

fn green_circle_series() -> IndicatorSeries {
    wavetrend_series(&[(-65.0, -62.0), (-58.0, -60.0)], 50.0, 0)
}

fn downtrend(rsi_4h: f64, one_hour: &IndicatorSeries) -> bool {
    let rule = CompositeRule::for_condition(
        CompositeCondition::ShortTermDowntrend,
        &SignalThresholds::default(),
    );
    let four_hour = rsi_series(rsi_4h);
    let threshold_view = TimeframeView::latest(Timeframe::Hour4, &four_hour).unwrap();
    let signal_view = TimeframeView::latest(Timeframe::Hour1, one_hour).unwrap();
    evaluate_composite(&rule, &SignalEvaluator::default(), &threshold_view, &signal_view)
}

#[test]
fn test_short_term_downtrend_rule_shape() {
    let rule = CompositeRule::for_condition(
        CompositeCondition::ShortTermDowntrend,
        &SignalThresholds::default(),
    );
    assert_eq!(rule.threshold_timeframe, Timeframe::Hour4);
    assert_eq!(rule.signal_timeframe, Timeframe::Hour1);
    assert_eq!(rule.signal, SignalKind::RedCircle);
    assert_eq!(rule.threshold.value, 45.0);
}

#[test]
fn test_short_term_downtrend_true_with_low_rsi() {
    assert!(downtrend(40.0, &red_circle_series()));
}

#[test]
fn test_short_term_downtrend_false_with_high_rsi() {
    assert!(!downtrend(50.0, &red_circle_series()));
}

#[test]
fn test_short_term_downtrend_needs_red_circle() {
    assert!(!downtrend(40.0, &green_circle_series()));
}

#[test]
fn test_oversold_bounce() {
    let rule = CompositeRule::for_condition(
        CompositeCondition::OversoldBounce,
        &SignalThresholds::default(),
    );
    let four_hour = rsi_series(25.0);
    let one_hour = green_circle_series();
    let threshold_view = TimeframeView::latest(Timeframe::Hour4, &four_hour).unwrap();
    let signal_view = TimeframeView::latest(Timeframe::Hour1, &one_hour).unwrap();
    assert!(evaluate_composite(
        &rule,
        &SignalEvaluator::default(),
        &threshold_view,
        &signal_view
    ));
}

#[test]
fn test_threshold_view_inside_warmup() {
    let rule = CompositeRule::for_condition(
        CompositeCondition::ShortTermDowntrend,
        &SignalThresholds::default(),
    );
    let mut four_hour = rsi_series(40.0);
    four_hour.warmup = 5;
    let one_hour = red_circle_series();
    let threshold_view = TimeframeView::latest(Timeframe::Hour4, &four_hour).unwrap();
    let signal_view = TimeframeView::latest(Timeframe::Hour1, &one_hour).unwrap();
    assert!(!evaluate_composite(
        &rule,
        &SignalEvaluator::default(),
        &threshold_view,
        &signal_view
    ));
}

#[test]
fn test_undefined_value_never_matches() {
    let threshold = IndicatorThreshold {
        field: IndicatorField::Rsi,
        comparison: Comparison::LessThan,
        value: 100.0,
    };
    assert!(!threshold.matches(&blank_frame(0)));
}

#[test]
fn test_comparisons() {
    assert!(Comparison::LessOrEqual.holds(30.0, 30.0));
    assert!(!Comparison::LessThan.holds(30.0, 30.0));
    assert!(Comparison::GreaterOrEqual.holds(30.0, 30.0));
    assert!(!Comparison::GreaterThan.holds(30.0, 30.0));
}

#[test]
fn test_empty_series_has_no_view() {
    let empty = IndicatorSeries {
        frames: Vec::new(),
        warmup: 0,
    };
    assert!(TimeframeView::latest(Timeframe::Hour1, &empty).is_none());
}
