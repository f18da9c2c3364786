//! Single-timeframe screens on the latest closed bar

use crate::models::indicators::IndicatorSeries;
use crate::models::signal::ScreenCondition;
use crate::signals::thresholds::SignalThresholds;

/// Evaluates `condition` on bar `index`. Bars inside the warm-up never match.
pub fn evaluate_screen(
    condition: ScreenCondition,
    series: &IndicatorSeries,
    index: usize,
    thresholds: &SignalThresholds,
) -> bool {
    if index < series.warmup {
        return false;
    }
    let Some(frame) = series.frames.get(index) else {
        return false;
    };

    match condition {
        ScreenCondition::BuyOpportunity => match (frame.rsi, frame.ema_fast, frame.ema_slow) {
            (Some(rsi), Some(fast), Some(slow)) => rsi <= thresholds.rsi_oversold && fast > slow,
            _ => false,
        },
        ScreenCondition::RsiExtremeOversold => frame
            .rsi
            .is_some_and(|rsi| rsi <= thresholds.rsi_extreme_oversold),
    }
}
