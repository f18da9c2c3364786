//! Signal thresholds

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalThresholds {
    /// wt1 must be below this on the bar before an upward cross.
    pub oversold: f64,
    /// wt1 must be above this on the bar before a downward cross.
    pub overbought: f64,
    pub rsi_oversold: f64,
    pub rsi_extreme_oversold: f64,
    /// 4h RSI ceiling for the short-term downtrend composite.
    pub downtrend_rsi_max: f64,
    /// Bars required on each side of a price pivot.
    pub pivot_window: usize,
    /// How far back to look for the pivot a new one is compared against.
    pub divergence_range: usize,
    /// Optional wt1 floor at the newer pivot for bearish divergence.
    #[serde(default)]
    pub bearish_divergence_min: Option<f64>,
    /// Optional wt1 ceiling at the newer pivot for bullish divergence.
    #[serde(default)]
    pub bullish_divergence_max: Option<f64>,
}

impl Default for SignalThresholds {
    fn default() -> Self {
        Self {
            oversold: -60.0,
            overbought: 60.0,
            rsi_oversold: 30.0,
            rsi_extreme_oversold: 22.0,
            downtrend_rsi_max: 45.0,
            pivot_window: 2,
            divergence_range: 60,
            bearish_divergence_min: None,
            bullish_divergence_max: None,
        }
    }
}
