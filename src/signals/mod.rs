//! Signal, composite, confluence and screen evaluation over indicator series.

pub mod composite;
pub mod confluence;
pub mod divergence;
pub mod evaluator;
pub mod screens;
pub mod thresholds;

pub use composite::{
    evaluate_composite, Comparison, CompositeRule, IndicatorField, IndicatorThreshold,
    TimeframeView,
};
pub use confluence::{evaluate_confluence, ConfluenceLeg, ConfluenceRule, LegCheck};
pub use divergence::{detect_divergence, Divergence, DivergenceKind};
pub use evaluator::{crossed_down, crossed_up, SignalEvaluator, SignalSet};
pub use screens::evaluate_screen;
pub use thresholds::SignalThresholds;
