//! Shared data models spanning the engine layers.

pub mod indicators;
pub mod signal;
pub mod timeframe;

pub use indicators::{closed_bars, Candle, IndicatorFrame, IndicatorParams, IndicatorSeries};
pub use signal::{
    AlertEvent, AlertKey, AlertKind, CompositeCondition, FrameSnapshot, ScreenCondition,
    SignalKind,
};
pub use timeframe::Timeframe;
