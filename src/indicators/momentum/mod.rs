//! Momentum indicators: RSI, WaveTrend

pub mod rsi;
pub mod wavetrend;

pub use rsi::*;
pub use wavetrend::*;
