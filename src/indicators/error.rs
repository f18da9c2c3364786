use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndicatorError {
    #[error("insufficient data: need {required} candles, got {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("invalid indicator parameter '{name}': lookback must be at least 1")]
    InvalidParameter { name: &'static str },
}
