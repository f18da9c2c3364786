pub mod error;
pub mod frame;

pub mod momentum;
pub mod trend;

pub use error::IndicatorError;
pub use frame::*;
