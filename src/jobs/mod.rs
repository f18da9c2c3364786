//! Detection jobs run by the scheduler

pub mod context;
pub mod handlers;
pub mod sweep;
pub mod types;

pub use context::{DetectionSettings, JobContext};
pub use handlers::{publish, run_tick};
pub use sweep::{load_series, DetectionRule, RuleSweep};
pub use types::{Detection, DetectionJob, TickReport};
