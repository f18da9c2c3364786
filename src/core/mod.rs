//! Process-level primitives: scheduling, wiring and the instance lock

pub mod lock;
pub mod runtime;
pub mod scheduler;

pub use lock::InstanceLock;
pub use runtime::*;
pub use scheduler::*;
