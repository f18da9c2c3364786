//! Alert deduplication

pub mod store;

pub use store::AlertStore;
