//! Adapters speaking HTTP to external services.

pub mod schedule_store;

pub use schedule_store::HttpScheduleStore;
