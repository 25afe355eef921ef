//! Port trait definitions (Hexagonal Architecture)
//!
//! The domain depends only on these interfaces; adapters implement them.

pub mod schedule_store;

pub use schedule_store::{ScheduleStore, StoreError};
