//! Domain layer for cron schedule editing
//!
//! Cron grammar and description, schedule models, and the ports the
//! reconciler talks through.

pub mod cron;
pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
