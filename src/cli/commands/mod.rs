//! CLI command implementations.

pub mod cron;
pub mod schedule;
