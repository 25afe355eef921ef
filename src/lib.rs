//! Cronpilot: cron schedule editing for paused and resumed Kubernetes workloads.
//!
//! The crate is split along hexagonal lines:
//! - [`domain`]: cron grammar, normalization, validation and description,
//!   schedule models and the Schedule Store port
//! - [`services`]: the reconciliation state machine, its async driver and
//!   the schedule catalog
//! - [`adapters`]: HTTP and in-memory Schedule Store implementations
//! - [`infrastructure`]: configuration loading and logging
//! - [`cli`]: the `cronpilot` command-line interface

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

pub use domain::cron::{decode_cron, is_valid_cron, normalize_cron};
pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::schedule::{ScheduleRecord, SchemaGeneration};
pub use services::{ScheduleCatalog, ScheduleEditor, ScheduleReconciler};
