//! Domain errors for cron validation and schedule reconciliation.

use thiserror::Error;

use crate::domain::cron::CronError;
use crate::domain::models::session::CronSlot;
use crate::domain::ports::schedule_store::StoreError;

/// Domain-level errors surfaced by the reconciler and its drivers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Invalid {slot} cron: {source}")]
    InvalidCron {
        slot: CronSlot,
        #[source]
        source: CronError,
    },

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Workload identity unresolved: {0}")]
    IdentityUnresolved(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Stale response for session {issued} (current session {current})")]
    StaleResponse { issued: u64, current: u64 },

    #[error("A store request is already in flight ({0})")]
    SessionBusy(String),

    #[error("Invalid state transition from {from} to {to}: {reason}")]
    InvalidStateTransition { from: String, to: String, reason: String },

    #[error("Nothing to clear: {0}")]
    NothingToClear(String),
}

impl DomainError {
    /// Validation and identity failures never reach the store.
    pub const fn is_local(&self) -> bool {
        matches!(
            self,
            Self::InvalidCron { .. } | Self::ValidationFailed(_) | Self::IdentityUnresolved(_)
        )
    }

    /// Stale responses are discarded without telling the operator.
    pub const fn is_user_visible(&self) -> bool {
        !matches!(self, Self::StaleResponse { .. })
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
