//! Port for the external Schedule Store.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::models::schedule::{ScheduleId, ScheduleRecord};

/// Failures talking to the Schedule Store. Messages are surfaced verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The addressed record does not exist (HTTP 404)
    #[error("Schedule not found: {0}")]
    NotFound(String),

    /// The store refused the payload (HTTP 400, 422)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The store acknowledged a different record than the one addressed
    #[error("Schedule conflict: expected id {expected}, store returned {actual}")]
    Conflict { expected: ScheduleId, actual: ScheduleId },

    /// Server-side failure (HTTP 5xx)
    #[error("Server error ({status}): {body}")]
    Server { status: u16, body: String },

    /// Any other non-success status
    #[error("Unexpected response ({status}): {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// Connection failure
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timeout")]
    Timeout,

    /// Response body could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),
}

impl StoreError {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        match status {
            400 | 422 => Self::InvalidRequest(body),
            404 => Self::NotFound(body),
            500..=599 => Self::Server { status, body },
            _ => Self::UnexpectedStatus { status, body },
        }
    }

    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// CRUD interface the reconciler depends on.
///
/// `clear_schedule` and `delete_record` treat a missing target as success.
/// `update` reports a missing target as [`StoreError::NotFound`].
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// Look up the record attached to a workload uid.
    async fn lookup_by_uid(&self, uid: &str) -> Result<Option<ScheduleRecord>, StoreError>;

    /// List every record in store order.
    async fn list(&self) -> Result<Vec<ScheduleRecord>, StoreError>;

    /// Persist a new record, returning it with its assigned id.
    async fn create(&self, record: &ScheduleRecord) -> Result<ScheduleRecord, StoreError>;

    /// Replace the record with the given id.
    async fn update(
        &self,
        id: ScheduleId,
        record: &ScheduleRecord,
    ) -> Result<ScheduleRecord, StoreError>;

    /// Empty both cron fields of the uid's record.
    async fn clear_schedule(&self, uid: &str) -> Result<(), StoreError>;

    /// Remove a record entirely.
    async fn delete_record(&self, id: ScheduleId) -> Result<(), StoreError>;
}
