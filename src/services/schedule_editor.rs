//! Async driver that runs reconciler intents against a Schedule Store.

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::session::{CronSlot, Intent, StoreResponse};
use crate::domain::models::workload::WorkloadIdentity;
use crate::domain::ports::schedule_store::ScheduleStore;
use crate::services::schedule_reconciler::ScheduleReconciler;

/// Owns a [`ScheduleReconciler`] and interprets its store intents.
///
/// Each public operation runs until no store call is outstanding and returns
/// the remaining intents (renderer refreshes) to the caller.
pub struct ScheduleEditor<S: ScheduleStore> {
    store: Arc<S>,
    reconciler: ScheduleReconciler,
}

impl<S: ScheduleStore> ScheduleEditor<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            reconciler: ScheduleReconciler::new(),
        }
    }

    pub const fn reconciler(&self) -> &ScheduleReconciler {
        &self.reconciler
    }

    pub async fn open(&mut self, identity: WorkloadIdentity) -> DomainResult<Vec<Intent>> {
        let intents = self.reconciler.open(identity)?;
        self.drive(intents).await
    }

    pub fn edit_field(&mut self, slot: CronSlot, raw: impl Into<String>) -> DomainResult<()> {
        self.reconciler.edit_field(slot, raw)
    }

    pub async fn save(&mut self) -> DomainResult<Vec<Intent>> {
        let intents = self.reconciler.save()?;
        self.drive(intents).await
    }

    pub async fn clear(&mut self) -> DomainResult<Vec<Intent>> {
        let intents = self.reconciler.clear()?;
        self.drive(intents).await
    }

    pub fn close(&mut self) {
        self.reconciler.close();
    }

    /// Issue one intent's store call. Returns `None` for non-store intents.
    pub async fn execute(&self, intent: &Intent) -> Option<StoreResponse> {
        execute_intent(self.store.as_ref(), intent).await
    }

    /// Feed a store response back. Stale responses are logged and dropped.
    pub fn apply(&mut self, response: StoreResponse) -> DomainResult<Vec<Intent>> {
        match self.reconciler.apply(response) {
            Err(DomainError::StaleResponse { issued, current }) => {
                debug!(issued, current, "discarding stale schedule store response");
                Ok(Vec::new())
            }
            other => other,
        }
    }

    async fn drive(&mut self, intents: Vec<Intent>) -> DomainResult<Vec<Intent>> {
        let mut queue: VecDeque<Intent> = intents.into();
        let mut passthrough = Vec::new();
        while let Some(intent) = queue.pop_front() {
            match execute_intent(self.store.as_ref(), &intent).await {
                Some(response) => queue.extend(self.apply(response)?),
                None => passthrough.push(intent),
            }
        }
        Ok(passthrough)
    }
}

/// Run the store call an intent describes, tagging the outcome with its generation.
pub async fn execute_intent<S: ScheduleStore + ?Sized>(
    store: &S,
    intent: &Intent,
) -> Option<StoreResponse> {
    let response = match intent {
        Intent::FetchByUid { generation, uid } => StoreResponse::Lookup {
            generation: *generation,
            result: store.lookup_by_uid(uid).await,
        },
        Intent::ScanAll { generation } => StoreResponse::Scan {
            generation: *generation,
            result: store.list().await,
        },
        Intent::Create { generation, record } => {
            info!(name = %record.name(), "creating schedule");
            StoreResponse::Saved {
                generation: *generation,
                result: store.create(record).await,
            }
        }
        Intent::Update {
            generation,
            id,
            record,
        } => {
            info!(%id, name = %record.name(), "updating schedule");
            StoreResponse::Saved {
                generation: *generation,
                result: store.update(*id, record).await,
            }
        }
        Intent::ClearSchedule { generation, uid } => {
            info!(uid = %uid, "clearing schedule");
            StoreResponse::Deleted {
                generation: *generation,
                result: store.clear_schedule(uid).await,
            }
        }
        Intent::DeleteRecord { generation, id } => {
            info!(%id, "deleting schedule record");
            StoreResponse::Deleted {
                generation: *generation,
                result: store.delete_record(*id).await,
            }
        }
        Intent::RefreshView => return None,
    };
    Some(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryScheduleStore;
    use crate::domain::models::session::ReconcilerState;
    use crate::domain::models::workload::{Direction, ResourceType, Workload};
    use crate::domain::ports::schedule_store::StoreError;

    fn identity(uid: &str) -> WorkloadIdentity {
        WorkloadIdentity::Uid {
            uid: uid.to_string(),
            workload: Workload::new(ResourceType::Deploy, "web", "prod"),
            direction: Direction::Up,
        }
    }

    #[tokio::test]
    async fn test_create_then_reopen_updates() {
        let store = Arc::new(InMemoryScheduleStore::new());
        let mut editor = ScheduleEditor::new(store.clone());

        let intents = editor.open(identity("w1")).await.unwrap();
        assert_eq!(intents, vec![Intent::RefreshView]);
        assert_eq!(editor.reconciler().state(), ReconcilerState::CreateReady);

        editor.edit_field(CronSlot::Start, "0 9 * * 1-5").unwrap();
        editor.save().await.unwrap();
        assert_eq!(editor.reconciler().state(), ReconcilerState::Closed);

        editor.open(identity("w1")).await.unwrap();
        assert_eq!(editor.reconciler().state(), ReconcilerState::UpdateReady);
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_store_failure_leaves_session_open() {
        let store = Arc::new(InMemoryScheduleStore::new());
        let mut editor = ScheduleEditor::new(store.clone());
        editor.open(identity("w1")).await.unwrap();
        editor.edit_field(CronSlot::Start, "*/5").unwrap();

        store
            .fail_next(StoreError::from_status(503, "maintenance"))
            .await;
        let err = editor.save().await.unwrap_err();
        assert_eq!(err.to_string(), "Server error (503): maintenance");
        assert_eq!(editor.reconciler().state(), ReconcilerState::CreateReady);

        editor.save().await.unwrap();
        assert_eq!(editor.reconciler().state(), ReconcilerState::Closed);
    }

    #[tokio::test]
    async fn test_apply_drops_stale_response() {
        let store = Arc::new(InMemoryScheduleStore::new());
        let mut editor = ScheduleEditor::new(store);
        let first = editor.reconciler.open(identity("w1")).unwrap();
        let stale = editor.execute(&first[0]).await.unwrap();
        editor.close();

        assert_eq!(editor.apply(stale).unwrap(), Vec::new());
        assert_eq!(editor.reconciler().state(), ReconcilerState::Closed);
    }
}
