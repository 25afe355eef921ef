//! In-memory Schedule Store.
//!
//! Backs tests and offline CLI use. Behaves like the HTTP backend: ids are
//! assigned on create, a missing update target is `NotFound`, and clearing
//! or deleting a missing target is reported as `NotFound` for the caller to
//! treat as already clean.

use std::collections::VecDeque;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, RwLock};

use crate::domain::models::schedule::{ScheduleId, ScheduleRecord};
use crate::domain::ports::schedule_store::{ScheduleStore, StoreError};

#[derive(Debug, Default)]
struct Inner {
    records: Vec<ScheduleRecord>,
    next_id: i64,
}

impl Inner {
    fn assign_id(&mut self, record: &mut ScheduleRecord) -> ScheduleId {
        self.next_id += 1;
        let id = ScheduleId(self.next_id);
        record.set_id(id);
        id
    }
}

/// Schedule Store kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryScheduleStore {
    inner: RwLock<Inner>,
    failures: Mutex<VecDeque<StoreError>>,
}

impl InMemoryScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with records. Records without an id get one.
    pub fn with_records(records: impl IntoIterator<Item = ScheduleRecord>) -> Self {
        let mut inner = Inner::default();
        for mut record in records {
            match record.id() {
                Some(id) => inner.next_id = inner.next_id.max(id.0),
                None => {
                    inner.assign_id(&mut record);
                }
            }
            inner.records.push(record);
        }
        Self {
            inner: RwLock::new(inner),
            failures: Mutex::new(VecDeque::new()),
        }
    }

    /// Make the next store call fail with `err`.
    pub async fn fail_next(&self, err: StoreError) {
        self.failures.lock().await.push_back(err);
    }

    async fn injected_failure(&self) -> Result<(), StoreError> {
        match self.failures.lock().await.pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ScheduleStore for InMemoryScheduleStore {
    async fn lookup_by_uid(&self, uid: &str) -> Result<Option<ScheduleRecord>, StoreError> {
        self.injected_failure().await?;
        let inner = self.inner.read().await;
        Ok(inner
            .records
            .iter()
            .find(|r| r.uid() == Some(uid))
            .cloned())
    }

    async fn list(&self) -> Result<Vec<ScheduleRecord>, StoreError> {
        self.injected_failure().await?;
        Ok(self.inner.read().await.records.clone())
    }

    async fn create(&self, record: &ScheduleRecord) -> Result<ScheduleRecord, StoreError> {
        self.injected_failure().await?;
        let mut inner = self.inner.write().await;
        if let Some(uid) = record.uid() {
            if inner.records.iter().any(|r| r.uid() == Some(uid)) {
                return Err(StoreError::InvalidRequest(format!(
                    "schedule for uid {uid} already exists"
                )));
            }
        }

        let mut stored = record.clone();
        inner.assign_id(&mut stored);
        if let ScheduleRecord::Uid(r) = &mut stored {
            r.last_update = Some(Utc::now());
        }
        inner.records.push(stored.clone());
        Ok(stored)
    }

    async fn update(
        &self,
        id: ScheduleId,
        record: &ScheduleRecord,
    ) -> Result<ScheduleRecord, StoreError> {
        self.injected_failure().await?;
        let mut inner = self.inner.write().await;
        let slot = inner
            .records
            .iter_mut()
            .find(|r| r.id() == Some(id))
            .ok_or_else(|| StoreError::NotFound(format!("schedule {id}")))?;

        let mut stored = record.clone();
        stored.set_id(id);
        if let ScheduleRecord::Uid(r) = &mut stored {
            r.last_update = Some(Utc::now());
        }
        *slot = stored.clone();
        Ok(stored)
    }

    async fn clear_schedule(&self, uid: &str) -> Result<(), StoreError> {
        self.injected_failure().await?;
        let mut inner = self.inner.write().await;
        let record = inner
            .records
            .iter_mut()
            .find(|r| r.uid() == Some(uid))
            .ok_or_else(|| StoreError::NotFound(format!("schedule for uid {uid}")))?;
        record.clear_crons();
        Ok(())
    }

    async fn delete_record(&self, id: ScheduleId) -> Result<(), StoreError> {
        self.injected_failure().await?;
        let mut inner = self.inner.write().await;
        let before = inner.records.len();
        inner.records.retain(|r| r.id() != Some(id));
        if inner.records.len() == before {
            return Err(StoreError::NotFound(format!("schedule {id}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::schedule::{ScheduleStatus, UidSchedule};

    fn uid_record(uid: &str, start: &str) -> ScheduleRecord {
        ScheduleRecord::Uid(UidSchedule {
            id: None,
            name: format!("deploy-{uid}-up"),
            uid: uid.to_string(),
            resource_type: None,
            resource_name: None,
            resource_namespace: None,
            direction: None,
            cron_start: start.to_string(),
            cron_stop: String::new(),
            status: ScheduleStatus::from_crons([start]),
            active: true,
            last_update: None,
        })
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let store = InMemoryScheduleStore::new();
        let first = store.create(&uid_record("a", "0 0 * * *")).await.unwrap();
        let second = store.create(&uid_record("b", "")).await.unwrap();
        assert_eq!(first.id(), Some(ScheduleId(1)));
        assert_eq!(second.id(), Some(ScheduleId(2)));
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_uid() {
        let store = InMemoryScheduleStore::with_records([uid_record("a", "")]);
        let err = store.create(&uid_record("a", "* * * * *")).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let store = InMemoryScheduleStore::new();
        let err = store
            .update(ScheduleId(9), &uid_record("a", ""))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_clear_keeps_record_but_empties_crons() {
        let store = InMemoryScheduleStore::with_records([uid_record("a", "0 0 * * *")]);
        store.clear_schedule("a").await.unwrap();
        let record = store.lookup_by_uid("a").await.unwrap().unwrap();
        assert_eq!(record.cron_fields(), vec!["", ""]);
        assert_eq!(record.stored_status(), ScheduleStatus::NotScheduled);
    }

    #[tokio::test]
    async fn test_seeded_ids_are_not_reused() {
        let mut seeded = uid_record("a", "");
        seeded.set_id(ScheduleId(40));
        let store = InMemoryScheduleStore::with_records([seeded]);
        let created = store.create(&uid_record("b", "")).await.unwrap();
        assert_eq!(created.id(), Some(ScheduleId(41)));
        store.delete_record(ScheduleId(40)).await.unwrap();
        assert!(store.delete_record(ScheduleId(40)).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_injected_failure_applies_once() {
        let store = InMemoryScheduleStore::new();
        store.fail_next(StoreError::Timeout).await;
        assert_eq!(store.list().await.unwrap_err(), StoreError::Timeout);
        assert!(store.list().await.unwrap().is_empty());
    }
}
