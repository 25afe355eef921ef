//! Read-only listing of stored schedules for renderers.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::cron::CronDecoder;
use crate::domain::errors::DomainResult;
use crate::domain::models::schedule::{
    ScheduleId, ScheduleRecord, ScheduleStatus, SchemaGeneration,
};
use crate::domain::models::workload::{Direction, ResourceType};
use crate::domain::ports::schedule_store::ScheduleStore;

/// One row of the schedule table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleView {
    pub id: Option<ScheduleId>,
    pub name: String,
    pub schema: SchemaGeneration,
    pub uid: Option<String>,
    pub resource_type: Option<ResourceType>,
    pub resource_name: Option<String>,
    pub namespace: Option<String>,
    pub direction: Option<Direction>,
    pub cron_start: String,
    pub start_description: String,
    /// Absent for legacy records, which carry a single expression.
    pub cron_stop: Option<String>,
    pub stop_description: Option<String>,
    /// Status recomputed from the cron fields.
    pub status: ScheduleStatus,
    pub stored_status: ScheduleStatus,
    /// Stored status disagrees with the cron fields.
    pub drifted: bool,
    pub active: bool,
}

impl ScheduleView {
    pub fn from_record(record: &ScheduleRecord) -> Self {
        let decoder = CronDecoder::new(record.generation());
        let workload = record.workload();
        let (cron_start, cron_stop) = match record {
            ScheduleRecord::Uid(r) => (r.cron_start.clone(), Some(r.cron_stop.clone())),
            ScheduleRecord::Legacy(r) => (r.cron.clone(), None),
        };

        Self {
            id: record.id(),
            name: record.name().to_string(),
            schema: record.generation(),
            uid: record.uid().map(str::to_string),
            resource_type: workload.as_ref().map(|w| w.resource_type),
            resource_name: workload.as_ref().map(|w| w.name.clone()),
            namespace: workload
                .as_ref()
                .map(|w| w.namespace.clone())
                .filter(|ns| !ns.is_empty()),
            direction: record.resolved_direction(),
            start_description: decoder.decode(&cron_start),
            stop_description: cron_stop.as_deref().map(|stop| decoder.decode(stop)),
            cron_start,
            cron_stop,
            status: record.computed_status(),
            stored_status: record.stored_status(),
            drifted: record.status_drifted(),
            active: record.active(),
        }
    }

    /// `type/name` when the workload is known, else the record name.
    pub fn workload_label(&self) -> String {
        match (&self.resource_type, &self.resource_name) {
            (Some(resource_type), Some(name)) => format!("{resource_type}/{name}"),
            _ => self.name.clone(),
        }
    }
}

/// Lists schedules from a store as [`ScheduleView`] rows.
pub struct ScheduleCatalog<S: ScheduleStore> {
    store: Arc<S>,
}

impl<S: ScheduleStore> ScheduleCatalog<S> {
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> DomainResult<Vec<ScheduleView>> {
        let records = self.store.list().await?;
        Ok(records.iter().map(ScheduleView::from_record).collect())
    }

    /// Rows whose stored status disagrees with their cron fields.
    pub async fn drifted(&self) -> DomainResult<Vec<ScheduleView>> {
        Ok(self.list().await?.into_iter().filter(|v| v.drifted).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryScheduleStore;
    use crate::domain::models::schedule::{LegacySchedule, UidSchedule};

    fn records() -> Vec<ScheduleRecord> {
        vec![
            ScheduleRecord::Legacy(LegacySchedule {
                id: Some(ScheduleId(1)),
                name: "sts-redis-cache-down".to_string(),
                start_time: None,
                end_time: None,
                cron: "0 0 * * *".to_string(),
                status: ScheduleStatus::Scheduled,
                active: true,
                resource_type: None,
                resource_name: None,
                resource_namespace: None,
                direction: None,
            }),
            ScheduleRecord::Uid(UidSchedule {
                id: Some(ScheduleId(2)),
                name: "deploy-web-up".to_string(),
                uid: "w1".to_string(),
                resource_type: Some(ResourceType::Deploy),
                resource_name: Some("web".to_string()),
                resource_namespace: Some("prod".to_string()),
                direction: Some(Direction::Up),
                cron_start: String::new(),
                cron_stop: String::new(),
                status: ScheduleStatus::Scheduled,
                active: false,
                last_update: None,
            }),
        ]
    }

    #[tokio::test]
    async fn test_list_decodes_and_resolves_workloads() {
        let catalog = ScheduleCatalog::new(Arc::new(InMemoryScheduleStore::with_records(records())));
        let views = catalog.list().await.unwrap();

        assert_eq!(views.len(), 2);
        let legacy = &views[0];
        assert_eq!(legacy.workload_label(), "sts/redis-cache");
        assert_eq!(legacy.direction, Some(Direction::Down));
        assert_eq!(legacy.namespace, None);
        assert_eq!(legacy.start_description, "runs at midnight every day");
        assert_eq!(legacy.stop_description, None);
        assert!(!legacy.drifted);

        let uid = &views[1];
        assert_eq!(uid.start_description, "not scheduled");
        assert_eq!(uid.stop_description.as_deref(), Some("not scheduled"));
        assert_eq!(uid.status, ScheduleStatus::NotScheduled);
        assert!(uid.drifted);
    }

    #[tokio::test]
    async fn test_drifted_filters_rows() {
        let catalog = ScheduleCatalog::new(Arc::new(InMemoryScheduleStore::with_records(records())));
        let drifted = catalog.drifted().await.unwrap();
        assert_eq!(drifted.len(), 1);
        assert_eq!(drifted[0].uid.as_deref(), Some("w1"));
    }
}
