//! Schedule reconciliation state machine.
//!
//! The reconciler owns the single active [`EditSession`] and performs no I/O.
//! Every transition returns the side effects it wants as [`Intent`]s; the
//! caller runs the store calls and feeds each outcome back through
//! [`ScheduleReconciler::apply`] with the generation the intent carried.
//! Opening or closing a session bumps the generation, so responses issued
//! under an earlier session are rejected as stale instead of being applied.

use chrono::{DateTime, Months, Utc};
use tracing::{debug, warn};

use crate::domain::cron::{normalize, CronValidator};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::schedule::{
    LegacySchedule, ScheduleId, ScheduleRecord, ScheduleStatus, SchemaGeneration, UidSchedule,
};
use crate::domain::models::session::{
    CronSlot, EditSession, Intent, ReconcilerState, SessionMode, StoreResponse,
};
use crate::domain::models::workload::WorkloadIdentity;
use crate::domain::ports::schedule_store::StoreError;

/// Pure edit-session state machine.
#[derive(Debug, Clone)]
pub struct ScheduleReconciler {
    state: ReconcilerState,
    generation: u64,
    session: Option<EditSession>,
    projection: Option<ScheduleRecord>,
}

impl Default for ScheduleReconciler {
    fn default() -> Self {
        Self::new()
    }
}

impl ScheduleReconciler {
    pub const fn new() -> Self {
        Self {
            state: ReconcilerState::Closed,
            generation: 0,
            session: None,
            projection: None,
        }
    }

    pub const fn state(&self) -> ReconcilerState {
        self.state
    }

    /// Generation of the current (or most recently closed) session.
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    pub const fn session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    /// Last store-acknowledged record for the most recent workload.
    pub const fn projection(&self) -> Option<&ScheduleRecord> {
        self.projection.as_ref()
    }

    /// Whether `clear` would currently be accepted.
    pub fn can_clear(&self) -> bool {
        self.state == ReconcilerState::UpdateReady
            && self
                .session
                .as_ref()
                .and_then(|s| s.loaded.as_ref())
                .is_some_and(has_clearable_schedule)
    }

    /// Start a session for a workload, replacing any current one.
    pub fn open(&mut self, identity: WorkloadIdentity) -> DomainResult<Vec<Intent>> {
        if let Some(reason) = identity.unresolved_reason() {
            return Err(DomainError::IdentityUnresolved(reason));
        }

        self.generation += 1;
        let generation = self.generation;
        let intent = match identity.uid() {
            Some(uid) => Intent::FetchByUid {
                generation,
                uid: uid.to_string(),
            },
            None => Intent::ScanAll { generation },
        };

        debug!(generation, identity = %identity.label(), "opening schedule session");
        self.session = Some(EditSession::new(generation, identity));
        self.projection = None;
        self.state = ReconcilerState::Loading;
        Ok(vec![intent])
    }

    /// Discard the session and any pending edits. Outstanding responses become stale.
    pub fn close(&mut self) {
        if self.state != ReconcilerState::Closed {
            debug!(generation = self.generation, from = %self.state, "closing schedule session");
        }
        self.generation += 1;
        self.session = None;
        self.state = ReconcilerState::Closed;
    }

    /// Store raw operator text for one cron field. No validation happens here.
    pub fn edit_field(&mut self, slot: CronSlot, raw: impl Into<String>) -> DomainResult<()> {
        self.ready_session("editing")?.set_pending(slot, raw);
        Ok(())
    }

    pub fn save(&mut self) -> DomainResult<Vec<Intent>> {
        self.save_at(Utc::now())
    }

    /// Validate pending fields and emit a create or update.
    ///
    /// Validation failures leave the state untouched and emit nothing. `now`
    /// seeds the start/end bounds of a newly created legacy record.
    pub fn save_at(&mut self, now: DateTime<Utc>) -> DomainResult<Vec<Intent>> {
        let session = self.ready_session("saving")?;
        let schema = session.schema();
        let validator = CronValidator::new(schema);

        let start = validated(&validator, CronSlot::Start, session.pending(CronSlot::Start))?;
        let stop = match schema {
            SchemaGeneration::Uid => {
                validated(&validator, CronSlot::Stop, session.pending(CronSlot::Stop))?
            }
            SchemaGeneration::Legacy => {
                if !normalize(session.pending(CronSlot::Stop)).is_empty() {
                    return Err(DomainError::ValidationFailed(
                        "legacy schedules carry a single cron expression; stop is not supported"
                            .to_string(),
                    ));
                }
                String::new()
            }
        };
        let status = ScheduleStatus::from_crons([start.as_str(), stop.as_str()]);
        let generation = session.generation;

        let intent = match session.mode {
            Some(SessionMode::Update) => {
                let id = session.target_schedule_id.ok_or_else(|| {
                    DomainError::ValidationFailed("loaded schedule has no id".to_string())
                })?;
                let record = build_update(session, id, start, stop, status, now);
                Intent::Update {
                    generation,
                    id,
                    record,
                }
            }
            _ => Intent::Create {
                generation,
                record: build_create(session, start, stop, status, now),
            },
        };

        debug!(generation, status = %status, "saving schedule");
        self.state = ReconcilerState::Saving;
        Ok(vec![intent])
    }

    /// Remove the loaded schedule: clear by uid, or delete the legacy record.
    pub fn clear(&mut self) -> DomainResult<Vec<Intent>> {
        let state = self.state;
        let session = self.ready_session("deleting")?;
        let label = session.identity.label();

        let has_schedule = state == ReconcilerState::UpdateReady
            && session.loaded.as_ref().is_some_and(has_clearable_schedule);
        if !has_schedule {
            return Err(DomainError::NothingToClear(format!(
                "no schedule to remove for {label}"
            )));
        }

        let generation = session.generation;
        let intent = match &session.identity {
            WorkloadIdentity::Uid { uid, .. } => Intent::ClearSchedule {
                generation,
                uid: uid.clone(),
            },
            WorkloadIdentity::Composite { .. } => Intent::DeleteRecord {
                generation,
                id: session.target_schedule_id.ok_or_else(|| {
                    DomainError::NothingToClear(format!("schedule for {label} has no id"))
                })?,
            },
        };

        debug!(generation, identity = %label, "clearing schedule");
        self.state = ReconcilerState::Deleting;
        Ok(vec![intent])
    }

    /// Feed back the outcome of a store intent.
    pub fn apply(&mut self, response: StoreResponse) -> DomainResult<Vec<Intent>> {
        match response {
            StoreResponse::Lookup { generation, result } => self.on_lookup(generation, result),
            StoreResponse::Scan { generation, result } => self.on_scan(generation, result),
            StoreResponse::Saved { generation, result } => self.on_saved(generation, result),
            StoreResponse::Deleted { generation, result } => self.on_deleted(generation, result),
        }
    }

    pub fn on_lookup(
        &mut self,
        generation: u64,
        result: Result<Option<ScheduleRecord>, StoreError>,
    ) -> DomainResult<Vec<Intent>> {
        self.accept(generation, ReconcilerState::Loading)?;
        match result {
            Ok(Some(record)) => Ok(self.enter_update(record)),
            Ok(None) => Ok(self.enter_create()),
            Err(err) if err.is_not_found() => Ok(self.enter_create()),
            Err(err) => Err(self.fail_load(err)),
        }
    }

    /// Legacy lookup: pick the first listed record matching type, name and direction.
    pub fn on_scan(
        &mut self,
        generation: u64,
        result: Result<Vec<ScheduleRecord>, StoreError>,
    ) -> DomainResult<Vec<Intent>> {
        self.accept(generation, ReconcilerState::Loading)?;
        let records = match result {
            Ok(records) => records,
            Err(err) => return Err(self.fail_load(err)),
        };

        let found = self.session.as_ref().and_then(|session| {
            let workload = session.identity.workload();
            let direction = session.identity.direction();
            records
                .into_iter()
                .find(|record| record.belongs_to(workload, direction))
        });

        Ok(match found {
            Some(record) => self.enter_update(record),
            None => self.enter_create(),
        })
    }

    pub fn on_saved(
        &mut self,
        generation: u64,
        result: Result<ScheduleRecord, StoreError>,
    ) -> DomainResult<Vec<Intent>> {
        self.accept(generation, ReconcilerState::Saving)?;
        let mut record = match result {
            Ok(record) => record,
            Err(err) => return Err(self.fail_write(err)),
        };
        record.recompute_status();

        let expected = self
            .session
            .as_ref()
            .filter(|s| s.mode == Some(SessionMode::Update))
            .and_then(|s| s.target_schedule_id);
        if let (Some(expected), Some(actual)) = (expected, record.id()) {
            if expected != actual {
                return Err(self.fail_write(StoreError::Conflict { expected, actual }));
            }
        }

        debug!(generation, id = ?record.id(), "schedule saved");
        self.projection = Some(record);
        self.finish();
        Ok(vec![Intent::RefreshView])
    }

    /// A missing target counts as already clean.
    pub fn on_deleted(
        &mut self,
        generation: u64,
        result: Result<(), StoreError>,
    ) -> DomainResult<Vec<Intent>> {
        self.accept(generation, ReconcilerState::Deleting)?;
        match result {
            Ok(()) => {}
            Err(err) if err.is_not_found() => {}
            Err(err) => return Err(self.fail_write(err)),
        }

        debug!(generation, "schedule cleared");
        self.projection = None;
        self.finish();
        Ok(vec![Intent::RefreshView])
    }

    fn accept(&self, issued: u64, expected: ReconcilerState) -> DomainResult<()> {
        if issued != self.generation || self.state != expected || self.session.is_none() {
            return Err(DomainError::StaleResponse {
                issued,
                current: self.generation,
            });
        }
        Ok(())
    }

    fn ready_session(&mut self, to: &str) -> DomainResult<&mut EditSession> {
        let from = self.state;
        if from.is_awaiting_store() {
            return Err(DomainError::SessionBusy(from.to_string()));
        }
        if !from.is_ready() {
            return Err(invalid_transition(from, to, "no schedule session is ready"));
        }
        self.session
            .as_mut()
            .ok_or_else(|| invalid_transition(from, to, "session is missing"))
    }

    fn enter_update(&mut self, mut record: ScheduleRecord) -> Vec<Intent> {
        record.recompute_status();
        if let Some(session) = self.session.as_mut() {
            session.begin_update(record.clone());
        }
        debug!(generation = self.generation, id = ?record.id(), "existing schedule loaded");
        self.projection = Some(record);
        self.state = ReconcilerState::UpdateReady;
        vec![Intent::RefreshView]
    }

    fn enter_create(&mut self) -> Vec<Intent> {
        if let Some(session) = self.session.as_mut() {
            session.begin_create();
        }
        debug!(generation = self.generation, "no schedule found, creating");
        self.projection = None;
        self.state = ReconcilerState::CreateReady;
        vec![Intent::RefreshView]
    }

    fn fail_load(&mut self, err: StoreError) -> DomainError {
        warn!(generation = self.generation, error = %err, "schedule lookup failed");
        self.state = ReconcilerState::LoadFailed;
        DomainError::Store(err)
    }

    fn fail_write(&mut self, err: StoreError) -> DomainError {
        let ready = self
            .session
            .as_ref()
            .and_then(|s| s.mode)
            .map_or(ReconcilerState::CreateReady, SessionMode::ready_state);
        warn!(generation = self.generation, error = %err, back_to = %ready, "schedule write failed");
        self.state = ready;
        DomainError::Store(err)
    }

    fn finish(&mut self) {
        self.session = None;
        self.state = ReconcilerState::Closed;
    }
}

fn invalid_transition(from: ReconcilerState, to: &str, reason: &str) -> DomainError {
    DomainError::InvalidStateTransition {
        from: from.to_string(),
        to: to.to_string(),
        reason: reason.to_string(),
    }
}

fn validated(validator: &CronValidator, slot: CronSlot, raw: &str) -> DomainResult<String> {
    validator
        .validate(raw)
        .map(|expression| expression.to_string())
        .map_err(|source| DomainError::InvalidCron { slot, source })
}

/// Uid records need both fields set; legacy records their single `cron`.
fn has_clearable_schedule(record: &ScheduleRecord) -> bool {
    match record {
        ScheduleRecord::Uid(r) => !r.cron_start.trim().is_empty() && !r.cron_stop.trim().is_empty(),
        ScheduleRecord::Legacy(r) => !r.cron.trim().is_empty(),
    }
}

fn one_year_after(now: DateTime<Utc>) -> DateTime<Utc> {
    now.checked_add_months(Months::new(12))
        .unwrap_or_else(|| now + chrono::Duration::days(365))
}

/// Fresh record in the session's schema, named after the workload.
fn build_create(
    session: &EditSession,
    start: String,
    stop: String,
    status: ScheduleStatus,
    now: DateTime<Utc>,
) -> ScheduleRecord {
    let identity = &session.identity;
    let workload = identity.workload();
    match identity {
        WorkloadIdentity::Uid { uid, .. } => ScheduleRecord::Uid(UidSchedule {
            id: None,
            name: identity.composite_name(),
            uid: uid.clone(),
            resource_type: Some(workload.resource_type),
            resource_name: Some(workload.name.clone()),
            resource_namespace: Some(workload.namespace.clone()),
            direction: Some(identity.direction()),
            cron_start: start,
            cron_stop: stop,
            status,
            active: true,
            last_update: None,
        }),
        WorkloadIdentity::Composite { .. } => ScheduleRecord::Legacy(LegacySchedule {
            id: None,
            name: identity.composite_name(),
            start_time: Some(now),
            end_time: Some(one_year_after(now)),
            cron: start,
            status,
            active: true,
            resource_type: Some(workload.resource_type),
            resource_name: Some(workload.name.clone()),
            resource_namespace: Some(workload.namespace.clone()),
            direction: Some(identity.direction()),
        }),
    }
}

/// Loaded record with new cron fields. Name, bounds and other fields are preserved.
fn build_update(
    session: &EditSession,
    id: ScheduleId,
    start: String,
    stop: String,
    status: ScheduleStatus,
    now: DateTime<Utc>,
) -> ScheduleRecord {
    let schema = session.schema();
    let loaded = session.loaded.clone().filter(|r| r.generation() == schema);
    let mut record = loaded.unwrap_or_else(|| {
        let mut fresh = build_create(session, String::new(), String::new(), status, now);
        if let Some(name) = session.loaded.as_ref().map(ScheduleRecord::name) {
            match &mut fresh {
                ScheduleRecord::Uid(r) => r.name = name.to_string(),
                ScheduleRecord::Legacy(r) => r.name = name.to_string(),
            }
        }
        fresh
    });

    match &mut record {
        ScheduleRecord::Uid(r) => {
            r.id = Some(id);
            r.cron_start = start;
            r.cron_stop = stop;
            r.status = status;
        }
        ScheduleRecord::Legacy(r) => {
            r.id = Some(id);
            r.cron = start;
            r.status = status;
        }
    }
    record
}
