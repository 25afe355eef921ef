//! Edit session state and the side-effect intents the reconciler emits.
//!
//! ```text
//!           open()                lookup/scan ok
//! Closed ───────────▶ Loading ─────────────────▶ CreateReady / UpdateReady
//!   ▲                    │                             │         │
//!   │                    │ store error                 │ save()  │ clear()
//!   │                    ▼                             ▼         ▼
//!   │               LoadFailed                      Saving    Deleting
//!   │                                                  │         │
//!   └────────────────────── acknowledged ──────────────┴─────────┘
//! ```
//!
//! A store failure while Saving or Deleting returns to the Ready state the
//! session came from. `close()` is accepted from every state.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::schedule::{ScheduleId, ScheduleRecord, SchemaGeneration};
use super::workload::WorkloadIdentity;
use crate::domain::cron::normalize;
use crate::domain::ports::schedule_store::StoreError;

/// Whether saving will create a new record or update an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    Create,
    Update,
}

impl SessionMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
        }
    }

    /// The Ready state a session in this mode rests in.
    pub const fn ready_state(self) -> ReconcilerState {
        match self {
            Self::Create => ReconcilerState::CreateReady,
            Self::Update => ReconcilerState::UpdateReady,
        }
    }
}

/// Reconciler lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcilerState {
    Closed,
    Loading,
    LoadFailed,
    CreateReady,
    UpdateReady,
    Saving,
    Deleting,
}

impl ReconcilerState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Loading => "loading",
            Self::LoadFailed => "load_failed",
            Self::CreateReady => "create_ready",
            Self::UpdateReady => "update_ready",
            Self::Saving => "saving",
            Self::Deleting => "deleting",
        }
    }

    /// A store call is outstanding.
    pub const fn is_awaiting_store(&self) -> bool {
        matches!(self, Self::Loading | Self::Saving | Self::Deleting)
    }

    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::CreateReady | Self::UpdateReady)
    }
}

impl fmt::Display for ReconcilerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which pending cron field an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CronSlot {
    Start,
    Stop,
}

impl CronSlot {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
        }
    }
}

impl fmt::Display for CronSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client-local state of one edit interaction.
///
/// Pending fields hold raw operator text; they are normalized and validated
/// only when saving. In a legacy session the start slot maps to the single
/// `cron` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditSession {
    pub generation: u64,
    pub identity: WorkloadIdentity,
    pub mode: Option<SessionMode>,
    pub target_schedule_id: Option<ScheduleId>,
    pub pending_cron_start: String,
    pub pending_cron_stop: String,
    /// Record mirrored on open, kept so updates preserve fields the editor does not own.
    pub loaded: Option<ScheduleRecord>,
}

impl EditSession {
    pub const fn new(generation: u64, identity: WorkloadIdentity) -> Self {
        Self {
            generation,
            identity,
            mode: None,
            target_schedule_id: None,
            pending_cron_start: String::new(),
            pending_cron_stop: String::new(),
            loaded: None,
        }
    }

    /// Schema generation implied by how the workload is identified.
    pub const fn schema(&self) -> SchemaGeneration {
        match self.identity {
            WorkloadIdentity::Uid { .. } => SchemaGeneration::Uid,
            WorkloadIdentity::Composite { .. } => SchemaGeneration::Legacy,
        }
    }

    /// Enter create mode with Unscheduled fields.
    pub fn begin_create(&mut self) {
        self.mode = Some(SessionMode::Create);
        self.target_schedule_id = None;
        self.pending_cron_start.clear();
        self.pending_cron_stop.clear();
        self.loaded = None;
    }

    /// Enter update mode, mirroring the record's normalized cron fields.
    pub fn begin_update(&mut self, record: ScheduleRecord) {
        let (start, stop) = match &record {
            ScheduleRecord::Uid(r) => (normalize(&r.cron_start), normalize(&r.cron_stop)),
            ScheduleRecord::Legacy(r) => (normalize(&r.cron), String::new()),
        };
        self.mode = Some(SessionMode::Update);
        self.target_schedule_id = record.id();
        self.pending_cron_start = start;
        self.pending_cron_stop = stop;
        self.loaded = Some(record);
    }

    pub fn pending(&self, slot: CronSlot) -> &str {
        match slot {
            CronSlot::Start => &self.pending_cron_start,
            CronSlot::Stop => &self.pending_cron_stop,
        }
    }

    pub fn set_pending(&mut self, slot: CronSlot, raw: impl Into<String>) {
        match slot {
            CronSlot::Start => self.pending_cron_start = raw.into(),
            CronSlot::Stop => self.pending_cron_stop = raw.into(),
        }
    }
}

/// Side effect requested by a reconciler transition.
///
/// Store intents carry the session generation they were issued under; the
/// matching response must be fed back with the same tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    FetchByUid { generation: u64, uid: String },
    ScanAll { generation: u64 },
    Create { generation: u64, record: ScheduleRecord },
    Update { generation: u64, id: ScheduleId, record: ScheduleRecord },
    ClearSchedule { generation: u64, uid: String },
    DeleteRecord { generation: u64, id: ScheduleId },
    /// Ask the renderer to redraw from the projection.
    RefreshView,
}

impl Intent {
    /// Whether interpreting this intent means calling the Schedule Store.
    pub const fn is_store_call(&self) -> bool {
        !matches!(self, Self::RefreshView)
    }

    pub const fn generation(&self) -> Option<u64> {
        match self {
            Self::FetchByUid { generation, .. }
            | Self::ScanAll { generation }
            | Self::Create { generation, .. }
            | Self::Update { generation, .. }
            | Self::ClearSchedule { generation, .. }
            | Self::DeleteRecord { generation, .. } => Some(*generation),
            Self::RefreshView => None,
        }
    }
}

/// Outcome of a store intent, tagged with the generation it was issued under.
#[derive(Debug, Clone)]
pub enum StoreResponse {
    Lookup {
        generation: u64,
        result: Result<Option<ScheduleRecord>, StoreError>,
    },
    Scan {
        generation: u64,
        result: Result<Vec<ScheduleRecord>, StoreError>,
    },
    Saved {
        generation: u64,
        result: Result<ScheduleRecord, StoreError>,
    },
    Deleted {
        generation: u64,
        result: Result<(), StoreError>,
    },
}

impl StoreResponse {
    pub const fn generation(&self) -> u64 {
        match self {
            Self::Lookup { generation, .. }
            | Self::Scan { generation, .. }
            | Self::Saved { generation, .. }
            | Self::Deleted { generation, .. } => *generation,
        }
    }
}
