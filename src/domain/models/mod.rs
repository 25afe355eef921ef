pub mod config;
pub mod schedule;
pub mod session;
pub mod workload;

pub use config::{Config, LoggingConfig, StoreConfig};
pub use schedule::{
    LegacySchedule, ScheduleId, ScheduleRecord, ScheduleStatus, SchemaGeneration, UidSchedule,
};
pub use session::{
    CronSlot, EditSession, Intent, ReconcilerState, SessionMode, StoreResponse,
};
pub use workload::{
    composite_name, parse_composite_name, Direction, ResourceType, Workload, WorkloadIdentity,
};
