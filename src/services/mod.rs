//! Application services built on the domain ports.

pub mod schedule_catalog;
pub mod schedule_editor;
pub mod schedule_reconciler;

pub use schedule_catalog::{ScheduleCatalog, ScheduleView};
pub use schedule_editor::{execute_intent, ScheduleEditor};
pub use schedule_reconciler::ScheduleReconciler;
