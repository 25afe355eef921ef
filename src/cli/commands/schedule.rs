//! Schedule CLI commands: list, show, set and clear workload schedules.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::adapters::http::HttpScheduleStore;
use crate::cli::display::{colorize_status, list_table, render_list};
use crate::cli::output::{output, truncate, CommandOutput};
use crate::domain::models::config::Config;
use crate::domain::models::schedule::SchemaGeneration;
use crate::domain::models::session::{CronSlot, ReconcilerState, SessionMode};
use crate::domain::models::workload::{Direction, ResourceType, Workload, WorkloadIdentity};
use crate::domain::ports::schedule_store::ScheduleStore;
use crate::services::schedule_catalog::{ScheduleCatalog, ScheduleView};
use crate::services::schedule_editor::ScheduleEditor;

#[derive(Args, Debug)]
pub struct ScheduleArgs {
    /// Backend schema generation (uid or legacy); overrides store.schema
    #[arg(long, global = true, value_parser = parse_schema)]
    pub schema: Option<SchemaGeneration>,

    #[command(subcommand)]
    pub command: ScheduleCommands,
}

#[derive(Subcommand, Debug)]
pub enum ScheduleCommands {
    /// List every stored schedule
    List,

    /// Show the schedule attached to a workload
    Show {
        #[command(flatten)]
        workload: WorkloadArgs,
    },

    /// Create or update a workload's schedule
    Set {
        #[command(flatten)]
        workload: WorkloadArgs,

        /// Start expression ("" to unschedule)
        #[arg(long)]
        start: Option<String>,

        /// Stop expression ("" to unschedule, uid schema only)
        #[arg(long)]
        stop: Option<String>,
    },

    /// Remove a workload's schedule
    Clear {
        #[command(flatten)]
        workload: WorkloadArgs,
    },
}

/// Identifies the workload being edited.
#[derive(Args, Debug, Clone)]
pub struct WorkloadArgs {
    /// Workload uid (required for the uid schema)
    #[arg(long)]
    pub uid: Option<String>,

    /// Workload type: deploy, sts or ds
    #[arg(long = "type", value_name = "TYPE", value_parser = parse_resource_type)]
    pub resource_type: ResourceType,

    /// Workload name
    #[arg(long)]
    pub name: String,

    /// Workload namespace
    #[arg(long, default_value = "default")]
    pub namespace: String,

    /// Lifecycle direction the schedule drives: up or down
    #[arg(long, default_value = "up", value_parser = parse_direction)]
    pub direction: Direction,
}

impl WorkloadArgs {
    /// Build the identity the given schema generation keys records by.
    pub fn identity(&self, schema: SchemaGeneration) -> Result<WorkloadIdentity> {
        let workload = Workload::new(self.resource_type, self.name.clone(), self.namespace.clone());
        match schema {
            SchemaGeneration::Uid => {
                let Some(uid) = self.uid.clone() else {
                    bail!("--uid is required with the uid schema (use --schema legacy to look up by name)");
                };
                Ok(WorkloadIdentity::Uid {
                    uid,
                    workload,
                    direction: self.direction,
                })
            }
            SchemaGeneration::Legacy => Ok(WorkloadIdentity::Composite {
                workload,
                direction: self.direction,
            }),
        }
    }
}

fn parse_schema(s: &str) -> Result<SchemaGeneration, String> {
    SchemaGeneration::from_str(s).ok_or_else(|| format!("unknown schema '{s}' (expected uid or legacy)"))
}

fn parse_resource_type(s: &str) -> Result<ResourceType, String> {
    ResourceType::from_str(s).ok_or_else(|| format!("unknown workload type '{s}' (expected deploy, sts or ds)"))
}

fn parse_direction(s: &str) -> Result<Direction, String> {
    Direction::from_str(s).ok_or_else(|| format!("unknown direction '{s}' (expected up or down)"))
}

// -- Output structs --

#[derive(Debug, Serialize)]
pub struct ScheduleListOutput {
    pub schedules: Vec<ScheduleView>,
    pub total: usize,
}

impl CommandOutput for ScheduleListOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["id", "workload", "dir", "start", "stop", "status"]);
        for view in &self.schedules {
            let status = if view.drifted {
                format!("{} (stored: {})", view.status, view.stored_status)
            } else {
                view.status.to_string()
            };
            table.add_row(vec![
                view.id.map(|id| id.to_string()).unwrap_or_default(),
                truncate(&view.workload_label(), 32),
                view.direction.map(|d| d.to_string()).unwrap_or_default(),
                truncate(&view.start_description, 40),
                view.stop_description
                    .as_deref()
                    .map(|d| truncate(d, 40))
                    .unwrap_or_else(|| "-".to_string()),
                status,
            ]);
        }
        render_list("schedule", &table, self.total)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
pub struct SessionOutput {
    pub workload: String,
    pub state: ReconcilerState,
    pub mode: Option<SessionMode>,
    pub can_clear: bool,
    pub schedule: Option<ScheduleView>,
}

impl CommandOutput for SessionOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![
            format!("Workload: {}", self.workload),
            format!("State: {}", colorize_status(self.state.as_str())),
        ];
        match &self.schedule {
            Some(view) => {
                lines.push(format!("Name: {}", view.name));
                if let Some(id) = view.id {
                    lines.push(format!("ID: {id}"));
                }
                lines.push(format!(
                    "Start: {} ({})",
                    display_cron(&view.cron_start),
                    view.start_description
                ));
                if let (Some(stop), Some(description)) = (&view.cron_stop, &view.stop_description) {
                    lines.push(format!("Stop: {} ({description})", display_cron(stop)));
                }
                lines.push(format!("Status: {}", colorize_status(view.status.as_str())));
                if view.drifted {
                    lines.push(format!(
                        "Stored status: {} ({})",
                        view.stored_status,
                        colorize_status("drifted")
                    ));
                }
            }
            None => lines.push("No schedule stored.".to_string()),
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
pub struct SaveOutput {
    pub action: SessionMode,
    pub schedule: Option<ScheduleView>,
}

impl CommandOutput for SaveOutput {
    fn to_human(&self) -> String {
        let verb = match self.action {
            SessionMode::Create => "Created",
            SessionMode::Update => "Updated",
        };
        match &self.schedule {
            Some(view) => format!(
                "{verb} schedule for {} ({})",
                view.workload_label(),
                view.status
            ),
            None => format!("{verb} schedule"),
        }
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
pub struct ClearOutput {
    pub workload: String,
    pub cleared: bool,
}

impl CommandOutput for ClearOutput {
    fn to_human(&self) -> String {
        format!("Cleared schedule for {}", self.workload)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

fn display_cron(expression: &str) -> &str {
    if expression.is_empty() {
        "-"
    } else {
        expression
    }
}

pub async fn execute(args: ScheduleArgs, config: &Config, json_mode: bool) -> Result<()> {
    let store = Arc::new(
        HttpScheduleStore::new(&config.store).context("Failed to create schedule store client")?,
    );
    let schema = args.schema.unwrap_or(config.store.schema);
    run(store, schema, args.command, json_mode).await
}

/// Run a schedule command against any store.
pub async fn run<S: ScheduleStore>(
    store: Arc<S>,
    schema: SchemaGeneration,
    command: ScheduleCommands,
    json_mode: bool,
) -> Result<()> {
    match command {
        ScheduleCommands::List => {
            let schedules = ScheduleCatalog::new(store).list().await?;
            let total = schedules.len();
            output(&ScheduleListOutput { schedules, total }, json_mode);
        }

        ScheduleCommands::Show { workload } => {
            let identity = workload.identity(schema)?;
            let label = identity.label();
            let mut editor = ScheduleEditor::new(store);
            editor.open(identity).await?;

            let reconciler = editor.reconciler();
            let result = SessionOutput {
                workload: label,
                state: reconciler.state(),
                mode: reconciler.session().and_then(|s| s.mode),
                can_clear: reconciler.can_clear(),
                schedule: reconciler.projection().map(ScheduleView::from_record),
            };
            editor.close();
            output(&result, json_mode);
        }

        ScheduleCommands::Set {
            workload,
            start,
            stop,
        } => {
            if start.is_none() && stop.is_none() {
                bail!("Nothing to set: pass --start and/or --stop");
            }
            let identity = workload.identity(schema)?;
            let mut editor = ScheduleEditor::new(store);
            editor.open(identity).await?;

            if let Some(start) = start {
                editor.edit_field(CronSlot::Start, start)?;
            }
            if let Some(stop) = stop {
                editor.edit_field(CronSlot::Stop, stop)?;
            }
            let action = editor
                .reconciler()
                .session()
                .and_then(|s| s.mode)
                .unwrap_or(SessionMode::Create);

            editor.save().await?;
            let result = SaveOutput {
                action,
                schedule: editor.reconciler().projection().map(ScheduleView::from_record),
            };
            output(&result, json_mode);
        }

        ScheduleCommands::Clear { workload } => {
            let identity = workload.identity(schema)?;
            let label = identity.label();
            let mut editor = ScheduleEditor::new(store);
            editor.open(identity).await?;
            editor.clear().await?;
            output(
                &ClearOutput {
                    workload: label,
                    cleared: true,
                },
                json_mode,
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryScheduleStore;

    fn workload_args(uid: Option<&str>) -> WorkloadArgs {
        WorkloadArgs {
            uid: uid.map(str::to_string),
            resource_type: ResourceType::Deploy,
            name: "web".to_string(),
            namespace: "prod".to_string(),
            direction: Direction::Up,
        }
    }

    #[test]
    fn test_uid_schema_requires_uid() {
        assert!(workload_args(None).identity(SchemaGeneration::Uid).is_err());
        let identity = workload_args(Some("w1"))
            .identity(SchemaGeneration::Uid)
            .unwrap();
        assert_eq!(identity.uid(), Some("w1"));
    }

    #[test]
    fn test_legacy_schema_ignores_uid() {
        let identity = workload_args(Some("w1"))
            .identity(SchemaGeneration::Legacy)
            .unwrap();
        assert_eq!(identity.uid(), None);
        assert_eq!(identity.composite_name(), "deploy-web-up");
    }

    #[tokio::test]
    async fn test_set_then_clear_against_memory_store() {
        let store = Arc::new(InMemoryScheduleStore::new());
        run(
            store.clone(),
            SchemaGeneration::Uid,
            ScheduleCommands::Set {
                workload: workload_args(Some("w1")),
                start: Some("0 9 * * 1-5".to_string()),
                stop: Some("0 18 * * 1-5".to_string()),
            },
            true,
        )
        .await
        .unwrap();

        let stored = store.lookup_by_uid("w1").await.unwrap().unwrap();
        assert_eq!(stored.cron_fields(), vec!["0 9 * * 1-5", "0 18 * * 1-5"]);

        run(
            store.clone(),
            SchemaGeneration::Uid,
            ScheduleCommands::Clear {
                workload: workload_args(Some("w1")),
            },
            true,
        )
        .await
        .unwrap();

        let stored = store.lookup_by_uid("w1").await.unwrap().unwrap();
        assert_eq!(stored.cron_fields(), vec!["", ""]);
    }

    #[tokio::test]
    async fn test_set_requires_a_field() {
        let store = Arc::new(InMemoryScheduleStore::new());
        let result = run(
            store,
            SchemaGeneration::Uid,
            ScheduleCommands::Set {
                workload: workload_args(Some("w1")),
                start: None,
                stop: None,
            },
            false,
        )
        .await;
        assert!(result.is_err());
    }
}
