//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use super::commands::cron::CronArgs;
use super::commands::schedule::ScheduleArgs;

#[derive(Parser, Debug)]
#[command(name = "cronpilot")]
#[command(about = "Cronpilot - start/stop cron schedules for Kubernetes workloads", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to .cronpilot/config.yaml)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate, normalize and describe cron expressions
    Cron(CronArgs),

    /// Inspect and edit workload schedules in the Schedule Store
    Schedule(ScheduleArgs),
}
