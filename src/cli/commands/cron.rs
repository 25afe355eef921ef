//! Cron expression commands. These never touch the Schedule Store.

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::cli::output::{output, CommandOutput};
use crate::domain::cron::{normalize, CronDecoder, CronExpression, CronValidator};
use crate::domain::models::schedule::SchemaGeneration;

#[derive(Args, Debug)]
pub struct CronArgs {
    #[command(subcommand)]
    pub command: CronCommands,
}

#[derive(Subcommand, Debug)]
pub enum CronCommands {
    /// Check an expression against the five-field grammar
    Validate {
        /// Cron expression (quote it; missing trailing fields become '*')
        expression: String,

        /// Apply the legacy rules (empty is invalid, day-of-week '*/0' allowed)
        #[arg(long)]
        legacy: bool,
    },

    /// Print the normalized five-field form
    Normalize {
        /// Cron expression
        expression: String,
    },

    /// Describe an expression in plain English
    Describe {
        /// Cron expression
        expression: String,

        /// Apply the legacy rules
        #[arg(long)]
        legacy: bool,
    },
}

const fn schema_for(legacy: bool) -> SchemaGeneration {
    if legacy {
        SchemaGeneration::Legacy
    } else {
        SchemaGeneration::Uid
    }
}

#[derive(Debug, Serialize)]
pub struct ValidationOutput {
    pub expression: String,
    pub normalized: String,
    pub schema: SchemaGeneration,
    pub valid: bool,
    pub unscheduled: bool,
    pub error: Option<String>,
}

impl CommandOutput for ValidationOutput {
    fn to_human(&self) -> String {
        match (&self.error, self.unscheduled) {
            (Some(error), _) => format!("invalid: {error}"),
            (None, true) => "valid: empty expression (not scheduled)".to_string(),
            (None, false) => format!("valid: {}", self.normalized),
        }
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
pub struct NormalizeOutput {
    pub expression: String,
    pub normalized: String,
}

impl CommandOutput for NormalizeOutput {
    fn to_human(&self) -> String {
        self.normalized.clone()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
pub struct DescribeOutput {
    pub expression: String,
    pub normalized: String,
    pub description: String,
}

impl CommandOutput for DescribeOutput {
    fn to_human(&self) -> String {
        self.description.clone()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Validate an expression; exposed for tests and scripting.
pub fn validation_report(expression: &str, schema: SchemaGeneration) -> ValidationOutput {
    let result = CronValidator::new(schema).validate(expression);
    ValidationOutput {
        expression: expression.to_string(),
        normalized: normalize(expression),
        schema,
        valid: result.is_ok(),
        unscheduled: matches!(result, Ok(CronExpression::Unscheduled)),
        error: result.err().map(|e| e.to_string()),
    }
}

pub fn execute(args: CronArgs, json_mode: bool) -> Result<()> {
    match args.command {
        CronCommands::Validate { expression, legacy } => {
            let report = validation_report(&expression, schema_for(legacy));
            output(&report, json_mode);
            if !report.valid {
                std::process::exit(1);
            }
        }
        CronCommands::Normalize { expression } => {
            let normalized = normalize(&expression);
            output(
                &NormalizeOutput {
                    expression,
                    normalized,
                },
                json_mode,
            );
        }
        CronCommands::Describe { expression, legacy } => {
            let description = CronDecoder::new(schema_for(legacy)).decode(&expression);
            output(
                &DescribeOutput {
                    normalized: normalize(&expression),
                    expression,
                    description,
                },
                json_mode,
            );
        }
    }
    Ok(())
}
