//! Cronpilot CLI entry point.

use anyhow::{Context, Result};
use clap::Parser;

use cronpilot::cli::{Cli, Commands};
use cronpilot::domain::models::config::Config;
use cronpilot::infrastructure::config::ConfigLoader;
use cronpilot::infrastructure::logging::{LogConfig, LoggerImpl};

fn load_config(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => cronpilot::cli::handle_error(&err, cli.json),
    };

    let _logger = match LogConfig::from_settings(&config.logging)
        .and_then(|log_config| LoggerImpl::init(&log_config))
        .context("Failed to initialize logging")
    {
        Ok(logger) => logger,
        Err(err) => cronpilot::cli::handle_error(&err, cli.json),
    };

    let result = match cli.command {
        Commands::Cron(args) => cronpilot::cli::commands::cron::execute(args, cli.json),
        Commands::Schedule(args) => {
            cronpilot::cli::commands::schedule::execute(args, &config, cli.json).await
        }
    };

    if let Err(err) = result {
        cronpilot::cli::handle_error(&err, cli.json);
    }
}
