//! Tally command line
//!
//! Main entry point for the Tally budget tracker. Prints JSON on stdout and
//! logs on stderr.

mod cli;
mod commands;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use serde_json::json;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use tally_core::query::{BudgetQueryService, QueryError};
use tally_shared::config::LogConfig;
use tally_shared::{AppConfig, AppError};
use tally_store::MemoryStore;

use crate::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(&config.log);

    let tz = config.budget.timezone()?;
    let store = Arc::new(
        MemoryStore::open(&config.store.snapshot_path, config.store.autosave)
            .await
            .context("Failed to open ledger store")?,
    );
    let service = BudgetQueryService::new(Arc::clone(&store));

    let now = cli.now.unwrap_or_else(Utc::now);
    debug!(user = %cli.user, %now, timezone = %tz, "Running command");

    match commands::run(&service, cli.user, cli.command, now, tz).await {
        Ok(output) => {
            if !config.store.autosave {
                store.flush().await.context("Failed to save ledger snapshot")?;
                info!(path = %config.store.snapshot_path.display(), "Snapshot saved");
            }
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            let err = match err.downcast::<QueryError>() {
                Ok(query) => AppError::from(query),
                Err(other) => return Err(other),
            };
            let body = json!({
                "error": err.error_code(),
                "message": err.to_string(),
                "status": err.status_code(),
            });
            eprintln!("{}", serde_json::to_string_pretty(&body)?);
            Ok(ExitCode::from(exit_code(&err)))
        }
    }
}

/// Initializes the global subscriber. `RUST_LOG` wins over the configured filter.
fn init_tracing(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter));
    let registry = tracing_subscriber::registry().with(filter);

    if log.json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Process exit status for a failed command.
const fn exit_code(err: &AppError) -> u8 {
    match err.status_code() {
        400 => 2,
        404 => 3,
        409 => 4,
        _ => 1,
    }
}
