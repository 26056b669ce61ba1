//! # Classroom Main Entry Point
//!
//! `classroom serve` runs the API; `classroom migrate` applies the schema and
//! exits.

use anyhow::Context;
use clap::{Parser, Subcommand};

use classroom::{config::ConfigLoader, db, server::run_server, telemetry};

#[derive(Debug, Parser)]
#[command(name = "classroom", version, about = "Teacher and student registration service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the HTTP API (default)
    Serve,
    /// Apply pending database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = ConfigLoader::new()
        .load()
        .context("Failed to load configuration")?;
    telemetry::init_tracing(&config).context("Failed to initialise telemetry")?;

    if let Ok(redacted_json) = config.redacted_json() {
        tracing::info!(profile = %config.profile, config = %redacted_json, "configuration loaded");
    }

    let pool = db::init_pool(&config).await?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Migrate => db::migrate(&pool).await,
        Command::Serve => {
            if config.auto_migrate {
                db::migrate(&pool).await?;
            }
            run_server(config, pool).await
        }
    }
}
