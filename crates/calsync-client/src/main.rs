//! calsync CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use calsync_client::cli::{Cli, Command, ConfigAction};
use calsync_client::commands;
use calsync_client::config::ClientConfig;
use calsync_client::error::ClientResult;
use calsync_core::{init_tracing, TracingConfig};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let tracing_config = if cli.debug {
        TracingConfig::debug()
    } else {
        TracingConfig::default()
    };
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("error: {}", e);
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let config = match cli.config {
        Some(ref path) => ClientConfig::load_from(path)?,
        None => ClientConfig::load()?,
    };

    match cli.command {
        Some(Command::Auth { force, console }) => {
            commands::auth::run(&config, force, console).await
        }
        Some(Command::Config { action }) => match action {
            ConfigAction::Dump => commands::config::dump(&config),
            ConfigAction::Path => commands::config::path(),
        },
        // `calsync` with no subcommand runs one sync, like the original
        // "Sync Google Calendar" command.
        Some(Command::Sync) | None => commands::sync::run(&config).await,
    }
}
