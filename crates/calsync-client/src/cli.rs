//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// calsync - sync today's Google Calendar events into your notes
#[derive(Debug, Parser)]
#[command(name = "calsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "CALSYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands. Running with none is the same as `sync`.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sync today's calendar events into the currently open page
    Sync,

    /// Run the Google authorization flow
    Auth {
        /// Re-authorize even when tokens already exist
        #[arg(long)]
        force: bool,

        /// Paste the authorization code into the terminal instead of
        /// using the localhost callback listener
        #[arg(long)]
        console: bool,
    },

    /// Inspect the configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration inspection actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Dump,
    /// Print the configuration file path
    Path,
}
