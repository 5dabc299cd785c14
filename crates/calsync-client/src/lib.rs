//! calsync CLI: config, auth, and the calendar-to-notes sync driver.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;

pub use cli::Cli;
pub use error::{ClientError, ClientResult};
