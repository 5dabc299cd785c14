//! Configuration inspection commands.

use crate::config::ClientConfig;
use crate::error::ClientResult;

/// Prints the effective configuration as TOML.
pub fn dump(config: &ClientConfig) -> ClientResult<()> {
    print!("{}", config.dump()?);
    Ok(())
}

/// Prints the configuration file path.
pub fn path() -> ClientResult<()> {
    println!("{}", ClientConfig::default_path().display());
    Ok(())
}
