//! `config` subcommand.

use anyhow::Result;
use tribuna_core::config::paths;

/// Prints the config file path.
pub fn path() -> Result<()> {
    println!("{}", paths::config_path().display());
    Ok(())
}
