//! Config file command.

use std::path::Path;

use crate::config::{self, Config, ConfigError};

/// Write the effective configuration to disk, filling in every default
pub fn cmd_init_config(config: &Config, path: Option<&Path>, force: bool) -> anyhow::Result<()> {
    let target = match path {
        Some(path) => path.to_path_buf(),
        None => config::config_path().ok_or(ConfigError::NoConfigDir)?,
    };
    if target.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            target.display()
        );
    }

    match path {
        Some(path) => config::save_to(config, path)?,
        None => config::save(config)?,
    }
    println!("Wrote {}", target.display());
    Ok(())
}
