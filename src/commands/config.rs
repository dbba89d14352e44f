//! Config inspection commands

use anyhow::{Context, Result};
use colored::Colorize;

use crate::config::{ReqoptsConfig, SECRET_ENV};

/// Print the effective configuration as JSON
pub fn cmd_config_show(config: &ReqoptsConfig) -> Result<()> {
    let json = serde_json::to_string_pretty(config).context("Failed to serialize config")?;
    println!("{}", json);

    let secret_state = if ReqoptsConfig::secret_from_env().is_some() {
        "set".green()
    } else {
        "not set".yellow()
    };
    println!("{} {}", format!("${}", SECRET_ENV).dimmed(), secret_state);
    Ok(())
}

/// Print where the config file lives and whether it exists
pub fn cmd_config_path() -> Result<()> {
    let path = ReqoptsConfig::config_path()?;
    if path.exists() {
        println!("{}", path.display());
    } else {
        println!("{} {}", path.display(), "(not created)".dimmed());
    }
    Ok(())
}
