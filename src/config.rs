use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable holding the login secret
pub const SECRET_ENV: &str = "REQOPTS_SECRET";

fn default_timeout_secs() -> u64 {
    30
}

/// Seconds to a deadline, with zero meaning none
pub fn timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

/// reqopts configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReqoptsConfig {
    /// Endpoint that exchanges credentials for a bearer token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login_url: Option<String>,

    /// Identity (email) used when none is given on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,

    /// Overall deadline for a call, login included; 0 disables it
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ReqoptsConfig {
    fn default() -> Self {
        Self {
            login_url: None,
            identity: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ReqoptsConfig {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .context("Could not determine config directory")
            .map(|d| d.join("reqopts"))
    }

    /// Get the JSON config file path
    pub fn config_path() -> Result<PathBuf> {
        Self::config_dir().map(|d| d.join("config.json"))
    }

    /// Load config from the user config directory, or return default if not exists
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_dir()?)
    }

    /// Load `config.json` from `dir`, falling back to `config.toml`
    pub fn load_from(dir: &Path) -> Result<Self> {
        let json_path = dir.join("config.json");
        if json_path.exists() {
            let content =
                std::fs::read_to_string(&json_path).context("Failed to read config file")?;
            return serde_json::from_str(&content).context("Failed to parse config file");
        }

        let toml_path = dir.join("config.toml");
        if toml_path.exists() {
            let content =
                std::fs::read_to_string(&toml_path).context("Failed to read TOML config file")?;
            return toml::from_str(&content).context("Failed to parse TOML config file");
        }

        Ok(Self::default())
    }

    /// Save config as JSON to the user config directory
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_dir()?)
    }

    pub fn save_to(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir).context("Failed to create config directory")?;

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(dir.join("config.json"), content).context("Failed to write config file")?;

        Ok(())
    }

    /// Deadline for one call; `timeout_secs = 0` means no deadline
    pub fn timeout(&self) -> Option<Duration> {
        timeout_from_secs(self.timeout_secs)
    }

    /// Secret from the environment, if set and non-empty
    pub fn secret_from_env() -> Option<String> {
        std::env::var(SECRET_ENV).ok().filter(|s| !s.is_empty())
    }
}
