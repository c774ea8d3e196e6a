//! Configuration loading for the pollwise CLI.
//!
//! Settings come from a TOML file (by default `<data-dir>/config.toml`);
//! missing files and missing keys fall back to defaults.

use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the configuration inside the data directory.
pub(crate) const CONFIG_FILE: &str = "config.toml";

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Config {
    /// IANA time zone whose day boundaries schedules snap to.
    pub(crate) time_zone: String,
    /// Maximum number of series histories read concurrently.
    pub(crate) concurrency: usize,
    /// Leave cross-posted duplicate releases out of the history.
    pub(crate) exclude_duplicates: bool,
    /// Default log level (trace, debug, info, warn, error).
    pub(crate) log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            time_zone: "UTC".to_string(),
            concurrency: 8,
            exclude_duplicates: true,
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Returns the configuration path inside `data_dir`.
    pub(crate) fn default_file(data_dir: &Path) -> PathBuf {
        data_dir.join(CONFIG_FILE)
    }

    /// Loads configuration from a TOML file.
    ///
    /// If the file doesn't exist, returns the default configuration.
    pub(crate) fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Saves configuration to a TOML file.
    #[cfg(test)]
    pub(crate) fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Parses the configured time zone.
    pub(crate) fn zone(&self) -> Result<Tz> {
        parse_zone(&self.time_zone)
    }
}

/// Parses an IANA time zone name such as `Asia/Tokyo`.
pub(crate) fn parse_zone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|e| anyhow::anyhow!("Invalid time zone '{name}': {e}"))
}
