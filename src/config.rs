//! Application configuration management.
//!
//! Settings are layered with figment, lowest priority first:
//!
//! 1. Built-in defaults
//! 2. TOML file (`--config <PATH>` or the platform config directory)
//! 3. `ROWDUPE_*` environment variables
//! 4. CLI flags, applied by the caller after loading

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::duplicates::FinderConfig;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "ROWDUPE_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Field delimiter
    pub delimiter: char,
    /// Shards for the parallel pass; 1 runs sequentially
    pub shards: usize,
    /// Show a progress spinner on stderr
    pub progress: bool,
    /// Pretty-print JSON output
    pub pretty: bool,
    /// Wall-clock budget for `rowdupe job`, in seconds
    pub job_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            delimiter: ',',
            shards: 1,
            progress: false,
            pretty: false,
            job_timeout_secs: 60,
        }
    }
}

impl Config {
    /// Load the layered configuration.
    ///
    /// An explicit `path` must exist; the default path is optional.
    ///
    /// # Errors
    ///
    /// Returns an error if the explicit file is missing or any layer holds an
    /// invalid value.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => {
                if !p.is_file() {
                    anyhow::bail!("Config file not found: {}", p.display());
                }
                Some(p.to_path_buf())
            }
            None => Self::default_path(),
        };

        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(file) = &file {
            log::debug!("Reading config from {}", file.display());
            figment = figment.merge(Toml::file(file));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract().context("Invalid configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Check values figment cannot type-check.
    ///
    /// # Errors
    ///
    /// Returns an error for a non-ASCII delimiter or a zero shard count.
    pub fn validate(&self) -> Result<()> {
        delimiter_byte(self.delimiter)?;
        if self.shards == 0 {
            anyhow::bail!("shards must be at least 1");
        }
        Ok(())
    }

    /// Finder settings derived from this configuration.
    ///
    /// # Errors
    ///
    /// Returns an error for a non-ASCII delimiter.
    pub fn finder_config(&self) -> Result<FinderConfig> {
        Ok(FinderConfig::default()
            .with_delimiter(delimiter_byte(self.delimiter)?)
            .with_shards(self.shards))
    }

    /// Job timeout as a duration.
    #[must_use]
    pub fn job_timeout(&self) -> Duration {
        Duration::from_secs(self.job_timeout_secs)
    }

    /// Render as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to render configuration")
    }

    /// Platform config file path, if it exists.
    fn default_path() -> Option<PathBuf> {
        let dirs = ProjectDirs::from("com", "rowdupe", "rowdupe")?;
        let path = dirs.config_dir().join("config.toml");
        path.is_file().then_some(path)
    }
}

fn delimiter_byte(c: char) -> Result<u8> {
    u8::try_from(c)
        .ok()
        .filter(u8::is_ascii)
        .with_context(|| format!("Delimiter must be a single ASCII character, got {c:?}"))
}
