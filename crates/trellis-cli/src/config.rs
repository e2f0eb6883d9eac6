//! Session settings: defaults, an optional JSON file, then command-line flags.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::Args;
use serde::{Deserialize, Serialize};
use trellis_engine::MEMORY_DRIVER;

/// Drivers this build knows how to open.
pub const DRIVERS: &[&str] = &[MEMORY_DRIVER];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    pub driver: String,
    /// Passed through to the planner untouched.
    pub channel_size: usize,
    pub bulk_size: usize,
    pub builder_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            driver: MEMORY_DRIVER.to_string(),
            channel_size: 0,
            bulk_size: 1000,
            builder_size: 1000,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unknown driver {name:?} (available: {})", DRIVERS.join(", "))]
    UnknownDriver { name: String },
}

impl SessionConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !DRIVERS.contains(&self.driver.as_str()) {
            return Err(ConfigError::UnknownDriver {
                name: self.driver.clone(),
            });
        }
        Ok(())
    }
}

/// Session flags shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct SessionArgs {
    /// JSON file with session settings. Flags override its values.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Storage driver to open.
    #[arg(long, global = true)]
    pub driver: Option<String>,

    /// Channel size handed to the planner.
    #[arg(long, global = true, value_name = "N")]
    pub channel_size: Option<usize>,

    /// Triples per chunk for load and export.
    #[arg(long, global = true, value_name = "N")]
    pub bulk_size: Option<usize>,

    /// Initial capacity of the loader's triple buffer.
    #[arg(long, global = true, value_name = "N")]
    pub builder_size: Option<usize>,
}

impl SessionArgs {
    pub fn resolve(&self) -> Result<SessionConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => SessionConfig::from_json_file(path)?,
            None => SessionConfig::default(),
        };
        if let Some(driver) = &self.driver {
            config.driver = driver.clone();
        }
        if let Some(n) = self.channel_size {
            config.channel_size = n;
        }
        if let Some(n) = self.bulk_size {
            config.bulk_size = n;
        }
        if let Some(n) = self.builder_size {
            config.builder_size = n;
        }
        config.validate()?;
        tracing::debug!(?config, "session config resolved");
        Ok(config)
    }
}
