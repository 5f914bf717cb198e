//! Configuration management for gorun

pub mod schema;

pub use schema::Config;

use crate::error::{GorunError, GorunResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gorun")
            .join("config.toml")
    }

    /// Load configuration, falling back to defaults if the file does not exist
    pub fn load(&self) -> GorunResult<Config> {
        if !self.config_path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Config::default());
        }

        Self::load_from_file(&self.config_path)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> GorunResult<Config> {
        let content = fs::read_to_string(path)
            .map_err(|e| GorunError::io(format!("reading config from {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| GorunError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
