//! Configuration schema for gorun
//!
//! Configuration is stored at `~/.config/gorun/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Build cache settings
    pub cache: CacheConfig,

    /// Go toolchain settings
    pub toolchain: ToolchainConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Build cache configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Base directory holding the per-user cache root (default: system temp dir)
    pub dir: Option<PathBuf>,
}

impl CacheConfig {
    /// Directory under which `gorun-<euid>` is created
    pub fn base_dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// Go toolchain configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainConfig {
    /// Toolchain binary, looked up in PATH when not absolute
    pub program: PathBuf,

    /// Module path passed to `go mod init`
    pub module_name: String,

    /// Environment variable pointed at the local module cache during builds
    pub proxy_var: String,

    /// Resolve dependencies from the local module cache only
    pub offline: bool,

    /// Flags appended to `go build -o <exe>`
    pub build_flags: Vec<String>,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("go"),
            module_name: "gorun".to_string(),
            proxy_var: "GOPROXY".to_string(),
            offline: true,
            build_flags: vec![
                "-ldflags".to_string(),
                "-s -w".to_string(),
                "-trimpath".to_string(),
            ],
        }
    }
}
