//! Error types for gorun
//!
//! All modules use `GorunResult<T>` as their return type. Every variant is
//! fatal; best-effort cleanup failures are logged instead of returned.

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Result type alias for gorun operations
pub type GorunResult<T> = Result<T, GorunError>;

/// All errors that can occur in gorun
#[derive(Error, Debug)]
pub enum GorunError {
    // Invocation errors
    #[error("No file(s) to compile")]
    NoSources,

    #[error("Source files {first} and {second} share the base name {name}")]
    DuplicateSourceName {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Source path has no file name: {0}")]
    SourceNameMissing(PathBuf),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    // Cache errors
    #[error("Cache path {path} is not usable: {reason}")]
    CacheDirInvalid { path: PathBuf, reason: String },

    #[error("Failed to lock cache {path}: {source}")]
    CacheLock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Toolchain errors
    #[error("Toolchain not found: {0}")]
    ToolchainNotFound(String),

    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command execution error: {command}, stderr: {stderr}")]
    CommandExecution { command: String, stderr: String },

    #[error("Command {command} exited unsuccessfully ({status})")]
    CommandStatus { command: String, status: ExitStatus },

    // Process errors
    #[error("Failed to execute {path}: {source}")]
    Launch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl GorunError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error, mapping a missing binary to `ToolchainNotFound`
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        let command = command.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            return Self::ToolchainNotFound(command);
        }
        Self::CommandFailed { command, source }
    }

    /// Create a command execution error
    pub fn command_exec(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::CommandExecution {
            command: command.into(),
            stderr: stderr.into(),
        }
    }

    /// Create a cache directory error
    pub fn cache_dir(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::CacheDirInvalid {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::NoSources => Some("Usage: gorun <file.go[,file.go...]> [args...]"),
            Self::ToolchainNotFound(_) => {
                Some("Install Go from https://go.dev/dl or set --toolchain / GORUN_TOOLCHAIN")
            }
            Self::CacheDirInvalid { .. } => {
                Some("Remove the directory if you trust its contents were not tampered with")
            }
            Self::DuplicateSourceName { .. } => Some("Rename one of the files"),
            _ => None,
        }
    }
}
