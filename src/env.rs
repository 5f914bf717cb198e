//! Environment handling for toolchain commands
//!
//! Overrides are applied to each child `Command` instead of the process
//! environment, so the variables seen by gorun itself and by the launched
//! program never change.

use std::env;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::process::Command;

/// Saved presence and value of one environment variable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvSnapshot {
    name: OsString,
    value: Option<OsString>,
}

impl EnvSnapshot {
    /// Capture the current state of `name`
    pub fn capture(name: impl AsRef<OsStr>) -> Self {
        let name = name.as_ref().to_os_string();
        let value = env::var_os(&name);
        Self { name, value }
    }

}

impl fmt::Display for EnvSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(v) => write!(f, "{}={}", self.name.to_string_lossy(), v.to_string_lossy()),
            None => write!(f, "{} unset", self.name.to_string_lossy()),
        }
    }
}

/// Variables set on every toolchain command, on top of the inherited environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    vars: Vec<(OsString, OsString)>,
}

impl EnvOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name`, replacing an earlier override of the same variable
    pub fn set(&mut self, name: impl Into<OsString>, value: impl Into<OsString>) {
        let name = name.into();
        let value = value.into();
        match self.vars.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.vars.push((name, value)),
        }
    }

    /// Override for `name`, if any
    pub fn get(&self, name: impl AsRef<OsStr>) -> Option<&OsStr> {
        let name = name.as_ref();
        self.vars
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_os_str())
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Apply the overrides to a child command
    pub fn apply(&self, command: &mut Command) {
        command.envs(self.vars.iter().map(|(k, v)| (k, v)));
    }
}
