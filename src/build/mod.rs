//! Building sources into a cached executable
//!
//! A build is skipped when the cache directory already holds an executable
//! named after the current build key. Otherwise the directory is cleared,
//! sources are staged into it, and the toolchain produces the executable.
//! Staged sources and manifest files never outlive the build.

pub mod stage;
pub mod toolchain;

pub use stage::{copy_file, StagedSources};
pub use toolchain::Toolchain;

use crate::cache::{build_key, CacheDir};
use crate::error::GorunResult;
use crate::invocation::Invocation;
use std::path::PathBuf;
use tracing::{debug, info};

/// Builds invocations with a given toolchain
pub struct Builder<'a> {
    toolchain: &'a Toolchain,
}

impl<'a> Builder<'a> {
    pub fn new(toolchain: &'a Toolchain) -> Self {
        Self { toolchain }
    }

    /// Return the executable for `invocation`, building it if needed
    pub fn build(&self, invocation: &Invocation, dir: &CacheDir) -> GorunResult<PathBuf> {
        let key = build_key(&invocation.sources)?;
        let exe = dir.artifact(&key);

        if exe.symlink_metadata().is_ok() {
            debug!("Cache hit: {}", exe.display());
            return Ok(exe);
        }

        info!(
            "Building {} source(s) into {}",
            invocation.sources.len(),
            dir.path().display()
        );
        dir.clear()?;

        let mut staged = StagedSources::new(dir.path(), self.toolchain.manifest_files());
        staged.copy_all(&invocation.sources, dir.path())?;

        let env = self.toolchain.build_env()?;
        self.toolchain.init_module(dir.path(), &env)?;
        self.toolchain.tidy(dir.path(), &env)?;
        self.toolchain.build(dir.path(), &env, &exe)?;
        drop(staged);

        info!("Built {}", exe.display());
        Ok(exe)
    }
}
