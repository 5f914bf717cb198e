//! Staging sources into the cache directory for a build

use crate::error::{GorunError, GorunResult};
use crate::invocation::staged_name;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Copy `src` to `dst`, flushing the data to disk before returning
pub fn copy_file(src: &Path, dst: &Path) -> io::Result<u64> {
    let mut input = File::open(src)?;
    let mut output = File::create(dst)?;
    let copied = io::copy(&mut input, &mut output)?;
    output.sync_all()?;
    Ok(copied)
}

/// Files placed in the cache directory for the duration of one build.
///
/// Every tracked path is removed on drop, whichever way the build ends.
#[derive(Debug)]
pub struct StagedSources {
    paths: Vec<PathBuf>,
}

impl StagedSources {
    /// Start tracking the toolchain manifest files in `dir`
    pub fn new(dir: &Path, manifests: &[&str]) -> Self {
        Self {
            paths: manifests.iter().map(|m| dir.join(m)).collect(),
        }
    }

    /// Copy every source into `dir` under its base name
    pub fn copy_all(&mut self, sources: &[PathBuf], dir: &Path) -> GorunResult<()> {
        for source in sources {
            let dst = dir.join(staged_name(source)?);
            // Tracked before copying so a partial copy is cleaned up too
            self.paths.push(dst.clone());
            let bytes = copy_file(source, &dst).map_err(|e| {
                GorunError::io(
                    format!("copying {} to {}", source.display(), dst.display()),
                    e,
                )
            })?;
            debug!("Staged {} ({} bytes)", dst.display(), bytes);
        }
        Ok(())
    }
}

impl Drop for StagedSources {
    fn drop(&mut self) {
        for path in &self.paths {
            match fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => warn!("Failed to remove staged {}: {}", path.display(), e),
            }
        }
    }
}
