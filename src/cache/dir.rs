//! Per-user cache directories
//!
//! Layout: `<base>/gorun-<euid>/<directory key>/<build key>`. The per-user
//! root and every key directory must be real directories owned by the
//! effective user with mode `0700`. Anything else is treated as tampering
//! and refused.

use crate::cache::lock::CacheLock;
use crate::error::{GorunError, GorunResult};
use std::fs::{self, DirBuilder};
use std::os::unix::fs::{DirBuilderExt, MetadataExt, PermissionsExt};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Prefix of the per-user cache root directory name
pub const ROOT_PREFIX: &str = "gorun";

/// Required permission bits for cache directories
pub const DIR_MODE: u32 = 0o700;

/// Effective user id of this process
pub fn effective_uid() -> u32 {
    rustix::process::geteuid().as_raw()
}

/// The per-user cache root, `<base>/gorun-<euid>`
#[derive(Debug, Clone)]
pub struct CacheRoot {
    path: PathBuf,
    uid: u32,
}

impl CacheRoot {
    /// Create or validate the per-user root under `base`.
    ///
    /// A relative `base` is anchored to the current directory, since build
    /// steps run with the cache directory as their working directory.
    pub fn open(base: &Path) -> GorunResult<Self> {
        let base = std::path::absolute(base)
            .map_err(|e| GorunError::io(format!("resolving {}", base.display()), e))?;
        let uid = effective_uid();
        let path = base.join(format!("{}-{}", ROOT_PREFIX, uid));
        ensure_private_dir(&path, uid)?;
        Ok(Self { path, uid })
    }

    /// Path of the per-user root
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Take the exclusive lock guarding the directory for `key`
    pub fn lock(&self, key: &str) -> GorunResult<CacheLock> {
        CacheLock::acquire(&self.path.join(format!("{}.lock", key)))
    }

    /// Create or validate the cache directory for `key`
    pub fn prepare(&self, key: &str) -> GorunResult<CacheDir> {
        let path = self.path.join(key);
        ensure_private_dir(&path, self.uid)?;
        Ok(CacheDir { path })
    }
}

/// A validated cache directory for one set of source paths
#[derive(Debug, Clone)]
pub struct CacheDir {
    path: PathBuf,
}

impl CacheDir {
    /// Path of the directory
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the executable for a build key
    pub fn artifact(&self, build_key: &str) -> PathBuf {
        self.path.join(build_key)
    }

    /// Remove every entry of the directory.
    ///
    /// Entries are disposable build leftovers, so individual removal
    /// failures are logged and skipped. Failing to list the directory is fatal.
    pub fn clear(&self) -> GorunResult<()> {
        let entries = fs::read_dir(&self.path)
            .map_err(|e| GorunError::io(format!("listing {}", self.path.display()), e))?;

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Failed to read entry in {}: {}", self.path.display(), e);
                    continue;
                }
            };
            let path = entry.path();
            let result = match entry.file_type() {
                Ok(ft) if ft.is_dir() => fs::remove_dir_all(&path),
                _ => fs::remove_file(&path),
            };
            match result {
                Ok(()) => debug!("Removed stale {}", path.display()),
                Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
            }
        }
        Ok(())
    }

    /// Guard that removes the whole directory when dropped.
    ///
    /// A successful launch replaces the process image, so the guard only
    /// runs when the run fails.
    pub fn remove_on_failure(&self) -> RemoveOnDrop {
        RemoveOnDrop {
            path: self.path.clone(),
        }
    }
}

/// Removes a directory tree when dropped
#[derive(Debug)]
pub struct RemoveOnDrop {
    path: PathBuf,
}

impl Drop for RemoveOnDrop {
    fn drop(&mut self) {
        debug!("Removing cache directory {}", self.path.display());
        if let Err(e) = fs::remove_dir_all(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove {}: {}", self.path.display(), e);
            }
        }
    }
}

/// Validate `path` if it exists, otherwise create it with mode 0700
fn ensure_private_dir(path: &Path, uid: u32) -> GorunResult<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) => validate_private_dir(path, &meta, uid),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => create_private_dir(path),
        Err(e) => Err(GorunError::io(format!("inspecting {}", path.display()), e)),
    }
}

fn validate_private_dir(path: &Path, meta: &fs::Metadata, uid: u32) -> GorunResult<()> {
    if !meta.file_type().is_dir() {
        return Err(GorunError::cache_dir(path, "not a directory"));
    }
    if meta.uid() != uid {
        return Err(GorunError::cache_dir(
            path,
            format!("owned by uid {}, expected {}", meta.uid(), uid),
        ));
    }
    let mode = meta.permissions().mode() & 0o777;
    if mode != DIR_MODE {
        return Err(GorunError::cache_dir(
            path,
            format!("wrong permissions {:04o}, expected {:04o}", mode, DIR_MODE),
        ));
    }
    Ok(())
}

fn create_private_dir(path: &Path) -> GorunResult<()> {
    DirBuilder::new()
        .recursive(true)
        .mode(DIR_MODE)
        .create(path)
        .map_err(|e| GorunError::io(format!("creating {}", path.display()), e))?;

    // The umask may have narrowed the mode, pin it exactly.
    fs::set_permissions(path, fs::Permissions::from_mode(DIR_MODE))
        .map_err(|e| GorunError::io(format!("setting permissions on {}", path.display()), e))?;

    debug!("Created cache directory {}", path.display());
    Ok(())
}
