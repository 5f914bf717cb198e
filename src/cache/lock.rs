//! Cross-process lock on a cache directory
//!
//! Concurrent runs over the same source paths share one cache directory, so
//! each run holds an exclusive `flock` on `<key>.lock` next to it while it
//! clears, builds and launches. The descriptor is close-on-exec: the lock is
//! released as soon as the process image is replaced or the process exits.

use crate::error::{GorunError, GorunResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::os::unix::fs::OpenOptionsExt;
use rustix::fs::FlockOperation;
use std::os::unix::io::AsFd;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Who holds a cache lock
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LockMetadata {
    pub pid: u32,
    pub started_at: DateTime<Utc>,
}

/// An exclusively held cache lock, released on drop
#[derive(Debug)]
pub struct CacheLock {
    file: File,
    path: PathBuf,
}

impl CacheLock {
    /// Acquire the lock at `path`, waiting for the current holder if any
    pub fn acquire(path: &Path) -> GorunResult<Self> {
        let lock_err = |source| GorunError::CacheLock {
            path: path.to_path_buf(),
            source,
        };

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .mode(0o600)
            .open(path)
            .map_err(lock_err)?;

        match flock(&file, FlockOperation::NonBlockingLockExclusive) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                match read_metadata(&file) {
                    Some(holder) => info!(
                        "Waiting for build by pid {} (started {})",
                        holder.pid,
                        holder.started_at.to_rfc3339()
                    ),
                    None => info!("Waiting for lock {}", path.display()),
                }
                flock(&file, FlockOperation::LockExclusive).map_err(lock_err)?;
            }
            Err(e) => return Err(lock_err(e)),
        }

        let mut lock = Self {
            file,
            path: path.to_path_buf(),
        };
        lock.write_metadata().map_err(lock_err)?;
        debug!("Acquired lock {}", lock.path.display());
        Ok(lock)
    }

    /// Path of the lock file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_metadata(&mut self) -> io::Result<()> {
        let metadata = LockMetadata {
            pid: std::process::id(),
            started_at: Utc::now(),
        };
        let json = serde_json::to_vec(&metadata).map_err(io::Error::other)?;

        self.file.set_len(0)?;
        self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(&json)?;
        self.file.flush()
    }
}

impl Drop for CacheLock {
    fn drop(&mut self) {
        let _ = flock(&self.file, FlockOperation::Unlock);
    }
}

fn flock(file: &File, operation: FlockOperation) -> io::Result<()> {
    rustix::io::retry_on_intr(|| rustix::fs::flock(file.as_fd(), operation))
        .map_err(|e| io::Error::from_raw_os_error(e.raw_os_error()))
}

fn read_metadata(file: &File) -> Option<LockMetadata> {
    let mut file = file;
    file.seek(SeekFrom::Start(0)).ok()?;
    let mut contents = String::new();
    file.read_to_string(&mut contents).ok()?;
    serde_json::from_str(&contents).ok()
}
