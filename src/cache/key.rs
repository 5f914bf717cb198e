//! Cache key derivation
//!
//! Two SHA256 fingerprints, both encoded as URL-safe base64 so they can be
//! used directly as file names:
//!
//! - the directory key covers the sorted absolute source paths and selects
//!   the cache directory
//! - the build key covers the source contents and names the executable
//!   inside that directory

use crate::error::{GorunError, GorunResult};
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine as _;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

/// Hash a sequence of byte strings, each terminated by a NUL byte
pub fn hash_strings<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<[u8]>,
{
    let mut hasher = Sha256::new();
    for item in items {
        hasher.update(item.as_ref());
        hasher.update([0u8]);
    }
    encode(hasher)
}

/// Hash the contents of files in order, streaming each one.
///
/// Each file's bytes are followed by its length so that content moving from
/// one file to the next still changes the digest.
pub fn hash_files(files: &[PathBuf]) -> GorunResult<String> {
    let mut hasher = Sha256::new();
    for path in files {
        let mut file = File::open(path)
            .map_err(|e| GorunError::io(format!("opening source {}", path.display()), e))?;
        let len = io::copy(&mut file, &mut hasher)
            .map_err(|e| GorunError::io(format!("reading source {}", path.display()), e))?;
        hasher.update(len.to_le_bytes());
    }
    Ok(encode(hasher))
}

/// Key selecting the cache directory for a set of sources
pub fn directory_key(sources: &[PathBuf]) -> String {
    hash_strings(sources.iter().map(|p| path_bytes(p)))
}

/// Key naming the executable built from the current source contents
pub fn build_key(sources: &[PathBuf]) -> GorunResult<String> {
    hash_files(sources)
}

fn path_bytes(path: &Path) -> &[u8] {
    path.as_os_str().as_bytes()
}

fn encode(hasher: Sha256) -> String {
    URL_SAFE.encode(hasher.finalize())
}
