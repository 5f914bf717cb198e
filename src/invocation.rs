//! Invocation parsing: which sources to build and which arguments to forward

use crate::error::{GorunError, GorunResult};
use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::os::unix::ffi::OsStrExt;
use std::path::{Component, Path, PathBuf};

/// Separator between source paths in the first positional argument
pub const PATH_SEPARATOR: u8 = b',';

/// A single gorun invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Absolute source paths, sorted, without exact duplicates
    pub sources: Vec<PathBuf>,
    /// Arguments forwarded verbatim to the built program
    pub args: Vec<OsString>,
}

impl Invocation {
    /// Build an invocation from the raw comma-separated source list.
    ///
    /// Relative paths are resolved against the current directory and `..`
    /// components are folded lexically, without following symlinks. Fails
    /// before touching the filesystem when no source is given.
    pub fn parse(raw_sources: Option<&OsStr>, args: Vec<OsString>) -> GorunResult<Self> {
        let segments: Vec<&OsStr> = raw_sources
            .map(|raw| {
                raw.as_bytes()
                    .split(|b| *b == PATH_SEPARATOR)
                    .filter(|s| !s.is_empty())
                    .map(OsStr::from_bytes)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        if segments.is_empty() {
            return Err(GorunError::NoSources);
        }

        let mut sources = segments
            .into_iter()
            .map(|s| {
                std::path::absolute(s).map(|p| clean(&p)).map_err(|e| {
                    GorunError::io(
                        format!("resolving source path {}", Path::new(s).display()),
                        e,
                    )
                })
            })
            .collect::<GorunResult<Vec<_>>>()?;

        sources.sort();
        sources.dedup();
        check_base_names(&sources)?;

        Ok(Self { sources, args })
    }
}

/// Base name a source is staged under
pub fn staged_name(source: &Path) -> GorunResult<&OsStr> {
    source
        .file_name()
        .ok_or_else(|| GorunError::SourceNameMissing(source.to_path_buf()))
}

/// Lexically normalize an absolute path: drop `.`, fold `..` into its
/// parent. `..` at the root stays at the root.
fn clean(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                cleaned.pop();
            }
            other => cleaned.push(other),
        }
    }
    cleaned
}

fn check_base_names(sources: &[PathBuf]) -> GorunResult<()> {
    let mut seen: HashMap<&OsStr, &PathBuf> = HashMap::new();
    for source in sources {
        let name = staged_name(source)?;
        if let Some(first) = seen.insert(name, source) {
            return Err(GorunError::DuplicateSourceName {
                name: name.to_string_lossy().into_owned(),
                first: first.clone(),
                second: source.clone(),
            });
        }
    }
    Ok(())
}
