//! Content-addressed build cache
//!
//! Executables are cached per user, per set of source paths, per source
//! content:
//!
//! ```text
//! <base>/gorun-<euid>/
//!     <directory key>.lock
//!     <directory key>/
//!         <build key>        the compiled executable
//! ```
//!
//! # Security Model
//!
//! - The per-user root and each directory are owner-only (`0700`)
//! - Any deviation (wrong type, owner, or mode) aborts the run
//! - An existing executable is trusted as the result of a successful build
//!
//! # Limitations
//!
//! Nothing is ever evicted. Directories of source sets that are no longer
//! run stay until removed by hand, and so do their `<directory key>.lock`
//! files, which outlive even the failure-path removal of the directory.

pub mod dir;
pub mod key;
pub mod lock;

pub use dir::{CacheDir, CacheRoot, RemoveOnDrop};
pub use key::{build_key, directory_key};
pub use lock::CacheLock;
