//! gorun - run Go source files as scripts
//!
//! Builds one or more Go sources into an executable cached per user, per
//! source set and per source content, then replaces the current process
//! with it.

#[cfg(not(unix))]
compile_error!("gorun only supports Unix platforms");

pub mod build;
pub mod cache;
pub mod cli;
pub mod config;
pub mod env;
pub mod error;
pub mod invocation;
pub mod launch;

pub use error::{GorunError, GorunResult};
