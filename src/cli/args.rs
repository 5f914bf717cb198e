//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser};
use std::ffi::OsString;
use std::path::PathBuf;

/// gorun - run Go source files as scripts
///
/// Builds the given sources into a cached executable and replaces itself
/// with it. Options are only recognized before the source list; everything
/// after it is passed to the program.
#[derive(Parser, Debug)]
#[command(name = "gorun")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, env = "GORUN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Go toolchain binary (overrides toolchain.program)
    #[arg(long, env = "GORUN_TOOLCHAIN")]
    pub toolchain: Option<PathBuf>,

    /// Base directory for the build cache (overrides cache.dir)
    #[arg(long, env = "GORUN_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    #[command(flatten)]
    pub run: RunArgs,
}

/// What to build and what to pass to it
#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// Comma-separated Go source files, followed by arguments for the program
    #[arg(
        value_name = "SOURCES",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub command: Vec<OsString>,
}

impl RunArgs {
    /// Split into the raw source list and the forwarded arguments
    pub fn into_parts(self) -> (Option<OsString>, Vec<OsString>) {
        let mut command = self.command.into_iter();
        let sources = command.next();
        (sources, command.collect())
    }
}
