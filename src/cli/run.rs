//! Run: build the sources if needed, then become the built program

use crate::build::{Builder, Toolchain};
use crate::cache::{directory_key, CacheRoot};
use crate::cli::args::RunArgs;
use crate::config::Config;
use crate::error::GorunResult;
use crate::invocation::Invocation;
use crate::launch;
use tracing::debug;

/// Execute a run.
///
/// Only returns on failure; on success the process image is replaced by the
/// built program. The cache directory is removed on every failure path.
pub fn execute(args: RunArgs, config: &Config) -> GorunResult<()> {
    let (sources, forwarded) = args.into_parts();
    let invocation = Invocation::parse(sources.as_deref(), forwarded)?;
    debug!("Sources: {:?}", invocation.sources);

    let root = CacheRoot::open(&config.cache.base_dir())?;
    let key = directory_key(&invocation.sources);
    let lock = root.lock(&key)?;
    debug!("Holding {}", lock.path().display());
    let dir = root.prepare(&key)?;
    let _cleanup = dir.remove_on_failure();

    let toolchain = Toolchain::from_config(&config.toolchain)?;
    let exe = Builder::new(&toolchain).build(&invocation, &dir)?;

    match launch::exec(&exe, &invocation.args)? {}
}
