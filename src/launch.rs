//! Replacing gorun with the built program

use crate::error::{GorunError, GorunResult};
use std::convert::Infallible;
use std::ffi::OsString;
use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Replace the current process image with `exe`.
///
/// argv[0] is the executable path, followed by `args`. The environment is
/// inherited unchanged. Only returns if the exec itself fails.
pub fn exec(exe: &Path, args: &[OsString]) -> GorunResult<Infallible> {
    debug!("Executing {} with {} argument(s)", exe.display(), args.len());

    let source = Command::new(exe).arg0(exe).args(args).exec();
    Err(GorunError::Launch {
        path: exe.to_path_buf(),
        source,
    })
}
