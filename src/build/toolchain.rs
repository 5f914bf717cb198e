//! Go toolchain invocation
//!
//! Every command runs with the cache directory as its working directory and
//! stdin on the null device. The process working directory is never changed.

use crate::config::schema::ToolchainConfig;
use crate::env::{EnvOverrides, EnvSnapshot};
use crate::error::{GorunError, GorunResult};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// Files the toolchain writes next to the staged sources
pub const MANIFEST_FILES: &[&str] = &["go.mod", "go.sum"];

/// How a toolchain command's stdout and stderr are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Output {
    /// Discarded
    Silent,
    /// Shared with gorun's own streams
    Inherit,
}

/// The external Go toolchain
#[derive(Debug, Clone)]
pub struct Toolchain {
    program: PathBuf,
    module_name: String,
    proxy_var: String,
    offline: bool,
    build_flags: Vec<String>,
}

impl Toolchain {
    /// Create a toolchain from configuration
    pub fn from_config(config: &ToolchainConfig) -> GorunResult<Self> {
        Ok(Self {
            program: resolve_program(&config.program)?,
            module_name: config.module_name.clone(),
            proxy_var: config.proxy_var.clone(),
            offline: config.offline,
            build_flags: config.build_flags.clone(),
        })
    }

    /// Files written by `go mod init` and `go mod tidy`
    pub fn manifest_files(&self) -> &'static [&'static str] {
        MANIFEST_FILES
    }

    /// Environment for the build steps.
    ///
    /// In offline mode the proxy variable points at the local module
    /// download cache, so `go mod tidy` only uses already downloaded modules.
    pub fn build_env(&self) -> GorunResult<EnvOverrides> {
        let mut overrides = EnvOverrides::new();
        if !self.offline {
            return Ok(overrides);
        }

        let mod_cache = self.env_value("GOMODCACHE")?;
        let proxy = format!(
            "file://{}",
            Path::new(&mod_cache).join("cache").join("download").display()
        );
        let previous = EnvSnapshot::capture(&self.proxy_var);
        info!("Build uses {}={} ({} in gorun)", self.proxy_var, proxy, previous);
        overrides.set(&self.proxy_var, proxy);
        Ok(overrides)
    }

    /// Query a toolchain setting with `go env <name>`, trimmed
    pub fn env_value(&self, name: &str) -> GorunResult<String> {
        let label = self.label(&[OsStr::new("env"), OsStr::new(name)]);
        debug!("Executing: {}", label);

        let output = Command::new(&self.program)
            .args(["env", name])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| GorunError::command_failed(&label, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GorunError::command_exec(label, stderr.trim()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// `go mod init <module>` with output discarded
    pub fn init_module(&self, workdir: &Path, env: &EnvOverrides) -> GorunResult<()> {
        let args = [
            OsStr::new("mod"),
            OsStr::new("init"),
            OsStr::new(&self.module_name),
        ];
        self.run(workdir, env, Output::Silent, &args)
    }

    /// `go mod tidy`
    pub fn tidy(&self, workdir: &Path, env: &EnvOverrides) -> GorunResult<()> {
        self.run(
            workdir,
            env,
            Output::Inherit,
            &[OsStr::new("mod"), OsStr::new("tidy")],
        )
    }

    /// `go build -o <output> <flags>`
    pub fn build(&self, workdir: &Path, env: &EnvOverrides, output: &Path) -> GorunResult<()> {
        let mut args = vec![OsStr::new("build"), OsStr::new("-o"), output.as_os_str()];
        args.extend(self.build_flags.iter().map(OsStr::new));
        self.run(workdir, env, Output::Inherit, &args)
    }

    fn run(
        &self,
        workdir: &Path,
        env: &EnvOverrides,
        output: Output,
        args: &[&OsStr],
    ) -> GorunResult<()> {
        let label = self.label(args);
        debug!("Executing in {}: {}", workdir.display(), label);

        let mut command = Command::new(&self.program);
        command.args(args).current_dir(workdir).stdin(Stdio::null());
        if output == Output::Silent {
            command.stdout(Stdio::null()).stderr(Stdio::null());
        }
        env.apply(&mut command);

        let status = command
            .status()
            .map_err(|e| GorunError::command_failed(&label, e))?;

        if status.success() {
            Ok(())
        } else {
            Err(GorunError::CommandStatus {
                command: label,
                status,
            })
        }
    }

    fn label(&self, args: &[&OsStr]) -> String {
        let mut label = self.program.display().to_string();
        for arg in args {
            label.push(' ');
            label.push_str(&arg.to_string_lossy());
        }
        label
    }
}

/// Anchor a relative program path like `./bin/go` to the current directory.
///
/// Build steps run inside the cache directory, so a relative path would
/// otherwise resolve there. Bare names are left for PATH lookup.
fn resolve_program(program: &Path) -> GorunResult<PathBuf> {
    if program.is_absolute() || program.components().count() < 2 {
        return Ok(program.to_path_buf());
    }
    std::path::absolute(program).map_err(|e| {
        GorunError::io(format!("resolving toolchain path {}", program.display()), e)
    })
}
