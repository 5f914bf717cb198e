//! gorun - run Go source files as scripts
//!
//! CLI entry point and the single place errors are reported.

use clap::Parser;
use console::style;
use gorun::cli::Cli;
use gorun::config::{Config, ConfigManager};
use gorun::error::GorunResult;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

fn run() -> GorunResult<()> {
    let cli = Cli::parse();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let mut config = config_manager.load()?;
    if let Some(program) = cli.toolchain {
        config.toolchain.program = program;
    }
    if let Some(dir) = cli.cache_dir {
        config.cache.dir = Some(dir);
    }

    init_logging(cli.verbose, &config);
    debug!("Configuration: {}", config_manager.path().display());

    gorun::cli::run::execute(cli.run, &config)
}

/// Logs go to stderr; stdout belongs to the launched program.
/// 0 = warn, 1 = info, 2+ = debug
fn init_logging(verbose: u8, config: &Config) {
    let filter = match verbose {
        0 => EnvFilter::new("gorun=warn"),
        1 => EnvFilter::new("gorun=info"),
        _ => EnvFilter::new("gorun=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if config.general.log_format == "json" {
        builder.json().init();
    } else {
        builder.without_time().init();
    }
}
