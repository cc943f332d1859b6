//! Repatch - post-install patches for dependencies
//!
//! Applies the patch files stored in a project to the packages installed
//! under `node_modules`, so local fixes to dependencies survive reinstalls.

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod applier;
mod cli;
mod commands;
mod common;
mod config;
mod domain;
mod error;
mod operations;
mod patch;
mod patch_fs;
mod resolver;
mod ui;

use cli::{Cli, Commands};

/// Environment variable holding the log filter
const LOG_ENV_VAR: &str = "REPATCH_LOG";

/// Install the stderr log subscriber
///
/// `REPATCH_LOG` takes precedence; otherwise only warnings are shown unless
/// `--verbose` was passed.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Apply(args) => commands::apply::run(cli.app_path, cli.mode, args),
        Commands::List(args) => commands::list::run(cli.app_path, cli.mode, args).map(|()| 0),
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
