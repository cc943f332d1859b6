//! Apply command implementation
//!
//! Runs the apply operation over the patches directory and turns the batch
//! result into the process exit code.

use std::path::PathBuf;

use tracing::debug;

use super::helpers::{apply_options, run_config};
use crate::cli::ApplyArgs;
use crate::config::ExecutionMode;
use crate::error::Result;
use crate::operations::ApplyOperation;
use crate::ui::ConsoleReporter;

/// Run apply command, returning the exit code
pub fn run(app_path: Option<PathBuf>, mode: Option<ExecutionMode>, args: ApplyArgs) -> Result<i32> {
    let config = run_config(mode);
    let mut options = apply_options(app_path, args.patch_dir)?;
    options.reverse = args.reverse;
    options.ignore_errors = args.ignore_errors;

    debug!(
        app_path = %options.app_path.display(),
        mode = ?config.mode,
        ci = config.is_ci,
        "starting apply"
    );

    let mut reporter = ConsoleReporter::new(options.reverse);
    let result = ApplyOperation::new(&config, &options).execute(&mut reporter)?;
    Ok(result.exit_code(&config))
}
