//! List command implementation
//!
//! Lists stored patches with the installed versions of their packages.

use std::path::PathBuf;

use super::helpers::{apply_options, run_config};
use crate::cli::ListArgs;
use crate::config::ExecutionMode;
use crate::error::Result;
use crate::operations::ListOperation;

/// Run list command
pub fn run(app_path: Option<PathBuf>, mode: Option<ExecutionMode>, args: ListArgs) -> Result<()> {
    let config = run_config(mode);
    let options = apply_options(app_path, args.patch_dir)?;
    ListOperation::new(&config, &options).execute()
}
