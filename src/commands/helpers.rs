//! Command helper utilities

use std::path::PathBuf;

use normpath::PathExt;

use crate::config::{ApplyOptions, ExecutionMode, RunConfig};
use crate::error::{Result, config, fs};

/// Resolve the application directory from the optional argument
///
/// Falls back to the current directory. The result is normalized so that
/// relative paths and `..` segments do not leak into messages.
pub fn resolve_app_path(app_path: Option<PathBuf>) -> Result<PathBuf> {
    let path = match app_path {
        Some(path) => path,
        None => std::env::current_dir()
            .map_err(|e| fs::io_error(format!("Failed to get current directory: {e}")))?,
    };

    if !path.is_dir() {
        return Err(config::app_path_not_found(path.display().to_string()));
    }

    Ok(path
        .normalize()
        .map(|np| np.into_path_buf())
        .unwrap_or(path))
}

/// Run configuration from the environment, with the `--mode` override applied
pub fn run_config(mode: Option<ExecutionMode>) -> RunConfig {
    RunConfig::from_env().with_mode(mode)
}

/// Options for an operation over the patches in `patch_dir`
pub fn apply_options(app_path: Option<PathBuf>, patch_dir: String) -> Result<ApplyOptions> {
    let mut options = ApplyOptions::new(resolve_app_path(app_path)?);
    options.patch_dir = patch_dir;
    Ok(options)
}
