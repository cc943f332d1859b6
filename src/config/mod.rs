//! Run configuration
//!
//! Execution mode and CI detection are resolved once, in the command layer,
//! and handed to the operations as a plain [`RunConfig`] value.

use std::path::PathBuf;

use clap::ValueEnum;
use tracing::debug;

/// Default name of the patches directory, relative to the app root
pub const DEFAULT_PATCH_DIR: &str = "patches";

/// Environment variable holding the execution mode
pub const MODE_ENV_VAR: &str = "NODE_ENV";

/// Environment variables whose presence marks an automated (CI) environment
const CI_ENV_VARS: &[&str] = &[
    "CI",
    "CONTINUOUS_INTEGRATION",
    "BUILD_NUMBER",
    "RUN_ID",
    "GITHUB_ACTIONS",
];

/// How the current install is being run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ExecutionMode {
    /// Production install: dev-only packages may have been pruned
    Production,
    /// Test run: failures exit non-zero
    Test,
    /// Local development
    #[default]
    Development,
}

impl ExecutionMode {
    /// Parse a mode value such as `NODE_ENV`; unknown values mean development
    pub fn from_env_value(value: &str) -> Self {
        match value.trim() {
            "production" => ExecutionMode::Production,
            "test" => ExecutionMode::Test,
            _ => ExecutionMode::Development,
        }
    }

    pub fn is_production(self) -> bool {
        self == ExecutionMode::Production
    }
}

/// Process-level settings that affect absence handling and exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunConfig {
    pub mode: ExecutionMode,
    pub is_ci: bool,
}

impl RunConfig {
    pub fn new(mode: ExecutionMode, is_ci: bool) -> Self {
        Self { mode, is_ci }
    }

    /// Detect the run configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Detect the run configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mode = lookup(MODE_ENV_VAR)
            .map(|value| ExecutionMode::from_env_value(&value))
            .unwrap_or_default();

        let is_ci = CI_ENV_VARS.iter().any(|key| {
            lookup(key).is_some_and(|value| {
                let value = value.trim();
                !value.is_empty() && value != "false" && value != "0"
            })
        });

        debug!(?mode, is_ci, "detected run configuration");
        Self { mode, is_ci }
    }

    /// Replace the detected mode with an explicit one
    pub fn with_mode(mut self, mode: Option<ExecutionMode>) -> Self {
        if let Some(mode) = mode {
            self.mode = mode;
        }
        self
    }

    /// Whether failures must produce a non-zero exit code
    pub fn strict_exit(&self) -> bool {
        self.is_ci || self.mode == ExecutionMode::Test
    }

    /// Exit code used when a batch fails
    ///
    /// Local installs keep going with 0 so a broken patch does not block `npm install`.
    pub fn failure_exit_code(&self) -> i32 {
        i32::from(self.strict_exit())
    }
}

/// Options for one apply run
#[derive(Debug, Clone)]
pub struct ApplyOptions {
    /// Application root containing `node_modules` and the patches directory
    pub app_path: PathBuf,
    /// Patches directory name, relative to `app_path`
    pub patch_dir: String,
    /// Undo the patches instead of applying them
    pub reverse: bool,
    /// Keep going after a failed patch
    pub ignore_errors: bool,
}

impl ApplyOptions {
    pub fn new(app_path: impl Into<PathBuf>) -> Self {
        Self {
            app_path: app_path.into(),
            patch_dir: DEFAULT_PATCH_DIR.to_string(),
            reverse: false,
            ignore_errors: false,
        }
    }

    pub fn patches_directory(&self) -> PathBuf {
        self.app_path.join(&self.patch_dir)
    }
}
