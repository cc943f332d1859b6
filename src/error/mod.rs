//! Error types and handling for repatch
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! This module is organized into sub-modules by error domain:
//! - [`patch`]: Patch file reading and parsing errors
//! - [`package`]: Installed package resolution errors
//! - [`config`]: Run configuration errors
//! - [`fs`]: File system errors

pub mod config;
pub mod fs;
pub mod package;
pub mod patch;

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for repatch operations
#[derive(Error, Diagnostic, Debug)]
pub enum RepatchError {
    // Patch file errors
    #[error("Failed to read patch file: {path}: {reason}")]
    #[diagnostic(code(repatch::patch::read_failed))]
    PatchReadFailed { path: String, reason: String },

    #[error("Failed to parse patch file {path}: {reason}")]
    #[diagnostic(
        code(repatch::patch::parse_failed),
        help("The patch file may have been edited by hand. Recreate it from the modified package.")
    )]
    PatchParseFailed { path: String, reason: String },

    // Installed package errors
    #[error("Patch file found for package {name} which is not present at {path}")]
    #[diagnostic(code(repatch::package::not_installed))]
    PackageNotInstalled {
        name: String,
        path: String,
        #[help]
        suggestion: Option<String>,
    },

    #[error("Version string '{version}' cannot be parsed from {manifest}")]
    #[diagnostic(
        code(repatch::package::invalid_version),
        help("The installed package manifest must declare a valid semantic version")
    )]
    InvalidInstalledVersion { version: String, manifest: String },

    #[error("Failed to parse package manifest {path}: {reason}")]
    #[diagnostic(code(repatch::package::manifest_parse_failed))]
    ManifestParseFailed { path: String, reason: String },

    // Configuration errors
    #[error("Application directory not found: {path}")]
    #[diagnostic(
        code(repatch::config::app_path_not_found),
        help("Pass an existing directory with --app-path, or run from the project root")
    )]
    AppPathNotFound { path: String },

    // File system errors
    #[error("Failed to read file: {path}: {reason}")]
    #[diagnostic(code(repatch::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(repatch::fs::io_error))]
    IoError { message: String },
}

impl From<std::io::Error> for RepatchError {
    fn from(err: std::io::Error) -> Self {
        RepatchError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for RepatchError {
    fn from(err: serde_json::Error) -> Self {
        RepatchError::ManifestParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<walkdir::Error> for RepatchError {
    fn from(err: walkdir::Error) -> Self {
        RepatchError::IoError {
            message: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, RepatchError>;
