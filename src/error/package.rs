//! Installed package errors

use super::RepatchError;

/// Creates a package not installed error
pub fn not_installed(
    name: impl Into<String>,
    path: impl Into<String>,
    suggestion: Option<String>,
) -> RepatchError {
    RepatchError::PackageNotInstalled {
        name: name.into(),
        path: path.into(),
        suggestion,
    }
}

/// Creates an invalid installed version error
pub fn invalid_version(version: impl Into<String>, manifest: impl Into<String>) -> RepatchError {
    RepatchError::InvalidInstalledVersion {
        version: version.into(),
        manifest: manifest.into(),
    }
}

/// Creates a manifest parse failed error
pub fn manifest_parse_failed(path: impl Into<String>, reason: impl Into<String>) -> RepatchError {
    RepatchError::ManifestParseFailed {
        path: path.into(),
        reason: reason.into(),
    }
}
