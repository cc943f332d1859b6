//! Installed version resolution
//!
//! Reads the manifest of the package a patch targets and returns its
//! validated semantic version. A missing package directory is only
//! acceptable for dev-only packages in a production install, where the
//! package manager is expected to have pruned it.

use std::path::Path;

use semver::{BuildMetadata, Version};
use tracing::debug;

use super::manifest::{MANIFEST_FILE, read_manifest};
use crate::common::path_normalizer::display_relative;
use crate::config::RunConfig;
use crate::error::{Result, package};

/// What was found at a patch's install location
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstalledVersion {
    /// The package is installed with this normalized version
    Present(String),
    /// The package is absent, and that is expected
    Absent,
}

/// Everything the resolver needs to know about one patch
#[derive(Debug, Clone, Copy)]
pub struct VersionQuery<'a> {
    pub app_path: &'a Path,
    /// Install location relative to `app_path`
    pub path: &'a str,
    pub path_specifier: &'a str,
    /// Effective dev-only status (file marker or classifier)
    pub is_dev_only: bool,
    pub patch_filename: &'a str,
}

/// Resolve the installed version of the package described by `query`.
///
/// Fails with [`PackageNotInstalled`](crate::error::RepatchError::PackageNotInstalled)
/// when the package should be there but is not, and with
/// [`InvalidInstalledVersion`](crate::error::RepatchError::InvalidInstalledVersion)
/// when its manifest version is not a semantic version.
pub fn installed_package_version(
    config: &RunConfig,
    query: &VersionQuery<'_>,
) -> Result<InstalledVersion> {
    let package_dir = query.app_path.join(query.path);

    if !package_dir.exists() {
        let production = config.mode.is_production();
        if production && query.is_dev_only {
            debug!(package = query.path_specifier, "dev-only package pruned from production install");
            return Ok(InstalledVersion::Absent);
        }

        let suggestion = (production && !query.is_dev_only).then(|| {
            format!(
                "If this package is a dev dependency, rename the patch file to {}",
                dev_patch_filename(query.patch_filename)
            )
        });
        return Err(package::not_installed(
            query.path_specifier,
            display_relative(query.app_path, &package_dir),
            suggestion,
        ));
    }

    let manifest = read_manifest(&package_dir)?;
    let raw_version = manifest.raw_version();

    normalize_version(&raw_version)
        .map(InstalledVersion::Present)
        .ok_or_else(|| {
            package::invalid_version(
                raw_version,
                display_relative(query.app_path, &package_dir.join(MANIFEST_FILE)),
            )
        })
}

/// Validate and normalize a version string.
///
/// Accepts the leading `=` and `v` that `npm ci` sometimes leaves in
/// manifests and returns the canonical form. Build metadata is dropped.
pub fn normalize_version(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('=').unwrap_or(trimmed).trim_start();
    let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
    let mut version = Version::parse(trimmed).ok()?;
    version.build = BuildMetadata::EMPTY;
    Some(version.to_string())
}

/// Whether an installed version is the one a patch was authored against
pub fn versions_match(installed: &str, authored: &str) -> bool {
    match (Version::parse(installed), Version::parse(authored)) {
        (Ok(installed), Ok(authored)) => installed == authored,
        _ => installed == authored,
    }
}

/// `name+1.0.0.patch` -> `name+1.0.0.dev.patch`
fn dev_patch_filename(patch_filename: &str) -> String {
    match patch_filename.strip_suffix(".patch") {
        Some(stem) => format!("{stem}.dev.patch"),
        None => patch_filename.to_string(),
    }
}
