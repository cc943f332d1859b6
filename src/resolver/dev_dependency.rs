//! Dev-only dependency classification

use std::path::Path;

use tracing::debug;

use super::manifest::read_manifest;
use super::relative_deps::resolve_relative_file_dependencies;
use crate::config::RunConfig;
use crate::domain::PatchDescriptor;

/// Whether a missing install of the descriptor's package is acceptable.
///
/// `.dev.patch` files are always dev-only. In production the app manifest is
/// consulted as well.
pub fn is_effectively_dev_only(
    config: &RunConfig,
    app_path: &Path,
    descriptor: &PatchDescriptor,
) -> bool {
    descriptor.is_dev_only
        || (config.mode.is_production() && package_is_dev_dependency(app_path, descriptor))
}

/// Whether the app declares the descriptor's top-level package only as a dev dependency.
///
/// Nested patches are classified by their outermost package, since that is
/// what the app manifest lists. A missing or unreadable app manifest means
/// "not a dev dependency".
pub fn package_is_dev_dependency(app_path: &Path, descriptor: &PatchDescriptor) -> bool {
    let manifest = match read_manifest(app_path) {
        Ok(manifest) => manifest,
        Err(e) => {
            debug!(error = %e, "cannot read app manifest, assuming production dependency");
            return false;
        }
    };

    let root_name = descriptor.root_package_name();
    let dev_dependencies = resolve_relative_file_dependencies(app_path, &manifest.dev_dependencies);
    let dependencies = resolve_relative_file_dependencies(app_path, &manifest.dependencies);

    match dev_dependencies.get(root_name) {
        Some(specifier) if !dependencies.contains_key(root_name) => {
            debug!(package = root_name, specifier = %specifier, "classified as dev dependency");
            true
        }
        _ => false,
    }
}
