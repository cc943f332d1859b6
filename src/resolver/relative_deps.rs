//! Relative `file:` dependency specifiers

use std::collections::BTreeMap;
use std::path::Path;

use crate::common::path_normalizer::resolve_lexically;

const FILE_PROTOCOL: &str = "file:";

/// Anchor relative `file:` specifiers at `app_root`.
///
/// `file:../local` becomes `file:<app_root>/../local` with the `..` folded;
/// absolute `file:` paths and registry ranges are returned unchanged.
pub fn resolve_relative_file_dependencies(
    app_root: &Path,
    resolutions: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    resolutions
        .iter()
        .map(|(name, specifier)| (name.clone(), anchor_specifier(app_root, specifier)))
        .collect()
}

fn anchor_specifier(app_root: &Path, specifier: &str) -> String {
    match specifier.strip_prefix(FILE_PROTOCOL) {
        Some(location) if !location.starts_with('/') && !Path::new(location).is_absolute() => {
            let anchored = resolve_lexically(app_root, Path::new(location));
            format!("{FILE_PROTOCOL}{}", anchored.to_string_lossy())
        }
        _ => specifier.to_string(),
    }
}
