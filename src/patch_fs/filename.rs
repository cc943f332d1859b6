//! Patch file name decoding
//!
//! A patch file name encodes the dependency path and the version the patch
//! was made against:
//!
//! - `left-pad+1.2.0.patch` patches `node_modules/left-pad`
//! - `@babel+core+7.0.0.patch` patches the scoped package `@babel/core`
//! - `outer++inner+2.0.0.patch` patches `node_modules/outer/node_modules/inner`
//! - `jest+29.0.0.dev.patch` marks the patched package as dev-only

use semver::Version;

use crate::domain::PatchDescriptor;

const PATCH_SUFFIX: &str = ".patch";
const DEV_PATCH_SUFFIX: &str = ".dev.patch";
const PACKAGE_SEPARATOR: &str = "++";

/// Decode a patch file path (relative to the patches directory) into a descriptor.
///
/// Only the last path component is decoded; the full relative path is kept
/// as the descriptor's `patch_filename`. Returns `None` for names that do not
/// follow the patch file naming scheme.
pub fn decode_patch_filename(patch_filename: &str) -> Option<PatchDescriptor> {
    let file_name = patch_filename.rsplit('/').next()?;

    let (stem, is_dev_only) = match file_name.strip_suffix(DEV_PATCH_SUFFIX) {
        Some(stem) => (stem, true),
        None => (file_name.strip_suffix(PATCH_SUFFIX)?, false),
    };

    let segments: Vec<&str> = stem.split(PACKAGE_SEPARATOR).collect();
    let (last, outer) = segments.split_last()?;
    let (last_name, version) = split_version(last)?;

    let mut package_names = outer
        .iter()
        .map(|segment| decode_package_name(segment))
        .collect::<Option<Vec<_>>>()?;
    package_names.push(decode_package_name(last_name)?);

    let path = package_names
        .iter()
        .map(|name| format!("node_modules/{name}"))
        .collect::<Vec<_>>()
        .join("/");

    Some(PatchDescriptor {
        name: last_name.replace('+', "/"),
        path,
        path_specifier: package_names.join("/"),
        human_readable_path_specifier: package_names.join(" > "),
        package_names,
        version: version.to_string(),
        is_dev_only,
        patch_filename: patch_filename.to_string(),
    })
}

/// Split `name+version` at the first `+` whose remainder is a semantic version.
///
/// Scanning from the left keeps build metadata (`1.0.0+build.5`) attached to
/// the version and scope separators (`@scope+name`) attached to the name.
fn split_version(segment: &str) -> Option<(&str, &str)> {
    segment
        .match_indices('+')
        .map(|(idx, _)| (&segment[..idx], &segment[idx + 1..]))
        .find(|(name, version)| !name.is_empty() && Version::parse(version).is_ok())
}

/// Turn an encoded segment (`@scope+name`) into a package name (`@scope/name`)
fn decode_package_name(segment: &str) -> Option<String> {
    let name = segment.replace('+', "/");
    if name.is_empty() || name.chars().any(char::is_whitespace) {
        return None;
    }

    let valid = match name.strip_prefix('@') {
        Some(scoped) => {
            let mut parts = scoped.split('/');
            matches!(
                (parts.next(), parts.next(), parts.next()),
                (Some(scope), Some(pkg), None) if !scope.is_empty() && !pkg.is_empty()
            )
        }
        None => !name.contains('/'),
    };

    valid.then_some(name)
}
