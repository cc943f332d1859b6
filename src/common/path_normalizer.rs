//! Path normalization utilities
//!
//! Paths handled here frequently do not exist yet (a relative dependency
//! location, a file a patch is about to create), so normalization is
//! lexical: `.` and `..` components are folded without touching the disk.

use std::path::{Component, Path, PathBuf};

/// Join `relative` onto `base` and fold `.` and `..` components lexically.
///
/// An absolute `relative` replaces `base`, like `path.resolve`. `..` never
/// climbs above the filesystem root.
pub fn resolve_lexically(base: &Path, relative: &Path) -> PathBuf {
    let joined = base.join(relative);
    let mut result = PathBuf::new();

    for component in joined.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => result.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => match result.components().next_back() {
                Some(Component::Normal(_)) => {
                    result.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => result.push(".."),
            },
            Component::Normal(part) => result.push(part),
        }
    }

    result
}

/// Convert a path to its forward-slash string representation
pub fn to_forward_slashes(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Display `path` relative to `base` when it lies below it
pub fn display_relative(base: &Path, path: &Path) -> String {
    path.strip_prefix(base)
        .map_or_else(|_| to_forward_slashes(path), to_forward_slashes)
}
