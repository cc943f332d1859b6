//! Patches directory access
//!
//! This module handles:
//! - Listing the patch files stored under the patches directory
//! - Decoding patch file names into [`PatchDescriptor`](crate::domain::PatchDescriptor)s

pub mod filename;

use std::path::Path;

use walkdir::WalkDir;

use crate::common::path_normalizer::to_forward_slashes;
use crate::error::Result;

pub use filename::decode_patch_filename;

/// Extension of stored patch files
pub const PATCH_EXTENSION: &str = "patch";

/// List patch files below `patches_dir`, as forward-slash paths relative to it.
///
/// Returns an empty list when the directory does not exist. Entries are
/// visited depth-first in file name order, so the listing is stable.
pub fn list_patch_files(patches_dir: &Path) -> Result<Vec<String>> {
    if !patches_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(patches_dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_patch = entry
            .path()
            .extension()
            .is_some_and(|ext| ext == PATCH_EXTENSION);
        if !is_patch {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(patches_dir)
            .unwrap_or(entry.path());
        files.push(to_forward_slashes(relative));
    }

    Ok(files)
}
