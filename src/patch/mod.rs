//! Patch files and their effects on the package tree
//!
//! A patch file is parsed into an ordered list of [`Effect`]s:
//! - [`parse`]: git-style unified diff parsing
//! - [`reverse`]: structural inverse of an effect list
//! - [`hunk`]: matching and applying hunks to file contents
//! - [`apply`]: executing effects against the tree, live or simulated

pub mod apply;
pub mod hunk;
pub mod parse;
pub mod reverse;

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::PatchDescriptor;
use crate::error::{Result, patch};

pub use apply::{EffectError, EffectMode, execute_effects};
pub use reverse::reverse_effects;

/// Kind of lines in a hunk part
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartKind {
    Context,
    Deletion,
    Insertion,
}

/// A run of consecutive lines of the same kind inside a hunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HunkPart {
    pub kind: PartKind,
    pub lines: Vec<String>,
    /// The last line of this part is the last line of its file and has no newline
    pub no_newline_at_end_of_file: bool,
}

impl HunkPart {
    fn on_original_side(&self) -> bool {
        matches!(self.kind, PartKind::Context | PartKind::Deletion)
    }

    fn on_patched_side(&self) -> bool {
        matches!(self.kind, PartKind::Context | PartKind::Insertion)
    }
}

/// `start,len` from a hunk header; `start` is 1-based, or the line after
/// which to insert when `len` is 0
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start: usize,
    pub len: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    pub original: LineRange,
    pub patched: LineRange,
    pub parts: Vec<HunkPart>,
}

impl Hunk {
    /// Lines the hunk expects to find in the file
    pub fn original_lines(&self) -> impl Iterator<Item = &str> {
        self.parts
            .iter()
            .filter(|p| p.on_original_side())
            .flat_map(|p| p.lines.iter().map(String::as_str))
    }

    /// Lines the hunk leaves in the file
    pub fn patched_lines(&self) -> impl Iterator<Item = &str> {
        self.parts
            .iter()
            .filter(|p| p.on_patched_side())
            .flat_map(|p| p.lines.iter().map(String::as_str))
    }

    pub fn original_ends_without_newline(&self) -> bool {
        self.parts
            .iter()
            .any(|p| p.on_original_side() && p.no_newline_at_end_of_file)
    }

    pub fn patched_ends_without_newline(&self) -> bool {
        self.parts
            .iter()
            .any(|p| p.on_patched_side() && p.no_newline_at_end_of_file)
    }
}

/// One change a patch makes to the file tree.
///
/// Paths are relative to the app root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Patch {
        path: PathBuf,
        hunks: Vec<Hunk>,
    },
    FileCreation {
        path: PathBuf,
        mode: Option<u32>,
        hunk: Option<Hunk>,
    },
    FileDeletion {
        path: PathBuf,
        mode: Option<u32>,
        hunk: Option<Hunk>,
    },
    Rename {
        from: PathBuf,
        to: PathBuf,
    },
    ModeChange {
        path: PathBuf,
        old_mode: u32,
        new_mode: u32,
    },
}

/// Read and parse the patch file at `patch_file_path`.
///
/// Errors name the patch as `<patch_dir>/<patch_filename>` so the user can
/// find the file to regenerate.
pub fn read_patch(
    patch_file_path: &Path,
    descriptor: &PatchDescriptor,
    patch_dir: &str,
) -> Result<Vec<Effect>> {
    let display_path = format!("{patch_dir}/{}", descriptor.patch_filename);

    let text = std::fs::read_to_string(patch_file_path)
        .map_err(|e| patch::read_failed(&display_path, e.to_string()))?;

    let effects =
        parse::parse_patch(&text).map_err(|e| patch::parse_failed(&display_path, e.to_string()))?;

    debug!(
        patch = %display_path,
        effects = effects.len(),
        "parsed patch file"
    );
    Ok(effects)
}
