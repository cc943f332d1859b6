//! Effect execution
//!
//! Effects are first planned against an in-memory overlay of the package
//! tree, so later effects see the results of earlier ones and nothing is
//! written unless every effect of the patch can be carried out. A simulated
//! run stops after planning.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use super::hunk::apply_hunks;
use super::{Effect, Hunk};
use crate::common::path_normalizer::to_forward_slashes;

/// Whether effects touch the disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectMode {
    Live,
    SimulateOnly,
}

/// Why a patch cannot be applied to the current tree
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EffectError {
    #[error("cannot create {path}: file already exists")]
    FileExists { path: String },

    #[error("{path} does not exist")]
    FileMissing { path: String },

    #[error("hunk #{hunk} does not apply to {path}")]
    HunkMismatch { path: String, hunk: usize },

    #[error("{path} is not a text file")]
    NotText { path: String },

    #[error("failed to read {path}: {reason}")]
    ReadFailed { path: String, reason: String },

    #[error("failed to write {path}: {reason}")]
    WriteFailed { path: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct StagedFile {
    content: Vec<u8>,
    mode: Option<u32>,
}

/// Disk contents below `root` plus staged changes; `None` marks a deletion
struct Overlay<'a> {
    root: &'a Path,
    staged: BTreeMap<PathBuf, Option<StagedFile>>,
}

impl<'a> Overlay<'a> {
    fn new(root: &'a Path) -> Self {
        Self {
            root,
            staged: BTreeMap::new(),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        match self.staged.get(path) {
            Some(entry) => entry.is_some(),
            None => self.root.join(path).is_file(),
        }
    }

    fn read(&self, path: &Path) -> Result<StagedFile, EffectError> {
        if let Some(entry) = self.staged.get(path) {
            return entry.clone().ok_or_else(|| missing(path));
        }

        let full_path = self.root.join(path);
        if !full_path.is_file() {
            return Err(missing(path));
        }
        let content = std::fs::read(&full_path).map_err(|e| EffectError::ReadFailed {
            path: display_path(path),
            reason: e.to_string(),
        })?;
        Ok(StagedFile {
            content,
            mode: file_mode(&full_path),
        })
    }

    fn write(&mut self, path: &Path, file: StagedFile) {
        self.staged.insert(path.to_path_buf(), Some(file));
    }

    fn remove(&mut self, path: &Path) {
        self.staged.insert(path.to_path_buf(), None);
    }

    fn commit(self) -> Result<(), EffectError> {
        for (path, entry) in self.staged {
            let full_path = self.root.join(&path);
            let write_failed = |e: std::io::Error| EffectError::WriteFailed {
                path: display_path(&path),
                reason: e.to_string(),
            };

            match entry {
                Some(file) => {
                    if let Some(parent) = full_path.parent() {
                        std::fs::create_dir_all(parent).map_err(write_failed)?;
                    }
                    std::fs::write(&full_path, &file.content).map_err(write_failed)?;
                    if let Some(mode) = file.mode {
                        set_file_mode(&full_path, mode).map_err(write_failed)?;
                    }
                }
                None => {
                    if full_path.is_file() {
                        std::fs::remove_file(&full_path).map_err(write_failed)?;
                    }
                }
            }
        }
        Ok(())
    }
}

/// Execute `effects` against the tree below `root`.
///
/// In [`EffectMode::SimulateOnly`] nothing is written; the result only says
/// whether a live run would succeed.
pub fn execute_effects(root: &Path, effects: &[Effect], mode: EffectMode) -> Result<(), EffectError> {
    let mut overlay = Overlay::new(root);
    for effect in effects {
        plan_effect(&mut overlay, effect)?;
    }

    if mode == EffectMode::Live {
        debug!(files = overlay.staged.len(), "writing patched files");
        overlay.commit()?;
    }
    Ok(())
}

fn plan_effect(overlay: &mut Overlay<'_>, effect: &Effect) -> Result<(), EffectError> {
    match effect {
        Effect::FileCreation { path, mode, hunk } => {
            if overlay.exists(path) {
                return Err(EffectError::FileExists {
                    path: display_path(path),
                });
            }
            let content = hunk.as_ref().map(created_content).unwrap_or_default();
            overlay.write(
                path,
                StagedFile {
                    content: content.into_bytes(),
                    mode: *mode,
                },
            );
        }
        Effect::FileDeletion { path, .. } => {
            if !overlay.exists(path) {
                return Err(missing(path));
            }
            overlay.remove(path);
        }
        Effect::Rename { from, to } => {
            let file = overlay.read(from)?;
            if overlay.exists(to) {
                return Err(EffectError::FileExists { path: display_path(to) });
            }
            overlay.remove(from);
            overlay.write(to, file);
        }
        Effect::ModeChange { path, new_mode, .. } => {
            let mut file = overlay.read(path)?;
            if file.mode.map(is_executable) != Some(is_executable(*new_mode)) {
                file.mode = Some(*new_mode);
                overlay.write(path, file);
            }
        }
        Effect::Patch { path, hunks } => {
            let file = overlay.read(path)?;
            let text = String::from_utf8(file.content).map_err(|_| EffectError::NotText {
                path: display_path(path),
            })?;
            let patched = apply_hunks(&text, hunks).map_err(|hunk| EffectError::HunkMismatch {
                path: display_path(path),
                hunk,
            })?;
            overlay.write(
                path,
                StagedFile {
                    content: patched.into_bytes(),
                    mode: file.mode,
                },
            );
        }
    }
    Ok(())
}

/// Contents of a file created from a single insertion hunk
fn created_content(hunk: &Hunk) -> String {
    let lines: Vec<&str> = hunk.patched_lines().collect();
    if lines.is_empty() {
        return String::new();
    }
    let mut content = lines.join("\n");
    if !hunk.patched_ends_without_newline() {
        content.push('\n');
    }
    content
}

fn missing(path: &Path) -> EffectError {
    EffectError::FileMissing {
        path: display_path(path),
    }
}

fn display_path(path: &Path) -> String {
    to_forward_slashes(path)
}

fn is_executable(mode: u32) -> bool {
    mode & 0o111 != 0
}

#[cfg(unix)]
fn file_mode(path: &Path) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path).ok().map(|m| m.permissions().mode())
}

#[cfg(not(unix))]
fn file_mode(_path: &Path) -> Option<u32> {
    None
}

#[cfg(unix)]
fn set_file_mode(path: &Path, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode & 0o7777))
}

#[cfg(not(unix))]
fn set_file_mode(_path: &Path, _mode: u32) -> std::io::Result<()> {
    Ok(())
}
