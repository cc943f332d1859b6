//! Single-patch application
//!
//! A patch is applied live in the requested direction. When that fails, the
//! opposite direction is simulated: if it would succeed, the tree is already
//! in the requested state and the request counts as satisfied. No marker of
//! applied patches is ever stored; the state is read back from the tree on
//! every run.

use std::path::Path;

use tracing::debug;

use crate::domain::PatchDescriptor;
use crate::error::Result;
use crate::patch::{
    Effect, EffectError, EffectMode, execute_effects, read_patch, reverse_effects,
};

/// What happened when a patch was applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchApplication {
    /// The effects were written to the tree
    Applied,
    /// The tree was already in the requested state
    AlreadySatisfied,
    /// Neither direction fits the current tree
    NotApplicable { error: String },
}

impl PatchApplication {
    pub fn is_success(&self) -> bool {
        !matches!(self, PatchApplication::NotApplicable { .. })
    }
}

/// Direction in which a patch's effects are executed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Reverse,
}

impl Direction {
    fn requested(reverse: bool) -> Self {
        if reverse {
            Direction::Reverse
        } else {
            Direction::Forward
        }
    }

    fn opposite(self) -> Self {
        match self {
            Direction::Forward => Direction::Reverse,
            Direction::Reverse => Direction::Forward,
        }
    }
}

/// Apply (or with `reverse`, undo) the patch at `patch_file_path`.
///
/// A patch that does not fit the tree is reported as
/// [`PatchApplication::NotApplicable`]; only unreadable or malformed patch
/// files are errors.
pub fn apply_patch(
    app_path: &Path,
    patch_file_path: &Path,
    descriptor: &PatchDescriptor,
    reverse: bool,
    patch_dir: &str,
) -> Result<PatchApplication> {
    let effects = read_patch(patch_file_path, descriptor, patch_dir)?;
    let requested = Direction::requested(reverse);

    let error = match attempt(app_path, &effects, requested, EffectMode::Live) {
        Ok(()) => return Ok(PatchApplication::Applied),
        Err(error) => error,
    };

    debug!(
        patch = %descriptor.patch_filename,
        %error,
        "live application failed, checking whether the tree is already in the requested state"
    );

    match attempt(app_path, &effects, requested.opposite(), EffectMode::SimulateOnly) {
        Ok(()) => Ok(PatchApplication::AlreadySatisfied),
        Err(_) => Ok(PatchApplication::NotApplicable {
            error: error.to_string(),
        }),
    }
}

fn attempt(
    app_path: &Path,
    effects: &[Effect],
    direction: Direction,
    mode: EffectMode,
) -> std::result::Result<(), EffectError> {
    match direction {
        Direction::Forward => execute_effects(app_path, effects, mode),
        Direction::Reverse => execute_effects(app_path, &reverse_effects(effects), mode),
    }
}
