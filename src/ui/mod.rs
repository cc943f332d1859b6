//! User-facing output
//!
//! Everything an apply run tells the user goes through the [`ApplyReporter`]
//! trait, so the orchestrator stays free of formatting and tests can record
//! what would have been printed.

pub mod reporter;

use crate::domain::{BatchResult, PatchDescriptor};
use crate::error::RepatchError;

pub use reporter::ConsoleReporter;

/// A patch together with what was found installed for it
#[derive(Debug, Clone, Copy)]
pub struct PatchContext<'a> {
    pub descriptor: &'a PatchDescriptor,
    pub patch_dir: &'a str,
    pub installed_version: &'a str,
}

impl PatchContext<'_> {
    /// `<patch_dir>/<patch_filename>`
    pub fn patch_location(&self) -> String {
        format!("{}/{}", self.patch_dir, self.descriptor.patch_filename)
    }
}

/// Receives the events of an apply run
pub trait ApplyReporter {
    fn no_patches_found(&mut self, patches_dir: &str);

    fn unrecognized_patch_file(&mut self, filename: &str);

    fn skipped_dev_only(&mut self, descriptor: &PatchDescriptor);

    fn applied(&mut self, descriptor: &PatchDescriptor);

    /// The patch took effect, but on a different version than it was made for
    fn version_mismatch(&mut self, ctx: &PatchContext<'_>);

    /// The patch does not apply to the version it was made for
    fn broken_patch(&mut self, ctx: &PatchContext<'_>, detail: &str);

    /// The patch does not apply and the installed package has changed
    fn drifted_dependency(&mut self, ctx: &PatchContext<'_>, detail: &str);

    /// The installed package could not be resolved
    fn descriptor_error(&mut self, descriptor: &PatchDescriptor, error: &RepatchError);

    fn continuing_after_failure(&mut self);

    fn summary(&mut self, result: &BatchResult);
}
