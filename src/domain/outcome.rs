//! Application outcomes
//!
//! Outcomes only live for the duration of one run: they are produced by the
//! apply operation, reported, and folded into a [`BatchResult`].

use crate::config::RunConfig;

use super::PatchDescriptor;

/// Why a patch counted as a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// The patch does not apply even to the version it was made for
    BrokenPatchSameVersion,
    /// The patch does not apply and the installed version differs from the authored one
    AppliedAgainstDriftedVersion,
    /// The package directory is missing and the package is not an expected dev-only absence
    PackageMissing,
    /// The installed manifest does not declare a valid semantic version
    InvalidInstalledVersion,
}

/// Result of handling one patch descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationOutcome {
    Applied { exact_version_match: bool },
    SkippedDevOnlyAbsent,
    Failed(FailureReason),
}

impl ApplicationOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, ApplicationOutcome::Failed(_))
    }
}

/// Outcome of one descriptor together with the context needed to explain it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchReport {
    pub descriptor: PatchDescriptor,
    /// Installed version, when it could be resolved
    pub installed_version: Option<String>,
    pub outcome: ApplicationOutcome,
}

/// Aggregate over every patch file handled in one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    /// One report per recognized patch file that was attempted, in listing order
    pub reports: Vec<PatchReport>,
    /// Patch files whose names could not be decoded
    pub unrecognized: Vec<String>,
    /// Whether any descriptor failed
    pub has_failed: bool,
    /// Whether the run stopped at the first failure
    pub halted: bool,
}

impl BatchResult {
    pub fn count(&self, predicate: impl Fn(&ApplicationOutcome) -> bool) -> usize {
        self.reports.iter().filter(|r| predicate(&r.outcome)).count()
    }

    pub fn applied_count(&self) -> usize {
        self.count(|o| matches!(o, ApplicationOutcome::Applied { .. }))
    }

    pub fn skipped_count(&self) -> usize {
        self.count(|o| matches!(o, ApplicationOutcome::SkippedDevOnlyAbsent))
    }

    pub fn failed_count(&self) -> usize {
        self.count(ApplicationOutcome::is_failure)
    }

    /// Process exit code for this batch under `config`
    pub fn exit_code(&self, config: &RunConfig) -> i32 {
        if self.has_failed {
            config.failure_exit_code()
        } else {
            0
        }
    }
}
