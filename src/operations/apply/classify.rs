//! Outcome classification
//!
//! Pure decisions taken after a patch has been attempted. Kept apart from the
//! orchestrator so they can be checked without touching the file system.

use crate::domain::{ApplicationOutcome, FailureReason};
use crate::error::RepatchError;
use crate::resolver::version::versions_match;

/// Classify an attempted patch.
///
/// A patch that fails against the version it was authored for is broken;
/// one that fails against any other version has been overtaken by changes
/// to the package.
pub fn classify_application(installed: &str, authored: &str, succeeded: bool) -> ApplicationOutcome {
    let exact_version_match = versions_match(installed, authored);
    match (succeeded, exact_version_match) {
        (true, exact_version_match) => ApplicationOutcome::Applied {
            exact_version_match,
        },
        (false, true) => ApplicationOutcome::Failed(FailureReason::BrokenPatchSameVersion),
        (false, false) => ApplicationOutcome::Failed(FailureReason::AppliedAgainstDriftedVersion),
    }
}

/// Failure recorded for a version resolution error, if it is local to one patch
pub fn resolution_failure(error: &RepatchError) -> Option<FailureReason> {
    match error {
        RepatchError::PackageNotInstalled { .. } => Some(FailureReason::PackageMissing),
        RepatchError::InvalidInstalledVersion { .. } => {
            Some(FailureReason::InvalidInstalledVersion)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{fs, package};

    #[test]
    fn test_success_with_exact_version() {
        assert_eq!(
            classify_application("1.2.0", "1.2.0", true),
            ApplicationOutcome::Applied {
                exact_version_match: true
            }
        );
    }

    #[test]
    fn test_success_with_other_version() {
        assert_eq!(
            classify_application("1.3.0", "1.2.0", true),
            ApplicationOutcome::Applied {
                exact_version_match: false
            }
        );
    }

    #[test]
    fn test_failure_against_authored_version_is_broken_patch() {
        assert_eq!(
            classify_application("1.2.0", "1.2.0", false),
            ApplicationOutcome::Failed(FailureReason::BrokenPatchSameVersion)
        );
    }

    #[test]
    fn test_failure_against_other_version_is_drift() {
        assert_eq!(
            classify_application("2.0.0", "1.2.0", false),
            ApplicationOutcome::Failed(FailureReason::AppliedAgainstDriftedVersion)
        );
    }

    #[test]
    fn test_resolution_failures() {
        assert_eq!(
            resolution_failure(&package::not_installed("x", "node_modules/x", None)),
            Some(FailureReason::PackageMissing)
        );
        assert_eq!(
            resolution_failure(&package::invalid_version("latest", "node_modules/x/package.json")),
            Some(FailureReason::InvalidInstalledVersion)
        );
        assert_eq!(resolution_failure(&fs::io_error("disk on fire")), None);
    }
}
