//! Apply operation
//!
//! Drives one run over the patches directory: every patch file is decoded,
//! its package version resolved, the patch applied (or reversed) and the
//! outcome classified and reported. The run is a fold over patch files into
//! a [`BatchResult`]; whether it stops at the first failure depends on
//! `ignore_errors`.

pub mod classify;

use std::path::Path;

use tracing::{debug, info};

use crate::applier::{PatchApplication, apply_patch};
use crate::common::path_normalizer::display_relative;
use crate::config::{ApplyOptions, RunConfig};
use crate::domain::{ApplicationOutcome, BatchResult, FailureReason, PatchDescriptor, PatchReport};
use crate::error::Result;
use crate::patch_fs::{decode_patch_filename, list_patch_files};
use crate::resolver::{
    InstalledVersion, VersionQuery, installed_package_version, is_effectively_dev_only,
};
use crate::ui::{ApplyReporter, PatchContext};

pub use classify::{classify_application, resolution_failure};

/// Applies every patch under the patches directory
pub struct ApplyOperation<'a> {
    config: &'a RunConfig,
    options: &'a ApplyOptions,
}

impl<'a> ApplyOperation<'a> {
    pub fn new(config: &'a RunConfig, options: &'a ApplyOptions) -> Self {
        Self { config, options }
    }

    /// Execute the run.
    ///
    /// Patch failures are reported and recorded in the result; only errors
    /// outside that taxonomy (unreadable patch files, I/O failures) are
    /// returned as `Err`.
    pub fn execute(&self, reporter: &mut dyn ApplyReporter) -> Result<BatchResult> {
        let patches_dir = self.options.patches_directory();
        let files = list_patch_files(&patches_dir)?;
        let mut result = BatchResult::default();

        if files.is_empty() {
            reporter.no_patches_found(&display_relative(&self.options.app_path, &patches_dir));
            return Ok(result);
        }

        debug!(
            count = files.len(),
            mode = ?self.config.mode,
            ci = self.config.is_ci,
            reverse = self.options.reverse,
            "applying patches"
        );

        let last_index = files.len() - 1;
        for (index, filename) in files.iter().enumerate() {
            let Some(descriptor) = decode_patch_filename(filename) else {
                debug!(file = %filename, "skipping unrecognized patch file");
                reporter.unrecognized_patch_file(filename);
                result.unrecognized.push(filename.clone());
                continue;
            };

            let report = self.apply_one(&patches_dir, descriptor, reporter)?;
            let failed = report.outcome.is_failure();
            result.reports.push(report);

            if failed {
                result.has_failed = true;
                if !self.options.ignore_errors {
                    info!(file = %filename, "stopping after failed patch");
                    result.halted = true;
                    break;
                }
                if index < last_index {
                    reporter.continuing_after_failure();
                }
            }
        }

        reporter.summary(&result);
        Ok(result)
    }

    fn apply_one(
        &self,
        patches_dir: &Path,
        descriptor: PatchDescriptor,
        reporter: &mut dyn ApplyReporter,
    ) -> Result<PatchReport> {
        let app_path = self.options.app_path.as_path();
        let is_dev_only = is_effectively_dev_only(self.config, app_path, &descriptor);

        let query = VersionQuery {
            app_path,
            path: &descriptor.path,
            path_specifier: &descriptor.path_specifier,
            is_dev_only,
            patch_filename: &descriptor.patch_filename,
        };

        let installed = match installed_package_version(self.config, &query) {
            Ok(InstalledVersion::Present(version)) => version,
            Ok(InstalledVersion::Absent) => {
                reporter.skipped_dev_only(&descriptor);
                return Ok(PatchReport {
                    descriptor,
                    installed_version: None,
                    outcome: ApplicationOutcome::SkippedDevOnlyAbsent,
                });
            }
            Err(error) => {
                let Some(reason) = resolution_failure(&error) else {
                    return Err(error);
                };
                reporter.descriptor_error(&descriptor, &error);
                return Ok(PatchReport {
                    descriptor,
                    installed_version: None,
                    outcome: ApplicationOutcome::Failed(reason),
                });
            }
        };

        let application = apply_patch(
            app_path,
            &patches_dir.join(&descriptor.patch_filename),
            &descriptor,
            self.options.reverse,
            &self.options.patch_dir,
        )?;
        if application == PatchApplication::AlreadySatisfied {
            debug!(patch = %descriptor.patch_filename, "tree already in requested state");
        }

        let outcome =
            classify_application(&installed, &descriptor.version, application.is_success());
        let detail = match &application {
            PatchApplication::NotApplicable { error } => error.as_str(),
            _ => "",
        };

        let ctx = PatchContext {
            descriptor: &descriptor,
            patch_dir: &self.options.patch_dir,
            installed_version: &installed,
        };
        match outcome {
            ApplicationOutcome::Applied {
                exact_version_match: true,
            } => reporter.applied(&descriptor),
            ApplicationOutcome::Applied {
                exact_version_match: false,
            } => reporter.version_mismatch(&ctx),
            ApplicationOutcome::Failed(FailureReason::BrokenPatchSameVersion) => {
                reporter.broken_patch(&ctx, detail);
            }
            ApplicationOutcome::Failed(_) => reporter.drifted_dependency(&ctx, detail),
            ApplicationOutcome::SkippedDevOnlyAbsent => {}
        }

        Ok(PatchReport {
            descriptor,
            installed_version: Some(installed),
            outcome,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExecutionMode;
    use crate::error::RepatchError;
    use tempfile::TempDir;

    /// Everything a run reported, in order
    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Event {
        NoPatches,
        Unrecognized(String),
        Skipped(String),
        Applied(String),
        VersionMismatch(String),
        Broken(String),
        Drifted(String),
        DescriptorError(String),
        Continuing,
        Summary,
    }

    #[derive(Default)]
    struct RecordingReporter {
        events: Vec<Event>,
    }

    impl ApplyReporter for RecordingReporter {
        fn no_patches_found(&mut self, _patches_dir: &str) {
            self.events.push(Event::NoPatches);
        }

        fn unrecognized_patch_file(&mut self, filename: &str) {
            self.events.push(Event::Unrecognized(filename.to_string()));
        }

        fn skipped_dev_only(&mut self, descriptor: &PatchDescriptor) {
            self.events.push(Event::Skipped(descriptor.name.clone()));
        }

        fn applied(&mut self, descriptor: &PatchDescriptor) {
            self.events.push(Event::Applied(descriptor.name.clone()));
        }

        fn version_mismatch(&mut self, ctx: &PatchContext<'_>) {
            self.events
                .push(Event::VersionMismatch(ctx.descriptor.name.clone()));
        }

        fn broken_patch(&mut self, ctx: &PatchContext<'_>, _detail: &str) {
            self.events.push(Event::Broken(ctx.descriptor.name.clone()));
        }

        fn drifted_dependency(&mut self, ctx: &PatchContext<'_>, _detail: &str) {
            self.events.push(Event::Drifted(ctx.descriptor.name.clone()));
        }

        fn descriptor_error(&mut self, descriptor: &PatchDescriptor, _error: &RepatchError) {
            self.events
                .push(Event::DescriptorError(descriptor.name.clone()));
        }

        fn continuing_after_failure(&mut self) {
            self.events.push(Event::Continuing);
        }

        fn summary(&mut self, _result: &BatchResult) {
            self.events.push(Event::Summary);
        }
    }

    struct TestApp {
        temp: TempDir,
    }

    impl TestApp {
        fn new() -> Self {
            Self {
                temp: TempDir::new().unwrap(),
            }
        }

        fn path(&self) -> &Path {
            self.temp.path()
        }

        fn install(&self, name: &str, version: &str, contents: &str) {
            let dir = self.path().join("node_modules").join(name);
            std::fs::create_dir_all(&dir).unwrap();
            std::fs::write(
                dir.join("package.json"),
                format!(r#"{{"name": "{name}", "version": "{version}"}}"#),
            )
            .unwrap();
            std::fs::write(dir.join("index.js"), contents).unwrap();
        }

        fn add_patch(&self, filename: &str, package: &str) {
            let dir = self.path().join("patches");
            std::fs::create_dir_all(&dir).unwrap();
            std::fs::write(dir.join(filename), patch_text(package)).unwrap();
        }

        fn contents(&self, name: &str) -> String {
            std::fs::read_to_string(self.path().join("node_modules").join(name).join("index.js"))
                .unwrap()
        }

        fn run(&self, config: &RunConfig, options: &ApplyOptions) -> (Result<BatchResult>, Vec<Event>) {
            let mut reporter = RecordingReporter::default();
            let result = ApplyOperation::new(config, options).execute(&mut reporter);
            (result, reporter.events)
        }

        fn options(&self) -> ApplyOptions {
            ApplyOptions::new(self.path())
        }
    }

    const ORIGINAL: &str = "module.exports = 'original';\n";
    const PATCHED: &str = "module.exports = 'patched';\n";

    fn patch_text(package: &str) -> String {
        format!(
            "diff --git a/node_modules/{package}/index.js b/node_modules/{package}/index.js\n\
             --- a/node_modules/{package}/index.js\n\
             +++ b/node_modules/{package}/index.js\n\
             @@ -1 +1 @@\n\
             -module.exports = 'original';\n\
             +module.exports = 'patched';\n"
        )
    }

    fn development() -> RunConfig {
        RunConfig::new(ExecutionMode::Development, false)
    }

    fn production() -> RunConfig {
        RunConfig::new(ExecutionMode::Production, false)
    }

    #[test]
    fn test_no_patch_files_is_success() {
        let app = TestApp::new();
        let (result, events) = app.run(&development(), &app.options());
        let result = result.unwrap();

        assert_eq!(events, vec![Event::NoPatches]);
        assert!(result.reports.is_empty());
        assert_eq!(result.exit_code(&RunConfig::new(ExecutionMode::Test, true)), 0);
    }

    #[test]
    fn test_exact_version_applies() {
        let app = TestApp::new();
        app.install("left-pad", "1.2.0", ORIGINAL);
        app.add_patch("left-pad+1.2.0.patch", "left-pad");

        let (result, events) = app.run(&development(), &app.options());
        let result = result.unwrap();

        assert_eq!(
            result.reports[0].outcome,
            ApplicationOutcome::Applied {
                exact_version_match: true
            }
        );
        assert_eq!(result.reports[0].installed_version.as_deref(), Some("1.2.0"));
        assert!(!result.has_failed);
        assert_eq!(result.exit_code(&development()), 0);
        assert_eq!(events, vec![Event::Applied("left-pad".into()), Event::Summary]);
        assert_eq!(app.contents("left-pad"), PATCHED);
    }

    #[test]
    fn test_other_version_applies_with_warning() {
        let app = TestApp::new();
        app.install("left-pad", "1.3.0", ORIGINAL);
        app.add_patch("left-pad+1.2.0.patch", "left-pad");

        let (result, events) = app.run(&development(), &app.options());
        let result = result.unwrap();

        assert_eq!(
            result.reports[0].outcome,
            ApplicationOutcome::Applied {
                exact_version_match: false
            }
        );
        assert!(!result.has_failed);
        assert_eq!(events[0], Event::VersionMismatch("left-pad".into()));
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let app = TestApp::new();
        app.install("left-pad", "1.2.0", ORIGINAL);
        app.add_patch("left-pad+1.2.0.patch", "left-pad");

        app.run(&development(), &app.options()).0.unwrap();
        let (result, _) = app.run(&development(), &app.options());

        assert!(!result.unwrap().has_failed);
        assert_eq!(app.contents("left-pad"), PATCHED);
    }

    #[test]
    fn test_reverse_restores_package() {
        let app = TestApp::new();
        app.install("left-pad", "1.2.0", ORIGINAL);
        app.add_patch("left-pad+1.2.0.patch", "left-pad");
        app.run(&development(), &app.options()).0.unwrap();

        let mut options = app.options();
        options.reverse = true;
        let (result, events) = app.run(&development(), &options);

        assert!(!result.unwrap().has_failed);
        assert_eq!(events[0], Event::Applied("left-pad".into()));
        assert_eq!(app.contents("left-pad"), ORIGINAL);
    }

    #[test]
    fn test_dev_only_patch_skipped_in_production() {
        let app = TestApp::new();
        app.add_patch("jest+29.0.0.dev.patch", "jest");

        let (result, events) = app.run(&production(), &app.options());
        let result = result.unwrap();

        assert_eq!(result.reports[0].outcome, ApplicationOutcome::SkippedDevOnlyAbsent);
        assert!(!result.has_failed);
        assert_eq!(events[0], Event::Skipped("jest".into()));
    }

    #[test]
    fn test_dev_dependency_from_app_manifest_skipped_in_production() {
        let app = TestApp::new();
        std::fs::write(
            app.path().join("package.json"),
            r#"{"name": "app", "devDependencies": {"jest": "^29.0.0"}}"#,
        )
        .unwrap();
        app.add_patch("jest+29.0.0.patch", "jest");

        let (result, _) = app.run(&production(), &app.options());
        assert_eq!(
            result.unwrap().reports[0].outcome,
            ApplicationOutcome::SkippedDevOnlyAbsent
        );
    }

    #[test]
    fn test_missing_package_fails_outside_production() {
        let app = TestApp::new();
        app.add_patch("jest+29.0.0.dev.patch", "jest");

        let (result, events) = app.run(&development(), &app.options());
        let result = result.unwrap();

        assert_eq!(
            result.reports[0].outcome,
            ApplicationOutcome::Failed(FailureReason::PackageMissing)
        );
        assert!(result.has_failed);
        assert_eq!(events[0], Event::DescriptorError("jest".into()));
    }

    #[test]
    fn test_invalid_installed_version_fails() {
        let app = TestApp::new();
        app.install("left-pad", "not-a-version", ORIGINAL);
        app.add_patch("left-pad+1.2.0.patch", "left-pad");

        let (result, _) = app.run(&development(), &app.options());
        assert_eq!(
            result.unwrap().reports[0].outcome,
            ApplicationOutcome::Failed(FailureReason::InvalidInstalledVersion)
        );
    }

    #[test]
    fn test_unapplicable_patch_on_authored_version_is_broken() {
        let app = TestApp::new();
        app.install("left-pad", "1.2.0", "module.exports = 'rewritten';\n");
        app.add_patch("left-pad+1.2.0.patch", "left-pad");

        let (result, events) = app.run(&development(), &app.options());
        let result = result.unwrap();

        assert_eq!(
            result.reports[0].outcome,
            ApplicationOutcome::Failed(FailureReason::BrokenPatchSameVersion)
        );
        assert_eq!(events[0], Event::Broken("left-pad".into()));
        assert_eq!(result.exit_code(&development()), 0);
        assert_eq!(result.exit_code(&RunConfig::new(ExecutionMode::Test, false)), 1);
    }

    #[test]
    fn test_unapplicable_patch_on_other_version_is_drift() {
        let app = TestApp::new();
        app.install("left-pad", "2.0.0", "module.exports = 'rewritten';\n");
        app.add_patch("left-pad+1.2.0.patch", "left-pad");

        let (result, events) = app.run(&development(), &app.options());
        assert_eq!(
            result.unwrap().reports[0].outcome,
            ApplicationOutcome::Failed(FailureReason::AppliedAgainstDriftedVersion)
        );
        assert_eq!(events[0], Event::Drifted("left-pad".into()));
    }

    fn three_packages_second_broken(app: &TestApp) {
        app.install("a-pkg", "1.0.0", ORIGINAL);
        app.install("b-pkg", "1.0.0", "module.exports = 'rewritten';\n");
        app.install("c-pkg", "1.0.0", ORIGINAL);
        app.add_patch("a-pkg+1.0.0.patch", "a-pkg");
        app.add_patch("b-pkg+1.0.0.patch", "b-pkg");
        app.add_patch("c-pkg+1.0.0.patch", "c-pkg");
    }

    #[test]
    fn test_ignore_errors_continues_past_failure() {
        let app = TestApp::new();
        three_packages_second_broken(&app);
        let mut options = app.options();
        options.ignore_errors = true;

        let (result, events) = app.run(&development(), &options);
        let result = result.unwrap();

        assert_eq!(result.reports.len(), 3);
        assert!(result.has_failed);
        assert!(!result.halted);
        assert_eq!(result.failed_count(), 1);
        assert_eq!(app.contents("c-pkg"), PATCHED);
        assert_eq!(
            events,
            vec![
                Event::Applied("a-pkg".into()),
                Event::Broken("b-pkg".into()),
                Event::Continuing,
                Event::Applied("c-pkg".into()),
                Event::Summary,
            ]
        );
        assert_eq!(result.exit_code(&RunConfig::new(ExecutionMode::Development, true)), 1);
    }

    #[test]
    fn test_failure_halts_run_without_ignore_errors() {
        let app = TestApp::new();
        three_packages_second_broken(&app);

        let (result, events) = app.run(&development(), &app.options());
        let result = result.unwrap();

        assert_eq!(result.reports.len(), 2);
        assert!(result.has_failed);
        assert!(result.halted);
        assert_eq!(app.contents("c-pkg"), ORIGINAL);
        assert!(!events.contains(&Event::Applied("c-pkg".into())));
        assert!(!events.contains(&Event::Continuing));
    }

    #[test]
    fn test_no_continuation_warning_after_last_patch() {
        let app = TestApp::new();
        app.install("a-pkg", "1.0.0", ORIGINAL);
        app.install("b-pkg", "1.0.0", "module.exports = 'rewritten';\n");
        app.add_patch("a-pkg+1.0.0.patch", "a-pkg");
        app.add_patch("b-pkg+1.0.0.patch", "b-pkg");
        let mut options = app.options();
        options.ignore_errors = true;

        let (_, events) = app.run(&development(), &options);
        assert!(!events.contains(&Event::Continuing));
    }

    #[test]
    fn test_unrecognized_file_is_skipped() {
        let app = TestApp::new();
        app.install("left-pad", "1.2.0", ORIGINAL);
        app.add_patch("left-pad+1.2.0.patch", "left-pad");
        app.add_patch("not-a-versioned-name.patch", "left-pad");

        let (result, events) = app.run(&development(), &app.options());
        let result = result.unwrap();

        assert!(!result.has_failed);
        assert_eq!(result.unrecognized, vec!["not-a-versioned-name.patch".to_string()]);
        assert!(events.contains(&Event::Unrecognized("not-a-versioned-name.patch".into())));
    }

    #[test]
    fn test_malformed_patch_file_aborts_run() {
        let app = TestApp::new();
        app.install("left-pad", "1.2.0", ORIGINAL);
        let dir = app.path().join("patches");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("left-pad+1.2.0.patch"), "garbage\n").unwrap();

        let (result, _) = app.run(&development(), &app.options());
        assert!(matches!(
            result.unwrap_err(),
            RepatchError::PatchParseFailed { .. }
        ));
    }

    #[test]
    fn test_custom_patch_dir() {
        let app = TestApp::new();
        app.install("left-pad", "1.2.0", ORIGINAL);
        let dir = app.path().join("fixes");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("left-pad+1.2.0.patch"), patch_text("left-pad")).unwrap();

        let mut options = app.options();
        options.patch_dir = "fixes".to_string();
        let (result, _) = app.run(&development(), &options);

        assert_eq!(result.unwrap().applied_count(), 1);
        assert_eq!(app.contents("left-pad"), PATCHED);
    }
}
