//! List operation
//!
//! Shows every stored patch with the package it targets and what is
//! installed for it. Read-only: nothing is applied.

use std::path::Path;

use console::Style;

use crate::config::{ApplyOptions, RunConfig};
use crate::domain::PatchDescriptor;
use crate::error::Result;
use crate::patch_fs::{decode_patch_filename, list_patch_files};
use crate::resolver::version::versions_match;
use crate::resolver::{
    InstalledVersion, VersionQuery, installed_package_version, is_effectively_dev_only,
};

/// What is installed for one listed patch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallState {
    /// Installed at the version the patch was made for
    Matching(String),
    /// Installed at a different version
    Mismatched(String),
    /// Dev-only package pruned from a production install
    DevOnlyAbsent,
    /// Missing, or its version cannot be read
    Unresolved(String),
}

/// One patch file in the listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchListing {
    pub patch_filename: String,
    /// `None` when the file name cannot be decoded
    pub descriptor: Option<PatchDescriptor>,
    pub state: Option<InstallState>,
}

/// High-level list operation
pub struct ListOperation<'a> {
    config: &'a RunConfig,
    options: &'a ApplyOptions,
}

impl<'a> ListOperation<'a> {
    pub fn new(config: &'a RunConfig, options: &'a ApplyOptions) -> Self {
        Self { config, options }
    }

    /// Collect the listing without printing it
    pub fn collect(&self) -> Result<Vec<PatchListing>> {
        let files = list_patch_files(&self.options.patches_directory())?;
        Ok(files
            .into_iter()
            .map(|patch_filename| {
                let descriptor = decode_patch_filename(&patch_filename);
                let state = descriptor
                    .as_ref()
                    .map(|d| install_state(self.config, &self.options.app_path, d));
                PatchListing {
                    patch_filename,
                    descriptor,
                    state,
                }
            })
            .collect())
    }

    /// Execute list operation
    pub fn execute(&self) -> Result<()> {
        let listings = self.collect()?;

        if listings.is_empty() {
            println!("No patch files found in {}.", self.options.patch_dir);
            return Ok(());
        }

        println!("Patches ({}):", listings.len());
        println!();
        for listing in &listings {
            display_listing(listing);
        }
        Ok(())
    }
}

fn install_state(config: &RunConfig, app_path: &Path, descriptor: &PatchDescriptor) -> InstallState {
    let query = VersionQuery {
        app_path,
        path: &descriptor.path,
        path_specifier: &descriptor.path_specifier,
        is_dev_only: is_effectively_dev_only(config, app_path, descriptor),
        patch_filename: &descriptor.patch_filename,
    };
    match installed_package_version(config, &query) {
        Ok(InstalledVersion::Present(version)) if versions_match(&version, &descriptor.version) => {
            InstallState::Matching(version)
        }
        Ok(InstalledVersion::Present(version)) => InstallState::Mismatched(version),
        Ok(InstalledVersion::Absent) => InstallState::DevOnlyAbsent,
        Err(e) => InstallState::Unresolved(e.to_string()),
    }
}

fn display_listing(listing: &PatchListing) {
    let (Some(descriptor), Some(state)) = (&listing.descriptor, &listing.state) else {
        println!(
            "  {} {}",
            Style::new().dim().apply_to(&listing.patch_filename),
            Style::new().yellow().apply_to("(unrecognized)")
        );
        return;
    };

    let dev = if descriptor.is_dev_only { " [dev]" } else { "" };
    println!(
        "  {}{}",
        Style::new().bold().yellow().apply_to(descriptor.display_id()),
        dev
    );
    println!(
        "    {} {}",
        Style::new().bold().apply_to("File:"),
        listing.patch_filename
    );
    let installed = match state {
        InstallState::Matching(version) => Style::new().green().apply_to(version.clone()),
        InstallState::Mismatched(version) => {
            Style::new().yellow().apply_to(format!("{version} (patch made for {})", descriptor.version))
        }
        InstallState::DevOnlyAbsent => Style::new().dim().apply_to("not installed (dev-only)".to_string()),
        InstallState::Unresolved(reason) => Style::new().red().apply_to(reason.clone()),
    };
    println!("    {} {}", Style::new().bold().apply_to("Installed:"), installed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExecutionMode;
    use tempfile::TempDir;

    fn install(app: &Path, name: &str, version: &str) {
        let dir = app.join("node_modules").join(name);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("package.json"),
            format!(r#"{{"name": "{name}", "version": "{version}"}}"#),
        )
        .unwrap();
    }

    fn add_patch(app: &Path, filename: &str) {
        let dir = app.join("patches");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(filename), "").unwrap();
    }

    #[test]
    fn test_collect_states() {
        let temp = TempDir::new().unwrap();
        install(temp.path(), "left-pad", "1.2.0");
        install(temp.path(), "lodash", "4.17.21");
        add_patch(temp.path(), "left-pad+1.2.0.patch");
        add_patch(temp.path(), "lodash+4.17.20.patch");
        add_patch(temp.path(), "jest+29.0.0.dev.patch");
        add_patch(temp.path(), "react+18.0.0.patch");
        add_patch(temp.path(), "broken.patch");

        let config = RunConfig::new(ExecutionMode::Production, false);
        let options = ApplyOptions::new(temp.path());
        let listings = ListOperation::new(&config, &options).collect().unwrap();

        let states: Vec<(&str, Option<&InstallState>)> = listings
            .iter()
            .map(|l| (l.patch_filename.as_str(), l.state.as_ref()))
            .collect();

        assert_eq!(states[0], ("broken.patch", None));
        assert_eq!(states[1], ("jest+29.0.0.dev.patch", Some(&InstallState::DevOnlyAbsent)));
        assert_eq!(
            states[2],
            ("left-pad+1.2.0.patch", Some(&InstallState::Matching("1.2.0".into())))
        );
        assert_eq!(
            states[3],
            ("lodash+4.17.20.patch", Some(&InstallState::Mismatched("4.17.21".into())))
        );
        assert!(matches!(states[4].1, Some(InstallState::Unresolved(_))));
    }

    #[test]
    fn test_production_dev_dependency_is_dev_only() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("package.json"),
            r#"{"devDependencies": {"jest": "^29.0.0"}}"#,
        )
        .unwrap();
        add_patch(temp.path(), "jest+29.0.0.patch");
        let options = ApplyOptions::new(temp.path());

        let production = RunConfig::new(ExecutionMode::Production, false);
        let listings = ListOperation::new(&production, &options).collect().unwrap();
        assert_eq!(listings[0].state, Some(InstallState::DevOnlyAbsent));

        let development = RunConfig::new(ExecutionMode::Development, false);
        let listings = ListOperation::new(&development, &options).collect().unwrap();
        assert!(matches!(listings[0].state, Some(InstallState::Unresolved(_))));
    }

    #[test]
    fn test_empty_listing() {
        let temp = TempDir::new().unwrap();
        let config = RunConfig::new(ExecutionMode::Development, false);
        let options = ApplyOptions::new(temp.path());
        let operation = ListOperation::new(&config, &options);

        assert!(operation.collect().unwrap().is_empty());
        assert!(operation.execute().is_ok());
    }
}
