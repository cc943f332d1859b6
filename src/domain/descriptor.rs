//! Patch descriptor
//!
//! The parsed identity of one stored patch file.

/// Identity of one patch file: which package it targets, where that package
/// is installed, and which version the patch was made against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchDescriptor {
    /// Name of the patched package (the innermost one for nested paths)
    pub name: String,
    /// Package names from the outermost dependency to the patched one
    pub package_names: Vec<String>,
    /// Install location relative to the app root, e.g. `node_modules/a/node_modules/b`
    pub path: String,
    /// Slash-joined package names, e.g. `a/b`
    pub path_specifier: String,
    /// Package names joined for display, e.g. `a > b`
    pub human_readable_path_specifier: String,
    /// Version the patch was authored against
    pub version: String,
    /// Whether the patch file is marked as targeting a dev-only package
    pub is_dev_only: bool,
    /// Patch file path relative to the patches directory
    pub patch_filename: String,
}

impl PatchDescriptor {
    /// The package at the top of the dependency path
    pub fn root_package_name(&self) -> &str {
        self.package_names
            .first()
            .map_or(self.name.as_str(), String::as_str)
    }

    /// `name@version` as written in the patch file name
    pub fn display_id(&self) -> String {
        format!("{}@{}", self.human_readable_path_specifier, self.version)
    }
}

#[cfg(test)]
pub(crate) fn descriptor_for(names: &[&str], version: &str) -> PatchDescriptor {
    let package_names: Vec<String> = names.iter().map(|n| (*n).to_string()).collect();
    let path = package_names
        .iter()
        .map(|n| format!("node_modules/{n}"))
        .collect::<Vec<_>>()
        .join("/");
    let stem = package_names
        .iter()
        .map(|n| n.replace('/', "+"))
        .collect::<Vec<_>>()
        .join("++");
    PatchDescriptor {
        name: package_names.last().cloned().unwrap_or_default(),
        path_specifier: package_names.join("/"),
        human_readable_path_specifier: package_names.join(" > "),
        package_names,
        path,
        version: version.to_string(),
        is_dev_only: false,
        patch_filename: format!("{stem}+{version}.patch"),
    }
}
