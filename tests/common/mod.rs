//! Common test utilities for Repatch integration tests

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// Environment variables that change how a run behaves
const RUN_ENV_VARS: &[&str] = &[
    "NODE_ENV",
    "CI",
    "CONTINUOUS_INTEGRATION",
    "BUILD_NUMBER",
    "RUN_ID",
    "GITHUB_ACTIONS",
    "REPATCH_APP_PATH",
    "REPATCH_LOG",
];

#[allow(dead_code)]
pub const ORIGINAL: &str = "module.exports = function leftPad(str) {\n  return str;\n};\n";
#[allow(dead_code)]
pub const PATCHED: &str = "module.exports = function leftPad(str) {\n  return ' ' + str;\n};\n";

/// An application directory with node_modules and a patches directory
pub struct TestApp {
    #[allow(dead_code)]
    pub temp: TempDir,
    pub path: PathBuf,
}

#[allow(dead_code)]
impl TestApp {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();
        Self { temp, path }
    }

    /// Write a file in the app directory
    pub fn write_file(&self, path: &str, content: &str) {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
    }

    /// Read a file from the app directory
    pub fn read_file(&self, path: &str) -> String {
        std::fs::read_to_string(self.path.join(path)).expect("Failed to read file")
    }

    /// Install a package with a single `index.js`
    pub fn install(&self, name: &str, version: &str, index_js: &str) {
        self.write_file(
            &format!("node_modules/{name}/package.json"),
            &format!(r#"{{"name": "{name}", "version": "{version}"}}"#),
        );
        self.write_file(&format!("node_modules/{name}/index.js"), index_js);
    }

    /// Store a patch turning [`ORIGINAL`] into [`PATCHED`] for `name`
    pub fn add_patch(&self, filename: &str, name: &str) {
        self.write_file(&format!("patches/{filename}"), &left_pad_patch(name));
    }

    /// Contents of the package's `index.js`
    pub fn index_js(&self, name: &str) -> String {
        self.read_file(&format!("node_modules/{name}/index.js"))
    }

    /// The repatch binary, run inside this app with a clean environment
    pub fn cmd(&self) -> Command {
        let mut cmd = repatch_cmd();
        for var in RUN_ENV_VARS {
            cmd.env_remove(var);
        }
        cmd.current_dir(self.path());
        cmd
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

// Temporary fix for deprecated cargo_bin - will be updated when build-dir issues are resolved
#[allow(deprecated)]
pub fn repatch_cmd() -> Command {
    Command::cargo_bin("repatch").expect("Failed to find repatch binary")
}

/// Patch for `node_modules/<name>/index.js`
#[allow(dead_code)]
pub fn left_pad_patch(name: &str) -> String {
    format!(
        "diff --git a/node_modules/{name}/index.js b/node_modules/{name}/index.js\n\
         index 1111111..2222222 100644\n\
         --- a/node_modules/{name}/index.js\n\
         +++ b/node_modules/{name}/index.js\n\
         @@ -1,3 +1,3 @@\n \
         module.exports = function leftPad(str) {{\n\
         -  return str;\n\
         +  return ' ' + str;\n \
         }};\n"
    )
}
