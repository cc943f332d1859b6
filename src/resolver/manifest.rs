//! Package manifest (`package.json`) reading

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, fs, package};

/// Manifest file name of an installed package
pub const MANIFEST_FILE: &str = "package.json";

/// The parts of a `package.json` that repatch looks at
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageManifest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<serde_json::Value>,
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
    #[serde(default)]
    pub dev_dependencies: BTreeMap<String, String>,
}

impl PackageManifest {
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The declared version as written, `undefined` when missing
    pub fn raw_version(&self) -> String {
        match &self.version {
            Some(serde_json::Value::String(version)) => version.clone(),
            Some(other) => other.to_string(),
            None => "undefined".to_string(),
        }
    }
}

/// Read and parse the manifest in `package_dir`
pub fn read_manifest(package_dir: &Path) -> Result<PackageManifest> {
    let manifest_path = package_dir.join(MANIFEST_FILE);
    let json =
        std::fs::read_to_string(&manifest_path).map_err(|e| fs::read_error(&manifest_path, &e))?;
    PackageManifest::from_json(&json)
        .map_err(|e| package::manifest_parse_failed(manifest_path.display().to_string(), e.to_string()))
}
