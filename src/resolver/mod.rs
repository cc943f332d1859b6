//! Installed package resolution
//!
//! This module answers questions about the installed dependency tree:
//! - [`version`]: which version of a patched package is installed
//! - [`dev_dependency`]: whether a package is only a dev dependency of the app
//! - [`relative_deps`]: anchoring `file:` specifiers at the app root
//! - [`manifest`]: reading `package.json` files

pub mod dev_dependency;
pub mod manifest;
pub mod relative_deps;
pub mod version;

pub use dev_dependency::is_effectively_dev_only;
pub use version::{InstalledVersion, VersionQuery, installed_package_version};
