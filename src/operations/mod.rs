//! Operations over the patches directory
//!
//! This module provides high-level operations that coordinate:
//! - ApplyOperation: apply or reverse every stored patch
//! - ListOperation: show stored patches and their installed packages
//!
//! The operations coordinate with:
//! - Patch files: listing and name decoding (from patch_fs module)
//! - Resolver: installed versions and dev dependencies (from resolver module)
//! - Applier: applying one patch with already-applied detection (from applier module)
//! - UI: reporting outcomes (from ui module)

pub mod apply;
pub mod list;

pub use apply::ApplyOperation;
pub use list::ListOperation;
