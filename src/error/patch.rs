//! Patch file errors

use super::RepatchError;

/// Creates a patch read failed error
pub fn read_failed(path: impl Into<String>, reason: impl Into<String>) -> RepatchError {
    RepatchError::PatchReadFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates a patch parse failed error
pub fn parse_failed(path: impl Into<String>, reason: impl Into<String>) -> RepatchError {
    RepatchError::PatchParseFailed {
        path: path.into(),
        reason: reason.into(),
    }
}
