//! File system errors

use std::path::Path;

use super::RepatchError;

/// Creates a file read failed error
pub fn read_failed(path: impl Into<String>, reason: impl Into<String>) -> RepatchError {
    RepatchError::FileReadFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates an IO error
pub fn io_error(message: impl Into<String>) -> RepatchError {
    RepatchError::IoError {
        message: message.into(),
    }
}

/// Wraps an IO error raised while reading `path`
pub fn read_error(path: &Path, e: &std::io::Error) -> RepatchError {
    read_failed(path.display().to_string(), e.to_string())
}
