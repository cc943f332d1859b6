//! Configuration errors

use super::RepatchError;

/// Creates an app path not found error
pub fn app_path_not_found(path: impl Into<String>) -> RepatchError {
    RepatchError::AppPathNotFound { path: path.into() }
}
