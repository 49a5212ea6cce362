//! Storage and filesystem-related error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum StorageError {
    #[error("failed to create directory {path}: {message}")]
    DirectoryCreateFailed { path: String, message: String },

    #[error("failed to write temporary file in {path}: {message}")]
    TempWriteFailed { path: String, message: String },

    #[error("failed to move {from} to {to}: {message}")]
    RenameFailed {
        from: String,
        to: String,
        message: String,
    },

    #[error("invalid path: {path}")]
    InvalidPath { path: String },

    #[error("permission denied: {path}")]
    PermissionDenied { path: String },

    #[error("path not found: {path}")]
    PathNotFound { path: String },

    #[error("IO error: {message}")]
    IoError { message: String },
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        // Without a known path, avoid inventing placeholders; preserve message only
        Self::IoError {
            message: err.to_string(),
        }
    }
}

impl StorageError {
    /// Convert an `io::Error` into a `StorageError` with an associated path
    #[must_use]
    pub fn from_io_with_path(err: &std::io::Error, path: &std::path::Path) -> Self {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied {
                path: path.display().to_string(),
            },
            std::io::ErrorKind::NotFound => Self::PathNotFound {
                path: path.display().to_string(),
            },
            _ => Self::IoError {
                message: format!("{}: {}", path.display(), err),
            },
        }
    }
}

impl UserFacingError for StorageError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::DirectoryCreateFailed { .. } | Self::PermissionDenied { .. } => {
                Some("Adjust filesystem permissions or retry with elevated privileges.")
            }
            Self::TempWriteFailed { .. } => Some("Check free disk space at the destination."),
            Self::InvalidPath { .. } => Some("A rename must be a plain file name."),
            _ => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::DirectoryCreateFailed { .. } => "storage.directory_create_failed",
            Self::TempWriteFailed { .. } => "storage.temp_write_failed",
            Self::RenameFailed { .. } => "storage.rename_failed",
            Self::InvalidPath { .. } => "storage.invalid_path",
            Self::PermissionDenied { .. } => "storage.permission_denied",
            Self::PathNotFound { .. } => "storage.path_not_found",
            Self::IoError { .. } => "storage.io_error",
        };
        Some(code)
    }
}
