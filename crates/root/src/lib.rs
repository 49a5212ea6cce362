#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Filesystem operations for liftoff
//!
//! This crate owns everything that touches the destination filesystem:
//! the atomic committer used by the acquisition pipeline and the small
//! directory helpers the orchestration layer needs.

mod commit;

pub use commit::{commit, commit_blocking, final_path, TEMP_PREFIX, TEMP_SUFFIX};

use liftoff_errors::StorageError;
use std::path::Path;
use tokio::fs;

/// Result type for filesystem operations
type Result<T> = std::result::Result<T, liftoff_errors::Error>;

/// Create a directory with all parent directories
///
/// Idempotent: an existing directory is not an error.
///
/// # Errors
///
/// Returns `StorageError::DirectoryCreateFailed` if any component cannot be
/// created.
pub async fn create_dir_all(path: &Path) -> Result<()> {
    fs::create_dir_all(path).await.map_err(|e| {
        StorageError::DirectoryCreateFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        }
        .into()
    })
}

/// Whether `path` is a directory with at least one entry
///
/// Missing paths and unreadable directories count as empty, matching how
/// the git collaborator decides whether a clone target is free.
pub async fn is_non_empty_dir(path: &Path) -> bool {
    match fs::read_dir(path).await {
        Ok(mut entries) => matches!(entries.next_entry().await, Ok(Some(_))),
        Err(_) => false,
    }
}

/// Write a small file in one shot
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub async fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> Result<()> {
    fs::write(path, contents)
        .await
        .map_err(|e| StorageError::from_io_with_path(&e, path).into())
}
