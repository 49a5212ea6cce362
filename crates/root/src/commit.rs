//! Atomic commit of fetched bytes
//!
//! Bytes are staged in a uniquely named temporary file in the destination's
//! own directory, so the final rename never crosses a filesystem boundary.
//! The staging file is owned by a `NamedTempFile` guard from the moment it
//! is created: every early return or panic drops the guard and unlinks it,
//! and a successful `persist` consumes the guard so nothing is left to
//! remove.

use bytes::Bytes;
use liftoff_errors::{Error, StorageError};
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use super::Result;

/// Prefix of staging files created next to the destination
pub const TEMP_PREFIX: &str = ".liftoff-";

/// Suffix of staging files created next to the destination
pub const TEMP_SUFFIX: &str = ".part";

/// Commit `data` to `dest` (or `dest`'s directory + `rename`) atomically
///
/// Runs on the blocking pool; see [`commit_blocking`] for the steps.
///
/// # Errors
///
/// Returns a `StorageError` describing the step that failed. On error the
/// previous content of the final path, if any, is untouched.
pub async fn commit(data: Bytes, dest: &Path, rename: Option<&str>) -> Result<PathBuf> {
    let dest = dest.to_path_buf();
    let rename = rename.map(str::to_owned);

    tokio::task::spawn_blocking(move || commit_blocking(&data, &dest, rename.as_deref()))
        .await
        .map_err(|e| Error::internal(format!("commit task failed: {e}")))?
}

/// Synchronous body of [`commit`]
///
/// 1. ensure the parent directory exists
/// 2. create a staging file in that directory
/// 3. write, flush and fsync all bytes
/// 4. rename the staging file onto the final path, replacing it
///
/// # Errors
///
/// See [`commit`].
pub fn commit_blocking(data: &[u8], dest: &Path, rename: Option<&str>) -> Result<PathBuf> {
    let target = final_path(dest, rename)?;
    let dir = parent_dir(&target);

    std::fs::create_dir_all(&dir).map_err(|e| StorageError::DirectoryCreateFailed {
        path: dir.display().to_string(),
        message: e.to_string(),
    })?;

    let temp_write_failed = |e: std::io::Error| StorageError::TempWriteFailed {
        path: dir.display().to_string(),
        message: e.to_string(),
    };

    let mut staged = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .suffix(TEMP_SUFFIX)
        .tempfile_in(&dir)
        .map_err(temp_write_failed)?;

    staged.write_all(data).map_err(temp_write_failed)?;
    staged.flush().map_err(temp_write_failed)?;
    staged.as_file().sync_all().map_err(temp_write_failed)?;

    let staged_path = staged.path().to_path_buf();
    staged.persist(&target).map_err(|e| StorageError::RenameFailed {
        from: staged_path.display().to_string(),
        to: target.display().to_string(),
        message: e.error.to_string(),
    })?;

    debug!(path = %target.display(), size = data.len(), "committed download");
    Ok(target)
}

/// Compute where a download lands
///
/// Without a rename this is `dest` itself; with one it is the rename
/// placed in `dest`'s directory. A `dest` ending in a path separator names
/// that directory, so it needs a rename. A rename must be a single plain
/// file name.
///
/// # Errors
///
/// Returns `StorageError::InvalidPath` if `dest` has no file name, names a
/// directory without a rename, or the rename is not a plain file name.
pub fn final_path(dest: &Path, rename: Option<&str>) -> Result<PathBuf> {
    if dest.file_name().is_none() {
        return Err(invalid_path(dest.display().to_string()));
    }
    let names_dir = dest.to_string_lossy().ends_with(std::path::is_separator);

    match rename.filter(|r| !r.is_empty()) {
        None if names_dir => Err(invalid_path(dest.display().to_string())),
        None => Ok(dest.to_path_buf()),
        Some(name) => {
            let mut components = Path::new(name).components();
            match (components.next(), components.next()) {
                (Some(Component::Normal(_)), None) if names_dir => Ok(dest.join(name)),
                (Some(Component::Normal(_)), None) => Ok(parent_dir(dest).join(name)),
                _ => Err(invalid_path(name.to_string())),
            }
        }
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn invalid_path(path: String) -> Error {
    StorageError::InvalidPath { path }.into()
}
