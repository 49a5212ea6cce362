#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Secure file acquisition for liftoff
//!
//! This crate fetches remote files over HTTPS and lands them on disk:
//! URL validation, a hardened HTTP transport, bounded retries with
//! per-attempt deadlines, SHA-256 verification, and an atomic commit.

mod client;
mod download;
mod retry;
mod validation;

pub use client::{NetClient, NetConfig, Transport, MAX_CONTENT_LENGTH, MAX_REDIRECTS};
pub use download::{DownloadRequest, DownloadResult, Downloader};
pub use retry::{Acquired, RetryController, RetryPolicy};
pub use validation::{validate_url, HostPolicy, DEFAULT_TRUSTED_HOSTS};

pub use tokio_util::sync::CancellationToken;

use liftoff_errors::Error;

/// Acquire a single file with `downloader`
///
/// # Errors
///
/// Returns an error if the URL is invalid, every attempt fails, the content
/// does not match the expected digest, or the file cannot be committed.
pub async fn download_file(
    downloader: &Downloader,
    request: &DownloadRequest,
) -> Result<DownloadResult, Error> {
    downloader.download(request).await
}
