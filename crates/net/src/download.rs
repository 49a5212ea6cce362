//! Acquisition pipeline: validate, fetch with retries, verify, commit

use crate::client::{NetClient, Transport};
use crate::retry::{Acquired, RetryController, RetryPolicy};
use crate::validation::validate_url;
use liftoff_errors::Error;
use liftoff_events::{
    AppEvent, DownloadEvent, EventEmitter, EventSender, FailureContext,
};
use liftoff_hash::{Hash, Verification};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// One file to acquire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub url: String,
    pub dest: PathBuf,
    /// Expected SHA-256 as hex; `None` accepts the content unverified
    pub sha256: Option<String>,
    /// Final file name placed next to `dest` instead of `dest` itself
    pub rename: Option<String>,
}

impl DownloadRequest {
    pub fn new(url: impl Into<String>, dest: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            dest: dest.into(),
            sha256: None,
            rename: None,
        }
    }

    #[must_use]
    pub fn with_sha256(mut self, sha256: impl Into<String>) -> Self {
        self.sha256 = Some(sha256.into());
        self
    }

    #[must_use]
    pub fn with_rename(mut self, rename: impl Into<String>) -> Self {
        self.rename = Some(rename.into());
        self
    }
}

/// Outcome of a successful acquisition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadResult {
    /// Where the file was committed
    pub path: PathBuf,
    pub size: u64,
    pub hash: Hash,
    /// Attempts used, including the successful one
    pub attempts: u32,
    /// `false` when no digest was supplied
    pub verified: bool,
}

/// Runs requests through the acquisition pipeline
///
/// Holds the transport as an injected handle; clones share it.
#[derive(Clone)]
pub struct Downloader {
    retry: RetryController,
    events: Option<EventSender>,
}

impl EventEmitter for Downloader {
    fn event_sender(&self) -> Option<&EventSender> {
        self.events.as_ref()
    }
}

impl Downloader {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, policy: RetryPolicy) -> Self {
        Self {
            retry: RetryController::new(transport, policy),
            events: None,
        }
    }

    /// Downloader over a default [`NetClient`] and the default retry policy
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_defaults() -> Result<Self, Error> {
        let client = NetClient::with_defaults()?;
        Ok(Self::new(Arc::new(client), RetryPolicy::default()))
    }

    /// Emit progress and outcome events on `tx`
    #[must_use]
    pub fn with_events(mut self, tx: EventSender) -> Self {
        self.retry = self.retry.with_events(tx.clone());
        self.events = Some(tx);
        self
    }

    #[must_use]
    pub fn policy(&self) -> &RetryPolicy {
        self.retry.policy()
    }

    /// Acquire one file
    ///
    /// On success the final path holds the complete content, verified when a
    /// digest was supplied. On failure the final path is untouched and no
    /// staging file remains.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error: an invalid URL, exhausted attempts,
    /// a checksum mismatch, or a storage failure while committing.
    pub async fn download(&self, request: &DownloadRequest) -> Result<DownloadResult, Error> {
        let start = Instant::now();
        info!(url = %request.url, dest = %request.dest.display(), "starting download");
        self.emit_download_started(&request.url, &request.dest);

        match self.run(request).await {
            Ok(result) => {
                info!(
                    url = %request.url,
                    path = %result.path.display(),
                    size = result.size,
                    attempts = result.attempts,
                    "download completed"
                );
                self.emit_download_completed(
                    &request.url,
                    &result.path,
                    result.size,
                    result.attempts,
                    start.elapsed(),
                );
                Ok(result)
            }
            Err(e) => {
                warn!(url = %request.url, error = %e, "download failed");
                self.emit_download_failed(&request.url, FailureContext::from_error(&e));
                Err(e)
            }
        }
    }

    async fn run(&self, request: &DownloadRequest) -> Result<DownloadResult, Error> {
        validate_url(&request.url)?;

        let Acquired { bytes, attempts } = self.retry.acquire(&request.url).await?;

        let verification = liftoff_hash::verify(&bytes, request.sha256.as_deref())?;
        let hash = verification.hash().clone();
        match verification {
            Verification::Verified(_) => {
                self.emit(AppEvent::Download(DownloadEvent::ChecksumVerified {
                    url: request.url.clone(),
                    hash: hash.to_hex(),
                }));
            }
            Verification::Unverified(_) => {
                warn!(url = %request.url, sha256 = %hash, "no checksum provided, content not verified");
                self.emit(AppEvent::Download(DownloadEvent::ChecksumSkipped {
                    url: request.url.clone(),
                    hash: hash.to_hex(),
                }));
            }
        }

        let size = bytes.len() as u64;
        let path = liftoff_root::commit(bytes, &request.dest, request.rename.as_deref()).await?;

        Ok(DownloadResult {
            path,
            size,
            verified: verification.is_verified(),
            hash,
            attempts,
        })
    }
}
