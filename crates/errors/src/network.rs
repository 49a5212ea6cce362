//! Network-related error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum NetworkError {
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("untrusted host: {host}")]
    UntrustedHost { host: String },

    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("HTTP error {status}: {message}")]
    HttpError { status: u16, message: String },

    #[error("content length {size} exceeds maximum allowed size of {limit} bytes")]
    OversizeContent { size: u64, limit: u64 },

    #[error("failed to read response body: {0}")]
    ReadFailed(String),

    #[error("download of {url} timed out after {seconds}s")]
    Timeout { url: String, seconds: u64 },

    #[error("attempt cancelled")]
    Cancelled,

    #[error("all {attempts} download attempts for {url} failed: {last}")]
    AllAttemptsFailed {
        url: String,
        attempts: u32,
        last: Box<NetworkError>,
    },

    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },
}

impl NetworkError {
    /// Build an `InvalidUrl` error
    pub fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// The innermost concrete cause, unwrapping `AllAttemptsFailed`
    #[must_use]
    pub fn root_cause(&self) -> &NetworkError {
        match self {
            Self::AllAttemptsFailed { last, .. } => last.root_cause(),
            other => other,
        }
    }
}

impl UserFacingError for NetworkError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::InvalidUrl { .. } => Some("Only absolute https:// URLs are accepted."),
            Self::UntrustedHost { .. } => {
                Some("Add the host to [git] trusted_hosts if you trust it.")
            }
            Self::ConnectionFailed(_) | Self::Timeout { .. } => {
                Some("Check your network connection and retry.")
            }
            Self::AllAttemptsFailed { .. } => {
                Some("The server kept failing; retry later or check the URL.")
            }
            Self::ChecksumMismatch { .. } => Some(
                "The downloaded file does not match the declared sha256. Verify the manifest entry.",
            ),
            Self::OversizeContent { .. } => Some("The remote file is larger than allowed."),
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed(_)
                | Self::HttpError { .. }
                | Self::OversizeContent { .. }
                | Self::ReadFailed(_)
                | Self::Timeout { .. }
        )
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::InvalidUrl { .. } => "network.invalid_url",
            Self::UntrustedHost { .. } => "network.untrusted_host",
            Self::ConnectionFailed(_) => "network.connection_failed",
            Self::HttpError { .. } => "network.bad_status",
            Self::OversizeContent { .. } => "network.oversize_content",
            Self::ReadFailed(_) => "network.read_failed",
            Self::Timeout { .. } => "network.timeout",
            Self::Cancelled => "network.cancelled",
            Self::AllAttemptsFailed { .. } => "network.all_attempts_failed",
            Self::ChecksumMismatch { .. } => "network.checksum_mismatch",
        };
        Some(code)
    }
}
