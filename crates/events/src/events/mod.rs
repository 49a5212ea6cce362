use serde::{Deserialize, Serialize};

use liftoff_errors::UserFacingError;

/// Structured failure information shared across domains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureContext {
    /// Stable error code, when the error provides one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Short user-facing message.
    pub message: String,
    /// Optional remediation hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether retrying the operation might succeed.
    pub retryable: bool,
}

impl FailureContext {
    /// Build failure context from a `UserFacingError` implementation.
    #[must_use]
    pub fn from_error<E: UserFacingError + ?Sized>(error: &E) -> Self {
        Self {
            code: error.user_code().map(Into::into),
            message: error.user_message().into_owned(),
            hint: error.user_hint().map(Into::into),
            retryable: error.is_retryable(),
        }
    }
}

pub mod download;
pub mod general;
pub mod git;

pub use download::*;
pub use general::*;
pub use git::*;

/// Top-level application event enum that aggregates all domain-specific events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// General utility events (warnings, errors, operations)
    General(GeneralEvent),

    /// File acquisition events
    Download(DownloadEvent),

    /// Repository cloning events
    Git(GitEvent),
}

impl AppEvent {
    /// Whether this event reports a problem the user should see
    #[must_use]
    pub fn is_warning_or_error(&self) -> bool {
        matches!(
            self,
            Self::General(GeneralEvent::Warning { .. } | GeneralEvent::Error { .. })
                | Self::Download(
                    DownloadEvent::AttemptFailed { .. }
                        | DownloadEvent::ChecksumSkipped { .. }
                        | DownloadEvent::Failed { .. }
                )
                | Self::Git(GitEvent::CloneRedirected { .. } | GitEvent::CloneFailed { .. })
        )
    }
}
