use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::FailureContext;

/// Download-specific events for the event system
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DownloadEvent {
    /// Acquisition of one artifact started
    Started { url: String, dest: PathBuf },

    /// A single network attempt failed; another may follow
    AttemptFailed {
        url: String,
        attempt: u32,
        max_attempts: u32,
        reason: String,
    },

    /// Waiting before the next attempt
    Retrying {
        url: String,
        attempt: u32,
        backoff_delay: Duration,
    },

    /// The received bytes matched the declared digest
    ChecksumVerified { url: String, hash: String },

    /// No digest was declared, so the content was accepted unverified
    ChecksumSkipped { url: String, hash: String },

    /// The artifact was committed to its final path
    Completed {
        url: String,
        path: PathBuf,
        size: u64,
        attempts: u32,
        total_time: Duration,
    },

    /// Terminal failure for the request
    Failed {
        url: String,
        failure: FailureContext,
    },
}
