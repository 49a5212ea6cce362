//! Types for operations and results

use liftoff_net::DownloadResult;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One committed file
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileReport {
    pub url: String,
    pub path: PathBuf,
    pub size: u64,
    pub sha256: String,
    pub attempts: u32,
    pub verified: bool,
}

impl FileReport {
    #[must_use]
    pub fn new(url: impl Into<String>, result: &DownloadResult) -> Self {
        Self {
            url: url.into(),
            path: result.path.clone(),
            size: result.size,
            sha256: result.hash.to_hex(),
            attempts: result.attempts,
            verified: result.verified,
        }
    }
}

/// Result of `download_all`
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DownloadReport {
    pub files: Vec<FileReport>,
    pub total_bytes: u64,
    /// Execution time in milliseconds
    pub duration_ms: u64,
}

/// One finished clone
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CloneReport {
    pub url: String,
    /// Where the repository actually landed
    pub path: PathBuf,
    /// The configured path, when the clone was redirected away from it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirected_from: Option<PathBuf>,
}

/// Operation result that can be serialized for CLI output
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum OperationResult {
    /// Manifest downloads
    Downloads(DownloadReport),
    /// Manifest clones
    Clones(Vec<CloneReport>),
    /// Downloads followed by clones
    Apply {
        downloads: DownloadReport,
        clones: Vec<CloneReport>,
    },
    /// A single ad-hoc acquisition
    Fetched(FileReport),
}

impl OperationResult {
    /// Convert to JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, liftoff_errors::Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
