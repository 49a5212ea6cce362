use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::FailureContext;

/// Repository cloning events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GitEvent {
    /// Clone of a repository started
    CloneStarted { url: String, path: PathBuf },

    /// Target directory was not empty; the clone goes elsewhere
    CloneRedirected {
        url: String,
        original: PathBuf,
        redirected: PathBuf,
    },

    /// Submodule initialization started
    SubmodulesInitializing { path: PathBuf },

    /// Clone (and submodules, if requested) finished
    CloneCompleted { url: String, path: PathBuf },

    /// Clone failed
    CloneFailed {
        url: String,
        failure: FailureContext,
    },
}
