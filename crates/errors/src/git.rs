//! Repository cloning error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum GitError {
    #[error("git clone of {url} failed: {output}")]
    CloneFailed { url: String, output: String },

    #[error("submodule initialization in {path} failed: {output}")]
    SubmoduleFailed { path: String, output: String },

    #[error("failed to run git: {message}")]
    SpawnFailed { message: String },

    #[error("some repositories failed to clone:\n{}", .failures.join("\n"))]
    Multiple { failures: Vec<String> },
}

impl UserFacingError for GitError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::SpawnFailed { .. } => Some("Make sure `git` is installed and on PATH."),
            _ => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::CloneFailed { .. } => "git.clone_failed",
            Self::SubmoduleFailed { .. } => "git.submodule_failed",
            Self::SpawnFailed { .. } => "git.spawn_failed",
            Self::Multiple { .. } => "git.multiple",
        };
        Some(code)
    }
}
