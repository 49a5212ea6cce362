#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! High-level operations orchestration for liftoff
//!
//! This crate sits between the CLI and the acquisition crates: it turns
//! manifest entries into download requests and drives the git
//! collaborator.

mod context;
mod downloads;
mod git;
mod types;

pub use context::{OpsContextBuilder, OpsCtx};
pub use downloads::{download_all, fetch, request_for};
pub use git::{clone, clone_all, clone_args, submodule_args, GitOutput, GitRunner, SystemGit};
pub use types::{CloneReport, DownloadReport, FileReport, OperationResult};

use liftoff_config::Config;
use liftoff_errors::Error;

/// Run the whole manifest: downloads first, then clones
///
/// # Errors
///
/// Returns the first download failure, or the aggregated clone failures.
pub async fn apply(ctx: &OpsCtx, config: &Config) -> Result<OperationResult, Error> {
    let downloads = download_all(ctx, &config.downloads).await?;
    let clones = clone_all(ctx, &config.git.repositories).await?;
    Ok(OperationResult::Apply { downloads, clones })
}
