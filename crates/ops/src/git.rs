//! Repository cloning
//!
//! Every URL passes the host allow-list and the https validator before a
//! git process is spawned. Occupied targets are never overwritten: the
//! clone is redirected into the failed directory with a metadata note.

use crate::{CloneReport, OpsCtx};
use async_trait::async_trait;
use liftoff_config::Repository;
use liftoff_errors::{Error, GitError};
use liftoff_events::{AppEvent, EventEmitter, FailureContext, GitEvent};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tracing::{info, warn};

/// Hardening flags applied to every git invocation
const GIT_CONFIG: &[&str] = &[
    "protocol.version=2",
    "transfer.fsckObjects=true",
    "fetch.fsckObjects=true",
];

/// Combined result of one git invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitOutput {
    pub success: bool,
    /// stdout followed by stderr
    pub output: String,
}

/// Runs git with the given arguments
#[async_trait]
pub trait GitRunner: Send + Sync {
    /// Run `git <args>` to completion
    async fn run(&self, args: &[String]) -> Result<GitOutput, Error>;
}

/// [`GitRunner`] backed by the `git` binary on `PATH`
#[derive(Debug, Clone)]
pub struct SystemGit {
    program: PathBuf,
}

impl Default for SystemGit {
    fn default() -> Self {
        Self {
            program: PathBuf::from("git"),
        }
    }
}

impl SystemGit {
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl GitRunner for SystemGit {
    async fn run(&self, args: &[String]) -> Result<GitOutput, Error> {
        let output = tokio::process::Command::new(&self.program)
            .args(args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| GitError::SpawnFailed {
                message: format!("{}: {e}", self.program.display()),
            })?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(GitOutput {
            success: output.status.success(),
            output: text.trim().to_string(),
        })
    }
}

/// Arguments for `git clone`
#[must_use]
pub fn clone_args(repo: &Repository, target: &Path) -> Vec<String> {
    let mut args = vec!["clone".to_string()];
    for setting in GIT_CONFIG {
        args.push("--config".to_string());
        args.push((*setting).to_string());
    }
    if let Some(branch) = repo.branch.as_deref().filter(|b| !b.is_empty()) {
        args.push("-b".to_string());
        args.push(branch.to_string());
    }
    if let Some(depth) = repo.depth.filter(|&d| d > 0) {
        args.push("--depth".to_string());
        args.push(depth.to_string());
    }
    args.push(repo.url.clone());
    args.push(target.display().to_string());
    args
}

/// Arguments for recursive submodule initialization inside `target`
#[must_use]
pub fn submodule_args(target: &Path) -> Vec<String> {
    let mut args = Vec::new();
    for setting in GIT_CONFIG {
        args.push("-c".to_string());
        args.push((*setting).to_string());
    }
    args.push("-C".to_string());
    args.push(target.display().to_string());
    args.extend(["submodule", "update", "--init", "--recursive"].map(str::to_string));
    args
}

/// Clone one repository
///
/// # Errors
///
/// Returns `NetworkError::UntrustedHost` or `NetworkError::InvalidUrl`
/// before anything runs, or a `GitError` if git fails.
pub async fn clone(ctx: &OpsCtx, repo: &Repository) -> Result<CloneReport, Error> {
    match clone_inner(ctx, repo).await {
        Ok(report) => Ok(report),
        Err(e) => {
            warn!(url = %repo.url, error = %e, "clone failed");
            ctx.emit(AppEvent::Git(GitEvent::CloneFailed {
                url: repo.url.clone(),
                failure: FailureContext::from_error(&e),
            }));
            Err(e)
        }
    }
}

/// Clone every repository, collecting failures
///
/// # Errors
///
/// Returns `GitError::Multiple` listing every repository that failed.
pub async fn clone_all(ctx: &OpsCtx, repos: &[Repository]) -> Result<Vec<CloneReport>, Error> {
    let mut reports = Vec::with_capacity(repos.len());
    let mut failures = Vec::new();

    for repo in repos {
        match clone(ctx, repo).await {
            Ok(report) => reports.push(report),
            Err(e) => failures.push(format!("failed to clone {}: {e}", repo.url)),
        }
    }

    if failures.is_empty() {
        Ok(reports)
    } else {
        Err(GitError::Multiple { failures }.into())
    }
}

async fn clone_inner(ctx: &OpsCtx, repo: &Repository) -> Result<CloneReport, Error> {
    ctx.hosts.check(&repo.url)?;

    let mut target = repo.path.clone();
    let mut redirected_from = None;
    if liftoff_root::is_non_empty_dir(&target).await {
        let redirected = redirect(ctx, repo).await?;
        redirected_from = Some(std::mem::replace(&mut target, redirected));
    }

    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        liftoff_root::create_dir_all(parent).await?;
    }

    info!(url = %repo.url, path = %target.display(), "cloning repository");
    ctx.emit(AppEvent::Git(GitEvent::CloneStarted {
        url: repo.url.clone(),
        path: target.clone(),
    }));

    let clone = ctx.git.run(&clone_args(repo, &target)).await?;
    if !clone.success {
        return Err(GitError::CloneFailed {
            url: repo.url.clone(),
            output: clone.output,
        }
        .into());
    }

    if repo.submodule_init {
        info!(path = %target.display(), "initializing submodules");
        ctx.emit(AppEvent::Git(GitEvent::SubmodulesInitializing {
            path: target.clone(),
        }));
        let submodules = ctx.git.run(&submodule_args(&target)).await?;
        if !submodules.success {
            return Err(GitError::SubmoduleFailed {
                path: target.display().to_string(),
                output: submodules.output,
            }
            .into());
        }
    }

    ctx.emit(AppEvent::Git(GitEvent::CloneCompleted {
        url: repo.url.clone(),
        path: target.clone(),
    }));

    Ok(CloneReport {
        url: repo.url.clone(),
        path: target,
        redirected_from,
    })
}

/// Pick a fresh path under the failed directory and leave a note beside it
async fn redirect(ctx: &OpsCtx, repo: &Repository) -> Result<PathBuf, Error> {
    let name = repo
        .path
        .file_name()
        .map_or_else(|| "repository".into(), |n| n.to_string_lossy());
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let base = format!("{name}_{stamp}");

    liftoff_root::create_dir_all(&ctx.failed_dir).await?;
    let redirected = ctx.failed_dir.join(&base);

    warn!(
        original = %repo.path.display(),
        redirected = %redirected.display(),
        "target directory not empty, redirecting clone"
    );
    ctx.emit(AppEvent::Git(GitEvent::CloneRedirected {
        url: repo.url.clone(),
        original: repo.path.clone(),
        redirected: redirected.clone(),
    }));

    let note = ctx.failed_dir.join(format!("{base}.txt"));
    if let Err(e) = liftoff_root::write_file(&note, redirect_note(repo, &redirected)).await {
        warn!(path = %note.display(), error = %e, "failed to write redirect metadata");
    }

    Ok(redirected)
}

fn redirect_note(repo: &Repository, redirected: &Path) -> String {
    let mut note = String::new();
    let _ = writeln!(note, "Original Path: {}", repo.path.display());
    let _ = writeln!(note, "Redirected Path: {}", redirected.display());
    let _ = writeln!(note, "URL: {}", repo.url);
    let _ = writeln!(note, "Branch: {}", repo.branch.as_deref().unwrap_or(""));
    let _ = writeln!(note, "Depth: {}", repo.depth.unwrap_or(0));
    let _ = writeln!(note, "Reason: Original directory not empty");
    note
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> Repository {
        Repository {
            url: "https://github.com/org/repo".into(),
            path: PathBuf::from("/src/repo"),
            branch: Some("main".into()),
            depth: Some(1),
            submodule_init: false,
        }
    }

    #[test]
    fn test_clone_args() {
        let args = clone_args(&repo(), Path::new("/src/repo"));
        assert_eq!(
            args,
            [
                "clone",
                "--config",
                "protocol.version=2",
                "--config",
                "transfer.fsckObjects=true",
                "--config",
                "fetch.fsckObjects=true",
                "-b",
                "main",
                "--depth",
                "1",
                "https://github.com/org/repo",
                "/src/repo",
            ]
        );
    }

    #[test]
    fn test_clone_args_without_options() {
        let repo = Repository {
            branch: Some(String::new()),
            depth: Some(0),
            ..repo()
        };
        let args = clone_args(&repo, Path::new("/src/repo"));
        assert!(!args.contains(&"-b".to_string()));
        assert!(!args.contains(&"--depth".to_string()));
    }

    #[test]
    fn test_submodule_args() {
        let args = submodule_args(Path::new("/src/repo"));
        assert_eq!(&args[..2], ["-c", "protocol.version=2"]);
        assert_eq!(
            &args[6..],
            ["-C", "/src/repo", "submodule", "update", "--init", "--recursive"]
        );
    }

    #[test]
    fn test_redirect_note() {
        let note = redirect_note(&repo(), Path::new("/failed/repo_20250101_120000"));
        assert!(note.contains("Original Path: /src/repo\n"));
        assert!(note.contains("Redirected Path: /failed/repo_20250101_120000\n"));
        assert!(note.contains("Branch: main\n"));
        assert!(note.contains("Depth: 1\n"));
        assert!(note.ends_with("Reason: Original directory not empty\n"));
    }
}
