//! Operations context for dependency injection

use crate::git::{GitRunner, SystemGit};
use liftoff_config::Config;
use liftoff_errors::Error;
use liftoff_events::{EventEmitter, EventSender};
use liftoff_net::{Downloader, HostPolicy};
use std::path::PathBuf;
use std::sync::Arc;

/// Operations context providing access to all system components
#[derive(Clone)]
pub struct OpsCtx {
    /// Acquisition pipeline
    pub downloader: Downloader,
    /// Hosts repositories may be cloned from
    pub hosts: HostPolicy,
    /// Where clones go when their target is occupied
    pub failed_dir: PathBuf,
    /// Git process runner
    pub git: Arc<dyn GitRunner>,
    /// Event sender for progress reporting
    pub tx: Option<EventSender>,
}

impl EventEmitter for OpsCtx {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }
}

/// Builder for [`OpsCtx`]
#[derive(Default)]
pub struct OpsContextBuilder {
    downloader: Option<Downloader>,
    hosts: Option<HostPolicy>,
    failed_dir: Option<PathBuf>,
    git: Option<Arc<dyn GitRunner>>,
    tx: Option<EventSender>,
}

impl OpsContextBuilder {
    /// Create new context builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the host policy and failed-clone directory from a manifest
    ///
    /// `trusted_hosts` extends the built-in list unless
    /// `replace_default_hosts` is set.
    #[must_use]
    pub fn with_config(mut self, config: &Config) -> Self {
        let hosts = if config.git.replace_default_hosts {
            HostPolicy::new(&config.git.trusted_hosts)
        } else {
            let mut hosts = HostPolicy::default();
            hosts.extend(&config.git.trusted_hosts);
            hosts
        };
        self.hosts = Some(hosts);
        self.failed_dir = Some(config.git.failed_dir());
        self
    }

    #[must_use]
    pub fn with_downloader(mut self, downloader: Downloader) -> Self {
        self.downloader = Some(downloader);
        self
    }

    #[must_use]
    pub fn with_host_policy(mut self, hosts: HostPolicy) -> Self {
        self.hosts = Some(hosts);
        self
    }

    #[must_use]
    pub fn with_failed_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.failed_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn with_git_runner(mut self, git: Arc<dyn GitRunner>) -> Self {
        self.git = Some(git);
        self
    }

    /// Set event sender
    #[must_use]
    pub fn with_event_sender(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    /// Build the context
    ///
    /// Missing components fall back to defaults: a downloader over the
    /// default HTTP client, the built-in host list, the system `git`.
    ///
    /// # Errors
    ///
    /// Returns an error if the default HTTP client cannot be created.
    pub fn build(self) -> Result<OpsCtx, Error> {
        let downloader = match self.downloader {
            Some(downloader) => downloader,
            None => Downloader::with_defaults()?,
        };
        let downloader = match &self.tx {
            Some(tx) => downloader.with_events(tx.clone()),
            None => downloader,
        };

        Ok(OpsCtx {
            downloader,
            hosts: self.hosts.unwrap_or_default(),
            failed_dir: self
                .failed_dir
                .unwrap_or_else(|| liftoff_config::GitConfig::default().failed_dir()),
            git: self.git.unwrap_or_else(|| Arc::new(SystemGit::default())),
            tx: self.tx,
        })
    }
}
