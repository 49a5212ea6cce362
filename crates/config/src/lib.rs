#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Manifest loading for liftoff
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - The manifest file (~/.config/liftoff/liftoff.toml)
//! - Environment variables
//!
//! CLI flags are applied last by the binary.

mod env;

pub use env::{expand_env, expand_path};

use liftoff_errors::{ConfigError, Error};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// Overrides the directory that receives redirected clones
pub const ENV_FAILED_DIR: &str = "LIFTOFF_FAILED_DIR";

/// Comma-separated hosts appended to the git allow-list
pub const ENV_TRUSTED_HOSTS: &str = "LIFTOFF_TRUSTED_HOSTS";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub downloads: DownloadsConfig,

    #[serde(default)]
    pub git: GitConfig,
}

/// `[downloads]` section
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct DownloadsConfig {
    #[serde(default)]
    pub files: Vec<DownloadFile>,
}

/// One `[[downloads.files]]` entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DownloadFile {
    pub url: String,
    pub dest: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rename: Option<String>,
}

/// `[git]` section
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct GitConfig {
    /// Extra hosts trusted for cloning
    #[serde(default)]
    pub trusted_hosts: Vec<String>,
    /// Use `trusted_hosts` instead of extending the built-in list
    #[serde(default)]
    pub replace_default_hosts: bool,
    /// Where clones go when their target directory is not empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_dir: Option<PathBuf>,
    #[serde(default)]
    pub repositories: Vec<Repository>,
}

/// One `[[git.repositories]]` entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Repository {
    pub url: String,
    pub path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<u32>,
    #[serde(default)]
    pub submodule_init: bool,
}

impl GitConfig {
    /// Get the failed-clone directory (with default)
    #[must_use]
    pub fn failed_dir(&self) -> PathBuf {
        self.failed_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("Liftoff")
                .join("Failed")
        })
    }
}

impl Config {
    /// Get the default manifest path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir.join("liftoff").join("liftoff.toml"))
    }

    /// Load a manifest from file
    ///
    /// Environment references in paths are expanded and the result is
    /// validated.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains invalid TOML,
    /// or has entries with empty required fields.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        let mut config = Self::parse(&contents)?;
        config.expand_env();

        if config.is_empty() {
            warn!(path = %path.display(), "manifest has no downloads or repositories");
        } else {
            debug!(
                path = %path.display(),
                downloads = config.downloads.files.len(),
                repositories = config.git.repositories.len(),
                "loaded manifest"
            );
        }
        Ok(config)
    }

    /// Parse and validate manifest text without touching the environment
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ParseError` for invalid TOML and
    /// `ConfigError::InvalidValue` for empty required fields.
    pub fn parse(contents: &str) -> Result<Self, Error> {
        let config: Self = toml::from_str(contents).map_err(ConfigError::from)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from an explicit path, or from the default path if it exists
    ///
    /// A missing default manifest yields an empty configuration; a missing
    /// explicit one is an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => {
                let config_path = Self::default_path()?;
                if fs::try_exists(&config_path).await.unwrap_or(false) {
                    Self::load_from_file(&config_path).await
                } else {
                    debug!(path = %config_path.display(), "no manifest found, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    /// Whether the manifest asks for nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.downloads.files.is_empty() && self.git.repositories.is_empty()
    }

    /// Expand `$VAR` / `${VAR}` in every path-valued field
    pub fn expand_env(&mut self) {
        for file in &mut self.downloads.files {
            file.dest = expand_path(&file.dest);
        }
        for repo in &mut self.git.repositories {
            repo.path = expand_path(&repo.path);
        }
        if let Some(dir) = &self.git.failed_dir {
            self.git.failed_dir = Some(expand_path(dir));
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if `LIFTOFF_TRUSTED_HOSTS` contains an entry that is
    /// not a bare host name.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        if let Ok(dir) = std::env::var(ENV_FAILED_DIR) {
            if !dir.trim().is_empty() {
                self.git.failed_dir = Some(PathBuf::from(expand_env(dir.trim())));
            }
        }

        if let Ok(hosts) = std::env::var(ENV_TRUSTED_HOSTS) {
            for host in hosts.split(',').map(str::trim).filter(|h| !h.is_empty()) {
                if host.contains(['/', ' ', '@']) {
                    return Err(ConfigError::InvalidValue {
                        field: ENV_TRUSTED_HOSTS.to_string(),
                        value: host.to_string(),
                    }
                    .into());
                }
                if !self.git.trusted_hosts.iter().any(|h| h.eq_ignore_ascii_case(host)) {
                    self.git.trusted_hosts.push(host.to_string());
                }
            }
        }

        Ok(())
    }

    fn validate(&self) -> Result<(), Error> {
        for (i, file) in self.downloads.files.iter().enumerate() {
            if file.url.trim().is_empty() {
                return Err(invalid(format!("downloads.files[{i}].url"), &file.url));
            }
            if file.dest.as_os_str().is_empty() {
                return Err(invalid(format!("downloads.files[{i}].dest"), ""));
            }
        }
        for (i, repo) in self.git.repositories.iter().enumerate() {
            if repo.url.trim().is_empty() {
                return Err(invalid(format!("git.repositories[{i}].url"), &repo.url));
            }
            if repo.path.as_os_str().is_empty() {
                return Err(invalid(format!("git.repositories[{i}].path"), ""));
            }
        }
        Ok(())
    }
}

fn invalid(field: String, value: &str) -> Error {
    ConfigError::InvalidValue {
        field,
        value: value.to_string(),
    }
    .into()
}
