//! Event rendering for the terminal

use console::{style, Term};
use liftoff_events::{AppEvent, DownloadEvent, GeneralEvent, GitEvent};

/// Line prefix for each kind of message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Success,
    Info,
    Warning,
    Error,
}

/// Turns events into status lines on stderr
pub struct EventHandler {
    term: Term,
    colors: bool,
    debug: bool,
}

impl EventHandler {
    pub fn new(colors: bool, debug: bool) -> Self {
        Self {
            term: Term::stderr(),
            colors,
            debug,
        }
    }

    /// Handle incoming event
    pub fn handle_event(&mut self, event: AppEvent) {
        if let Some((level, message)) = describe(&event, self.debug) {
            let _ = self.term.write_line(&self.format(level, &message));
        }
    }

    fn format(&self, level: Level, message: &str) -> String {
        let symbol = match level {
            Level::Success => "[+]",
            Level::Info => "[*]",
            Level::Warning => "[!]",
            Level::Error => "[-]",
        };
        if !self.colors {
            return format!("{symbol} {message}");
        }
        let symbol = match level {
            Level::Success => style(symbol).green().bold(),
            Level::Info => style(symbol).cyan(),
            Level::Warning => style(symbol).yellow().bold(),
            Level::Error => style(symbol).red().bold(),
        }
        .force_styling(true);
        format!("{symbol} {message}")
    }
}

fn describe(event: &AppEvent, debug: bool) -> Option<(Level, String)> {
    let line = match event {
        AppEvent::Download(event) => match event {
            DownloadEvent::Started { url, dest } => {
                (Level::Info, format!("Downloading {url} -> {}", dest.display()))
            }
            DownloadEvent::AttemptFailed {
                attempt,
                max_attempts,
                reason,
                ..
            } => (
                Level::Warning,
                format!("Attempt {attempt}/{max_attempts} failed: {reason}"),
            ),
            DownloadEvent::Retrying {
                attempt,
                backoff_delay,
                ..
            } => (
                Level::Info,
                format!(
                    "Retrying in {}s (attempt {attempt})",
                    backoff_delay.as_secs()
                ),
            ),
            DownloadEvent::ChecksumVerified { hash, .. } => {
                if !debug {
                    return None;
                }
                (Level::Info, format!("Checksum verified: {hash}"))
            }
            DownloadEvent::ChecksumSkipped { url, hash } => (
                Level::Warning,
                format!("No checksum for {url}, content not verified (sha256 {hash})"),
            ),
            DownloadEvent::Completed {
                path,
                size,
                attempts,
                total_time,
                ..
            } => {
                let retries = if *attempts > 1 {
                    format!(" after {attempts} attempts")
                } else {
                    String::new()
                };
                (
                    Level::Success,
                    format!(
                        "Saved {} ({size} bytes, {:.1}s){retries}",
                        path.display(),
                        total_time.as_secs_f64()
                    ),
                )
            }
            DownloadEvent::Failed { url, failure } => (
                Level::Error,
                format!("Download of {url} failed: {}", failure.message),
            ),
        },
        AppEvent::Git(event) => match event {
            GitEvent::CloneStarted { url, path } => {
                (Level::Info, format!("Cloning {url} into {}", path.display()))
            }
            GitEvent::CloneRedirected { redirected, .. } => (
                Level::Warning,
                format!(
                    "Target directory not empty, cloning into {}",
                    redirected.display()
                ),
            ),
            GitEvent::SubmodulesInitializing { .. } => {
                (Level::Info, "Initializing submodules".to_string())
            }
            GitEvent::CloneCompleted { path, .. } => (
                Level::Success,
                format!("Cloned repository to {}", path.display()),
            ),
            GitEvent::CloneFailed { url, failure } => (
                Level::Error,
                format!("Clone of {url} failed: {}", failure.message),
            ),
        },
        AppEvent::General(event) => match event {
            GeneralEvent::Warning { message, context } => match context {
                Some(context) => (Level::Warning, format!("{message} ({context})")),
                None => (Level::Warning, message.clone()),
            },
            GeneralEvent::Error { message, details } => match details {
                Some(details) => (Level::Error, format!("{message}: {details}")),
                None => (Level::Error, message.clone()),
            },
            GeneralEvent::DebugLog { message, .. } => {
                if !debug {
                    return None;
                }
                (Level::Info, message.clone())
            }
            GeneralEvent::OperationStarted { .. }
            | GeneralEvent::OperationCompleted { .. } => return None,
            GeneralEvent::OperationFailed { operation, error } => {
                (Level::Error, format!("{operation} failed: {error}"))
            }
        },
    };
    Some(line)
}
