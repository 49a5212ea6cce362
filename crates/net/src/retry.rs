//! Bounded retry with a per-attempt deadline
//!
//! Every attempt runs as its own task with its own cancellation token and
//! is raced against the deadline. When the deadline wins, the token is
//! cancelled and the task aborted, so a late result can never be observed.
//! Attempts for one request never overlap.

use crate::client::Transport;
use crate::validation::validate_url;
use bytes::Bytes;
use liftoff_errors::{Error, NetworkError};
use liftoff_events::{AppEvent, DownloadEvent, EventEmitter, EventSender};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

/// Retry policy for one acquisition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Linear backoff step: attempt `n` waits `(n - 1) * backoff_unit`
    pub backoff_unit: Duration,
    /// Deadline for a single attempt
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_unit: Duration::from_secs(1),
            attempt_timeout: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Delay before `attempt` (1-based); zero for the first attempt
    #[must_use]
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        self.backoff_unit * attempt.saturating_sub(1)
    }
}

/// Bytes obtained by a successful attempt
#[derive(Debug, Clone)]
pub struct Acquired {
    pub bytes: Bytes,
    /// 1-based number of the attempt that succeeded
    pub attempts: u32,
}

/// Drives a [`Transport`] through the retry policy
#[derive(Clone)]
pub struct RetryController {
    transport: Arc<dyn Transport>,
    policy: RetryPolicy,
    events: Option<EventSender>,
}

impl EventEmitter for RetryController {
    fn event_sender(&self) -> Option<&EventSender> {
        self.events.as_ref()
    }
}

impl RetryController {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, policy: RetryPolicy) -> Self {
        Self {
            transport,
            policy,
            events: None,
        }
    }

    /// Report attempt failures and backoffs on `tx`
    #[must_use]
    pub fn with_events(mut self, tx: EventSender) -> Self {
        self.events = Some(tx);
        self
    }

    #[must_use]
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetch `url`, retrying transport failures and timeouts
    ///
    /// The URL is re-validated before every attempt.
    ///
    /// # Errors
    ///
    /// Returns `NetworkError::InvalidUrl` immediately if validation fails,
    /// or `NetworkError::AllAttemptsFailed` carrying the last cause once
    /// every attempt has failed.
    pub async fn acquire(&self, url: &str) -> Result<Acquired, Error> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            let parsed = validate_url(url)?;
            debug!(url, attempt, "starting download attempt");

            let err = match self.run_attempt(parsed).await {
                Ok(bytes) => {
                    debug!(url, attempt, size = bytes.len(), "download attempt succeeded");
                    return Ok(Acquired {
                        bytes,
                        attempts: attempt,
                    });
                }
                Err(err) => err,
            };

            warn!(url, attempt, max_attempts, error = %err, "download attempt failed");
            self.emit_attempt_failed(url, attempt, max_attempts, err.to_string());

            if attempt >= max_attempts {
                return Err(NetworkError::AllAttemptsFailed {
                    url: url.to_string(),
                    attempts: attempt,
                    last: Box::new(err),
                }
                .into());
            }

            attempt += 1;
            let delay = self.policy.backoff_delay(attempt);
            self.emit(AppEvent::Download(DownloadEvent::Retrying {
                url: url.to_string(),
                attempt,
                backoff_delay: delay,
            }));
            tokio::time::sleep(delay).await;
        }
    }

    async fn run_attempt(&self, url: Url) -> Result<Bytes, NetworkError> {
        let token = CancellationToken::new();
        let transport = Arc::clone(&self.transport);
        let attempt_token = token.clone();
        let url_text = url.to_string();

        let mut handle =
            tokio::spawn(async move { transport.fetch(&url, &attempt_token).await });

        match tokio::time::timeout(self.policy.attempt_timeout, &mut handle).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) if join_err.is_cancelled() => Err(NetworkError::Cancelled),
            Ok(Err(join_err)) => Err(NetworkError::ReadFailed(format!(
                "download task failed: {join_err}"
            ))),
            Err(_) => {
                token.cancel();
                handle.abort();
                Err(NetworkError::Timeout {
                    url: url_text,
                    seconds: self.policy.attempt_timeout.as_secs(),
                })
            }
        }
    }
}
