//! HTTP transport with a fixed security policy

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use liftoff_errors::{Error, NetworkError};
use reqwest::{redirect, tls, Client};
use std::fmt::Display;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Largest response body accepted (1 GiB)
pub const MAX_CONTENT_LENGTH: u64 = 1024 * 1024 * 1024;

/// Redirects followed before the request fails
pub const MAX_REDIRECTS: usize = 10;

/// Network client configuration
#[derive(Debug, Clone)]
pub struct NetConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub tcp_keepalive: Duration,
    pub pool_idle_timeout: Duration,
    pub pool_max_idle_per_host: usize,
    pub max_redirects: usize,
    pub max_content_length: u64,
    pub user_agent: String,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(30),
            tcp_keepalive: Duration::from_secs(30),
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: 100,
            max_redirects: MAX_REDIRECTS,
            max_content_length: MAX_CONTENT_LENGTH,
            user_agent: format!("liftoff/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// One network round trip that yields a complete body
///
/// Implementations must be safe to share between concurrent requests and
/// must stop work promptly once `cancel` fires.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch the full body of `url`
    async fn fetch(&self, url: &Url, cancel: &CancellationToken) -> Result<Bytes, NetworkError>;
}

/// HTTP client wrapper
///
/// Cloning is cheap; clones share one connection pool.
#[derive(Clone)]
pub struct NetClient {
    client: Client,
    config: NetConfig,
}

impl std::fmt::Debug for NetClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl NetClient {
    /// Create a new network client
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client fails to initialize
    /// (for example when no TLS backend is available).
    pub fn new(config: NetConfig) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .tcp_keepalive(config.tcp_keepalive)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .min_tls_version(tls::Version::TLS_1_2)
            .redirect(redirect_policy(config.max_redirects))
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| NetworkError::ConnectionFailed(error_chain(&e)))?;

        Ok(Self { client, config })
    }

    /// Create with default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created with default settings.
    pub fn with_defaults() -> Result<Self, Error> {
        Self::new(NetConfig::default())
    }

    /// The configuration this client was built with
    #[must_use]
    pub fn config(&self) -> &NetConfig {
        &self.config
    }

    async fn get_body(&self, url: &Url) -> Result<Bytes, NetworkError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.map_error(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::HttpError {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string(),
            });
        }

        let limit = self.config.max_content_length;
        let declared = response.content_length();
        if let Some(size) = declared.filter(|&size| size > limit) {
            return Err(NetworkError::OversizeContent { size, limit });
        }

        let capacity = declared
            .and_then(|size| usize::try_from(size).ok())
            .unwrap_or(0);
        read_capped(response.bytes_stream(), limit, capacity).await
    }

    fn map_error(&self, url: &Url, err: &reqwest::Error) -> NetworkError {
        if err.is_timeout() && !err.is_connect() {
            NetworkError::Timeout {
                url: url.to_string(),
                seconds: self.config.timeout.as_secs(),
            }
        } else if err.is_body() || err.is_decode() {
            NetworkError::ReadFailed(error_chain(err))
        } else {
            NetworkError::ConnectionFailed(error_chain(err))
        }
    }
}

#[async_trait]
impl Transport for NetClient {
    async fn fetch(&self, url: &Url, cancel: &CancellationToken) -> Result<Bytes, NetworkError> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(NetworkError::Cancelled),
            result = self.get_body(url) => result,
        }
    }
}

/// Accumulate a body stream, failing as soon as it grows past `limit`
pub(crate) async fn read_capped<S, E>(
    stream: S,
    limit: u64,
    capacity: usize,
) -> Result<Bytes, NetworkError>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Display,
{
    let mut stream = std::pin::pin!(stream);
    let mut buf = BytesMut::with_capacity(capacity);

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| NetworkError::ReadFailed(e.to_string()))?;
        let size = buf.len() as u64 + chunk.len() as u64;
        if size > limit {
            return Err(NetworkError::OversizeContent { size, limit });
        }
        buf.extend_from_slice(&chunk);
    }

    Ok(buf.freeze())
}

/// Follow at most `max` redirects and never downgrade from https
fn redirect_policy(max: usize) -> redirect::Policy {
    redirect::Policy::custom(move |attempt| {
        let downgrade = attempt
            .previous()
            .last()
            .is_some_and(|prev| prev.scheme() == "https")
            && attempt.url().scheme() != "https";

        if downgrade {
            let target = attempt.url().to_string();
            attempt.error(format!("refusing redirect from https to {target}"))
        } else if attempt.previous().len() > max {
            attempt.error(format!("too many redirects (limit {max})"))
        } else {
            attempt.follow()
        }
    })
}

/// reqwest's top-level message is terse; include the source chain
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
