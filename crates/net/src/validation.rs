//! URL validation and host trust policy

use liftoff_errors::{Error, NetworkError};
use std::collections::BTreeSet;
use url::{ParseError, Url};

/// Hosts trusted for repository cloning unless configuration says otherwise
pub const DEFAULT_TRUSTED_HOSTS: &[&str] =
    &["github.com", "gitlab.com", "bitbucket.org", "dev.azure.com"];

/// Validate that `url` is an absolute `https` URL with a non-empty host
///
/// Called before every network attempt. Has no side effects.
///
/// # Errors
///
/// Returns `NetworkError::InvalidUrl` if the string does not parse, is
/// relative, uses any scheme other than `https`, or has an empty host.
pub fn validate_url(url: &str) -> Result<Url, Error> {
    let parsed = Url::parse(url).map_err(|e| match e {
        ParseError::RelativeUrlWithoutBase => {
            NetworkError::invalid_url(url, "relative URLs are not accepted")
        }
        other => NetworkError::invalid_url(url, other.to_string()),
    })?;

    if parsed.scheme() != "https" {
        return Err(NetworkError::invalid_url(
            url,
            format!("scheme '{}' is not allowed, use https", parsed.scheme()),
        )
        .into());
    }

    match parsed.host_str() {
        Some(host) if !host.trim().is_empty() => Ok(parsed),
        _ => Err(NetworkError::invalid_url(url, "missing host").into()),
    }
}

/// Allow-list of hosts the git collaborator may clone from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPolicy {
    hosts: BTreeSet<String>,
}

impl Default for HostPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_TRUSTED_HOSTS.iter().copied())
    }
}

impl HostPolicy {
    /// Build a policy from an explicit host list
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            hosts: hosts.into_iter().filter_map(|h| normalize(h.as_ref())).collect(),
        }
    }

    /// Add a host to the allow-list
    #[must_use]
    pub fn with_host(mut self, host: impl AsRef<str>) -> Self {
        self.extend([host]);
        self
    }

    /// Add several hosts to the allow-list
    pub fn extend<I, S>(&mut self, hosts: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.hosts
            .extend(hosts.into_iter().filter_map(|h| normalize(h.as_ref())));
    }

    /// Whether `host` is trusted; case-insensitive, any `:port` is ignored
    #[must_use]
    pub fn contains(&self, host: &str) -> bool {
        normalize(host).is_some_and(|h| self.hosts.contains(&h))
    }

    /// Iterate the trusted hosts in sorted order
    pub fn hosts(&self) -> impl Iterator<Item = &str> {
        self.hosts.iter().map(String::as_str)
    }

    /// Check a repository URL against the allow-list, then against the
    /// https validator
    ///
    /// # Errors
    ///
    /// Returns `NetworkError::UntrustedHost` if the host is not on the list
    /// (or cannot be determined), and `NetworkError::InvalidUrl` if the URL
    /// fails [`validate_url`].
    pub fn check(&self, url: &str) -> Result<Url, Error> {
        let host = Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_owned))
            .unwrap_or_default();

        if !self.contains(&host) {
            return Err(NetworkError::UntrustedHost {
                host: if host.is_empty() { url.to_string() } else { host },
            }
            .into());
        }

        validate_url(url)
    }
}

fn normalize(host: &str) -> Option<String> {
    let host = host.trim();
    let host = match host.rsplit_once(':') {
        Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
        _ => host,
    };
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    (!host.is_empty()).then_some(host)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn assert_invalid(url: &str) {
        assert!(
            matches!(
                validate_url(url),
                Err(Error::Network(NetworkError::InvalidUrl { .. }))
            ),
            "{url} should be rejected"
        );
    }

    #[test]
    fn test_accepts_https() {
        let url = validate_url("https://example.com/a.bin").unwrap();
        assert_eq!(url.host_str(), Some("example.com"));
        assert!(validate_url("https://example.com:8443/x?y=1").is_ok());
    }

    #[test]
    fn test_rejects_insecure_and_malformed() {
        assert_invalid("http://example.com/a.bin");
        assert_invalid("ftp://example.com/a.bin");
        assert_invalid("file:///etc/passwd");
        assert_invalid("/relative/path");
        assert_invalid("example.com/a.bin");
        assert_invalid("https://");
        assert_invalid("not a url");
        assert_invalid("");
    }

    #[test]
    fn test_default_policy() {
        let policy = HostPolicy::default();
        assert!(policy.contains("github.com"));
        assert!(policy.contains("GitHub.COM"));
        assert!(policy.contains("gitlab.com:443"));
        assert!(!policy.contains("evil.example"));
        assert_eq!(policy.hosts().count(), 4);
    }

    #[test]
    fn test_check_allow_list_before_scheme() {
        let policy = HostPolicy::default();

        assert!(policy.check("https://github.com/org/repo").is_ok());
        assert!(policy.check("https://GITHUB.com:443/org/repo").is_ok());

        // Trusted host over http fails the validator, not the allow-list
        assert!(matches!(
            policy.check("http://github.com/org/repo"),
            Err(Error::Network(NetworkError::InvalidUrl { .. }))
        ));

        // Untrusted host is rejected whatever the scheme
        assert!(matches!(
            policy.check("http://evil.example/repo"),
            Err(Error::Network(NetworkError::UntrustedHost { .. }))
        ));
        assert!(matches!(
            policy.check("https://evil.example/repo"),
            Err(Error::Network(NetworkError::UntrustedHost { ref host })) if host == "evil.example"
        ));
    }

    #[test]
    fn test_custom_hosts() {
        let policy = HostPolicy::new(["git.example.org"]).with_host("Code.Example.Org");
        assert!(policy.contains("git.example.org"));
        assert!(policy.contains("code.example.org"));
        assert!(!policy.contains("github.com"));
        assert!(matches!(
            policy.check("not a url"),
            Err(Error::Network(NetworkError::UntrustedHost { .. }))
        ));
    }

    proptest! {
        #[test]
        fn prop_non_https_schemes_rejected(
            scheme in "(http|ftp|ws|wss|file|gopher)",
            host in "[a-z]{1,12}\\.(com|org|net)",
            path in "[a-z0-9/]{0,20}",
        ) {
            let url = format!("{scheme}://{host}/{path}");
            prop_assert!(validate_url(&url).is_err());
        }

        #[test]
        fn prop_https_with_host_accepted(
            host in "[a-z]{1,12}\\.(com|org|net)",
            path in "[a-z0-9]{0,20}",
        ) {
            let url = format!("https://{host}/{path}");
            let parsed = validate_url(&url);
            prop_assert!(parsed.is_ok());
            let parsed = parsed.unwrap();
            prop_assert_eq!(parsed.host_str(), Some(host.as_str()));
        }

        #[test]
        fn prop_relative_paths_rejected(path in "[a-z0-9_./-]{0,30}") {
            prop_assert!(validate_url(&path).is_err());
        }
    }
}
