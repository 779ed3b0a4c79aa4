//! Connection settings resolved from the environment.

use std::fmt;
use std::path::PathBuf;

use log::{info, warn};
use secrecy::{ExposeSecret, SecretString};
use url::{Host, Url};

use crate::error::GitLabError;

/// Public SaaS origin used when `GITLAB_URL` is unset.
pub const DEFAULT_GITLAB_URL: &str = "https://gitlab.com";

/// Versioned REST prefix appended to the origin.
pub const API_PREFIX: &str = "/api/v4";

pub const ENV_TOKEN: &str = "GITLAB_TOKEN";
pub const ENV_URL: &str = "GITLAB_URL";
pub const ENV_SSL_VERIFY: &str = "GITLAB_SSL_VERIFY";
pub const ENV_CA_BUNDLE: &str = "SSL_CERT_FILE";

/// How server certificates are checked.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TlsPolicy {
    /// Platform roots, full verification.
    #[default]
    Verify,
    /// Verification off. Only for self-signed development instances.
    Disabled,
    /// Additional PEM bundle trusted alongside the platform roots.
    CustomCa(PathBuf),
}

/// Immutable connection settings for one process.
///
/// Built once at startup and shared by reference. The token is held as a
/// [`SecretString`] and is omitted from every textual rendering.
#[derive(Clone)]
pub struct Config {
    gitlab_url: String,
    token: SecretString,
    tls: TlsPolicy,
}

impl Config {
    /// Resolve settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`GitLabError::Configuration`] if the token is missing or the
    /// URL is malformed or insecure.
    pub fn from_env() -> Result<Self, GitLabError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve settings from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`Config::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, GitLabError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup(ENV_TOKEN).filter(|t| !t.is_empty()).ok_or_else(|| {
            GitLabError::configuration(format!(
                "{ENV_TOKEN} environment variable required. Create a Personal Access Token at \
                 https://gitlab.com/-/user_settings/personal_access_tokens"
            ))
        })?;

        let raw_url = lookup(ENV_URL).unwrap_or_else(|| DEFAULT_GITLAB_URL.to_string());
        let gitlab_url = validate_url(&raw_url)?;

        let tls = resolve_tls_policy(
            lookup(ENV_SSL_VERIFY).as_deref(),
            lookup(ENV_CA_BUNDLE).filter(|p| !p.is_empty()),
        );

        info!("Configuration loaded successfully (GitLab: {gitlab_url})");

        Ok(Self {
            gitlab_url,
            token: SecretString::from(token),
            tls,
        })
    }

    /// Build settings directly, applying the same URL checks.
    ///
    /// # Errors
    ///
    /// Returns [`GitLabError::Configuration`] if the token is empty or the URL
    /// is rejected.
    pub fn new(
        gitlab_url: &str,
        token: impl Into<String>,
        tls: TlsPolicy,
    ) -> Result<Self, GitLabError> {
        let token = token.into();
        if token.is_empty() {
            return Err(GitLabError::configuration(format!(
                "{ENV_TOKEN} must not be empty"
            )));
        }
        Ok(Self {
            gitlab_url: validate_url(gitlab_url)?,
            token: SecretString::from(token),
            tls,
        })
    }

    /// Origin plus the versioned API prefix.
    #[must_use]
    pub fn api_base_url(&self) -> String {
        format!("{}{API_PREFIX}", self.gitlab_url)
    }

    /// Instance origin as configured.
    #[must_use]
    pub fn gitlab_url(&self) -> &str {
        &self.gitlab_url
    }

    /// The credential. Only request construction and redaction should call
    /// `expose_secret` on it.
    #[must_use]
    pub const fn token(&self) -> &SecretString {
        &self.token
    }

    #[must_use]
    pub const fn tls(&self) -> &TlsPolicy {
        &self.tls
    }
}

fn validate_url(raw: &str) -> Result<String, GitLabError> {
    let trimmed = raw.strip_suffix('/').unwrap_or(raw);

    let parsed = Url::parse(trimmed).map_err(|_| {
        GitLabError::configuration(format!(
            "Invalid {ENV_URL}: must be a valid URL (e.g. https://gitlab.com)"
        ))
    })?;

    let Some(host) = parsed.host() else {
        return Err(GitLabError::configuration(format!(
            "Invalid {ENV_URL}: must be a valid URL (e.g. https://gitlab.com)"
        )));
    };

    if parsed.scheme() != "https" && !is_loopback(&host) {
        return Err(GitLabError::configuration(format!(
            "{ENV_URL} must use HTTPS for non-localhost URLs"
        )));
    }

    Ok(trimmed.to_string())
}

fn is_loopback(host: &Host<&str>) -> bool {
    match host {
        Host::Domain(name) => *name == "localhost",
        Host::Ipv4(addr) => addr.octets() == [127, 0, 0, 1],
        Host::Ipv6(addr) => addr.is_loopback(),
    }
}

fn resolve_tls_policy(verify_flag: Option<&str>, ca_bundle: Option<String>) -> TlsPolicy {
    let disabled = verify_flag
        .map(str::to_ascii_lowercase)
        .is_some_and(|v| matches!(v.as_str(), "false" | "0" | "no"));

    if disabled {
        warn!("SSL verification disabled via {ENV_SSL_VERIFY}");
        return TlsPolicy::Disabled;
    }

    if let Some(path) = ca_bundle {
        info!("Using custom CA bundle: {path}");
        return TlsPolicy::CustomCa(PathBuf::from(path));
    }

    TlsPolicy::Verify
}

// Custom Debug implementation to avoid exposing the token
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("gitlab_url", &self.gitlab_url)
            .field("token", &"***")
            .field("tls", &self.tls)
            .finish()
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Config(gitlab_url={}, token=***)", self.gitlab_url)
    }
}
