//! Error types surfaced to tool callers.
//!
//! Every variant renders a message that is safe to show verbatim: no raw
//! credentials, no unbounded caller-supplied strings, no transport internals
//! beyond a one-line description.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// Replacement text for credential material found in upstream messages.
pub const REDACTION_MASK: &str = "***";

/// Longest identifier echoed back in a not-found message.
pub const MAX_ECHOED_IDENTIFIER: usize = 40;

/// Errors that can occur while talking to a GitLab instance.
///
/// Variants carrying sanitized text can only be built through the
/// constructors on this type, so the redaction and truncation rules cannot be
/// bypassed by callers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum GitLabError {
    /// Missing or invalid connection settings. Fatal at startup.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Caller input rejected before any request was sent.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Transport failure, unclassified HTTP failure or malformed body.
    ///
    /// `code` is `0` when no HTTP status was received.
    #[error("GitLab API error {code}: {message}")]
    #[non_exhaustive]
    Api {
        /// HTTP status, or `0` for transport-level failures.
        code: u16,
        /// Redacted message.
        message: String,
    },

    /// The resource does not exist or the token cannot see it (HTTP 404).
    #[error("Resource not found or not accessible: {identifier}")]
    #[non_exhaustive]
    NotFound {
        /// Identifier truncated to [`MAX_ECHOED_IDENTIFIER`] characters.
        identifier: String,
    },

    /// HTTP 401 or 403.
    #[error("Permission denied. Required scope: {required_scope}")]
    PermissionDenied {
        /// Abstract description of the missing grant.
        required_scope: String,
    },

    /// HTTP 429.
    #[error("Rate limit exceeded.{}", retry_hint(.retry_after))]
    RateLimited {
        /// Seconds to wait, when the server said so.
        retry_after: Option<u64>,
    },
}

#[allow(clippy::ref_option)]
fn retry_hint(retry_after: &Option<u64>) -> String {
    match *retry_after {
        Some(secs) if secs > 0 => format!(" Retry after {secs} seconds."),
        _ => String::new(),
    }
}

/// Replace every literal occurrence of the token with [`REDACTION_MASK`].
pub(crate) fn redact(message: &str, token: &SecretString) -> String {
    let secret = token.expose_secret();
    if secret.is_empty() {
        message.to_string()
    } else {
        message.replace(secret, REDACTION_MASK)
    }
}

impl GitLabError {
    /// Build an API error, masking every occurrence of the live token.
    pub fn api(code: u16, message: impl Into<String>, token: &SecretString) -> Self {
        Self::Api {
            code,
            message: redact(&message.into(), token),
        }
    }

    /// Build a not-found error, bounding the echoed identifier.
    pub fn not_found(identifier: &str) -> Self {
        let identifier = if identifier.chars().count() > MAX_ECHOED_IDENTIFIER {
            let head: String = identifier.chars().take(MAX_ECHOED_IDENTIFIER).collect();
            format!("{head}...")
        } else {
            identifier.to_string()
        };
        Self::NotFound { identifier }
    }

    pub fn permission_denied(required_scope: impl Into<String>) -> Self {
        Self::PermissionDenied {
            required_scope: required_scope.into(),
        }
    }

    #[must_use]
    pub const fn rate_limited(retry_after: Option<u64>) -> Self {
        Self::RateLimited { retry_after }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Check if retrying the same call later could succeed.
    ///
    /// Returns `true` for rate limits, transport failures and 5xx responses.
    /// Nothing in this crate retries on its own; this is a hint for callers.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited { .. } => true,
            Self::Api { code, .. } => *code == 0 || *code >= 500,
            _ => false,
        }
    }

    /// Check if this is a credential or scope problem.
    #[must_use]
    pub const fn is_permission_error(&self) -> bool {
        matches!(self, Self::PermissionDenied { .. })
    }

    /// Get the server-provided wait time if this is a rate limit error.
    #[must_use]
    pub const fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited {
                retry_after: Some(secs),
            } => Some(Duration::from_secs(*secs)),
            _ => None,
        }
    }
}
