//! Error types for source adapter operations.
//!
//! Messages follow the What/Why/Fix layout used across the project.

use thiserror::Error;

/// Errors raised while talking to one museum API.
///
/// Adapters recover from these internally (an errored search degrades to an
/// empty result list); they surface mainly through logs and detail fetches.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    /// The request could not be sent or the connection dropped.
    #[error("request to {source_name} failed: {reason}\n  Suggestion: Check your network connection")]
    Http {
        /// Display name of the provider.
        source_name: String,
        /// Underlying transport error text.
        reason: String,
    },

    /// The request did not finish within the adapter's timeout.
    #[error(
        "request to {source_name} timed out after {timeout_ms} ms\n  Suggestion: Raise request_timeout_secs or try again later"
    )]
    Timeout {
        source_name: String,
        timeout_ms: u64,
    },

    /// The provider answered with a non-2xx status.
    #[error("{source_name} returned HTTP {status}\n  Suggestion: {suggestion}")]
    Status {
        source_name: String,
        status: u16,
        suggestion: String,
    },

    /// The body was not the JSON shape the adapter expects.
    #[error("unexpected response format from {source_name}: {reason}")]
    Decode { source_name: String, reason: String },

    /// The provider requires an API key and none is configured.
    #[error("no API key configured for {source_name}\n  Suggestion: Set {env_var} or add it to the config file")]
    MissingApiKey {
        source_name: String,
        /// Environment variable that supplies the key.
        env_var: String,
    },

    /// The HTTP client could not be built.
    #[error("HTTP client construction failed for {source_name}: {reason}")]
    ClientBuild { source_name: String, reason: String },

    /// The configured base URL does not parse.
    #[error("invalid base URL '{base_url}' for {source_name}: {reason}")]
    InvalidBaseUrl {
        source_name: String,
        base_url: String,
        reason: String,
    },
}

impl SourceError {
    #[must_use]
    pub fn http(source_name: &str, reason: &str) -> Self {
        Self::Http {
            source_name: source_name.to_string(),
            reason: reason.to_string(),
        }
    }

    #[must_use]
    pub fn timeout(source_name: &str, timeout_ms: u64) -> Self {
        Self::Timeout {
            source_name: source_name.to_string(),
            timeout_ms,
        }
    }

    /// Creates a `Status` error with a suggestion derived from the status code.
    #[must_use]
    pub fn status(source_name: &str, status: u16) -> Self {
        let suggestion = match status {
            401 | 403 => "Check the API key for this source".to_string(),
            404 => "The requested record does not exist".to_string(),
            429 => "Rate limit exceeded. Try again in a few seconds.".to_string(),
            s if s >= 500 => "Source API unavailable. Try again later.".to_string(),
            s => format!("Unexpected HTTP {s}; try again later"),
        };
        Self::Status {
            source_name: source_name.to_string(),
            status,
            suggestion,
        }
    }

    #[must_use]
    pub fn decode(source_name: &str, reason: &str) -> Self {
        Self::Decode {
            source_name: source_name.to_string(),
            reason: reason.to_string(),
        }
    }

    #[must_use]
    pub fn missing_api_key(source_name: &str, env_var: &str) -> Self {
        Self::MissingApiKey {
            source_name: source_name.to_string(),
            env_var: env_var.to_string(),
        }
    }

    #[must_use]
    pub fn client_build(source_name: &str, reason: &str) -> Self {
        Self::ClientBuild {
            source_name: source_name.to_string(),
            reason: reason.to_string(),
        }
    }

    #[must_use]
    pub fn invalid_base_url(source_name: &str, base_url: &str, reason: &str) -> Self {
        Self::InvalidBaseUrl {
            source_name: source_name.to_string(),
            base_url: base_url.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Returns true for failures that may succeed on a later attempt.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http { .. } | Self::Timeout { .. } => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Decode { .. }
            | Self::MissingApiKey { .. }
            | Self::ClientBuild { .. }
            | Self::InvalidBaseUrl { .. } => false,
        }
    }
}
