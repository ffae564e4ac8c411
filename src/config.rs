//! Tunables shared by the source adapters.
//!
//! The batch and cap values were picked empirically against provider rate
//! limits; they are parameters here so callers can follow current provider
//! documentation without code changes.

use std::sync::Arc;
use std::time::Duration;

use crate::batch::BatchPolicy;
use crate::cache::{Clock, DEFAULT_CACHE_TTL, SystemClock};

/// Default per-request timeout applied to every outbound call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(8);

/// Default TCP connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default cap on results kept from one-phase sources.
pub const DEFAULT_MAX_RESULTS: usize = 100;

/// Environment variable holding the Europeana API key.
pub const EUROPEANA_API_KEY_ENV: &str = "EUROPEANA_API_KEY";

/// Environment variable holding the Harvard Art Museums API key.
pub const HARVARD_API_KEY_ENV: &str = "HARVARD_API_KEY";

/// Configuration consumed by every source adapter at construction time.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Lifetime of cached search and detail results.
    pub cache_ttl: Duration,
    /// Upper bound on each outbound request, body included.
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    /// Pacing for two-phase detail fetches.
    pub batch: BatchPolicy,
    /// Cap on records kept from one-phase sources.
    pub max_results: usize,
    pub europeana_api_key: Option<String>,
    pub harvard_api_key: Option<String>,
    /// Time source for cache expiry.
    pub clock: Arc<dyn Clock>,
}

impl SearchConfig {
    /// Defaults plus API keys read from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with(|name| std::env::var(name).ok())
    }

    /// Defaults plus API keys read through `lookup`.
    ///
    /// Blank values count as absent.
    #[must_use]
    pub fn from_env_with(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let key = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        Self {
            europeana_api_key: key(EUROPEANA_API_KEY_ENV),
            harvard_api_key: key(HARVARD_API_KEY_ENV),
            ..Self::default()
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            cache_ttl: DEFAULT_CACHE_TTL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            batch: BatchPolicy::default(),
            max_results: DEFAULT_MAX_RESULTS,
            europeana_api_key: None,
            harvard_api_key: None,
            clock: Arc::new(SystemClock),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SearchConfig::default();
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
        assert_eq!(config.request_timeout, Duration::from_secs(8));
        assert_eq!(config.batch.batch_size(), 15);
        assert_eq!(config.batch.max_items(), 60);
        assert_eq!(config.max_results, 100);
        assert!(config.europeana_api_key.is_none());
        assert!(config.harvard_api_key.is_none());
    }

    #[test]
    fn test_from_env_with_reads_keys() {
        let config = SearchConfig::from_env_with(|name| match name {
            EUROPEANA_API_KEY_ENV => Some("eu-key".to_string()),
            HARVARD_API_KEY_ENV => Some(" hv-key ".to_string()),
            _ => None,
        });
        assert_eq!(config.europeana_api_key.as_deref(), Some("eu-key"));
        assert_eq!(config.harvard_api_key.as_deref(), Some("hv-key"));
    }

    #[test]
    fn test_from_env_with_blank_key_is_absent() {
        let config = SearchConfig::from_env_with(|_| Some("   ".to_string()));
        assert!(config.europeana_api_key.is_none());
        assert!(config.harvard_api_key.is_none());
    }
}
