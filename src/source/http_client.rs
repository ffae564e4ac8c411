//! Shared HTTP client policy for source adapters.
//!
//! Centralizes timeout, user-agent, compression, and proxy handling so every
//! adapter talks to its provider the same way, and wraps each request in a
//! cancelling timeout so one slow source cannot stall an aggregate search.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use reqwest::{Client, ClientBuilder, Proxy};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::config::SearchConfig;
use crate::user_agent;

use super::SourceError;

/// Query parameters whose values must never reach the logs.
const SECRET_QUERY_PARAMS: [&str; 3] = ["apikey", "wskey", "api_key"];

/// Builds a source HTTP client using shared project policy.
///
/// # Errors
///
/// Returns [`SourceError::ClientBuild`] when client construction fails.
pub fn build_source_http_client(
    source_name: &str,
    connect_timeout: Duration,
    request_timeout: Duration,
) -> Result<Client, SourceError> {
    match try_build_client(connect_timeout, request_timeout, false) {
        Ok(client) => Ok(client),
        Err(BuildClientFailure::Panic) => {
            // Some sandboxed environments panic when querying system proxy
            // settings; retry with env-proxy only.
            warn!(
                source = source_name,
                "Source client hit system proxy panic; using env-proxy fallback builder"
            );
            match try_build_client(connect_timeout, request_timeout, true) {
                Ok(client) => Ok(client),
                Err(BuildClientFailure::Panic) => Err(SourceError::client_build(
                    source_name,
                    "HTTP client construction panicked",
                )),
                Err(BuildClientFailure::Build(error)) => Err(SourceError::client_build(
                    source_name,
                    &error.to_string(),
                )),
            }
        }
        Err(BuildClientFailure::Build(error)) => {
            Err(SourceError::client_build(source_name, &error.to_string()))
        }
    }
}

enum BuildClientFailure {
    Panic,
    Build(reqwest::Error),
}

fn try_build_client(
    connect_timeout: Duration,
    request_timeout: Duration,
    disable_system_proxy_lookup: bool,
) -> Result<Client, BuildClientFailure> {
    catch_unwind(AssertUnwindSafe(move || {
        let mut builder = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .user_agent(user_agent::default_source_user_agent())
            .gzip(true);
        if disable_system_proxy_lookup {
            builder = apply_env_proxy_fallback(builder.no_proxy());
        }
        builder.build().map_err(BuildClientFailure::Build)
    }))
    .map_err(|_| BuildClientFailure::Panic)?
}

fn apply_env_proxy_fallback(mut builder: ClientBuilder) -> ClientBuilder {
    if let Some(proxy) = env_proxy_for_scheme("https")
        && let Ok(resolved) = Proxy::https(&proxy)
    {
        builder = builder.proxy(resolved);
    }
    if let Some(proxy) = env_proxy_for_scheme("http")
        && let Ok(resolved) = Proxy::http(&proxy)
    {
        builder = builder.proxy(resolved);
    }
    builder
}

fn env_proxy_for_scheme(scheme: &str) -> Option<String> {
    let names: &[&str] = match scheme {
        "https" => &["HTTPS_PROXY", "https_proxy", "ALL_PROXY", "all_proxy"],
        "http" => &["HTTP_PROXY", "http_proxy", "ALL_PROXY", "all_proxy"],
        _ => return None,
    };
    names.iter().find_map(|name| {
        std::env::var(name)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}

/// Replaces secret query parameter values with `***` for logging.
#[must_use]
pub fn redact_url(raw: &str) -> String {
    let Ok(mut parsed) = Url::parse(raw) else {
        return raw.to_string();
    };
    let pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .map(|(k, v)| {
            let value = if SECRET_QUERY_PARAMS.contains(&k.to_ascii_lowercase().as_str()) {
                "***".to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), value)
        })
        .collect();
    if pairs.is_empty() {
        return parsed.to_string();
    }
    parsed.query_pairs_mut().clear().extend_pairs(pairs);
    parsed.to_string()
}

/// One provider's HTTP endpoint: client, base URL, and timeout.
#[derive(Debug, Clone)]
pub struct SourceHttp {
    source_name: &'static str,
    client: Client,
    base_url: String,
    request_timeout: Duration,
}

impl SourceHttp {
    /// Validates `base_url` and builds the client.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidBaseUrl`] for an unparseable base URL and
    /// [`SourceError::ClientBuild`] when the client cannot be built.
    pub fn new(
        source_name: &'static str,
        base_url: &str,
        config: &SearchConfig,
    ) -> Result<Self, SourceError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let parsed = Url::parse(trimmed)
            .map_err(|e| SourceError::invalid_base_url(source_name, base_url, &e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(SourceError::invalid_base_url(
                source_name,
                base_url,
                "scheme must be http or https",
            ));
        }
        let client =
            build_source_http_client(source_name, config.connect_timeout, config.request_timeout)?;
        Ok(Self {
            source_name,
            client,
            base_url: trimmed.to_string(),
            request_timeout: config.request_timeout,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Joins `path_and_query` (leading `/`) onto the base URL.
    #[must_use]
    pub fn url(&self, path_and_query: &str) -> String {
        format!("{}{path_and_query}", self.base_url)
    }

    /// GETs `url` and decodes the JSON body into `T`.
    ///
    /// The whole exchange (send plus body read) runs under the request
    /// timeout; on expiry the in-flight request is dropped.
    ///
    /// # Errors
    ///
    /// [`SourceError::Timeout`], [`SourceError::Http`], [`SourceError::Status`]
    /// for non-2xx responses, or [`SourceError::Decode`] for unexpected bodies.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, SourceError> {
        debug!(source = self.source_name, url = %redact_url(url), "GET");
        let timeout_ms = u64::try_from(self.request_timeout.as_millis()).unwrap_or(u64::MAX);

        let exchange = async {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| self.transport_error(e))?;

            let status = response.status();
            if !status.is_success() {
                return Err(SourceError::status(self.source_name, status.as_u16()));
            }

            let body = response
                .bytes()
                .await
                .map_err(|e| self.transport_error(e))?;
            serde_json::from_slice::<T>(&body)
                .map_err(|e| SourceError::decode(self.source_name, &e.to_string()))
        };

        tokio::time::timeout(self.request_timeout, exchange)
            .await
            .map_err(|_| SourceError::timeout(self.source_name, timeout_ms))?
    }

    fn transport_error(&self, error: reqwest::Error) -> SourceError {
        if error.is_timeout() {
            let timeout_ms = u64::try_from(self.request_timeout.as_millis()).unwrap_or(u64::MAX);
            SourceError::timeout(self.source_name, timeout_ms)
        } else {
            // reqwest errors embed the URL, which may carry an API key.
            SourceError::http(self.source_name, &error.without_url().to_string())
        }
    }
}
