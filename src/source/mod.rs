//! Museum source adapters.
//!
//! Each adapter wraps one provider's HTTP API and normalizes its records into
//! the shared [`Artwork`] model. Adapters own their TTL caches and degrade a
//! failed search to an empty result list instead of returning an error.
//!
//! # Architecture
//!
//! - [`Source`] - Async trait every adapter implements
//! - [`MetSource`] - Two-phase adapter for The Metropolitan Museum of Art
//! - [`ChicagoSource`] - Two-phase adapter for the Art Institute of Chicago
//! - [`ClevelandSource`] - One-phase adapter for the Cleveland Museum of Art
//! - [`EuropeanaSource`] - One-phase adapter for Europeana (API key required)
//! - [`HarvardSource`] - One-phase adapter for Harvard Art Museums (API key required)
//!
//! # Example
//!
//! ```no_run
//! use gallery_core::config::SearchConfig;
//! use gallery_core::source::build_default_sources;
//!
//! # async fn example() {
//! let sources = build_default_sources(&SearchConfig::from_env());
//! for source in &sources {
//!     let found = source.search("sunflowers").await.unwrap_or_default();
//!     println!("{}: {}", source.name(), found.len());
//! }
//! # }
//! ```

mod chicago;
mod cleveland;
mod error;
mod europeana;
mod harvard;
mod http_client;
mod lenient;
mod met;

pub use chicago::ChicagoSource;
pub use cleveland::ClevelandSource;
pub use error::SourceError;
pub use europeana::EuropeanaSource;
pub use harvard::HarvardSource;
pub use http_client::{SourceHttp, build_source_http_client, redact_url};
pub use met::MetSource;

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::artwork::Artwork;
use crate::cache::TtlCache;
use crate::config::SearchConfig;

/// Per-term result cache shared by every adapter.
pub type SearchCache = TtlCache<String, Vec<Artwork>>;

/// Builds the default source list, in display order.
///
/// A source whose construction fails is logged and left out; the remaining
/// sources still serve searches.
#[must_use]
pub fn build_default_sources(config: &SearchConfig) -> Vec<Arc<dyn Source>> {
    let mut sources: Vec<Arc<dyn Source>> = Vec::with_capacity(5);

    match MetSource::new(config) {
        Ok(source) => sources.push(Arc::new(source)),
        Err(error) => warn!(error = %error, "MET source unavailable; continuing with remaining sources"),
    }

    match ChicagoSource::new(config) {
        Ok(source) => sources.push(Arc::new(source)),
        Err(error) => warn!(
            error = %error,
            "Chicago source unavailable; continuing with remaining sources"
        ),
    }

    match ClevelandSource::new(config) {
        Ok(source) => sources.push(Arc::new(source)),
        Err(error) => warn!(
            error = %error,
            "Cleveland source unavailable; continuing with remaining sources"
        ),
    }

    match EuropeanaSource::new(config) {
        Ok(source) => sources.push(Arc::new(source)),
        Err(error) => warn!(
            error = %error,
            "Europeana source unavailable; continuing with remaining sources"
        ),
    }

    match HarvardSource::new(config) {
        Ok(source) => sources.push(Arc::new(source)),
        Err(error) => warn!(
            error = %error,
            "Harvard source unavailable; continuing with remaining sources"
        ),
    }

    sources
}

/// Trait that all museum adapters implement.
///
/// # Object Safety
///
/// Uses `async_trait` so adapters can live behind `Arc<dyn Source>` in the
/// aggregator's registry.
#[async_trait]
pub trait Source: Send + Sync {
    /// Human-readable provider name, attached to every artwork as its `source`.
    fn name(&self) -> &str;

    /// Searches the provider for `term` (already trimmed by the caller).
    ///
    /// Adapters return `Ok(vec![])` when the provider fails; `Err` is reserved
    /// for adapters that cannot degrade.
    async fn search(&self, term: &str) -> Result<Vec<Artwork>, SourceError>;

    /// Drops every cached entry so the next search refetches.
    fn clear_cache(&self) {}
}

/// Normalizes a search term into a cache key.
#[must_use]
pub fn cache_key(term: &str) -> String {
    term.trim().to_lowercase()
}

/// Returns the first candidate that is present and not blank.
pub(crate) fn first_present<'a>(
    candidates: impl IntoIterator<Item = Option<&'a str>>,
) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .find(|value| !value.trim().is_empty())
        .map(str::to_string)
}

/// Serves `term` from `cache`, or runs `fetch` and caches its outcome.
///
/// A failed fetch is logged and cached as an empty list, so a broken source
/// is not hammered again until the entry expires.
pub(crate) async fn cached_search<F, Fut>(
    source_name: &str,
    cache: &SearchCache,
    term: &str,
    fetch: F,
) -> Vec<Artwork>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<Artwork>, SourceError>>,
{
    let key = cache_key(term);
    if let Some(hit) = cache.get(&key) {
        debug!(source = source_name, term, count = hit.len(), "cache hit");
        return hit;
    }

    let artworks = match fetch().await {
        Ok(artworks) => artworks,
        Err(error) => {
            warn!(
                source = source_name,
                term,
                transient = error.is_transient(),
                error = %error,
                "search failed; returning no results"
            );
            Vec::new()
        }
    };

    debug!(source = source_name, term, count = artworks.len(), "caching search results");
    cache.insert(key, artworks.clone());
    artworks
}
