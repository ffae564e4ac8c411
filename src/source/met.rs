//! The Metropolitan Museum of Art collection API adapter.
//!
//! Two-phase: the search endpoint returns bare object IDs, and every object's
//! record is fetched separately through the [`BatchFetcher`]. Object records
//! are cached by ID as well, so overlapping searches reuse them.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::artwork::{Artwork, ArtworkDraft, NO_STYLE_PLACEHOLDER};
use crate::batch::BatchFetcher;
use crate::cache::TtlCache;
use crate::config::SearchConfig;

use super::http_client::SourceHttp;
use super::{SearchCache, Source, SourceError, cached_search, first_present, lenient};

/// Default MET collection API base URL.
const DEFAULT_BASE_URL: &str = "https://collectionapi.metmuseum.org";

const SOURCE_NAME: &str = "The Metropolitan Museum of Art";

// ==================== MET API Response Types ====================

/// Response of `/public/collection/v1/search`.
#[derive(Debug, Deserialize)]
pub(crate) struct MetSearchResponse {
    /// `null` when nothing matched.
    #[serde(rename = "objectIDs", default, deserialize_with = "lenient::ids")]
    pub object_ids: Vec<String>,
}

/// One object record from `/public/collection/v1/objects/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetObject {
    #[serde(rename = "objectID", default, deserialize_with = "lenient::text")]
    pub object_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub primary_image: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub primary_image_small: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub artist_display_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub object_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub artist_nationality: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub credit_line: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub department: Option<String>,
}

/// Maps a MET object record to an [`Artwork`].
///
/// The image falls back from `primaryImage` to `primaryImageSmall`. MET
/// exposes no style field, so a fixed placeholder is used.
#[must_use]
pub fn format_output(raw: Option<&MetObject>) -> Option<Artwork> {
    let raw = raw?;
    Some(
        ArtworkDraft {
            external_id: raw.object_id.clone(),
            title: raw.title.clone(),
            artist: raw.artist_display_name.clone(),
            date_painted: raw.object_date.clone(),
            country_of_origin: raw.artist_nationality.clone(),
            description: raw.credit_line.clone(),
            department: raw.department.clone(),
            style: Some(NO_STYLE_PLACEHOLDER.to_string()),
            image_url: first_present([
                raw.primary_image.as_deref(),
                raw.primary_image_small.as_deref(),
            ]),
        }
        .finish(),
    )
}

// ==================== MetSource ====================

/// Adapter for the MET collection API.
pub struct MetSource {
    http: SourceHttp,
    searches: SearchCache,
    objects: TtlCache<String, MetObject>,
    fetcher: BatchFetcher,
}

impl MetSource {
    /// Creates the adapter against the public MET API.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if HTTP client construction fails.
    pub fn new(config: &SearchConfig) -> Result<Self, SourceError> {
        Self::with_base_url(config, DEFAULT_BASE_URL)
    }

    /// Creates the adapter against a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the base URL is invalid or the client cannot be built.
    pub fn with_base_url(config: &SearchConfig, base_url: &str) -> Result<Self, SourceError> {
        Ok(Self {
            http: SourceHttp::new(SOURCE_NAME, base_url, config)?,
            searches: SearchCache::with_clock(config.cache_ttl, config.clock.clone()),
            objects: TtlCache::with_clock(config.cache_ttl, config.clock.clone()),
            fetcher: BatchFetcher::new(config.batch),
        })
    }

    async fn object_ids(&self, term: &str) -> Result<Vec<String>, SourceError> {
        // Quoted so multi-word terms match as a phrase.
        let query = urlencoding::encode(&format!("\"{term}\"")).into_owned();
        let url = self
            .http
            .url(&format!("/public/collection/v1/search?hasImages=true&q={query}"));
        let response: MetSearchResponse = self.http.get_json(&url).await?;
        Ok(response.object_ids)
    }

    async fn object(&self, id: String) -> Result<MetObject, SourceError> {
        if let Some(hit) = self.objects.get(&id) {
            return Ok(hit);
        }
        let url = self.http.url(&format!("/public/collection/v1/objects/{id}"));
        let object: MetObject = self.http.get_json(&url).await?;
        self.objects.insert(id, object.clone());
        Ok(object)
    }

    async fn fetch(&self, term: &str) -> Result<Vec<Artwork>, SourceError> {
        let ids = self.object_ids(term).await?;
        if ids.is_empty() {
            debug!(source = SOURCE_NAME, term, "no matching objects");
            return Ok(Vec::new());
        }

        let objects = self.fetcher.fetch_all(&ids, |id| self.object(id)).await;
        Ok(objects
            .iter()
            .filter_map(|object| format_output(Some(object)))
            .collect())
    }
}

impl std::fmt::Debug for MetSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetSource")
            .field("base_url", &self.http.base_url())
            .field("cached_searches", &self.searches.len())
            .field("cached_objects", &self.objects.len())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Source for MetSource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    #[instrument(skip(self), fields(source = SOURCE_NAME))]
    async fn search(&self, term: &str) -> Result<Vec<Artwork>, SourceError> {
        Ok(cached_search(SOURCE_NAME, &self.searches, term, || self.fetch(term)).await)
    }

    fn clear_cache(&self) {
        self.searches.clear();
        self.objects.clear();
    }
}
