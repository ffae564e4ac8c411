//! Europeana search API adapter.
//!
//! One-phase. Nearly every Europeana field is a list or a language map, which
//! the lenient decoders collapse to the first usable value. Requires an API
//! key (`wskey`); without one every search degrades to an empty list.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::instrument;

use crate::artwork::{Artwork, ArtworkDraft, NO_STYLE_PLACEHOLDER};
use crate::config::{EUROPEANA_API_KEY_ENV, SearchConfig};

use super::http_client::SourceHttp;
use super::{SearchCache, Source, SourceError, cached_search, first_present, lenient};

/// Default Europeana record API base URL.
const DEFAULT_BASE_URL: &str = "https://api.europeana.eu/record/v2";

const SOURCE_NAME: &str = "Europeana";

// ==================== Europeana API Response Types ====================

#[derive(Debug, Deserialize)]
pub(crate) struct EuropeanaSearchResponse {
    #[serde(default, deserialize_with = "lenient::records")]
    pub items: Vec<EuropeanaItem>,
}

/// One item from the Europeana search response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EuropeanaItem {
    #[serde(default, deserialize_with = "lenient::text")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub dc_creator: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub dc_creator_lang_aware: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub year: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub dc_description: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub dc_description_lang_aware: Option<String>,
    /// Holding institution.
    #[serde(default, deserialize_with = "lenient::text")]
    pub data_provider: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub edm_concept_label: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub edm_is_shown_by: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub edm_preview: Option<String>,
}

/// Maps a Europeana item to an [`Artwork`].
///
/// The full-size `edmIsShownBy` image is preferred over the `edmPreview`
/// thumbnail. Items without a concept label get the style placeholder.
#[must_use]
pub fn format_output(raw: Option<&EuropeanaItem>) -> Option<Artwork> {
    let raw = raw?;
    Some(
        ArtworkDraft {
            external_id: raw.id.clone(),
            title: raw.title.clone(),
            artist: first_present([raw.dc_creator.as_deref(), raw.dc_creator_lang_aware.as_deref()]),
            date_painted: raw.year.clone(),
            country_of_origin: raw.country.clone(),
            description: first_present([
                raw.dc_description.as_deref(),
                raw.dc_description_lang_aware.as_deref(),
            ]),
            department: raw.data_provider.clone(),
            style: first_present([raw.edm_concept_label.as_deref(), Some(NO_STYLE_PLACEHOLDER)]),
            image_url: first_present([raw.edm_is_shown_by.as_deref(), raw.edm_preview.as_deref()]),
        }
        .finish(),
    )
}

// ==================== EuropeanaSource ====================

/// Adapter for the Europeana search API.
pub struct EuropeanaSource {
    http: SourceHttp,
    searches: SearchCache,
    api_key: Option<String>,
    max_results: usize,
}

impl EuropeanaSource {
    /// Creates the adapter against the public Europeana API.
    ///
    /// A missing API key is not an error here; searches degrade instead.
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
            api_key: config.europeana_api_key.clone(),
            max_results: config.max_results,
        })
    }

    async fn fetch(&self, term: &str) -> Result<Vec<Artwork>, SourceError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(SourceError::missing_api_key(SOURCE_NAME, EUROPEANA_API_KEY_ENV));
        };
        let url = self.http.url(&format!(
            "/search.json?wskey={}&query={}&rows={}",
            urlencoding::encode(api_key),
            urlencoding::encode(term),
            self.max_results
        ));
        let response: EuropeanaSearchResponse = self.http.get_json(&url).await?;
        Ok(response
            .items
            .iter()
            .take(self.max_results)
            .filter_map(|item| format_output(Some(item)))
            .collect())
    }
}

impl std::fmt::Debug for EuropeanaSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EuropeanaSource")
            .field("base_url", &self.http.base_url())
            .field("has_api_key", &self.api_key.is_some())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Source for EuropeanaSource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    #[instrument(skip(self), fields(source = SOURCE_NAME))]
    async fn search(&self, term: &str) -> Result<Vec<Artwork>, SourceError> {
        Ok(cached_search(SOURCE_NAME, &self.searches, term, || self.fetch(term)).await)
    }

    fn clear_cache(&self) {
        self.searches.clear();
    }
}
