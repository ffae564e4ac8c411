//! Cleveland Museum of Art open access API adapter.
//!
//! One-phase: search results embed full records. The few records that come
//! back without image renditions get one supplementary `/artworks/{id}`
//! lookup each, paced through the [`BatchFetcher`].

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::artwork::{Artwork, ArtworkDraft};
use crate::batch::BatchFetcher;
use crate::config::SearchConfig;

use super::http_client::SourceHttp;
use super::{SearchCache, Source, SourceError, cached_search, first_present, lenient};

/// Default Cleveland open access API base URL.
const DEFAULT_BASE_URL: &str = "https://openaccess-api.clevelandart.org/api";

const SOURCE_NAME: &str = "Cleveland Museum of Art";

// ==================== Cleveland API Response Types ====================

#[derive(Debug, Deserialize)]
pub(crate) struct ClevelandSearchResponse {
    #[serde(default, deserialize_with = "lenient::records")]
    pub data: Vec<ClevelandArtwork>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ClevelandDetailResponse {
    #[serde(default, deserialize_with = "lenient::record")]
    pub data: Option<ClevelandArtwork>,
}

/// One artwork record from the Cleveland API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClevelandArtwork {
    #[serde(default, deserialize_with = "lenient::text")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient::records")]
    pub creators: Vec<ClevelandCreator>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub creation_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub date_end: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub place_of_origin: Option<String>,
    /// List of culture labels; the first is used.
    #[serde(default, deserialize_with = "lenient::text")]
    pub culture: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub description: Option<String>,
    #[serde(default, alias = "department_title", deserialize_with = "lenient::text")]
    pub department: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub style_title: Option<String>,
    #[serde(default, deserialize_with = "lenient::record")]
    pub images: Option<ClevelandImages>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClevelandCreator {
    /// e.g. "Vincent van Gogh (Dutch, 1853-1890)".
    #[serde(default, deserialize_with = "lenient::text")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClevelandImages {
    #[serde(default, deserialize_with = "lenient::record")]
    pub web: Option<ClevelandRendition>,
    #[serde(default, deserialize_with = "lenient::record")]
    pub print: Option<ClevelandRendition>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClevelandRendition {
    #[serde(default, deserialize_with = "lenient::text")]
    pub url: Option<String>,
}

impl ClevelandArtwork {
    /// Web rendition URL, falling back to the print rendition.
    #[must_use]
    pub fn image_url(&self) -> Option<String> {
        let images = self.images.as_ref()?;
        first_present([
            images.web.as_ref().and_then(|r| r.url.as_deref()),
            images.print.as_ref().and_then(|r| r.url.as_deref()),
        ])
    }
}

/// Maps a Cleveland artwork record to an [`Artwork`].
#[must_use]
pub fn format_output(raw: Option<&ClevelandArtwork>) -> Option<Artwork> {
    let raw = raw?;
    Some(
        ArtworkDraft {
            external_id: raw.id.clone(),
            title: raw.title.clone(),
            artist: raw.creators.first().and_then(|c| c.description.clone()),
            date_painted: first_present([raw.creation_date.as_deref(), raw.date_end.as_deref()]),
            country_of_origin: first_present([
                raw.place_of_origin.as_deref(),
                raw.culture.as_deref(),
            ]),
            description: raw.description.clone(),
            department: raw.department.clone(),
            style: raw.style_title.clone(),
            image_url: raw.image_url(),
        }
        .finish(),
    )
}

// ==================== ClevelandSource ====================

/// Adapter for the Cleveland Museum of Art open access API.
pub struct ClevelandSource {
    http: SourceHttp,
    searches: SearchCache,
    fetcher: BatchFetcher,
    max_results: usize,
}

impl ClevelandSource {
    /// Creates the adapter against the public Cleveland API.
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
            fetcher: BatchFetcher::new(config.batch),
            max_results: config.max_results,
        })
    }

    async fn image_for(&self, id: String) -> Result<(String, Option<String>), SourceError> {
        let url = self.http.url(&format!("/artworks/{id}"));
        let detail: ClevelandDetailResponse = self.http.get_json(&url).await?;
        let image = detail.data.as_ref().and_then(ClevelandArtwork::image_url);
        Ok((id, image))
    }

    async fn fetch(&self, term: &str) -> Result<Vec<Artwork>, SourceError> {
        let url = self.http.url(&format!(
            "/artworks?q={}&has_image=1&limit={}",
            urlencoding::encode(term),
            self.max_results
        ));
        let response: ClevelandSearchResponse = self.http.get_json(&url).await?;
        let mut records = response.data;
        records.truncate(self.max_results);

        let missing: Vec<String> = records
            .iter()
            .filter(|record| record.image_url().is_none())
            .filter_map(|record| record.id.clone())
            .collect();

        let mut images: HashMap<String, String> = HashMap::new();
        if !missing.is_empty() {
            debug!(source = SOURCE_NAME, count = missing.len(), "looking up missing images");
            images = self
                .fetcher
                .fetch_all(&missing, |id| self.image_for(id))
                .await
                .into_iter()
                .filter_map(|(id, image)| image.map(|url| (id, url)))
                .collect();
        }

        Ok(records
            .iter()
            .filter_map(|record| {
                let mut artwork = format_output(Some(record))?;
                if artwork.image_url.is_none() {
                    artwork.image_url = record.id.as_ref().and_then(|id| images.get(id).cloned());
                }
                Some(artwork)
            })
            .collect())
    }
}

impl std::fmt::Debug for ClevelandSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClevelandSource")
            .field("base_url", &self.http.base_url())
            .field("max_results", &self.max_results)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Source for ClevelandSource {
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
