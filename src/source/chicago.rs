//! Art Institute of Chicago API adapter.
//!
//! Two-phase like MET. The search asks for a random page in `1..=3` so
//! repeated searches for the same term surface different works; an empty
//! random page falls back to page 1. Images are served through the
//! institute's IIIF image server.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::artwork::{Artwork, ArtworkDraft};
use crate::batch::BatchFetcher;
use crate::cache::TtlCache;
use crate::config::SearchConfig;

use super::http_client::SourceHttp;
use super::{SearchCache, Source, SourceError, cached_search, lenient};

/// Default Art Institute of Chicago API base URL.
const DEFAULT_BASE_URL: &str = "https://api.artic.edu/api/v1";

/// IIIF server used when a response carries no `config.iiif_url`.
pub const DEFAULT_IIIF_URL: &str = "https://www.artic.edu/iiif/2";

const SOURCE_NAME: &str = "Art Institute of Chicago";

/// IDs requested per search page.
const SEARCH_PAGE_SIZE: usize = 60;

/// Highest random page requested.
const MAX_RANDOM_PAGE: u32 = 3;

/// Fields requested for each artwork detail record.
const DETAIL_FIELDS: &str = "id,title,artist_display,artist_title,date_display,place_of_origin,description,department_title,style_title,image_id";

// ==================== Chicago API Response Types ====================

#[derive(Debug, Deserialize)]
pub(crate) struct ChicagoSearchResponse {
    #[serde(default, deserialize_with = "lenient::records")]
    pub data: Vec<ChicagoSearchHit>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChicagoSearchHit {
    #[serde(default, deserialize_with = "lenient::text")]
    pub id: Option<String>,
}

/// Response envelope of `/artworks/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ChicagoDetailResponse {
    #[serde(default, deserialize_with = "lenient::record")]
    pub data: Option<ChicagoArtwork>,
    #[serde(default, deserialize_with = "lenient::record")]
    pub config: Option<ChicagoApiConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ChicagoApiConfig {
    #[serde(default, deserialize_with = "lenient::text")]
    pub iiif_url: Option<String>,
}

/// One artwork record from the Chicago API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChicagoArtwork {
    #[serde(default, deserialize_with = "lenient::text")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub title: Option<String>,
    /// Multi-line display text, e.g. "Claude Monet\nFrench, 1840-1926".
    #[serde(default, deserialize_with = "lenient::text")]
    pub artist_display: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub artist_title: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub date_display: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub place_of_origin: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub department_title: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub style_title: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub image_id: Option<String>,
}

/// Builds the IIIF URL for `image_id`, or `None` without an identifier.
#[must_use]
pub fn iiif_image_url(iiif_base: Option<&str>, image_id: Option<&str>) -> Option<String> {
    let image_id = image_id.map(str::trim).filter(|id| !id.is_empty())?;
    let base = iiif_base
        .map(str::trim)
        .filter(|base| !base.is_empty())
        .unwrap_or(DEFAULT_IIIF_URL)
        .trim_end_matches('/');
    Some(format!("{base}/{image_id}/full/843,/0/default.jpg"))
}

/// Maps a Chicago artwork record to an [`Artwork`].
///
/// `iiif_base` comes from the response's `config.iiif_url`.
#[must_use]
pub fn format_output(raw: Option<&ChicagoArtwork>, iiif_base: Option<&str>) -> Option<Artwork> {
    let raw = raw?;
    // artist_title is the bare name; artist_display adds nationality and dates.
    let artist = raw.artist_title.clone().or_else(|| {
        raw.artist_display
            .as_deref()
            .and_then(|display| display.lines().next())
            .map(str::to_string)
    });
    Some(
        ArtworkDraft {
            external_id: raw.id.clone(),
            title: raw.title.clone(),
            artist,
            date_painted: raw.date_display.clone(),
            country_of_origin: raw.place_of_origin.clone(),
            description: raw.description.clone(),
            department: raw.department_title.clone(),
            style: raw.style_title.clone(),
            image_url: iiif_image_url(iiif_base, raw.image_id.as_deref()),
        }
        .finish(),
    )
}

/// Draws a search page in `1..=3`.
pub(crate) fn pick_page<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    rng.gen_range(1..=MAX_RANDOM_PAGE)
}

// ==================== ChicagoSource ====================

/// Adapter for the Art Institute of Chicago API.
pub struct ChicagoSource {
    http: SourceHttp,
    searches: SearchCache,
    details: TtlCache<String, ChicagoDetailResponse>,
    fetcher: BatchFetcher,
    pages: Mutex<StdRng>,
}

impl ChicagoSource {
    /// Creates the adapter against the public Chicago API.
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
            details: TtlCache::with_clock(config.cache_ttl, config.clock.clone()),
            fetcher: BatchFetcher::new(config.batch),
            pages: Mutex::new(StdRng::from_entropy()),
        })
    }

    /// Replaces the page generator with one seeded from `seed`.
    #[must_use]
    pub fn with_page_seed(self, seed: u64) -> Self {
        Self {
            pages: Mutex::new(StdRng::seed_from_u64(seed)),
            ..self
        }
    }

    fn random_page(&self) -> u32 {
        pick_page(&mut *self.pages.lock().unwrap_or_else(PoisonError::into_inner))
    }

    async fn search_page(&self, term: &str, page: u32) -> Result<Vec<String>, SourceError> {
        let url = self.http.url(&format!(
            "/artworks/search?q={}&page={page}&limit={SEARCH_PAGE_SIZE}&fields=id",
            urlencoding::encode(term)
        ));
        let response: ChicagoSearchResponse = self.http.get_json(&url).await?;
        Ok(response.data.into_iter().filter_map(|hit| hit.id).collect())
    }

    async fn artwork_ids(&self, term: &str) -> Result<Vec<String>, SourceError> {
        let page = self.random_page();
        let ids = self.search_page(term, page).await?;
        if ids.is_empty() && page != 1 {
            debug!(source = SOURCE_NAME, term, page, "random page empty, retrying page 1");
            return self.search_page(term, 1).await;
        }
        Ok(ids)
    }

    async fn detail(&self, id: String) -> Result<ChicagoDetailResponse, SourceError> {
        if let Some(hit) = self.details.get(&id) {
            return Ok(hit);
        }
        let url = self
            .http
            .url(&format!("/artworks/{id}?fields={DETAIL_FIELDS}"));
        let detail: ChicagoDetailResponse = self.http.get_json(&url).await?;
        self.details.insert(id, detail.clone());
        Ok(detail)
    }

    async fn fetch(&self, term: &str) -> Result<Vec<Artwork>, SourceError> {
        let ids = self.artwork_ids(term).await?;
        if ids.is_empty() {
            debug!(source = SOURCE_NAME, term, "no matching artworks");
            return Ok(Vec::new());
        }

        let details = self.fetcher.fetch_all(&ids, |id| self.detail(id)).await;
        Ok(details
            .iter()
            .filter_map(|detail| {
                let iiif_base = detail.config.as_ref().and_then(|c| c.iiif_url.as_deref());
                format_output(detail.data.as_ref(), iiif_base)
            })
            .collect())
    }
}

impl std::fmt::Debug for ChicagoSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChicagoSource")
            .field("base_url", &self.http.base_url())
            .field("cached_searches", &self.searches.len())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Source for ChicagoSource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    #[instrument(skip(self), fields(source = SOURCE_NAME))]
    async fn search(&self, term: &str) -> Result<Vec<Artwork>, SourceError> {
        Ok(cached_search(SOURCE_NAME, &self.searches, term, || self.fetch(term)).await)
    }

    fn clear_cache(&self) {
        self.searches.clear();
        self.details.clear();
    }
}
