//! Harvard Art Museums API adapter.
//!
//! One-phase; requires an API key. The artist is the first entry of the
//! record's `people` list.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::instrument;

use crate::artwork::{Artwork, ArtworkDraft};
use crate::config::{HARVARD_API_KEY_ENV, SearchConfig};

use super::http_client::SourceHttp;
use super::{SearchCache, Source, SourceError, cached_search, first_present, lenient};

/// Default Harvard Art Museums API base URL.
const DEFAULT_BASE_URL: &str = "https://api.harvardartmuseums.org";

const SOURCE_NAME: &str = "Harvard Art Museums";

// ==================== Harvard API Response Types ====================

#[derive(Debug, Deserialize)]
pub(crate) struct HarvardSearchResponse {
    #[serde(default, deserialize_with = "lenient::records")]
    pub records: Vec<HarvardObject>,
}

/// One object record from `/object`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HarvardObject {
    #[serde(default, deserialize_with = "lenient::text")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient::records")]
    pub people: Vec<HarvardPerson>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub dated: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub culture: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub commentary: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub department: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub division: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub style: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub primaryimageurl: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HarvardPerson {
    #[serde(default, deserialize_with = "lenient::text")]
    pub displayname: Option<String>,
}

/// Maps a Harvard object record to an [`Artwork`].
#[must_use]
pub fn format_output(raw: Option<&HarvardObject>) -> Option<Artwork> {
    let raw = raw?;
    Some(
        ArtworkDraft {
            external_id: raw.id.clone(),
            title: raw.title.clone(),
            artist: raw.people.first().and_then(|p| p.displayname.clone()),
            date_painted: raw.dated.clone(),
            country_of_origin: raw.culture.clone(),
            description: first_present([raw.commentary.as_deref(), raw.description.as_deref()]),
            department: first_present([raw.department.as_deref(), raw.division.as_deref()]),
            style: raw.style.clone(),
            image_url: raw.primaryimageurl.clone(),
        }
        .finish(),
    )
}

// ==================== HarvardSource ====================

/// Adapter for the Harvard Art Museums API.
pub struct HarvardSource {
    http: SourceHttp,
    searches: SearchCache,
    api_key: Option<String>,
    max_results: usize,
}

impl HarvardSource {
    /// Creates the adapter against the public Harvard API.
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
            api_key: config.harvard_api_key.clone(),
            max_results: config.max_results,
        })
    }

    async fn fetch(&self, term: &str) -> Result<Vec<Artwork>, SourceError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(SourceError::missing_api_key(SOURCE_NAME, HARVARD_API_KEY_ENV));
        };
        let url = self.http.url(&format!(
            "/object?apikey={}&q={}&size={}&hasimage=1",
            urlencoding::encode(api_key),
            urlencoding::encode(term),
            self.max_results
        ));
        let response: HarvardSearchResponse = self.http.get_json(&url).await?;
        Ok(response
            .records
            .iter()
            .take(self.max_results)
            .filter_map(|record| format_output(Some(record)))
            .collect())
    }
}

impl std::fmt::Debug for HarvardSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HarvardSource")
            .field("base_url", &self.http.base_url())
            .field("has_api_key", &self.api_key.is_some())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Source for HarvardSource {
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

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::artwork::{DEFAULT_ARTIST, DEFAULT_DESCRIPTION};
    use crate::test_support::socket_guard::start_mock_server_or_skip;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, ResponseTemplate};

    #[test]
    fn test_format_output_takes_first_person() {
        let raw: HarvardObject = serde_json::from_value(json!({
            "id": 299843,
            "title": "Self-Portrait Dedicated to Paul Gauguin",
            "people": [{"displayname": "Vincent van Gogh"}, {"displayname": "Unknown Framer"}],
            "dated": "1888",
            "culture": "Dutch",
            "division": "European and American Art",
            "primaryimageurl": "https://nrs.harvard.edu/urn-3:HUAM:DDC251942"
        }))
        .unwrap();

        let artwork = format_output(Some(&raw)).unwrap();
        assert_eq!(artwork.artist, "Vincent van Gogh");
        assert_eq!(artwork.country_of_origin, "Dutch");
        assert_eq!(artwork.department, "European and American Art");
        assert_eq!(artwork.description, DEFAULT_DESCRIPTION);
        assert_eq!(artwork.external_id.as_deref(), Some("299843"));
    }

    #[test]
    fn test_format_output_without_people_is_artist_unknown() {
        let raw: HarvardObject = serde_json::from_value(json!({"people": null})).unwrap();
        assert_eq!(format_output(Some(&raw)).unwrap().artist, DEFAULT_ARTIST);
        let raw: HarvardObject = serde_json::from_value(json!({"people": [{}]})).unwrap();
        assert_eq!(format_output(Some(&raw)).unwrap().artist, DEFAULT_ARTIST);
    }

    #[tokio::test]
    async fn test_search_sends_key_and_image_filter() {
        let Some(server) = start_mock_server_or_skip().await else {
            return;
        };
        Mock::given(method("GET"))
            .and(path("/object"))
            .and(query_param("apikey", "hv-key"))
            .and(query_param("q", "rabbit"))
            .and(query_param("size", "100"))
            .and(query_param("hasimage", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "info": {"totalrecords": 1},
                "records": [{"id": 1, "title": "Hare", "primaryimageurl": "https://x/hare.jpg"}]
            })))
            .mount(&server)
            .await;

        let config = SearchConfig {
            harvard_api_key: Some("hv-key".to_string()),
            ..SearchConfig::default()
        };
        let source = HarvardSource::with_base_url(&config, &server.uri()).unwrap();
        let found = source.search("rabbit").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Hare");
    }

    #[tokio::test]
    async fn test_missing_api_key_degrades_without_request() {
        let Some(server) = start_mock_server_or_skip().await else {
            return;
        };
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let source = HarvardSource::with_base_url(&SearchConfig::default(), &server.uri()).unwrap();
        assert!(source.search("rabbit").await.unwrap().is_empty());
    }
}
