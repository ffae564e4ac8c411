//! Integration tests: every museum adapter behind one aggregator, each backed
//! by its own wiremock server.

mod support;

use std::sync::Arc;
use std::time::Duration;

use gallery_core::{
    Aggregator, BatchPolicy, ChicagoSource, ClevelandSource, EuropeanaSource, HarvardSource,
    MetSource, SearchConfig, SearchOptions, Source,
};
use serde_json::json;
use support::socket_guard::start_mock_server_or_skip;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config() -> SearchConfig {
    SearchConfig {
        batch: BatchPolicy::new(15, Duration::ZERO, 60),
        europeana_api_key: Some("eu-test".to_string()),
        harvard_api_key: Some("hv-test".to_string()),
        ..SearchConfig::default()
    }
}

async fn mount_met(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/public/collection/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total": 2, "objectIDs": [436535, 999]})))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/public/collection/v1/objects/436535"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "objectID": 436535,
            "title": "Wheat Field with Cypresses",
            "artistDisplayName": "Vincent van Gogh",
            "objectDate": "1889",
            "primaryImage": "https://images.metmuseum.org/wheat.jpg"
        })))
        .mount(server)
        .await;
    // Record without any image: dropped by the aggregator.
    Mock::given(method("GET"))
        .and(path("/public/collection/v1/objects/999"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "objectID": 999,
            "title": "Fragment",
            "primaryImage": ""
        })))
        .mount(server)
        .await;
}

async fn mount_chicago(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/artworks/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [{"id": 80607}]})))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/artworks/80607"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "id": 80607,
                "title": "The Bedroom",
                "artist_title": "Vincent van Gogh",
                "description": "<p>Van Gogh's <em>bedroom</em> in Arles.</p>",
                "image_id": "25c31d8d-21a4-9ea1-1d73-6a2eca4dda7e"
            },
            "config": {"iiif_url": "https://www.artic.edu/iiif/2"}
        })))
        .mount(server)
        .await;
}

async fn mount_cleveland(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/artworks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "id": 135382,
                "title": "The Large Plane Trees",
                "creators": [{"description": "Vincent van Gogh (Dutch, 1853-1890)"}],
                "images": {"web": {"url": "https://openaccess-cdn.clevelandart.org/trees.jpg"}}
            }]
        })))
        .mount(server)
        .await;
}

async fn mount_europeana(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "id": "/2021672/resource_document_mauritshuis_670",
                "title": ["Vase with Flowers"],
                "dcCreator": ["Vincent van Gogh"],
                "edmIsShownBy": ["https://europeana.example/vase.jpg"]
            }]
        })))
        .mount(server)
        .await;
}

async fn mount_harvard_failure(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path_regex("^/object"))
        .respond_with(ResponseTemplate::new(500))
        .mount(server)
        .await;
}

async fn start_servers() -> Option<[MockServer; 5]> {
    let met = start_mock_server_or_skip().await?;
    let chicago = start_mock_server_or_skip().await?;
    let cleveland = start_mock_server_or_skip().await?;
    let europeana = start_mock_server_or_skip().await?;
    let harvard = start_mock_server_or_skip().await?;
    mount_met(&met).await;
    mount_chicago(&chicago).await;
    mount_cleveland(&cleveland).await;
    mount_europeana(&europeana).await;
    mount_harvard_failure(&harvard).await;
    Some([met, chicago, cleveland, europeana, harvard])
}

fn sources_for(servers: &[MockServer; 5], config: &SearchConfig) -> Vec<Arc<dyn Source>> {
    vec![
        Arc::new(MetSource::with_base_url(config, &servers[0].uri()).unwrap()),
        Arc::new(ChicagoSource::with_base_url(config, &servers[1].uri()).unwrap()),
        Arc::new(ClevelandSource::with_base_url(config, &servers[2].uri()).unwrap()),
        Arc::new(EuropeanaSource::with_base_url(config, &servers[3].uri()).unwrap()),
        Arc::new(HarvardSource::with_base_url(config, &servers[4].uri()).unwrap()),
    ]
}

#[tokio::test]
async fn test_search_merges_every_healthy_source() {
    let Some(servers) = start_servers().await else {
        return;
    };
    let aggregator = Aggregator::with_seed(sources_for(&servers, &test_config()), 42);

    let found = aggregator.search("van gogh").await;

    let mut sources: Vec<&str> = found.iter().map(|a| a.source.as_str()).collect();
    sources.sort_unstable();
    assert_eq!(
        sources,
        vec![
            "Art Institute of Chicago",
            "Cleveland Museum of Art",
            "Europeana",
            "The Metropolitan Museum of Art",
        ]
    );
    assert!(found.iter().all(|a| a.has_displayable_image()));
    assert!(found.iter().all(|a| a.title != "Fragment"));
}

#[tokio::test]
async fn test_search_normalizes_provider_fields() {
    let Some(servers) = start_servers().await else {
        return;
    };
    let aggregator = Aggregator::with_seed(sources_for(&servers, &test_config()), 7);

    let found = aggregator.search("van gogh").await;

    let bedroom = found.iter().find(|a| a.title == "The Bedroom").unwrap();
    assert_eq!(bedroom.description, "Van Gogh's bedroom in Arles.");
    assert_eq!(
        bedroom.image_url.as_deref(),
        Some("https://www.artic.edu/iiif/2/25c31d8d-21a4-9ea1-1d73-6a2eca4dda7e/full/843,/0/default.jpg")
    );

    let trees = found.iter().find(|a| a.title == "The Large Plane Trees").unwrap();
    assert_eq!(trees.artist, "Vincent van Gogh (Dutch, 1853-1890)");

    let vase = found.iter().find(|a| a.source == "Europeana").unwrap();
    assert_eq!(vase.title, "Vase with Flowers");
    assert_eq!(vase.artist, "Vincent van Gogh");
}

#[tokio::test]
async fn test_unshuffled_search_with_same_seed_is_repeatable() {
    let Some(servers) = start_servers().await else {
        return;
    };
    let config = test_config();
    let first = Aggregator::with_seed(sources_for(&servers, &config), 99)
        .search_with("van gogh", SearchOptions { shuffle: false })
        .await;
    let second = Aggregator::with_seed(sources_for(&servers, &config), 99)
        .search_with("van gogh", SearchOptions { shuffle: false })
        .await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_artist_view_keeps_exact_matches_only() {
    let Some(servers) = start_servers().await else {
        return;
    };
    let aggregator = Aggregator::with_seed(sources_for(&servers, &test_config()), 1);

    let found = aggregator.artist("Vincent van Gogh").await;

    // Cleveland's creator text carries nationality and dates, so it is excluded.
    assert_eq!(found.len(), 3);
    assert!(found.iter().all(|a| a.artist == "Vincent van Gogh"));
}

#[tokio::test]
async fn test_museum_view_filters_to_one_source() {
    let Some(servers) = start_servers().await else {
        return;
    };
    let aggregator = Aggregator::with_seed(sources_for(&servers, &test_config()), 3);

    let found = aggregator
        .museum("Cleveland Museum of Art", Some("van gogh"), 100)
        .await;

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].source, "Cleveland Museum of Art");
}
