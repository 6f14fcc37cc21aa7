//! End-to-end flows through the `Marketplace` facade.

use std::collections::BTreeMap;
use std::time::Duration;

use evmart_catalog::{
    CatalogClient, CatalogClientConfig, Marketplace, MediaConfig, MediaResolver,
};
use evmart_core::{CatalogKind, GeoCoordinate};
use evmart_geo::GeoLinkParser;
use evmart_search::{FilterSpec, Predicate};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_marketplace(server: &MockServer) -> Marketplace {
    let base = server.uri();
    let catalog = CatalogClient::new(CatalogClientConfig {
        api_base_url: base.clone(),
        timeout_secs: 5,
        user_agent: "evmart-test/0.1".to_owned(),
        initial_page_size: 100,
        max_page_size: 5000,
        max_retries: 0,
        backoff_base_ms: 0,
        cache_ttl: Duration::from_secs(300),
    })
    .expect("catalog client");
    let media = MediaResolver::new(MediaConfig {
        storage_base_url: None,
        uploads_base_url: format!("{base}/uploads"),
        placeholder_urls: BTreeMap::new(),
        probe_timeout_secs: 3,
        memo_ttl: Duration::from_secs(1800),
        user_agent: "evmart-test/0.1".to_owned(),
    })
    .expect("media resolver");
    let geo = GeoLinkParser::new(3, "evmart-test/0.1").expect("geo parser");
    Marketplace::new(catalog, media, geo)
}

async fn mount_collection(server: &MockServer, at: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn phnom_penh() -> GeoCoordinate {
    GeoCoordinate::new(11.5564, 104.9282).expect("origin")
}

#[tokio::test]
async fn price_range_filters_vehicles() {
    let server = MockServer::start().await;
    mount_collection(
        &server,
        "/Product",
        json!({"data": [{"id": 1, "price": 20000}, {"id": 2, "price": 90000}]}),
    )
    .await;

    let spec = FilterSpec::new().with(
        "price",
        Predicate::Range {
            min: 0.0,
            max: 50_000.0,
        },
    );
    let page = test_marketplace(&server)
        .apply_filters(CatalogKind::Vehicles, &spec, 0, 10)
        .await;

    let ids: Vec<i64> = page.items.iter().map(|r| r.id()).collect();
    assert_eq!(ids, vec![1]);
    assert_eq!(page.total, 1);
    assert!(!page.has_more);
}

#[tokio::test]
async fn default_spec_pages_through_everything() {
    let server = MockServer::start().await;
    let data: Vec<_> = (1..=5).map(|id| json!({"id": id, "name": format!("Item {id}")})).collect();
    mount_collection(&server, "/Accessory", json!({ "data": data })).await;

    let market = test_marketplace(&server);
    let first = market
        .apply_filters(CatalogKind::Accessories, &FilterSpec::new(), 0, 2)
        .await;
    assert_eq!(first.items.len(), 2);
    assert!(first.has_more);
    assert_eq!(first.next_offset, Some(2));

    let last = market
        .apply_filters(CatalogKind::Accessories, &FilterSpec::new(), 4, 2)
        .await;
    assert_eq!(last.items.iter().map(|r| r.id()).collect::<Vec<_>>(), vec![5]);
    assert!(!last.has_more);

    let beyond = market
        .apply_filters(CatalogKind::Accessories, &FilterSpec::new(), 99, 2)
        .await;
    assert!(beyond.items.is_empty());
    assert_eq!(beyond.offset, 5);
}

#[tokio::test]
async fn unavailable_catalog_yields_empty_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/Garage"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let page = test_marketplace(&server)
        .apply_filters(CatalogKind::Garages, &FilterSpec::new(), 0, 10)
        .await;
    assert!(page.items.is_empty());
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn nearest_garage_wins() {
    let server = MockServer::start().await;
    // Roughly 3.2 km and 1.1 km due north of the origin.
    mount_collection(
        &server,
        "/Garage",
        json!({"data": [
            {"id": 1, "garageName": "Far", "latitude": 11.5852, "longitude": 104.9282},
            {"id": 2, "garageName": "Near", "latitude": 11.5663, "longitude": 104.9282},
            {"id": 3, "garageName": "Nowhere"}
        ]}),
    )
    .await;

    let ranked = test_marketplace(&server)
        .rank_nearest(CatalogKind::Garages, phnom_penh(), 1, None)
        .await;

    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].record.id(), 2);
    assert!((ranked[0].distance_km - 1.1).abs() < 0.05);
}

#[tokio::test]
async fn ranking_runs_within_filtered_subset() {
    let server = MockServer::start().await;
    mount_collection(
        &server,
        "/ChargingStation",
        json!({"data": [
            {"id": 1, "name": "Near AC", "type": "AC", "mapLink": "https://maps.google.com/?q=11.5663,104.9282"},
            {"id": 2, "name": "Far DC", "type": "DC Fast", "mapLink": "https://www.google.com/maps/@11.5852,104.9282,15z"},
            {"id": 3, "name": "Farther DC", "type": "DC Fast", "mapLink": "https://maps.google.com/?ll=11.6500,104.9282"}
        ]}),
    )
    .await;

    let spec = FilterSpec::new().with("type", Predicate::Exact("dc fast".to_owned()));
    let ranked = test_marketplace(&server)
        .rank_nearest(CatalogKind::ChargingStations, phnom_penh(), 5, Some(&spec))
        .await;

    let ids: Vec<i64> = ranked.iter().map(|r| r.record.id()).collect();
    assert_eq!(ids, vec![2, 3]);
    assert!(ranked[0].distance_km <= ranked[1].distance_km);
}

#[tokio::test]
async fn unique_brands_come_from_snapshot() {
    let server = MockServer::start().await;
    mount_collection(
        &server,
        "/Product",
        json!([
            {"id": 1, "brand": "Tesla"},
            {"id": 2, "brand": "BYD"},
            {"id": 3, "brand": "Tesla"}
        ]),
    )
    .await;

    let brands = test_marketplace(&server)
        .fetch_unique(CatalogKind::Vehicles, "brand")
        .await;
    assert_eq!(brands, vec!["BYD", "Tesla"]);
}

#[tokio::test]
async fn extract_coordinate_parses_plain_links() {
    let server = MockServer::start().await;
    let coord = test_marketplace(&server)
        .extract_coordinate("https://www.google.com/maps?q=11.5564,104.9282")
        .await
        .expect("coordinate");
    assert!((coord.lat - 11.5564).abs() < 1e-9);
    assert!((coord.lng - 104.9282).abs() < 1e-9);
}

#[tokio::test]
async fn resolve_image_probes_uploads() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/uploads/garage.png"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "image/png"))
        .mount(&server)
        .await;

    let url = test_marketplace(&server)
        .resolve_image(CatalogKind::Garages, "garage.png")
        .await;
    assert_eq!(url, format!("{}/uploads/garage.png", server.uri()));
}
