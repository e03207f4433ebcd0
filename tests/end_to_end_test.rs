use httpmock::prelude::*;
use site_finder::{build_session, CatalogState, Region, SiteError, TomlConfig};
use std::time::Duration;

fn site(name: &str, phone: &str, street: &str, city: &str, zip: &str) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "description": format!("{} testing", name),
        "phones": [{"number": phone}],
        "physical_address": [{"address_1": street, "city": city, "postal_code": zip}]
    })
}

fn config_for(server: &MockServer, extra: &str) -> TomlConfig {
    let toml_content = format!(
        r#"
[catalog]
base_url = "{}"
timeout_seconds = 5

[geocoder]
endpoint = "{}"
timeout_seconds = 5
user_agent = "site-finder-tests"

{}
"#,
        server.base_url(),
        server.url("/search"),
        extra
    );
    TomlConfig::from_toml_str(&toml_content).unwrap()
}

fn mock_geocode(server: &MockServer, address: &str, lat: &str, lon: &str) {
    let body = serde_json::json!([{"lat": lat, "lon": lon}]);
    server.mock(|when, then| {
        when.method(GET).path("/search").query_param("q", address);
        then.status(200).json_body(body);
    });
}

#[tokio::test]
async fn test_california_single_site_end_to_end() {
    let server = MockServer::start();
    let catalog_mock = server.mock(|when, then| {
        when.method(GET).path("/locations/california/complete.json");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!([{
                "name": "Site A",
                "description": "d",
                "phones": [{"number": "555-1111"}],
                "physical_address": [{"address_1": "1 Main St", "city": "LA", "postal_code": "90001"}]
            }]));
    });
    mock_geocode(&server, "1 Main St, LA, CA 90001", "34.0522", "-118.2437");

    let mut session = build_session(&config_for(&server, "")).unwrap();
    let catalog = session.show_region(Region::California).await.unwrap();

    catalog_mock.assert();
    assert_eq!(catalog.sites.len(), 1);
    assert_eq!(catalog.sites[0].site.name, "Site A");
    assert_eq!(catalog.pins.len(), 1);

    let pin = &catalog.pins[0];
    assert_eq!(pin.name, "Site A");
    assert_eq!(pin.phone, "555-1111");
    assert_eq!(pin.latitude, 34.0522);
    assert_eq!(pin.longitude, -118.2437);
    assert_eq!(catalog.center, Some(pin.coordinate()));
    assert!(catalog.is_settled());
}

#[tokio::test]
async fn test_malformed_record_is_skipped_and_rest_geocoded() {
    let server = MockServer::start();
    let mut broken = site("Broken", "555-0000", "0 Gone Rd", "Nowhere", "00000");
    broken["phones"] = serde_json::json!({"number": "not-a-list"});

    server.mock(|when, then| {
        when.method(GET).path("/locations/new-york/complete.json");
        then.status(200).json_body(serde_json::json!([
            site("Alpha", "555-0001", "1 Broadway", "New York", "10004"),
            broken,
            site("Beta", "555-0002", "2 State St", "Albany", "12207")
        ]));
    });
    mock_geocode(&server, "1 Broadway, New York, NY 10004", "40.7054", "-74.0134");
    mock_geocode(&server, "2 State St, Albany, NY 12207", "42.6497", "-73.7520");

    let mut session = build_session(&config_for(&server, "")).unwrap();
    let catalog = session.show_region(Region::NewYork).await.unwrap();

    let names: Vec<&str> = catalog.sites.iter().map(|s| s.site.name.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "Beta"]);
    assert_eq!(catalog.dropped_records, 1);
    assert_eq!(catalog.pins.len(), 2);
}

#[tokio::test]
async fn test_stop_policy_from_config_truncates_batch() {
    let server = MockServer::start();
    let mut broken = site("Broken", "555-0000", "0 Gone Rd", "Nowhere", "00000");
    broken.as_object_mut().unwrap().remove("description");

    server.mock(|when, then| {
        when.method(GET).path("/locations/florida/complete.json");
        then.status(200).json_body(serde_json::json!([
            site("Keys", "555-0101", "1 Duval St", "Key West", "33040"),
            broken,
            site("Never", "555-0102", "9 Ocean Dr", "Miami", "33139")
        ]));
    });
    mock_geocode(&server, "1 Duval St, Key West, FL 33040", "24.5551", "-81.8032");

    let config = config_for(&server, "[parser]\non_invalid_record = \"stop\"");
    let mut session = build_session(&config).unwrap();
    let catalog = session.show_region(Region::Florida).await.unwrap();

    assert_eq!(catalog.sites.len(), 1);
    assert_eq!(catalog.sites[0].site.name, "Keys");
    assert_eq!(catalog.dropped_records, 2);
}

#[tokio::test]
async fn test_fetch_failure_leaves_empty_state_and_reselect_recovers() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/locations/new-jersey/complete.json");
        then.status(500);
    });
    server.mock(|when, then| {
        when.method(GET).path("/locations/washington/complete.json");
        then.status(200).json_body(serde_json::json!([
            site("Seattle Center", "555-0201", "305 Harrison St", "Seattle", "98109")
        ]));
    });
    mock_geocode(&server, "305 Harrison St, Seattle, WA 98109", "47.6205", "-122.3493");

    let mut session = build_session(&config_for(&server, "")).unwrap();

    let err = session.show_region(Region::NewJersey).await.unwrap_err();
    assert!(matches!(err, SiteError::HttpStatusError { status: 500, .. }));
    assert!(session.catalog().is_empty());
    assert!(matches!(session.catalog().state, CatalogState::Failed { .. }));

    let catalog = session.show_region(Region::Washington).await.unwrap();
    assert_eq!(catalog.region, Region::Washington);
    assert_eq!(catalog.pins.len(), 1);
}

#[tokio::test]
async fn test_non_array_payload_is_parse_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/locations/california/complete.json");
        then.status(200).json_body(serde_json::json!({"error": "moved"}));
    });

    let mut session = build_session(&config_for(&server, "")).unwrap();
    let err = session.select_region(Region::California).await.unwrap_err();

    assert!(matches!(err, SiteError::ParseError { .. }));
    assert!(session.catalog().sites.is_empty());
}

#[tokio::test]
async fn test_geocoder_outage_keeps_sites_without_pins() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/locations/california/complete.json");
        then.status(200).json_body(serde_json::json!([
            site("A", "555-1", "1 First St", "Fresno", "93701"),
            site("B", "555-2", "2 Second St", "Fresno", "93701")
        ]));
    });
    server.mock(|when, then| {
        when.method(GET).path("/search");
        then.status(503);
    });

    let mut session = build_session(&config_for(&server, "")).unwrap();
    let catalog = session.show_region(Region::California).await.unwrap();

    assert_eq!(catalog.sites.len(), 2);
    assert!(catalog.pins.is_empty());
    assert_eq!(catalog.unlocated(), 2);
    assert!(catalog.center.is_none());
    assert!(catalog.is_settled());
}

#[tokio::test]
async fn test_switching_region_drops_late_results_from_previous_region() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/locations/california/complete.json");
        then.status(200).json_body(serde_json::json!([
            site("Slow X", "555-9", "9 Slow Ln", "Oakland", "94601")
        ]));
    });
    server.mock(|when, then| {
        when.method(GET).path("/search").query_param("q", "9 Slow Ln, Oakland, CA 94601");
        then.status(200)
            .delay(Duration::from_millis(800))
            .json_body(serde_json::json!([{"lat": "37.80", "lon": "-122.27"}]));
    });
    server.mock(|when, then| {
        when.method(GET).path("/locations/washington/complete.json");
        then.status(200).json_body(serde_json::json!([
            site("Quick Y", "555-8", "8 Fast Way", "Tacoma", "98402")
        ]));
    });
    mock_geocode(&server, "8 Fast Way, Tacoma, WA 98402", "47.25", "-122.44");

    let mut session = build_session(&config_for(&server, "")).unwrap();
    let mut updates = session.subscribe();

    let x = session.select_region(Region::California).await.unwrap();
    let y = session.select_region(Region::Washington).await.unwrap();
    assert!(y > x);

    let catalog = session.settle().await.clone();

    assert_eq!(catalog.generation, y);
    let names: Vec<&str> = catalog.pins.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Quick Y"]);

    // 觀察者看到的最後狀態也不含舊州的 pin
    let seen = updates.borrow_and_update().clone();
    assert_eq!(seen.region, Region::Washington);
    assert!(seen.pins.iter().all(|p| p.name != "Slow X"));
}
