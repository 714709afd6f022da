use crate::helpers::{body_text, spawn_app, toronto, MockGeocodeService, MockPowerApi};
use axum::http::StatusCode;
use serde_json::{json, Value};

/// An empty or absent query is rejected before the geocoder is asked
#[tokio::test]
async fn missing_query_is_bad_request() {
    let test_app = spawn_app(MockPowerApi::new(), MockGeocodeService::new()).await;

    for uri in ["/geocode/", "/geocode/?q=", "/geocode/?q=%20%20"] {
        let response = test_app.get(uri).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body_text(response).await, "Missing q");
    }
}

/// A found place comes back as lat/lon/label and lands in the history
#[tokio::test]
async fn resolves_free_text_and_records_it() {
    let mut geocoder = MockGeocodeService::new();
    geocoder
        .expect_search()
        .withf(|query| query.to_string() == "Toronto")
        .times(1)
        .returning(|_| Ok(Some(toronto())));

    let test_app = spawn_app(MockPowerApi::new(), geocoder).await;
    let response = test_app.get("/geocode/?q=%20Toronto%20").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(
        body,
        json!({
            "lat": 43.6534817,
            "lon": -79.3839347,
            "label": "Toronto, Golden Horseshoe, Ontario, Canada"
        })
    );

    let recent = test_app.db.recent_locations(5).await.unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].query_text, "Toronto");
    assert_eq!(recent[0].display_name, "Toronto, Golden Horseshoe, Ontario, Canada");
}

/// No match is a 404 carrying the message in the error shape
#[tokio::test]
async fn unknown_place_is_not_found() {
    let mut geocoder = MockGeocodeService::new();
    geocoder.expect_search().times(1).returning(|_| Ok(None));

    let test_app = spawn_app(MockPowerApi::new(), geocoder).await;
    let response = test_app.get("/geocode/?q=Atlantis").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body, json!({"error": "Location not found"}));
    assert!(test_app.db.recent_locations(5).await.unwrap().is_empty());
}

/// `lat,lon` never reaches the geocoding service
#[tokio::test]
async fn raw_coordinates_are_parsed_locally() {
    let mut geocoder = MockGeocodeService::new();
    geocoder.expect_search().times(0);

    let test_app = spawn_app(MockPowerApi::new(), geocoder).await;
    let response = test_app.get("/geocode/?q=-12.05,-77.04").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["label"], "-12.050000, -77.040000");
    assert_eq!(body["lat"], -12.05);

    let response = test_app.get("/geocode/?q=95,10").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert!(body["error"].as_str().unwrap().contains("latitude 95"));
}

#[tokio::test]
async fn api_docs_are_served() {
    let test_app = spawn_app(MockPowerApi::new(), MockGeocodeService::new()).await;
    let response = test_app.get("/docs").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("/geocode/"));
}
