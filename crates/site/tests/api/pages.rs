use crate::helpers::{body_text, spawn_app, spawn_app_with_hosts, MockGeocodeService, MockPowerApi};
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use hyper::header;
use site::hosts::AllowedHosts;
use tower::ServiceExt;

/// The page holds every element the controller and the fragments target
#[tokio::test]
async fn index_renders_form_with_defaults() {
    let test_app = spawn_app(MockPowerApi::new(), MockGeocodeService::new()).await;
    let response = test_app.get("/").await;

    assert!(response.status().is_success());
    let html = body_text(response).await;
    assert!(html.contains(r#"id="location-form""#));
    assert!(html.contains(r#"value="43.653200""#));
    assert!(html.contains(r#"value="-79.383200""#));
    assert!(html.contains("Toronto, Ontario, Canada"));
    assert!(html.contains(r#"<option value="GWETPROF" selected>"#));
    assert!(html.contains(r#"hx-get="/power/""#));
    assert!(html.contains(r#"hx-get="/forecast/""#));
    assert!(html.contains(r##"hx-target="#forecast-chart""##));
}

#[tokio::test]
async fn unknown_hosts_are_rejected() {
    let test_app = spawn_app_with_hosts(
        MockPowerApi::new(),
        MockGeocodeService::new(),
        AllowedHosts::parse("soilcast.example.org,.onrender.com"),
    )
    .await;

    let request = |host: &str| {
        Request::builder()
            .uri("/")
            .header(header::HOST, host)
            .body(Body::empty())
            .unwrap()
    };

    let response = test_app.app.clone().oneshot(request("evil.test")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = test_app
        .app
        .clone()
        .oneshot(request("soilcast.example.org:443"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = test_app
        .app
        .clone()
        .oneshot(request("soilcast.onrender.com"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_static_file_is_not_found() {
    let test_app = spawn_app(MockPowerApi::new(), MockGeocodeService::new()).await;
    let response = test_app.get("/static/does-not-exist.js").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
