use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::Request,
    response::Response,
    Router,
};
use hyper::{header, Method};
use mockall::mock;
use serde_json::{json, Map, Value};
use site::{
    app,
    dates::DateRange,
    geocode::{self, Geocoder, Place},
    hosts::AllowedHosts,
    power::{self, Parameter, PowerData, PowerTable},
    AppState, Database,
};
use soilcast_core::Coordinate;
use std::{sync::Arc, time::Duration};
use time::{macros::date, Duration as Days};
use tower::ServiceExt;

mock! {
    pub PowerApi {}
    #[async_trait]
    impl PowerData for PowerApi {
        async fn fetch(
            &self,
            at: Coordinate,
            range: &DateRange,
            parameters: &[Parameter],
        ) -> Result<PowerTable, power::Error>;
    }
}

mock! {
    pub GeocodeService {}
    #[async_trait]
    impl Geocoder for GeocodeService {
        async fn search(&self, query: &str) -> Result<Option<Place>, geocode::Error>;
    }
}

pub struct TestApp {
    pub app: Router,
    pub db: Arc<Database>,
}

impl TestApp {
    pub async fn get(&self, uri: &str) -> Response {
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .header(header::ACCEPT, "text/html")
            .body(Body::empty())
            .unwrap();
        self.app
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request.")
    }
}

pub async fn spawn_app(power: MockPowerApi, geocoder: MockGeocodeService) -> TestApp {
    spawn_app_with_hosts(power, geocoder, AllowedHosts::any()).await
}

pub async fn spawn_app_with_hosts(
    power: MockPowerApi,
    geocoder: MockGeocodeService,
    allowed_hosts: AllowedHosts,
) -> TestApp {
    let db = Arc::new(Database::in_memory().await.unwrap());
    let state = AppState {
        remote_url: "http://127.0.0.1:8000".to_string(),
        static_dir: "./static".to_string(),
        power: Arc::new(power),
        geocoder: Arc::new(geocoder),
        db: db.clone(),
        allowed_hosts,
        request_timeout: Duration::from_secs(30),
    };
    TestApp {
        app: app(state),
        db,
    }
}

pub async fn body_text(response: Response) -> String {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

/// `days` of ground wetness and temperature starting 2025-01-01, the last
/// wetness reading missing
pub fn power_table(days: i64) -> PowerTable {
    let start = date!(2025 - 01 - 01);
    let mut wetness = Map::new();
    let mut temperature = Map::new();
    for i in 0..days {
        let key = site::dates::format_compact(start + Days::days(i));
        let value = if i == days - 1 {
            -999.0
        } else {
            0.5 + 0.1 * ((i % 7) as f64 / 7.0)
        };
        wetness.insert(key.clone(), json!(value));
        temperature.insert(key, json!(-5.0 + 0.2 * i as f64));
    }
    PowerTable::from_json(&json!({
        "header": {"fill_value": -999.0},
        "properties": {"parameter": {"GWETPROF": Value::Object(wetness), "T2M": Value::Object(temperature)}}
    }))
    .unwrap()
}

pub fn toronto() -> Place {
    Place {
        at: Coordinate::new(43.6534817, -79.3839347).unwrap(),
        label: "Toronto, Golden Horseshoe, Ontario, Canada".to_string(),
    }
}
