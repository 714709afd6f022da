use crate::helpers::{body_text, power_table, spawn_app, MockGeocodeService, MockPowerApi};
use axum::http::StatusCode;
use site::{
    dates::Error as DateError,
    power::{self, Parameter, ParseError, PowerTable},
    NewLocationQuery,
};
use time::macros::date;

const READINGS: &str = "lat=43.6532&lon=-79.3832&start=20250101&end=20250301&parameter=GWETPROF";

fn parse_failure() -> power::Error {
    power::Error::Parse(ParseError::Date {
        parameter: "T2M".to_string(),
        source: DateError::Compact("2025-01-01".to_string()),
    })
}

/// The table asks POWER for the selection plus the companion parameters
#[tokio::test]
async fn power_fragment_renders_table() {
    let mut power = MockPowerApi::new();
    power
        .expect_fetch()
        .withf(|at, range, parameters| {
            (at.lat - 43.6532).abs() < 1e-9
                && range.start == date!(2025 - 01 - 01)
                && range.end == date!(2025 - 03 - 01)
                && parameters.to_vec() == Parameter::ALL.to_vec()
        })
        .times(1)
        .returning(|_, _, _| Ok(power_table(40)));

    let test_app = spawn_app(power, MockGeocodeService::new()).await;
    let response = test_app.get(&format!("/power/?{READINGS}")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("40 days, 2025-01-01 to 2025-02-09"));
    assert!(html.contains(">GWETPROF</th>"));
    assert!(html.contains(">T2M</th>"));
    assert!(html.contains("n/a"));
}

#[tokio::test]
async fn power_fragment_rejects_bad_queries() {
    let test_app = spawn_app(MockPowerApi::new(), MockGeocodeService::new()).await;

    let cases = [
        ("/power/?lon=-79.38&start=20250101&end=20250301&parameter=T2M", "Invalid parameters"),
        ("/power/?lat=abc&lon=-79.38", "Invalid parameters"),
        ("/power/?lat=43.6&lon=-79.38&end=20250301&parameter=T2M", "Missing parameters"),
        ("/power/?lat=43.6&lon=-79.38&start=20250101&end=20250301", "Missing parameters"),
        ("/power/?lat=43.6&lon=-79.38&start=20250101&end=20250301&parameter=SOILM", "Invalid parameters"),
        ("/power/?lat=43.6&lon=-79.38&start=20250401&end=20250301&parameter=T2M", "Invalid parameters"),
    ];
    for (uri, expected) in cases {
        let response = test_app.get(uri).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body_text(response).await, expected, "{uri}");
    }
}

#[tokio::test]
async fn power_failures_render_inline() {
    let mut power = MockPowerApi::new();
    power
        .expect_fetch()
        .times(1)
        .returning(|_, _, _| Err(parse_failure()));
    let test_app = spawn_app(power, MockGeocodeService::new()).await;

    let response = test_app.get(&format!("/power/?{READINGS}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("POWER fetch failed: parameter T2M"));
}

#[tokio::test]
async fn empty_power_response_says_so() {
    let mut power = MockPowerApi::new();
    power
        .expect_fetch()
        .times(1)
        .returning(|_, _, _| Ok(PowerTable::default()));
    let test_app = spawn_app(power, MockGeocodeService::new()).await;

    let response = test_app.get(&format!("/power/?{READINGS}")).await;
    assert!(body_text(response).await.contains("No data returned."));
}

/// The chart fragment links its canvas to the JSON payload by id
#[tokio::test]
async fn forecast_fragment_renders_chart_payload() {
    let mut power = MockPowerApi::new();
    power
        .expect_fetch()
        .times(1)
        .returning(|_, _, _| Ok(power_table(60)));
    let test_app = spawn_app(power, MockGeocodeService::new()).await;

    let response = test_app
        .get(&format!("/forecast/?{READINGS}&horizon=14"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;

    let start = html.find(r#"<canvas id="chart_"#).expect("canvas");
    let chart_id = &html[start + 12..start + 12 + 14];
    assert!(html.contains(&format!(r#"data-payload="{chart_id}_data""#)));
    assert!(html.contains(&format!(
        r#"<script type="application/json" id="{chart_id}_data">"#
    )));
    // 59 observed days (the last one is missing) plus 14 ahead
    assert!(html.contains("14 days ahead"));
    assert!(html.contains(r#"{"date":"2025-01-01","hist":0.5,"yhat":"#));
    assert!(html.contains(r#""date":"2025-03-14","hist":null"#));
}

#[tokio::test]
async fn short_history_is_not_enough() {
    let mut power = MockPowerApi::new();
    power
        .expect_fetch()
        .times(1)
        .returning(|_, _, _| Ok(power_table(10)));
    let test_app = spawn_app(power, MockGeocodeService::new()).await;

    let response = test_app.get(&format!("/forecast/?{READINGS}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response)
        .await
        .contains("Not enough data to fit a forecast."));
}

#[tokio::test]
async fn forecast_horizon_is_validated() {
    let mut power = MockPowerApi::new();
    power
        .expect_fetch()
        .times(1)
        .returning(|_, _, _| Ok(power_table(60)));
    let test_app = spawn_app(power, MockGeocodeService::new()).await;

    let response = test_app
        .get(&format!("/forecast/?{READINGS}&horizon=thirty"))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "Invalid parameters");

    let response = test_app
        .get(&format!("/forecast/?{READINGS}&horizon=5000"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Forecast failed: horizon of 5000 days"));
}

#[tokio::test]
async fn forecast_fetch_failure_renders_inline() {
    let mut power = MockPowerApi::new();
    power
        .expect_fetch()
        .times(1)
        .returning(|_, _, _| Err(parse_failure()));
    let test_app = spawn_app(power, MockGeocodeService::new()).await;

    let response = test_app.get(&format!("/forecast/?{READINGS}")).await;
    let html = body_text(response).await;
    assert!(html.contains("POWER fetch failed:"));
    assert!(!html.contains("<canvas"));
}

#[tokio::test]
async fn recent_locations_lists_history() {
    let test_app = spawn_app(MockPowerApi::new(), MockGeocodeService::new()).await;

    let html = body_text(test_app.get("/fragments/recent-locations").await).await;
    assert!(html.contains("No lookups yet."));

    test_app
        .db
        .record_location(NewLocationQuery::new("Lima", -12.0464, -77.0428, "Lima, Peru"))
        .await
        .unwrap();
    let html = body_text(test_app.get("/fragments/recent-locations").await).await;
    assert!(html.contains("Lima, Peru"));
    assert!(html.contains("-12.0464, -77.0428"));
}
