use crate::{
    db::Database,
    forecast_handler,
    geocode::{Geocoder, NominatimGeocoder, GEOCODE_TIMEOUT},
    hosts::{check_host, AllowedHosts},
    index_handler,
    power::{PowerClient, PowerData, POWER_TIMEOUT},
    power_handler, recent_locations_handler, routes, Cli, Fetcher,
};
use anyhow::anyhow;
use axum::{
    body::Body,
    extract::Request,
    middleware::{self, Next},
    response::IntoResponse,
    routing::get,
    Router,
};
use hyper::{header::ACCEPT, Method};
use log::info;
use soilcast_core::{Coordinate, GeocodePayload};
use std::{sync::Arc, time::Duration};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

#[derive(Clone)]
pub struct AppState {
    pub remote_url: String,
    pub static_dir: String,
    pub power: Arc<dyn PowerData>,
    pub geocoder: Arc<dyn Geocoder>,
    pub db: Arc<Database>,
    pub allowed_hosts: AllowedHosts,
    pub request_timeout: Duration,
}

#[derive(OpenApi)]
#[openapi(
    paths(routes::geocode::geocode),
    components(schemas(GeocodePayload, Coordinate)),
    tags(
        (name = "soilcast", description = "geocoding for the soil moisture explorer; the page and its HTMX fragments are HTML")
    )
)]
struct ApiDoc;

/// Wire the upstream clients and open the lookup history.
pub async fn build_app_state(cli: &Cli, remote_url: String) -> Result<AppState, anyhow::Error> {
    let user_agent = cli.user_agent();

    let power_fetcher = Fetcher::new(&user_agent, POWER_TIMEOUT)
        .map_err(|e| anyhow!("error building POWER client: {}", e))?;
    let geocode_fetcher = Fetcher::new(&user_agent, GEOCODE_TIMEOUT)
        .map_err(|e| anyhow!("error building geocoding client: {}", e))?;

    let db = Database::new(&cli.data_dir())
        .await
        .map_err(|e| anyhow!("error setting up SQLite database: {}", e))?;
    db.health_check().await?;

    Ok(AppState {
        remote_url,
        static_dir: cli.served_static_dir(),
        power: Arc::new(PowerClient::new(cli.power_url(), power_fetcher)),
        geocoder: Arc::new(NominatimGeocoder::new(cli.nominatim_url(), geocode_fetcher)),
        db: Arc::new(db),
        allowed_hosts: cli.allowed_hosts(),
        request_timeout: cli.request_timeout(),
    })
}

pub fn app(app_state: AppState) -> Router {
    let api_docs = ApiDoc::openapi();
    let serve_static = ServeDir::new(&app_state.static_dir).precompressed_gzip();
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([ACCEPT])
        .allow_origin(Any);
    let request_timeout = app_state.request_timeout;
    let state = Arc::new(app_state);

    info!("serving {} as {}", state.static_dir, state.remote_url);

    Router::new()
        // Page
        .route("/", get(index_handler))
        // HTMX fragment routes
        .route("/power/", get(power_handler))
        .route("/forecast/", get(forecast_handler))
        .route("/fragments/recent-locations", get(recent_locations_handler))
        // API routes
        .route("/geocode/", get(routes::geocode))
        .with_state(state.clone())
        .layer(middleware::from_fn(log_request))
        .merge(Scalar::with_url("/docs", api_docs))
        .nest_service("/static", serve_static)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(middleware::from_fn_with_state(state, check_host))
        .layer(cors)
}

async fn log_request(request: Request<Body>, next: Next) -> impl IntoResponse {
    let now = time::OffsetDateTime::now_utc();
    let path = request
        .uri()
        .path_and_query()
        .map(|p| p.as_str())
        .unwrap_or_default();
    info!(target: "http_request","new request, {} {}", request.method().as_str(), path);

    let response = next.run(request).await;
    let response_time = time::OffsetDateTime::now_utc() - now;
    info!(target: "http_response", "response, code: {}, time: {}", response.status().as_str(), response_time);

    response
}
