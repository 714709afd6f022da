use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::{error, info, warn};
use serde::Deserialize;
use soilcast_core::GeocodePayload;
use std::sync::Arc;
use utoipa::IntoParams;

use crate::{
    db::NewLocationQuery,
    geocode::{resolve, Place},
    AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GeocodeQuery {
    /// Place name, address or `lat,lon`
    pub q: Option<String>,
}

#[utoipa::path(
    get,
    path = "/geocode/",
    params(GeocodeQuery),
    responses(
        (status = OK, description = "Best match for the query", body = GeocodePayload),
        (status = BAD_REQUEST, description = "Missing q", content_type = "text/plain", body = String),
        (status = NOT_FOUND, description = "Nothing matched or the lookup failed", body = GeocodePayload)
    ))]
pub async fn geocode(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GeocodeQuery>,
) -> Response {
    let q = query.q.as_deref().map(str::trim).unwrap_or_default();
    if q.is_empty() {
        return (StatusCode::BAD_REQUEST, "Missing q").into_response();
    }

    match resolve(state.geocoder.as_ref(), q).await {
        Ok(place) => {
            info!("geocoded '{}' to {}", q, place.at);
            record_lookup(&state, q, &place).await;
            Json(GeocodePayload::place(place.at.lat, place.at.lon, place.label)).into_response()
        }
        Err(e) => {
            warn!("geocoding '{}' failed: {}", q, e);
            (StatusCode::NOT_FOUND, Json(GeocodePayload::error(e.to_string()))).into_response()
        }
    }
}

/// History is best effort; a failed write never fails the lookup.
async fn record_lookup(state: &AppState, query: &str, place: &Place) {
    let entry = NewLocationQuery::new(query, place.at.lat, place.at.lon, place.label.clone());
    if let Err(e) = state.db.record_location(entry).await {
        error!("error recording lookup for '{}': {}", query, e);
    }
}
