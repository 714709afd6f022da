use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::Html,
};
use log::{error, info, warn};
use rand::{distributions::Alphanumeric, Rng};

use crate::{
    forecast::{build_series, make_forecast, merge_history_and_forecast, Seasonality},
    power::{request_parameters, PowerTable},
    templates::{forecast_chart, forecast_error, power_table, power_table_error, recent_locations},
    AppState,
};

use super::params::{ParamError, Readings, ReadingsQuery};

/// Entries shown in the recent lookups list
pub const RECENT_LIMIT: u32 = 10;

const NOT_ENOUGH_DATA: &str = "Not enough data to fit a forecast.";
const NO_DATA: &str = "No data returned.";

async fn fetch_table(state: &AppState, readings: &Readings) -> Result<PowerTable, String> {
    state
        .power
        .fetch(
            readings.at,
            &readings.range,
            &request_parameters(readings.parameter),
        )
        .await
        .map_err(|e| {
            error!("error fetching POWER data for {}: {}", readings.at, e);
            format!("POWER fetch failed: {}", e)
        })
}

/// Handler for the readings table fragment (GET /power/)
pub async fn power_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReadingsQuery>,
) -> Result<Html<String>, ParamError> {
    let readings = query.readings()?;

    let table = match fetch_table(&state, &readings).await {
        Ok(table) => table,
        Err(message) => return Ok(Html(power_table_error(&message).into_string())),
    };
    if table.is_empty() {
        return Ok(Html(power_table_error(NO_DATA).into_string()));
    }

    Ok(Html(power_table(&table, readings.parameter).into_string()))
}

/// Handler for the forecast chart fragment (GET /forecast/)
pub async fn forecast_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReadingsQuery>,
) -> Result<Html<String>, ParamError> {
    let horizon = query.horizon()?;
    let readings = query.readings()?;
    let code = readings.parameter.code();

    let table = match fetch_table(&state, &readings).await {
        Ok(table) => table,
        Err(message) => return Ok(Html(forecast_error(&message).into_string())),
    };

    let series = build_series(&table, code);
    let fitted = tokio::task::spawn_blocking(move || {
        make_forecast(&series, horizon, Seasonality::default())
    })
    .await;
    let rows = match fitted {
        Ok(Ok(rows)) => rows,
        Ok(Err(e)) => {
            warn!("forecast for {} at {} failed: {}", code, readings.at, e);
            return Ok(Html(forecast_error(&format!("Forecast failed: {}", e)).into_string()));
        }
        Err(e) => {
            error!("forecast task failed: {}", e);
            return Ok(Html(forecast_error(&format!("Forecast failed: {}", e)).into_string()));
        }
    };
    if rows.is_empty() {
        return Ok(Html(forecast_error(NOT_ENOUGH_DATA).into_string()));
    }

    let points = merge_history_and_forecast(&table, code, &rows);
    let chart_id = new_chart_id();
    info!(
        "forecast {} for {}: {} points, {} days ahead",
        chart_id,
        readings.at,
        points.len(),
        horizon
    );
    Ok(Html(
        forecast_chart(&chart_id, readings.parameter, &points).into_string(),
    ))
}

/// Handler for the recent lookups fragment (GET /fragments/recent-locations)
pub async fn recent_locations_handler(State(state): State<Arc<AppState>>) -> Html<String> {
    let entries = state
        .db
        .recent_locations(RECENT_LIMIT)
        .await
        .unwrap_or_else(|e| {
            error!("error loading recent lookups: {}", e);
            Vec::new()
        });
    Html(recent_locations(&entries).into_string())
}

/// `chart_` and 8 random letters or digits
fn new_chart_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    format!("chart_{}", suffix)
}
