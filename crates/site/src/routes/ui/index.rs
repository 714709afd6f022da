use axum::response::Html;
use soilcast_core::DEFAULT_COORDINATE;
use time::{Date, OffsetDateTime};

use crate::{
    dates::default_date_range,
    forecast::DEFAULT_HORIZON_DAYS,
    power::Parameter,
    templates::{index_page, IndexData},
};

pub const DEFAULT_LABEL: &str = "Toronto, Ontario, Canada";
const DEFAULT_YEARS_BACK: u8 = 2;

/// Toronto, the last two years of ground wetness
pub fn index_data(today: Date) -> IndexData {
    let range = default_date_range(DEFAULT_YEARS_BACK, today);
    IndexData {
        query: String::new(),
        lat: DEFAULT_COORDINATE.lat,
        lon: DEFAULT_COORDINATE.lon,
        label: DEFAULT_LABEL.to_string(),
        start: range.start_compact(),
        end: range.end_compact(),
        parameter: Parameter::default(),
        horizon: DEFAULT_HORIZON_DAYS,
    }
}

pub async fn index_handler() -> Html<String> {
    let today = OffsetDateTime::now_utc().date();
    Html(index_page(&index_data(today)).into_string())
}
