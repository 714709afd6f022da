use std::collections::BTreeMap;

use soilcast_core::ForecastPoint;
use time::Date;

use super::model::ForecastRow;
use crate::{dates::format_iso, power::PowerTable};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesPoint {
    pub date: Date,
    pub value: f64,
}

/// The parameter's observed days, skipping the missing ones.
pub fn build_series(table: &PowerTable, parameter: &str) -> Vec<SeriesPoint> {
    table
        .column_values(parameter)
        .filter_map(|(date, value)| value.map(|value| SeriesPoint { date, value }))
        .collect()
}

/// Chart payload: every date from either side, sorted, with `null` where a
/// side has nothing for that date.
pub fn merge_history_and_forecast(
    table: &PowerTable,
    parameter: &str,
    forecast: &[ForecastRow],
) -> Vec<ForecastPoint> {
    let mut merged: BTreeMap<Date, ForecastPoint> = table
        .column_values(parameter)
        .map(|(date, hist)| (date, ForecastPoint::new(format_iso(date), hist, None)))
        .collect();

    for row in forecast {
        let point = merged
            .entry(row.date)
            .or_insert_with(|| ForecastPoint::new(format_iso(row.date), None, None));
        point.yhat = Some(row.yhat);
        point.yhat_lower = Some(row.yhat_lower);
        point.yhat_upper = Some(row.yhat_upper);
    }

    merged.into_values().collect()
}
