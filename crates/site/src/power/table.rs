use std::collections::BTreeMap;

use serde_json::Value;
use time::Date;

use crate::dates::{parse_compact, Error as DateError};

/// Marker NASA POWER uses for a missing reading when the header doesn't say otherwise
pub const DEFAULT_FILL_VALUE: f64 = -999.0;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("parameter {parameter} has a bad date key: {source}")]
    Date {
        parameter: String,
        source: DateError,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PowerRow {
    pub date: Date,
    /// One entry per column, `None` where the reading is missing
    pub values: Vec<Option<f64>>,
}

/// Daily readings for several parameters, outer-joined on date
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PowerTable {
    columns: Vec<String>,
    rows: Vec<PowerRow>,
}

impl PowerTable {
    /// Read `properties.parameter.{PARAM}.{YYYYMMDD: value}` out of a POWER
    /// point response. A payload without that section yields an empty table.
    pub fn from_json(payload: &Value) -> Result<Self, ParseError> {
        let fill_value = payload
            .pointer("/header/fill_value")
            .and_then(Value::as_f64)
            .unwrap_or(DEFAULT_FILL_VALUE);
        let Some(parameters) = payload
            .pointer("/properties/parameter")
            .and_then(Value::as_object)
        else {
            return Ok(Self::default());
        };

        let series: Vec<(&String, &serde_json::Map<String, Value>)> = parameters
            .iter()
            .filter_map(|(name, series)| series.as_object().map(|s| (name, s)))
            .collect();
        let width = series.len();

        let mut by_date: BTreeMap<Date, Vec<Option<f64>>> = BTreeMap::new();
        for (column, (name, values)) in series.iter().enumerate() {
            for (key, raw) in values.iter() {
                let date = parse_compact(key).map_err(|source| ParseError::Date {
                    parameter: name.to_string(),
                    source,
                })?;
                let value = raw
                    .as_f64()
                    .filter(|v| v.is_finite() && *v != fill_value);
                by_date.entry(date).or_insert_with(|| vec![None; width])[column] = value;
            }
        }

        Ok(Self {
            columns: series.iter().map(|(name, _)| name.to_string()).collect(),
            rows: by_date
                .into_iter()
                .map(|(date, values)| PowerRow { date, values })
                .collect(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[PowerRow] {
        &self.rows
    }

    /// Every date with that parameter's reading, missing or not. Empty if the
    /// parameter isn't in the table.
    pub fn column_values<'a>(
        &'a self,
        parameter: &str,
    ) -> impl Iterator<Item = (Date, Option<f64>)> + 'a {
        let index = self.columns.iter().position(|c| c == parameter);
        self.rows.iter().filter_map(move |row| {
            let i = index?;
            Some((row.date, row.values[i]))
        })
    }
}
