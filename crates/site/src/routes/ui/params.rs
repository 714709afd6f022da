use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use log::debug;
use serde::Deserialize;
use soilcast_core::Coordinate;

use crate::{dates::DateRange, forecast::DEFAULT_HORIZON_DAYS, power::Parameter};

/// Query string shared by `/power/` and `/forecast/`, kept as raw text so a
/// malformed value becomes a 400 instead of an extractor rejection.
#[derive(Debug, Default, Deserialize)]
pub struct ReadingsQuery {
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub parameter: Option<String>,
    pub horizon: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamError {
    Missing,
    Invalid,
}

impl IntoResponse for ParamError {
    fn into_response(self) -> Response {
        let body = match self {
            ParamError::Missing => "Missing parameters",
            ParamError::Invalid => "Invalid parameters",
        };
        (StatusCode::BAD_REQUEST, body).into_response()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Readings {
    pub at: Coordinate,
    pub range: DateRange,
    pub parameter: Parameter,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl ReadingsQuery {
    /// The coordinate is checked before anything else, so a bad or absent
    /// lat/lon is `Invalid` even when other fields are missing too.
    pub fn readings(&self) -> Result<Readings, ParamError> {
        let lat = self.lat.as_deref().unwrap_or_default();
        let lon = self.lon.as_deref().unwrap_or_default();
        let at = Coordinate::parse(lat, lon).map_err(|e| {
            debug!("rejecting coordinate ({}, {}): {}", lat, lon, e);
            ParamError::Invalid
        })?;

        let (Some(start), Some(end), Some(parameter)) = (
            present(&self.start),
            present(&self.end),
            present(&self.parameter),
        ) else {
            return Err(ParamError::Missing);
        };

        let range = DateRange::parse(start, end).map_err(|e| {
            debug!("rejecting date range: {}", e);
            ParamError::Invalid
        })?;
        let parameter = parameter.parse::<Parameter>().map_err(|e| {
            debug!("{}", e);
            ParamError::Invalid
        })?;

        Ok(Readings {
            at,
            range,
            parameter,
        })
    }

    pub fn horizon(&self) -> Result<u32, ParamError> {
        match present(&self.horizon) {
            None => Ok(DEFAULT_HORIZON_DAYS),
            Some(raw) => raw.parse().map_err(|_| ParamError::Invalid),
        }
    }
}
