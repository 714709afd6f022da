use serde::{Deserialize, Serialize};

/// Fallback location when the form holds no usable coordinate (Toronto)
pub const DEFAULT_COORDINATE: Coordinate = Coordinate {
    lat: 43.6532,
    lon: -79.3832,
};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CoordinateError {
    #[error("latitude {0} is outside [-90, 90]")]
    Latitude(f64),
    #[error("longitude {0} is outside [-180, 180]")]
    Longitude(f64),
    #[error("'{0}' is not a number")]
    NotANumber(String),
}

/// A WGS84 latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Result<Self, CoordinateError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(CoordinateError::Latitude(lat));
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(CoordinateError::Longitude(lon));
        }
        Ok(Self { lat, lon })
    }

    /// Parse the raw text of a latitude and a longitude field
    pub fn parse(lat: &str, lon: &str) -> Result<Self, CoordinateError> {
        let lat = parse_degrees(lat)?;
        let lon = parse_degrees(lon)?;
        Self::new(lat, lon)
    }

    /// A point clicked on a web map, whose longitude keeps counting past
    /// +/-180 once the world has wrapped around.
    pub fn from_map(lat: f64, lng: f64) -> Result<Self, CoordinateError> {
        let lon = if (-180.0..=180.0).contains(&lng) {
            lng
        } else {
            (lng + 180.0).rem_euclid(360.0) - 180.0
        };
        Self::new(lat, lon)
    }

    /// Latitude and longitude as form values, exactly 6 decimal digits each
    pub fn format_fixed(&self) -> (String, String) {
        (format!("{:.6}", self.lat), format!("{:.6}", self.lon))
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6}, {:.6}", self.lat, self.lon)
    }
}

fn parse_degrees(raw: &str) -> Result<f64, CoordinateError> {
    let trimmed = raw.trim();
    trimmed
        .parse::<f64>()
        .map_err(|_| CoordinateError::NotANumber(trimmed.to_string()))
}
