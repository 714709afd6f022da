//! Turning a free-text query into a coordinate and a display label

mod nominatim;

pub use nominatim::{NominatimGeocoder, GEOCODE_TIMEOUT, NOMINATIM_BASE_URL};

use async_trait::async_trait;
use log::debug;
use regex::Regex;
use soilcast_core::{Coordinate, CoordinateError};
use std::sync::LazyLock;

use crate::fetcher::FetchError;

static RAW_COORDINATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(-?\d+(?:\.\d+)?)\s*,\s*(-?\d+(?:\.\d+)?)\s*$")
        .expect("coordinate pattern is valid")
});

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Location not found")]
    NotFound,
    #[error("{0}")]
    Coordinate(#[from] CoordinateError),
    #[error("geocoding service failed: {0}")]
    Service(#[from] FetchError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub at: Coordinate,
    pub label: String,
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Best match for `query`, `None` when nothing matches.
    async fn search(&self, query: &str) -> Result<Option<Place>, Error>;
}

/// A query that is just `lat,lon` names its own place, labelled with both
/// values to 6 decimals.
pub fn parse_raw_coordinate(query: &str) -> Option<Result<Place, Error>> {
    let captures = RAW_COORDINATE.captures(query)?;
    let place = Coordinate::parse(&captures[1], &captures[2])
        .map(|at| Place {
            at,
            label: at.to_string(),
        })
        .map_err(Error::from);
    Some(place)
}

pub async fn resolve(geocoder: &dyn Geocoder, query: &str) -> Result<Place, Error> {
    if let Some(raw) = parse_raw_coordinate(query) {
        debug!("'{}' is a raw coordinate", query);
        return raw;
    }
    geocoder.search(query).await?.ok_or(Error::NotFound)
}
