use async_trait::async_trait;
use log::debug;
use serde::Deserialize;
use soilcast_core::Coordinate;
use std::time::Duration;

use super::{Error, Geocoder, Place};
use crate::Fetcher;

pub const NOMINATIM_BASE_URL: &str = "https://nominatim.openstreetmap.org";
pub const GEOCODE_TIMEOUT: Duration = Duration::from_secs(10);

/// OpenStreetMap Nominatim search, English labels
pub struct NominatimGeocoder {
    base_url: String,
    fetcher: Fetcher,
}

/// One entry of a `format=jsonv2` search result. Nominatim sends the
/// coordinates as strings.
#[derive(Debug, Deserialize)]
struct SearchResult {
    lat: String,
    lon: String,
    display_name: String,
}

impl NominatimGeocoder {
    pub fn new(base_url: impl Into<String>, fetcher: Fetcher) -> Self {
        Self {
            base_url: base_url.into(),
            fetcher,
        }
    }

    fn search_url(&self) -> String {
        format!("{}/search", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn search(&self, query: &str) -> Result<Option<Place>, Error> {
        let results: Vec<SearchResult> = self
            .fetcher
            .get_json(
                &self.search_url(),
                &[
                    ("q", query.to_string()),
                    ("format", "jsonv2".to_string()),
                    ("limit", "1".to_string()),
                    ("addressdetails", "1".to_string()),
                    ("accept-language", "en".to_string()),
                ],
            )
            .await?;
        debug!("nominatim: {} result(s) for '{}'", results.len(), query);

        let Some(best) = results.into_iter().next() else {
            return Ok(None);
        };
        let at = Coordinate::parse(&best.lat, &best.lon)?;
        Ok(Some(Place {
            at,
            label: best.display_name,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_url_tolerates_trailing_slash() {
        let fetcher = Fetcher::new("soilcast-test", Duration::from_secs(1)).unwrap();
        let geocoder = NominatimGeocoder::new("http://localhost:8080/", fetcher);
        assert_eq!(geocoder.search_url(), "http://localhost:8080/search");
    }

    #[test]
    fn reads_string_coordinates() {
        let results: Vec<SearchResult> = serde_json::from_str(
            r#"[{"place_id": 1, "lat": "43.6534817", "lon": "-79.3839347",
                 "display_name": "Toronto, Golden Horseshoe, Ontario, Canada",
                 "address": {"city": "Toronto"}}]"#,
        )
        .unwrap();
        let at = Coordinate::parse(&results[0].lat, &results[0].lon).unwrap();
        assert!((at.lat - 43.6534817).abs() < 1e-9);
        assert_eq!(
            results[0].display_name,
            "Toronto, Golden Horseshoe, Ontario, Canada"
        );
    }
}
