mod sqlite;

pub use sqlite::{Database, DatabaseWriter};

use time::OffsetDateTime;

/// Longest query text kept in the lookup history
pub const MAX_QUERY_CHARS: usize = 255;

/// A geocode lookup that resolved to a place
#[derive(Debug, Clone, PartialEq)]
pub struct LocationQuery {
    pub id: i64,
    pub created_at: OffsetDateTime,
    pub query_text: String,
    pub lat: f64,
    pub lon: f64,
    pub display_name: String,
}

impl std::fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} -> ({:.4}, {:.4})",
            self.query_text, self.lat, self.lon
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewLocationQuery {
    pub query_text: String,
    pub lat: f64,
    pub lon: f64,
    pub display_name: String,
}

impl NewLocationQuery {
    /// Query text longer than [`MAX_QUERY_CHARS`] is cut at a character boundary.
    pub fn new(query_text: &str, lat: f64, lon: f64, display_name: impl Into<String>) -> Self {
        Self {
            query_text: query_text.chars().take(MAX_QUERY_CHARS).collect(),
            lat,
            lon,
            display_name: display_name.into(),
        }
    }
}
