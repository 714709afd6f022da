use serde::{Deserialize, Serialize};

/// Body of `GET /geocode/?q=`
///
/// Either a resolved place or an error message. The server answers the error
/// form with a non-2xx status; the controller still checks for it on success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(untagged)]
pub enum GeocodePayload {
    Error { error: String },
    Place { lat: f64, lon: f64, label: String },
}

impl GeocodePayload {
    pub fn place(lat: f64, lon: f64, label: impl Into<String>) -> Self {
        GeocodePayload::Place {
            lat,
            lon,
            label: label.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        GeocodePayload::Error {
            error: message.into(),
        }
    }
}
