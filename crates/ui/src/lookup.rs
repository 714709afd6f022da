//! Free-text geocode lookup
//!
//! A lookup is split in two halves around the network call so the page is never
//! borrowed across an await: [`GeocodeLookup::begin`] validates the query and
//! hands out a [`PendingLookup`], [`GeocodeLookup::complete`] applies the reply.
//! Every `begin` bumps a generation counter; a reply whose generation is no
//! longer the latest is dropped.

use async_trait::async_trait;
use log::{debug, warn};
use soilcast_core::{Coordinate, GeocodePayload};

use crate::picker::{Field, FormFields, LocationPicker};

/// Endpoint queried with `?q=`
pub const GEOCODE_PATH: &str = "/geocode/";

pub const EMPTY_QUERY_MESSAGE: &str = "Enter a place name or \"lat,lon\" to search.";
pub const SEARCHING_MESSAGE: &str = "Searching...";
pub const GENERIC_FAILURE_MESSAGE: &str = "Geocoding failed.";

/// Raw HTTP answer from the geocode endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeReply {
    pub status: u16,
    pub body: String,
}

impl GeocodeReply {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }
}

/// The request never produced a reply (network down, aborted, unreadable body)
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{0}")]
pub struct TransportError(pub String);

#[async_trait(?Send)]
pub trait GeocodeClient {
    async fn fetch(&self, query: &str) -> Result<GeocodeReply, TransportError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingLookup {
    pub generation: u64,
    pub query: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Applied { at: Coordinate, label: String },
    Failed(String),
    /// A newer lookup was started before this reply arrived
    Stale,
}

#[derive(Debug, Default)]
pub struct GeocodeLookup {
    latest: u64,
}

impl GeocodeLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generation of the most recent lookup, 0 before the first one
    pub fn latest(&self) -> u64 {
        self.latest
    }

    /// Validate the query field; `None` means nothing should be fetched.
    pub fn begin(&mut self, form: &mut dyn FormFields) -> Option<PendingLookup> {
        let raw = form.value(Field::Query);
        let query = raw.trim();
        if query.is_empty() {
            form.set_message(EMPTY_QUERY_MESSAGE);
            return None;
        }
        self.latest += 1;
        form.set_message(SEARCHING_MESSAGE);
        debug!("geocode lookup #{} for {:?}", self.latest, query);
        Some(PendingLookup {
            generation: self.latest,
            query: query.to_string(),
        })
    }

    pub fn complete(
        &mut self,
        pending: PendingLookup,
        reply: Result<GeocodeReply, TransportError>,
        form: &mut dyn FormFields,
        picker: &mut LocationPicker,
    ) -> LookupOutcome {
        if pending.generation != self.latest {
            debug!(
                "dropping geocode reply #{} (latest is #{})",
                pending.generation, self.latest
            );
            return LookupOutcome::Stale;
        }

        match reply.map_err(|e| e.to_string()).and_then(interpret) {
            Ok((at, label)) => {
                picker.recenter(form, at);
                form.set_value(Field::Label, &label);
                form.set_message(&format!("Location set: {}", label));
                LookupOutcome::Applied { at, label }
            }
            Err(message) => {
                warn!("geocode lookup for {:?} failed: {}", pending.query, message);
                form.set_message(&message);
                LookupOutcome::Failed(message)
            }
        }
    }
}

fn interpret(reply: GeocodeReply) -> Result<(Coordinate, String), String> {
    if !(200..300).contains(&reply.status) {
        let body = reply.body.trim();
        return Err(if body.is_empty() {
            GENERIC_FAILURE_MESSAGE.to_string()
        } else {
            body.to_string()
        });
    }

    match serde_json::from_str::<GeocodePayload>(&reply.body).map_err(|e| e.to_string())? {
        GeocodePayload::Error { error } => Err(error),
        GeocodePayload::Place { lat, lon, label } => Coordinate::new(lat, lon)
            .map(|at| (at, label))
            .map_err(|e| e.to_string()),
    }
}
