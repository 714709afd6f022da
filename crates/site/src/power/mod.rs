//! NASA POWER daily point data

mod table;

pub use table::{ParseError, PowerRow, PowerTable, DEFAULT_FILL_VALUE};

use async_trait::async_trait;
use itertools::Itertools;
use log::info;
use serde::{Deserialize, Serialize};
use soilcast_core::Coordinate;
use std::{fmt, str::FromStr, time::Duration};

use crate::{dates::DateRange, fetcher::FetchError, Fetcher};

pub const POWER_BASE_URL: &str = "https://power.larc.nasa.gov/api/temporal/daily/point";
pub const POWER_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Fetch(#[from] FetchError),
    #[error("{0}")]
    Parse(#[from] ParseError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Parameter {
    #[default]
    #[serde(rename = "GWETPROF")]
    GroundWetness,
    #[serde(rename = "PRECTOTCORR")]
    Precipitation,
    #[serde(rename = "T2M")]
    Temperature,
    #[serde(rename = "WS10M")]
    Wind,
}

impl Parameter {
    pub const ALL: [Parameter; 4] = [
        Parameter::GroundWetness,
        Parameter::Precipitation,
        Parameter::Temperature,
        Parameter::Wind,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Parameter::GroundWetness => "GWETPROF",
            Parameter::Precipitation => "PRECTOTCORR",
            Parameter::Temperature => "T2M",
            Parameter::Wind => "WS10M",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Parameter::GroundWetness => "Ground Wetness (GWETPROF)",
            Parameter::Precipitation => "Precipitation (PRECTOTCORR)",
            Parameter::Temperature => "Temperature 2m (T2M)",
            Parameter::Wind => "Wind 10m (WS10M)",
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Parameter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Parameter::ALL
            .into_iter()
            .find(|p| p.code() == s.trim())
            .ok_or_else(|| format!("unknown POWER parameter: {}", s))
    }
}

/// Parameters always fetched next to the selected one, for the table
const COMPANIONS: [Parameter; 3] = [
    Parameter::Precipitation,
    Parameter::Temperature,
    Parameter::Wind,
];

/// The selected parameter first, then the companions it doesn't duplicate
pub fn request_parameters(selected: Parameter) -> Vec<Parameter> {
    std::iter::once(selected)
        .chain(COMPANIONS)
        .unique()
        .collect()
}

pub fn power_url(
    base_url: &str,
    at: Coordinate,
    range: &DateRange,
    parameters: &[Parameter],
) -> String {
    format!(
        "{}?parameters={}&community=ag&longitude={}&latitude={}&start={}&end={}&format=JSON",
        base_url,
        parameters.iter().map(Parameter::code).join(","),
        at.lon,
        at.lat,
        range.start_compact(),
        range.end_compact(),
    )
}

#[async_trait]
pub trait PowerData: Send + Sync {
    async fn fetch(
        &self,
        at: Coordinate,
        range: &DateRange,
        parameters: &[Parameter],
    ) -> Result<PowerTable, Error>;
}

pub struct PowerClient {
    base_url: String,
    fetcher: Fetcher,
}

impl PowerClient {
    pub fn new(base_url: impl Into<String>, fetcher: Fetcher) -> Self {
        Self {
            base_url: base_url.into(),
            fetcher,
        }
    }
}

#[async_trait]
impl PowerData for PowerClient {
    async fn fetch(
        &self,
        at: Coordinate,
        range: &DateRange,
        parameters: &[Parameter],
    ) -> Result<PowerTable, Error> {
        let url = power_url(&self.base_url, at, range, parameters);
        let payload: serde_json::Value = self.fetcher.get_json(&url, &[]).await?;
        let table = PowerTable::from_json(&payload)?;
        info!(
            "POWER returned {} days of {} for {}",
            table.rows().len(),
            table.columns().join(","),
            at
        );
        Ok(table)
    }
}
