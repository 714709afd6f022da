//! soilcast core library
//!
//! Shared between the site server and the page controller:
//! - Wire types (coordinates, geocode payloads, forecast points)
//! - Configuration file discovery and loading
//! - File system utilities

mod config;
pub mod forecast;
pub mod fs;
pub mod geo;
pub mod geocode;

pub use config::{find_config_file, load_config, ConfigError, ConfigSource};
pub use forecast::ForecastPoint;
pub use fs::{copy_file, ensure_dir_exists, list_files};
pub use geo::{Coordinate, CoordinateError, DEFAULT_COORDINATE};
pub use geocode::GeocodePayload;

/// Application name used in config search paths
pub const APP_NAME: &str = "soilcast";

/// Default development server port
pub const DEFAULT_SITE_PORT: u16 = 8000;

/// Id of the element the forecast fragment is swapped into
pub const FORECAST_CONTAINER_ID: &str = "forecast-chart";
