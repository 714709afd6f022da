//! soilcast site: server-rendered soil moisture explorer
//!
//! - A page with a location picker, backed by a geocoding endpoint
//! - HTMX fragments with NASA POWER daily readings and a forecast chart
//! - A SQLite history of geocoded lookups
//! - `collect-static` for production asset serving

pub mod collect_static;
pub mod dates;
pub mod db;
mod fetcher;
pub mod forecast;
pub mod geocode;
pub mod hosts;
pub mod power;
pub mod routes;
mod startup;
pub mod templates;
mod utils;

pub use collect_static::{collect_static, Manifest};
pub use db::{Database, LocationQuery, NewLocationQuery};
pub use fetcher::{FetchError, Fetcher};
pub use routes::{
    forecast_handler, index_handler, power_handler, recent_locations_handler, ParamError,
};
pub use startup::{app, build_app_state, AppState};
pub use utils::{
    get_config_info, get_log_level, resolve_port, setup_logger, Cli, Command, LaunchError, Mode,
};
