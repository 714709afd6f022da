mod fragments;
mod index;
mod params;

pub use fragments::{forecast_handler, power_handler, recent_locations_handler, RECENT_LIMIT};
pub use index::{index_data, index_handler};
pub use params::{ParamError, Readings, ReadingsQuery};
