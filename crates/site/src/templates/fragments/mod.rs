mod forecast_chart;
mod power_table;
mod recent_locations;

pub use forecast_chart::{forecast_chart, forecast_error, payload_element_id};
pub use power_table::{power_table, power_table_error};
pub use recent_locations::recent_locations;
