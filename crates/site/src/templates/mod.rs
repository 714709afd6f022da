pub mod fragments;
pub mod layouts;
pub mod pages;

pub use fragments::{
    forecast_chart, forecast_error, power_table, power_table_error, recent_locations,
};
pub use layouts::PageConfig;
pub use pages::{index_page, IndexData};
