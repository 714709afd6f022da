//! Soil moisture forecasting over NASA POWER history

mod model;
mod series;

pub use model::{
    make_forecast, Error, ForecastRow, Seasonality, MAX_HORIZON_DAYS, MIN_HISTORY_POINTS,
};
pub use series::{build_series, merge_history_and_forecast, SeriesPoint};

/// Days forecast past the last observation unless the request says otherwise
pub const DEFAULT_HORIZON_DAYS: u32 = 30;
