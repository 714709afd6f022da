pub mod geocode;
pub mod ui;

pub use geocode::*;
pub use ui::*;
