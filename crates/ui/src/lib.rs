//! soilcast page controller
//!
//! Everything that happens in the browser after the server renders the page:
//! - [`picker`]: map click to `lat`/`lon` fields and back
//! - [`lookup`]: free-text geocoding with stale replies dropped
//! - [`chart`]: forecast chart drawing and the registry of live instances
//! - [`swap`]: redraw when htmx replaces the forecast container
//! - [`events`]: the named events the page publishes
//!
//! The logic is written against small traits so it runs and is tested
//! natively; the `web` module binds those traits to the DOM on wasm32.

pub mod chart;
pub mod events;
pub mod lookup;
pub mod page;
pub mod picker;
pub mod swap;

#[cfg(test)]
mod testing;
#[cfg(target_arch = "wasm32")]
mod web;

pub use chart::{ChartBackend, ChartConfig, ChartError, ChartLocator, ChartRenderer, ChartTarget};
pub use events::{Effect, EventBus, EventKind, PageEvent};
pub use lookup::{GeocodeClient, GeocodeLookup, GeocodeReply, LookupOutcome, PendingLookup, TransportError};
pub use page::{default_bus, perform, Page};
pub use picker::{Field, FormFields, LocationPicker, MapView, DEFAULT_ZOOM};
pub use swap::{SwapController, SwapState};
