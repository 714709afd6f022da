use std::cell::RefCell;

use soilcast_core::{Coordinate, FORECAST_CONTAINER_ID};

use crate::{
    chart::{ChartBackend, ChartLocator, ChartRenderer},
    events::{Effect, EventBus, EventKind, PageEvent},
    lookup::{GeocodeClient, GeocodeLookup, GeocodeReply, LookupOutcome, PendingLookup, TransportError},
    picker::{FormFields, LocationPicker, MapView},
    swap::{SwapController, SwapState},
};

/// All controller state for one page session
pub struct Page<B: ChartBackend> {
    form: Box<dyn FormFields>,
    picker: LocationPicker,
    lookup: GeocodeLookup,
    charts: ChartRenderer<B>,
    swap: SwapController,
    locator: Box<dyn ChartLocator>,
}

impl<B: ChartBackend> Page<B> {
    pub fn new(
        form: Box<dyn FormFields>,
        map: Option<Box<dyn MapView>>,
        backend: B,
        locator: Box<dyn ChartLocator>,
    ) -> Self {
        let picker = LocationPicker::init(form.as_ref(), map);
        Self {
            form,
            picker,
            lookup: GeocodeLookup::new(),
            charts: ChartRenderer::new(backend),
            swap: SwapController::new(FORECAST_CONTAINER_ID),
            locator,
        }
    }

    /// Eager render for a full page load that already contains a chart
    pub fn load(&mut self) -> SwapState {
        self.swap
            .on_page_load(self.locator.as_ref(), &mut self.charts)
    }

    pub fn on_map_click(&mut self, at: Coordinate) {
        self.picker.on_map_click(self.form.as_mut(), at);
    }

    pub fn request_geocode(&mut self) -> Option<PendingLookup> {
        self.lookup.begin(self.form.as_mut())
    }

    pub fn finish_geocode(
        &mut self,
        pending: PendingLookup,
        reply: Result<GeocodeReply, TransportError>,
    ) -> LookupOutcome {
        self.lookup
            .complete(pending, reply, self.form.as_mut(), &mut self.picker)
    }

    pub fn on_fragment_replaced(&mut self, target_id: &str) -> SwapState {
        self.swap
            .on_fragment_replaced(target_id, self.locator.as_ref(), &mut self.charts);
        self.swap.state()
    }

    pub fn swap_state(&self) -> SwapState {
        self.swap.state()
    }

    pub fn picker(&self) -> &LocationPicker {
        &self.picker
    }

    pub fn charts(&self) -> &ChartRenderer<B> {
        &self.charts
    }
}

/// The bus every page starts with: one handler per named event
pub fn default_bus<B: ChartBackend + 'static>() -> EventBus<Page<B>> {
    let mut bus = EventBus::new();
    bus.subscribe(EventKind::FragmentReplaced, |page: &mut Page<B>, event| {
        if let PageEvent::FragmentReplaced { target_id } = event {
            page.on_fragment_replaced(target_id);
        }
        None
    });
    bus.subscribe(EventKind::MapClicked, |page: &mut Page<B>, event| {
        if let PageEvent::MapClicked(at) = event {
            page.on_map_click(*at);
        }
        None
    });
    bus.subscribe(EventKind::GeocodeRequested, |page: &mut Page<B>, _| {
        page.request_geocode().map(Effect::Geocode)
    });
    bus
}

/// Carry out one effect. The page is only borrowed before and after the
/// await, never across it, so other events can interleave.
pub async fn perform<B: ChartBackend>(
    page: &RefCell<Page<B>>,
    client: &dyn GeocodeClient,
    effect: Effect,
) -> LookupOutcome {
    match effect {
        Effect::Geocode(pending) => {
            let reply = client.fetch(&pending.query).await;
            page.borrow_mut().finish_geocode(pending, reply)
        }
    }
}
