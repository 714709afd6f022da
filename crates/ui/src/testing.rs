//! In-memory stand-ins for the browser pieces, shared across the unit tests

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use async_trait::async_trait;
use soilcast_core::Coordinate;

use crate::{
    chart::{ChartBackend, ChartConfig, ChartLocator, ChartTarget},
    lookup::{GeocodeClient, GeocodeReply, TransportError},
    picker::{Field, FormFields, MapView},
};

#[derive(Clone, Default)]
pub struct FakeForm {
    inner: Rc<RefCell<FormState>>,
}

#[derive(Default)]
struct FormState {
    values: HashMap<Field, String>,
    message: String,
}

impl FakeForm {
    pub fn with_coordinate(lat: &str, lon: &str) -> Self {
        let form = Self::default();
        form.put(Field::Lat, lat);
        form.put(Field::Lon, lon);
        form
    }

    pub fn put(&self, field: Field, value: &str) {
        self.inner
            .borrow_mut()
            .values
            .insert(field, value.to_string());
    }

    pub fn get(&self, field: Field) -> String {
        self.inner
            .borrow()
            .values
            .get(&field)
            .cloned()
            .unwrap_or_default()
    }

    pub fn message(&self) -> String {
        self.inner.borrow().message.clone()
    }
}

impl FormFields for FakeForm {
    fn value(&self, field: Field) -> String {
        self.get(field)
    }

    fn set_value(&mut self, field: Field, value: &str) {
        self.put(field, value);
    }

    fn set_message(&mut self, message: &str) {
        self.inner.borrow_mut().message = message.to_string();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MapCall {
    SetView(Coordinate, u8),
    AddMarker(Coordinate),
    MoveMarker(Coordinate),
}

#[derive(Clone, Default)]
pub struct FakeMap {
    calls: Rc<RefCell<Vec<MapCall>>>,
}

impl FakeMap {
    pub fn calls(&self) -> Vec<MapCall> {
        self.calls.borrow().clone()
    }
}

impl MapView for FakeMap {
    fn set_view(&mut self, center: Coordinate, zoom: u8) {
        self.calls.borrow_mut().push(MapCall::SetView(center, zoom));
    }

    fn add_marker(&mut self, at: Coordinate) {
        self.calls.borrow_mut().push(MapCall::AddMarker(at));
    }

    fn move_marker(&mut self, at: Coordinate) {
        self.calls.borrow_mut().push(MapCall::MoveMarker(at));
    }
}

#[derive(Clone)]
pub struct FakeCharts {
    inner: Rc<RefCell<ChartsState>>,
}

struct ChartsState {
    available: bool,
    fail_destroy: bool,
    next_handle: u32,
    live: Vec<u32>,
    created: usize,
    destroyed: usize,
    errors: Vec<(String, String)>,
    last_config: Option<ChartConfig>,
}

impl Default for FakeCharts {
    fn default() -> Self {
        Self {
            inner: Rc::new(RefCell::new(ChartsState {
                available: true,
                fail_destroy: false,
                next_handle: 0,
                live: Vec::new(),
                created: 0,
                destroyed: 0,
                errors: Vec::new(),
                last_config: None,
            })),
        }
    }
}

impl FakeCharts {
    pub fn unavailable() -> Self {
        let charts = Self::default();
        charts.inner.borrow_mut().available = false;
        charts
    }

    pub fn fail_destroy(&self, fail: bool) {
        self.inner.borrow_mut().fail_destroy = fail;
    }

    pub fn errors(&self) -> Vec<(String, String)> {
        self.inner.borrow().errors.clone()
    }

    pub fn created(&self) -> usize {
        self.inner.borrow().created
    }

    pub fn destroyed(&self) -> usize {
        self.inner.borrow().destroyed
    }

    pub fn live(&self) -> usize {
        self.inner.borrow().live.len()
    }

    pub fn last_config(&self) -> Option<ChartConfig> {
        self.inner.borrow().last_config.clone()
    }
}

impl ChartBackend for FakeCharts {
    type Handle = u32;

    fn is_available(&self) -> bool {
        self.inner.borrow().available
    }

    fn create(&mut self, _canvas_id: &str, config: &ChartConfig) -> Result<u32, String> {
        let mut state = self.inner.borrow_mut();
        state.next_handle += 1;
        let handle = state.next_handle;
        state.live.push(handle);
        state.created += 1;
        state.last_config = Some(config.clone());
        Ok(handle)
    }

    fn destroy(&mut self, handle: u32) -> Result<(), String> {
        let mut state = self.inner.borrow_mut();
        // the instance is gone either way, the library just complained about it
        state.live.retain(|h| *h != handle);
        state.destroyed += 1;
        if state.fail_destroy {
            return Err("canvas already detached".into());
        }
        Ok(())
    }

    fn show_error(&mut self, container_id: &str, message: &str) {
        self.inner
            .borrow_mut()
            .errors
            .push((container_id.to_string(), message.to_string()));
    }
}

#[derive(Clone, Default)]
pub struct FakeLocator {
    targets: Rc<RefCell<HashMap<String, ChartTarget>>>,
}

impl FakeLocator {
    /// Pretend `container_id` now holds `canvas_id`, pointing at `payload`.
    pub fn set(&self, container_id: &str, canvas_id: &str, payload: Option<&str>) {
        self.targets.borrow_mut().insert(
            container_id.to_string(),
            ChartTarget {
                container_id: container_id.to_string(),
                canvas_id: canvas_id.to_string(),
                payload: payload.map(str::to_string),
            },
        );
    }
}

impl ChartLocator for FakeLocator {
    fn locate(&self, container_id: &str) -> Option<ChartTarget> {
        self.targets.borrow().get(container_id).cloned()
    }
}

/// Answers every query with the same reply and records what it was asked
pub struct ScriptedGeocoder {
    reply: Result<GeocodeReply, TransportError>,
    queries: RefCell<Vec<String>>,
}

impl ScriptedGeocoder {
    pub fn replying(status: u16, body: &str) -> Self {
        Self {
            reply: Ok(GeocodeReply {
                status,
                body: body.to_string(),
            }),
            queries: RefCell::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(TransportError(message.to_string())),
            queries: RefCell::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.borrow().clone()
    }
}

#[async_trait(?Send)]
impl GeocodeClient for ScriptedGeocoder {
    async fn fetch(&self, query: &str) -> Result<GeocodeReply, TransportError> {
        self.queries.borrow_mut().push(query.to_string());
        self.reply.clone()
    }
}
