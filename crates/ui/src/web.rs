//! Browser bindings: Leaflet map, Chart.js, DOM form fields, fetch and the
//! htmx swap event, all routed through the page's [`EventBus`].

use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;
use gloo_net::http::Request;
use log::{info, warn};
use soilcast_core::Coordinate;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{CustomEvent, Document, Element, HtmlInputElement};

use crate::{
    chart::{ChartBackend, ChartConfig, ChartLocator, ChartTarget},
    events::{EventBus, PageEvent},
    lookup::{GeocodeClient, GeocodeReply, TransportError, GEOCODE_PATH},
    page::{default_bus, perform, Page},
    picker::{Field, FormFields, MapView},
};

const MAP_ELEMENT_ID: &str = "map";
const MESSAGE_ELEMENT_ID: &str = "geocode-msg";
const GEOCODE_BUTTON_ID: &str = "btn-geocode";
const TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
const TILE_ATTRIBUTION: &str = "&copy; OpenStreetMap contributors";

#[wasm_bindgen]
extern "C" {
    #[derive(Clone)]
    type LeafletMap;

    #[wasm_bindgen(catch, js_namespace = L, js_name = map)]
    fn leaflet_map(element_id: &str) -> Result<LeafletMap, JsValue>;

    #[wasm_bindgen(method, js_name = setView)]
    fn set_view(this: &LeafletMap, center: &JsValue, zoom: u8);

    #[wasm_bindgen(method)]
    fn on(this: &LeafletMap, event: &str, handler: &Closure<dyn FnMut(JsValue)>);

    type TileLayer;

    #[wasm_bindgen(js_namespace = L, js_name = tileLayer)]
    fn tile_layer(url: &str, options: &JsValue) -> TileLayer;

    #[wasm_bindgen(method, js_name = addTo)]
    fn add_layer_to(this: &TileLayer, map: &LeafletMap);

    type Marker;

    #[wasm_bindgen(js_namespace = L, js_name = marker)]
    fn marker(at: &JsValue) -> Marker;

    #[wasm_bindgen(method, js_name = addTo)]
    fn add_marker_to(this: &Marker, map: &LeafletMap);

    #[wasm_bindgen(method, js_name = setLatLng)]
    fn set_lat_lng(this: &Marker, at: &JsValue);
}

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = Chart)]
    type ChartJs;

    #[wasm_bindgen(constructor, catch, js_class = "Chart")]
    fn new(canvas_id: &str, config: &JsValue) -> Result<ChartJs, JsValue>;

    #[wasm_bindgen(method, catch)]
    fn destroy(this: &ChartJs) -> Result<(), JsValue>;
}

fn lat_lng(at: Coordinate) -> JsValue {
    js_sys::Array::of2(&JsValue::from_f64(at.lat), &JsValue::from_f64(at.lon)).into()
}

fn js_error(value: &JsValue) -> String {
    value
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| value.as_string())
        .unwrap_or_else(|| format!("{:?}", value))
}

struct LeafletView {
    map: LeafletMap,
    marker: Option<Marker>,
}

impl LeafletView {
    /// `None` when there is no map element or Leaflet failed to load.
    fn mount(document: &Document) -> Option<Self> {
        document.get_element_by_id(MAP_ELEMENT_ID)?;
        let map = match leaflet_map(MAP_ELEMENT_ID) {
            Ok(map) => map,
            Err(e) => {
                warn!("map unavailable: {}", js_error(&e));
                return None;
            }
        };
        let options = js_sys::Object::new();
        let _ = js_sys::Reflect::set(
            &options,
            &"attribution".into(),
            &TILE_ATTRIBUTION.into(),
        );
        tile_layer(TILE_URL, &options).add_layer_to(&map);
        Some(Self { map, marker: None })
    }
}

impl MapView for LeafletView {
    fn set_view(&mut self, center: Coordinate, zoom: u8) {
        self.map.set_view(&lat_lng(center), zoom);
    }

    fn add_marker(&mut self, at: Coordinate) {
        let marker = marker(&lat_lng(at));
        marker.add_marker_to(&self.map);
        self.marker = Some(marker);
    }

    fn move_marker(&mut self, at: Coordinate) {
        match &self.marker {
            Some(marker) => marker.set_lat_lng(&lat_lng(at)),
            None => self.add_marker(at),
        }
    }
}

struct DomForm {
    document: Document,
}

impl DomForm {
    fn input(&self, field: Field) -> Option<HtmlInputElement> {
        self.document
            .get_element_by_id(field.element_id())?
            .dyn_into::<HtmlInputElement>()
            .ok()
    }
}

impl FormFields for DomForm {
    fn value(&self, field: Field) -> String {
        self.input(field).map(|i| i.value()).unwrap_or_default()
    }

    fn set_value(&mut self, field: Field, value: &str) {
        if let Some(input) = self.input(field) {
            input.set_value(value);
        }
    }

    fn set_message(&mut self, message: &str) {
        if let Some(el) = self.document.get_element_by_id(MESSAGE_ELEMENT_ID) {
            el.set_text_content(Some(message));
        }
    }
}

/// Finds the canvas in a container and follows its `data-payload` attribute
/// to the JSON script element.
struct DomLocator {
    document: Document,
}

impl ChartLocator for DomLocator {
    fn locate(&self, container_id: &str) -> Option<ChartTarget> {
        let container = self.document.get_element_by_id(container_id)?;
        let canvas = container.query_selector("canvas").ok().flatten()?;
        let payload = canvas
            .get_attribute("data-payload")
            .and_then(|id| self.document.get_element_by_id(&id))
            .and_then(|el| el.text_content());
        Some(ChartTarget {
            container_id: container_id.to_string(),
            canvas_id: canvas.id(),
            payload,
        })
    }
}

struct ChartJsBackend {
    document: Document,
}

impl ChartJsBackend {
    fn error_element(&self, message: &str) -> Option<Element> {
        let el = self.document.create_element("p").ok()?;
        el.set_class_name("help is-danger chart-error");
        el.set_text_content(Some(message));
        Some(el)
    }
}

impl ChartBackend for ChartJsBackend {
    type Handle = ChartJs;

    fn is_available(&self) -> bool {
        web_sys::window()
            .map(|w| js_sys::Reflect::has(&w, &"Chart".into()).unwrap_or(false))
            .unwrap_or(false)
    }

    fn create(&mut self, canvas_id: &str, config: &ChartConfig) -> Result<ChartJs, String> {
        let json = serde_json::to_string(config).map_err(|e| e.to_string())?;
        let config = js_sys::JSON::parse(&json).map_err(|e| js_error(&e))?;
        ChartJs::new(canvas_id, &config).map_err(|e| js_error(&e))
    }

    fn destroy(&mut self, handle: ChartJs) -> Result<(), String> {
        handle.destroy().map_err(|e| js_error(&e))
    }

    fn show_error(&mut self, container_id: &str, message: &str) {
        let Some(container) = self.document.get_element_by_id(container_id) else {
            return;
        };
        let Some(error) = self.error_element(message) else {
            return;
        };
        let placeholder = container.query_selector(".chart-placeholder").ok().flatten();
        let shown = match placeholder {
            Some(placeholder) => placeholder.replace_with_with_node_1(&error),
            None => container.append_child(&error).map(|_| ()),
        };
        if let Err(e) = shown {
            warn!("could not show chart error: {}", js_error(&e));
        }
    }
}

struct FetchGeocoder;

#[async_trait(?Send)]
impl GeocodeClient for FetchGeocoder {
    async fn fetch(&self, query: &str) -> Result<GeocodeReply, TransportError> {
        let response = Request::get(GEOCODE_PATH)
            .query([("q", query)])
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| TransportError(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError(e.to_string()))?;
        Ok(GeocodeReply { status, body })
    }
}

struct Runtime {
    page: RefCell<Page<ChartJsBackend>>,
    bus: RefCell<EventBus<Page<ChartJsBackend>>>,
    client: FetchGeocoder,
}

impl Runtime {
    fn dispatch(self: &Rc<Self>, event: PageEvent) {
        let effects = {
            let mut page = self.page.borrow_mut();
            self.bus.borrow_mut().publish(&mut page, &event)
        };
        for effect in effects {
            let runtime = Rc::clone(self);
            spawn_local(async move {
                perform(&runtime.page, &runtime.client, effect).await;
            });
        }
    }
}

fn map_click_coordinate(event: &JsValue) -> Option<Coordinate> {
    let latlng = js_sys::Reflect::get(event, &"latlng".into()).ok()?;
    let lat = js_sys::Reflect::get(&latlng, &"lat".into()).ok()?.as_f64()?;
    let lng = js_sys::Reflect::get(&latlng, &"lng".into()).ok()?.as_f64()?;
    Coordinate::from_map(lat, lng).ok()
}

/// `detail.target.id` of an `htmx:afterSwap` event
fn swapped_target_id(event: &web_sys::Event) -> Option<String> {
    let detail = event.dyn_ref::<CustomEvent>()?.detail();
    let target = js_sys::Reflect::get(&detail, &"target".into()).ok()?;
    target.dyn_into::<Element>().ok().map(|el| el.id())
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    wasm_logger::init(wasm_logger::Config::default());

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let view = LeafletView::mount(&document);
    let leaflet = view.as_ref().map(|v| v.map.clone());
    let page = Page::new(
        Box::new(DomForm {
            document: document.clone(),
        }),
        view.map(|v| Box::new(v) as Box<dyn MapView>),
        ChartJsBackend {
            document: document.clone(),
        },
        Box::new(DomLocator {
            document: document.clone(),
        }),
    );
    let runtime = Rc::new(Runtime {
        page: RefCell::new(page),
        bus: RefCell::new(default_bus()),
        client: FetchGeocoder,
    });

    if let Some(map) = leaflet {
        let rt = Rc::clone(&runtime);
        let on_click = Closure::<dyn FnMut(JsValue)>::new(move |event: JsValue| {
            if let Some(at) = map_click_coordinate(&event) {
                rt.dispatch(PageEvent::MapClicked(at));
            }
        });
        map.on("click", &on_click);
        on_click.forget();
    }

    if let Some(button) = document.get_element_by_id(GEOCODE_BUTTON_ID) {
        let rt = Rc::clone(&runtime);
        let on_press = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
            event.prevent_default();
            rt.dispatch(PageEvent::GeocodeRequested);
        });
        button.add_event_listener_with_callback("click", on_press.as_ref().unchecked_ref())?;
        on_press.forget();
    }

    let rt = Rc::clone(&runtime);
    let on_swap = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
        if let Some(target_id) = swapped_target_id(&event) {
            rt.dispatch(PageEvent::FragmentReplaced { target_id });
        }
    });
    document.add_event_listener_with_callback("htmx:afterSwap", on_swap.as_ref().unchecked_ref())?;
    on_swap.forget();

    let state = runtime.page.borrow_mut().load();
    info!("page controller ready, forecast chart {:?}", state);
    Ok(())
}
