//! Map-backed location picker
//!
//! Keeps the `lat`/`lon` inputs and the map marker in step: whatever moves the
//! marker also rewrites the fields, and vice versa.

use soilcast_core::{Coordinate, DEFAULT_COORDINATE};

/// Zoom level the map opens at and recenters to
pub const DEFAULT_ZOOM: u8 = 8;

/// Form inputs the controller reads and writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Lat,
    Lon,
    Label,
    Query,
}

impl Field {
    /// DOM id of the input
    pub fn element_id(&self) -> &'static str {
        match self {
            Field::Lat => "lat",
            Field::Lon => "lon",
            Field::Label => "label",
            Field::Query => "q",
        }
    }
}

pub trait FormFields {
    fn value(&self, field: Field) -> String;
    fn set_value(&mut self, field: Field, value: &str);
    /// Replace the text of the geocode status line
    fn set_message(&mut self, message: &str);
}

pub trait MapView {
    fn set_view(&mut self, center: Coordinate, zoom: u8);
    fn add_marker(&mut self, at: Coordinate);
    fn move_marker(&mut self, at: Coordinate);
}

pub struct LocationPicker {
    map: Option<Box<dyn MapView>>,
    marker: Option<Coordinate>,
    zoom: u8,
}

impl LocationPicker {
    /// Read the starting coordinate from the form (falling back to
    /// [`DEFAULT_COORDINATE`]), center the map there and drop the marker.
    ///
    /// Without a map the picker still keeps the fields formatted but has
    /// nothing to draw on.
    pub fn init(form: &dyn FormFields, map: Option<Box<dyn MapView>>) -> Self {
        let start = initial_coordinate(form);
        let mut picker = Self {
            map,
            marker: None,
            zoom: DEFAULT_ZOOM,
        };
        if let Some(map) = picker.map.as_mut() {
            map.set_view(start, picker.zoom);
        }
        picker.put_marker(start);
        picker
    }

    pub fn has_map(&self) -> bool {
        self.map.is_some()
    }

    /// Where the marker currently sits, if the map has one
    pub fn marker(&self) -> Option<Coordinate> {
        self.marker
    }

    /// Map click: rewrite the fields and move the marker, nothing else.
    pub fn on_map_click(&mut self, form: &mut dyn FormFields, at: Coordinate) {
        write_coordinate(form, at);
        self.put_marker(at);
    }

    /// Apply a coordinate that came from elsewhere (a geocode result) and pan to it
    pub fn recenter(&mut self, form: &mut dyn FormFields, at: Coordinate) {
        write_coordinate(form, at);
        if let Some(map) = self.map.as_mut() {
            map.set_view(at, self.zoom);
        }
        self.put_marker(at);
    }

    fn put_marker(&mut self, at: Coordinate) {
        let Some(map) = self.map.as_mut() else {
            return;
        };
        match self.marker {
            Some(_) => map.move_marker(at),
            None => map.add_marker(at),
        }
        self.marker = Some(at);
    }
}

fn initial_coordinate(form: &dyn FormFields) -> Coordinate {
    Coordinate::parse(&form.value(Field::Lat), &form.value(Field::Lon))
        .unwrap_or(DEFAULT_COORDINATE)
}

fn write_coordinate(form: &mut dyn FormFields, at: Coordinate) {
    let (lat, lon) = at.format_fixed();
    form.set_value(Field::Lat, &lat);
    form.set_value(Field::Lon, &lon);
}
