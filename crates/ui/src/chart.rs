//! Forecast chart rendering
//!
//! The renderer owns the registry of live chart instances. At most one
//! instance exists per canvas id and per container; an instance is always
//! disposed before its replacement is created.

use std::collections::HashMap;

use log::{debug, warn};
use serde::Serialize;
use soilcast_core::ForecastPoint;

/// Everything needed to draw one chart, located explicitly by the caller
#[derive(Debug, Clone, PartialEq)]
pub struct ChartTarget {
    pub container_id: String,
    pub canvas_id: String,
    /// Text of the JSON payload element the canvas points at, `None` if that
    /// element does not exist
    pub payload: Option<String>,
}

/// Finds the chart inside a container after its content changed
pub trait ChartLocator {
    /// `None` when the container holds no canvas at all
    fn locate(&self, container_id: &str) -> Option<ChartTarget>;
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ChartError {
    #[error("Forecast data not found.")]
    DataNotFound,
    #[error("Invalid forecast data.")]
    InvalidData,
    #[error("No forecast points to plot.")]
    NoPoints,
    #[error("Chart library not loaded.")]
    LibraryNotLoaded,
    #[error("Chart could not be drawn: {0}")]
    Draw(String),
}

/// The charting library, as far as the renderer is concerned
pub trait ChartBackend {
    type Handle;

    fn is_available(&self) -> bool;
    fn create(&mut self, canvas_id: &str, config: &ChartConfig) -> Result<Self::Handle, String>;
    fn destroy(&mut self, handle: Self::Handle) -> Result<(), String>;
    /// Replace the container's placeholder with an inline error
    fn show_error(&mut self, container_id: &str, message: &str);
}

/// Line chart configuration in the shape Chart.js expects
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartConfig {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub data: ChartData,
    pub options: ChartOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: &'static str,
    pub data: Vec<Option<f64>>,
    pub span_gaps: bool,
    pub border_color: &'static str,
    pub border_width: f32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub border_dash: Vec<u8>,
    pub point_radius: u8,
    pub tension: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOptions {
    pub responsive: bool,
    pub maintain_aspect_ratio: bool,
    pub animation: bool,
    pub span_gaps: bool,
    pub interaction: Interaction,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Interaction {
    pub mode: &'static str,
    pub intersect: bool,
}

impl ChartConfig {
    /// Historical and forecast series over the same date axis. Missing values
    /// stay `null` and the line is carried across them.
    pub fn from_points(points: &[ForecastPoint]) -> Self {
        let labels = points.iter().map(|p| p.date.clone()).collect();
        let hist = points.iter().map(|p| p.hist).collect();
        let yhat = points.iter().map(|p| p.yhat).collect();

        ChartConfig {
            kind: "line",
            data: ChartData {
                labels,
                datasets: vec![
                    Dataset {
                        label: "Historical",
                        data: hist,
                        span_gaps: true,
                        border_color: "#3273dc",
                        border_width: 1.5,
                        border_dash: Vec::new(),
                        point_radius: 0,
                        tension: 0.1,
                    },
                    Dataset {
                        label: "Forecast (yhat)",
                        data: yhat,
                        span_gaps: true,
                        border_color: "#f14668",
                        border_width: 1.5,
                        border_dash: vec![6, 4],
                        point_radius: 0,
                        tension: 0.1,
                    },
                ],
            },
            options: ChartOptions {
                responsive: true,
                maintain_aspect_ratio: false,
                animation: false,
                span_gaps: true,
                interaction: Interaction {
                    mode: "index",
                    intersect: false,
                },
            },
        }
    }
}

struct Registered<H> {
    container_id: String,
    handle: H,
}

pub struct ChartRenderer<B: ChartBackend> {
    backend: B,
    instances: HashMap<String, Registered<B::Handle>>,
}

impl<B: ChartBackend> ChartRenderer<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            instances: HashMap::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn live_count(&self) -> usize {
        self.instances.len()
    }

    pub fn is_registered(&self, canvas_id: &str) -> bool {
        self.instances.contains_key(canvas_id)
    }

    /// Draw the target's chart, or show why it can't be drawn inside its container.
    pub fn render(&mut self, target: &ChartTarget) -> Result<(), ChartError> {
        let result = self.draw(target);
        if let Err(e) = &result {
            warn!("chart {} not drawn: {}", target.canvas_id, e);
            self.backend.show_error(&target.container_id, &e.to_string());
        }
        result
    }

    /// Dispose every instance that was drawn inside `container_id`.
    pub fn release_container(&mut self, container_id: &str) {
        let stale: Vec<String> = self
            .instances
            .iter()
            .filter(|(_, r)| r.container_id == container_id)
            .map(|(id, _)| id.clone())
            .collect();
        for canvas_id in stale {
            self.dispose(&canvas_id);
        }
    }

    fn draw(&mut self, target: &ChartTarget) -> Result<(), ChartError> {
        let raw = target.payload.as_deref().ok_or(ChartError::DataNotFound)?;
        let points: Vec<ForecastPoint> =
            serde_json::from_str(raw).map_err(|_| ChartError::InvalidData)?;
        if points.is_empty() {
            return Err(ChartError::NoPoints);
        }
        if !self.backend.is_available() {
            return Err(ChartError::LibraryNotLoaded);
        }

        let config = ChartConfig::from_points(&points);
        self.dispose(&target.canvas_id);
        self.release_container(&target.container_id);

        let handle = self
            .backend
            .create(&target.canvas_id, &config)
            .map_err(ChartError::Draw)?;
        debug!(
            "chart {} drawn with {} points",
            target.canvas_id,
            points.len()
        );
        self.instances.insert(
            target.canvas_id.clone(),
            Registered {
                container_id: target.container_id.clone(),
                handle,
            },
        );
        Ok(())
    }

    fn dispose(&mut self, canvas_id: &str) {
        if let Some(previous) = self.instances.remove(canvas_id) {
            if let Err(e) = self.backend.destroy(previous.handle) {
                warn!("ignoring failure to dispose chart {}: {}", canvas_id, e);
            }
        }
    }
}
