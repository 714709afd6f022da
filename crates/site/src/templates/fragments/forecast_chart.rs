use maud::{html, Markup, PreEscaped};
use soilcast_core::ForecastPoint;

use crate::power::Parameter;

/// Id of the JSON script element the canvas' `data-payload` attribute names
pub fn payload_element_id(chart_id: &str) -> String {
    format!("{}_data", chart_id)
}

/// Canvas plus its points as an inline JSON document. The page controller
/// draws the chart once this fragment is swapped in.
pub fn forecast_chart(chart_id: &str, parameter: Parameter, points: &[ForecastPoint]) -> Markup {
    let payload_id = payload_element_id(chart_id);
    let json = serde_json::to_string(points).unwrap_or_else(|_| "[]".to_string());
    let forecast_days = days_ahead(points);

    html! {
        p class="is-size-7 has-text-grey mb-2" {
            (parameter.label()) ": history and " (forecast_days) " days ahead with an 80% interval"
        }
        div class="chart-frame" {
            p class="chart-placeholder has-text-grey is-size-7" { "Rendering chart..." }
            canvas id=(chart_id) data-payload=(payload_id) {}
        }
        script type="application/json" id=(payload_id) {
            (PreEscaped(escape_script_json(&json)))
        }
    }
}

pub fn forecast_error(message: &str) -> Markup {
    html! {
        div class="notification is-warning is-light" { (message) }
    }
}

/// Points after the last observed day. Gaps inside the history are not
/// forecast days.
fn days_ahead(points: &[ForecastPoint]) -> usize {
    match points.iter().rposition(|p| p.hist.is_some()) {
        Some(last) => points.len() - last - 1,
        None => points.len(),
    }
}

/// JSON that can't close or open markup inside a `<script>` element
fn escape_script_json(json: &str) -> String {
    json.replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}
