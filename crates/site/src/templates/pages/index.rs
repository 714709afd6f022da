use maud::{html, Markup};
use soilcast_core::FORECAST_CONTAINER_ID;

use crate::{
    power::Parameter,
    templates::layouts::{base, PageConfig},
};

/// Initial form values
pub struct IndexData {
    pub query: String,
    pub lat: f64,
    pub lon: f64,
    pub label: String,
    /// `YYYYMMDD`
    pub start: String,
    /// `YYYYMMDD`
    pub end: String,
    pub parameter: Parameter,
    pub horizon: u32,
}

pub fn index_page(data: &IndexData) -> Markup {
    let config = PageConfig {
        title: "Soil Moisture Explorer",
    };

    base(&config, index_content(data))
}

pub fn index_content(data: &IndexData) -> Markup {
    html! {
        div class="columns" {
            div class="column is-5" {
                (location_form(data))

                div class="box" {
                    h2 class="title is-6 mb-3" { "Recent lookups" }
                    div id="recent-locations"
                        hx-get="/fragments/recent-locations"
                        hx-trigger="load, click from:#btn-geocode delay:3s"
                        hx-swap="innerHTML" {
                        p class="has-text-grey is-size-7" { "Loading..." }
                    }
                }
            }

            div class="column" {
                div class="box" {
                    div id="map" {}
                    p class="help mt-2" { "Click the map to pick a location." }
                }
            }
        }

        div class="box" {
            div class="is-flex is-justify-content-space-between is-align-items-center mb-3" {
                h2 class="title is-5 mb-0" { "Daily readings" }
                span id="power-indicator" class="htmx-indicator tag is-info is-light" { "Loading..." }
            }
            div id="power-table" {
                p class="has-text-grey" { "Pick a location and press Load data." }
            }
        }

        div class="box" {
            div class="is-flex is-justify-content-space-between is-align-items-center mb-3" {
                h2 class="title is-5 mb-0" { "Forecast" }
                span id="forecast-indicator" class="htmx-indicator tag is-info is-light" { "Fitting..." }
            }
            div id=(FORECAST_CONTAINER_ID) {
                p class="has-text-grey" { "Press Forecast to fit a model to the selected parameter." }
            }
        }
    }
}

fn location_form(data: &IndexData) -> Markup {
    let lat = format!("{:.6}", data.lat);
    let lon = format!("{:.6}", data.lon);

    html! {
        form id="location-form" class="box" onsubmit="return false;" {
            div class="field" {
                label class="label" for="q" { "Search" }
                div class="field has-addons mb-1" {
                    div class="control is-expanded" {
                        input class="input" type="text" id="q" name="query"
                            placeholder="City, address or lat,lon" value=(data.query);
                    }
                    div class="control" {
                        button class="button is-link" type="button" id="btn-geocode" { "Find" }
                    }
                }
                p class="help" id="geocode-msg" {}
            }

            div class="columns is-mobile mb-0" {
                div class="column field" {
                    label class="label" for="lat" { "Latitude" }
                    input class="input" type="text" id="lat" name="lat" value=(lat);
                }
                div class="column field" {
                    label class="label" for="lon" { "Longitude" }
                    input class="input" type="text" id="lon" name="lon" value=(lon);
                }
            }

            div class="field" {
                label class="label" for="label" { "Location" }
                input class="input" type="text" id="label" name="label" value=(data.label) readonly;
            }

            div class="columns is-mobile mb-0" {
                div class="column field" {
                    label class="label" for="start" { "Start (YYYYMMDD)" }
                    input class="input" type="text" id="start" name="start"
                        inputmode="numeric" pattern="[0-9]{8}" value=(data.start);
                }
                div class="column field" {
                    label class="label" for="end" { "End (YYYYMMDD)" }
                    input class="input" type="text" id="end" name="end"
                        inputmode="numeric" pattern="[0-9]{8}" value=(data.end);
                }
            }

            div class="columns is-mobile mb-0" {
                div class="column field" {
                    label class="label" for="parameter" { "Parameter" }
                    div class="select is-fullwidth" {
                        select id="parameter" name="parameter" {
                            @for parameter in Parameter::ALL {
                                option value=(parameter.code()) selected[parameter == data.parameter] {
                                    (parameter.label())
                                }
                            }
                        }
                    }
                }
                div class="column is-4 field" {
                    label class="label" for="horizon" { "Horizon (days)" }
                    input class="input" type="number" id="horizon" name="horizon"
                        min="1" max="3650" value=(data.horizon);
                }
            }

            div class="buttons" {
                button class="button is-primary" type="button"
                    hx-get="/power/"
                    hx-include="#location-form"
                    hx-target="#power-table"
                    hx-swap="innerHTML"
                    hx-indicator="#power-indicator" {
                    "Load data"
                }
                button class="button is-info" type="button"
                    hx-get="/forecast/"
                    hx-include="#location-form"
                    hx-target=(format!("#{}", FORECAST_CONTAINER_ID))
                    hx-swap="innerHTML"
                    hx-indicator="#forecast-indicator" {
                    "Forecast"
                }
            }
        }
    }
}
