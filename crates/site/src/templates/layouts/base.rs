use maud::{html, Markup, DOCTYPE};

pub struct PageConfig<'a> {
    pub title: &'a str,
}

const BULMA_CSS: &str = "https://cdn.jsdelivr.net/npm/bulma@1.0.4/css/bulma.min.css";
const HTMX_JS: &str = "https://cdn.jsdelivr.net/npm/htmx.org@1.9.10/dist/htmx.min.js";
const LEAFLET_CSS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
const LEAFLET_JS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";
const CHART_JS: &str = "https://cdn.jsdelivr.net/npm/chart.js@4.4.1/dist/chart.umd.min.js";

pub fn base(config: &PageConfig, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (config.title) }
                link rel="stylesheet" href=(BULMA_CSS);
                link rel="stylesheet" href=(LEAFLET_CSS);
                link rel="stylesheet" href="/static/styles.min.css";
                script src=(HTMX_JS) {}
                script src=(LEAFLET_JS) {}
                script src=(CHART_JS) {}
            }
            body {
                section class="section" {
                    div class="container" {
                        nav class="level mb-4" {
                            div class="level-left" {
                                a href="/" class="has-text-current" style="text-decoration: none;" {
                                    h1 class="title level-item" { "Soil Moisture Explorer" }
                                }
                            }
                            div class="level-right" {
                                p class="level-item" {
                                    a href="/docs" class="button is-link is-light is-small" {
                                        "API Docs"
                                    }
                                }
                            }
                        }

                        div id="main-content" {
                            (content)
                        }

                        p class="has-text-grey is-size-7 mt-5" {
                            "Daily data from the "
                            a href="https://power.larc.nasa.gov/" target="_blank" { "NASA POWER" }
                            " project. Geocoding by "
                            a href="https://nominatim.openstreetmap.org/" target="_blank" { "OpenStreetMap Nominatim" }
                            "."
                        }
                    }
                }

                script type="module" src="/static/loader.js" {}
            }
        }
    }
}
