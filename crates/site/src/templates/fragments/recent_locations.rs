use maud::{html, Markup};
use time::{macros::format_description, OffsetDateTime};

use crate::db::LocationQuery;

pub fn recent_locations(entries: &[LocationQuery]) -> Markup {
    html! {
        @if entries.is_empty() {
            p class="has-text-grey is-size-7" { "No lookups yet." }
        } @else {
            ul class="is-size-7" {
                @for entry in entries {
                    li class="mb-1" {
                        strong { (entry.display_name) }
                        br;
                        span class="has-text-grey" {
                            (format!("{:.4}, {:.4}", entry.lat, entry.lon))
                            " · searched \"" (entry.query_text) "\" "
                            (when(entry.created_at))
                        }
                    }
                }
            }
        }
    }
}

fn when(at: OffsetDateTime) -> String {
    at.format(format_description!("[year]-[month]-[day] [hour]:[minute] UTC"))
        .unwrap_or_default()
}
