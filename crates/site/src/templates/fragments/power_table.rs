use maud::{html, Markup};

use crate::{dates::format_iso, power::Parameter, power::PowerTable};

/// Daily readings, one column per parameter with the selected one highlighted
pub fn power_table(table: &PowerTable, selected: Parameter) -> Markup {
    let first = table.rows().first().map(|r| format_iso(r.date));
    let last = table.rows().last().map(|r| format_iso(r.date));

    html! {
        p class="is-size-7 has-text-grey mb-2" {
            (table.rows().len()) " days"
            @if let (Some(first), Some(last)) = (first, last) {
                ", " (first) " to " (last)
            }
        }
        div class="table-container power-table-scroll" {
            table class="table is-striped is-narrow is-hoverable is-fullwidth" {
                thead {
                    tr {
                        th { "Date" }
                        @for column in table.columns() {
                            th class=(column_class(column, selected)) { (column) }
                        }
                    }
                }
                tbody {
                    @for row in table.rows() {
                        tr {
                            td { (format_iso(row.date)) }
                            @for value in &row.values {
                                td class="value" {
                                    @match value {
                                        Some(v) => { (format!("{:.3}", v)) }
                                        None => { span class="has-text-grey-light" { "n/a" } }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn column_class(column: &str, selected: Parameter) -> &'static str {
    if column == selected.code() {
        "value has-text-link"
    } else {
        "value"
    }
}

pub fn power_table_error(message: &str) -> Markup {
    html! {
        div class="notification is-danger is-light" { (message) }
    }
}
