//! Simple-bind parameter table.

use dioxus::prelude::*;

use crate::simple_bind::{display_plain, SimpleBindView};

#[component]
pub fn SimpleBindTable(view: SimpleBindView) -> Element {
    let rows = match view {
        SimpleBindView::Loading => {
            return rsx! {
                article { aria_busy: "true", "Loading..." }
            }
        }
        SimpleBindView::Table(rows) => rows,
    };
    let rows: Vec<(String, String, String)> = rows
        .into_iter()
        .map(|row| (row.parameter, display_plain(&row.value), row.rule))
        .collect();

    rsx! {
        table {
            thead {
                tr {
                    th { "Parameter" }
                    th { "Value" }
                    th { "Simple bind" }
                }
            }
            tbody {
                for (parameter, value, rule) in rows {
                    tr {
                        td { "{parameter}" }
                        td {
                            input {
                                r#type: "text",
                                value: "{value}",
                                "data-simple-bind": "state_value",
                                "data-parameter": "{parameter}",
                            }
                        }
                        td {
                            input {
                                r#type: "text",
                                value: "{rule}",
                                "data-simple-bind": "rule",
                                "data-parameter": "{parameter}",
                            }
                        }
                    }
                }
            }
        }
    }
}
