//! Device page controls, one per exposed feature.

use dioxus::prelude::*;

use crate::features::{
    BinaryToggle, Control, EnumSelect, FeatureControl, NoAccess, NumericInput, TextInput, Viewer,
};
use crate::model::ChangeRequest;
use crate::simple_bind::display_plain;

fn request_json(request: &ChangeRequest) -> String {
    serde_json::to_string(request).unwrap_or_default()
}

#[component]
pub fn FeatureControlView(control: FeatureControl) -> Element {
    match control {
        FeatureControl::Binary(c) => control_row(c, |toggle| rsx! { BinaryToggleView { toggle } }),
        FeatureControl::Numeric(c) => control_row(c, |numeric| rsx! { NumericInputView { numeric } }),
        FeatureControl::Enum(c) => control_row(c, |choice| rsx! { EnumSelectView { choice } }),
        FeatureControl::Text(c) => control_row(c, |text| rsx! { TextInputView { text } }),
        FeatureControl::Group {
            kind,
            name,
            children,
        } => {
            let label = if name.is_empty() {
                kind.to_string()
            } else {
                format!("{} ({})", name, kind)
            };
            rsx! {
                fieldset {
                    legend { "{label}" }
                    for child in children.into_iter() {
                        FeatureControlView { control: child }
                    }
                }
            }
        }
        FeatureControl::Unsupported => rsx! {
            p { small { "Unsupported feature" } }
        },
    }
}

/// Shared handling of the view and no-access variants.
fn control_row<E>(control: Control<E>, edit: impl FnOnce(E) -> Element) -> Element {
    match control {
        Control::Edit(editor) => edit(editor),
        Control::View(viewer) => rsx! { ViewerView { viewer } },
        Control::NoAccess(marker) => rsx! { NoAccessView { marker } },
    }
}

#[component]
fn ViewerView(viewer: Viewer) -> Element {
    let value = viewer.value.as_ref().map(display_plain).unwrap_or_default();
    let unit = viewer.unit.clone().unwrap_or_default();

    rsx! {
        label {
            "{viewer.name}"
            input { r#type: "text", readonly: true, value: "{value}" }
            if !unit.is_empty() {
                small { "{unit}" }
            }
        }
    }
}

#[component]
fn NoAccessView(marker: NoAccess) -> Element {
    rsx! {
        label {
            "{marker.name}"
            small { class: "text-muted", title: "Neither writable nor reported", " (no access)" }
        }
    }
}

#[component]
fn BinaryToggleView(toggle: BinaryToggle) -> Element {
    let change = request_json(&toggle.toggle());

    rsx! {
        label {
            input {
                r#type: "checkbox",
                role: "switch",
                checked: toggle.is_on(),
                "data-change": "{change}",
            }
            "{toggle.property}"
        }
    }
}

#[component]
fn NumericInputView(numeric: NumericInput) -> Element {
    let value = numeric.value.map(|v| v.to_string()).unwrap_or_default();
    let min = numeric.min.map(|v| v.to_string()).unwrap_or_default();
    let max = numeric.max.map(|v| v.to_string()).unwrap_or_default();
    let endpoint = numeric.endpoint.as_ref().map(|e| e.to_string()).unwrap_or_default();
    let unit = numeric.unit.clone().unwrap_or_default();
    let presets: Vec<(String, String)> = numeric
        .presets
        .iter()
        .filter_map(|p| numeric.preset(&p.name).map(|req| (p.name.clone(), request_json(&req))))
        .collect();

    rsx! {
        label {
            "{numeric.property}"
            input {
                r#type: "number",
                value: "{value}",
                min: "{min}",
                max: "{max}",
                "data-property": "{numeric.property}",
                "data-endpoint": "{endpoint}",
            }
            if !unit.is_empty() {
                small { "{unit}" }
            }
        }
        if !presets.is_empty() {
            div { role: "group",
                for (name, change) in presets {
                    button { class: "secondary", "data-change": "{change}", "{name}" }
                }
            }
        }
    }
}

#[component]
fn EnumSelectView(choice: EnumSelect) -> Element {
    let current = choice.value.clone();
    let options: Vec<(String, String, bool)> = choice
        .options
        .iter()
        .filter_map(|option| {
            choice.select(option).map(|req| {
                (
                    display_plain(option),
                    request_json(&req),
                    current.as_ref() == Some(option),
                )
            })
        })
        .collect();

    rsx! {
        label {
            "{choice.property}"
            select {
                for (label, change, selected) in options {
                    option { selected: selected, "data-change": "{change}", "{label}" }
                }
            }
        }
    }
}

#[component]
fn TextInputView(text: TextInput) -> Element {
    let value = text.value.clone().unwrap_or_default();
    let endpoint = text.endpoint.as_ref().map(|e| e.to_string()).unwrap_or_default();

    rsx! {
        label {
            "{text.property}"
            input {
                r#type: "text",
                value: "{value}",
                "data-property": "{text.property}",
                "data-endpoint": "{endpoint}",
            }
        }
    }
}
