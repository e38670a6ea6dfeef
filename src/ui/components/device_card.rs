//! Dashboard card: renders a `DeviceCard` render-instruction tree.

use dioxus::prelude::*;

use crate::dashboard::{format_number, Block, DeviceCard, Entity, EntityValue, Footer};

/// Link to a device page; friendly names may contain `/` and spaces.
pub fn device_href(friendly_name: &str) -> String {
    format!("/device/{}", urlencoding::encode(friendly_name))
}

#[component]
pub fn DeviceCardView(card: DeviceCard) -> Element {
    let href = device_href(&card.friendly_name);

    rsx! {
        article {
            "data-device": "{card.friendly_name}",
            header {
                a { href: "{href}", strong { "{card.friendly_name}" } }
            }
            for block in card.blocks.iter() {
                BlockView { block: block.clone() }
            }
            FooterView { footer: card.footer.clone() }
        }
    }
}

#[component]
fn BlockView(block: Block) -> Element {
    let kind = serde_json::to_value(block.kind)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default();

    rsx! {
        div {
            class: "block",
            "data-block": "{kind}",
            for entity in block.entities.iter() {
                EntityView { entity: entity.clone() }
            }
        }
    }
}

#[component]
fn EntityView(entity: Entity) -> Element {
    let icon = entity.icon.css_class();
    let value = match &entity.value {
        EntityValue::Text { text } => rsx! { span { class: "value", "{text}" } },
        EntityValue::Toggle { checked, on_toggle } => {
            let change = serde_json::to_string(on_toggle).unwrap_or_default();
            rsx! {
                input {
                    r#type: "checkbox",
                    role: "switch",
                    checked: *checked,
                    "data-change": "{change}",
                }
            }
        }
    };

    rsx! {
        div { class: "entity",
            i { class: "{icon}" }
            span { class: "title",
                "{entity.title}"
                if entity.alert {
                    " "
                    i { class: "fa fa-exclamation-triangle text-danger" }
                }
            }
            {value}
        }
    }
}

/// Footer items as (tooltip, icon, text), skipping absent readings.
fn footer_items(footer: &Footer) -> Vec<(&'static str, &'static str, String)> {
    let mut items = Vec::new();
    if let Some(last_seen) = &footer.last_seen {
        items.push(("Last seen", "fa fa-fw fa-clock", last_seen.clone()));
    }
    if let Some(battery) = footer.battery {
        items.push(("Battery", "fa fa-fw fa-battery-half", format!("{}%", format_number(battery))));
    }
    if let Some(voltage) = footer.voltage {
        items.push(("Voltage", "fa fa-fw fa-car-battery", format!("{} mV", format_number(voltage))));
    }
    items.push(("Power source", "fa fa-fw fa-plug", footer.power_source.to_string()));
    if let Some(consumption) = footer.consumption {
        items.push(("Consumption", "fa fa-fw fa-chart-line", format!("{} kWh", format_number(consumption))));
    }
    if let Some(temperature) = footer.temperature {
        items.push(("Device temperature", "fa fa-fw fa-thermometer-half", format!("{} °C", format_number(temperature))));
    }
    if let Some(linkquality) = footer.linkquality {
        items.push(("Link quality", "fa fa-fw fa-signal", format_number(linkquality)));
    }
    items
}

#[component]
fn FooterView(footer: Footer) -> Element {
    let items = footer_items(&footer);

    rsx! {
        footer {
            small {
                for (label, icon, text) in items {
                    span { title: label,
                        i { class: icon }
                        " {text} "
                    }
                }
            }
        }
    }
}
