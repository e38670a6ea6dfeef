#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
//! Dashboard rendering from bridge JSON
//!
//! Feeds device descriptions and state snapshots the way the bridge
//! publishes them and checks the resulting cards, controls and HTML.

use dioxus::prelude::*;
use serde_json::{json, Value};

use zigbee_dashboard::dashboard::{BlockKind, DeviceCard, EntityValue, TemperatureIcon};
use zigbee_dashboard::features::{select_controls, Control, FeatureControl};
use zigbee_dashboard::model::{Device, DeviceState};
use zigbee_dashboard::ui::components::{DeviceCardView, FeatureControlView};

fn device(exposes: Value) -> Device {
    serde_json::from_value(json!({
        "ieee_address": "0x00158d0001a2b3c4",
        "friendly_name": "test device",
        "type": "EndDevice",
        "power_source": "Battery",
        "definition": {
            "model": "TEST",
            "vendor": "Acme",
            "description": "test",
            "exposes": exposes
        }
    }))
    .unwrap()
}

fn state(value: Value) -> DeviceState {
    DeviceState::from_payload(value.to_string().as_bytes()).unwrap()
}

fn block_kinds(card: &DeviceCard) -> Vec<BlockKind> {
    card.blocks.iter().map(|b| b.kind).collect()
}

fn first_text(card: &DeviceCard, kind: BlockKind) -> String {
    let block = card.blocks.iter().find(|b| b.kind == kind).unwrap();
    match &block.entities[0].value {
        EntityValue::Text { text } => text.clone(),
        other => panic!("expected text, got {:?}", other),
    }
}

#[test]
fn sensor_without_climate_or_power_is_neither_thermostat_nor_socket() {
    let dev = device(json!([
        {"type": "numeric", "name": "temperature", "property": "temperature", "access": 1},
        {"type": "numeric", "name": "humidity", "property": "humidity", "access": 1},
        {"type": "binary", "name": "occupancy", "property": "occupancy", "access": 1,
         "value_on": true, "value_off": false}
    ]));
    let card = DeviceCard::for_device(&dev, &state(json!({"temperature": 21.5})));

    assert!(!card.flags.is_thermostat);
    assert!(!card.flags.is_socket);
    assert_eq!(
        block_kinds(&card),
        vec![BlockKind::Temperature, BlockKind::Humidity, BlockKind::Occupancy]
    );
    assert_eq!(first_text(&card, BlockKind::Temperature), "21.5 °C");
    // Absent humidity defaults to 0
    assert_eq!(first_text(&card, BlockKind::Humidity), "0 %");
}

#[test]
fn climate_type_sets_thermostat_whatever_its_property() {
    let dev = device(json!([
        {"type": "climate", "property": "anything", "features": [
            {"type": "numeric", "name": "local_temperature", "property": "local_temperature", "access": 5}
        ]}
    ]));
    let card = DeviceCard::for_device(
        &dev,
        &state(json!({
            "local_temperature": 19.5,
            "current_heating_setpoint": 21,
            "system_mode": "heat",
            "running_state": "idle"
        })),
    );

    assert!(card.flags.is_thermostat);
    assert!(!card.flags.is_socket);
    assert_eq!(block_kinds(&card), vec![BlockKind::Thermostat]);
    let entities = &card.blocks[0].entities;
    assert_eq!(entities[0].title, "Set (heat/idle)");
    assert_eq!(
        entities[1].icon,
        zigbee_dashboard::dashboard::Icon::Thermometer {
            level: TemperatureIcon::Quarter
        }
    );
}

#[test]
fn power_property_makes_socket_and_moves_temperature_to_footer() {
    let dev = device(json!([
        {"type": "switch", "features": [
            {"type": "binary", "name": "state", "property": "state", "access": 7,
             "value_on": "ON", "value_off": "OFF"}
        ]},
        {"type": "numeric", "name": "power", "property": "power", "access": 5, "unit": "W"},
        {"type": "numeric", "name": "temperature", "property": "temperature", "access": 1}
    ]));
    let card = DeviceCard::for_device(
        &dev,
        &state(json!({"state": "ON", "power": 42, "temperature": 38})),
    );

    assert!(card.flags.is_socket);
    assert!(!card.flags.is_thermostat);
    assert!(card.flags.has_temperature);
    // Temperature block suppressed for sockets
    assert_eq!(block_kinds(&card), vec![BlockKind::Switch]);
    assert_eq!(card.blocks[0].entities[0].title, "42 W");
    assert_eq!(card.footer.temperature, Some(38.0));
}

#[test]
fn footer_has_no_temperature_for_non_sockets() {
    let dev = device(json!([
        {"type": "numeric", "name": "temperature", "property": "temperature", "access": 1}
    ]));
    let card = DeviceCard::for_device(
        &dev,
        &state(json!({"temperature": 22, "battery": 90, "linkquality": 120})),
    );

    assert_eq!(card.footer.temperature, None);
    assert_eq!(card.footer.battery, Some(90.0));
    assert_eq!(card.footer.linkquality, Some(120.0));
}

#[test]
fn switch_toggle_from_off_requests_on() {
    let dev = device(json!([
        {"type": "numeric", "name": "energy", "property": "energy", "access": 1}
    ]));
    let card = DeviceCard::for_device(&dev, &state(json!({"state": "OFF", "power": 0})));

    let entity = &card.blocks[0].entities[0];
    assert_eq!(entity.title, "Off");
    match &entity.value {
        EntityValue::Toggle { checked, on_toggle } => {
            assert!(!checked);
            assert_eq!(on_toggle.endpoint, None);
            assert_eq!(on_toggle.patch.get("state"), Some(&json!("ON")));
            assert_eq!(on_toggle.patch.len(), 1);
        }
        other => panic!("expected toggle, got {:?}", other),
    }
}

#[test]
fn contact_block_text() {
    let dev = device(json!([
        {"type": "binary", "name": "contact", "property": "contact", "access": 1,
         "value_on": false, "value_off": true}
    ]));

    let closed = DeviceCard::for_device(&dev, &state(json!({"contact": true})));
    assert_eq!(first_text(&closed, BlockKind::Contact), "Closed");

    let opened = DeviceCard::for_device(&dev, &state(json!({"contact": false})));
    assert_eq!(first_text(&opened, BlockKind::Contact), "Opened");
}

#[test]
fn missing_definition_renders_no_blocks() {
    let dev: Device = serde_json::from_value(json!({
        "ieee_address": "0x01",
        "friendly_name": "Coordinator",
        "type": "Coordinator",
        "definition": null
    }))
    .unwrap();
    let card = DeviceCard::for_device(&dev, &DeviceState::new());

    assert!(card.flags.is_empty());
    assert!(card.blocks.is_empty());
}

#[test]
fn binary_controls_follow_access_bits() {
    let exposes = json!([
        {"type": "binary", "name": "a", "property": "a", "access": 2, "value_on": "ON", "value_off": "OFF"},
        {"type": "binary", "name": "b", "property": "b", "access": 1, "value_on": "ON", "value_off": "OFF"},
        {"type": "binary", "name": "c", "property": "c", "access": 4, "value_on": "ON", "value_off": "OFF"}
    ]);
    let dev = device(exposes);
    let controls = select_controls(dev.exposes().unwrap(), &DeviceState::new());

    assert!(matches!(controls[0], FeatureControl::Binary(Control::Edit(_))));
    assert!(matches!(controls[1], FeatureControl::Binary(Control::View(_))));
    assert!(matches!(controls[2], FeatureControl::Binary(Control::NoAccess(_))));
}

#[test]
fn card_html_contains_block_text_and_icons() {
    let dev = device(json!([
        {"type": "binary", "name": "contact", "property": "contact", "access": 1,
         "value_on": false, "value_off": true},
        {"type": "binary", "name": "water_leak", "property": "water_leak", "access": 1,
         "value_on": true, "value_off": false}
    ]));
    let card = DeviceCard::for_device(
        &dev,
        &state(json!({"contact": true, "water_leak": true, "battery": 77})),
    );

    let html = dioxus::ssr::render_element(rsx! { DeviceCardView { card } });

    assert!(html.contains("test device"));
    assert!(html.contains("Closed"));
    assert!(html.contains("fa-door-closed"));
    assert!(html.contains("Detected"));
    assert!(html.contains("fa-exclamation-triangle"));
    assert!(html.contains("77%"));
    assert!(html.contains("Battery"));
}

#[test]
fn feature_control_html_marks_no_access() {
    let dev = device(json!([
        {"type": "numeric", "name": "secret", "property": "secret", "access": 4}
    ]));
    let controls = select_controls(dev.exposes().unwrap(), &DeviceState::new());
    let control = controls.into_iter().next().unwrap();

    let html = dioxus::ssr::render_element(rsx! { FeatureControlView { control } });

    assert!(html.contains("secret"));
    assert!(html.contains("no access"));
}
