//! Render selection for dashboard device cards.
//!
//! Turns capability flags plus a state snapshot into a render-instruction
//! tree: a fixed-order list of blocks and a footer. The HTML layer walks this
//! tree; nothing here knows about markup beyond icon class names.

use serde::Serialize;

use super::capabilities::{classify, CapabilityFlags};
use super::format_number;
use crate::model::{ChangeRequest, Device, DeviceState, ExposedFeature, PowerSource};

// =============================================================================
// Icons
// =============================================================================

/// Thermometer fill level, bucketed by temperature in °C.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TemperatureIcon {
    Empty,
    Quarter,
    Half,
    ThreeQuarters,
    Full,
}

impl TemperatureIcon {
    /// Lower bounds are inclusive: 15 is Quarter, 30 is Full.
    pub fn for_temperature(temperature: f64) -> Self {
        if temperature >= 30.0 {
            Self::Full
        } else if temperature >= 25.0 {
            Self::ThreeQuarters
        } else if temperature >= 20.0 {
            Self::Half
        } else if temperature >= 15.0 {
            Self::Quarter
        } else {
            Self::Empty
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Empty => "fa-thermometer-empty",
            Self::Quarter => "fa-thermometer-quarter",
            Self::Half => "fa-thermometer-half",
            Self::ThreeQuarters => "fa-thermometer-three-quarters",
            Self::Full => "fa-thermometer-full",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "icon", rename_all = "snake_case")]
pub enum Icon {
    Thermometer { level: TemperatureIcon },
    Heating,
    Humidity,
    DoorClosed,
    DoorOpen,
    Bolt { active: bool },
    Walking { active: bool },
    Water { active: bool },
    Button,
}

impl Icon {
    /// Font Awesome classes for this icon, including its color state.
    pub fn css_class(&self) -> String {
        let specific = match self {
            Self::Thermometer { level } => format!("{} text-danger", level.css_class()),
            Self::Heating => "fa-fire-alt text-warning".to_string(),
            Self::Humidity => "text-info fa-tint".to_string(),
            Self::DoorClosed => "fa-door-closed text-muted".to_string(),
            Self::DoorOpen => "fa-door-open text-primary".to_string(),
            Self::Bolt { active: true } => "fa-bolt text-warning".to_string(),
            Self::Bolt { active: false } => "fa-bolt text-muted".to_string(),
            Self::Walking { active: true } => "fa-walking text-warning".to_string(),
            Self::Walking { active: false } => "fa-walking".to_string(),
            Self::Water { active: true } => "fa-water text-primary".to_string(),
            Self::Water { active: false } => "fa-water".to_string(),
            Self::Button => "fa-circle".to_string(),
        };
        format!("fa fa-fw {}", specific)
    }
}

// =============================================================================
// Render instructions
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Thermostat,
    Temperature,
    Humidity,
    Contact,
    Switch,
    Occupancy,
    Click,
    WaterLeak,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntityValue {
    Text { text: String },
    /// On/off control; `on_toggle` is the request to send when flipped.
    Toggle { checked: bool, on_toggle: ChangeRequest },
}

/// One icon + title + value row inside a card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entity {
    pub icon: Icon,
    pub title: String,
    pub value: EntityValue,
    /// Show a warning marker next to the title
    pub alert: bool,
}

impl Entity {
    fn text(icon: Icon, title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            icon,
            title: title.into(),
            value: EntityValue::Text { text: text.into() },
            alert: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    pub kind: BlockKind,
    pub entities: Vec<Entity>,
}

/// Always-present card footer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Footer {
    pub last_seen: Option<String>,
    pub battery: Option<f64>,
    pub voltage: Option<f64>,
    pub power_source: PowerSource,
    pub consumption: Option<f64>,
    pub linkquality: Option<f64>,
    /// Only forwarded for sockets; other devices show it in the main block.
    pub temperature: Option<f64>,
}

/// Render-instruction tree for one dashboard card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceCard {
    pub friendly_name: String,
    pub flags: CapabilityFlags,
    pub blocks: Vec<Block>,
    pub footer: Footer,
}

impl DeviceCard {
    /// Build the card for a device using its top-level exposed features.
    pub fn for_device(device: &Device, state: &DeviceState) -> Self {
        Self::build(device, device.exposes(), state)
    }

    /// Build the card from an explicit feature list.
    pub fn build(
        device: &Device,
        features: Option<&[ExposedFeature]>,
        state: &DeviceState,
    ) -> Self {
        let flags = classify(features);
        Self {
            friendly_name: device.friendly_name.clone(),
            flags,
            blocks: select_blocks(&flags, state),
            footer: footer(device, &flags, state),
        }
    }
}

// =============================================================================
// Selection
// =============================================================================

/// Pick the blocks for a set of flags. Order is fixed regardless of how the
/// flags were discovered.
pub fn select_blocks(flags: &CapabilityFlags, state: &DeviceState) -> Vec<Block> {
    let mut blocks = Vec::new();

    if flags.is_thermostat {
        blocks.push(thermostat_block(state));
    }
    if !flags.is_socket && flags.has_temperature {
        blocks.push(temperature_block(state));
    }
    if flags.has_humidity {
        blocks.push(humidity_block(state));
    }
    if flags.has_contact {
        blocks.push(contact_block(state));
    }
    if flags.is_socket {
        blocks.push(switch_block(state));
    }
    if flags.has_occupancy {
        blocks.push(occupancy_block(state));
    }
    if flags.has_click {
        blocks.push(click_block(state));
    }
    if flags.has_water_leak {
        blocks.push(water_leak_block(state));
    }

    blocks
}

fn single(kind: BlockKind, entity: Entity) -> Block {
    Block {
        kind,
        entities: vec![entity],
    }
}

pub fn contact_block(state: &DeviceState) -> Block {
    let closed = state.contact().unwrap_or(false);
    let (icon, text) = if closed {
        (Icon::DoorClosed, "Closed")
    } else {
        (Icon::DoorOpen, "Opened")
    };
    single(BlockKind::Contact, Entity::text(icon, "Contact", text))
}

pub fn click_block(state: &DeviceState) -> Block {
    // Shown verbatim, including values this dashboard has no enum entry for
    let click = state.text("click").unwrap_or_default();
    single(BlockKind::Click, Entity::text(Icon::Button, "Button", click))
}

pub fn occupancy_block(state: &DeviceState) -> Block {
    let detected = state.occupancy().unwrap_or(false);
    single(
        BlockKind::Occupancy,
        Entity::text(
            Icon::Walking { active: detected },
            "Occupancy",
            if detected { "Detected" } else { "Clear" },
        ),
    )
}

pub fn water_leak_block(state: &DeviceState) -> Block {
    let detected = state.water_leak().unwrap_or(false);
    let mut entity = Entity::text(
        Icon::Water { active: detected },
        "Water Leak",
        if detected { "Detected" } else { "Clear" },
    );
    entity.alert = detected;
    single(BlockKind::WaterLeak, entity)
}

pub fn humidity_block(state: &DeviceState) -> Block {
    let humidity = state.humidity().unwrap_or(0.0);
    single(
        BlockKind::Humidity,
        Entity::text(
            Icon::Humidity,
            "Humidity",
            format!("{} %", format_number(humidity)),
        ),
    )
}

pub fn temperature_block(state: &DeviceState) -> Block {
    let temperature = state.temperature().unwrap_or(0.0);
    single(
        BlockKind::Temperature,
        Entity::text(
            Icon::Thermometer {
                level: TemperatureIcon::for_temperature(temperature),
            },
            "Temperature",
            format!("{} °C", format_number(temperature)),
        ),
    )
}

/// Request sent when the socket switch is set to `checked`.
pub fn switch_change(checked: bool) -> ChangeRequest {
    let value = if checked { "ON" } else { "OFF" };
    ChangeRequest::single(None, "state", serde_json::Value::from(value))
}

/// Socket switch. When on, the title is the wattage; a socket that has not
/// reported `power` yet reads "0 W" rather than a blank title.
pub fn switch_block(state: &DeviceState) -> Block {
    let on = state.state() == Some("ON");
    let title = if on {
        format!("{} W", format_number(state.power().unwrap_or(0.0)))
    } else {
        "Off".to_string()
    };
    single(
        BlockKind::Switch,
        Entity {
            icon: Icon::Bolt { active: on },
            title,
            value: EntityValue::Toggle {
                checked: on,
                on_toggle: switch_change(!on),
            },
            alert: false,
        },
    )
}

pub fn thermostat_block(state: &DeviceState) -> Block {
    let local_temperature = state.local_temperature().unwrap_or(0.0);
    let setpoint = state.current_heating_setpoint().unwrap_or(0.0);
    let system_mode = state.text("system_mode").unwrap_or_default();
    let running_state = state.text("running_state").unwrap_or_default();

    Block {
        kind: BlockKind::Thermostat,
        entities: vec![
            Entity::text(
                Icon::Heating,
                format!("Set ({}/{})", system_mode, running_state),
                format!("{} °C", format_number(setpoint)),
            ),
            Entity::text(
                Icon::Thermometer {
                    level: TemperatureIcon::for_temperature(local_temperature),
                },
                "Room",
                format!("{} °C", format_number(local_temperature)),
            ),
        ],
    }
}

pub fn footer(device: &Device, flags: &CapabilityFlags, state: &DeviceState) -> Footer {
    Footer {
        last_seen: state.last_seen().map(|ls| ls.to_string()),
        battery: state.battery(),
        voltage: state.voltage(),
        power_source: device.power_source.clone(),
        consumption: state.consumption(),
        linkquality: state.linkquality(),
        temperature: if flags.is_socket {
            state.temperature()
        } else {
            None
        },
    }
}
