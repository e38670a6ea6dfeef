//! Capability classification of a device's exposed features.

use serde::Serialize;

use crate::model::{ExposedFeature, FeatureKind};

/// Which sensor/actuator classes a device has, derived from its features.
///
/// Recomputed on every render; nothing here is stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CapabilityFlags {
    pub is_thermostat: bool,
    pub is_socket: bool,
    pub has_temperature: bool,
    pub has_humidity: bool,
    pub has_contact: bool,
    pub has_switch: bool,
    pub has_occupancy: bool,
    pub has_water_leak: bool,
    pub has_click: bool,
}

impl CapabilityFlags {
    /// True when no flag is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Scan the top-level features of a device and collect capability flags.
///
/// Only the given sequence is inspected; children of composite features are
/// not. Flags accumulate across the whole list.
pub fn classify(features: Option<&[ExposedFeature]>) -> CapabilityFlags {
    let mut flags = CapabilityFlags::default();

    for feature in features.unwrap_or_default() {
        if feature.kind() == FeatureKind::Climate {
            flags.is_thermostat = true;
        } else if matches!(feature.property(), "power" | "energy") {
            flags.is_socket = true;
        }

        match feature.property() {
            // Also reachable through the climate type above
            "climate" => flags.is_thermostat = true,
            "temperature" => flags.has_temperature = true,
            "humidity" => flags.has_humidity = true,
            "contact" => flags.has_contact = true,
            "switch" => flags.has_switch = true,
            "occupancy" => flags.has_occupancy = true,
            "click" => flags.has_click = true,
            "water_leak" => flags.has_water_leak = true,
            _ => {}
        }
    }

    flags
}
