//! Device state snapshots.
//!
//! The bridge publishes a flat JSON object per device. The snapshot keeps the
//! raw map (unknown keys are valid) and offers typed accessors for the keys
//! the dashboard knows about. Accessors never fail: a missing or mistyped
//! value reads as `None`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use super::ModelError;

/// Flat `property -> value` view of a device's reported state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceState(Map<String, Value>);

impl DeviceState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an MQTT state payload. Anything but a JSON object is rejected.
    pub fn from_payload(payload: &[u8]) -> Result<Self, ModelError> {
        match serde_json::from_slice::<Value>(payload)? {
            Value::Object(map) => Ok(Self(map)),
            other => Err(ModelError::NotAnObject(value_type_name(&other))),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    /// Merge a partial update over this snapshot, key by key.
    pub fn merge(&mut self, update: DeviceState) {
        for (key, value) in update.0 {
            self.0.insert(key, value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(Value::as_f64)
    }

    pub fn boolean(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(Value::as_bool)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    // -------------------------------------------------------------------------
    // Well-known keys
    // -------------------------------------------------------------------------

    pub fn battery(&self) -> Option<f64> {
        self.number("battery")
    }

    pub fn battery_low(&self) -> Option<bool> {
        self.boolean("battery_low")
    }

    pub fn last_seen(&self) -> Option<LastSeen> {
        match self.0.get("last_seen")? {
            Value::String(s) => Some(LastSeen::Text(s.clone())),
            Value::Number(n) => n.as_i64().map(LastSeen::Epoch),
            _ => None,
        }
    }

    pub fn elapsed(&self) -> Option<f64> {
        self.number("elapsed")
    }

    pub fn linkquality(&self) -> Option<f64> {
        self.number("linkquality")
    }

    pub fn update(&self) -> Option<OtaState> {
        self.0
            .get("update")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Raw on/off state ("ON"/"OFF" for most devices)
    pub fn state(&self) -> Option<&str> {
        self.text("state")
    }

    pub fn brightness(&self) -> Option<f64> {
        self.number("brightness")
    }

    pub fn color_temp(&self) -> Option<f64> {
        self.number("color_temp")
    }

    pub fn color(&self) -> Option<AnyColor> {
        self.0
            .get("color")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn tilt(&self) -> Option<f64> {
        self.number("tilt")
    }

    pub fn position(&self) -> Option<f64> {
        self.number("position")
    }

    pub fn click(&self) -> Option<Click> {
        self.text("click").and_then(|s| s.parse().ok())
    }

    pub fn consumption(&self) -> Option<f64> {
        self.number("consumption")
    }

    pub fn power(&self) -> Option<f64> {
        self.number("power")
    }

    pub fn temperature(&self) -> Option<f64> {
        self.number("temperature")
    }

    pub fn away_mode(&self) -> Option<&str> {
        self.text("away_mode")
    }

    pub fn humidity(&self) -> Option<f64> {
        self.number("humidity")
    }

    pub fn voltage(&self) -> Option<f64> {
        self.number("voltage")
    }

    pub fn contact(&self) -> Option<bool> {
        self.boolean("contact")
    }

    pub fn occupancy(&self) -> Option<bool> {
        self.boolean("occupancy")
    }

    pub fn water_leak(&self) -> Option<bool> {
        self.boolean("water_leak")
    }

    pub fn local_temperature(&self) -> Option<f64> {
        self.number("local_temperature")
    }

    pub fn current_heating_setpoint(&self) -> Option<f64> {
        self.number("current_heating_setpoint")
    }

    pub fn system_mode(&self) -> Option<SystemMode> {
        self.text("system_mode").and_then(|s| s.parse().ok())
    }

    pub fn running_state(&self) -> Option<RunningState> {
        self.text("running_state").and_then(|s| s.parse().ok())
    }
}

impl From<Map<String, Value>> for DeviceState {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for DeviceState {
    type Error = ModelError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(ModelError::NotAnObject(value_type_name(&other))),
        }
    }
}

fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// =============================================================================
// Value types
// =============================================================================

/// `last_seen` is an ISO timestamp or epoch milliseconds depending on the
/// bridge's `advanced.last_seen` setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LastSeen {
    Text(String),
    Epoch(i64),
}

impl fmt::Display for LastSeen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Epoch(ms) => match chrono::DateTime::from_timestamp_millis(*ms) {
                Some(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S")),
                None => write!(f, "{}", ms),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OtaStatus {
    Available,
    Updating,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtaState {
    pub state: OtaStatus,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub remaining: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RgbColor {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HueSaturationColor {
    pub hue: f64,
    pub saturation: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct XyColor {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnyColor {
    Rgb(RgbColor),
    Xy(XyColor),
    HueSaturation(HueSaturationColor),
}

/// Last button action reported by a remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Click {
    Single,
    Double,
    Triple,
    Quadruple,
    Long,
    LongRelease,
    Many,
}

impl Click {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Double => "double",
            Self::Triple => "triple",
            Self::Quadruple => "quadruple",
            Self::Long => "long",
            Self::LongRelease => "long_release",
            Self::Many => "many",
        }
    }
}

impl FromStr for Click {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(Self::Single),
            "double" => Ok(Self::Double),
            "triple" => Ok(Self::Triple),
            "quadruple" => Ok(Self::Quadruple),
            "long" => Ok(Self::Long),
            "long_release" => Ok(Self::LongRelease),
            "many" => Ok(Self::Many),
            other => Err(ModelError::UnknownValue {
                key: "click",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Click {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Thermostat operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemMode {
    Off,
    Heat,
    Auto,
}

impl FromStr for SystemMode {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" => Ok(Self::Off),
            "heat" => Ok(Self::Heat),
            "auto" => Ok(Self::Auto),
            other => Err(ModelError::UnknownValue {
                key: "system_mode",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for SystemMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Off => write!(f, "off"),
            Self::Heat => write!(f, "heat"),
            Self::Auto => write!(f, "auto"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunningState {
    Idle,
    Heat,
}

impl FromStr for RunningState {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "idle" => Ok(Self::Idle),
            "heat" => Ok(Self::Heat),
            other => Err(ModelError::UnknownValue {
                key: "running_state",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for RunningState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Heat => write!(f, "heat"),
        }
    }
}
