//! Device records as published on the bridge's `bridge/devices` topic.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

use super::feature::{Endpoint, ExposedFeature};
use super::ModelError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceType {
    EndDevice,
    Router,
    Coordinator,
    #[default]
    #[serde(other)]
    Unknown,
}

/// How a device is powered. Unknown strings are kept verbatim, null is `Unknown`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum PowerSource {
    Battery,
    MainsSinglePhase,
    DcSource,
    Other(String),
    #[default]
    Unknown,
}

impl PowerSource {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Battery => "Battery",
            Self::MainsSinglePhase => "Mains (single phase)",
            Self::DcSource => "DC Source",
            Self::Other(s) => s,
            Self::Unknown => "",
        }
    }
}

impl From<String> for PowerSource {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Battery" => Self::Battery,
            "Mains (single phase)" => Self::MainsSinglePhase,
            "DC Source" => Self::DcSource,
            "" => Self::Unknown,
            _ => Self::Other(s),
        }
    }
}

impl From<Option<String>> for PowerSource {
    fn from(s: Option<String>) -> Self {
        s.map(Self::from).unwrap_or_default()
    }
}

impl From<PowerSource> for String {
    fn from(p: PowerSource) -> Self {
        p.as_str().to_string()
    }
}

impl fmt::Display for PowerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Model information and exposed features of a supported device.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceDefinition {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub supports: String,
    #[serde(default)]
    pub vendor: String,
    #[serde(default)]
    pub exposes: Vec<ExposedFeature>,
    #[serde(default)]
    pub supports_ota: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindTargetType {
    Endpoint,
    Group,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindTarget {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<Endpoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ieee_address: Option<String>,
    #[serde(rename = "type")]
    pub target_type: BindTargetType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindRule {
    pub cluster: String,
    pub target: BindTarget,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportingConfig {
    pub cluster: String,
    pub attribute: String,
    pub maximum_report_interval: u32,
    pub minimum_report_interval: u32,
    pub reportable_change: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Clusters {
    #[serde(default)]
    pub input: Vec<String>,
    #[serde(default)]
    pub output: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EndpointDescription {
    #[serde(default)]
    pub bindings: Vec<BindRule>,
    #[serde(default)]
    pub configured_reportings: Vec<ReportingConfig>,
    #[serde(default)]
    pub clusters: Clusters,
}

/// A device known to the bridge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub ieee_address: String,

    #[serde(rename = "type", default)]
    pub device_type: DeviceType,

    #[serde(default)]
    pub network_address: u32,

    #[serde(default)]
    pub model: Option<String>,

    pub friendly_name: String,

    #[serde(default)]
    pub power_source: PowerSource,

    #[serde(default)]
    pub model_id: Option<String>,

    #[serde(default)]
    pub interviewing: bool,

    #[serde(default)]
    pub interview_completed: bool,

    /// String or number depending on firmware
    #[serde(default)]
    pub software_build_id: Option<Value>,

    #[serde(default)]
    pub supported: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<DeviceDefinition>,

    #[serde(default)]
    pub date_code: Option<String>,

    /// Keyed by endpoint id as the bridge sends it
    #[serde(default)]
    pub endpoints: BTreeMap<String, EndpointDescription>,

    /// Simple-bind rules (`parameter -> rule`) for firmwares that support them
    #[serde(rename = "SB", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub simple_binds: BTreeMap<String, String>,

    /// Device parameters (`st`) edited through the simple-bind table, in
    /// the order the firmware reports them
    #[serde(rename = "st", default, skip_serializing_if = "Map::is_empty")]
    pub parameters: Map<String, Value>,
}

impl Device {
    /// Parse a `bridge/devices` payload. Entries that do not describe a
    /// device are skipped so one bad record cannot empty the dashboard.
    pub fn parse_list(payload: &[u8]) -> Result<Vec<Device>, ModelError> {
        let entries: Vec<Value> = serde_json::from_slice(payload)?;
        let devices = entries
            .into_iter()
            .filter_map(|entry| {
                let name = entry
                    .get("friendly_name")
                    .and_then(Value::as_str)
                    .unwrap_or("<unnamed>")
                    .to_string();
                match serde_json::from_value::<Device>(entry) {
                    Ok(device) => Some(device),
                    Err(e) => {
                        tracing::warn!("Skipping unreadable device {}: {}", name, e);
                        None
                    }
                }
            })
            .collect();
        Ok(devices)
    }

    /// Top-level exposed features, if the device has a definition.
    pub fn exposes(&self) -> Option<&[ExposedFeature]> {
        self.definition.as_ref().map(|d| d.exposes.as_slice())
    }

    pub fn is_coordinator(&self) -> bool {
        self.device_type == DeviceType::Coordinator
    }
}
