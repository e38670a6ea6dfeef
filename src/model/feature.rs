//! Exposed features as declared by the bridge's device definitions.
//!
//! Each feature is a node in a tree: generic features (binary, numeric, enum,
//! text) are leaves, composite features (light, switch, climate, ...) own an
//! ordered list of children.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::access::AccessMode;

// =============================================================================
// Endpoint
// =============================================================================

/// Sub-address inside a device. The bridge uses either names ("l1") or numbers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Endpoint {
    Number(u32),
    Name(String),
}

impl Endpoint {
    /// An empty endpoint name addresses the device itself.
    pub fn is_unspecified(&self) -> bool {
        matches!(self, Self::Name(name) if name.is_empty())
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Name(name) => write!(f, "{}", name),
        }
    }
}

impl From<&str> for Endpoint {
    fn from(s: &str) -> Self {
        match s.parse::<u32>() {
            Ok(n) => Self::Number(n),
            Err(_) => Self::Name(s.to_string()),
        }
    }
}

// =============================================================================
// Feature variants
// =============================================================================

/// Fields shared by every feature.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureBase {
    #[serde(default)]
    pub name: String,

    /// Key into the device state snapshot
    #[serde(default)]
    pub property: String,

    #[serde(default)]
    pub access: AccessMode,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<Endpoint>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// On/off style feature. The on/off values are whatever the device uses,
/// not necessarily booleans ("ON"/"OFF", "LOCK"/"UNLOCK", true/false).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryFeature {
    #[serde(flatten)]
    pub base: FeatureBase,
    /// Null when the definition omits it
    #[serde(default)]
    pub value_on: Value,
    #[serde(default)]
    pub value_off: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_toggle: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericFeaturePreset {
    pub name: String,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericFeature {
    #[serde(flatten)]
    pub base: FeatureBase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_max: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub presets: Vec<NumericFeaturePreset>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumFeature {
    #[serde(flatten)]
    pub base: FeatureBase,
    #[serde(default)]
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFeature {
    #[serde(flatten)]
    pub base: FeatureBase,
}

/// Feature grouping child features, e.g. a light grouping state, brightness and color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeFeature {
    #[serde(flatten)]
    pub base: FeatureBase,
    /// Children in display order
    #[serde(default)]
    pub features: Vec<ExposedFeature>,
}

/// A feature node, discriminated by the bridge's `type` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExposedFeature {
    Binary(BinaryFeature),
    Numeric(NumericFeature),
    Enum(EnumFeature),
    Text(TextFeature),
    Light(CompositeFeature),
    Switch(CompositeFeature),
    Cover(CompositeFeature),
    Lock(CompositeFeature),
    Fan(CompositeFeature),
    Climate(CompositeFeature),
    Composite(CompositeFeature),
    /// Tag this dashboard does not know about; carried so one new feature
    /// type does not make a whole device list unreadable.
    #[serde(other)]
    Unsupported,
}

/// Fieldless view of a feature's `type` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    Binary,
    Numeric,
    Enum,
    Text,
    Light,
    Switch,
    Cover,
    Lock,
    Fan,
    Climate,
    Composite,
    Unsupported,
}

impl FeatureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Binary => "binary",
            Self::Numeric => "numeric",
            Self::Enum => "enum",
            Self::Text => "text",
            Self::Light => "light",
            Self::Switch => "switch",
            Self::Cover => "cover",
            Self::Lock => "lock",
            Self::Fan => "fan",
            Self::Climate => "climate",
            Self::Composite => "composite",
            Self::Unsupported => "unsupported",
        }
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ExposedFeature {
    pub fn kind(&self) -> FeatureKind {
        match self {
            Self::Binary(_) => FeatureKind::Binary,
            Self::Numeric(_) => FeatureKind::Numeric,
            Self::Enum(_) => FeatureKind::Enum,
            Self::Text(_) => FeatureKind::Text,
            Self::Light(_) => FeatureKind::Light,
            Self::Switch(_) => FeatureKind::Switch,
            Self::Cover(_) => FeatureKind::Cover,
            Self::Lock(_) => FeatureKind::Lock,
            Self::Fan(_) => FeatureKind::Fan,
            Self::Climate(_) => FeatureKind::Climate,
            Self::Composite(_) => FeatureKind::Composite,
            Self::Unsupported => FeatureKind::Unsupported,
        }
    }

    /// Shared fields, absent only for unsupported tags.
    pub fn base(&self) -> Option<&FeatureBase> {
        match self {
            Self::Binary(f) => Some(&f.base),
            Self::Numeric(f) => Some(&f.base),
            Self::Enum(f) => Some(&f.base),
            Self::Text(f) => Some(&f.base),
            Self::Light(c)
            | Self::Switch(c)
            | Self::Cover(c)
            | Self::Lock(c)
            | Self::Fan(c)
            | Self::Climate(c)
            | Self::Composite(c) => Some(&c.base),
            Self::Unsupported => None,
        }
    }

    pub fn as_composite(&self) -> Option<&CompositeFeature> {
        match self {
            Self::Light(c)
            | Self::Switch(c)
            | Self::Cover(c)
            | Self::Lock(c)
            | Self::Fan(c)
            | Self::Climate(c)
            | Self::Composite(c) => Some(c),
            _ => None,
        }
    }

    pub fn is_composite(&self) -> bool {
        self.as_composite().is_some()
    }

    pub fn property(&self) -> &str {
        self.base().map(|b| b.property.as_str()).unwrap_or("")
    }

    pub fn name(&self) -> &str {
        self.base().map(|b| b.name.as_str()).unwrap_or("")
    }

    pub fn access(&self) -> AccessMode {
        self.base().map(|b| b.access).unwrap_or_default()
    }

    pub fn endpoint(&self) -> Option<&Endpoint> {
        self.base().and_then(|b| b.endpoint.as_ref())
    }

    /// Direct children of a composite; empty for leaves.
    pub fn children(&self) -> &[ExposedFeature] {
        self.as_composite()
            .map(|c| c.features.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_binary_feature_parses() {
        let feature: ExposedFeature = serde_json::from_value(json!({
            "type": "binary",
            "name": "state",
            "property": "state",
            "access": 7,
            "value_on": "ON",
            "value_off": "OFF",
            "value_toggle": "TOGGLE"
        }))
        .unwrap();

        assert_eq!(feature.kind(), FeatureKind::Binary);
        assert_eq!(feature.property(), "state");
        assert_eq!(feature.access(), AccessMode::all());
        match feature {
            ExposedFeature::Binary(b) => {
                assert_eq!(b.value_on, json!("ON"));
                assert_eq!(b.value_toggle, Some(json!("TOGGLE")));
            }
            other => panic!("expected binary, got {:?}", other),
        }
    }

    #[test]
    fn test_composite_owns_children_in_order() {
        let feature: ExposedFeature = serde_json::from_value(json!({
            "type": "light",
            "features": [
                {"type": "binary", "name": "state", "property": "state", "access": 7,
                 "value_on": "ON", "value_off": "OFF"},
                {"type": "numeric", "name": "brightness", "property": "brightness", "access": 7,
                 "value_min": 0, "value_max": 254}
            ]
        }))
        .unwrap();

        assert!(feature.is_composite());
        assert_eq!(feature.property(), "");
        let names: Vec<_> = feature.children().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["state", "brightness"]);
    }

    #[test]
    fn test_endpoint_accepts_string_or_number() {
        let named: ExposedFeature = serde_json::from_value(json!({
            "type": "text", "name": "x", "property": "x", "access": 1, "endpoint": "l1"
        }))
        .unwrap();
        assert_eq!(named.endpoint(), Some(&Endpoint::Name("l1".to_string())));

        let numbered: ExposedFeature = serde_json::from_value(json!({
            "type": "text", "name": "x", "property": "x", "access": 1, "endpoint": 2
        }))
        .unwrap();
        assert_eq!(numbered.endpoint(), Some(&Endpoint::Number(2)));
        assert_eq!(numbered.endpoint().unwrap().to_string(), "2");
    }

    #[test]
    fn test_unknown_type_is_unsupported() {
        let feature: ExposedFeature =
            serde_json::from_value(json!({"type": "list", "property": "schedule"})).unwrap();
        assert_eq!(feature.kind(), FeatureKind::Unsupported);
        assert_eq!(feature.property(), "");
        assert!(feature.access().is_empty());
        assert!(feature.children().is_empty());
    }

    #[test]
    fn test_missing_access_defaults_to_none() {
        let feature: ExposedFeature =
            serde_json::from_value(json!({"type": "numeric", "property": "power"})).unwrap();
        assert!(feature.access().is_empty());
    }

    #[test]
    fn test_empty_endpoint_name_is_unspecified() {
        assert!(Endpoint::Name(String::new()).is_unspecified());
        assert!(!Endpoint::from("l2").is_unspecified());
        assert_eq!(Endpoint::from("3"), Endpoint::Number(3));
    }
}
