//! Feature controls for the device page.
//!
//! Every feature renders as one of three mutually exclusive variants chosen
//! from its access bits: an editable control, a read-only viewer, or a
//! no-access marker. Composite features render their children in order.

pub mod binary;
pub mod generic;

pub use binary::{select_binary_control, BinaryControl, BinaryToggle};
pub use generic::{EnumSelect, NumericInput, TextInput};

use serde::Serialize;
use serde_json::Value;

use crate::model::{AccessMode, DeviceState, ExposedFeature, FeatureBase, FeatureKind};

/// Which variant an access mode allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessGate {
    Edit,
    View,
    Denied,
}

impl AccessGate {
    /// WRITE is checked before STATE; READ is not consulted.
    pub fn for_access(access: AccessMode) -> Self {
        if access.can_write() {
            Self::Edit
        } else if access.has_state() {
            Self::View
        } else {
            Self::Denied
        }
    }
}

/// Read-only display of a feature's current value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Viewer {
    pub name: String,
    pub property: String,
    pub value: Option<Value>,
    pub unit: Option<String>,
}

impl Viewer {
    pub fn new(base: &FeatureBase, state: &DeviceState) -> Self {
        Self {
            name: base.name.clone(),
            property: base.property.clone(),
            value: state.get(&base.property).cloned(),
            unit: base.unit.clone(),
        }
    }
}

/// Marker for a feature that can neither be written nor observed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoAccess {
    pub name: String,
    pub property: String,
}

impl NoAccess {
    pub fn new(base: &FeatureBase) -> Self {
        Self {
            name: base.name.clone(),
            property: base.property.clone(),
        }
    }
}

/// The three render variants, parameterized by the editable control type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", content = "control", rename_all = "snake_case")]
pub enum Control<E> {
    Edit(E),
    View(Viewer),
    NoAccess(NoAccess),
}

/// Render instruction for any feature node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeatureControl {
    Binary(BinaryControl),
    Numeric(Control<NumericInput>),
    Enum(Control<EnumSelect>),
    Text(Control<TextInput>),
    Group {
        kind: FeatureKind,
        name: String,
        children: Vec<FeatureControl>,
    },
    Unsupported,
}

/// Select the render instruction for a feature, recursing into composites.
pub fn select_control(feature: &ExposedFeature, state: &DeviceState) -> FeatureControl {
    match feature {
        ExposedFeature::Binary(f) => FeatureControl::Binary(select_binary_control(f, state)),
        ExposedFeature::Numeric(f) => FeatureControl::Numeric(generic::select_numeric_control(f, state)),
        ExposedFeature::Enum(f) => FeatureControl::Enum(generic::select_enum_control(f, state)),
        ExposedFeature::Text(f) => FeatureControl::Text(generic::select_text_control(f, state)),
        ExposedFeature::Unsupported => FeatureControl::Unsupported,
        composite => {
            let children = composite
                .children()
                .iter()
                .map(|child| select_control(child, state))
                .collect();
            FeatureControl::Group {
                kind: composite.kind(),
                name: composite.name().to_string(),
                children,
            }
        }
    }
}

/// Controls for a whole feature list, in order.
pub fn select_controls(features: &[ExposedFeature], state: &DeviceState) -> Vec<FeatureControl> {
    features.iter().map(|f| select_control(f, state)).collect()
}
