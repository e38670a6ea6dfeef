//! Binary (on/off) feature controls.

use serde::Serialize;
use serde_json::Value;

use super::{AccessGate, Control, NoAccess, Viewer};
use crate::model::{BinaryFeature, ChangeRequest, DeviceState, Endpoint};

/// Interactive toggle for a write-capable binary feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinaryToggle {
    pub property: String,
    pub endpoint: Option<Endpoint>,
    /// Current value from the state snapshot, if reported
    pub value: Option<Value>,
    pub value_on: Value,
    pub value_off: Value,
}

impl BinaryToggle {
    pub fn is_on(&self) -> bool {
        self.value.as_ref() == Some(&self.value_on)
    }

    /// Request that sets the feature to its on or off sentinel.
    pub fn set(&self, checked: bool) -> ChangeRequest {
        let value = if checked {
            self.value_on.clone()
        } else {
            self.value_off.clone()
        };
        ChangeRequest::single(self.endpoint.clone(), &self.property, value)
    }

    /// Request that flips the current value. Anything other than the on
    /// sentinel counts as off.
    pub fn toggle(&self) -> ChangeRequest {
        self.set(!self.is_on())
    }
}

pub type BinaryControl = Control<BinaryToggle>;

/// Choose how to render a binary feature from its access bits.
///
/// WRITE wins over STATE; READ alone gives no access.
pub fn select_binary_control(feature: &BinaryFeature, state: &DeviceState) -> BinaryControl {
    let base = &feature.base;
    match AccessGate::for_access(base.access) {
        AccessGate::Edit => Control::Edit(BinaryToggle {
            property: base.property.clone(),
            endpoint: base.endpoint.clone(),
            value: state.get(&base.property).cloned(),
            value_on: feature.value_on.clone(),
            value_off: feature.value_off.clone(),
        }),
        AccessGate::View => Control::View(Viewer::new(base, state)),
        AccessGate::Denied => Control::NoAccess(NoAccess::new(base)),
    }
}
