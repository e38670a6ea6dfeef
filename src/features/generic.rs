//! Numeric, enum and text feature controls.

use serde::Serialize;
use serde_json::Value;

use super::{AccessGate, Control, NoAccess, Viewer};
use crate::model::feature::NumericFeaturePreset;
use crate::model::{ChangeRequest, DeviceState, Endpoint, EnumFeature, NumericFeature, TextFeature};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericInput {
    pub property: String,
    pub endpoint: Option<Endpoint>,
    pub value: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub unit: Option<String>,
    pub presets: Vec<NumericFeaturePreset>,
}

impl NumericInput {
    /// Request setting `value`, clamped to the feature's declared range.
    pub fn set(&self, value: f64) -> ChangeRequest {
        let mut value = value;
        if let Some(min) = self.min {
            value = value.max(min);
        }
        if let Some(max) = self.max {
            value = value.min(max);
        }
        ChangeRequest::single(self.endpoint.clone(), &self.property, Value::from(value))
    }

    /// Request for a named preset, if the feature declares it.
    pub fn preset(&self, name: &str) -> Option<ChangeRequest> {
        self.presets
            .iter()
            .find(|p| p.name == name)
            .map(|p| self.set(p.value))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumSelect {
    pub property: String,
    pub endpoint: Option<Endpoint>,
    pub value: Option<Value>,
    pub options: Vec<Value>,
}

impl EnumSelect {
    /// Request selecting `option`; `None` when it is not one of the options.
    pub fn select(&self, option: &Value) -> Option<ChangeRequest> {
        self.options
            .contains(option)
            .then(|| ChangeRequest::single(self.endpoint.clone(), &self.property, option.clone()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextInput {
    pub property: String,
    pub endpoint: Option<Endpoint>,
    pub value: Option<String>,
}

impl TextInput {
    pub fn set(&self, text: &str) -> ChangeRequest {
        ChangeRequest::single(self.endpoint.clone(), &self.property, Value::from(text))
    }
}

pub fn select_numeric_control(
    feature: &NumericFeature,
    state: &DeviceState,
) -> Control<NumericInput> {
    let base = &feature.base;
    match AccessGate::for_access(base.access) {
        AccessGate::Edit => Control::Edit(NumericInput {
            property: base.property.clone(),
            endpoint: base.endpoint.clone(),
            value: state.number(&base.property),
            min: feature.value_min,
            max: feature.value_max,
            unit: base.unit.clone(),
            presets: feature.presets.clone(),
        }),
        AccessGate::View => Control::View(Viewer::new(base, state)),
        AccessGate::Denied => Control::NoAccess(NoAccess::new(base)),
    }
}

pub fn select_enum_control(feature: &EnumFeature, state: &DeviceState) -> Control<EnumSelect> {
    let base = &feature.base;
    match AccessGate::for_access(base.access) {
        AccessGate::Edit => Control::Edit(EnumSelect {
            property: base.property.clone(),
            endpoint: base.endpoint.clone(),
            value: state.get(&base.property).cloned(),
            options: feature.values.clone(),
        }),
        AccessGate::View => Control::View(Viewer::new(base, state)),
        AccessGate::Denied => Control::NoAccess(NoAccess::new(base)),
    }
}

pub fn select_text_control(feature: &TextFeature, state: &DeviceState) -> Control<TextInput> {
    let base = &feature.base;
    match AccessGate::for_access(base.access) {
        AccessGate::Edit => Control::Edit(TextInput {
            property: base.property.clone(),
            endpoint: base.endpoint.clone(),
            value: state.text(&base.property).map(str::to_string),
        }),
        AccessGate::View => Control::View(Viewer::new(base, state)),
        AccessGate::Denied => Control::NoAccess(NoAccess::new(base)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn brightness(access: u8) -> NumericFeature {
        serde_json::from_value(json!({
            "name": "brightness",
            "property": "brightness",
            "access": access,
            "value_min": 0,
            "value_max": 254,
            "presets": [{"name": "max", "value": 254}]
        }))
        .unwrap()
    }

    #[test]
    fn test_numeric_set_clamps_to_range() {
        let state = DeviceState::try_from(json!({"brightness": 100})).unwrap();
        let Control::Edit(input) = select_numeric_control(&brightness(7), &state) else {
            panic!("expected input");
        };
        assert_eq!(input.value, Some(100.0));
        assert_eq!(input.set(300.0).patch.get("brightness"), Some(&json!(254.0)));
        assert_eq!(input.set(-1.0).patch.get("brightness"), Some(&json!(0.0)));
    }

    #[test]
    fn test_numeric_preset() {
        let Control::Edit(input) = select_numeric_control(&brightness(2), &DeviceState::new()) else {
            panic!("expected input");
        };
        assert!(input.preset("max").is_some());
        assert!(input.preset("min").is_none());
    }

    #[test]
    fn test_numeric_state_only_is_viewer() {
        let control = select_numeric_control(&brightness(1), &DeviceState::new());
        assert!(matches!(control, Control::View(_)));
    }

    #[test]
    fn test_enum_select_rejects_unknown_option() {
        let feature: EnumFeature = serde_json::from_value(json!({
            "property": "system_mode", "access": 7, "endpoint": 1,
            "values": ["off", "heat", "auto"]
        }))
        .unwrap();
        let Control::Edit(select) = select_enum_control(&feature, &DeviceState::new()) else {
            panic!("expected select");
        };
        let req = select.select(&json!("heat")).unwrap();
        assert_eq!(req.endpoint, Some(Endpoint::Number(1)));
        assert!(select.select(&json!("cool")).is_none());
    }

    #[test]
    fn test_text_no_access() {
        let feature: TextFeature =
            serde_json::from_value(json!({"property": "note", "access": 4})).unwrap();
        assert!(matches!(
            select_text_control(&feature, &DeviceState::new()),
            Control::NoAccess(_)
        ));
    }
}
