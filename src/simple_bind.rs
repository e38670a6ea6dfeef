//! Simple-bind editor: a parameter table with inline editors for each
//! parameter's current value and its simple-bind rule.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::Device;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimpleBindRow {
    pub parameter: String,
    pub value: Value,
    /// Empty when no rule is configured
    pub rule: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "rows", rename_all = "snake_case")]
pub enum SimpleBindView {
    /// Device not known yet
    Loading,
    Table(Vec<SimpleBindRow>),
}

impl SimpleBindView {
    /// One row per device parameter (`st`), in the order the device reported them.
    pub fn from_device(device: Option<&Device>) -> Self {
        let Some(device) = device else {
            return Self::Loading;
        };

        let rows = device
            .parameters
            .iter()
            .map(|(parameter, value)| SimpleBindRow {
                parameter: parameter.clone(),
                value: value.clone(),
                rule: device
                    .simple_binds
                    .get(parameter)
                    .cloned()
                    .unwrap_or_default(),
            })
            .collect();

        Self::Table(rows)
    }
}

/// Which column of the table was edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimpleBindKind {
    StateValue,
    Rule,
}

/// Raw editor input as posted by the device page.
#[derive(Debug, Clone, Deserialize)]
pub struct SimpleBindForm {
    pub kind: SimpleBindKind,
    pub name: String,
    pub value: String,
}

impl SimpleBindForm {
    /// Address the edit to a device, typing the raw input.
    pub fn into_edit(self, nwk_addr: u32) -> SimpleBindEdit {
        let value = parse_input(&self.value);
        match self.kind {
            SimpleBindKind::StateValue => SimpleBindEdit::StateValue {
                nwk_addr,
                name: self.name,
                value,
            },
            SimpleBindKind::Rule => SimpleBindEdit::Rule {
                nwk_addr,
                name: self.name,
                value,
            },
        }
    }
}

/// An edit made in the simple-bind table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SimpleBindEdit {
    /// New value for the parameter itself
    StateValue {
        nwk_addr: u32,
        name: String,
        value: Value,
    },
    /// New simple-bind rule for the parameter
    Rule {
        nwk_addr: u32,
        name: String,
        value: Value,
    },
}

impl SimpleBindEdit {
    pub fn nwk_addr(&self) -> u32 {
        match self {
            Self::StateValue { nwk_addr, .. } | Self::Rule { nwk_addr, .. } => *nwk_addr,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::StateValue { name, .. } | Self::Rule { name, .. } => name,
        }
    }

    pub fn value(&self) -> &Value {
        match self {
            Self::StateValue { value, .. } | Self::Rule { value, .. } => value,
        }
    }

    /// `{name: value}` body sent to the bridge.
    pub fn payload(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert(self.name().to_string(), self.value().clone());
        map
    }

    /// Notification shown once the bridge accepted the edit.
    pub fn success_message(&self) -> String {
        let what = match self {
            Self::StateValue { .. } => "state value",
            Self::Rule { .. } => "simple bind value",
        };
        format!(
            "Successfully updated {} {}={}",
            what,
            self.name(),
            display_plain(self.value())
        )
    }
}

/// Interpret raw editor input: JSON literals keep their type, anything else
/// is taken as a string.
pub fn parse_input(raw: &str) -> Value {
    serde_json::from_str(raw.trim()).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Strings without quotes, everything else as compact JSON.
pub fn display_plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn device_with_rules() -> Device {
        let mut parameters = Map::new();
        parameters.insert("state".to_string(), json!("ON"));
        parameters.insert("brightness".to_string(), json!(10));
        Device {
            friendly_name: "relay".to_string(),
            network_address: 42,
            simple_binds: BTreeMap::from([("state".to_string(), "0x2a/1".to_string())]),
            parameters,
            ..Default::default()
        }
    }

    #[test]
    fn test_loading_without_device() {
        assert_eq!(SimpleBindView::from_device(None), SimpleBindView::Loading);
    }

    #[test]
    fn test_rows_follow_parameter_order_with_rules() {
        let device = device_with_rules();

        let SimpleBindView::Table(rows) = SimpleBindView::from_device(Some(&device)) else {
            panic!("expected table");
        };

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].parameter, "state");
        assert_eq!(rows[0].rule, "0x2a/1");
        assert_eq!(rows[1].parameter, "brightness");
        assert_eq!(rows[1].value, json!(10));
        assert_eq!(rows[1].rule, "");
    }

    #[test]
    fn test_device_without_parameters_has_empty_table() {
        let device = Device {
            friendly_name: "bare".to_string(),
            ..Default::default()
        };
        assert_eq!(
            SimpleBindView::from_device(Some(&device)),
            SimpleBindView::Table(vec![])
        );
    }

    #[test]
    fn test_edit_messages() {
        let state_edit = SimpleBindEdit::StateValue {
            nwk_addr: 42,
            name: "brightness".to_string(),
            value: json!(42),
        };
        assert_eq!(
            state_edit.success_message(),
            "Successfully updated state value brightness=42"
        );

        let rule_edit = SimpleBindEdit::Rule {
            nwk_addr: 42,
            name: "state".to_string(),
            value: json!("0x2a/1"),
        };
        assert_eq!(
            rule_edit.success_message(),
            "Successfully updated simple bind value state=0x2a/1"
        );
    }

    #[test]
    fn test_parse_input() {
        assert_eq!(parse_input("42"), json!(42));
        assert_eq!(parse_input("true"), json!(true));
        assert_eq!(parse_input("ON"), json!("ON"));
        assert_eq!(parse_input("\"quoted\""), json!("quoted"));
    }

    #[test]
    fn test_form_types_raw_input_and_carries_address() {
        let form: SimpleBindForm =
            serde_json::from_value(json!({"kind": "state_value", "name": "brightness", "value": "128"}))
                .unwrap();
        let edit = form.into_edit(42);

        assert_eq!(edit.nwk_addr(), 42);
        assert!(matches!(edit, SimpleBindEdit::StateValue { .. }));
        assert_eq!(edit.payload().get("brightness"), Some(&json!(128)));

        let form: SimpleBindForm =
            serde_json::from_value(json!({"kind": "rule", "name": "state", "value": "0x1/2"}))
                .unwrap();
        let edit = form.into_edit(7);
        assert_eq!(edit.payload().get("state"), Some(&json!("0x1/2")));
    }
}
