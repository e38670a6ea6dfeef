//! Outbound change requests.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::feature::Endpoint;

/// A partial state patch for one device, optionally scoped to an endpoint.
///
/// This is what a write-capable control emits when the user interacts with
/// it; the transport decides how to deliver it to the bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<Endpoint>,
    pub patch: Map<String, Value>,
}

impl ChangeRequest {
    /// Build a request; an empty endpoint name is treated as no endpoint.
    pub fn new(endpoint: Option<Endpoint>, patch: Map<String, Value>) -> Self {
        Self {
            endpoint: endpoint.filter(|e| !e.is_unspecified()),
            patch,
        }
    }

    /// Single-property patch.
    pub fn single(endpoint: Option<Endpoint>, property: &str, value: Value) -> Self {
        let mut patch = Map::new();
        patch.insert(property.to_string(), value);
        Self::new(endpoint, patch)
    }

    /// Effective endpoint, ignoring an empty name that slipped in via
    /// deserialization.
    pub fn target_endpoint(&self) -> Option<&Endpoint> {
        self.endpoint.as_ref().filter(|e| !e.is_unspecified())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_endpoint_is_dropped() {
        let req = ChangeRequest::single(Some(Endpoint::Name(String::new())), "state", json!("ON"));
        assert!(req.endpoint.is_none());
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"patch": {"state": "ON"}})
        );
    }

    #[test]
    fn test_deserialized_empty_endpoint_has_no_target() {
        let req: ChangeRequest =
            serde_json::from_value(json!({"endpoint": "", "patch": {"state": "OFF"}})).unwrap();
        assert!(req.target_endpoint().is_none());

        let scoped: ChangeRequest =
            serde_json::from_value(json!({"endpoint": "l2", "patch": {"state": "OFF"}})).unwrap();
        assert_eq!(scoped.target_endpoint(), Some(&Endpoint::Name("l2".into())));
    }
}
