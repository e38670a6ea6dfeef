//! Typed view of the bridge's device and feature schema.
//!
//! The schema is owned by the bridge; this module only interprets it.

pub mod access;
pub mod change;
pub mod device;
pub mod feature;
pub mod state;

pub use access::AccessMode;
pub use change::ChangeRequest;
pub use device::{BindRule, Device, DeviceDefinition, DeviceType, EndpointDescription, PowerSource};
pub use feature::{
    BinaryFeature, CompositeFeature, Endpoint, EnumFeature, ExposedFeature, FeatureBase,
    FeatureKind, NumericFeature, TextFeature,
};
pub use state::{Click, DeviceState, LastSeen, RunningState, SystemMode};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("unknown {key} value: {value}")]
    UnknownValue { key: &'static str, value: String },
}
