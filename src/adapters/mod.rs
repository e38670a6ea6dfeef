//! Transport adapters (zigbee2mqtt over MQTT)

pub mod mqtt;
pub mod traits;

pub use mqtt::{BridgeAdapter, BridgeStatus};
pub use traits::Startable;
