//! Event bus for inter-component communication
//!
//! Uses tokio::sync::broadcast for pub/sub pattern.
//! Events are typed and can carry payloads.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::model::{ChangeRequest, Device, DeviceState};
use crate::simple_bind::SimpleBindEdit;

/// Event types that can be published on the bus
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum BusEvent {
    // Bridge connection
    BridgeConnected { host: String },
    BridgeDisconnected { host: String },

    // Bridge -> dashboard
    DevicesUpdated { devices: Vec<Device> },
    DeviceStateUpdated { friendly_name: String, state: DeviceState },
    DeviceRemoved { friendly_name: String },

    // Dashboard -> bridge (fire-and-forget; results come back as ChangeResult)
    ChangeRequested { friendly_name: String, request: ChangeRequest },
    SimpleBindRequested { friendly_name: String, edit: SimpleBindEdit },
    ChangeResult {
        friendly_name: String,
        success: bool,
        message: String,
    },

    ShuttingDown { reason: Option<String> },
}

impl BusEvent {
    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::BridgeConnected { .. } => "BridgeConnected",
            Self::BridgeDisconnected { .. } => "BridgeDisconnected",
            Self::DevicesUpdated { .. } => "DevicesUpdated",
            Self::DeviceStateUpdated { .. } => "DeviceStateUpdated",
            Self::DeviceRemoved { .. } => "DeviceRemoved",
            Self::ChangeRequested { .. } => "ChangeRequested",
            Self::SimpleBindRequested { .. } => "SimpleBindRequested",
            Self::ChangeResult { .. } => "ChangeResult",
            Self::ShuttingDown { .. } => "ShuttingDown",
        }
    }
}

/// Event bus handle for publishing and subscribing
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<BusEvent>,
}

impl EventBus {
    /// Create a new event bus with specified capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers
    pub fn publish(&self, event: BusEvent) {
        // No subscribers is not an error
        if self.sender.send(event).is_err() {
            tracing::trace!("Bus event dropped (no subscribers)");
        }
    }

    /// Subscribe to all events
    pub fn subscribe(&self) -> broadcast::Receiver<BusEvent> {
        self.sender.subscribe()
    }

    /// Get the number of current subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    /// Default capacity (256 events)
    fn default() -> Self {
        Self::new(256)
    }
}

/// Shared event bus wrapped in Arc for thread-safe sharing
pub type SharedBus = Arc<EventBus>;

/// Create a new shared event bus
pub fn create_bus() -> SharedBus {
    Arc::new(EventBus::default())
}
