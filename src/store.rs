//! DeviceStore - Single source of truth for devices and their state

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::bus::{BusEvent, SharedBus};
use crate::dashboard::DeviceCard;
use crate::model::{Device, DeviceState};

#[derive(Default)]
struct Inner {
    /// Devices in the order the bridge listed them
    order: Vec<String>,
    devices: HashMap<String, Device>,
    states: HashMap<String, DeviceState>,
}

/// DeviceStore keeps the bridge's device list and state snapshots.
/// - Subscribes to bus events
/// - Replaces the device list on each `DevicesUpdated`
/// - Merges state updates key by key
/// - Provides query interface for API and UI layers
#[derive(Clone)]
pub struct DeviceStore {
    inner: Arc<RwLock<Inner>>,
    bus: SharedBus,
}

impl DeviceStore {
    pub fn new(bus: SharedBus) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner::default())),
            bus,
        }
    }

    /// Event processing loop; spawn as a task.
    pub async fn run(&self) {
        let mut rx = self.bus.subscribe();

        info!("DeviceStore started");

        loop {
            match rx.recv().await {
                Ok(BusEvent::ShuttingDown { .. }) => {
                    info!("DeviceStore stopping");
                    break;
                }
                Ok(event) => self.apply(event).await,
                Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!("DeviceStore lagged, skipped {} events", n);
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    }

    /// Apply a single bus event.
    pub async fn apply(&self, event: BusEvent) {
        match event {
            BusEvent::DevicesUpdated { devices } => {
                debug!("Device list updated: {} devices", devices.len());
                let mut inner = self.inner.write().await;
                inner.order = devices.iter().map(|d| d.friendly_name.clone()).collect();
                let known: std::collections::HashSet<&String> = inner.order.iter().collect();
                let stale: Vec<String> = inner
                    .states
                    .keys()
                    .filter(|name| !known.contains(name))
                    .cloned()
                    .collect();
                for name in stale {
                    inner.states.remove(&name);
                }
                inner.devices = devices
                    .into_iter()
                    .map(|d| (d.friendly_name.clone(), d))
                    .collect();
            }

            BusEvent::DeviceStateUpdated {
                friendly_name,
                state,
            } => {
                debug!("State updated: {}", friendly_name);
                let mut inner = self.inner.write().await;
                inner
                    .states
                    .entry(friendly_name)
                    .or_default()
                    .merge(state);
            }

            BusEvent::DeviceRemoved { friendly_name } => {
                debug!("Device removed: {}", friendly_name);
                let mut inner = self.inner.write().await;
                inner.devices.remove(&friendly_name);
                inner.states.remove(&friendly_name);
                inner.order.retain(|n| n != &friendly_name);
            }

            _ => {}
        }
    }

    /// All devices in bridge order
    pub async fn devices(&self) -> Vec<Device> {
        let inner = self.inner.read().await;
        inner
            .order
            .iter()
            .filter_map(|name| inner.devices.get(name).cloned())
            .collect()
    }

    pub async fn device(&self, friendly_name: &str) -> Option<Device> {
        self.inner.read().await.devices.get(friendly_name).cloned()
    }

    /// Latest snapshot; empty when the device never reported
    pub async fn state(&self, friendly_name: &str) -> DeviceState {
        self.inner
            .read()
            .await
            .states
            .get(friendly_name)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn device_count(&self) -> usize {
        self.inner.read().await.devices.len()
    }

    /// Dashboard cards for every device except the coordinator
    pub async fn cards(&self) -> Vec<DeviceCard> {
        let inner = self.inner.read().await;
        inner
            .order
            .iter()
            .filter_map(|name| inner.devices.get(name))
            .filter(|device| !device.is_coordinator())
            .map(|device| {
                let state = inner
                    .states
                    .get(&device.friendly_name)
                    .cloned()
                    .unwrap_or_default();
                DeviceCard::for_device(device, &state)
            })
            .collect()
    }

    pub async fn card(&self, friendly_name: &str) -> Option<DeviceCard> {
        let inner = self.inner.read().await;
        let device = inner.devices.get(friendly_name)?;
        let state = inner.states.get(friendly_name).cloned().unwrap_or_default();
        Some(DeviceCard::for_device(device, &state))
    }
}
