//! zigbee2mqtt bridge adapter
//!
//! Subscribes to the bridge's device list and per-device state topics and
//! turns them into bus events. Change requests from the bus are published
//! back to the bridge's `set` topics, followed by a `get` to refetch state.

use anyhow::{anyhow, Result};
use rumqttc::{AsyncClient, Event, Incoming, MqttOptions, QoS};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::bus::{BusEvent, SharedBus};
use crate::config::MqttConfig;
use crate::impl_startable;
use crate::model::{Device, DeviceState, Endpoint, ModelError};
use crate::simple_bind::SimpleBindEdit;

const DEFAULT_PORT: u16 = 1883;
const DEFAULT_BASE_TOPIC: &str = "zigbee2mqtt";
const CLIENT_ID: &str = "zigbee-dashboard";
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

// =============================================================================
// Topics
// =============================================================================

pub fn devices_topic(base: &str) -> String {
    format!("{}/bridge/devices", base)
}

/// `{base}/{name}/set` or `{base}/{name}/{endpoint}/set`
pub fn set_topic(base: &str, friendly_name: &str, endpoint: Option<&Endpoint>) -> String {
    match endpoint {
        Some(ep) if !ep.is_unspecified() => format!("{}/{}/{}/set", base, friendly_name, ep),
        _ => format!("{}/{}/set", base, friendly_name),
    }
}

pub fn get_topic(base: &str, friendly_name: &str) -> String {
    format!("{}/{}/get", base, friendly_name)
}

pub fn simple_bind_topic(base: &str, friendly_name: &str) -> String {
    format!("{}/{}/simple_bind/set", base, friendly_name)
}

/// Message received from the bridge, classified by topic
#[derive(Debug, PartialEq)]
pub enum BridgeMessage {
    Devices(Vec<Device>),
    State {
        friendly_name: String,
        state: DeviceState,
    },
    /// Retained state cleared for a device
    Removed { friendly_name: String },
    Ignored,
}

impl BridgeMessage {
    pub fn into_event(self) -> Option<BusEvent> {
        match self {
            Self::Devices(devices) => Some(BusEvent::DevicesUpdated { devices }),
            Self::State {
                friendly_name,
                state,
            } => Some(BusEvent::DeviceStateUpdated {
                friendly_name,
                state,
            }),
            Self::Removed { friendly_name } => Some(BusEvent::DeviceRemoved { friendly_name }),
            Self::Ignored => None,
        }
    }
}

/// Classify an incoming publish.
///
/// Friendly names may contain `/`, so a nested topic is only device state
/// when it names a device from the last device list (`known`). Anything
/// else nested (`/set`, `/get`, `/availability`, attribute topics) is ignored.
pub fn parse_message(
    base: &str,
    topic: &str,
    payload: &[u8],
    known: &HashSet<String>,
) -> Result<BridgeMessage, ModelError> {
    if topic == devices_topic(base) {
        return Ok(BridgeMessage::Devices(Device::parse_list(payload)?));
    }

    let Some(rest) = topic
        .strip_prefix(base)
        .and_then(|rest| rest.strip_prefix('/'))
    else {
        return Ok(BridgeMessage::Ignored);
    };

    if rest.is_empty() || rest == "bridge" || rest.starts_with("bridge/") {
        return Ok(BridgeMessage::Ignored);
    }
    if rest.contains('/') && !known.contains(rest) {
        return Ok(BridgeMessage::Ignored);
    }

    let friendly_name = rest.to_string();
    if payload.is_empty() {
        return Ok(BridgeMessage::Removed { friendly_name });
    }

    Ok(BridgeMessage::State {
        friendly_name,
        state: DeviceState::from_payload(payload)?,
    })
}

// =============================================================================
// Adapter
// =============================================================================

/// Bridge connection status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeStatus {
    pub connected: bool,
    pub host: Option<String>,
    pub port: u16,
    pub base_topic: String,
}

struct BridgeState {
    host: Option<String>,
    port: u16,
    username: Option<String>,
    password: Option<String>,
    base_topic: String,
    connected: bool,
}

impl Default for BridgeState {
    fn default() -> Self {
        Self {
            host: None,
            port: DEFAULT_PORT,
            username: None,
            password: None,
            base_topic: DEFAULT_BASE_TOPIC.to_string(),
            connected: false,
        }
    }
}

pub struct BridgeAdapter {
    state: Arc<RwLock<BridgeState>>,
    client: Arc<RwLock<Option<AsyncClient>>>,
    bus: SharedBus,
    shutdown: CancellationToken,
}

impl BridgeAdapter {
    pub fn new(bus: SharedBus) -> Self {
        Self {
            state: Arc::new(RwLock::new(BridgeState::default())),
            client: Arc::new(RwLock::new(None)),
            bus,
            shutdown: CancellationToken::new(),
        }
    }

    pub async fn configure(&self, config: &MqttConfig) {
        let mut state = self.state.write().await;
        state.host = Some(config.host.clone());
        state.port = config.port;
        state.username = config.username.clone();
        state.password = config.password.clone();
        state.base_topic = config.base_topic.clone();
    }

    pub async fn is_configured(&self) -> bool {
        self.state.read().await.host.is_some()
    }

    pub async fn get_status(&self) -> BridgeStatus {
        let state = self.state.read().await;
        BridgeStatus {
            connected: state.connected,
            host: state.host.clone(),
            port: state.port,
            base_topic: state.base_topic.clone(),
        }
    }

    async fn start_internal(&self) -> Result<()> {
        let (host, port, username, password, base_topic) = {
            let state = self.state.read().await;
            let host = state
                .host
                .clone()
                .ok_or_else(|| anyhow!("MQTT host not configured"))?;
            (
                host,
                state.port,
                state.username.clone(),
                state.password.clone(),
                state.base_topic.clone(),
            )
        };

        let mut options = MqttOptions::new(CLIENT_ID, &host, port);
        options.set_keep_alive(Duration::from_secs(30));
        // Device lists from large networks exceed the 10 KiB default
        options.set_max_packet_size(1024 * 1024, 1024 * 1024);

        if let (Some(user), Some(pass)) = (&username, &password) {
            options.set_credentials(user, pass);
        }

        let (client, mut eventloop) = AsyncClient::new(options, 100);

        {
            let mut client_guard = self.client.write().await;
            *client_guard = Some(client.clone());
        }

        tracing::info!("MQTT connecting to {}:{} (base topic {})...", host, port, base_topic);

        // Subscriptions are reissued on every ConnAck so they survive reconnects
        let state = self.state.clone();
        let bus = self.bus.clone();
        let shutdown = self.shutdown.clone();
        let loop_client = client.clone();
        let loop_base = base_topic.clone();
        let loop_host = host.clone();

        tokio::spawn(async move {
            let mut known: HashSet<String> = HashSet::new();
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => {
                        tracing::info!("MQTT event loop shutting down");
                        break;
                    }
                    result = eventloop.poll() => {
                        match result {
                            Ok(Event::Incoming(Incoming::Publish(publish))) => {
                                match parse_message(&loop_base, &publish.topic, &publish.payload, &known) {
                                    Ok(message) => {
                                        if let BridgeMessage::Devices(devices) = &message {
                                            known = devices.iter().map(|d| d.friendly_name.clone()).collect();
                                        }
                                        if let Some(event) = message.into_event() {
                                            tracing::trace!("{} from {}", event.name(), publish.topic);
                                            bus.publish(event);
                                        }
                                    }
                                    Err(e) => {
                                        tracing::warn!("Ignoring malformed message on {}: {}", publish.topic, e);
                                    }
                                }
                            }
                            Ok(Event::Incoming(Incoming::ConnAck(ack))) => {
                                tracing::info!("MQTT connected (code: {:?})", ack.code);
                                let topic = format!("{}/#", loop_base);
                                if let Err(e) = loop_client.try_subscribe(&topic, QoS::AtMostOnce) {
                                    tracing::error!("MQTT subscribe to {} failed: {}", topic, e);
                                }
                                state.write().await.connected = true;
                                bus.publish(BusEvent::BridgeConnected { host: loop_host.clone() });
                            }
                            Ok(Event::Incoming(Incoming::Disconnect)) => {
                                tracing::warn!("MQTT disconnected");
                                state.write().await.connected = false;
                                bus.publish(BusEvent::BridgeDisconnected { host: loop_host.clone() });
                            }
                            Err(e) => {
                                tracing::error!("MQTT error: {}", e);
                                let was_connected = {
                                    let mut state = state.write().await;
                                    std::mem::replace(&mut state.connected, false)
                                };
                                if was_connected {
                                    bus.publish(BusEvent::BridgeDisconnected { host: loop_host.clone() });
                                }
                                tokio::select! {
                                    _ = shutdown.cancelled() => break,
                                    _ = tokio::time::sleep(RECONNECT_DELAY) => {}
                                }
                            }
                            _ => {}
                        }
                    }
                }
            }
        });

        // Bus forwarder: change requests out to the bridge
        let client_clone = self.client.clone();
        let bus_clone = self.bus.clone();
        let shutdown2 = self.shutdown.clone();

        tokio::spawn(async move {
            let mut rx = bus_clone.subscribe();

            loop {
                tokio::select! {
                    _ = shutdown2.cancelled() => {
                        tracing::info!("MQTT bus forwarder shutting down");
                        break;
                    }
                    result = rx.recv() => {
                        let event = match result {
                            Ok(event) => event,
                            Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                                tracing::warn!("MQTT forwarder lagged, skipped {} events", n);
                                continue;
                            }
                            Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                        };
                        let client = client_clone.read().await.clone();
                        let Some(client) = client else { continue };
                        if let Some(result) = Self::forward_event(&client, &base_topic, &event).await {
                            bus_clone.publish(result);
                        }
                    }
                }
            }
        });

        Ok(())
    }

    /// Publish a bus request to the bridge; returns the `ChangeResult` to report.
    async fn forward_event(client: &AsyncClient, base: &str, event: &BusEvent) -> Option<BusEvent> {
        let (friendly_name, topic, payload, success_message) = match event {
            BusEvent::ChangeRequested {
                friendly_name,
                request,
            } => (
                friendly_name,
                set_topic(base, friendly_name, request.target_endpoint()),
                request.patch.clone(),
                format!("Sent {} change(s) to {}", request.patch.len(), friendly_name),
            ),
            BusEvent::SimpleBindRequested {
                friendly_name,
                edit,
            } => {
                let topic = match edit {
                    SimpleBindEdit::StateValue { .. } => set_topic(base, friendly_name, None),
                    SimpleBindEdit::Rule { .. } => simple_bind_topic(base, friendly_name),
                };
                (friendly_name, topic, edit.payload(), edit.success_message())
            }
            _ => return None,
        };

        let result = Self::send(client, &topic, &payload, base, friendly_name).await;
        Some(match result {
            Ok(()) => BusEvent::ChangeResult {
                friendly_name: friendly_name.clone(),
                success: true,
                message: success_message,
            },
            Err(e) => {
                tracing::warn!("Failed to publish to {}: {}", topic, e);
                BusEvent::ChangeResult {
                    friendly_name: friendly_name.clone(),
                    success: false,
                    message: e.to_string(),
                }
            }
        })
    }

    async fn send(
        client: &AsyncClient,
        topic: &str,
        payload: &Map<String, Value>,
        base: &str,
        friendly_name: &str,
    ) -> Result<()> {
        let body = serde_json::to_vec(payload)?;
        client
            .publish(topic, QoS::AtMostOnce, false, body)
            .await?;
        tracing::debug!("Published {} -> {:?}", topic, payload);

        // Ask the bridge for fresh state
        let refetch = serde_json::to_vec(&json!({ "state": "" }))?;
        client
            .publish(get_topic(base, friendly_name), QoS::AtMostOnce, false, refetch)
            .await?;
        Ok(())
    }

    async fn stop_internal(&self) {
        self.shutdown.cancel();

        let mut client = self.client.write().await;
        if let Some(c) = client.take() {
            let _ = c.disconnect().await;
        }

        self.state.write().await.connected = false;

        tracing::info!("MQTT adapter stopped");
    }
}

impl_startable!(BridgeAdapter, "mqtt", is_configured);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::Startable;
    use crate::bus::create_bus;

    fn parse(topic: &str, payload: &[u8]) -> Result<BridgeMessage, ModelError> {
        parse_message("zigbee2mqtt", topic, payload, &HashSet::new())
    }

    #[test]
    fn test_set_topic_with_and_without_endpoint() {
        assert_eq!(set_topic("z2m", "plug", None), "z2m/plug/set");
        assert_eq!(
            set_topic("z2m", "plug", Some(&Endpoint::Name("l1".to_string()))),
            "z2m/plug/l1/set"
        );
        assert_eq!(
            set_topic("z2m", "plug", Some(&Endpoint::Number(2))),
            "z2m/plug/2/set"
        );
        assert_eq!(
            set_topic("z2m", "plug", Some(&Endpoint::Name(String::new()))),
            "z2m/plug/set"
        );
    }

    #[test]
    fn test_other_topics() {
        assert_eq!(devices_topic("zigbee2mqtt"), "zigbee2mqtt/bridge/devices");
        assert_eq!(get_topic("zigbee2mqtt", "lamp"), "zigbee2mqtt/lamp/get");
        assert_eq!(
            simple_bind_topic("zigbee2mqtt", "lamp"),
            "zigbee2mqtt/lamp/simple_bind/set"
        );
    }

    #[test]
    fn test_parse_device_list() {
        let payload = br#"[{"ieee_address":"0x01","friendly_name":"Coordinator","type":"Coordinator"},
                           {"ieee_address":"0x02","friendly_name":"plug","type":"Router"}]"#;
        match parse("zigbee2mqtt/bridge/devices", payload).unwrap() {
            BridgeMessage::Devices(devices) => {
                assert_eq!(devices.len(), 2);
                assert!(devices[0].is_coordinator());
                assert_eq!(devices[1].friendly_name, "plug");
            }
            other => panic!("expected devices, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_state() {
        let msg = parse("zigbee2mqtt/plug", br#"{"state":"ON","power":12}"#)
            .unwrap();
        match msg.into_event() {
            Some(BusEvent::DeviceStateUpdated {
                friendly_name,
                state,
            }) => {
                assert_eq!(friendly_name, "plug");
                assert_eq!(state.power(), Some(12.0));
            }
            other => panic!("expected state update, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_ignores_other_topics() {
        for topic in [
            "zigbee2mqtt/bridge",
            "zigbee2mqtt/bridge/state",
            "zigbee2mqtt/plug/availability",
            "other/plug",
        ] {
            assert_eq!(
                parse(topic, b"{}").unwrap(),
                BridgeMessage::Ignored,
                "{}",
                topic
            );
        }
    }

    #[test]
    fn test_parse_state_for_known_name_with_slash() {
        let known = HashSet::from(["living_room/lamp".to_string()]);
        let msg = parse_message(
            "zigbee2mqtt",
            "zigbee2mqtt/living_room/lamp",
            br#"{"state":"ON"}"#,
            &known,
        )
        .unwrap();
        match msg {
            BridgeMessage::State {
                friendly_name,
                state,
            } => {
                assert_eq!(friendly_name, "living_room/lamp");
                assert_eq!(state.get("state"), Some(&json!("ON")));
            }
            other => panic!("expected state, got {:?}", other),
        }

        // Requests and availability for the same device are not state
        for topic in [
            "zigbee2mqtt/living_room/lamp/set",
            "zigbee2mqtt/living_room/lamp/get",
            "zigbee2mqtt/living_room/lamp/availability",
        ] {
            assert_eq!(
                parse_message("zigbee2mqtt", topic, br#"{"state":"online"}"#, &known).unwrap(),
                BridgeMessage::Ignored,
                "{}",
                topic
            );
        }
    }

    #[test]
    fn test_parse_device_list_skips_unreadable_entries() {
        let payload = br#"[{"ieee_address":"0x01","friendly_name":"plug","type":"Router","power_source":null},
                           {"friendly_name":"broken","network_address":"not a number"},
                           {"ieee_address":"0x03","friendly_name":"contact","type":"EndDevice",
                            "definition":{"exposes":[{"type":"binary","name":"contact","property":"contact","access":1}]}}]"#;
        match parse("zigbee2mqtt/bridge/devices", payload).unwrap() {
            BridgeMessage::Devices(devices) => {
                let names: Vec<_> = devices.iter().map(|d| d.friendly_name.as_str()).collect();
                assert_eq!(names, vec!["plug", "contact"]);
            }
            other => panic!("expected devices, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_empty_payload_is_removal() {
        assert_eq!(
            parse("zigbee2mqtt/plug", b"").unwrap(),
            BridgeMessage::Removed {
                friendly_name: "plug".to_string()
            }
        );
    }

    #[test]
    fn test_parse_rejects_malformed_state() {
        assert!(parse("zigbee2mqtt/plug", b"online").is_err());
        assert!(matches!(
            parse("zigbee2mqtt/plug", b"[1]"),
            Err(ModelError::NotAnObject(_))
        ));
    }

    #[tokio::test]
    async fn test_unconfigured_adapter_cannot_start() {
        let adapter = BridgeAdapter::new(create_bus());
        assert!(!adapter.can_start().await);
        assert!(adapter.start().await.is_err());
        assert_eq!(adapter.name(), "mqtt");
    }

    #[tokio::test]
    async fn test_configure_sets_status() {
        let adapter = BridgeAdapter::new(create_bus());
        adapter
            .configure(&MqttConfig {
                host: "broker.local".to_string(),
                port: 1884,
                username: None,
                password: None,
                base_topic: "z2m".to_string(),
            })
            .await;

        let status = adapter.get_status().await;
        assert!(adapter.is_configured().await);
        assert!(!status.connected);
        assert_eq!(status.host.as_deref(), Some("broker.local"));
        assert_eq!(status.port, 1884);
        assert_eq!(status.base_topic, "z2m");
    }
}
