//! HTTP API handlers

use crate::adapters::BridgeAdapter;
use crate::bus::{BusEvent, SharedBus};
use crate::dashboard::DeviceCard;
use crate::model::{ChangeRequest, Device, DeviceState};
use crate::simple_bind::SimpleBindForm;
use crate::store::DeviceStore;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use futures::stream::Stream;
use serde::Serialize;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: DeviceStore,
    pub mqtt: Arc<BridgeAdapter>,
    pub bus: SharedBus,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(store: DeviceStore, mqtt: Arc<BridgeAdapter>, bus: SharedBus) -> Self {
        Self {
            store,
            mqtt,
            bus,
            started_at: Instant::now(),
        }
    }
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("device not found: {0}")]
    DeviceNotFound(String),
    #[error("change request has an empty patch")]
    EmptyChange,
    #[error("simple bind parameter name is empty")]
    EmptyParameter,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::DeviceNotFound(_) => StatusCode::NOT_FOUND,
            Self::EmptyChange | Self::EmptyParameter => StatusCode::BAD_REQUEST,
        }
    }
}

/// Error response
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

// =============================================================================
// Status
// =============================================================================

#[derive(Serialize)]
pub struct StatusResponse {
    pub service: &'static str,
    pub version: &'static str,
    pub git_sha: &'static str,
    pub uptime_secs: u64,
    pub mqtt_connected: bool,
    pub base_topic: String,
    pub devices: usize,
    pub bus_subscribers: usize,
}

/// GET /status - Service health check
pub async fn status_handler(State(state): State<AppState>) -> Json<StatusResponse> {
    let mqtt_status = state.mqtt.get_status().await;

    Json(StatusResponse {
        service: "zigbee-dashboard",
        version: env!("ZD_VERSION"),
        git_sha: env!("ZD_GIT_SHA"),
        uptime_secs: state.started_at.elapsed().as_secs(),
        mqtt_connected: mqtt_status.connected,
        base_topic: mqtt_status.base_topic,
        devices: state.store.device_count().await,
        bus_subscribers: state.bus.subscriber_count(),
    })
}

// =============================================================================
// Devices
// =============================================================================

/// GET /devices - All devices known to the bridge
pub async fn devices_handler(State(state): State<AppState>) -> Json<Vec<Device>> {
    Json(state.store.devices().await)
}

#[derive(Serialize)]
pub struct DeviceResponse {
    pub device: Device,
    pub state: DeviceState,
}

/// GET /devices/{name} - Device description plus latest state
pub async fn device_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<DeviceResponse>, ApiError> {
    let device = state
        .store
        .device(&name)
        .await
        .ok_or_else(|| ApiError::DeviceNotFound(name.clone()))?;
    let device_state = state.store.state(&name).await;
    Ok(Json(DeviceResponse {
        device,
        state: device_state,
    }))
}

/// GET /devices/{name}/card - Dashboard card render instructions
pub async fn device_card_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<DeviceCard>, ApiError> {
    state
        .store
        .card(&name)
        .await
        .map(Json)
        .ok_or(ApiError::DeviceNotFound(name))
}

#[derive(Serialize)]
pub struct AcceptedResponse {
    pub accepted: bool,
}

/// POST /devices/{name}/set - Forward a change request to the bridge
///
/// Fire-and-forget: the outcome arrives later as a `ChangeResult` event.
pub async fn device_set_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(request): Json<ChangeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if state.store.device(&name).await.is_none() {
        return Err(ApiError::DeviceNotFound(name));
    }
    if request.patch.is_empty() {
        return Err(ApiError::EmptyChange);
    }

    tracing::debug!("Change requested for {}: {:?}", name, request.patch);
    let request = ChangeRequest::new(request.endpoint, request.patch);
    state.bus.publish(BusEvent::ChangeRequested {
        friendly_name: name,
        request,
    });

    Ok((StatusCode::ACCEPTED, Json(AcceptedResponse { accepted: true })))
}

/// POST /devices/{name}/simple_bind - Edit a state value or simple-bind rule
pub async fn simple_bind_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(form): Json<SimpleBindForm>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(device) = state.store.device(&name).await else {
        return Err(ApiError::DeviceNotFound(name));
    };
    if form.name.trim().is_empty() {
        return Err(ApiError::EmptyParameter);
    }

    let edit = form.into_edit(device.network_address);
    tracing::debug!(
        "Simple bind edit for {} (0x{:04x}): {}",
        name,
        edit.nwk_addr(),
        edit.name()
    );

    state.bus.publish(BusEvent::SimpleBindRequested {
        friendly_name: name,
        edit,
    });

    Ok((StatusCode::ACCEPTED, Json(AcceptedResponse { accepted: true })))
}

// =============================================================================
// Events
// =============================================================================

/// GET /events - SSE stream of bus events
pub async fn events_handler(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.bus.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(event) => match serde_json::to_string(&event) {
            Ok(json) => Some(Ok(Event::default().event(event.name()).data(json))),
            Err(_) => None,
        },
        // Skip lagged messages
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}
