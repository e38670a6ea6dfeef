//! Zigbee Dashboard - web UI for a zigbee2mqtt bridge

use zigbee_dashboard::{adapters, api, bus, config, store, ui};

use adapters::Startable;
use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "zigbee_dashboard=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Starting Zigbee Dashboard v{} ({})",
        env!("ZD_VERSION"),
        env!("ZD_GIT_SHA")
    );

    // Load configuration
    let config = config::load_config()?;
    tracing::info!("Configuration loaded, port: {}", config.port);

    // Create event bus
    let bus = bus::create_bus();
    tracing::info!("Event bus initialized");

    // Device store follows the bus
    let store = store::DeviceStore::new(bus.clone());
    let store_task = {
        let store = store.clone();
        tokio::spawn(async move { store.run().await })
    };

    // Initialize MQTT bridge adapter
    let mqtt = Arc::new(adapters::BridgeAdapter::new(bus.clone()));
    if let Some(ref mqtt_config) = config.mqtt {
        mqtt.configure(mqtt_config).await;
    }
    if mqtt.can_start().await {
        if let Err(e) = mqtt.start().await {
            tracing::warn!("Failed to start {} adapter: {}", mqtt.name(), e);
        } else {
            tracing::info!("MQTT adapter started");
        }
    } else {
        tracing::warn!("No MQTT broker configured (set ZD_MQTT__HOST); dashboard will stay empty");
    }

    let state = api::AppState::new(store, mqtt.clone(), bus.clone());

    // Build API routes
    let app = Router::new()
        // Health check
        .route("/status", get(api::status_handler))
        // Device routes
        .route("/devices", get(api::devices_handler))
        .route("/devices/{name}", get(api::device_handler))
        .route("/devices/{name}/card", get(api::device_card_handler))
        .route("/devices/{name}/set", post(api::device_set_handler))
        .route("/devices/{name}/simple_bind", post(api::simple_bind_handler))
        // Event stream (SSE)
        .route("/events", get(api::events_handler))
        // Web UI routes
        .route("/", get(ui::dashboard_page))
        .route("/device/{name}", get(ui::device_page))
        // Middleware
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server with graceful shutdown
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Cleanup
    tracing::info!("Shutting down...");
    bus.publish(bus::BusEvent::ShuttingDown {
        reason: Some("signal".to_string()),
    });
    mqtt.stop().await;
    if let Err(e) = store_task.await {
        tracing::warn!("Device store task failed: {}", e);
    }
    tracing::info!("Shutdown complete");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
