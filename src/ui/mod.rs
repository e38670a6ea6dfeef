//! Web UI handlers
//!
//! Pages are Dioxus components rendered to HTML on the server (Pico CSS,
//! Font Awesome icons). Interactive controls post change requests back
//! through the JSON API; see `components::layout` for the client glue.

pub mod components;
pub mod pages;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use dioxus::prelude::*;

use crate::api::AppState;
use crate::dashboard::DeviceCard;
use crate::features::select_controls;
use crate::simple_bind::SimpleBindView;
use pages::{DashboardPage, DeviceMissing, DevicePage};

fn html_document(body: String) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html lang=\"en\" data-theme=\"dark\">\n{}</html>",
        body
    ))
}

/// GET / - One card per device
pub async fn dashboard_page(State(state): State<AppState>) -> impl IntoResponse {
    let cards = state.store.cards().await;
    let connected = state.mqtt.get_status().await.connected;
    let html = dioxus::ssr::render_element(rsx! { DashboardPage { cards, connected } });
    html_document(html)
}

/// GET /device/{name} - Feature controls and simple-bind table for one device
pub async fn device_page(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Response {
    let device = state.store.device(&name).await;
    let device_state = state.store.state(&name).await;

    let Some(device) = device else {
        let html = dioxus::ssr::render_element(rsx! {
            DeviceMissing { friendly_name: name }
        });
        return (StatusCode::NOT_FOUND, html_document(html)).into_response();
    };

    let card = DeviceCard::for_device(&device, &device_state);
    let controls = device
        .exposes()
        .map(|features| select_controls(features, &device_state))
        .unwrap_or_default();
    let simple_bind = SimpleBindView::from_device(Some(&device));

    let html = dioxus::ssr::render_element(rsx! {
        DevicePage {
            friendly_name: device.friendly_name.clone(),
            card,
            controls,
            simple_bind,
        }
    });
    html_document(html).into_response()
}
