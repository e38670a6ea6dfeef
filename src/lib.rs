//! Zigbee Dashboard
//!
//! A web dashboard for a Zigbee-to-MQTT bridge. Devices describe
//! themselves through a tree of exposed features; this crate turns those
//! descriptions plus live state snapshots into dashboard cards, per-feature
//! controls and a simple-bind editor.
//!
//! This library provides:
//! - Typed bridge device/feature/state model
//! - Capability classification and dashboard block selection
//! - Access-gated feature controls
//! - MQTT transport to the bridge
//! - Server-Sent Events for real-time updates
//! - Web UI rendered with Dioxus SSR (Pico CSS)

pub mod dashboard;
pub mod features;
pub mod model;
pub mod simple_bind;

#[cfg(feature = "server")]
pub mod adapters;
#[cfg(feature = "server")]
pub mod api;
#[cfg(feature = "server")]
pub mod bus;
#[cfg(feature = "server")]
pub mod config;
#[cfg(feature = "server")]
pub mod store;
#[cfg(feature = "server")]
pub mod ui;
