//! Dashboard page component.
//!
//! One card per device, rendered server-side from `DeviceCard` trees.

use dioxus::prelude::*;

use crate::dashboard::DeviceCard;
use crate::ui::components::{DeviceCardView, Layout};

/// Reload once state settles so cards reflect the latest snapshot.
const DASHBOARD_SCRIPT: &str = r#"
let reloadTimer = null;
es.addEventListener('DeviceStateUpdated', () => {
    clearTimeout(reloadTimer);
    reloadTimer = setTimeout(() => location.reload(), 1500);
});
es.addEventListener('DevicesUpdated', () => location.reload());
"#;

#[component]
pub fn DashboardPage(cards: Vec<DeviceCard>, connected: bool) -> Element {
    rsx! {
        Layout {
            title: "Dashboard".to_string(),
            nav_active: "dashboard".to_string(),
            scripts: Some(DASHBOARD_SCRIPT.to_string()),

            h1 { "Dashboard" }

            if !connected {
                p { class: "status-err", "Bridge disconnected" }
            }

            if cards.is_empty() {
                article { aria_busy: "true", "Waiting for devices..." }
            } else {
                section { class: "device-grid",
                    for card in cards {
                        DeviceCardView { card }
                    }
                }
            }
        }
    }
}
