//! Device page component.
//!
//! Dashboard card on top, then one control per exposed feature and the
//! simple-bind table.

use dioxus::prelude::*;

use crate::dashboard::DeviceCard;
use crate::features::FeatureControl;
use crate::simple_bind::SimpleBindView;
use crate::ui::components::{DeviceCardView, FeatureControlView, Layout, SimpleBindTable};

/// Reload when this device reports new state or the device list changes
/// (parameters and simple-bind rules arrive with the list).
fn device_script(friendly_name: &str) -> String {
    let name = serde_json::to_string(friendly_name).unwrap_or_default();
    format!(
        r#"
const deviceName = {name};
let reloadTimer = null;
es.addEventListener('DeviceStateUpdated', e => {{
    const event = JSON.parse(e.data);
    if (event.payload.friendly_name !== deviceName) return;
    clearTimeout(reloadTimer);
    reloadTimer = setTimeout(() => location.reload(), 1500);
}});
es.addEventListener('DevicesUpdated', () => {{
    clearTimeout(reloadTimer);
    reloadTimer = setTimeout(() => location.reload(), 1500);
}});
"#
    )
}

#[component]
pub fn DevicePage(
    friendly_name: String,
    card: DeviceCard,
    controls: Vec<FeatureControl>,
    simple_bind: SimpleBindView,
) -> Element {
    rsx! {
        Layout {
            title: friendly_name.clone(),
            nav_active: "device".to_string(),
            scripts: Some(device_script(&friendly_name)),

            h1 { "{friendly_name}" }

            DeviceCardView { card }

            section { "data-device": "{friendly_name}",
                h2 { "Features" }
                if controls.is_empty() {
                    p { small { "This device exposes no features." } }
                }
                for control in controls {
                    FeatureControlView { control }
                }
            }

            section { "data-device": "{friendly_name}",
                h2 { "Simple bind" }
                SimpleBindTable { view: simple_bind }
            }
        }
    }
}

#[component]
pub fn DeviceMissing(friendly_name: String) -> Element {
    rsx! {
        Layout {
            title: "Unknown device".to_string(),
            nav_active: "device".to_string(),

            h1 { "{friendly_name}" }
            article { aria_busy: "true", "Device not known to the bridge yet." }
        }
    }
}
