//! Layout component wrapping all pages with Pico CSS and common elements.

use dioxus::prelude::*;

use super::nav::Nav;

/// Client glue shared by every page.
///
/// Controls are plain server-rendered markup carrying `data-*` attributes;
/// these delegated listeners turn interactions into POSTs and surface
/// `ChangeResult` events as notifications.
const SHARED_JS: &str = r#"
function esc(s) { return String(s ?? '').replace(/[&<>"']/g, c => ({'&':'&amp;','<':'&lt;','>':'&gt;','"':'&quot;',"'":'&#39;'})[c]); }

function notify(message, ok) {
    const box = document.getElementById('notifications');
    if (!box) return;
    const el = document.createElement('p');
    el.className = ok ? 'status-ok' : 'status-err';
    el.textContent = message;
    box.appendChild(el);
    setTimeout(() => el.remove(), 4000);
}

async function postJson(url, body) {
    const res = await fetch(url, {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify(body)
    });
    if (!res.ok) {
        const err = await res.json().catch(() => ({ error: res.statusText }));
        notify(err.error || res.statusText, false);
    }
}

function parseInput(raw) {
    try { return JSON.parse(raw); } catch (_) { return raw; }
}

function sendChange(device, endpoint, patch) {
    const body = { patch };
    if (endpoint) body.endpoint = parseInput(endpoint);
    return postJson('/devices/' + encodeURIComponent(device) + '/set', body);
}

// Toggles carry a complete request in data-change
document.addEventListener('change', e => {
    const el = e.target;
    const device = el.closest('[data-device]')?.dataset.device;
    if (!device) return;
    // Select options carry their own request
    const source = el.tagName === 'SELECT' ? el.selectedOptions[0] : el;
    if (source?.dataset.change) {
        postJson('/devices/' + encodeURIComponent(device) + '/set', JSON.parse(source.dataset.change));
    } else if (el.dataset.property) {
        const value = el.type === 'number' ? Number(el.value) : el.value;
        sendChange(device, el.dataset.endpoint, { [el.dataset.property]: value });
    } else if (el.dataset.simpleBind) {
        postJson('/devices/' + encodeURIComponent(device) + '/simple_bind', {
            kind: el.dataset.simpleBind,
            name: el.dataset.parameter,
            value: el.value
        });
    }
});

// Presets
document.addEventListener('click', e => {
    const el = e.target.closest('button[data-change]');
    if (!el) return;
    const device = el.closest('[data-device]')?.dataset.device;
    if (!device) return;
    postJson('/devices/' + encodeURIComponent(device) + '/set', JSON.parse(el.dataset.change));
});

const es = new EventSource('/events');
es.addEventListener('ChangeResult', e => {
    const event = JSON.parse(e.data);
    notify(event.payload.message, event.payload.success);
});
"#;

/// CSS styles for the application (extends Pico CSS).
const CUSTOM_STYLES: &str = r#"
:root { --pico-font-size: 15px; }
.status-ok { color: var(--pico-ins-color); }
.status-err { color: var(--pico-del-color); }
.device-grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(280px, 1fr)); gap: 1rem; }
.entity { display: flex; align-items: center; gap: 0.5rem; }
.entity .title { flex: 1; }
.text-danger { color: var(--pico-del-color); }
.text-warning { color: #e0a000; }
.text-info, .text-primary { color: var(--pico-primary); }
.text-muted { color: var(--pico-muted-color); }
#notifications { position: fixed; bottom: 1rem; right: 1rem; }
small { color: var(--pico-muted-color); }
"#;

#[derive(Props, Clone, PartialEq)]
pub struct LayoutProps {
    /// Page title (shown in browser tab)
    pub title: String,
    /// Active navigation item ID
    pub nav_active: String,
    /// Page content
    pub children: Element,
    /// Optional additional scripts to include
    #[props(default)]
    pub scripts: Option<String>,
}

/// Main layout component wrapping all pages.
#[component]
pub fn Layout(props: LayoutProps) -> Element {
    let version = env!("ZD_VERSION");

    rsx! {
        head {
            meta { charset: "utf-8" }
            meta { name: "viewport", content: "width=device-width, initial-scale=1" }
            title { "{props.title} - Zigbee Dashboard" }
            link {
                rel: "stylesheet",
                href: "https://cdn.jsdelivr.net/npm/@picocss/pico@2/css/pico.min.css"
            }
            link {
                rel: "stylesheet",
                href: "https://cdn.jsdelivr.net/npm/@fortawesome/fontawesome-free@5/css/all.min.css"
            }
            style { {CUSTOM_STYLES} }
        }
        body {
            header { class: "container",
                Nav { active: props.nav_active.clone() }
            }
            main { class: "container",
                {props.children}
            }
            footer { class: "container",
                small { "Zigbee Dashboard v{version}" }
            }
            div { id: "notifications" }
            script { dangerous_inner_html: SHARED_JS }
            if let Some(scripts) = props.scripts {
                script { dangerous_inner_html: "{scripts}" }
            }
        }
    }
}
