//! Top navigation bar.

use dioxus::prelude::*;

#[component]
pub fn Nav(active: String) -> Element {
    let current = if active == "dashboard" { "page" } else { "false" };

    rsx! {
        nav {
            ul {
                li { strong { "Zigbee Dashboard" } }
            }
            ul {
                li {
                    a { href: "/", "aria-current": current, "Dashboard" }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dashboard_link_marked_current_only_on_dashboard() {
        let html = dioxus::ssr::render_element(rsx! { Nav { active: "dashboard".to_string() } });
        assert!(html.contains(r#"aria-current="page""#));

        let html = dioxus::ssr::render_element(rsx! { Nav { active: "device".to_string() } });
        assert!(!html.contains(r#"aria-current="page""#));
    }
}
