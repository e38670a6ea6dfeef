//! Shared UI components for the Dioxus-based web UI.

pub mod device_card;
pub mod feature_controls;
pub mod layout;
pub mod nav;
pub mod simple_bind;

pub use device_card::DeviceCardView;
pub use feature_controls::FeatureControlView;
pub use layout::Layout;
pub use nav::Nav;
pub use simple_bind::SimpleBindTable;
