//! # User Interface Module
//!
//! Dear ImGui overlay for the warehouse viewer.
//!
//! - [`UiManager`] - ImGui integration with winit and wgpu, input capture
//!   and frame rendering
//! - [`panel`] - The map panel (counts, selection inspector, toggles) and
//!   the area labels
//!
//! When the UI wants the mouse or keyboard, camera controls and click
//! selection are skipped so dragging a window never orbits the map.

pub mod manager;
pub mod panel;

// Re-export main types
pub use manager::UiManager;
pub use panel::{default_map_panel, draw_labels};
