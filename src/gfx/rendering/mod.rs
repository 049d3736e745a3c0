//! Core rendering functionality
//!
//! Handles render pipelines, the helper line overlays and frame rendering.

pub mod helpers;
pub mod pipeline_manager;
pub mod render_engine;

// Re-export main types
pub use helpers::{axes_lines, grid_lines, LineBuffer, LineVertex};
pub use pipeline_manager::{PipelineConfig, PipelineManager, VertexLayout};
pub use render_engine::{FrameStatus, RenderEngine};
