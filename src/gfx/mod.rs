//! # Graphics Module
//!
//! Everything between the warehouse map and the GPU: camera, procedural
//! geometry, the scene graph, picking and the wgpu renderer.
//!
//! ## Architecture Overview
//!
//! - **Camera System** ([`camera`]) - Orbit camera with distance and tilt limits
//! - **Geometry** ([`geometry`]) - Boxes and extruded plan polygons
//! - **Scene Management** ([`scene`]) - Node hierarchy with per-mesh materials
//! - **Picking** ([`picking`]) - Screen rays against scene meshes
//! - **Rendering Pipeline** ([`rendering`]) - Lit meshes, transparency and helper lines
//! - **Resource Management** ([`resources`]) - Uniforms, materials and the depth buffer
//!
//! Only [`rendering`] and the GPU halves of [`resources`] and [`scene`] need a
//! device; the rest runs headless.
//!
//! ```no_run
//! use warehouse3d::gfx::{scene::Scene, RenderEngine};
//!
//! // The render engine is created by the app once a window exists
//! // let render_engine = RenderEngine::new(window, width, height).await?;
//! let scene = Scene::new();
//! assert!(scene.is_empty());
//! ```

pub mod camera;
pub mod geometry;
pub mod picking;
pub mod rendering;
pub mod resources;
pub mod scene;

// Re-export commonly used types
pub use camera::orbit_camera::OrbitCamera;
pub use rendering::render_engine::RenderEngine;
