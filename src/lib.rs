// src/lib.rs
//! warehouse3d
//!
//! Interactive 3D warehouse floor plans built on wgpu and winit. A GeoJSON
//! layout of areas, shelves and stacks is turned into a scene graph that can
//! be orbited and clicked.
//!
//! ```no_run
//! use warehouse3d::{app::WarehouseApp, config::MapOptions, model::Warehouse};
//!
//! let warehouse = Warehouse::load("assets/json/all.json")?;
//! let mut app = WarehouseApp::new(MapOptions::default())?;
//! app.load(&warehouse)?;
//! app.run()?;
//! # Ok::<(), warehouse3d::error::WarehouseError>(())
//! ```

pub mod app;
pub mod config;
pub mod error;
pub mod geojson;
pub mod gfx;
pub mod map;
pub mod model;
pub mod performance;
pub mod theme;
pub mod ui;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::WarehouseApp;
pub use error::{Result, WarehouseError};
pub use map::WarehouseMap;
