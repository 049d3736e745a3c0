//! Runtime configuration for the warehouse map.
//!
//! Every field has a default so a config file only needs the values it
//! changes:
//!
//! ```json
//! { "groundHeight": 4, "camera": { "maxDistance": 1500 } }
//! ```

use std::{f32::consts::PI, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    error::{self, Result},
    theme::Theme,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WarehouseConfig {
    /// Thickness of the ground slab; everything else sits on top of it.
    pub ground_height: f32,
    /// Thickness of a shelf level's top and bottom boards.
    pub surface_height: f32,
    /// Keep shelf poles inside the footprint instead of outset past it.
    pub use_inherit_style: bool,
    /// Camera height below which area labels switch on.
    pub critical_point: f32,
    /// Initial label state.
    pub show_mesh_label: bool,
    pub ground: GroundConfig,
    pub camera: CameraConfig,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            ground_height: 2.0,
            surface_height: 1.0,
            use_inherit_style: true,
            critical_point: 300.0,
            show_mesh_label: false,
            ground: GroundConfig::default(),
            camera: CameraConfig::default(),
        }
    }
}

impl WarehouseConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = error::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GroundConfig {
    pub width: f32,
    pub depth: f32,
    /// Plan coordinates of the ground's first corner.
    pub origin: [f32; 2],
}

impl Default for GroundConfig {
    fn default() -> Self {
        Self {
            width: 960.0,
            depth: 630.0,
            origin: [10.0, 10.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CameraConfig {
    pub fovy_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub min_distance: f32,
    pub max_distance: f32,
    /// Largest angle between the camera and straight up, in radians.
    pub max_polar_angle: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fovy_degrees: 50.0,
            near: 0.1,
            far: 2000.0,
            position: [0.0, 500.0, 500.0],
            target: [0.0, 0.0, 0.0],
            min_distance: 200.0,
            max_distance: 1000.0,
            max_polar_angle: 0.9 * PI / 2.0,
        }
    }
}

/// Everything needed to build a [`crate::map::WarehouseMap`].
#[derive(Debug, Clone)]
pub struct MapOptions {
    pub config: WarehouseConfig,
    pub theme: Theme,
    pub selectable: bool,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            config: WarehouseConfig::default(),
            theme: Theme::default(),
            selectable: true,
        }
    }
}

impl MapOptions {
    pub fn with_config(mut self, config: WarehouseConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn with_selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = WarehouseConfig::default();
        assert_eq!(config.ground_height, 2.0);
        assert_eq!(config.surface_height, 1.0);
        assert!(config.use_inherit_style);
        assert_eq!(config.critical_point, 300.0);
        assert_eq!(config.ground.origin, [10.0, 10.0]);
        assert_eq!(config.camera.position, [0.0, 500.0, 500.0]);
    }

    #[test]
    fn partial_json_overrides_only_given_fields() {
        let config: WarehouseConfig =
            serde_json::from_str(r#"{ "groundHeight": 4, "camera": { "maxDistance": 1500 } }"#)
                .unwrap();
        assert_eq!(config.ground_height, 4.0);
        assert_eq!(config.camera.max_distance, 1500.0);
        assert_eq!(config.camera.min_distance, 200.0);
        assert_eq!(config.surface_height, 1.0);
    }

    #[test]
    fn missing_config_file_reports_path() {
        let err = WarehouseConfig::from_file("does/not/exist.json").unwrap_err();
        assert!(err.to_string().contains("does/not/exist.json"));
    }
}
