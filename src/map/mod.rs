//! # Warehouse Map
//!
//! Ties the warehouse model to the scene graph. [`WarehouseMap`] owns the
//! scene, the camera and the selection state; the drawers in [`drawer`] turn
//! parsed entities into nodes and [`selection`] handles clicks.
//!
//! Nothing here touches the GPU, so a map can be built and clicked in tests.
//!
//! ```rust
//! use warehouse3d::{config::MapOptions, map::WarehouseMap, model::Warehouse};
//!
//! let warehouse = Warehouse::parse(r#"{ "type": "FeatureCollection", "features": [] }"#).unwrap();
//! let mut map = WarehouseMap::new(MapOptions::default());
//! map.draw_warehouse(&warehouse).unwrap();
//! assert_eq!(map.scene.mesh_count(), 1); // just the ground
//! ```

pub mod drawer;
pub mod labels;
pub mod selection;

pub use drawer::DrawSummary;
pub use labels::{Label, Labels};
pub use selection::{ResetMode, SelectionEvent};

use cgmath::Vector3;
use log::debug;
use winit::{
    dpi::PhysicalPosition,
    event::{DeviceEvent, KeyEvent},
};

use crate::{
    config::{MapOptions, WarehouseConfig},
    gfx::{
        camera::{CameraController, CameraManager, OrbitCamera},
        scene::{NodeId, Scene},
    },
    theme::Theme,
};

type SelectionListener = Box<dyn FnMut(&SelectionEvent)>;
type GroundListener = Box<dyn FnMut(Vector3<f32>)>;

/// Interactive warehouse map
pub struct WarehouseMap {
    pub scene: Scene,
    pub camera: CameraManager,
    pub config: WarehouseConfig,
    pub theme: Theme,
    selectable: bool,
    selected: Option<NodeId>,
    pointer_down_at: Option<PhysicalPosition<f64>>,
    labels: Labels,
    scene_changed: bool,
    selection_listener: Option<SelectionListener>,
    ground_listener: Option<GroundListener>,
}

impl WarehouseMap {
    pub fn new(options: MapOptions) -> Self {
        let MapOptions {
            config,
            theme,
            selectable,
        } = options;

        let camera = CameraManager::new(
            OrbitCamera::from_config(&config.camera, 1.0),
            CameraController::new(0.005, 10.0),
        );

        let mut map = Self {
            scene: Scene::new(),
            camera,
            labels: Labels::new(config.show_mesh_label),
            config,
            theme,
            selectable,
            selected: None,
            pointer_down_at: None,
            scene_changed: true,
            selection_listener: None,
            ground_listener: None,
        };
        map.camera.camera.update_view_proj();
        map
    }

    pub fn selectable(&self) -> bool {
        self.selectable
    }

    /// With selection off, clicks only move the camera.
    pub fn set_selectable(&mut self, selectable: bool) {
        self.selectable = selectable;
        if !selectable {
            self.pointer_down_at = None;
        }
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    /// Called with every stack or shelf level the user selects.
    pub fn set_selection_listener(&mut self, listener: impl FnMut(&SelectionEvent) + 'static) {
        self.selection_listener = Some(Box::new(listener));
    }

    /// Called with the world point whenever the ground is clicked.
    pub fn set_ground_listener(&mut self, listener: impl FnMut(Vector3<f32>) + 'static) {
        self.ground_listener = Some(Box::new(listener));
    }

    /// Marks the scene for redraw on the next frame.
    pub fn redraw(&mut self) {
        self.scene_changed = true;
    }

    pub fn scene_changed(&self) -> bool {
        self.scene_changed
    }

    /// Returns whether a frame is due and clears the flag.
    pub fn take_scene_changed(&mut self) -> bool {
        std::mem::take(&mut self.scene_changed)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.camera.resize_projection(width, height);
        self.camera_changed();
    }

    pub fn process_device_event(&mut self, event: &DeviceEvent) -> bool {
        let moved = self.camera.process_event(event);
        if moved {
            self.camera_changed();
        }
        moved
    }

    pub fn process_keyboard_event(&mut self, event: &KeyEvent) -> bool {
        let moved = self.camera.process_keyboard_event(event);
        if moved {
            self.camera_changed();
        }
        moved
    }

    /// Refreshes the camera uniform and toggles area labels when the eye
    /// crosses the configured height.
    pub fn camera_changed(&mut self) {
        self.camera.camera.update_view_proj();
        let height = self.camera.camera.height();
        if self
            .labels
            .update_for_camera(height, self.config.critical_point, &self.scene)
        {
            debug!(
                "camera at {height:.1} crossed {}; labels {}",
                self.config.critical_point,
                if self.labels.show_mesh_label() { "on" } else { "off" }
            );
        }
        self.scene_changed = true;
    }
}
