//! Area name labels.
//!
//! A label belongs to a named area and is either shown or hidden. Clicking an
//! area flips its label; so does the camera dropping below (or rising above)
//! the configured critical height, which flips every area at once.

use std::collections::BTreeSet;

use cgmath::{Matrix4, Vector3, Vector4};

use crate::gfx::scene::{NodeData, NodeId, Scene};

/// A label ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub node: NodeId,
    pub text: String,
    /// Top centre of the area in world space.
    pub anchor: Vector3<f32>,
}

#[derive(Debug, Default)]
pub struct Labels {
    show_mesh_label: bool,
    shown: BTreeSet<NodeId>,
}

fn area_name(scene: &Scene, node: NodeId) -> Option<&str> {
    match &scene.get(node)?.data {
        NodeData::Area { name: Some(name), .. } if !name.is_empty() => Some(name),
        _ => None,
    }
}

impl Labels {
    pub fn new(show_mesh_label: bool) -> Self {
        Self {
            show_mesh_label,
            shown: BTreeSet::new(),
        }
    }

    /// Whether the camera is currently below the critical height.
    pub fn show_mesh_label(&self) -> bool {
        self.show_mesh_label
    }

    pub fn is_shown(&self, node: NodeId) -> bool {
        self.shown.contains(&node)
    }

    /// Flips the label of a named area. Returns whether it is now shown;
    /// unnamed areas and other nodes never get one.
    pub fn toggle(&mut self, scene: &Scene, node: NodeId) -> bool {
        if area_name(scene, node).is_none() {
            return false;
        }
        if !self.shown.remove(&node) {
            self.shown.insert(node);
        }
        self.is_shown(node)
    }

    /// Flips every area label.
    pub fn toggle_all(&mut self, scene: &Scene) {
        let areas: Vec<NodeId> = scene.children(scene.root()).to_vec();
        for node in areas {
            self.toggle(scene, node);
        }
    }

    /// Tracks the camera height against `critical_point`. Returns `true`
    /// when the height crossed it and every label was flipped.
    pub fn update_for_camera(&mut self, height: f32, critical_point: f32, scene: &Scene) -> bool {
        let below = height <= critical_point;
        if below == self.show_mesh_label {
            return false;
        }
        self.show_mesh_label = below;
        self.toggle_all(scene);
        true
    }

    pub fn clear(&mut self) {
        self.shown.clear();
    }

    /// Shown labels with their anchors.
    pub fn labels(&self, scene: &Scene) -> Vec<Label> {
        self.shown
            .iter()
            .filter_map(|&node| {
                let text = area_name(scene, node)?.to_string();
                let (min, max) = scene.world_bounds(node)?;
                let anchor = Vector3::new((min.x + max.x) * 0.5, max.y, (min.z + max.z) * 0.5);
                Some(Label { node, text, anchor })
            })
            .collect()
    }
}

/// Projects a world point to window pixels, `None` when it is behind the
/// camera or outside the view volume.
pub fn project(point: Vector3<f32>, view_proj: Matrix4<f32>, size: [f32; 2]) -> Option<[f32; 2]> {
    let clip = view_proj * Vector4::new(point.x, point.y, point.z, 1.0);
    if clip.w <= 0.0 {
        return None;
    }
    let ndc = clip.truncate() / clip.w;
    if !(-1.0..=1.0).contains(&ndc.x) || !(-1.0..=1.0).contains(&ndc.y) || !(0.0..=1.0).contains(&ndc.z) {
        return None;
    }
    Some([
        (ndc.x + 1.0) * 0.5 * size[0],
        (1.0 - ndc.y) * 0.5 * size[1],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::MapOptions,
        gfx::camera::Camera,
        map::WarehouseMap,
        model::{Area, AreaColor},
    };
    use cgmath::Vector2;

    fn area(name: Option<&str>, x: f32) -> Area {
        Area {
            id: Some(format!("a{x}")),
            name: name.map(str::to_string),
            color: AreaColor::Primary,
            height: 10.0,
            outline: vec![
                Vector2::new(x, 0.0),
                Vector2::new(x + 40.0, 0.0),
                Vector2::new(x + 40.0, 20.0),
                Vector2::new(x, 20.0),
            ],
        }
    }

    #[test]
    fn only_named_areas_get_labels() {
        let mut map = WarehouseMap::new(MapOptions::default());
        let named = map.draw_area(&area(Some("Dock"), 0.0)).unwrap();
        let unnamed = map.draw_area(&area(None, 100.0)).unwrap();

        let mut labels = Labels::new(false);
        assert!(labels.toggle(&map.scene, named));
        assert!(!labels.toggle(&map.scene, unnamed));

        let shown = labels.labels(&map.scene);
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].text, "Dock");
        assert!((shown[0].anchor.x - 20.0).abs() < 1e-4);
        assert!((shown[0].anchor.y - 12.0).abs() < 1e-4);
        assert!((shown[0].anchor.z + 10.0).abs() < 1e-4);

        assert!(!labels.toggle(&map.scene, named));
        assert!(labels.labels(&map.scene).is_empty());
    }

    #[test]
    fn crossing_the_critical_height_flips_every_label() {
        let mut map = WarehouseMap::new(MapOptions::default());
        let a = map.draw_area(&area(Some("A"), 0.0)).unwrap();
        let b = map.draw_area(&area(Some("B"), 100.0)).unwrap();

        let mut labels = Labels::new(false);
        labels.toggle(&map.scene, b);

        assert!(!labels.update_for_camera(400.0, 300.0, &map.scene));
        assert!(labels.update_for_camera(250.0, 300.0, &map.scene));
        assert!(labels.show_mesh_label());
        assert!(labels.is_shown(a));
        assert!(!labels.is_shown(b));

        // Staying below does nothing
        assert!(!labels.update_for_camera(200.0, 300.0, &map.scene));
        assert!(labels.update_for_camera(350.0, 300.0, &map.scene));
        assert!(!labels.is_shown(a));
        assert!(labels.is_shown(b));
    }

    #[test]
    fn zooming_the_map_camera_turns_labels_on() {
        let mut map = WarehouseMap::new(MapOptions::default());
        let dock = map.draw_area(&area(Some("Dock"), 0.0)).unwrap();

        // Default eye height is 500, well above the critical point
        map.camera_changed();
        assert!(!map.labels().is_shown(dock));

        map.camera.camera.set_distance(300.0);
        map.camera_changed();
        assert!(map.labels().show_mesh_label());
        assert!(map.labels().is_shown(dock));
    }

    #[test]
    fn projection_hits_screen_centre() {
        let map = WarehouseMap::new(MapOptions::default());
        let camera = &map.camera.camera;
        let view_proj = camera.build_view_projection_matrix();

        let centre = project(camera.target, view_proj, [800.0, 600.0]).unwrap();
        assert!((centre[0] - 400.0).abs() < 1e-2);
        assert!((centre[1] - 300.0).abs() < 1e-2);

        let behind = camera.eye + (camera.eye - camera.target);
        assert!(project(behind, view_proj, [800.0, 600.0]).is_none());
    }
}
