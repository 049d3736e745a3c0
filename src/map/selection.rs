//! Click selection and highlight state.
//!
//! A click fades every mesh, then brings back what matters for the nearest
//! hit: clicking a stack highlights it and restores the shelf level it sits
//! on; clicking a shelf level highlights the level and restores its shelf
//! together with the stacks placed on that level.

use cgmath::Vector2;
use log::debug;
use winit::{
    dpi::{PhysicalPosition, PhysicalSize},
    event::MouseButton,
};

use super::WarehouseMap;
use crate::{
    gfx::{
        picking::{intersect_scene, screen_to_ray, Ray},
        resources::Material,
        scene::{NodeData, NodeId, Scene},
    },
    model::EntityType,
};

/// Opacity of every mesh while something is selected.
pub const FADED_OPACITY: f32 = 0.1;
/// Opacity of a selected stack.
pub const SELECTED_OPACITY: f32 = 0.7;
/// Used by fade-in when a mesh's own opacity is zero.
pub const FADE_IN_FALLBACK_OPACITY: f32 = 0.7;

/// Which material properties [`WarehouseMap::reset`] restores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResetMode {
    #[default]
    All,
    Color,
    Opacity,
}

/// Sent to the selection listener.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionEvent {
    Stack {
        node: NodeId,
        id: Option<String>,
        shelf_id: Option<String>,
        shelf_level: u32,
    },
    ShelfLevel {
        node: NodeId,
        shelf_id: Option<String>,
        level: u32,
    },
    /// Any other top-level mesh or group.
    Other { node: NodeId },
}

impl SelectionEvent {
    pub fn node(&self) -> NodeId {
        match self {
            SelectionEvent::Stack { node, .. }
            | SelectionEvent::ShelfLevel { node, .. }
            | SelectionEvent::Other { node } => *node,
        }
    }
}

fn material_mut(scene: &mut Scene, id: NodeId) -> Option<&mut Material> {
    scene.node_mut(id).mesh_mut().map(|mesh| &mut mesh.material)
}

/// Restores every mesh at or below `id`.
fn reset_node(scene: &mut Scene, id: NodeId, mode: ResetMode) {
    for mesh in scene.descendant_meshes(id) {
        if let Some(material) = material_mut(scene, mesh) {
            match mode {
                ResetMode::All => material.restore(),
                ResetMode::Color => material.restore_color(),
                ResetMode::Opacity => material.restore_opacity(),
            }
        }
    }
}

/// Opacity set on a group when the group has one, looking up through its
/// ancestors.
fn group_opacity(scene: &Scene, id: NodeId) -> Option<f32> {
    let mut current = Some(id);
    while let Some(node) = current {
        if let Some(style) = scene.node(node).group_style() {
            return Some(style.opacity);
        }
        current = scene.parent(node);
    }
    None
}

/// Converts a window position to normalized device coordinates.
pub fn to_ndc(position: PhysicalPosition<f64>, size: PhysicalSize<u32>) -> Vector2<f32> {
    let width = size.width.max(1) as f32;
    let height = size.height.max(1) as f32;
    Vector2::new(
        position.x as f32 / width * 2.0 - 1.0,
        -(position.y as f32 / height) * 2.0 + 1.0,
    )
}

impl WarehouseMap {
    /// Remembers where the left button went down.
    pub fn pointer_down(&mut self, button: MouseButton, position: PhysicalPosition<f64>) {
        if self.selectable && button == MouseButton::Left {
            self.pointer_down_at = Some(position);
        }
    }

    /// Runs a selection when the left button is released where it was
    /// pressed. Anything else was a camera drag. Returns whether a selection
    /// pass ran.
    pub fn pointer_up(
        &mut self,
        button: MouseButton,
        position: PhysicalPosition<f64>,
        viewport: PhysicalSize<u32>,
    ) -> bool {
        if !self.selectable || button != MouseButton::Left {
            return false;
        }
        if self.pointer_down_at.take() != Some(position) {
            return false;
        }

        let ray = screen_to_ray(to_ndc(position, viewport), &self.camera.camera);
        self.select_at(&ray)
    }

    /// Selects whatever the ray hits first. Returns `false` when nothing is
    /// hit, in which case the scene is left alone.
    pub fn select_at(&mut self, ray: &Ray) -> bool {
        if !self.selectable {
            return false;
        }
        let Some(hit) = intersect_scene(ray, &self.scene).into_iter().next() else {
            return false;
        };

        self.redraw();
        self.fade_out_all();

        match self.scene.node(hit.node).entity_type() {
            Some(EntityType::Ground) => {
                debug!("ground clicked at {:?}", hit.point);
                if let Some(listener) = self.ground_listener.as_mut() {
                    listener(hit.point);
                }
                self.fade_in_all();
                self.clear_selection();
            }
            Some(EntityType::Area) => {
                self.fade_in_all();
                self.clear_selection();
                self.labels.toggle(&self.scene, hit.node);
            }
            _ => self.handle_selected(hit.node),
        }
        true
    }

    fn clear_selection(&mut self) {
        if let Some(previous) = self.selected.take() {
            self.reset(previous, ResetMode::All);
        }
    }

    /// Drops the selection and brings every mesh back.
    pub fn deselect(&mut self) {
        self.fade_in_all();
        self.clear_selection();
    }

    /// Selects `node`, or the group it belongs to when it is not a
    /// top-level node. Selecting the current selection again clears it.
    pub fn handle_selected(&mut self, node: NodeId) {
        self.redraw();
        let root = self.scene.root();
        let target = match self.scene.parent(node) {
            Some(parent) if parent != root => parent,
            _ => node,
        };

        if self.selected == Some(target) {
            debug!("deselected {}", self.scene.node(target).name);
            self.fade_in_all();
            self.reset(target, ResetMode::All);
            self.selected = None;
            return;
        }

        if let Some(previous) = self.selected.take() {
            self.reset(previous, ResetMode::Color);
        }
        self.selected = Some(target);
        debug!("selected {}", self.scene.node(target).name);

        let event = if self.scene.node(target).is_group() {
            self.highlight_group(target)
        } else {
            self.highlight_mesh(target)
        };

        if let Some(listener) = self.selection_listener.as_mut() {
            listener(&event);
        }
    }

    fn highlight_mesh(&mut self, target: NodeId) -> SelectionEvent {
        let selected_color = self.theme.selected_color;
        if let Some(material) = material_mut(&mut self.scene, target) {
            material.set_color(selected_color);
            material.set_opacity(SELECTED_OPACITY);
        }

        match self.scene.node(target).data.clone() {
            NodeData::Stack {
                id,
                shelf_id,
                shelf_level,
            } => {
                let level_group = shelf_id
                    .as_deref()
                    .and_then(|shelf| self.scene.find(EntityType::Shelf, shelf))
                    .and_then(|shelf| {
                        let index = (shelf_level as usize).checked_sub(1)?;
                        self.scene.children(shelf).get(index).copied()
                    });
                if let Some(level_group) = level_group {
                    self.reset(level_group, ResetMode::All);
                }
                SelectionEvent::Stack {
                    node: target,
                    id,
                    shelf_id,
                    shelf_level,
                }
            }
            _ => SelectionEvent::Other { node: target },
        }
    }

    fn highlight_group(&mut self, target: NodeId) -> SelectionEvent {
        let mut event = SelectionEvent::Other { node: target };

        let level = match self.scene.node(target).data {
            NodeData::ShelfLevel { level, .. } => Some(level),
            _ => None,
        };
        let shelf = self
            .scene
            .parent(target)
            .filter(|&parent| self.scene.node(parent).entity_type() == Some(EntityType::Shelf));

        if let (Some(level), Some(shelf)) = (level, shelf) {
            self.reset(shelf, ResetMode::All);
            let shelf_id = self.scene.node(shelf).data.id().map(str::to_string);
            if let Some(id) = shelf_id.as_deref() {
                for stack in self.scene.stacks_on(id, Some(level)) {
                    self.reset(stack, ResetMode::All);
                }
            }
            event = SelectionEvent::ShelfLevel {
                node: target,
                shelf_id,
                level,
            };
        }

        let selected_color = self.theme.selected_color;
        let fallback = group_opacity(&self.scene, target).unwrap_or(SELECTED_OPACITY);
        for child in self.scene.children(target).to_vec() {
            if let Some(material) = material_mut(&mut self.scene, child) {
                let opacity = if material.base.opacity > 0.0 {
                    material.base.opacity
                } else {
                    fallback
                };
                material.set_color(selected_color);
                material.set_opacity(opacity);
            }
        }
        event
    }

    /// Fades every mesh in the scene.
    pub fn fade_out_all(&mut self) {
        let root = self.scene.root();
        for mesh in self.scene.descendant_meshes(root) {
            if let Some(material) = material_mut(&mut self.scene, mesh) {
                material.set_opacity(FADED_OPACITY);
            }
        }
        self.redraw();
    }

    /// Gives every mesh its own opacity back. Colours are left alone.
    pub fn fade_in_all(&mut self) {
        let root = self.scene.root();
        for mesh in self.scene.descendant_meshes(root) {
            if let Some(material) = material_mut(&mut self.scene, mesh) {
                let opacity = if material.base.opacity > 0.0 {
                    material.base.opacity
                } else {
                    FADE_IN_FALLBACK_OPACITY
                };
                material.set_opacity(opacity);
            }
        }
        self.redraw();
    }

    /// Restores a mesh, or every mesh under a group, to how it was drawn.
    pub fn reset(&mut self, node: NodeId, mode: ResetMode) {
        reset_node(&mut self.scene, node, mode);
        self.redraw();
    }

    /// Resets each node in turn, restoring everything.
    pub fn reset_all(&mut self, nodes: &[NodeId]) {
        for &node in nodes {
            self.reset(node, ResetMode::All);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use cgmath::Vector3;

    use super::*;
    use crate::{
        config::MapOptions,
        map::labels::project,
        model::Warehouse,
        theme::Theme,
    };

    const DOC: &str = r#"{ "type": "FeatureCollection", "features": [
        { "type": "Feature",
          "geometry": { "type": "Polygon", "coordinates": [[[100,100],[160,100],[160,160],[100,160],[100,100]]] },
          "properties": { "type": "area", "id": "a1", "name": "Dock", "color": "warning", "height": 2 } },
        { "type": "Feature",
          "geometry": { "type": "Polygon", "coordinates": [[[300,100],[315,100],[315,160],[300,160],[300,100]]] },
          "properties": { "type": "shelf", "id": "s1", "levels": 2, "height": 20 } },
        { "type": "Feature",
          "geometry": { "type": "Polygon", "coordinates": [[[301,120],[314,120],[314,130],[301,130],[301,120]]] },
          "properties": { "type": "stack", "id": "k1", "shelfId": "s1", "shelfLevel": 1 } },
        { "type": "Feature",
          "geometry": { "type": "Polygon", "coordinates": [[[301,140],[314,140],[314,150],[301,150],[301,140]]] },
          "properties": { "type": "stack", "id": "k2", "shelfId": "s1", "shelfLevel": 2 } }
    ] }"#;

    struct Fixture {
        map: WarehouseMap,
        events: Rc<RefCell<Vec<SelectionEvent>>>,
    }

    fn fixture() -> Fixture {
        let warehouse = Warehouse::parse(DOC).unwrap();
        let mut map = WarehouseMap::new(MapOptions::default());
        map.draw_warehouse(&warehouse).unwrap();

        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        map.set_selection_listener(move |event| sink.borrow_mut().push(event.clone()));
        Fixture { map, events }
    }

    /// Straight down onto plan point `(x, y)`.
    fn ray_at(x: f32, y: f32) -> Ray {
        Ray::new(Vector3::new(x, 500.0, -y), Vector3::new(0.0, -1.0, 0.0))
    }

    fn find(map: &WarehouseMap, kind: EntityType, id: &str) -> NodeId {
        map.scene.find(kind, id).unwrap()
    }

    fn material(map: &WarehouseMap, node: NodeId) -> &Material {
        &map.scene.node(node).mesh().unwrap().material
    }

    fn level(map: &WarehouseMap, n: usize) -> NodeId {
        map.scene.children(find(map, EntityType::Shelf, "s1"))[n - 1]
    }

    #[test]
    fn clicking_a_stack_restores_its_level() {
        let Fixture { mut map, events } = fixture();
        let stack = find(&map, EntityType::Stack, "k1");

        // k1 sits under the level boards, so select it directly.
        map.handle_selected(stack);

        assert_eq!(map.selected(), Some(stack));
        assert_eq!(material(&map, stack).color(), Theme::default().selected_color);
        assert_eq!(material(&map, stack).opacity(), SELECTED_OPACITY);

        let events = events.borrow();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            SelectionEvent::Stack { shelf_level: 1, id: Some(id), .. } if id == "k1"
        ));
    }

    #[test]
    fn click_fades_everything_but_the_selection() {
        let Fixture { mut map, .. } = fixture();
        let stack = find(&map, EntityType::Stack, "k2");
        let other = find(&map, EntityType::Stack, "k1");
        let area = find(&map, EntityType::Area, "a1");

        map.fade_out_all();
        map.handle_selected(stack);

        assert_eq!(material(&map, other).opacity(), FADED_OPACITY);
        assert_eq!(material(&map, area).opacity(), FADED_OPACITY);
        // Level 2 holds k2 and is fully restored
        for &part in map.scene.children(level(&map, 2)) {
            assert_eq!(material(&map, part).opacity(), 1.0);
        }
        for &part in map.scene.children(level(&map, 1)) {
            assert_eq!(material(&map, part).opacity(), FADED_OPACITY);
        }
    }

    #[test]
    fn clicking_a_board_selects_its_level() {
        let Fixture { mut map, events } = fixture();
        let level_two = level(&map, 2);
        let theme = Theme::default();

        // Straight down onto the shelf hits the top board of level 2 first.
        assert!(map.select_at(&ray_at(302.0, 110.0)));

        assert_eq!(map.selected(), Some(level_two));
        for &part in map.scene.children(level_two) {
            assert_eq!(material(&map, part).color(), theme.selected_color);
            assert_eq!(material(&map, part).opacity(), 1.0);
        }
        // Stacks on level 2 come back, the others stay faded
        let k2 = find(&map, EntityType::Stack, "k2");
        let k1 = find(&map, EntityType::Stack, "k1");
        assert_eq!(material(&map, k2).opacity(), theme.stack.opacity);
        assert_eq!(material(&map, k1).opacity(), FADED_OPACITY);
        // The rest of the shelf is restored too
        for &part in map.scene.children(level(&map, 1)) {
            assert_eq!(material(&map, part).opacity(), 1.0);
        }

        assert!(matches!(
            events.borrow()[0],
            SelectionEvent::ShelfLevel { level: 2, .. }
        ));
    }

    #[test]
    fn clicking_the_selection_again_clears_it() {
        let Fixture { mut map, .. } = fixture();
        let k1 = find(&map, EntityType::Stack, "k1");
        let area = find(&map, EntityType::Area, "a1");

        map.fade_out_all();
        map.handle_selected(k1);
        map.fade_out_all();
        map.handle_selected(k1);

        assert_eq!(map.selected(), None);
        assert_eq!(material(&map, k1).color(), Theme::default().stack.color);
        assert_eq!(material(&map, area).opacity(), material(&map, area).base.opacity);
    }

    #[test]
    fn new_selection_resets_previous_colour() {
        let Fixture { mut map, .. } = fixture();
        let k1 = find(&map, EntityType::Stack, "k1");
        let k2 = find(&map, EntityType::Stack, "k2");

        map.handle_selected(k1);
        map.handle_selected(k2);

        assert_eq!(map.selected(), Some(k2));
        assert_eq!(material(&map, k1).color(), Theme::default().stack.color);
        // Colour only: opacity keeps whatever the click left
        assert_eq!(material(&map, k1).opacity(), SELECTED_OPACITY);
    }

    #[test]
    fn ground_click_clears_selection_and_notifies() {
        let Fixture { mut map, events } = fixture();
        let points = Rc::new(RefCell::new(Vec::new()));
        let sink = points.clone();
        map.set_ground_listener(move |p| sink.borrow_mut().push(p));

        let k1 = find(&map, EntityType::Stack, "k1");
        map.handle_selected(k1);
        assert!(map.select_at(&ray_at(500.0, 500.0)));

        assert_eq!(map.selected(), None);
        assert_eq!(material(&map, k1).color(), Theme::default().stack.color);
        assert_eq!(points.borrow().len(), 1);
        assert!((points.borrow()[0].y - 2.0).abs() < 1e-3);
        assert_eq!(events.borrow().len(), 1);
    }

    #[test]
    fn area_click_toggles_its_label() {
        let Fixture { mut map, .. } = fixture();
        let area = find(&map, EntityType::Area, "a1");

        assert!(map.select_at(&ray_at(125.0, 140.0)));
        assert!(map.labels().is_shown(area));
        assert_eq!(material(&map, area).opacity(), material(&map, area).base.opacity);

        assert!(map.select_at(&ray_at(125.0, 140.0)));
        assert!(!map.labels().is_shown(area));
    }

    #[test]
    fn missing_everything_changes_nothing() {
        let Fixture { mut map, .. } = fixture();
        map.take_scene_changed();

        assert!(!map.select_at(&ray_at(5000.0, 5000.0)));
        assert!(!map.scene_changed());
    }

    #[test]
    fn unselectable_map_ignores_clicks() {
        let Fixture { mut map, .. } = fixture();
        map.set_selectable(false);
        assert!(!map.select_at(&ray_at(130.0, 130.0)));

        let at = PhysicalPosition::new(10.0, 10.0);
        map.pointer_down(MouseButton::Left, at);
        assert!(!map.pointer_up(MouseButton::Left, at, PhysicalSize::new(800, 600)));
    }

    #[test]
    fn drag_is_not_a_click() {
        let Fixture { mut map, .. } = fixture();
        let size = PhysicalSize::new(800, 600);
        let centre = PhysicalPosition::new(400.0, 300.0);

        map.pointer_down(MouseButton::Left, centre);
        assert!(!map.pointer_up(MouseButton::Left, PhysicalPosition::new(420.0, 300.0), size));

        map.pointer_down(MouseButton::Right, centre);
        assert!(!map.pointer_up(MouseButton::Right, centre, size));
    }

    #[test]
    fn reset_modes_restore_selectively() {
        let Fixture { mut map, .. } = fixture();
        let k1 = find(&map, EntityType::Stack, "k1");
        let base = material(&map, k1).base;

        map.handle_selected(k1);
        map.reset(k1, ResetMode::Opacity);
        assert_eq!(material(&map, k1).opacity(), base.opacity);
        assert_eq!(material(&map, k1).color(), Theme::default().selected_color);

        map.reset_all(&[k1]);
        assert_eq!(material(&map, k1).color(), base.color);
    }

    #[test]
    fn clicking_through_the_camera_selects_a_stack() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/json/all.json");
        let warehouse = Warehouse::load(path).unwrap();
        let mut map = WarehouseMap::new(MapOptions::default());
        map.draw_warehouse(&warehouse).unwrap();
        let size = PhysicalSize::new(800, 600);
        map.resize(size.width, size.height);

        // Aim at the middle of the first stack top the default view can see
        let view_proj = map.camera.get_view_proj_matrix();
        let stacks: Vec<NodeId> = map
            .scene
            .iter()
            .filter(|(_, node)| matches!(node.entity_type(), Some(EntityType::Stack)))
            .map(|(id, _)| id)
            .collect();
        let pixel = stacks
            .iter()
            .find_map(|&stack| {
                let (min, max) = map.scene.world_bounds(stack)?;
                let top = Vector3::new((min.x + max.x) * 0.5, max.y, (min.z + max.z) * 0.5);
                project(top, view_proj, [size.width as f32, size.height as f32])
            })
            .expect("no stack in view");

        let at = PhysicalPosition::new(pixel[0].round() as f64, pixel[1].round() as f64);
        map.pointer_down(MouseButton::Left, at);
        assert!(map.pointer_up(MouseButton::Left, at, size));

        // Boards above the stack may take the hit; either way a shelf part
        // is selected, never the ground or an area
        let selected = map.selected().expect("nothing selected");
        assert!(!matches!(
            map.scene.node(selected).entity_type(),
            Some(EntityType::Ground | EntityType::Area)
        ));
    }

    #[test]
    fn ndc_maps_corners() {
        let size = PhysicalSize::new(800, 600);
        assert_eq!(to_ndc(PhysicalPosition::new(0.0, 0.0), size), Vector2::new(-1.0, 1.0));
        assert_eq!(to_ndc(PhysicalPosition::new(800.0, 600.0), size), Vector2::new(1.0, -1.0));
        assert_eq!(to_ndc(PhysicalPosition::new(400.0, 300.0), size), Vector2::new(0.0, 0.0));
    }
}
