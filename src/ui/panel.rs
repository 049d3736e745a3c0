// src/ui/panel.rs
//! Default UI panels for the warehouse viewer
//!
//! A map panel with scene counts, the selection inspector and a few toggles,
//! plus the area labels drawn straight onto the viewport.

use crate::{
    gfx::scene::NodeData,
    map::{labels::project, WarehouseMap},
    model::EntityType,
};

/// Counts, selection details and map toggles
///
/// # Arguments
/// * `ui` - ImGui UI context
/// * `map` - Map to inspect; the toggles act on it directly
pub fn default_map_panel(ui: &imgui::Ui, map: &mut WarehouseMap) {
    let display_size = ui.io().display_size;
    // Guard against invalid display size that could cause crashes
    if display_size[0] <= 0.0 || display_size[1] <= 0.0 {
        return;
    }

    ui.window("Warehouse")
        .size([320.0, 360.0], imgui::Condition::FirstUseEver)
        .position([20.0, 20.0], imgui::Condition::FirstUseEver)
        .resizable(true)
        .collapsible(true)
        .build(|| {
            render_counts(ui, map);
            ui.separator();
            render_selection(ui, map);
            ui.separator();
            render_controls(ui, map);
        });
}

fn render_counts(ui: &imgui::Ui, map: &WarehouseMap) {
    ui.text("Scene");
    for kind in [EntityType::Area, EntityType::Shelf, EntityType::Stack] {
        ui.text(format!("  {}: {}", kind.as_str(), map.scene.count(kind)));
    }
    ui.text(format!("  meshes: {}", map.scene.mesh_count()));
}

fn render_selection(ui: &imgui::Ui, map: &mut WarehouseMap) {
    ui.text("Selection");
    let Some(selected) = map.selected() else {
        ui.text_disabled("  nothing selected");
        return;
    };

    let node = map.scene.node(selected);
    ui.text(format!("  name: {}", node.name));
    match &node.data {
        NodeData::Stack {
            id,
            shelf_id,
            shelf_level,
        } => {
            ui.text(format!("  stack: {}", id.as_deref().unwrap_or("-")));
            ui.text(format!("  shelf: {}", shelf_id.as_deref().unwrap_or("-")));
            ui.text(format!("  level: {shelf_level}"));
        }
        NodeData::ShelfLevel { level, top_y } => {
            let shelf = map
                .scene
                .parent(selected)
                .and_then(|parent| map.scene.node(parent).data.id());
            ui.text(format!("  shelf: {}", shelf.unwrap_or("-")));
            ui.text(format!("  level: {level} (top at {top_y:.1})"));
        }
        other => {
            if let Some(kind) = other.entity_type() {
                ui.text(format!("  type: {}", kind.as_str()));
            }
        }
    }

    if ui.button("Clear selection") {
        map.deselect();
    }
}

fn render_controls(ui: &imgui::Ui, map: &mut WarehouseMap) {
    let mut selectable = map.selectable();
    if ui.checkbox("Click to select", &mut selectable) {
        map.set_selectable(selectable);
    }

    if ui.button("Reset camera") {
        map.camera.camera.reset_to_default();
        map.camera_changed();
    }

    let camera = &map.camera.camera;
    ui.text_disabled(format!(
        "eye height {:.0}, distance {:.0}",
        camera.height(),
        camera.distance
    ));
}

/// Draws every shown area label at its projected anchor.
pub fn draw_labels(ui: &imgui::Ui, map: &WarehouseMap) {
    let size = ui.io().display_size;
    let view_proj = map.camera.get_view_proj_matrix();
    let draw_list = ui.get_foreground_draw_list();

    for label in map.labels().labels(&map.scene) {
        let Some([x, y]) = project(label.anchor, view_proj, size) else {
            continue;
        };
        let [w, h] = ui.calc_text_size(&label.text);
        let top_left = [x - w * 0.5, y - h * 0.5];

        draw_list
            .add_rect(
                [top_left[0] - 4.0, top_left[1] - 2.0],
                [top_left[0] + w + 4.0, top_left[1] + h + 2.0],
                [0.0, 0.0, 0.0, 0.45],
            )
            .filled(true)
            .rounding(3.0)
            .build();
        draw_list.add_text(top_left, [1.0, 1.0, 1.0, 1.0], &label.text);
    }
}
