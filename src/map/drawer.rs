//! Turns warehouse entities into scene nodes.
//!
//! Plan polygons are extruded along +Z and then rotated -90 degrees about X,
//! so a plan point `(x, y)` at extrusion height `d` ends up at world
//! `(x, d, -y)` with Y up.

use cgmath::{Deg, Matrix4, Vector2, Vector3};
use log::{info, warn};

use super::WarehouseMap;
use crate::{
    error::{Result, WarehouseError},
    gfx::{
        geometry::{extrude_polygon, generate_box},
        resources::Material,
        scene::{NodeData, NodeId},
    },
    model::{Area, Direction, EntityType, Shelf, Stack, Warehouse, stack::DEFAULT_STACK_HEIGHT},
    theme::MaterialStyle,
};

/// Transform that stands an extruded plan mesh up at height `y`.
pub fn plan_transform(y: f32) -> Matrix4<f32> {
    Matrix4::from_translation(Vector3::new(0.0, y, 0.0)) * Matrix4::from_angle_x(Deg(-90.0))
}

/// How many entities [`WarehouseMap::draw_warehouse`] drew and skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawSummary {
    pub areas: usize,
    pub shelves: usize,
    pub stacks: usize,
    pub skipped: usize,
}

/// World centres of the two poles of one shelf level.
fn pole_positions(
    outline: &[Vector2<f32>],
    direction: Direction,
    (pw, pd): (f32, f32),
    y: f32,
    inherit: bool,
) -> Option<[Vector3<f32>; 2]> {
    let mut points = outline;
    if points.len() > 1 && points.first() == points.last() {
        points = &points[..points.len() - 1];
    }
    let (p0, p2) = (*points.first()?, *points.get(2)?);

    let mut front = Vector3::new(p0.x + pw / 2.0, y, -(p0.y + pd / 2.0));
    let mut back = Vector3::new(p2.x - pw / 2.0, y, -(p2.y - pd / 2.0));

    // Outset poles stand just past the footprint on the long sides.
    if !inherit {
        match direction {
            Direction::Vertical => {
                front.z += pd;
                back.z -= pd;
            }
            Direction::Horizontal => {
                front.x -= pw;
                back.x += pw;
            }
        }
    }
    Some([front, back])
}

impl WarehouseMap {
    /// Draws the floor slab as a `width` x `depth` rectangle from `origin`.
    pub fn draw_ground(&mut self, width: f32, depth: f32, origin: Vector2<f32>) -> Result<NodeId> {
        self.redraw();
        let outline = [
            origin,
            Vector2::new(origin.x, origin.y + depth),
            Vector2::new(origin.x + width, origin.y + depth),
            Vector2::new(origin.x + width, origin.y),
        ];
        let geometry = extrude_polygon(&outline, self.config.ground_height)?;

        let root = self.scene.root();
        Ok(self.scene.add_mesh(
            root,
            "ground",
            NodeData::Ground,
            geometry,
            Material::new(self.theme.ground),
            plan_transform(0.0),
        ))
    }

    /// Draws the ground with the configured size.
    pub fn draw_default_ground(&mut self) -> Result<NodeId> {
        let ground = self.config.ground.clone();
        self.draw_ground(ground.width, ground.depth, Vector2::from(ground.origin))
    }

    pub fn draw_area(&mut self, area: &Area) -> Result<NodeId> {
        self.redraw();
        let geometry = extrude_polygon(&area.outline, area.height)?;
        let style = self.theme.area(&area.color);

        let root = self.scene.root();
        Ok(self.scene.add_mesh(
            root,
            format!("area:{}", area.id.as_deref().unwrap_or_default()),
            NodeData::Area {
                id: area.id.clone(),
                name: area.name.clone(),
            },
            geometry,
            Material::new(style),
            plan_transform(self.config.ground_height),
        ))
    }

    /// Draws a shelf as one group per level, each holding a bottom board, a
    /// top board and two poles.
    pub fn draw_shelf(&mut self, shelf: &Shelf) -> Result<NodeId> {
        self.redraw();
        let heights = shelf.level_heights()?;
        let surface = self.config.surface_height;
        let board = extrude_polygon(&shelf.outline, surface)?;

        let (pw, pd) = shelf.pole_dimensions();
        let shelf_style = &self.theme.shelf;
        let group_style = MaterialStyle {
            color: shelf_style.level.color,
            opacity: shelf_style.opacity,
            transparent: shelf_style.transparent,
        };
        let (level_style, pole_style) = (shelf_style.level, shelf_style.pole);
        let name = format!("shelf:{}", shelf.display_id());

        let root = self.scene.root();
        let group = self.scene.add_group(
            root,
            name.clone(),
            NodeData::Shelf {
                id: shelf.id.clone(),
                levels: shelf.levels,
            },
            Some(group_style),
        );

        let mut current = self.config.ground_height;
        for (index, &height) in heights.iter().enumerate() {
            let level = index as u32 + 1;
            let bottom_y = current;
            current += height;

            let poles = pole_positions(
                &shelf.outline,
                shelf.direction,
                (pw, pd),
                current - height / 2.0,
                self.config.use_inherit_style,
            )
            .ok_or_else(|| WarehouseError::InvalidShelf {
                id: shelf.display_id().to_string(),
                reason: "outline needs at least three corners".to_string(),
            })?;

            let level_group = self.scene.add_group(
                group,
                format!("{name}:level{level}"),
                NodeData::ShelfLevel {
                    level,
                    top_y: current,
                },
                None,
            );

            for (part, y) in [("bottom", bottom_y), ("top", current - surface)] {
                self.scene.add_mesh(
                    level_group,
                    part,
                    NodeData::ShelfPart,
                    board.clone(),
                    Material::new(level_style),
                    plan_transform(y),
                );
            }
            for (part, at) in ["pole-front", "pole-back"].into_iter().zip(poles) {
                self.scene.add_mesh(
                    level_group,
                    part,
                    NodeData::ShelfPart,
                    generate_box(pw, height, pd),
                    Material::new(pole_style),
                    Matrix4::from_translation(at),
                );
            }
        }

        Ok(group)
    }

    /// Draws a stack on its shelf level. Returns `Ok(None)` when the shelf
    /// it refers to has not been drawn.
    pub fn draw_stack(&mut self, stack: &Stack, shelves: &[Shelf]) -> Result<Option<NodeId>> {
        self.redraw();
        let shelf_id = stack.shelf_id.as_deref().unwrap_or_default();
        let shelf = shelves.iter().find(|s| s.id.as_deref() == Some(shelf_id));
        let (Some(shelf), Some(_)) = (shelf, self.scene.find(EntityType::Shelf, shelf_id)) else {
            warn!(
                "stack {:?} refers to missing shelf {shelf_id:?}; skipped",
                stack.id
            );
            return Ok(None);
        };

        let surface = self.config.surface_height;
        let height = stack
            .height
            .or_else(|| shelf.level_height(stack.shelf_level))
            .or_else(|| shelf.height.scalar())
            .unwrap_or(DEFAULT_STACK_HEIGHT)
            - 2.0 * surface;
        let geometry = extrude_polygon(&stack.outline, height)?;
        let y = self.config.ground_height + surface + shelf.base_offset(stack.shelf_level);

        let root = self.scene.root();
        Ok(Some(self.scene.add_mesh(
            root,
            format!("stack:{}", stack.id.as_deref().unwrap_or_default()),
            NodeData::Stack {
                id: stack.id.clone(),
                shelf_id: stack.shelf_id.clone(),
                shelf_level: stack.shelf_level,
            },
            geometry,
            Material::new(self.theme.stack),
            plan_transform(y),
        )))
    }

    /// Draws the ground and then every area, shelf and stack. A feature that
    /// cannot be drawn is logged and skipped.
    pub fn draw_warehouse(&mut self, warehouse: &Warehouse) -> Result<DrawSummary> {
        self.draw_default_ground()?;
        let mut summary = DrawSummary::default();

        for area in &warehouse.areas {
            match self.draw_area(area) {
                Ok(_) => summary.areas += 1,
                Err(e) => {
                    warn!("area {:?} skipped: {e}", area.id);
                    summary.skipped += 1;
                }
            }
        }
        for shelf in &warehouse.shelves {
            match self.draw_shelf(shelf) {
                Ok(_) => summary.shelves += 1,
                Err(e) => {
                    warn!("shelf {} skipped: {e}", shelf.display_id());
                    summary.skipped += 1;
                }
            }
        }
        for stack in &warehouse.stacks {
            match self.draw_stack(stack, &warehouse.shelves) {
                Ok(Some(_)) => summary.stacks += 1,
                Ok(None) => summary.skipped += 1,
                Err(e) => {
                    warn!("stack {:?} skipped: {e}", stack.id);
                    summary.skipped += 1;
                }
            }
        }

        info!(
            "Drew {} areas, {} shelves, {} stacks ({} skipped, {} meshes)",
            summary.areas,
            summary.shelves,
            summary.stacks,
            summary.skipped,
            self.scene.mesh_count()
        );
        Ok(summary)
    }

    /// Removes everything drawn and drops the selection and labels.
    pub fn clear(&mut self) {
        self.scene.clear();
        self.selected = None;
        self.labels.clear();
        self.redraw();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::MapOptions,
        model::{AreaColor, LevelHeight, Pole},
    };

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    fn rect(x: f32, y: f32, w: f32, d: f32) -> Vec<Vector2<f32>> {
        vec![
            Vector2::new(x, y),
            Vector2::new(x + w, y),
            Vector2::new(x + w, y + d),
            Vector2::new(x, y + d),
            Vector2::new(x, y),
        ]
    }

    fn shelf(direction: Direction) -> Shelf {
        Shelf {
            id: Some("s1".to_string()),
            levels: 3,
            width: 15.0,
            height: LevelHeight::PerLevel(vec![30.0, 20.0, 25.0]),
            direction,
            pole: Pole::default(),
            outline: rect(100.0, 200.0, 15.0, 60.0),
        }
    }

    fn stack(level: u32, height: Option<f32>) -> Stack {
        Stack {
            id: Some(format!("k{level}")),
            height,
            shelf_id: Some("s1".to_string()),
            shelf_level: level,
            outline: rect(101.0, 205.0, 13.0, 10.0),
        }
    }

    #[test]
    fn extruded_plan_lands_at_expected_world_position() {
        let mut map = WarehouseMap::new(MapOptions::default());
        let area = Area {
            id: Some("a1".to_string()),
            name: Some("Dock".to_string()),
            color: AreaColor::Warning,
            height: 4.0,
            outline: rect(10.0, 20.0, 30.0, 40.0),
        };
        let node = map.draw_area(&area).unwrap();

        let (min, max) = map.scene.world_bounds(node).unwrap();
        assert!(approx(min.x, 10.0) && approx(max.x, 40.0));
        assert!(approx(min.y, 2.0) && approx(max.y, 6.0));
        assert!(approx(min.z, -60.0) && approx(max.z, -20.0));
        assert!(map.take_scene_changed());
    }

    #[test]
    fn ground_uses_configured_size() {
        let mut map = WarehouseMap::new(MapOptions::default());
        let ground = map.draw_default_ground().unwrap();

        let (min, max) = map.scene.world_bounds(ground).unwrap();
        assert!(approx(min.x, 10.0) && approx(max.x, 970.0));
        assert!(approx(min.y, 0.0) && approx(max.y, 2.0));
        assert!(approx(min.z, -640.0) && approx(max.z, -10.0));
        assert_eq!(map.scene.node(ground).entity_type(), Some(EntityType::Ground));
    }

    #[test]
    fn shelf_levels_stack_up_from_the_ground() {
        let mut map = WarehouseMap::new(MapOptions::default());
        let group = map.draw_shelf(&shelf(Direction::Vertical)).unwrap();

        let levels = map.scene.children(group).to_vec();
        assert_eq!(levels.len(), 3);
        let tops: Vec<f32> = levels
            .iter()
            .map(|&l| match map.scene.node(l).data {
                NodeData::ShelfLevel { top_y, .. } => top_y,
                _ => panic!("not a level"),
            })
            .collect();
        assert_eq!(tops, vec![32.0, 52.0, 77.0]);

        // Level 2: bottom board at 32, top board ends at 52.
        let (min, max) = map.scene.world_bounds(levels[1]).unwrap();
        assert!(approx(min.y, 32.0));
        assert!(approx(max.y, 52.0));
        assert_eq!(map.scene.children(levels[1]).len(), 4);
        assert_eq!(map.scene.mesh_count(), 12);
    }

    #[test]
    fn inherit_poles_sit_inside_the_footprint() {
        let mut map = WarehouseMap::new(MapOptions::default());
        let group = map.draw_shelf(&shelf(Direction::Vertical)).unwrap();
        let level = map.scene.children(group)[0];
        let parts = map.scene.children(level).to_vec();

        // pw = 15 (shelf width), pd = 5 (pole depth), level 1 spans 2..32
        let front = map.scene.world_transform(parts[2]);
        let back = map.scene.world_transform(parts[3]);
        assert_eq!(front.w.truncate(), Vector3::new(107.5, 17.0, -202.5));
        assert_eq!(back.w.truncate(), Vector3::new(107.5, 17.0, -257.5));
    }

    #[test]
    fn outset_poles_move_past_the_footprint() {
        let mut options = MapOptions::default();
        options.config.use_inherit_style = false;

        let mut map = WarehouseMap::new(options.clone());
        let group = map.draw_shelf(&shelf(Direction::Vertical)).unwrap();
        let parts = map.scene.children(map.scene.children(group)[0]).to_vec();
        assert_eq!(
            map.scene.world_transform(parts[2]).w.truncate(),
            Vector3::new(107.5, 17.0, -197.5)
        );
        assert_eq!(
            map.scene.world_transform(parts[3]).w.truncate(),
            Vector3::new(107.5, 17.0, -262.5)
        );

        // Horizontal: pw = 5 (pole depth), pd = 15 (shelf width)
        let mut map = WarehouseMap::new(options);
        let group = map.draw_shelf(&shelf(Direction::Horizontal)).unwrap();
        let parts = map.scene.children(map.scene.children(group)[0]).to_vec();
        assert_eq!(
            map.scene.world_transform(parts[2]).w.truncate(),
            Vector3::new(97.5, 17.0, -207.5)
        );
        assert_eq!(
            map.scene.world_transform(parts[3]).w.truncate(),
            Vector3::new(117.5, 17.0, -252.5)
        );
    }

    #[test]
    fn stack_sits_on_its_level() {
        let mut map = WarehouseMap::new(MapOptions::default());
        let shelves = vec![shelf(Direction::Vertical)];
        map.draw_shelf(&shelves[0]).unwrap();

        // Level 2 height 20 minus two boards
        let node = map.draw_stack(&stack(2, None), &shelves).unwrap().unwrap();
        let (min, max) = map.scene.world_bounds(node).unwrap();
        assert!(approx(min.y, 33.0));
        assert!(approx(max.y, 51.0));

        // Own height wins over the level height
        let node = map.draw_stack(&stack(1, Some(12.0)), &shelves).unwrap().unwrap();
        let (min, max) = map.scene.world_bounds(node).unwrap();
        assert!(approx(min.y, 3.0));
        assert!(approx(max.y, 13.0));
    }

    #[test]
    fn stack_without_shelf_is_skipped() {
        let mut map = WarehouseMap::new(MapOptions::default());
        let shelves = vec![shelf(Direction::Vertical)];

        // Shelf parsed but never drawn
        assert_eq!(map.draw_stack(&stack(1, None), &shelves).unwrap(), None);

        let mut orphan = stack(1, None);
        orphan.shelf_id = Some("nope".to_string());
        map.draw_shelf(&shelves[0]).unwrap();
        assert_eq!(map.draw_stack(&orphan, &shelves).unwrap(), None);
        assert_eq!(map.scene.count(EntityType::Stack), 0);
    }

    #[test]
    fn sample_warehouse_draws_completely() {
        let warehouse =
            Warehouse::load(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/json/all.json")).unwrap();
        let mut map = WarehouseMap::new(MapOptions::default());
        let summary = map.draw_warehouse(&warehouse).unwrap();

        assert_eq!(summary.skipped, 0);
        assert_eq!(summary.areas, warehouse.areas.len());
        assert_eq!(summary.shelves, warehouse.shelves.len());
        assert_eq!(summary.stacks, warehouse.stacks.len());
        assert_eq!(map.scene.count(EntityType::Ground), 1);

        map.clear();
        assert!(map.scene.is_empty());
        assert_eq!(map.selected(), None);
    }
}
