use cgmath::{Matrix4, Vector3, Vector4};
use wgpu::Device;

use super::{
    mesh::{MeshLayouts, MeshNode},
    node::{Node, NodeData, NodeId, NodeKind},
};
use crate::{
    gfx::{geometry::GeometryData, resources::material::Material},
    model::EntityType,
    theme::MaterialStyle,
};

/// Scene graph stored as an arena
///
/// Nodes are never removed one by one; [`Scene::clear`] drops everything
/// except the root. A parent is always created before its children, so
/// walking the arena in index order visits parents first.
#[derive(Debug)]
pub struct Scene {
    nodes: Vec<Node>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(
                "root",
                NodeKind::Group { style: None },
                NodeData::None,
            )],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.nodes.iter().enumerate().map(|(i, node)| (NodeId(i), node))
    }

    fn insert(&mut self, parent: NodeId, mut node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        node.parent = Some(parent);
        self.nodes.push(node);
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn add_group(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        data: NodeData,
        style: Option<MaterialStyle>,
    ) -> NodeId {
        self.insert(parent, Node::new(name, NodeKind::Group { style }, data))
    }

    pub fn add_mesh(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        data: NodeData,
        geometry: GeometryData,
        material: Material,
        transform: Matrix4<f32>,
    ) -> NodeId {
        let mut node = Node::new(
            name,
            NodeKind::Mesh(Box::new(MeshNode::new(geometry, material))),
            data,
        );
        node.transform = transform;
        self.insert(parent, node)
    }

    /// Drops every node except the root.
    pub fn clear(&mut self) {
        self.nodes.truncate(1);
        self.nodes[0].children.clear();
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn world_transform(&self, id: NodeId) -> Matrix4<f32> {
        let node = self.node(id);
        match node.parent {
            Some(parent) => self.world_transform(parent) * node.transform,
            None => node.transform,
        }
    }

    /// World transforms for every node, indexed like the arena.
    pub fn world_transforms(&self) -> Vec<Matrix4<f32>> {
        let mut worlds: Vec<Matrix4<f32>> = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            let world = match node.parent {
                Some(parent) => worlds[parent.0] * node.transform,
                None => node.transform,
            };
            worlds.push(world);
        }
        worlds
    }

    /// A node is shown only when it and all its ancestors are visible.
    pub fn is_visible(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.node(node_id);
            if !node.visible {
                return false;
            }
            current = node.parent;
        }
        true
    }

    /// Meshes at or below `id`, depth first.
    pub fn descendant_meshes(&self, id: NodeId) -> Vec<NodeId> {
        let mut meshes = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let node = self.node(current);
            if node.mesh().is_some() {
                meshes.push(current);
            }
            stack.extend(node.children.iter().rev());
        }
        meshes
    }

    pub fn meshes(&self) -> impl Iterator<Item = (NodeId, &MeshNode)> + '_ {
        self.iter()
            .filter_map(|(id, node)| node.mesh().map(|mesh| (id, mesh)))
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes().count()
    }

    pub fn count(&self, kind: EntityType) -> usize {
        self.nodes
            .iter()
            .filter(|node| node.entity_type() == Some(kind))
            .count()
    }

    /// Top-level node of the given kind and id.
    pub fn find(&self, kind: EntityType, id: &str) -> Option<NodeId> {
        self.children(self.root()).iter().copied().find(|&child| {
            let node = self.node(child);
            node.entity_type() == Some(kind) && node.data.id() == Some(id)
        })
    }

    /// Stacks drawn on `shelf_id`, optionally limited to one level.
    pub fn stacks_on(&self, shelf_id: &str, level: Option<u32>) -> Vec<NodeId> {
        self.children(self.root())
            .iter()
            .copied()
            .filter(|&child| match &self.node(child).data {
                NodeData::Stack {
                    shelf_id: Some(on),
                    shelf_level,
                    ..
                } => on == shelf_id && level.map_or(true, |level| level == *shelf_level),
                _ => false,
            })
            .collect()
    }

    /// World-space bounds of every mesh at or below `id`.
    pub fn world_bounds(&self, id: NodeId) -> Option<(Vector3<f32>, Vector3<f32>)> {
        let mut bounds: Option<(Vector3<f32>, Vector3<f32>)> = None;
        for mesh_id in self.descendant_meshes(id) {
            let Some((min, max)) = self.node(mesh_id).mesh().and_then(|m| m.geometry.bounds())
            else {
                continue;
            };
            let world = self.world_transform(mesh_id);
            for corner in 0..8 {
                let local = Vector4::new(
                    if corner & 1 == 0 { min[0] } else { max[0] },
                    if corner & 2 == 0 { min[1] } else { max[1] },
                    if corner & 4 == 0 { min[2] } else { max[2] },
                    1.0,
                );
                let p = (world * local).truncate();
                bounds = Some(match bounds {
                    None => (p, p),
                    Some((lo, hi)) => (
                        Vector3::new(lo.x.min(p.x), lo.y.min(p.y), lo.z.min(p.z)),
                        Vector3::new(hi.x.max(p.x), hi.y.max(p.y), hi.z.max(p.z)),
                    ),
                });
            }
        }
        bounds
    }

    /// Uploads new meshes and refreshes transforms and colours of the rest.
    pub fn prepare_gpu(&mut self, device: &Device, queue: &wgpu::Queue, layouts: &MeshLayouts) {
        let worlds = self.world_transforms();
        for (node, world) in self.nodes.iter_mut().zip(worlds) {
            if let Some(mesh) = node.mesh_mut() {
                mesh.sync_gpu(device, queue, layouts, world);
            }
        }
    }

    /// Visible meshes split into opaque ones and transparent ones sorted
    /// back to front from `eye`.
    pub fn draw_order(&self, eye: Vector3<f32>) -> (Vec<NodeId>, Vec<NodeId>) {
        let worlds = self.world_transforms();
        let mut opaque = Vec::new();
        let mut transparent = Vec::new();

        for (id, mesh) in self.meshes() {
            if !self.is_visible(id) {
                continue;
            }
            if mesh.material.is_transparent() {
                let centre = mesh
                    .geometry
                    .bounds()
                    .map(|(min, max)| {
                        Vector4::new(
                            (min[0] + max[0]) * 0.5,
                            (min[1] + max[1]) * 0.5,
                            (min[2] + max[2]) * 0.5,
                            1.0,
                        )
                    })
                    .unwrap_or(Vector4::new(0.0, 0.0, 0.0, 1.0));
                let centre = (worlds[id.0] * centre).truncate();
                let offset = centre - eye;
                transparent.push((id, offset.x * offset.x + offset.y * offset.y + offset.z * offset.z));
            } else {
                opaque.push(id);
            }
        }

        transparent.sort_by(|a, b| b.1.total_cmp(&a.1));
        (opaque, transparent.into_iter().map(|(id, _)| id).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::geometry::generate_box;

    fn stack_data(shelf: &str, level: u32) -> NodeData {
        NodeData::Stack {
            id: None,
            shelf_id: Some(shelf.to_string()),
            shelf_level: level,
        }
    }

    fn cube(scene: &mut Scene, parent: NodeId, data: NodeData, at: Vector3<f32>) -> NodeId {
        scene.add_mesh(
            parent,
            "cube",
            data,
            generate_box(2.0, 2.0, 2.0),
            Material::new(MaterialStyle::new(0xffffff, 0.5)),
            Matrix4::from_translation(at),
        )
    }

    #[test]
    fn world_transform_composes_parents() {
        let mut scene = Scene::new();
        let group = scene.add_group(scene.root(), "g", NodeData::None, None);
        scene.node_mut(group).transform = Matrix4::from_translation(Vector3::new(10.0, 0.0, 0.0));
        let mesh = cube(&mut scene, group, NodeData::ShelfPart, Vector3::new(0.0, 5.0, 0.0));

        let (min, max) = scene.world_bounds(mesh).unwrap();
        assert_eq!(min, Vector3::new(9.0, 4.0, -1.0));
        assert_eq!(max, Vector3::new(11.0, 6.0, 1.0));
        assert_eq!(scene.world_transforms()[mesh.index()], scene.world_transform(mesh));
    }

    #[test]
    fn clear_keeps_only_root() {
        let mut scene = Scene::new();
        let group = scene.add_group(scene.root(), "g", NodeData::None, None);
        cube(&mut scene, group, NodeData::ShelfPart, Vector3::new(0.0, 0.0, 0.0));
        assert_eq!(scene.mesh_count(), 1);

        scene.clear();
        assert!(scene.is_empty());
        assert!(scene.children(scene.root()).is_empty());
    }

    #[test]
    fn stacks_are_filtered_by_shelf_and_level() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = cube(&mut scene, root, stack_data("s1", 1), Vector3::new(0.0, 0.0, 0.0));
        let b = cube(&mut scene, root, stack_data("s1", 2), Vector3::new(0.0, 0.0, 0.0));
        cube(&mut scene, root, stack_data("s2", 1), Vector3::new(0.0, 0.0, 0.0));

        assert_eq!(scene.stacks_on("s1", None), vec![a, b]);
        assert_eq!(scene.stacks_on("s1", Some(2)), vec![b]);
        assert_eq!(scene.count(EntityType::Stack), 3);
    }

    #[test]
    fn transparent_meshes_sort_back_to_front() {
        let mut scene = Scene::new();
        let root = scene.root();
        let near = cube(&mut scene, root, NodeData::None, Vector3::new(0.0, 0.0, 10.0));
        let far = cube(&mut scene, root, NodeData::None, Vector3::new(0.0, 0.0, -10.0));
        let hidden = cube(&mut scene, root, NodeData::None, Vector3::new(0.0, 0.0, 0.0));
        scene.node_mut(hidden).visible = false;

        let (opaque, transparent) = scene.draw_order(Vector3::new(0.0, 0.0, 100.0));
        assert!(opaque.is_empty());
        assert_eq!(transparent, vec![far, near]);
    }
}
