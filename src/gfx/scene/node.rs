//! Scene graph nodes
//!
//! A node is either a group, which only carries a transform and children, or
//! a mesh. Every node also records what part of the warehouse it stands for
//! so picking can work out what the user clicked.

use cgmath::{Matrix4, SquareMatrix};

use super::mesh::MeshNode;
use crate::{model::EntityType, theme::MaterialStyle};

/// Index of a node inside its [`Scene`](super::Scene).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// What part of the warehouse a node was drawn for.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum NodeData {
    #[default]
    None,
    Ground,
    Area {
        id: Option<String>,
        name: Option<String>,
    },
    Shelf {
        id: Option<String>,
        levels: u32,
    },
    /// `level` is 1-based, `top_y` the height the level reaches.
    ShelfLevel {
        level: u32,
        top_y: f32,
    },
    /// Slab or pole inside a shelf level.
    ShelfPart,
    Stack {
        id: Option<String>,
        shelf_id: Option<String>,
        shelf_level: u32,
    },
}

impl NodeData {
    pub fn entity_type(&self) -> Option<EntityType> {
        match self {
            NodeData::None | NodeData::ShelfPart => None,
            NodeData::Ground => Some(EntityType::Ground),
            NodeData::Area { .. } => Some(EntityType::Area),
            NodeData::Shelf { .. } => Some(EntityType::Shelf),
            NodeData::ShelfLevel { .. } => Some(EntityType::ShelfLevel),
            NodeData::Stack { .. } => Some(EntityType::Stack),
        }
    }

    /// Identifier carried by the feature the node was drawn from.
    pub fn id(&self) -> Option<&str> {
        match self {
            NodeData::Area { id, .. } | NodeData::Shelf { id, .. } | NodeData::Stack { id, .. } => {
                id.as_deref()
            }
            _ => None,
        }
    }
}

/// Group or mesh payload.
#[derive(Debug)]
pub enum NodeKind {
    /// `style` is the look shared by the group's meshes, used as the
    /// opacity fallback when the group is highlighted.
    Group { style: Option<MaterialStyle> },
    Mesh(Box<MeshNode>),
}

#[derive(Debug)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    /// Transform relative to the parent.
    pub transform: Matrix4<f32>,
    pub data: NodeData,
    pub visible: bool,
    pub pickable: bool,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    pub(crate) fn new(name: impl Into<String>, kind: NodeKind, data: NodeData) -> Self {
        Self {
            name: name.into(),
            kind,
            transform: Matrix4::identity(),
            data,
            visible: true,
            pickable: true,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, NodeKind::Group { .. })
    }

    pub fn mesh(&self) -> Option<&MeshNode> {
        match &self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            NodeKind::Group { .. } => None,
        }
    }

    pub fn mesh_mut(&mut self) -> Option<&mut MeshNode> {
        match &mut self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            NodeKind::Group { .. } => None,
        }
    }

    pub fn group_style(&self) -> Option<&MaterialStyle> {
        match &self.kind {
            NodeKind::Group { style } => style.as_ref(),
            NodeKind::Mesh(_) => None,
        }
    }

    pub fn entity_type(&self) -> Option<EntityType> {
        self.data.entity_type()
    }
}
