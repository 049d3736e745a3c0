//! # Scene Management Module
//!
//! The scene graph holding every drawn warehouse object.
//!
//! ## Key Components
//!
//! - [`Scene`] - Arena of nodes rooted at a single group
//! - [`Node`] - Group or mesh with a local transform and warehouse metadata
//! - [`MeshNode`] - Geometry plus a per-mesh [`Material`](crate::gfx::resources::Material)
//! - [`Vertex3D`] - GPU vertex format with position and normal
//!
//! ## Usage
//!
//! ```rust
//! use cgmath::{Matrix4, SquareMatrix};
//! use warehouse3d::gfx::{geometry::generate_box, resources::Material, scene::{NodeData, Scene}};
//! use warehouse3d::theme::MaterialStyle;
//!
//! let mut scene = Scene::new();
//! let shelf = scene.add_group(scene.root(), "shelf", NodeData::None, None);
//! scene.add_mesh(
//!     shelf,
//!     "pole",
//!     NodeData::ShelfPart,
//!     generate_box(5.0, 20.0, 5.0),
//!     Material::new(MaterialStyle::new(0xbae7ff, 1.0)),
//!     Matrix4::identity(),
//! );
//! assert_eq!(scene.mesh_count(), 1);
//! ```
//!
//! Meshes are created without GPU resources; the render engine uploads them
//! lazily through [`Scene::prepare_gpu`].

pub mod mesh;
pub mod node;
pub mod scene;
pub mod vertex;

// Re-export main types
pub use mesh::{DrawMesh, MeshLayouts, MeshNode, TransformBindings};
pub use node::{Node, NodeData, NodeId, NodeKind};
pub use scene::Scene;
pub use vertex::Vertex3D;
