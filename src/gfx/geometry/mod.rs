//! # Procedural Geometry Generation
//!
//! Every mesh in a warehouse is generated from layout numbers; nothing is
//! loaded from model files.
//!
//! ## Supported Shapes
//!
//! - **Box**: axis-aligned box centred on the origin, used for shelf poles
//! - **Extrusion**: prism built from a plan polygon, used for the ground,
//!   areas, shelf boards and stacks
//!
//! ## Usage
//!
//! ```rust
//! use cgmath::Vector2;
//! use warehouse3d::gfx::geometry::{extrude_polygon, generate_box};
//!
//! let pole = generate_box(5.0, 20.0, 5.0);
//! assert_eq!(pole.triangle_count(), 12);
//!
//! let outline = [
//!     Vector2::new(0.0, 0.0),
//!     Vector2::new(10.0, 0.0),
//!     Vector2::new(10.0, 4.0),
//!     Vector2::new(0.0, 4.0),
//! ];
//! let slab = extrude_polygon(&outline, 1.0).unwrap();
//! assert_eq!(slab.triangle_count(), 12);
//! ```

pub mod extrude;
pub mod primitives;

pub use extrude::{extrude_polygon, triangulate};
pub use primitives::generate_box;

use crate::gfx::scene::vertex::Vertex3D;

/// Represents generated geometry data ready for GPU upload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Texture coordinates (u, v)
    pub tex_coords: Vec<[f32; 2]>,
    /// Normal vectors (x, y, z)
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices (counter-clockwise winding)
    pub indices: Vec<u32>,
}

impl GeometryData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Axis-aligned bounds as `(min, max)`, or `None` when empty.
    pub fn bounds(&self) -> Option<([f32; 3], [f32; 3])> {
        let first = *self.vertices.first()?;
        Some(self.vertices.iter().fold((first, first), |(mut min, mut max), v| {
            for axis in 0..3 {
                min[axis] = min[axis].min(v[axis]);
                max[axis] = max[axis].max(v[axis]);
            }
            (min, max)
        }))
    }

    /// Iterates over triangles as position triples.
    pub fn triangles(&self) -> impl Iterator<Item = [[f32; 3]; 3]> + '_ {
        self.indices.chunks_exact(3).map(|tri| {
            [
                self.vertices[tri[0] as usize],
                self.vertices[tri[1] as usize],
                self.vertices[tri[2] as usize],
            ]
        })
    }

    /// Interleaves positions and normals into the renderer's vertex format.
    pub fn to_vertices(&self) -> Vec<Vertex3D> {
        self.vertices
            .iter()
            .enumerate()
            .map(|(i, position)| Vertex3D {
                position: *position,
                normal: self.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
            })
            .collect()
    }
}
