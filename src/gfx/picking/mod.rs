//! # Object Picking System
//!
//! Mouse ray-casting against the scene graph.
//!
//! ## How it works
//!
//! 1. **Mouse to Ray**: Convert normalized device coordinates to a world-space ray
//! 2. **Broad phase**: Test the ray against each mesh's world bounding box
//! 3. **Narrow phase**: Test the triangles of the surviving meshes exactly
//! 4. **Sort**: Return every hit mesh, nearest first
//!
//! ## Usage
//!
//! ```rust
//! use cgmath::Vector3;
//! use warehouse3d::gfx::picking::{intersect_scene, Ray};
//! use warehouse3d::gfx::scene::Scene;
//!
//! let scene = Scene::new();
//! let ray = Ray::new(Vector3::new(0.0, 100.0, 0.0), Vector3::new(0.0, -1.0, 0.0));
//! assert!(intersect_scene(&ray, &scene).is_empty());
//! ```

use cgmath::{ElementWise, InnerSpace, Matrix4, SquareMatrix, Vector2, Vector3, Vector4};

use crate::gfx::{
    camera::{camera_utils::Camera, orbit_camera::OrbitCamera},
    scene::{NodeId, Scene},
};

/// A 3D ray for intersection testing
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Ray origin point in world space
    pub origin: Vector3<f32>,
    /// Ray direction (normalized)
    pub direction: Vector3<f32>,
}

impl Ray {
    /// Create a new ray
    pub fn new(origin: Vector3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vector3<f32> {
        self.origin + self.direction * t
    }

    /// Möller-Trumbore, both faces. Returns the distance along the ray.
    pub fn intersect_triangle(&self, a: Vector3<f32>, b: Vector3<f32>, c: Vector3<f32>) -> Option<f32> {
        const EPSILON: f32 = 1e-7;

        let edge1 = b - a;
        let edge2 = c - a;
        let p = self.direction.cross(edge2);
        let det = edge1.dot(p);
        if det.abs() < EPSILON {
            return None;
        }

        let inv_det = 1.0 / det;
        let s = self.origin - a;
        let u = s.dot(p) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = self.direction.dot(q) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = edge2.dot(q) * inv_det;
        (t > EPSILON).then_some(t)
    }
}

/// Axis-aligned bounding box for intersection testing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box
    pub min: Vector3<f32>,
    /// Maximum corner of the bounding box
    pub max: Vector3<f32>,
}

impl Aabb {
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    /// Create AABB from a set of vertices, `None` when there are none.
    pub fn from_vertices(vertices: &[[f32; 3]]) -> Option<Self> {
        let first = Vector3::from(*vertices.first()?);
        let (min, max) = vertices.iter().skip(1).fold((first, first), |(min, max), v| {
            (
                Vector3::new(min.x.min(v[0]), min.y.min(v[1]), min.z.min(v[2])),
                Vector3::new(max.x.max(v[0]), max.y.max(v[1]), max.z.max(v[2])),
            )
        });
        Some(Self::new(min, max))
    }

    /// Slab test. Returns the distance to the entry point, or to the exit
    /// point when the origin is inside the box.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let inv_dir = Vector3::new(
            1.0 / ray.direction.x,
            1.0 / ray.direction.y,
            1.0 / ray.direction.z,
        );

        let t_min = (self.min - ray.origin).mul_element_wise(inv_dir);
        let t_max = (self.max - ray.origin).mul_element_wise(inv_dir);

        let t1 = Vector3::new(
            t_min.x.min(t_max.x),
            t_min.y.min(t_max.y),
            t_min.z.min(t_max.z),
        );
        let t2 = Vector3::new(
            t_min.x.max(t_max.x),
            t_min.y.max(t_max.y),
            t_min.z.max(t_max.z),
        );

        let t_near = t1.x.max(t1.y.max(t1.z));
        let t_far = t2.x.min(t2.y.min(t2.z));

        if t_near <= t_far && t_far >= 0.0 {
            Some(if t_near >= 0.0 { t_near } else { t_far })
        } else {
            None
        }
    }

    /// Bounds of the box after applying `matrix` to all 8 corners.
    pub fn transform(&self, matrix: &Matrix4<f32>) -> Self {
        let corners: Vec<[f32; 3]> = (0..8)
            .map(|corner| {
                let local = Vector4::new(
                    if corner & 1 == 0 { self.min.x } else { self.max.x },
                    if corner & 2 == 0 { self.min.y } else { self.max.y },
                    if corner & 4 == 0 { self.min.z } else { self.max.z },
                    1.0,
                );
                let world = matrix * local;
                [world.x / world.w, world.y / world.w, world.z / world.w]
            })
            .collect();

        // Eight corners always yield a box.
        Self::from_vertices(&corners).unwrap_or(*self)
    }
}

/// One mesh hit by a ray
#[derive(Debug, Clone, Copy)]
pub struct Intersection {
    pub node: NodeId,
    /// Distance from the ray origin to the nearest hit on this mesh
    pub distance: f32,
    /// World space intersection point
    pub point: Vector3<f32>,
}

/// Ray through a point in normalized device coordinates (`-1..1`, y up).
pub fn screen_to_ray(ndc: Vector2<f32>, camera: &OrbitCamera) -> Ray {
    let inv_view_proj = camera
        .build_view_projection_matrix()
        .invert()
        .unwrap_or(Matrix4::identity());

    // wgpu clip space puts the near plane at z = 0
    let unproject = |z: f32| {
        let world = inv_view_proj * Vector4::new(ndc.x, ndc.y, z, 1.0);
        world.truncate() / world.w
    };
    let near = unproject(0.0);
    let far = unproject(1.0);

    Ray::new(near, far - near)
}

/// Every visible, pickable mesh the ray hits, nearest first.
pub fn intersect_scene(ray: &Ray, scene: &Scene) -> Vec<Intersection> {
    let worlds = scene.world_transforms();
    let mut hits = Vec::new();

    for (id, mesh) in scene.meshes() {
        if !scene.node(id).pickable || !scene.is_visible(id) {
            continue;
        }
        let Some(local_box) = Aabb::from_vertices(&mesh.geometry.vertices) else {
            continue;
        };
        let world = worlds[id.index()];
        if local_box.transform(&world).intersect_ray(ray).is_none() {
            continue;
        }

        let to_world = |p: [f32; 3]| (world * Vector4::new(p[0], p[1], p[2], 1.0)).truncate();
        let nearest = mesh
            .geometry
            .triangles()
            .filter_map(|[a, b, c]| ray.intersect_triangle(to_world(a), to_world(b), to_world(c)))
            .min_by(|a, b| a.total_cmp(b));

        if let Some(distance) = nearest {
            hits.push(Intersection {
                node: id,
                distance,
                point: ray.point_at(distance),
            });
        }
    }

    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::CameraConfig,
        gfx::{geometry::generate_box, resources::Material, scene::NodeData},
        theme::MaterialStyle,
    };

    fn add_box(scene: &mut Scene, at: Vector3<f32>) -> NodeId {
        scene.add_mesh(
            scene.root(),
            "box",
            NodeData::None,
            generate_box(10.0, 10.0, 10.0),
            Material::new(MaterialStyle::new(0xffffff, 1.0)),
            Matrix4::from_translation(at),
        )
    }

    #[test]
    fn test_aabb_creation() {
        let vertices = vec![[0.0, 0.0, 0.0], [1.0, 1.0, 1.0], [-1.0, -1.0, -1.0]];
        let aabb = Aabb::from_vertices(&vertices).unwrap();

        assert_eq!(aabb.min, Vector3::new(-1.0, -1.0, -1.0));
        assert_eq!(aabb.max, Vector3::new(1.0, 1.0, 1.0));
        assert!(Aabb::from_vertices(&[]).is_none());
    }

    #[test]
    fn test_ray_aabb_intersection() {
        let aabb = Aabb::new(Vector3::new(-1.0, -1.0, -1.0), Vector3::new(1.0, 1.0, 1.0));

        // Ray hitting the box
        let ray = Ray::new(Vector3::new(0.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(aabb.intersect_ray(&ray), Some(4.0));

        // Ray missing the box
        let ray_miss = Ray::new(Vector3::new(5.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(aabb.intersect_ray(&ray_miss).is_none());
    }

    #[test]
    fn triangle_hit_and_miss() {
        let a = Vector3::new(-1.0, 0.0, -1.0);
        let b = Vector3::new(1.0, 0.0, -1.0);
        let c = Vector3::new(0.0, 0.0, 1.0);

        let down = Ray::new(Vector3::new(0.0, 5.0, 0.0), Vector3::new(0.0, -1.0, 0.0));
        let t = down.intersect_triangle(a, b, c).unwrap();
        assert!((t - 5.0).abs() < 1e-5);

        let beside = Ray::new(Vector3::new(3.0, 5.0, 0.0), Vector3::new(0.0, -1.0, 0.0));
        assert!(beside.intersect_triangle(a, b, c).is_none());

        let away = Ray::new(Vector3::new(0.0, 5.0, 0.0), Vector3::new(0.0, 1.0, 0.0));
        assert!(away.intersect_triangle(a, b, c).is_none());
    }

    #[test]
    fn hits_are_sorted_nearest_first() {
        let mut scene = Scene::new();
        let low = add_box(&mut scene, Vector3::new(0.0, 0.0, 0.0));
        let high = add_box(&mut scene, Vector3::new(0.0, 50.0, 0.0));
        add_box(&mut scene, Vector3::new(100.0, 0.0, 0.0));

        // Off the face diagonals so each face is hit inside one triangle
        let ray = Ray::new(Vector3::new(1.3, 200.0, 2.1), Vector3::new(0.0, -1.0, 0.0));
        let hits = intersect_scene(&ray, &scene);

        assert_eq!(hits.iter().map(|h| h.node).collect::<Vec<_>>(), vec![high, low]);
        assert!((hits[0].distance - 145.0).abs() < 1e-3);
        assert!((hits[0].point.y - 55.0).abs() < 1e-3);
    }

    #[test]
    fn hidden_and_unpickable_meshes_are_skipped() {
        let mut scene = Scene::new();
        let hidden = add_box(&mut scene, Vector3::new(0.0, 0.0, 0.0));
        let helper = add_box(&mut scene, Vector3::new(0.0, 50.0, 0.0));
        scene.node_mut(hidden).visible = false;
        scene.node_mut(helper).pickable = false;

        let ray = Ray::new(Vector3::new(1.3, 200.0, 2.1), Vector3::new(0.0, -1.0, 0.0));
        assert!(intersect_scene(&ray, &scene).is_empty());
    }

    #[test]
    fn centre_of_screen_looks_at_target() {
        let camera = OrbitCamera::from_config(&CameraConfig::default(), 1.0);
        let ray = screen_to_ray(Vector2::new(0.0, 0.0), &camera);

        let to_target = (camera.target - camera.eye).normalize();
        assert!(ray.direction.dot(to_target) > 0.9999);
        assert!((ray.origin - camera.eye).magnitude() < 1.0);
    }
}
