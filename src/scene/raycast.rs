//! Ray picking
//!
//! Rays are built from normalized device coordinates through a camera and
//! tested against mesh nodes: first a world-space bounding-sphere rejection,
//! then exact triangle tests in the mesh's local space.

use glam::{Affine3A, Vec2, Vec3};
use smallvec::SmallVec;

use crate::resources::{Geometry, Side};
use crate::scene::camera::Camera;
use crate::scene::scene::Scene;
use crate::scene::NodeHandle;

const EPSILON: f32 = 1e-7;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length.
    pub direction: Vec3,
}

impl Ray {
    #[must_use]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Ray from the near plane through `ndc` (x right, y up, both in [-1, 1]).
    ///
    /// Returns `None` for a degenerate camera.
    #[must_use]
    pub fn from_camera(camera: &Camera, ndc: Vec2) -> Option<Self> {
        let inv = camera.view_projection_matrix().inverse();
        if !inv.is_finite() {
            return None;
        }
        let near = inv.project_point3(ndc.extend(0.0));
        let far = inv.project_point3(ndc.extend(1.0));
        let direction = (far - near).normalize_or_zero();
        if direction == Vec3::ZERO {
            return None;
        }
        Some(Self {
            origin: near,
            direction,
        })
    }

    #[must_use]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Distance along the ray to the first sphere hit, if any.
    ///
    /// A ray starting inside the sphere reports the exit point.
    #[must_use]
    pub fn intersect_sphere(&self, center: Vec3, radius: f32) -> Option<f32> {
        let oc = center - self.origin;
        let tca = oc.dot(self.direction);
        let d2 = oc.length_squared() - tca * tca;
        let r2 = radius * radius;
        if d2 > r2 {
            return None;
        }
        let thc = (r2 - d2).sqrt();
        let t0 = tca - thc;
        let t1 = tca + thc;
        if t1 < 0.0 {
            return None;
        }
        Some(if t0 < 0.0 { t1 } else { t0 })
    }

    /// Möller–Trumbore intersection. Back faces are rejected unless
    /// `double_sided`. The returned `t` is in units of `direction`.
    #[must_use]
    pub fn intersect_triangle(&self, a: Vec3, b: Vec3, c: Vec3, double_sided: bool) -> Option<f32> {
        let edge1 = b - a;
        let edge2 = c - a;
        let p = self.direction.cross(edge2);
        let det = edge1.dot(p);

        if double_sided {
            if det.abs() < EPSILON {
                return None;
            }
        } else if det < EPSILON {
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

/// A ray hit on a mesh node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub node: NodeHandle,
    /// World-space distance from the ray origin.
    pub distance: f32,
    pub point: Vec3,
}

pub type Intersections = SmallVec<[Intersection; 4]>;

/// Picks mesh nodes along a ray.
///
/// World matrices must be up to date (`Scene::update_matrix_world`).
#[derive(Debug, Clone, Copy)]
pub struct Raycaster {
    pub ray: Ray,
    pub near: f32,
    pub far: f32,
}

impl Raycaster {
    #[must_use]
    pub fn new(ray: Ray) -> Self {
        Self {
            ray,
            near: 0.0,
            far: f32::INFINITY,
        }
    }

    #[must_use]
    pub fn from_camera(camera: &Camera, ndc: Vec2) -> Option<Self> {
        Ray::from_camera(camera, ndc).map(Self::new)
    }

    /// Closest hit on the mesh attached to `node` itself (children ignored).
    #[must_use]
    pub fn intersect_node(&self, scene: &Scene, node: NodeHandle) -> Option<Intersection> {
        let (geometry, _) = scene.node_geometry(node)?;
        let double_sided = scene
            .node_material(node)
            .is_some_and(|m| m.side == Side::Double);
        let world = scene.world_matrix(node)?;
        let distance = self.intersect_geometry(geometry, &world, double_sided)?;
        Some(Intersection {
            node,
            distance,
            point: self.ray.at(distance),
        })
    }

    /// All hits in the visible part of the subtree under `root`, nearest first.
    ///
    /// An invisible node hides its whole subtree from picking.
    #[must_use]
    pub fn intersect_subtree(&self, scene: &Scene, root: NodeHandle) -> Intersections {
        let mut hits = Intersections::new();
        if !scene.is_visible_in_world(root) {
            return hits;
        }

        let mut stack = vec![root];
        while let Some(handle) = stack.pop() {
            let Some(node) = scene.get_node(handle) else {
                continue;
            };
            if !node.visible {
                continue;
            }
            if let Some(hit) = self.intersect_node(scene, handle) {
                hits.push(hit);
            }
            stack.extend(node.children().iter().copied());
        }

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    /// Whether anything in the visible subtree under `root` is hit.
    #[must_use]
    pub fn hits_subtree(&self, scene: &Scene, root: NodeHandle) -> bool {
        !self.intersect_subtree(scene, root).is_empty()
    }

    fn intersect_geometry(
        &self,
        geometry: &Geometry,
        world: &Affine3A,
        double_sided: bool,
    ) -> Option<f32> {
        if let Some(sphere) = geometry.bounding_sphere {
            let center = world.transform_point3(sphere.center);
            let max_scale = world
                .matrix3
                .x_axis
                .length()
                .max(world.matrix3.y_axis.length())
                .max(world.matrix3.z_axis.length());
            self.ray.intersect_sphere(center, sphere.radius * max_scale)?;
        }

        let inverse = world.inverse();
        // Unnormalized local direction keeps `t` in world units.
        let local = Ray {
            origin: inverse.transform_point3(self.ray.origin),
            direction: inverse.transform_vector3(self.ray.direction),
        };

        let mut best: Option<f32> = None;
        for [a, b, c] in geometry.triangles() {
            let Some(t) = local.intersect_triangle(a, b, c, double_sided) else {
                continue;
            };
            if t < self.near || t > self.far {
                continue;
            }
            if best.is_none_or(|current| t < current) {
                best = Some(t);
            }
        }
        best
    }
}
