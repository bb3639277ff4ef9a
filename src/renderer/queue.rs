//! Render queue
//!
//! Extracts the drawable meshes of a scene for one camera, culls them against
//! the view frustum and orders them for drawing. Nothing here touches the GPU.

use glam::{Affine3A, Vec3};

use crate::renderer::pipeline::PipelineFlags;
use crate::resources::{GeometryKey, MaterialKey};
use crate::scene::{Camera, NodeHandle, Scene};

#[derive(Debug, Clone, Copy)]
pub struct DrawItem {
    pub node: NodeHandle,
    pub world: Affine3A,
    pub geometry: GeometryKey,
    pub material: MaterialKey,
    pub flags: PipelineFlags,
    pub render_order: i32,
    /// Squared distance from the camera to the bounding-sphere center.
    pub distance_sq: f32,
}

impl DrawItem {
    #[must_use]
    pub fn is_transparent(&self) -> bool {
        self.flags.contains(PipelineFlags::TRANSPARENT)
    }
}

/// Collects every visible, non-culled mesh. World matrices must be current.
#[must_use]
pub fn collect(scene: &Scene, camera: &Camera) -> Vec<DrawItem> {
    let frustum = camera.frustum();
    let eye = camera.position();

    let mut items: Vec<DrawItem> = scene
        .nodes
        .iter()
        .filter_map(|(handle, node)| {
            let mesh = scene.meshes.get(node.mesh?)?;
            let geometry = scene.geometries.get(mesh.geometry)?;
            let material = scene.materials.get(mesh.material)?;
            if !scene.is_visible_in_world(handle) {
                return None;
            }

            let world = *node.world_matrix();
            let (center, radius) = match geometry.bounding_sphere {
                Some(sphere) => (
                    world.transform_point3(sphere.center),
                    sphere.radius * max_scale(&world),
                ),
                None => (Vec3::from(world.translation), f32::INFINITY),
            };
            if radius.is_finite() && !frustum.intersects_sphere(center, radius) {
                return None;
            }

            Some(DrawItem {
                node: handle,
                world,
                geometry: mesh.geometry,
                material: mesh.material,
                flags: PipelineFlags::for_material(material),
                render_order: mesh.render_order,
                distance_sq: center.distance_squared(eye),
            })
        })
        .collect();

    sort(&mut items);
    items
}

/// Opaque meshes first, grouped by pipeline and material to limit state
/// changes. Transparent meshes follow, by `render_order` and then back to
/// front.
pub fn sort(items: &mut [DrawItem]) {
    items.sort_by(|a, b| {
        a.is_transparent()
            .cmp(&b.is_transparent())
            .then_with(|| {
                if a.is_transparent() {
                    a.render_order
                        .cmp(&b.render_order)
                        .then_with(|| b.distance_sq.total_cmp(&a.distance_sq))
                } else {
                    a.flags
                        .bits()
                        .cmp(&b.flags.bits())
                        .then_with(|| a.material.cmp(&b.material))
                }
            })
    });
}

fn max_scale(world: &Affine3A) -> f32 {
    world
        .matrix3
        .x_axis
        .length()
        .max(world.matrix3.y_axis.length())
        .max(world.matrix3.z_axis.length())
}
