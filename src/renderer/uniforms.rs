//! GPU-side uniform layouts.
//!
//! Every struct here mirrors a WGSL struct in `shaders/scene.wgsl`; field
//! order and padding must stay in sync with the shader.

use bytemuck::{Pod, Zeroable};
use glam::{Affine3A, Mat3, Mat4, Vec3, Vec4};

use crate::resources::{Material, MaterialKind};
use crate::scene::{AmbientLight, Light, LightKind};

/// Lights beyond this count are ignored by the forward shader.
pub const MAX_LIGHTS: usize = 16;

/// Stride of one model slot in the dynamic uniform buffer. 256 is the
/// `min_uniform_buffer_offset_alignment` every backend accepts.
pub const MODEL_STRIDE: u64 = 256;

pub const LIGHT_DIRECTIONAL: f32 = 0.0;
pub const LIGHT_POINT: f32 = 1.0;

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct GpuLight {
    /// xyz: world position (point) or direction towards the light
    /// (directional); w: kind.
    pub position: [f32; 4],
    /// rgb: color * intensity; w: range (point only).
    pub color: [f32; 4],
}

/// Group 0, binding 0.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct GlobalUniforms {
    pub view_projection: [[f32; 4]; 4],
    /// xyz: camera world position; w: exposure.
    pub camera_position: [f32; 4],
    /// rgb: ambient color * intensity.
    pub ambient: [f32; 4],
    /// rgb: sky color * intensity of every hemisphere light, summed.
    pub hemisphere_sky: [f32; 4],
    pub hemisphere_ground: [f32; 4],
    /// x: number of valid entries in `lights`.
    pub counts: [u32; 4],
    pub lights: [GpuLight; MAX_LIGHTS],
}

impl GlobalUniforms {
    /// Packs the camera and the active lights. Extra lights are dropped
    /// in iteration order.
    pub fn new<'a>(
        view_projection: &Mat4,
        camera_position: Vec3,
        exposure: f32,
        ambient: &AmbientLight,
        lights: impl IntoIterator<Item = (&'a Light, &'a Affine3A)>,
    ) -> Self {
        let mut uniforms = Self::zeroed();
        uniforms.view_projection = view_projection.to_cols_array_2d();
        uniforms.camera_position = camera_position.extend(exposure).to_array();
        uniforms.ambient = (ambient.color * ambient.intensity).extend(1.0).to_array();

        let mut sky = Vec3::ZERO;
        let mut ground = Vec3::ZERO;
        let mut count = 0;
        for (light, world) in lights {
            let radiance = light.color * light.intensity;
            let position = Vec3::from(world.translation);
            let packed = match light.kind {
                LightKind::Hemisphere { ground_color } => {
                    sky += radiance;
                    ground += ground_color * light.intensity;
                    continue;
                }
                LightKind::Directional => GpuLight {
                    position: position
                        .try_normalize()
                        .unwrap_or(Vec3::Y)
                        .extend(LIGHT_DIRECTIONAL)
                        .to_array(),
                    color: radiance.extend(0.0).to_array(),
                },
                LightKind::Point { range } => GpuLight {
                    position: position.extend(LIGHT_POINT).to_array(),
                    color: radiance.extend(range).to_array(),
                },
            };
            if count == MAX_LIGHTS {
                log::trace!("Light limit reached, extra lights skipped");
                continue;
            }
            uniforms.lights[count] = packed;
            count += 1;
        }

        uniforms.hemisphere_sky = sky.extend(1.0).to_array();
        uniforms.hemisphere_ground = ground.extend(1.0).to_array();
        uniforms.counts = [count as u32, 0, 0, 0];
        uniforms
    }
}

/// Group 1, binding 0.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct MaterialUniforms {
    /// rgb: base color; a: opacity.
    pub color: [f32; 4],
    pub emissive: [f32; 4],
    /// x: roughness, y: metalness, z: lit flag, w: map flag.
    pub params: [f32; 4],
}

impl MaterialUniforms {
    #[must_use]
    pub fn from_material(material: &Material, has_map: bool) -> Self {
        let (roughness, metalness, lit) = match material.kind {
            MaterialKind::Standard {
                roughness,
                metalness,
            } => (roughness, metalness, 1.0),
            MaterialKind::Basic => (1.0, 0.0, 0.0),
        };
        Self {
            color: material.color.extend(material.opacity).to_array(),
            emissive: material.emissive.extend(0.0).to_array(),
            params: [roughness, metalness, lit, if has_map { 1.0 } else { 0.0 }],
        }
    }
}

/// Group 2, binding 0 (dynamic offset).
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct ModelUniforms {
    pub model: [[f32; 4]; 4],
    /// Inverse-transpose of the upper 3x3, stored as columns of a mat4.
    pub normal: [[f32; 4]; 4],
}

impl ModelUniforms {
    #[must_use]
    pub fn new(world: &Affine3A) -> Self {
        let normal = Mat3::from(world.matrix3).inverse().transpose();
        let normal = Mat4::from_cols(
            Vec4::from((normal.x_axis, 0.0)),
            Vec4::from((normal.y_axis, 0.0)),
            Vec4::from((normal.z_axis, 0.0)),
            Vec4::W,
        );
        Self {
            model: Mat4::from(*world).to_cols_array_2d(),
            normal: normal.to_cols_array_2d(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layouts_fit_uniform_rules() {
        assert_eq!(std::mem::size_of::<GpuLight>(), 32);
        assert_eq!(std::mem::size_of::<GlobalUniforms>() % 16, 0);
        assert_eq!(std::mem::size_of::<MaterialUniforms>(), 48);
        assert!(std::mem::size_of::<ModelUniforms>() as u64 <= MODEL_STRIDE);
    }

    #[test]
    fn hemisphere_lights_fold_into_globals() {
        let sky = Light::new_hemisphere(Vec3::ONE, Vec3::new(0.5, 0.0, 0.0), 0.5);
        let point = Light::new_point(Vec3::ONE, 2.0, 20.0);
        let at = Affine3A::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let uniforms = GlobalUniforms::new(
            &Mat4::IDENTITY,
            Vec3::ZERO,
            1.0,
            &AmbientLight::default(),
            [(&sky, &at), (&point, &at)],
        );
        assert_eq!(uniforms.counts[0], 1);
        assert_eq!(uniforms.hemisphere_sky[..3], [0.5, 0.5, 0.5]);
        assert_eq!(uniforms.hemisphere_ground[0], 0.25);
        assert_eq!(uniforms.lights[0].position, [1.0, 2.0, 3.0, LIGHT_POINT]);
        assert_eq!(uniforms.lights[0].color[3], 20.0);
    }
}
