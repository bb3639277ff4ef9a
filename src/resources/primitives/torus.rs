use std::f32::consts::TAU;

use glam::Vec3;

use crate::resources::geometry::Geometry;

/// Options for [`create_torus`]. The ring lies in the XY plane.
#[derive(Debug, Clone, Copy)]
pub struct TorusOptions {
    pub radius: f32,
    pub tube: f32,
    pub radial_segments: u32,
    pub tubular_segments: u32,
    /// Swept angle of the ring in radians; `TAU` closes it, `PI` gives a half loop.
    pub arc: f32,
}

impl Default for TorusOptions {
    fn default() -> Self {
        Self {
            radius: 1.0,
            tube: 0.4,
            radial_segments: 12,
            tubular_segments: 48,
            arc: TAU,
        }
    }
}

impl TorusOptions {
    #[must_use]
    pub fn new(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> Self {
        Self {
            radius,
            tube,
            radial_segments,
            tubular_segments,
            arc: TAU,
        }
    }

    #[must_use]
    pub fn with_arc(mut self, arc: f32) -> Self {
        self.arc = arc;
        self
    }
}

#[must_use]
pub fn create_torus(options: TorusOptions) -> Geometry {
    let radial = options.radial_segments.max(3);
    let tubular = options.tubular_segments.max(3);

    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut uvs = Vec::new();
    let mut indices = Vec::new();

    for j in 0..=radial {
        let v = j as f32 / radial as f32 * TAU;
        for i in 0..=tubular {
            let u = i as f32 / tubular as f32 * options.arc;
            let ring = options.radius + options.tube * v.cos();
            let p = Vec3::new(ring * u.cos(), ring * u.sin(), options.tube * v.sin());
            let center = Vec3::new(options.radius * u.cos(), options.radius * u.sin(), 0.0);

            positions.push(p.to_array());
            normals.push((p - center).normalize_or_zero().to_array());
            uvs.push([i as f32 / tubular as f32, j as f32 / radial as f32]);
        }
    }

    let stride = tubular + 1;
    for j in 1..=radial {
        for i in 1..=tubular {
            let a = stride * j + i - 1;
            let b = stride * (j - 1) + i - 1;
            let c = stride * (j - 1) + i;
            let d = stride * j + i;
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }

    Geometry::from_parts(&positions, &normals, &uvs, &indices)
}
