use crate::resources::geometry::Geometry;
use std::f32::consts::PI;

pub struct SphereOptions {
    pub radius: f32,
    pub width_segments: u32,
    pub height_segments: u32,
}

impl Default for SphereOptions {
    fn default() -> Self {
        Self {
            radius: 1.0,
            width_segments: 32,
            height_segments: 16,
        }
    }
}

impl SphereOptions {
    #[must_use]
    pub fn new(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        Self {
            radius,
            width_segments,
            height_segments,
        }
    }
}

#[must_use]
pub fn create_sphere(options: SphereOptions) -> Geometry {
    let radius = options.radius;
    let width_segments = options.width_segments.max(3);
    let height_segments = options.height_segments.max(2);

    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut uvs = Vec::new();
    let mut indices = Vec::new();

    for y in 0..=height_segments {
        let v_ratio = y as f32 / height_segments as f32;
        // latitude from the north pole (0) to the south pole (PI)
        let theta = v_ratio * PI;
        let py = radius * theta.cos();
        let ring_radius = radius * theta.sin();

        for x in 0..=width_segments {
            let u_ratio = x as f32 / width_segments as f32;
            let phi = u_ratio * 2.0 * PI;

            let px = -ring_radius * phi.cos();
            let pz = ring_radius * phi.sin();

            positions.push([px, py, pz]);
            let n = glam::Vec3::new(px, py, pz).normalize_or_zero();
            normals.push(n.to_array());
            uvs.push([u_ratio, v_ratio]);
        }
    }

    let stride = width_segments + 1;
    for y in 0..height_segments {
        for x in 0..width_segments {
            let v0 = y * stride + x;
            let v1 = v0 + 1;
            let v2 = (y + 1) * stride + x;
            let v3 = v2 + 1;

            if y != 0 {
                indices.extend_from_slice(&[v0, v2, v1]);
            }
            if y != height_segments - 1 {
                indices.extend_from_slice(&[v1, v2, v3]);
            }
        }
    }

    Geometry::from_parts(&positions, &normals, &uvs, &indices)
}
