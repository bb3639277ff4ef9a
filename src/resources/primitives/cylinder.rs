use std::f32::consts::TAU;

use glam::Vec3;

use crate::resources::geometry::Geometry;

/// Options for [`create_cylinder`]. A zero `radius_top` yields a cone.
#[derive(Debug, Clone, Copy)]
pub struct CylinderOptions {
    pub radius_top: f32,
    pub radius_bottom: f32,
    pub height: f32,
    pub radial_segments: u32,
    pub height_segments: u32,
    pub open_ended: bool,
}

impl Default for CylinderOptions {
    fn default() -> Self {
        Self {
            radius_top: 1.0,
            radius_bottom: 1.0,
            height: 1.0,
            radial_segments: 32,
            height_segments: 1,
            open_ended: false,
        }
    }
}

impl CylinderOptions {
    #[must_use]
    pub fn new(radius_top: f32, radius_bottom: f32, height: f32, radial_segments: u32) -> Self {
        Self {
            radius_top,
            radius_bottom,
            height,
            radial_segments,
            ..Default::default()
        }
    }
}

/// Tapered cylinder centered on the origin, axis along +Y.
#[must_use]
pub fn create_cylinder(options: CylinderOptions) -> Geometry {
    let radial = options.radial_segments.max(3);
    let rows = options.height_segments.max(1);
    let half_height = options.height / 2.0;
    let slope = (options.radius_bottom - options.radius_top) / options.height.max(f32::EPSILON);

    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut uvs = Vec::new();
    let mut indices = Vec::new();

    // === Side ===
    for y in 0..=rows {
        let v = y as f32 / rows as f32;
        let radius = v * (options.radius_bottom - options.radius_top) + options.radius_top;
        for x in 0..=radial {
            let u = x as f32 / radial as f32;
            let theta = u * TAU;
            let (sin, cos) = theta.sin_cos();

            positions.push([radius * sin, -v * options.height + half_height, radius * cos]);
            normals.push(Vec3::new(sin, slope, cos).normalize_or_zero().to_array());
            uvs.push([u, v]);
        }
    }

    let stride = radial + 1;
    for y in 0..rows {
        for x in 0..radial {
            let a = y * stride + x;
            let b = (y + 1) * stride + x;
            let c = (y + 1) * stride + x + 1;
            let d = y * stride + x + 1;
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }

    // === Caps ===
    if !options.open_ended {
        if options.radius_top > 0.0 {
            push_cap(
                &mut positions,
                &mut normals,
                &mut uvs,
                &mut indices,
                radial,
                options.radius_top,
                half_height,
                true,
            );
        }
        if options.radius_bottom > 0.0 {
            push_cap(
                &mut positions,
                &mut normals,
                &mut uvs,
                &mut indices,
                radial,
                options.radius_bottom,
                -half_height,
                false,
            );
        }
    }

    Geometry::from_parts(&positions, &normals, &uvs, &indices)
}

fn push_cap(
    positions: &mut Vec<[f32; 3]>,
    normals: &mut Vec<[f32; 3]>,
    uvs: &mut Vec<[f32; 2]>,
    indices: &mut Vec<u32>,
    radial: u32,
    radius: f32,
    y: f32,
    top: bool,
) {
    let sign = if top { 1.0 } else { -1.0 };
    let center = positions.len() as u32;
    positions.push([0.0, y, 0.0]);
    normals.push([0.0, sign, 0.0]);
    uvs.push([0.5, 0.5]);

    let ring_start = positions.len() as u32;
    for x in 0..=radial {
        let theta = x as f32 / radial as f32 * TAU;
        let (sin, cos) = theta.sin_cos();
        positions.push([radius * sin, y, radius * cos]);
        normals.push([0.0, sign, 0.0]);
        uvs.push([cos * 0.5 + 0.5, sin * 0.5 * sign + 0.5]);
    }

    for x in 0..radial {
        let i = ring_start + x;
        if top {
            indices.extend_from_slice(&[center, i, i + 1]);
        } else {
            indices.extend_from_slice(&[center, i + 1, i]);
        }
    }
}

/// Cone centered on the origin with its apex at `+height / 2`.
#[must_use]
pub fn create_cone(radius: f32, height: f32, radial_segments: u32) -> Geometry {
    create_cylinder(CylinderOptions::new(0.0, radius, height, radial_segments))
}
