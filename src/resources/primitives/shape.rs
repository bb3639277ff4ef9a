use glam::{Vec2, Vec3};
use wgpu::VertexFormat;

use crate::resources::geometry::{Attribute, Geometry};

/// Flat polygon in the XY plane facing +Z, triangulated by ear clipping.
///
/// The outline may be given in either winding; a closing point equal to the
/// first one is ignored.
#[must_use]
pub fn create_shape(outline: &[Vec2]) -> Geometry {
    let mut points: Vec<Vec2> = outline.to_vec();
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    if signed_area(&points) < 0.0 {
        points.reverse();
    }

    let indices = triangulate(&points);

    let (min, max) = points.iter().fold(
        (Vec2::splat(f32::INFINITY), Vec2::splat(f32::NEG_INFINITY)),
        |(lo, hi), p| (lo.min(*p), hi.max(*p)),
    );
    let extent = (max - min).max(Vec2::splat(f32::EPSILON));

    let positions: Vec<[f32; 3]> = points.iter().map(|p| [p.x, p.y, 0.0]).collect();
    let normals = vec![[0.0, 0.0, 1.0]; points.len()];
    let uvs: Vec<[f32; 2]> = points
        .iter()
        .map(|p| {
            let uv = (*p - min) / extent;
            [uv.x, 1.0 - uv.y]
        })
        .collect();

    Geometry::from_parts(&positions, &normals, &uvs, &indices)
}

/// Heart outline made of two cubic Bézier curves meeting at the tip `(0, 0)`
/// and the cleft `(0, 0.4)`.
#[must_use]
pub fn heart_outline(segments_per_curve: u32) -> Vec<Vec2> {
    let segments = segments_per_curve.max(2);
    let right = [
        Vec2::new(0.0, 0.0),
        Vec2::new(0.2, 0.2),
        Vec2::new(0.4, 0.1),
        Vec2::new(0.0, 0.4),
    ];
    let left = [
        Vec2::new(0.0, 0.4),
        Vec2::new(-0.4, 0.1),
        Vec2::new(-0.2, 0.2),
        Vec2::new(0.0, 0.0),
    ];

    let mut points = Vec::with_capacity(segments as usize * 2);
    for curve in [right, left] {
        for s in 0..segments {
            let t = s as f32 / segments as f32;
            points.push(cubic_bezier(&curve, t));
        }
    }
    points
}

#[must_use]
pub fn create_heart(segments_per_curve: u32) -> Geometry {
    create_shape(&heart_outline(segments_per_curve))
}

/// A single triangle with a flat normal.
#[must_use]
pub fn create_triangle(a: Vec3, b: Vec3, c: Vec3) -> Geometry {
    let mut geo = Geometry::new();
    let positions = [a.to_array(), b.to_array(), c.to_array()];
    let uvs = [[0.0, 1.0], [1.0, 1.0], [0.5, 0.0]];
    geo.set_attribute(
        "position",
        Attribute::new_planar(&positions, VertexFormat::Float32x3),
    );
    geo.set_attribute("uv", Attribute::new_planar(&uvs, VertexFormat::Float32x2));
    geo.set_indices(&[0, 1, 2]);
    geo.compute_vertex_normals();
    geo.compute_bounding_volume();
    geo
}

fn cubic_bezier(p: &[Vec2; 4], t: f32) -> Vec2 {
    let it = 1.0 - t;
    p[0] * (it * it * it)
        + p[1] * (3.0 * it * it * t)
        + p[2] * (3.0 * it * t * t)
        + p[3] * (t * t * t)
}

fn signed_area(points: &[Vec2]) -> f32 {
    let n = points.len();
    (0..n)
        .map(|i| {
            let a = points[i];
            let b = points[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum::<f32>()
        * 0.5
}

fn point_in_triangle(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> bool {
    let d1 = (b - a).perp_dot(p - a);
    let d2 = (c - b).perp_dot(p - b);
    let d3 = (a - c).perp_dot(p - c);
    d1 >= 0.0 && d2 >= 0.0 && d3 >= 0.0
}

/// Ear clipping for a counter-clockwise simple polygon.
fn triangulate(points: &[Vec2]) -> Vec<u32> {
    let mut remaining: Vec<usize> = (0..points.len()).collect();
    let mut indices = Vec::with_capacity(points.len().saturating_sub(2) * 3);

    while remaining.len() > 3 {
        let n = remaining.len();
        let ear = (0..n).find(|&i| {
            let prev = points[remaining[(i + n - 1) % n]];
            let cur = points[remaining[i]];
            let next = points[remaining[(i + 1) % n]];
            if (cur - prev).perp_dot(next - cur) <= 0.0 {
                return false;
            }
            remaining.iter().all(|&k| {
                let p = points[k];
                p == prev || p == cur || p == next || !point_in_triangle(p, prev, cur, next)
            })
        });

        // Degenerate input: fall back to a fan over what is left.
        let Some(i) = ear else {
            break;
        };

        indices.extend_from_slice(&[
            remaining[(i + n - 1) % n] as u32,
            remaining[i] as u32,
            remaining[(i + 1) % n] as u32,
        ]);
        remaining.remove(i);
    }

    for k in 1..remaining.len().saturating_sub(1) {
        indices.extend_from_slice(&[
            remaining[0] as u32,
            remaining[k] as u32,
            remaining[k + 1] as u32,
        ]);
    }
    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_becomes_two_triangles() {
        let square = [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ];
        let indices = triangulate(&square);
        assert_eq!(indices.len(), 6);
    }

    #[test]
    fn clockwise_outline_is_reoriented() {
        let cw = [
            Vec2::new(0.0, 0.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 0.0),
        ];
        let geo = create_shape(&cw);
        for [a, b, c] in geo.triangles() {
            assert!((b - a).cross(c - a).z >= 0.0);
        }
    }

    #[test]
    fn heart_triangulates_fully() {
        let outline = heart_outline(12);
        assert_eq!(outline.len(), 24);
        let geo = create_heart(12);
        assert_eq!(geo.draw_count() as usize, (outline.len() - 2) * 3);
    }

    #[test]
    fn heart_has_tip_and_cleft() {
        let outline = heart_outline(8);
        assert_eq!(outline[0], Vec2::ZERO);
        assert!((outline[8] - Vec2::new(0.0, 0.4)).length() < 1e-6);
    }
}
