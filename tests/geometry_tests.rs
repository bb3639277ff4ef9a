//! Geometry Tests
//!
//! Tests for:
//! - Procedural primitives: index ranges, triangle lists, unit normals
//! - Bounding volumes of known shapes
//! - Normal recomputation on hand-built geometry
//! - Flat shapes (heart outline, single triangle)

use std::f32::consts::PI;

use glam::{Vec2, Vec3};
use fete::resources::Geometry;
use fete::resources::primitives::{
    CylinderOptions, PlaneOptions, SphereOptions, TorusOptions, create_box, create_cone,
    create_cylinder, create_heart, create_plane, create_shape, create_sphere, create_torus,
    create_triangle,
};

const EPSILON: f32 = 1e-4;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < EPSILON
}

fn primitives() -> Vec<(&'static str, Geometry)> {
    vec![
        ("box", create_box(2.0, 1.0, 3.0)),
        (
            "cylinder",
            create_cylinder(CylinderOptions::new(0.5, 1.0, 2.0, 24)),
        ),
        ("cone", create_cone(0.4, 1.2, 16)),
        ("plane", create_plane(PlaneOptions::new(4.0, 2.0))),
        ("sphere", create_sphere(SphereOptions::new(1.5, 24, 16))),
        (
            "torus",
            create_torus(TorusOptions::new(1.0, 0.2, 12, 32)),
        ),
        ("arc", create_torus(TorusOptions::new(1.0, 0.1, 8, 16).with_arc(PI))),
        ("heart", create_heart(12)),
    ]
}

// ============================================================================
// Primitive consistency
// ============================================================================

#[test]
fn primitives_are_indexed_triangle_lists() {
    for (name, geo) in primitives() {
        let count = geo.vertex_count();
        assert!(count > 0, "{name} has no vertices");
        assert_eq!(geo.draw_count() % 3, 0, "{name} is not a triangle list");

        let indices = geo.indices().expect("primitives are indexed");
        assert!(
            indices.iter().all(|&i| i < count),
            "{name} references a vertex out of range"
        );
        assert_eq!(
            geo.triangles().count() as u32,
            geo.draw_count() / 3,
            "{name} skipped triangles"
        );
    }
}

#[test]
fn primitives_carry_unit_normals_and_uvs() {
    for (name, geo) in primitives() {
        let normals = geo.get_attribute("normal").expect("normal attribute");
        let uvs = geo.get_attribute("uv").expect("uv attribute");
        assert_eq!(normals.count, geo.vertex_count(), "{name} normal count");
        assert_eq!(uvs.count, geo.vertex_count(), "{name} uv count");

        for i in 0..normals.count {
            let n = normals.read_vec3(i).expect("readable normal");
            assert!(
                approx(n.length(), 1.0),
                "{name} normal {i} has length {}",
                n.length()
            );
        }
    }
}

#[test]
fn box_normals_point_outwards() {
    let geo = create_box(1.0, 1.0, 1.0);
    let positions = geo.get_attribute("position").unwrap();
    let normals = geo.get_attribute("normal").unwrap();
    for i in 0..geo.vertex_count() {
        let p = positions.read_vec3(i).unwrap();
        let n = normals.read_vec3(i).unwrap();
        assert!(p.dot(n) > 0.0, "vertex {i} normal points inwards");
    }
}

#[test]
fn plane_faces_positive_z() {
    let geo = create_plane(PlaneOptions::new(1.0, 1.0));
    let normals = geo.get_attribute("normal").unwrap();
    for i in 0..normals.count {
        assert!(vec3_approx(normals.read_vec3(i).unwrap(), Vec3::Z));
    }
    for [a, b, c] in geo.triangles() {
        let face = (b - a).cross(c - a);
        assert!(face.z > 0.0, "plane triangle wound clockwise");
    }
}

// ============================================================================
// Bounding volumes
// ============================================================================

#[test]
fn box_bounding_box_matches_dimensions() {
    let geo = create_box(2.0, 4.0, 6.0);
    let bbox = geo.bounding_box.expect("computed on build");
    assert!(vec3_approx(bbox.min, Vec3::new(-1.0, -2.0, -3.0)));
    assert!(vec3_approx(bbox.max, Vec3::new(1.0, 2.0, 3.0)));
    assert!(vec3_approx(bbox.center(), Vec3::ZERO));
    assert!(vec3_approx(bbox.size(), Vec3::new(2.0, 4.0, 6.0)));
}

#[test]
fn sphere_bounding_sphere_matches_radius() {
    let geo = create_sphere(SphereOptions::new(2.5, 32, 16));
    let sphere = geo.bounding_sphere.expect("computed on build");
    assert!(vec3_approx(sphere.center, Vec3::ZERO));
    assert!(approx(sphere.radius, 2.5));
}

#[test]
fn cylinder_is_centered_on_its_axis() {
    let geo = create_cylinder(CylinderOptions::new(1.0, 1.0, 3.0, 16));
    let bbox = geo.bounding_box.unwrap();
    assert!(approx(bbox.min.y, -1.5));
    assert!(approx(bbox.max.y, 1.5));
    assert!(bbox.max.x <= 1.0 + EPSILON);
}

#[test]
fn bounding_volume_is_empty_without_positions() {
    let mut geo = Geometry::new();
    geo.compute_bounding_volume();
    assert!(geo.bounding_box.is_none());
    assert!(geo.bounding_sphere.is_none());
    assert_eq!(geo.vertex_count(), 0);
    assert_eq!(geo.triangles().count(), 0);
}

// ============================================================================
// Flat shapes
// ============================================================================

#[test]
fn triangle_gets_a_flat_normal() {
    let geo = create_triangle(Vec3::ZERO, Vec3::X, Vec3::Y);
    let normals = geo.get_attribute("normal").unwrap();
    for i in 0..3 {
        assert!(vec3_approx(normals.read_vec3(i).unwrap(), Vec3::Z));
    }
}

#[test]
fn shape_accepts_either_winding() {
    let square = [
        Vec2::new(0.0, 0.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(0.0, 1.0),
    ];
    let mut reversed = square;
    reversed.reverse();

    for outline in [&square[..], &reversed[..]] {
        let geo = create_shape(outline);
        assert_eq!(geo.draw_count(), 6);
        let area: f32 = geo
            .triangles()
            .map(|[a, b, c]| (b - a).cross(c - a).z * 0.5)
            .sum();
        assert!(approx(area, 1.0), "area {area}");
    }
}

#[test]
fn heart_spans_tip_to_cleft() {
    let geo = create_heart(16);
    let bbox = geo.bounding_box.unwrap();
    assert!(approx(bbox.min.y, 0.0), "tip at the origin");
    assert!(approx(bbox.max.y, 0.4), "cleft at the top");
    assert!((bbox.min.x + bbox.max.x).abs() < 0.01, "heart is symmetric");
}
