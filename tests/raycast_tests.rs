//! Raycast Tests
//!
//! Tests for:
//! - Ray primitives: sphere and triangle intersection, culling of back faces
//! - Raycaster: world transforms, nearest-first ordering, hidden subtrees
//! - Camera rays from normalized device coordinates
//! - Party clicks: envelope priority over candles, candles blown out once,
//!   every candle along the ray blown out together

use glam::{Vec2, Vec3};
use rand::SeedableRng;
use rand::rngs::StdRng;

use fete::assets::CaptionRasterizer;
use fete::config::PartyConfig;
use fete::interaction::{ClickOutcome, resolve_click};
use fete::party::{PartyScene, compose_party};
use fete::resources::Material;
use fete::resources::primitives::{PlaneOptions, SphereOptions, create_plane, create_sphere};
use fete::scene::{Camera, NodeHandle, Ray, Raycaster, Scene};

const EPSILON: f32 = 1e-4;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < EPSILON
}

fn add_sphere(scene: &mut Scene, name: &'static str, position: Vec3) -> NodeHandle {
    let geo = scene.add_geometry(create_sphere(SphereOptions::new(1.0, 32, 16)));
    let mat = scene.add_material(Material::standard(0xffffff));
    scene
        .build_node(name)
        .with_mesh(geo, mat)
        .with_position(position)
        .build()
}

// ============================================================================
// Ray primitives
// ============================================================================

#[test]
fn ray_direction_is_normalized() {
    let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -5.0));
    assert!(vec3_approx(ray.direction, -Vec3::Z));
    assert!(vec3_approx(ray.at(2.0), Vec3::new(0.0, 0.0, -2.0)));
}

#[test]
fn ray_hits_sphere_at_near_surface() {
    let ray = Ray::new(Vec3::ZERO, -Vec3::Z);
    let t = ray.intersect_sphere(Vec3::new(0.0, 0.0, -10.0), 2.0).unwrap();
    assert!(approx(t, 8.0));
}

#[test]
fn ray_inside_sphere_hits_far_surface() {
    let ray = Ray::new(Vec3::ZERO, Vec3::X);
    let t = ray.intersect_sphere(Vec3::ZERO, 3.0).unwrap();
    assert!(approx(t, 3.0));
}

#[test]
fn ray_misses_sphere_behind_or_beside() {
    let ray = Ray::new(Vec3::ZERO, -Vec3::Z);
    assert!(ray.intersect_sphere(Vec3::new(0.0, 0.0, 10.0), 1.0).is_none());
    assert!(ray.intersect_sphere(Vec3::new(3.0, 0.0, -10.0), 1.0).is_none());
}

#[test]
fn triangle_front_face_is_hit() {
    let ray = Ray::new(Vec3::new(0.2, 0.2, 5.0), -Vec3::Z);
    let t = ray
        .intersect_triangle(Vec3::ZERO, Vec3::X, Vec3::Y, false)
        .unwrap();
    assert!(approx(t, 5.0));
}

#[test]
fn triangle_back_face_needs_double_side() {
    let ray = Ray::new(Vec3::new(0.2, 0.2, -5.0), Vec3::Z);
    assert!(ray.intersect_triangle(Vec3::ZERO, Vec3::X, Vec3::Y, false).is_none());
    assert!(ray.intersect_triangle(Vec3::ZERO, Vec3::X, Vec3::Y, true).is_some());
}

#[test]
fn triangle_outside_barycentric_range_is_missed() {
    let ray = Ray::new(Vec3::new(0.8, 0.8, 5.0), -Vec3::Z);
    assert!(ray.intersect_triangle(Vec3::ZERO, Vec3::X, Vec3::Y, true).is_none());
}

// ============================================================================
// Raycaster against scene nodes
// ============================================================================

#[test]
fn raycaster_uses_world_transforms() {
    let mut scene = Scene::new();
    let sphere = add_sphere(&mut scene, "Ball", Vec3::new(0.0, 0.0, -10.0));
    scene.update_matrix_world();

    let raycaster = Raycaster::new(Ray::new(Vec3::ZERO, -Vec3::Z));
    let hit = raycaster.intersect_node(&scene, sphere).unwrap();
    assert!((hit.distance - 9.0).abs() < 0.05, "distance {}", hit.distance);
    assert!((hit.point.z + 9.0).abs() < 0.05);

    let aside = Raycaster::new(Ray::new(Vec3::new(5.0, 0.0, 0.0), -Vec3::Z));
    assert!(aside.intersect_node(&scene, sphere).is_none());
}

#[test]
fn subtree_hits_are_sorted_nearest_first() {
    let mut scene = Scene::new();
    let root = scene.build_node("Root").build();
    let far = add_sphere(&mut scene, "Far", Vec3::new(0.0, 0.0, -20.0));
    let near = add_sphere(&mut scene, "Near", Vec3::new(0.0, 0.0, -5.0));
    scene.attach(far, root);
    scene.attach(near, root);
    scene.update_matrix_world();

    let raycaster = Raycaster::new(Ray::new(Vec3::ZERO, -Vec3::Z));
    let hits = raycaster.intersect_subtree(&scene, root);
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].node, near);
    assert_eq!(hits[1].node, far);
}

#[test]
fn hidden_subtrees_are_not_picked() {
    let mut scene = Scene::new();
    let root = scene.build_node("Root").build();
    let group = scene.build_node("Group").with_parent(root).build();
    let ball = add_sphere(&mut scene, "Ball", Vec3::new(0.0, 0.0, -5.0));
    scene.attach(ball, group);
    scene.update_matrix_world();

    let raycaster = Raycaster::new(Ray::new(Vec3::ZERO, -Vec3::Z));
    assert!(raycaster.hits_subtree(&scene, root));

    scene.set_visible(group, false);
    assert!(!raycaster.hits_subtree(&scene, root));
    assert!(!raycaster.hits_subtree(&scene, ball));

    scene.set_visible(group, true);
    scene.set_visible(root, false);
    assert!(!raycaster.hits_subtree(&scene, ball));
}

#[test]
fn single_sided_plane_is_invisible_from_behind() {
    let mut scene = Scene::new();
    let geo = scene.add_geometry(create_plane(PlaneOptions::new(2.0, 2.0)));
    let front = scene.add_material(Material::basic(0xffffff));
    let double = scene.add_material(Material::basic(0xffffff).double_sided());
    let a = scene.build_node("Front").with_mesh(geo, front).build();
    let b = scene.build_node("Double").with_mesh(geo, double).build();
    scene.update_matrix_world();

    let from_behind = Raycaster::new(Ray::new(Vec3::new(0.0, 0.0, -3.0), Vec3::Z));
    assert!(from_behind.intersect_node(&scene, a).is_none());
    assert!(from_behind.intersect_node(&scene, b).is_some());
}

#[test]
fn near_and_far_limit_hits() {
    let mut scene = Scene::new();
    let ball = add_sphere(&mut scene, "Ball", Vec3::new(0.0, 0.0, -10.0));
    scene.update_matrix_world();

    let mut raycaster = Raycaster::new(Ray::new(Vec3::ZERO, -Vec3::Z));
    raycaster.far = 5.0;
    assert!(raycaster.intersect_node(&scene, ball).is_none());
}

// ============================================================================
// Camera rays
// ============================================================================

#[test]
fn center_of_screen_looks_down_the_view_axis() {
    let mut scene = Scene::new();
    let camera = scene.add_camera(Camera::new_perspective(60.0, 1.5, 0.1, 100.0));
    scene.active_camera = Some(camera);
    scene.get_node_mut(camera).unwrap().transform.position = Vec3::new(0.0, 0.0, 10.0);
    scene.update_matrix_world();

    let ray = Ray::from_camera(scene.main_camera().unwrap(), Vec2::ZERO).unwrap();
    assert!(vec3_approx(ray.direction, -Vec3::Z));
    assert!((ray.origin.z - 9.9).abs() < 1e-3, "origin on the near plane");
}

#[test]
fn screen_corners_diverge_from_the_axis() {
    let camera = Camera::new_perspective(60.0, 1.0, 0.1, 100.0);
    let right = Ray::from_camera(&camera, Vec2::new(1.0, 0.0)).unwrap();
    let top = Ray::from_camera(&camera, Vec2::new(0.0, 1.0)).unwrap();
    assert!(right.direction.x > 0.0);
    assert!(top.direction.y > 0.0);
    // Half of a 60 degree field of view.
    let angle = top.direction.angle_between(-Vec3::Z).to_degrees();
    assert!((angle - 30.0).abs() < 0.1, "angle {angle}");
}

// ============================================================================
// Party clicks
// ============================================================================

fn party() -> (Scene, PartyScene) {
    let mut scene = Scene::new();
    let mut captions = CaptionRasterizer::empty();
    let mut rng = StdRng::seed_from_u64(7);
    let party = compose_party(&mut scene, &PartyConfig::default(), &mut captions, &mut rng);
    scene.update_matrix_world();
    (scene, party)
}

fn project(scene: &Scene, world: Vec3) -> Vec2 {
    let camera = scene.main_camera().unwrap();
    camera.view_projection_matrix().project_point3(world).truncate()
}

/// A point on the candle body `height` above its base.
fn candle_point(scene: &Scene, party: &PartyScene, index: usize, height: f32) -> Vec3 {
    scene.world_position(party.handles.candles[index].root).unwrap() + Vec3::new(0.0, height, 0.0)
}

#[test]
fn clicking_a_candle_blows_it_out_once() {
    let (scene, mut party) = party();
    // Low on the front candle, so the ray passes below the candle behind it.
    let ndc = project(&scene, candle_point(&scene, &party, 0, 0.1));

    let outcome = resolve_click(&scene, &party.handles, &mut party.simulation, ndc, || {
        unreachable!("the envelope is not under this candle")
    });
    assert!(matches!(&outcome, ClickOutcome::BlewOut(ids) if ids.as_slice() == [0]));
    assert_eq!(party.simulation.lit_count(), 3);
    assert!(!party.simulation.candles[0].lit);

    let again = resolve_click(&scene, &party.handles, &mut party.simulation, ndc, String::new);
    assert_eq!(again, ClickOutcome::Miss);
    assert_eq!(party.simulation.lit_count(), 3);
}

#[test]
fn envelope_takes_priority_over_candles() {
    let (mut scene, mut party) = party();

    // Put candle 0 on the same ray, behind the envelope.
    let envelope = scene.world_position(party.handles.envelope).unwrap();
    let eye = scene.main_camera().unwrap().position();
    let behind = envelope + (envelope - eye).normalize() * 2.0;
    let candle = party.handles.candles[0].root;
    scene.get_node_mut(candle).unwrap().transform.position = behind - Vec3::new(0.0, 0.4, 0.0);
    scene.update_matrix_world();

    let ndc = project(&scene, envelope);
    let outcome = resolve_click(&scene, &party.handles, &mut party.simulation, ndc, || {
        "wish".to_string()
    });
    assert_eq!(outcome, ClickOutcome::OpenWish("wish".to_string()));
    assert_eq!(party.simulation.lit_count(), 4);

    // With the envelope hidden the same click reaches the candle.
    scene.set_visible(party.handles.envelope, false);
    let outcome = resolve_click(&scene, &party.handles, &mut party.simulation, ndc, String::new);
    assert!(matches!(&outcome, ClickOutcome::BlewOut(ids) if ids.as_slice() == [0]));
    assert_eq!(party.simulation.lit_count(), 3);
}

#[test]
fn one_click_through_a_row_of_candles_blows_out_both() {
    let (mut scene, mut party) = party();
    // Look along the x = 0.3 row from the front, level with the candle bodies.
    let front = candle_point(&scene, &party, 0, 0.4);
    let back = candle_point(&scene, &party, 2, 0.4);
    let camera = party.handles.camera;
    let transform = &mut scene.get_node_mut(camera).unwrap().transform;
    transform.position = front + (front - back).normalize() * 8.0;
    transform.look_at(front, Vec3::Y);
    // Only candles are under test here.
    scene.set_visible(party.handles.envelope, false);
    scene.update_matrix_world();

    let ndc = project(&scene, front);
    assert!(ndc.length() < 1e-3, "row is centered, got {ndc}");
    let outcome = resolve_click(&scene, &party.handles, &mut party.simulation, ndc, String::new);
    assert!(matches!(&outcome, ClickOutcome::BlewOut(ids) if ids.as_slice() == [0, 2]));
    assert_eq!(party.simulation.lit_count(), 2);
    assert!(party.simulation.candles[1].lit);
    assert!(party.simulation.candles[3].lit);
}

#[test]
fn clicking_empty_space_misses() {
    let (scene, mut party) = party();
    // Straight up at the ceiling corner.
    let outcome = resolve_click(
        &scene,
        &party.handles,
        &mut party.simulation,
        Vec2::new(-0.99, 0.99),
        String::new,
    );
    assert_eq!(outcome, ClickOutcome::Miss);
    assert_eq!(party.simulation.lit_count(), 4);
}
