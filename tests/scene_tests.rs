//! Scene Integration Tests
//!
//! Tests for:
//! - Hierarchy: add/attach/remove, subtree collection
//! - World matrices: child = parent × local after an update
//! - Visibility inherited from ancestors
//! - Disposal: every arena emptied and counted
//! - Camera: aspect updates and frustum culling

use std::f32::consts::FRAC_PI_2;

use glam::{Affine3A, Quat, Vec3};
use fete::resources::primitives::create_box;
use fete::resources::{Material, Texture, Image};
use fete::scene::{Camera, Light, Node, Scene};

const EPSILON: f32 = 1e-4;

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < EPSILON
}

fn affine_approx(a: Affine3A, b: Affine3A) -> bool {
    a.abs_diff_eq(b, EPSILON)
}

// ============================================================================
// Hierarchy
// ============================================================================

#[test]
fn add_node_registers_a_root() {
    let mut scene = Scene::new();
    let handle = scene.add_node(Node::with_name("Root"));
    assert!(scene.root_nodes.contains(&handle));
    assert_eq!(scene.get_node(handle).unwrap().name, "Root");
}

#[test]
fn add_to_parent_links_both_ways() {
    let mut scene = Scene::new();
    let parent = scene.add_node(Node::new());
    let child = scene.add_to_parent(Node::new(), parent);

    assert_eq!(scene.get_node(child).unwrap().parent(), Some(parent));
    assert_eq!(scene.get_node(parent).unwrap().children(), &[child]);
    assert!(!scene.root_nodes.contains(&child));
    assert!(scene.is_ancestor(parent, child));
}

#[test]
fn attach_moves_a_node_between_parents() {
    let mut scene = Scene::new();
    let a = scene.add_node(Node::new());
    let b = scene.add_node(Node::new());
    let child = scene.add_to_parent(Node::new(), a);

    scene.attach(child, b);
    assert!(scene.get_node(a).unwrap().children().is_empty());
    assert_eq!(scene.get_node(b).unwrap().children(), &[child]);
}

#[test]
fn attach_refuses_cycles() {
    let mut scene = Scene::new();
    let parent = scene.add_node(Node::new());
    let child = scene.add_to_parent(Node::new(), parent);

    scene.attach(parent, child);
    assert_eq!(scene.get_node(parent).unwrap().parent(), None);
    assert!(scene.root_nodes.contains(&parent));
}

#[test]
fn descendants_list_root_first() {
    let mut scene = Scene::new();
    let root = scene.build_node("Root").build();
    let a = scene.build_node("A").with_parent(root).build();
    let b = scene.build_node("B").with_parent(root).build();
    let a1 = scene.build_node("A1").with_parent(a).build();

    let all = scene.descendants(root);
    assert_eq!(all.len(), 4);
    assert_eq!(all[0], root);
    for h in [a, b, a1] {
        assert!(all.contains(&h));
    }
}

#[test]
fn remove_node_removes_the_subtree_and_components() {
    let mut scene = Scene::new();
    let geo = scene.add_geometry(create_box(1.0, 1.0, 1.0));
    let mat = scene.add_material(Material::standard(0xffffff));

    let root = scene.build_node("Root").build();
    let mesh = scene
        .build_node("Box")
        .with_mesh(geo, mat)
        .with_parent(root)
        .build();
    let lamp = scene.add_light_to_parent(Light::new_point(Vec3::ONE, 1.0, 10.0), mesh);
    let keep = scene.build_node("Keep").build();

    scene.remove_node(root);

    for h in [root, mesh, lamp] {
        assert!(scene.get_node(h).is_none());
    }
    assert!(scene.get_node(keep).is_some());
    assert_eq!(scene.meshes.len(), 0);
    assert_eq!(scene.lights.len(), 0);
    assert!(!scene.root_nodes.contains(&root));
    // Shared resources stay until the scene is disposed.
    assert_eq!(scene.geometries.len(), 1);
}

#[test]
fn removing_the_active_camera_clears_it() {
    let mut scene = Scene::new();
    let camera = scene.add_camera(Camera::new_perspective(60.0, 1.0, 0.1, 100.0));
    scene.active_camera = Some(camera);

    scene.remove_node(camera);
    assert!(scene.active_camera.is_none());
    assert!(scene.main_camera().is_none());
}

// ============================================================================
// World matrices
// ============================================================================

#[test]
fn child_world_matrix_is_parent_times_local() {
    let mut scene = Scene::new();
    let parent = scene
        .build_node("Parent")
        .with_position(Vec3::new(1.0, 2.0, 3.0))
        .with_rotation_euler(0.0, FRAC_PI_2, 0.0)
        .with_scale(Vec3::splat(2.0))
        .build();
    let child = scene
        .build_node("Child")
        .with_position(Vec3::new(0.5, 0.0, -1.0))
        .with_parent(parent)
        .build();

    scene.update_matrix_world();

    let parent_world = scene.world_matrix(parent).unwrap();
    let child_local = *scene.get_node(child).unwrap().transform.local_matrix();
    let child_world = scene.world_matrix(child).unwrap();
    assert!(affine_approx(child_world, parent_world * child_local));
}

#[test]
fn world_position_follows_rotation_of_parent() {
    let mut scene = Scene::new();
    let parent = scene.build_node("Spinner").build();
    let child = scene
        .build_node("Arm")
        .with_position(Vec3::X)
        .with_parent(parent)
        .build();

    scene.get_node_mut(parent).unwrap().transform.rotation = Quat::from_rotation_y(FRAC_PI_2);
    scene.update_matrix_world();

    assert!(vec3_approx(scene.world_position(child).unwrap(), -Vec3::Z));
}

#[test]
fn moving_a_parent_moves_its_children_on_next_update() {
    let mut scene = Scene::new();
    let parent = scene.build_node("Parent").build();
    let child = scene
        .build_node("Child")
        .with_position(Vec3::Y)
        .with_parent(parent)
        .build();
    scene.update_matrix_world();
    assert!(vec3_approx(scene.world_position(child).unwrap(), Vec3::Y));

    scene.get_node_mut(parent).unwrap().transform.position = Vec3::new(5.0, 0.0, 0.0);
    scene.update_matrix_world();
    assert!(vec3_approx(
        scene.world_position(child).unwrap(),
        Vec3::new(5.0, 1.0, 0.0)
    ));
}

// ============================================================================
// Visibility
// ============================================================================

#[test]
fn hidden_ancestor_hides_the_subtree() {
    let mut scene = Scene::new();
    let root = scene.build_node("Root").build();
    let mid = scene.build_node("Mid").with_parent(root).build();
    let leaf = scene.build_node("Leaf").with_parent(mid).build();
    assert!(scene.is_visible_in_world(leaf));

    scene.set_visible(mid, false);
    assert!(!scene.is_visible_in_world(leaf));
    assert!(scene.is_visible_in_world(root));

    scene.set_visible(mid, true);
    assert!(scene.is_visible_in_world(leaf));
}

// ============================================================================
// Disposal
// ============================================================================

#[test]
fn dispose_releases_every_arena() {
    let mut scene = Scene::new();
    let geo = scene.add_geometry(create_box(1.0, 1.0, 1.0));
    let texture = scene.add_texture(Texture::new("white", Image::solid(2, 2, [255; 4])));
    let mat = scene.add_material(Material::standard(0xff0000).with_map(texture));
    let camera = scene.add_camera(Camera::new_perspective(60.0, 1.0, 0.1, 100.0));
    scene.active_camera = Some(camera);
    scene.add_mesh(geo, mat);
    scene.add_light(Light::new_directional(Vec3::ONE, 1.0));

    let before = scene.resource_counts();
    assert_eq!(before.geometries, 1);
    assert_eq!(before.textures, 1);
    assert_eq!(before.materials, 1);
    assert_eq!(before.meshes, 1);
    assert_eq!(before.cameras, 1);
    assert_eq!(before.lights, 1);
    assert_eq!(before.nodes, 3);

    let released = scene.dispose();
    assert_eq!(released, before);
    assert!(scene.resource_counts().is_empty());
    assert!(scene.root_nodes.is_empty());
    assert!(scene.active_camera.is_none());
}

#[test]
fn scenes_get_distinct_ids() {
    let a = Scene::new();
    let b = Scene::new();
    assert_ne!(a.id, b.id);
}

// ============================================================================
// Camera
// ============================================================================

#[test]
fn set_aspect_ignores_degenerate_ratios() {
    let mut camera = Camera::new_perspective(60.0, 1.5, 0.1, 100.0);
    camera.set_aspect(0.0);
    camera.set_aspect(f32::NAN);
    camera.set_aspect(f32::INFINITY);
    assert!((camera.aspect - 1.5).abs() < EPSILON);

    camera.set_aspect(2.0);
    assert!((camera.aspect - 2.0).abs() < EPSILON);
}

#[test]
fn frustum_culls_spheres_behind_the_camera() {
    let mut scene = Scene::new();
    let camera = scene.add_camera(Camera::new_perspective(60.0, 1.0, 0.1, 100.0));
    scene.active_camera = Some(camera);
    scene.update_matrix_world();

    // Cameras look down -Z.
    let frustum = scene.main_camera().unwrap().frustum();
    assert!(frustum.intersects_sphere(Vec3::new(0.0, 0.0, -10.0), 1.0));
    assert!(!frustum.intersects_sphere(Vec3::new(0.0, 0.0, 10.0), 1.0));
    assert!(!frustum.intersects_sphere(Vec3::new(0.0, 0.0, -200.0), 1.0));
    assert!(!frustum.intersects_sphere(Vec3::new(50.0, 0.0, -10.0), 1.0));
}

#[test]
fn camera_follows_its_node() {
    let mut scene = Scene::new();
    let camera = scene.add_camera(Camera::new_perspective(60.0, 1.0, 0.1, 100.0));
    scene.active_camera = Some(camera);
    scene.get_node_mut(camera).unwrap().transform.position = Vec3::new(0.0, 8.0, 15.0);
    scene.update_matrix_world();

    assert!(vec3_approx(
        scene.main_camera().unwrap().position(),
        Vec3::new(0.0, 8.0, 15.0)
    ));
}
