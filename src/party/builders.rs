//! Procedural builders for the party decorations.
//!
//! Every builder creates its geometry and materials inside the given
//! [`Scene`] arena and returns the detached root of a new subtree; the caller
//! attaches it. Builders that randomize take the caller's RNG and touch no
//! global state.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};

use glam::{Quat, Vec3};
use rand::RngExt;

use crate::animation::confetti::{PALETTE as CONFETTI_PALETTE, POOL_SIZE};
use crate::animation::simulation::FLAME_Y;
use crate::resources::primitives::{
    CylinderOptions, PlaneOptions, SphereOptions, TorusOptions, create_box, create_cone,
    create_cylinder, create_heart, create_plane, create_sphere, create_torus, create_triangle,
};
use crate::resources::{GeometryKey, Image, Material, MaterialKey, Texture, TextureKey};
use crate::scene::{Light, NodeHandle, Scene};
use crate::utils::color::hsl;

pub const BALLOON_PALETTE: [u32; 8] = [
    0xff6b6b, 0x4ecdc4, 0x45b7d1, 0x96ceb4, 0xfeca57, 0xff9ff3, 0x54a0ff, 0x5f27cd,
];

pub const CANDLE_POSITIONS: [Vec3; 4] = [
    Vec3::new(0.3, 3.5, 0.3),
    Vec3::new(-0.3, 3.5, 0.3),
    Vec3::new(0.3, 3.5, -0.3),
    Vec3::new(-0.3, 3.5, -0.3),
];

/// Photo frames are laid out on a half circle of this radius.
pub const FRAME_RADIUS: f32 = 6.0;
pub const FRAME_DEPTH: f32 = 0.08;
const FRAME_WIDTH: f32 = 1.6;
const FRAME_HEIGHT: f32 = 2.0;

// ============================================================================
// Helpers
// ============================================================================

fn standard(scene: &mut Scene, color: u32, roughness: f32, metalness: f32) -> MaterialKey {
    scene.add_material(
        Material::standard(color)
            .with_roughness(roughness)
            .with_metalness(metalness),
    )
}

/// An empty grouping node.
pub fn group(scene: &mut Scene, name: &'static str, position: Vec3) -> NodeHandle {
    scene.build_node(name).with_position(position).build()
}

fn mesh(
    scene: &mut Scene,
    name: &'static str,
    geometry: GeometryKey,
    material: MaterialKey,
    parent: NodeHandle,
    position: Vec3,
) -> NodeHandle {
    scene
        .build_node(name)
        .with_mesh(geometry, material)
        .with_position(position)
        .with_parent(parent)
        .build()
}

fn set_rotation(scene: &mut Scene, node: NodeHandle, rotation: Quat) {
    if let Some(n) = scene.get_node_mut(node) {
        n.transform.rotation = rotation;
    }
}

/// A uniform random tilt in `[-5°, 5°]`.
fn small_tilt(rng: &mut impl RngExt) -> f32 {
    (rng.random::<f32>() * 10.0 - 5.0).to_radians()
}

// ============================================================================
// Room & table
// ============================================================================

/// Floor and three walls.
pub fn build_room(scene: &mut Scene) -> NodeHandle {
    let room = group(scene, "Room", Vec3::ZERO);

    let floor_geo = scene.add_geometry(create_plane(PlaneOptions::new(40.0, 40.0)));
    let floor_mat = standard(scene, 0xf8f0f0, 0.7, 0.1);
    let floor = mesh(scene, "Floor", floor_geo, floor_mat, room, Vec3::new(0.0, -2.5, 0.0));
    set_rotation(scene, floor, Quat::from_rotation_x(-FRAC_PI_2));

    let wall_geo = scene.add_geometry(create_plane(PlaneOptions::new(40.0, 20.0)));
    let wall_mat = scene.add_material(
        Material::standard(0xfff5f5)
            .with_roughness(0.8)
            .with_metalness(0.1)
            .double_sided(),
    );
    for (name, position, yaw) in [
        ("BackWall", Vec3::new(0.0, 7.5, -20.0), 0.0),
        ("LeftWall", Vec3::new(-20.0, 7.5, 0.0), FRAC_PI_2),
        ("RightWall", Vec3::new(20.0, 7.5, 0.0), -FRAC_PI_2),
    ] {
        let wall = mesh(scene, name, wall_geo, wall_mat, room, position);
        set_rotation(scene, wall, Quat::from_rotation_y(yaw));
    }
    room
}

pub fn build_table(scene: &mut Scene) -> NodeHandle {
    let table = group(scene, "Table", Vec3::new(0.0, -0.5, 0.0));
    let wood = standard(scene, 0x8b4513, 1.0, 0.1);

    let top_geo = scene.add_geometry(create_box(15.0, 0.4, 15.0));
    mesh(scene, "TableTop", top_geo, wood, table, Vec3::new(0.0, 0.5, 0.0));

    let leg_geo = scene.add_geometry(create_cylinder(CylinderOptions::new(0.2, 0.25, 3.2, 12)));
    for (x, z) in [(-4.5, -4.5), (4.5, -4.5), (-4.5, 4.5), (4.5, 4.5)] {
        mesh(scene, "TableLeg", leg_geo, wood, table, Vec3::new(x, -1.1, z));
    }
    table
}

// ============================================================================
// Cake
// ============================================================================

/// One strawberry of overall scale `s`, origin at its center.
pub fn build_strawberry(scene: &mut Scene, s: f32) -> NodeHandle {
    let root = group(scene, "Strawberry", Vec3::ZERO);

    let body_geo = scene.add_geometry(create_sphere(SphereOptions::new(0.15 * s, 16, 16)));
    let body_mat = standard(scene, 0xff4444, 0.4, 0.0);
    let body = mesh(scene, "Berry", body_geo, body_mat, root, Vec3::ZERO);
    if let Some(n) = scene.get_node_mut(body) {
        n.transform.scale = Vec3::new(1.0, 1.3, 1.0);
    }

    let seed_geo = scene.add_geometry(create_sphere(SphereOptions::new(0.01 * s, 6, 6)));
    let seed_mat = standard(scene, 0xffeb3b, 0.5, 0.0);
    let radius = 0.12 * s;
    for i in 0..12 {
        let a = i as f32 / 12.0 * TAU;
        let position = Vec3::new(a.cos() * radius, a.sin() * radius * 0.5, a.sin() * radius);
        mesh(scene, "Seed", seed_geo, seed_mat, root, position);
    }

    let leaf_geo = scene.add_geometry(create_cone(0.08 * s, 0.1 * s, 6));
    let leaf_mat = standard(scene, 0x32cd32, 0.7, 0.0);
    let leaf = mesh(scene, "Leaf", leaf_geo, leaf_mat, root, Vec3::new(0.0, 0.18 * s, 0.0));
    set_rotation(scene, leaf, Quat::from_rotation_x(PI));

    root
}

/// Positions of `count` strawberries on a ring; x and z each get their own
/// jittered radius.
pub fn strawberry_ring(count: usize, radius: f32, y: f32, rng: &mut impl RngExt) -> Vec<Vec3> {
    (0..count)
        .map(|i| {
            let angle = i as f32 / count as f32 * TAU;
            let mut jitter = || (rng.random::<f32>() - 0.5) * 0.2;
            let x = angle.cos() * (radius + jitter());
            let z = angle.sin() * (radius + jitter());
            Vec3::new(x, y, z)
        })
        .collect()
}

/// Three tiers with frosting rings and strawberries.
pub fn build_cake(scene: &mut Scene, rng: &mut impl RngExt) -> NodeHandle {
    let cake = group(scene, "Cake", Vec3::ZERO);

    for (r, h, y, color) in [
        (2.2, 1.5, 0.75, 0xfff8dc),
        (1.7, 1.2, 2.1, 0xfff5ee),
        (1.2, 0.9, 3.15, 0xfff0f5),
    ] {
        let geo = scene.add_geometry(create_cylinder(CylinderOptions::new(r, r * 1.05, h, 32)));
        let mat = standard(scene, color, 0.4, 0.1);
        mesh(scene, "CakeLayer", geo, mat, cake, Vec3::new(0.0, y, 0.0));
    }

    let frosting_mat = standard(scene, 0xffb6c1, 0.2, 0.3);
    for (radius, y) in [(2.25, 1.5), (1.75, 2.7), (1.25, 3.6)] {
        let geo = scene.add_geometry(create_torus(TorusOptions::new(radius, 0.15, 16, 32)));
        let ring = mesh(scene, "Frosting", geo, frosting_mat, cake, Vec3::new(0.0, y, 0.0));
        set_rotation(scene, ring, Quat::from_rotation_x(FRAC_PI_2));
    }

    for (count, radius, y, scale) in [(20, 1.9, 1.5, 1.2), (15, 1.5, 2.7, 1.0), (8, 1.0, 3.6, 0.8)] {
        for position in strawberry_ring(count, radius, y, rng) {
            let berry = build_strawberry(scene, scale);
            if let Some(n) = scene.get_node_mut(berry) {
                n.transform.position = position;
            }
            scene.attach(berry, cake);
        }
    }
    cake
}

// ============================================================================
// Candles
// ============================================================================

/// Handles of one candle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandleParts {
    pub root: NodeHandle,
    pub flame: NodeHandle,
    pub glow: NodeHandle,
    pub light: NodeHandle,
}

pub fn build_candle(scene: &mut Scene, position: Vec3) -> CandleParts {
    let root = group(scene, "Candle", position);

    let body_geo = scene.add_geometry(create_cylinder(CylinderOptions::new(0.06, 0.07, 0.8, 16)));
    let body_mat = standard(scene, 0xffffff, 0.3, 0.0);
    mesh(scene, "CandleBody", body_geo, body_mat, root, Vec3::new(0.0, 0.4, 0.0));

    let flame_geo = scene.add_geometry(create_sphere(SphereOptions::new(0.08, 16, 16)));
    let flame_mat = scene.add_material(Material::basic(0xffa500).with_opacity(0.9));
    let flame = mesh(scene, "Flame", flame_geo, flame_mat, root, Vec3::new(0.0, FLAME_Y, 0.0));
    if let Some(n) = scene.get_node_mut(flame) {
        n.transform.scale = Vec3::new(0.7, 1.3, 0.7);
    }

    let glow_geo = scene.add_geometry(create_sphere(SphereOptions::new(0.15, 16, 16)));
    let glow_mat = scene.add_material(Material::basic(0xff4500).with_opacity(0.3));
    let glow = mesh(scene, "Glow", glow_geo, glow_mat, root, Vec3::new(0.0, FLAME_Y, 0.0));

    let light = scene
        .build_node("CandleLight")
        .with_light(Light::point_hex(0xffa500, 1.0, 2.0))
        .with_position(Vec3::new(0.0, FLAME_Y, 0.0))
        .with_parent(root)
        .build();

    CandleParts {
        root,
        flame,
        glow,
        light,
    }
}

// ============================================================================
// Table decorations
// ============================================================================

pub fn build_gift_box(
    scene: &mut Scene,
    position: Vec3,
    box_color: u32,
    ribbon_color: u32,
    scale: f32,
    rng: &mut impl RngExt,
) -> NodeHandle {
    const SIZE: f32 = 0.8;
    const RIBBON: f32 = 0.2;

    let root = scene
        .build_node("GiftBox")
        .with_position(position)
        .with_scale(Vec3::splat(scale))
        .with_rotation_euler(small_tilt(rng), rng.random::<f32>() * PI, 0.0)
        .build();

    let box_geo = scene.add_geometry(create_box(SIZE, SIZE, SIZE));
    let box_mat = standard(scene, box_color, 0.6, 0.2);
    mesh(scene, "Box", box_geo, box_mat, root, Vec3::ZERO);

    let ribbon_mat = standard(scene, ribbon_color, 0.4, 0.1);
    let ribbon_x = scene.add_geometry(create_box(SIZE + 0.02, RIBBON, SIZE + 0.02));
    let ribbon_z = scene.add_geometry(create_box(RIBBON, SIZE + 0.02, SIZE + 0.02));
    mesh(scene, "Ribbon", ribbon_x, ribbon_mat, root, Vec3::ZERO);
    mesh(scene, "Ribbon", ribbon_z, ribbon_mat, root, Vec3::ZERO);

    let bow = scene
        .build_node("Bow")
        .with_position(Vec3::new(0.0, SIZE / 2.0, 0.0))
        .with_parent(root)
        .build();
    let loop_geo =
        scene.add_geometry(create_torus(TorusOptions::new(0.1, 0.03, 16, 16).with_arc(PI)));
    for (x, roll) in [(-0.08, FRAC_PI_4 + 0.2), (0.08, -FRAC_PI_4 - 0.2)] {
        scene
            .build_node("BowLoop")
            .with_mesh(loop_geo, ribbon_mat)
            .with_position(Vec3::new(x, 0.05, 0.0))
            .with_rotation_euler(FRAC_PI_2, 0.0, roll)
            .with_parent(bow)
            .build();
    }
    let knot_geo = scene.add_geometry(create_sphere(SphereOptions::new(0.04, 16, 16)));
    mesh(scene, "Knot", knot_geo, ribbon_mat, bow, Vec3::new(0.0, 0.03, 0.0));

    root
}

pub fn build_party_hat(
    scene: &mut Scene,
    position: Vec3,
    color: u32,
    stripe_color: u32,
    scale: f32,
    rng: &mut impl RngExt,
) -> NodeHandle {
    let root = scene
        .build_node("PartyHat")
        .with_position(position)
        .with_scale(Vec3::splat(scale))
        .with_rotation_euler(0.0, rng.random::<f32>() * TAU, small_tilt(rng))
        .build();

    let cone_geo = scene.add_geometry(create_cone(0.5, 1.2, 32));
    let cone_mat = standard(scene, color, 0.5, 0.1);
    mesh(scene, "Hat", cone_geo, cone_mat, root, Vec3::new(0.0, 0.6, 0.0));

    let stripe_geo = scene.add_geometry(create_plane(PlaneOptions::new(0.15, 1.2)));
    let stripe_mat = standard(scene, stripe_color, 0.3, 0.2);
    for i in 0..5 {
        let angle = i as f32 / 5.0 * TAU;
        scene
            .build_node("Stripe")
            .with_mesh(stripe_geo, stripe_mat)
            .with_position(Vec3::new(angle.sin() * 0.3, 0.6, angle.cos() * 0.3))
            .with_rotation_euler(0.0, angle, PI / 10.0)
            .with_parent(root)
            .build();
    }

    let pompom_geo = scene.add_geometry(create_sphere(SphereOptions::new(0.15, 16, 16)));
    let pompom_mat = standard(scene, stripe_color, 0.8, 0.05);
    mesh(scene, "Pompom", pompom_geo, pompom_mat, root, Vec3::new(0.0, 1.3, 0.0));

    root
}

// ============================================================================
// Photo frames
// ============================================================================

/// Position and yaw of frame `index` out of `count`. The yaw turns the frame's
/// front (+Z) towards the table center.
#[must_use]
pub fn photo_frame_placement(index: usize, count: usize) -> (Vec3, f32) {
    let angle = -(index as f32 / count.max(1) as f32) * PI;
    let position = Vec3::new(angle.cos() * FRAME_RADIUS, 1.0, angle.sin() * FRAME_RADIUS);
    let yaw = (-position.x).atan2(-position.z);
    (position, yaw)
}

/// Gold frame with its stand. The photo itself arrives later through
/// [`attach_photo`].
pub fn build_photo_frame(scene: &mut Scene, index: usize, count: usize) -> NodeHandle {
    let (position, yaw) = photo_frame_placement(index, count);
    let root = group(scene, "PhotoFrame", position);
    set_rotation(
        scene,
        root,
        Quat::from_rotation_y(yaw) * Quat::from_rotation_x(-20_f32.to_radians()),
    );

    let frame_geo = scene.add_geometry(create_box(FRAME_WIDTH, FRAME_HEIGHT, FRAME_DEPTH));
    let frame_mat = standard(scene, 0xd4af37, 0.4, 0.9);
    mesh(scene, "Frame", frame_geo, frame_mat, root, Vec3::ZERO);

    let stand_mat = standard(scene, 0xd4af37, 0.5, 0.8);
    let leg_geo = scene.add_geometry(create_cylinder(CylinderOptions::new(0.03, 0.05, 0.5, 12)));
    let leg = mesh(
        scene,
        "Stand",
        leg_geo,
        stand_mat,
        root,
        Vec3::new(0.0, -FRAME_HEIGHT / 2.0, 0.0),
    );
    set_rotation(scene, leg, Quat::from_rotation_x(-PI / 3.0));

    let bar_geo = scene.add_geometry(create_cylinder(CylinderOptions::new(0.02, 0.02, 1.8, 12)));
    let bar = mesh(
        scene,
        "Support",
        bar_geo,
        stand_mat,
        root,
        Vec3::new(0.0, -FRAME_HEIGHT / 2.0 + 0.3, -0.2),
    );
    set_rotation(scene, bar, Quat::from_rotation_z(FRAC_PI_2));

    root
}

/// Adds the dark border and the textured photo plane to a frame.
/// Returns the photo plane.
pub fn attach_photo(scene: &mut Scene, frame: NodeHandle, image: Image) -> NodeHandle {
    let border_geo = scene.add_geometry(create_plane(PlaneOptions::new(1.5, 1.9)));
    let border_mat = standard(scene, 0x1a1a1a, 0.8, 0.0);
    mesh(
        scene,
        "PhotoBorder",
        border_geo,
        border_mat,
        frame,
        Vec3::new(0.0, 0.0, FRAME_DEPTH / 2.0 + 0.001),
    );

    let texture = scene.add_texture(Texture::new("photo", image));
    let photo_geo = scene.add_geometry(create_plane(PlaneOptions::new(1.4, 1.8)));
    let photo_mat = scene.add_material(
        Material::standard(0xffffff)
            .with_roughness(0.4)
            .with_metalness(0.0)
            .with_map(texture),
    );
    mesh(
        scene,
        "Photo",
        photo_geo,
        photo_mat,
        frame,
        Vec3::new(0.0, 0.0, FRAME_DEPTH / 2.0 + 0.002),
    )
}

// ============================================================================
// Balloons, envelope, captions
// ============================================================================

/// A balloon with its string and, when given, a caption on both sides.
pub fn build_balloon(
    scene: &mut Scene,
    position: Vec3,
    color: u32,
    caption: Option<TextureKey>,
) -> NodeHandle {
    let root = group(scene, "Balloon", position);

    let body_geo = scene.add_geometry(create_sphere(SphereOptions::new(0.5, 16, 16)));
    let body_mat = standard(scene, color, 0.2, 0.1);
    let body = mesh(scene, "BalloonBody", body_geo, body_mat, root, Vec3::ZERO);
    if let Some(n) = scene.get_node_mut(body) {
        n.transform.scale = Vec3::new(1.0, 1.2, 1.0);
    }

    let string_geo = scene.add_geometry(create_cylinder(CylinderOptions::new(0.01, 0.01, 1.5, 4)));
    let string_mat = scene.add_material(Material::basic(0x666666));
    mesh(scene, "String", string_geo, string_mat, root, Vec3::new(0.0, -2.25, 0.0));

    if let Some(texture) = caption {
        let text_geo = scene.add_geometry(create_plane(PlaneOptions::new(0.8, 0.4)));
        let text_mat = scene.add_material(
            Material::basic(0xffffff)
                .with_map(texture)
                .with_transparent(true)
                .double_sided(),
        );
        mesh(scene, "BalloonText", text_geo, text_mat, root, Vec3::new(0.0, 0.0, 0.52));
        let back = mesh(scene, "BalloonText", text_geo, text_mat, root, Vec3::new(0.0, 0.0, -0.52));
        set_rotation(scene, back, Quat::from_rotation_y(PI));
    }
    root
}

/// The wish envelope: base, flap, heart and a soft light.
pub fn build_envelope(scene: &mut Scene) -> NodeHandle {
    let root = scene
        .build_node("Envelope")
        .with_position(Vec3::new(3.0, 0.5, 3.0))
        .with_rotation_euler(0.0, PI / 3.0, 0.0)
        .build();

    let base_geo = scene.add_geometry(create_box(1.2, 0.05, 0.8));
    let base_mat = standard(scene, 0xff6b9d, 0.3, 0.2);
    mesh(scene, "EnvelopeBase", base_geo, base_mat, root, Vec3::ZERO);

    let flap_geo = scene.add_geometry(create_triangle(
        Vec3::new(-0.6, 0.0, -0.4),
        Vec3::new(0.6, 0.0, -0.4),
        Vec3::new(0.0, 0.0, 0.4),
    ));
    let flap_mat = scene.add_material(
        Material::standard(0xff8eb4)
            .with_roughness(0.3)
            .with_metalness(0.2)
            .double_sided(),
    );
    let flap = mesh(scene, "Flap", flap_geo, flap_mat, root, Vec3::new(0.0, 0.03, 0.0));
    set_rotation(scene, flap, Quat::from_rotation_x(PI));

    let heart_geo = scene.add_geometry(create_heart(12));
    let heart_mat = standard(scene, 0xffffff, 0.2, 0.5);
    scene
        .build_node("Heart")
        .with_mesh(heart_geo, heart_mat)
        .with_position(Vec3::new(0.0, 0.1, 0.0))
        .with_rotation_euler(-FRAC_PI_2, 0.0, 0.0)
        .with_scale(Vec3::splat(0.3))
        .with_parent(root)
        .build();

    scene
        .build_node("EnvelopeLight")
        .with_light(Light::point_hex(0xff6b9d, 0.5, 2.0))
        .with_position(Vec3::new(0.0, 0.5, 0.0))
        .with_parent(root)
        .build();

    root
}

/// A flat textured plane for rasterized text. Lit captions take the scene
/// lighting; unlit ones show the texture as-is.
pub fn build_caption_plane(
    scene: &mut Scene,
    texture: TextureKey,
    width: f32,
    height: f32,
    position: Vec3,
    lit: bool,
) -> NodeHandle {
    let geo = scene.add_geometry(create_plane(PlaneOptions::new(width, height)));
    let material = if lit {
        Material::standard(0xffffff)
            .with_roughness(0.3)
            .with_metalness(0.2)
    } else {
        Material::basic(0xffffff)
    };
    let mat = scene.add_material(
        material
            .with_map(texture)
            .with_transparent(true)
            .double_sided(),
    );
    scene
        .build_node("Caption")
        .with_mesh(geo, mat)
        .with_position(position)
        .with_render_order(1)
        .build()
}

// ============================================================================
// Particles
// ============================================================================

/// Tiny unlit spheres with random pastel hues inside a `±15` cube.
pub fn build_sparkles(scene: &mut Scene, count: usize, rng: &mut impl RngExt) -> NodeHandle {
    let root = group(scene, "Sparkles", Vec3::ZERO);
    let geo = scene.add_geometry(create_sphere(SphereOptions::new(0.04, 6, 4)));
    for _ in 0..count {
        let mut material = Material::basic(0xffffff).with_opacity(0.7);
        material.color = hsl(rng.random::<f32>(), 0.7, 0.8);
        let mat = scene.add_material(material);
        let mut coord = || (rng.random::<f32>() - 0.5) * 30.0;
        let position = Vec3::new(coord(), coord(), coord());
        mesh(scene, "Sparkle", geo, mat, root, position);
    }
    root
}

/// The confetti pool: one hidden double-sided strip per particle.
/// Returns the group and the strip handles in particle order.
pub fn build_confetti_pool(
    scene: &mut Scene,
    rng: &mut impl RngExt,
) -> (NodeHandle, Vec<NodeHandle>) {
    let root = group(scene, "Confetti", Vec3::ZERO);
    let materials: Vec<MaterialKey> = CONFETTI_PALETTE
        .iter()
        .map(|&color| {
            scene.add_material(
                Material::standard(color)
                    .with_roughness(0.3)
                    .with_metalness(0.2)
                    .double_sided(),
            )
        })
        .collect();

    let nodes = (0..POOL_SIZE)
        .map(|_| {
            let size = rng.random::<f32>() * 0.3 + 0.09;
            let geo = scene.add_geometry(create_plane(PlaneOptions::new(size, size * 0.3)));
            let mat = materials[rng.random_range(0..materials.len())];
            scene
                .build_node("ConfettiPiece")
                .with_mesh(geo, mat)
                .with_visible(false)
                .with_parent(root)
                .build()
        })
        .collect();
    (root, nodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn frames_face_the_center() {
        for i in 0..5 {
            let (position, yaw) = photo_frame_placement(i, 5);
            let front = Quat::from_rotation_y(yaw) * Vec3::Z;
            let to_center = (-Vec3::new(position.x, 0.0, position.z)).normalize();
            assert!(front.dot(to_center) > 0.999, "frame {i}");
        }
    }

    #[test]
    fn strawberry_ring_stays_near_radius() {
        let mut rng = StdRng::seed_from_u64(7);
        let ring = strawberry_ring(20, 1.9, 1.5, &mut rng);
        assert_eq!(ring.len(), 20);
        for p in ring {
            assert!((p.y - 1.5).abs() < f32::EPSILON);
            assert!(Vec3::new(p.x, 0.0, p.z).length() < 1.9 + 0.15);
        }
    }
}
