//! The gift box shown before the party.
//!
//! A floating, slowly turning present with a sparkle shell and a caption that
//! shows the countdown. Opening it plays a one-shot lid animation. The gate
//! runs on its own frame clock (`t += 0.016` per frame); it shares nothing
//! with the party scene.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use glam::{Vec2, Vec3};
use rand::RngExt;

use crate::assets::{CaptionRasterizer, CaptionStyle};
use crate::party::builders::{self, build_caption_plane};
use crate::resources::primitives::{
    PlaneOptions, SphereOptions, TorusOptions, create_box, create_plane, create_sphere,
    create_torus,
};
use crate::resources::{Material, Texture, TextureKey};
use crate::scene::{Camera, Light, NodeHandle, Raycaster, Scene};
use crate::utils::color::hex;

pub const GATE_BACKGROUND: u32 = 0x302b63;
const FRAME_DT: f32 = 0.016;
const SPARKLE_COUNT: usize = 300;
const SPARKLE_PALETTE: [u32; 4] = [0xffb6c1, 0x87ceeb, 0xffd700, 0x98fb98];
const LID_Y: f32 = 1.2;
const BOW_Y: f32 = 1.7;

#[derive(Debug, Clone)]
pub struct GateHandles {
    pub camera: NodeHandle,
    /// Root of every clickable part of the present.
    pub gift: NodeHandle,
    pub body: NodeHandle,
    pub lid: NodeHandle,
    pub bow: NodeHandle,
    pub sparkles: NodeHandle,
    pub caption: NodeHandle,
    pub caption_texture: TextureKey,
}

/// Frame-stepped state of the gate animation.
#[derive(Debug, Clone, PartialEq)]
pub struct GateAnimation {
    pub t: f32,
    pub yaw: f32,
    pub float_y: f32,
    pub hovered: bool,
    /// Hover intensity in `[0, 1]`.
    pub pulse: f32,
    pub scale: f32,
    pub opened: bool,
    /// Opening progress in `[0, 1]`.
    pub progress: f32,
    pub sparkle_rotation: Vec2,
}

impl Default for GateAnimation {
    fn default() -> Self {
        Self {
            t: 0.0,
            yaw: 0.0,
            float_y: 0.0,
            hovered: false,
            pulse: 0.0,
            scale: 1.0,
            opened: false,
            progress: 0.0,
            sparkle_rotation: Vec2::ZERO,
        }
    }
}

impl GateAnimation {
    pub fn open(&mut self) {
        self.opened = true;
    }

    /// Advances one display frame.
    pub fn step(&mut self) {
        self.t += FRAME_DT;
        let t = self.t;

        if self.opened {
            if self.progress < 1.0 {
                self.progress = (self.progress + 0.03).min(1.0);
            }
        } else {
            self.yaw = (self.yaw + 0.002) % TAU;
            self.float_y = t.sin() * 0.15;

            self.pulse = if self.hovered {
                (self.pulse + 0.1).min(1.0)
            } else {
                (self.pulse - 0.1).max(0.0)
            };
            let target = (1.0 + self.pulse * 0.1) * (1.0 + (t * 8.0).sin() * 0.05 * self.pulse);
            self.scale += (target - self.scale) * 0.1;
        }

        self.sparkle_rotation += Vec2::new(0.0005, 0.001);
    }

    #[must_use]
    pub fn lid_pose(&self) -> (f32, f32) {
        if self.opened {
            let p = self.progress;
            (LID_Y + p * 3.0 + (p * PI).sin() * 0.5, p * FRAC_PI_2)
        } else {
            (LID_Y + self.float_y, 0.0)
        }
    }

    #[must_use]
    pub fn bow_pose(&self) -> (f32, f32) {
        if self.opened {
            let p = self.progress;
            (BOW_Y + p * 3.0 + (p * TAU).sin() * 0.3, p * PI * 0.3)
        } else {
            (BOW_Y + self.float_y, 0.0)
        }
    }

    #[must_use]
    pub fn body_y(&self) -> f32 {
        if self.opened {
            -self.progress * 0.2
        } else {
            self.float_y
        }
    }

    /// Gentle camera drift around the present.
    #[must_use]
    pub fn camera_position(&self) -> Vec3 {
        Vec3::new(
            (self.t * 0.2).sin() * 0.5,
            2.0,
            6.0 + (self.t * 0.3).cos() * 0.3,
        )
    }

    pub fn apply(&self, scene: &mut Scene, handles: &GateHandles) {
        if let Some(gift) = scene.get_node_mut(handles.gift) {
            gift.transform.set_rotation_euler(0.0, self.yaw, 0.0);
        }
        let body_y = self.body_y();
        let scale = Vec3::splat(self.scale);
        if let Some(body) = scene.get_node_mut(handles.body) {
            body.transform.position.y = body_y;
            body.transform.scale = scale;
        }
        let (lid_y, lid_pitch) = self.lid_pose();
        if let Some(lid) = scene.get_node_mut(handles.lid) {
            lid.transform.position.y = lid_y;
            lid.transform.set_rotation_euler(lid_pitch, 0.0, 0.0);
            lid.transform.scale = scale;
        }
        let (bow_y, bow_pitch) = self.bow_pose();
        if let Some(bow) = scene.get_node_mut(handles.bow) {
            bow.transform.position.y = bow_y;
            bow.transform.set_rotation_euler(bow_pitch, 0.0, 0.0);
        }
        if let Some(sparkles) = scene.get_node_mut(handles.sparkles) {
            let r = self.sparkle_rotation;
            sparkles.transform.set_rotation_euler(r.x % TAU, r.y % TAU, 0.0);
        }
        if let Some(camera) = scene.get_node_mut(handles.camera) {
            camera.transform.position = self.camera_position();
            camera.transform.look_at(Vec3::new(0.0, 1.0, 0.0), Vec3::Y);
        }
    }
}

#[derive(Debug, Clone)]
pub struct GateScene {
    pub handles: GateHandles,
    pub animation: GateAnimation,
}

fn add_gate_lights(scene: &mut Scene) {
    scene.ambient.color = Vec3::ONE;
    scene.ambient.intensity = 0.4;

    scene
        .build_node("KeyLight")
        .with_light(Light::new_directional(hex(0xffe6cc), 1.0))
        .with_position(Vec3::new(5.0, 8.0, 5.0))
        .build();
    for (color, intensity, position) in [
        (0xffb6c1, 1.2, Vec3::new(3.0, 5.0, 3.0)),
        (0x87ceeb, 0.8, Vec3::new(-3.0, 4.0, -3.0)),
    ] {
        scene
            .build_node("FillLight")
            .with_light(Light::point_hex(color, intensity, 50.0))
            .with_position(position)
            .build();
    }
    scene
        .build_node("RimLight")
        .with_light(Light::new_hemisphere(hex(0xfffaf0), hex(0x69607e), 0.3))
        .build();
}

fn build_bow(scene: &mut Scene, parent: NodeHandle) -> NodeHandle {
    let bow = scene
        .build_node("Bow")
        .with_position(Vec3::new(0.0, BOW_Y, 0.0))
        .with_parent(parent)
        .build();
    let ribbon = scene.add_material(
        Material::standard(0xc77d7e)
            .with_roughness(0.25)
            .with_metalness(0.1),
    );

    let center = scene.add_geometry(create_sphere(SphereOptions::new(0.4, 32, 32)));
    scene
        .build_node("BowCenter")
        .with_mesh(center, ribbon)
        .with_scale(Vec3::new(1.2, 0.6, 1.2))
        .with_parent(bow)
        .build();

    let loop_geo = scene.add_geometry(create_torus(TorusOptions::new(0.6, 0.15, 16, 32)));
    for z in [-0.3, 0.3] {
        scene
            .build_node("BowLoop")
            .with_mesh(loop_geo, ribbon)
            .with_position(Vec3::new(0.0, 0.1, z))
            .with_rotation_euler(FRAC_PI_2, 0.0, 0.0)
            .with_scale(Vec3::new(1.0, 1.0, 0.8))
            .with_parent(bow)
            .build();
    }

    let tail_geo = scene.add_geometry(create_plane(PlaneOptions::new(0.8, 0.3)));
    let tail_mat = scene.add_material(
        Material::standard(0xc77d7e)
            .with_roughness(0.25)
            .with_metalness(0.1)
            .double_sided(),
    );
    for (x, roll) in [(-0.4, PI / 8.0), (0.4, -PI / 8.0)] {
        scene
            .build_node("BowTail")
            .with_mesh(tail_geo, tail_mat)
            .with_position(Vec3::new(x, -0.8, 0.0))
            .with_rotation_euler(0.0, 0.0, roll)
            .with_parent(bow)
            .build();
    }
    bow
}

/// Random points in a spherical shell of radius 3 to 7.
fn build_sparkle_shell(scene: &mut Scene, rng: &mut impl RngExt) -> NodeHandle {
    let root = builders::group(scene, "GateSparkles", Vec3::ZERO);
    let materials: Vec<_> = SPARKLE_PALETTE
        .iter()
        .map(|&c| scene.add_material(Material::basic(c).with_opacity(0.8)))
        .collect();
    let geometries: Vec<_> = [0.02, 0.04, 0.06]
        .iter()
        .map(|&r| scene.add_geometry(create_sphere(SphereOptions::new(r, 6, 4))))
        .collect();

    for _ in 0..SPARKLE_COUNT {
        let radius = 3.0 + rng.random::<f32>() * 4.0;
        let theta = rng.random::<f32>() * TAU;
        let phi = (2.0 * rng.random::<f32>() - 1.0).acos();
        let position = Vec3::new(
            radius * phi.sin() * theta.cos(),
            radius * phi.sin() * theta.sin(),
            radius * phi.cos(),
        );
        let geo = geometries[rng.random_range(0..geometries.len())];
        let mat = materials[rng.random_range(0..materials.len())];
        scene
            .build_node("Sparkle")
            .with_mesh(geo, mat)
            .with_position(position)
            .with_parent(root)
            .build();
    }
    root
}

/// Builds the gate scene with `caption` under the present.
pub fn build_gift_gate(
    scene: &mut Scene,
    captions: &mut CaptionRasterizer,
    caption: &str,
    rng: &mut impl RngExt,
) -> GateScene {
    scene.background = Some(hex(GATE_BACKGROUND));

    let camera = scene.add_camera(Camera::new_perspective(75.0, 1.0, 0.1, 1000.0));
    scene.active_camera = Some(camera);

    add_gate_lights(scene);

    let gift = builders::group(scene, "Gift", Vec3::ZERO);

    let body_mat = scene.add_material(
        Material::standard(0xd4a5a5)
            .with_roughness(0.3)
            .with_metalness(0.1),
    );
    let body_geo = scene.add_geometry(create_box(2.0, 2.0, 2.0));
    let body = scene
        .build_node("GiftBody")
        .with_mesh(body_geo, body_mat)
        .with_parent(gift)
        .build();

    let ribbon = scene.add_material(
        Material::standard(0xc77d7e)
            .with_roughness(0.25)
            .with_metalness(0.1),
    );
    for (w, h, d) in [(2.2, 0.15, 0.4), (0.4, 2.2, 0.4)] {
        let geo = scene.add_geometry(create_box(w, h, d));
        scene
            .build_node("GiftRibbon")
            .with_mesh(geo, ribbon)
            .with_parent(gift)
            .build();
    }

    let lid_mat = scene.add_material(
        Material::standard(0xe6b8b8)
            .with_roughness(0.3)
            .with_metalness(0.1),
    );
    let lid_geo = scene.add_geometry(create_box(2.3, 0.4, 2.3));
    let lid = scene
        .build_node("GiftLid")
        .with_mesh(lid_geo, lid_mat)
        .with_position(Vec3::new(0.0, LID_Y, 0.0))
        .with_parent(gift)
        .build();

    let bow = build_bow(scene, gift);
    let sparkles = build_sparkle_shell(scene, rng);

    let style = CaptionStyle::title(110.0);
    let caption_texture = scene.add_texture(Texture::new(
        "gate-caption",
        captions.render(caption, &style),
    ));
    let caption = build_caption_plane(
        scene,
        caption_texture,
        4.0,
        1.0,
        Vec3::new(0.0, -1.9, 1.5),
        false,
    );

    let handles = GateHandles {
        camera,
        gift,
        body,
        lid,
        bow,
        sparkles,
        caption,
        caption_texture,
    };
    let animation = GateAnimation::default();
    animation.apply(scene, &handles);
    log::info!("Gift gate composed");

    GateScene { handles, animation }
}

/// Re-rasterizes the caption under the present.
pub fn set_gate_caption(
    scene: &mut Scene,
    handles: &GateHandles,
    captions: &mut CaptionRasterizer,
    text: &str,
) {
    let image = captions.render(text, &CaptionStyle::title(110.0));
    if let Some(texture) = scene.textures.get_mut(handles.caption_texture) {
        texture.set_image(image);
    }
}

/// Whether a ray through `ndc` hits the present. World matrices must be current.
#[must_use]
pub fn gift_hit(scene: &Scene, handles: &GateHandles, ndc: Vec2) -> bool {
    scene
        .main_camera()
        .and_then(|camera| Raycaster::from_camera(camera, ndc))
        .is_some_and(|raycaster| raycaster.hits_subtree(scene, handles.gift))
}
