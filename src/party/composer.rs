//! Assembles the party scene.
//!
//! [`compose_party`] runs once per mount: it sets up the camera and lights,
//! calls every builder, hangs the content under a single `party_root` and
//! returns the handles the controller and the animation loop work with.

use glam::Vec3;
use rand::RngExt;
use rustc_hash::FxHashMap;

use crate::animation::{
    BalloonState, CandleState, ConfettiState, EnvelopeState, OrbitState, PartySimulation,
    SparklesState,
};
use crate::assets::{CaptionRasterizer, CaptionStyle, PhotoResult};
use crate::config::PartyConfig;
use crate::party::builders::{
    self, BALLOON_PALETTE, CANDLE_POSITIONS, CandleParts, build_balloon, build_caption_plane,
};
use crate::resources::{Image, Material, Texture, TextureKey};
use crate::resources::primitives::{PlaneOptions, create_plane};
use crate::scene::{Camera, Light, NodeHandle, Scene};
use crate::utils::color::hex;

pub const CAMERA_FOV_DEG: f32 = 60.0;
pub const CAMERA_POSITION: Vec3 = Vec3::new(0.0, 8.0, 15.0);
pub const CAMERA_TARGET: Vec3 = Vec3::new(0.0, 2.0, 0.0);
pub const BACKGROUND: u32 = 0xffebf3;

const RANDOM_BALLOONS: usize = 12;
const SPARKLE_COUNT: usize = 100;
const WALL_BALLOONS: [(f32, f32); 6] = [
    (-12.0, 8.0),
    (-8.0, 12.0),
    (-4.0, 7.0),
    (4.0, 11.0),
    (8.0, 6.0),
    (12.0, 9.0),
];
const WALL_Z: f32 = -19.9;

/// Nodes the interaction and animation code refer to.
#[derive(Debug, Clone)]
pub struct PartyHandles {
    /// Everything except the camera hangs below this node; dragging rotates it.
    pub party_root: NodeHandle,
    pub camera: NodeHandle,
    pub envelope: NodeHandle,
    pub candles: Vec<CandleParts>,
    pub balloons: Vec<NodeHandle>,
    pub confetti: Vec<NodeHandle>,
    pub sparkles: NodeHandle,
    /// One per displayed photo, in config order.
    pub photo_frames: Vec<NodeHandle>,
    /// Message card parented to the camera, hidden until a wish opens.
    pub wish_plane: NodeHandle,
    pub wish_texture: TextureKey,
}

/// A freshly composed party: handles plus the initial simulation state.
#[derive(Debug, Clone)]
pub struct PartyScene {
    pub handles: PartyHandles,
    pub simulation: PartySimulation,
}

fn caption_texture(
    scene: &mut Scene,
    captions: &mut CaptionRasterizer,
    text: &str,
    style: &CaptionStyle,
) -> TextureKey {
    let image = captions.render(text, style);
    scene.add_texture(Texture::new(format!("caption:{text}"), image))
}

fn add_lights(scene: &mut Scene, root: NodeHandle) {
    scene.ambient.color = Vec3::ONE;
    scene.ambient.intensity = 0.6;

    scene
        .build_node("SunLight")
        .with_light(Light::new_directional(Vec3::ONE, 0.8))
        .with_position(Vec3::new(10.0, 15.0, 5.0))
        .with_parent(root)
        .build();
    for (color, intensity, position) in [
        (0xffb6c1, 1.5, Vec3::new(-5.0, 5.0, 5.0)),
        (0xffd700, 1.2, Vec3::new(5.0, 5.0, -5.0)),
    ] {
        scene
            .build_node("FillLight")
            .with_light(Light::point_hex(color, intensity, 20.0))
            .with_position(position)
            .with_parent(root)
            .build();
    }
}

/// Builds the whole party into `scene` and returns its handles and the
/// initial simulation.
///
/// Photo frames are created empty; their pictures arrive through
/// [`apply_photo`] once the loader delivers them.
pub fn compose_party(
    scene: &mut Scene,
    config: &PartyConfig,
    captions: &mut CaptionRasterizer,
    rng: &mut impl RngExt,
) -> PartyScene {
    scene.background = Some(hex(BACKGROUND));

    let camera = scene.add_camera(Camera::new_perspective(CAMERA_FOV_DEG, 1.0, 0.1, 1000.0));
    if let Some(node) = scene.get_node_mut(camera) {
        node.transform.position = CAMERA_POSITION;
        node.transform.look_at(CAMERA_TARGET, Vec3::Y);
    }
    scene.active_camera = Some(camera);

    let party_root = builders::group(scene, "PartyRoot", Vec3::ZERO);
    add_lights(scene, party_root);

    let room = builders::build_room(scene);
    scene.attach(room, party_root);
    let table = builders::build_table(scene);
    scene.attach(table, party_root);
    let cake = builders::build_cake(scene, rng);
    scene.attach(cake, party_root);

    let candles: Vec<CandleParts> = CANDLE_POSITIONS
        .iter()
        .map(|&position| {
            let parts = builders::build_candle(scene, position);
            scene.attach(parts.root, party_root);
            parts
        })
        .collect();

    for (position, box_color, ribbon_color, scale) in [
        (Vec3::new(-2.5, 0.6, 3.0), 0xff6347, 0xffd700, 1.0),
        (Vec3::new(3.0, 0.52, -2.5), 0x4682b4, 0xffffff, 0.8),
    ] {
        let gift = builders::build_gift_box(scene, position, box_color, ribbon_color, scale, rng);
        scene.attach(gift, party_root);
    }
    for (position, color, stripe, scale) in [
        (Vec3::new(4.5, 0.2, 1.0), 0xee82ee, 0xffffff, 1.0),
        (Vec3::new(-4.0, 0.2, -3.0), 0xadd8e6, 0xffa500, 0.9),
    ] {
        let hat = builders::build_party_hat(scene, position, color, stripe, scale, rng);
        scene.attach(hat, party_root);
    }

    // Cake captions
    for (text, y, font_px) in [
        (config.display_name.as_str(), 2.3, 80.0),
        ("Happy birthday", 1.0, 150.0),
    ] {
        let texture = caption_texture(scene, captions, text, &CaptionStyle::title(font_px));
        let plane = build_caption_plane(scene, texture, 3.0, 1.1, Vec3::new(0.0, y, 2.3), true);
        scene.attach(plane, party_root);
    }

    let photos = config.displayed_photos();
    let photo_frames: Vec<NodeHandle> = (0..photos.len())
        .map(|i| {
            let frame = builders::build_photo_frame(scene, i, photos.len());
            scene.attach(frame, party_root);
            frame
        })
        .collect();

    // Floating balloons share one caption texture per color.
    let mut balloon_captions: FxHashMap<u32, TextureKey> = FxHashMap::default();
    let mut balloons = Vec::with_capacity(RANDOM_BALLOONS + 1);
    let mut balloon_states = Vec::with_capacity(RANDOM_BALLOONS + 1);
    for i in 0..RANDOM_BALLOONS {
        let color = BALLOON_PALETTE[i % BALLOON_PALETTE.len()];
        let caption = *balloon_captions.entry(color).or_insert_with(|| {
            caption_texture(scene, captions, "HAPPY BIRTHDAY", &CaptionStyle::balloon(color))
        });
        let position = Vec3::new(
            (rng.random::<f32>() - 0.5) * 25.0,
            rng.random::<f32>() * 8.0 + 4.0,
            (rng.random::<f32>() - 0.5) * 25.0,
        );
        let node = build_balloon(scene, position, color, Some(caption));
        scene.attach(node, party_root);
        balloons.push(node);
        balloon_states.push(BalloonState::new(node, i, position, 0.0));
    }
    let special_caption = caption_texture(
        scene,
        captions,
        config.first_name(),
        &CaptionStyle::balloon(0xff6b9d),
    );
    let special_position = Vec3::new(0.0, 12.0, -8.0);
    let special = build_balloon(scene, special_position, 0xff6b9d, Some(special_caption));
    scene.attach(special, party_root);
    balloons.push(special);
    balloon_states.push(BalloonState::new(special, RANDOM_BALLOONS, special_position, 0.0));

    // Wall banner and the static wall balloons
    let banner_text = format!("Happy Birthday {}!", config.display_name);
    let banner = caption_texture(scene, captions, &banner_text, &CaptionStyle::banner(80.0));
    let banner_plane =
        build_caption_plane(scene, banner, 15.0, 3.0, Vec3::new(0.0, 10.0, WALL_Z), true);
    scene.attach(banner_plane, party_root);
    for (i, (x, y)) in WALL_BALLOONS.into_iter().enumerate() {
        let color = BALLOON_PALETTE[i % BALLOON_PALETTE.len()];
        let caption = caption_texture(scene, captions, "🎉", &CaptionStyle::balloon(color));
        let node = build_balloon(scene, Vec3::new(x, y, WALL_Z), color, Some(caption));
        scene.attach(node, party_root);
    }

    let envelope = builders::build_envelope(scene);
    scene.attach(envelope, party_root);

    let sparkles = builders::build_sparkles(scene, SPARKLE_COUNT, rng);
    scene.attach(sparkles, party_root);

    let (confetti_root, confetti) = builders::build_confetti_pool(scene, rng);
    scene.attach(confetti_root, party_root);

    let (wish_plane, wish_texture) = build_wish_plane(scene, camera);

    let simulation = PartySimulation {
        now_ms: 0.0,
        candles: candles
            .iter()
            .map(|c| CandleState::new(c.flame, c.glow, c.light))
            .collect(),
        balloons: balloon_states,
        envelope: EnvelopeState::new(envelope),
        sparkles: Some(SparklesState {
            node: sparkles,
            yaw: 0.0,
        }),
        confetti: ConfettiState::new(confetti.clone(), rng),
        orbit: OrbitState::new(party_root, camera),
    };

    let counts = scene.resource_counts();
    log::info!(
        "Party composed: {} nodes, {} meshes, {} textures, {} photo frames",
        counts.nodes,
        counts.meshes,
        counts.textures,
        photo_frames.len()
    );

    PartyScene {
        handles: PartyHandles {
            party_root,
            camera,
            envelope,
            candles,
            balloons,
            confetti,
            sparkles,
            photo_frames,
            wish_plane,
            wish_texture,
        },
        simulation,
    }
}

fn build_wish_plane(scene: &mut Scene, camera: NodeHandle) -> (NodeHandle, TextureKey) {
    let style = CaptionStyle::card();
    let texture = scene.add_texture(Texture::new(
        "wish",
        Image::transparent(style.width, style.height),
    ));
    let geo = scene.add_geometry(create_plane(PlaneOptions::new(3.2, 1.6)));
    let mat = scene.add_material(
        Material::basic(0xffffff)
            .with_map(texture)
            .with_transparent(true),
    );
    let plane = scene
        .build_node("WishCard")
        .with_mesh(geo, mat)
        .with_render_order(100)
        .with_position(Vec3::new(0.0, 0.0, -3.0))
        .with_visible(false)
        .with_parent(camera)
        .build();
    (plane, texture)
}

/// Rasterizes `text` into the wish card and shows it.
pub fn show_wish(
    scene: &mut Scene,
    handles: &PartyHandles,
    captions: &mut CaptionRasterizer,
    text: &str,
) {
    let image = captions.render(text, &CaptionStyle::card());
    if let Some(texture) = scene.textures.get_mut(handles.wish_texture) {
        texture.set_image(image);
    }
    scene.set_visible(handles.wish_plane, true);
}

pub fn hide_wish(scene: &mut Scene, handles: &PartyHandles) {
    scene.set_visible(handles.wish_plane, false);
}

/// Puts a loaded photo into its frame. Failed loads leave the frame blank.
/// Returns whether a photo was attached.
pub fn apply_photo(scene: &mut Scene, handles: &PartyHandles, result: PhotoResult) -> bool {
    let Some(&frame) = handles.photo_frames.get(result.index) else {
        log::warn!("Photo {} has no frame", result.index);
        return false;
    };
    match result.image {
        Ok(image) => {
            log::debug!(
                "Photo {} loaded from {} ({}x{})",
                result.index,
                result.source,
                image.width,
                image.height
            );
            builders::attach_photo(scene, frame, image);
            true
        }
        Err(e) => {
            log::warn!("Photo {} ({}) left blank: {e}", result.index, result.source);
            false
        }
    }
}
