//! Mounted scene instances.
//!
//! A [`Stage`] owns one scene together with everything it registers on the
//! [`Engine`] while mounted: a frame chain, one listener per event kind and a
//! liveness flag for asynchronous photo loads. [`Stage::unmount`] gives all
//! of it back and disposes the scene's CPU and GPU resources, so mounting,
//! unmounting and mounting again leaves exactly one chain and the original
//! number of listeners.
//!
//! Listeners forward events into a channel that the stage drains at the top
//! of its next frame; all scene mutation stays inside [`Stage::frame`].
//!
//! [`Celebration`] strings the two stages together: the gift gate first, the
//! party once the gift has been opened and the reveal delay has passed.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use flume::Receiver;
use glam::Vec2;
use rand::SeedableRng;
use rand::rngs::StdRng;
use smallvec::SmallVec;

use crate::animation::{PartySimulation, advance, apply_to_scene};
use crate::app::router::{AppEvent, EventKind, Key, ListenerId};
use crate::app::scheduler::ChainId;
use crate::assets::{PhotoLoader, PhotoResult};
use crate::config::PartyConfig;
use crate::engine::Engine;
use crate::interaction::{ClickOutcome, Gesture, InteractionController, resolve_click, screen_to_ndc};
use crate::overlay::{GiftGate, WishOverlay, pick_wish};
use crate::party::gift_gate::set_gate_caption;
use crate::party::{
    GateScene, PartyHandles, PartyScene, apply_photo, build_gift_gate, compose_party, gift_hit,
    hide_wish, show_wish,
};
use crate::scene::Scene;

pub trait Stage {
    /// Builds the scene and registers the frame chain and listeners.
    /// Mounting an already mounted stage does nothing.
    fn mount(&mut self, engine: &mut Engine, viewport: (u32, u32), now_ms: f64);

    /// Cancels the chain, removes the listeners, clears the liveness flag and
    /// disposes the scene.
    fn unmount(&mut self, engine: &mut Engine);

    fn is_mounted(&self) -> bool;

    /// Updates the viewport and camera aspect. Zero sizes are ignored.
    fn resize(&mut self, width: u32, height: u32);

    /// Runs one frame. Returns `false` when the stage is not mounted or its
    /// chain has been cancelled.
    fn frame(&mut self, engine: &mut Engine, now_ms: f64) -> bool;

    fn scene(&self) -> &Scene;

    /// Last non-zero viewport size in physical pixels.
    fn viewport(&self) -> (u32, u32);
}

// ============================================================================
// Engine registrations
// ============================================================================

/// What a mounted stage holds on the engine.
struct Registration {
    chain: ChainId,
    listeners: SmallVec<[ListenerId; 3]>,
    inbox: Receiver<AppEvent>,
    alive: Arc<AtomicBool>,
}

impl Registration {
    fn attach(engine: &mut Engine) -> Self {
        let (tx, inbox) = flume::unbounded();
        let listeners = [EventKind::Pointer, EventKind::Resize, EventKind::Keyboard]
            .into_iter()
            .map(|kind| {
                let tx = tx.clone();
                engine.router.add_listener(kind, move |event| {
                    // The inbox lives exactly as long as the listener.
                    let _ = tx.send(event.clone());
                })
            })
            .collect();
        Self {
            chain: engine.scheduler.start(),
            listeners,
            inbox,
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    fn detach(self, engine: &mut Engine) {
        engine.scheduler.cancel(self.chain);
        for id in self.listeners {
            engine.router.remove_listener(id);
        }
        self.alive.store(false, Ordering::Release);
    }

    /// Starts the frame if the chain is still running and returns the events
    /// received since the previous one.
    fn begin_frame(&self, engine: &mut Engine, now_ms: f64) -> Option<Vec<AppEvent>> {
        let info = engine.scheduler.begin_frame(self.chain, now_ms)?;
        log::trace!("Frame {} of chain {:?}", info.frame, self.chain);
        Some(self.inbox.try_iter().collect())
    }
}

/// Stores the viewport and updates the camera aspect. Zero sizes are ignored.
fn apply_viewport(scene: &mut Scene, viewport: &mut (u32, u32), width: u32, height: u32) {
    if width == 0 || height == 0 {
        log::debug!("Keeping aspect ratio for zero-sized viewport");
        return;
    }
    *viewport = (width, height);
    if let Some(camera) = scene.main_camera_mut() {
        camera.set_aspect(width as f32 / height as f32);
    }
}

fn release_scene(engine: &mut Engine, scene: &mut Scene, name: &str) {
    engine.renderer.release_scene(scene.id);
    let released = scene.dispose();
    log::info!("{name} unmounted, released {released:?}");
}

// ============================================================================
// Party
// ============================================================================

/// The birthday room: cake, candles, balloons, photos and the envelope.
pub struct PartyStage {
    config: PartyConfig,
    rng: StdRng,
    scene: Scene,
    party: Option<PartyScene>,
    controller: InteractionController,
    wish: WishOverlay,
    photos: Option<PhotoLoader>,
    registration: Option<Registration>,
    viewport: (u32, u32),
    compositions: u32,
}

impl PartyStage {
    #[must_use]
    pub fn new(config: PartyConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
            scene: Scene::new(),
            party: None,
            controller: InteractionController::new(),
            wish: WishOverlay::default(),
            photos: None,
            registration: None,
            viewport: (0, 0),
            compositions: 0,
        }
    }

    #[must_use]
    pub fn config(&self) -> &PartyConfig {
        &self.config
    }

    /// How many times the scene has been composed.
    #[must_use]
    pub fn compositions(&self) -> u32 {
        self.compositions
    }

    #[must_use]
    pub fn handles(&self) -> Option<&PartyHandles> {
        self.party.as_ref().map(|p| &p.handles)
    }

    #[must_use]
    pub fn simulation(&self) -> Option<&PartySimulation> {
        self.party.as_ref().map(|p| &p.simulation)
    }

    #[must_use]
    pub fn wish(&self) -> &WishOverlay {
        &self.wish
    }

    /// Liveness flag of the current mount.
    #[must_use]
    pub fn liveness(&self) -> Option<Arc<AtomicBool>> {
        self.registration.as_ref().map(|r| Arc::clone(&r.alive))
    }

    /// Photo requests not yet applied.
    #[must_use]
    pub fn pending_photos(&self) -> usize {
        self.photos.as_ref().map_or(0, PhotoLoader::pending)
    }

    /// Queues a finished photo as if a request had completed. Returns `false`
    /// when the stage is not mounted.
    pub fn inject_photo(&mut self, result: PhotoResult) -> bool {
        match &mut self.photos {
            Some(loader) => {
                loader.inject(result);
                true
            }
            None => false,
        }
    }

    fn handle_event(&mut self, engine: &mut Engine, event: &AppEvent) {
        match event {
            AppEvent::Resized { width, height } => self.resize(*width, *height),
            AppEvent::KeyPressed(Key::Escape) => self.close_wish(),
            AppEvent::KeyPressed(_) => {}
            AppEvent::Pointer(pointer) => {
                for gesture in self.controller.handle(pointer) {
                    self.apply_gesture(engine, gesture, pointer.time_ms);
                }
            }
        }
    }

    fn apply_gesture(&mut self, engine: &mut Engine, gesture: Gesture, now_ms: f64) {
        if let Gesture::Click(position) = gesture {
            self.click(engine, position, now_ms);
            return;
        }
        let Some(party) = &mut self.party else {
            return;
        };
        let orbit = &mut party.simulation.orbit;
        match gesture {
            Gesture::Rotate { dx, dy } => orbit.rotate(dx, dy),
            Gesture::Zoom(delta) => orbit.zoom(delta),
            Gesture::SuspendAutoRotate => orbit.suspend_auto_rotate(),
            Gesture::ResumeAutoRotateAt(at_ms) => orbit.schedule_resume(at_ms),
            Gesture::Click(_) | Gesture::Hover(_) => {}
        }
    }

    /// A click closes an open wish; otherwise it may open the envelope or
    /// blow out candles.
    fn click(&mut self, engine: &mut Engine, position: Vec2, now_ms: f64) {
        if self.wish.is_open() {
            self.close_wish();
            return;
        }
        let Some(ndc) = screen_to_ndc(position, self.viewport.0, self.viewport.1) else {
            return;
        };
        let Some(party) = &mut self.party else {
            return;
        };

        self.scene.update_matrix_world();
        let config = &self.config;
        let rng = &mut self.rng;
        let outcome = resolve_click(
            &self.scene,
            &party.handles,
            &mut party.simulation,
            ndc,
            || pick_wish(config, rng),
        );

        match outcome {
            ClickOutcome::OpenWish(text) => {
                show_wish(&mut self.scene, &party.handles, &mut engine.captions, &text);
                self.wish.open(text);
            }
            ClickOutcome::BlewOut(candles) => {
                log::info!(
                    "Blew out {} candle(s), {} still lit",
                    candles.len(),
                    party.simulation.lit_count()
                );
                party.simulation.start_confetti(now_ms, &mut self.rng);
            }
            ClickOutcome::Miss => {}
        }
    }

    fn close_wish(&mut self) {
        if self.wish.dismiss()
            && let Some(party) = &self.party
        {
            hide_wish(&mut self.scene, &party.handles);
        }
    }

    fn apply_photos(&mut self) {
        let (Some(loader), Some(party)) = (&mut self.photos, &self.party) else {
            return;
        };
        for result in loader.drain() {
            apply_photo(&mut self.scene, &party.handles, result);
        }
    }
}

impl Stage for PartyStage {
    fn mount(&mut self, engine: &mut Engine, viewport: (u32, u32), now_ms: f64) {
        if self.registration.is_some() {
            log::warn!("Party stage is already mounted");
            return;
        }

        self.scene = Scene::new();
        let mut party = compose_party(
            &mut self.scene,
            &self.config,
            &mut engine.captions,
            &mut self.rng,
        );
        self.compositions += 1;
        self.controller = InteractionController::new();
        self.wish = WishOverlay::default();
        self.viewport = (0, 0);
        apply_viewport(&mut self.scene, &mut self.viewport, viewport.0, viewport.1);

        let registration = Registration::attach(engine);
        let mut loader = PhotoLoader::new(Arc::clone(&registration.alive));
        for (index, source) in self.config.displayed_photos().iter().enumerate() {
            loader.request(index, source);
        }

        party.simulation.start_confetti(now_ms, &mut self.rng);
        apply_to_scene(&party.simulation, &mut self.scene);
        self.scene.update_matrix_world();

        log::info!(
            "Party stage mounted: scene {}, {} photo(s) requested",
            self.scene.id,
            loader.pending()
        );
        self.party = Some(party);
        self.photos = Some(loader);
        self.registration = Some(registration);
    }

    fn unmount(&mut self, engine: &mut Engine) {
        let Some(registration) = self.registration.take() else {
            return;
        };
        registration.detach(engine);
        self.photos = None;
        self.party = None;
        self.wish.dismiss();
        release_scene(engine, &mut self.scene, "Party stage");
    }

    fn is_mounted(&self) -> bool {
        self.registration.is_some()
    }

    fn resize(&mut self, width: u32, height: u32) {
        apply_viewport(&mut self.scene, &mut self.viewport, width, height);
    }

    fn frame(&mut self, engine: &mut Engine, now_ms: f64) -> bool {
        let Some(events) = self
            .registration
            .as_ref()
            .and_then(|r| r.begin_frame(engine, now_ms))
        else {
            return false;
        };

        for event in &events {
            self.handle_event(engine, event);
        }
        self.apply_photos();

        if let Some(mut party) = self.party.take() {
            party.simulation = advance(party.simulation, now_ms);
            apply_to_scene(&party.simulation, &mut self.scene);
            self.party = Some(party);
        }

        self.scene.update_matrix_world();
        engine.renderer.render(&self.scene);
        true
    }

    fn scene(&self) -> &Scene {
        &self.scene
    }

    fn viewport(&self) -> (u32, u32) {
        self.viewport
    }
}

// ============================================================================
// Gift gate
// ============================================================================

/// The wrapped present shown until the special date, then opened by a click.
pub struct GateStage {
    gate: GiftGate,
    rng: StdRng,
    scene: Scene,
    gift: Option<GateScene>,
    controller: InteractionController,
    caption: String,
    registration: Option<Registration>,
    viewport: (u32, u32),
}

impl GateStage {
    #[must_use]
    pub fn new(config: &PartyConfig, now_ms: f64, seed: u64) -> Self {
        let gate = GiftGate::new(config, now_ms);
        Self {
            caption: gate.caption(),
            gate,
            rng: StdRng::seed_from_u64(seed),
            scene: Scene::new(),
            gift: None,
            controller: InteractionController::new(),
            registration: None,
            viewport: (0, 0),
        }
    }

    #[must_use]
    pub fn gate(&self) -> &GiftGate {
        &self.gate
    }

    pub fn gate_mut(&mut self) -> &mut GiftGate {
        &mut self.gate
    }

    #[must_use]
    pub fn gift(&self) -> Option<&GateScene> {
        self.gift.as_ref()
    }

    /// Text currently rasterized under the present.
    #[must_use]
    pub fn caption(&self) -> &str {
        &self.caption
    }

    /// Key events carry no timestamp and use the frame time.
    fn handle_event(&mut self, engine: &mut Engine, event: &AppEvent, now_ms: f64) {
        match event {
            AppEvent::Resized { width, height } => self.resize(*width, *height),
            AppEvent::KeyPressed(Key::Enter | Key::Space) => self.open(engine, now_ms),
            AppEvent::KeyPressed(Key::Escape) => {}
            AppEvent::Pointer(pointer) => {
                for gesture in self.controller.handle(pointer) {
                    match gesture {
                        Gesture::Hover(position) => {
                            let hovered = self.hits_gift(position);
                            if let Some(gift) = &mut self.gift {
                                gift.animation.hovered = hovered;
                            }
                        }
                        Gesture::Click(position) if self.hits_gift(position) => {
                            self.open(engine, pointer.time_ms);
                        }
                        _ => {}
                    }
                }
            }
        }
    }

    fn hits_gift(&mut self, position: Vec2) -> bool {
        let Some(ndc) = screen_to_ndc(position, self.viewport.0, self.viewport.1) else {
            return false;
        };
        let Some(gift) = &self.gift else {
            return false;
        };
        self.scene.update_matrix_world();
        gift_hit(&self.scene, &gift.handles, ndc)
    }

    fn open(&mut self, engine: &mut Engine, now_ms: f64) {
        if !self.gate.request_open(now_ms) {
            return;
        }
        if let Some(gift) = &mut self.gift {
            gift.animation.open();
        }
        self.refresh_caption(engine);
    }

    fn refresh_caption(&mut self, engine: &mut Engine) {
        let caption = self.gate.caption();
        if caption == self.caption {
            return;
        }
        if let Some(gift) = &self.gift {
            set_gate_caption(&mut self.scene, &gift.handles, &mut engine.captions, &caption);
        }
        self.caption = caption;
    }
}

impl Stage for GateStage {
    fn mount(&mut self, engine: &mut Engine, viewport: (u32, u32), now_ms: f64) {
        if self.registration.is_some() {
            log::warn!("Gift gate is already mounted");
            return;
        }

        self.scene = Scene::new();
        self.gate.refresh(now_ms);
        self.caption = self.gate.caption();
        let mut gift = build_gift_gate(
            &mut self.scene,
            &mut engine.captions,
            &self.caption,
            &mut self.rng,
        );
        if self.gate.is_opened() {
            gift.animation.open();
        }
        self.controller = InteractionController::new();
        self.viewport = (0, 0);
        apply_viewport(&mut self.scene, &mut self.viewport, viewport.0, viewport.1);
        self.scene.update_matrix_world();

        self.gift = Some(gift);
        self.registration = Some(Registration::attach(engine));
        log::info!("Gift gate mounted: scene {}", self.scene.id);
    }

    fn unmount(&mut self, engine: &mut Engine) {
        let Some(registration) = self.registration.take() else {
            return;
        };
        registration.detach(engine);
        self.gift = None;
        release_scene(engine, &mut self.scene, "Gift gate");
    }

    fn is_mounted(&self) -> bool {
        self.registration.is_some()
    }

    fn resize(&mut self, width: u32, height: u32) {
        apply_viewport(&mut self.scene, &mut self.viewport, width, height);
    }

    fn frame(&mut self, engine: &mut Engine, now_ms: f64) -> bool {
        let Some(events) = self
            .registration
            .as_ref()
            .and_then(|r| r.begin_frame(engine, now_ms))
        else {
            return false;
        };

        for event in &events {
            self.handle_event(engine, event, now_ms);
        }
        if self.gate.tick(now_ms) {
            self.refresh_caption(engine);
        }

        if let Some(gift) = &mut self.gift {
            gift.animation.step();
            gift.animation.apply(&mut self.scene, &gift.handles);
        }

        self.scene.update_matrix_world();
        engine.renderer.render(&self.scene);
        true
    }

    fn scene(&self) -> &Scene {
        &self.scene
    }

    fn viewport(&self) -> (u32, u32) {
        self.viewport
    }
}

// ============================================================================
// Celebration
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Gate,
    Party,
}

/// Gift gate, then party.
pub struct Celebration {
    gate: GateStage,
    party: PartyStage,
    phase: Phase,
}

impl Celebration {
    #[must_use]
    pub fn new(config: PartyConfig, now_ms: f64, seed: u64) -> Self {
        Self {
            gate: GateStage::new(&config, now_ms, seed),
            party: PartyStage::new(config, seed.wrapping_add(1)),
            phase: Phase::Gate,
        }
    }

    /// Registers the callback fired once when the gift is opened.
    #[must_use]
    pub fn with_on_open_requested(mut self, callback: impl FnMut() + 'static) -> Self {
        self.gate.gate_mut().set_on_open_requested(callback);
        self
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn gate(&self) -> &GateStage {
        &self.gate
    }

    #[must_use]
    pub fn party(&self) -> &PartyStage {
        &self.party
    }

    pub fn party_mut(&mut self) -> &mut PartyStage {
        &mut self.party
    }

    /// Mounts the stage of the current phase.
    pub fn start(&mut self, engine: &mut Engine, viewport: (u32, u32), now_ms: f64) {
        match self.phase {
            Phase::Gate => self.gate.mount(engine, viewport, now_ms),
            Phase::Party => self.party.mount(engine, viewport, now_ms),
        }
    }

    /// Runs one frame and swaps the gate for the party once it is revealed.
    pub fn frame(&mut self, engine: &mut Engine, now_ms: f64) -> bool {
        let running = match self.phase {
            Phase::Gate => self.gate.frame(engine, now_ms),
            Phase::Party => self.party.frame(engine, now_ms),
        };
        if self.phase == Phase::Gate && self.gate.gate().party_visible(now_ms) {
            let viewport = self.gate.viewport();
            self.gate.unmount(engine);
            self.party.mount(engine, viewport, now_ms);
            self.phase = Phase::Party;
            log::info!("Party revealed");
        }
        if running {
            engine.end_frame();
        }
        running
    }

    /// Resizes the surface; the mounted stage picks the size up through its
    /// resize listener.
    pub fn resize(&mut self, engine: &mut Engine, width: u32, height: u32) {
        engine.resize(width, height);
    }

    /// Unmounts whichever stage is mounted.
    pub fn shutdown(&mut self, engine: &mut Engine) {
        self.gate.unmount(engine);
        self.party.unmount(engine);
    }
}
