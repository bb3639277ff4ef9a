//! Frame-by-frame state of the party scene.
//!
//! [`advance`] is a pure step over a [`PartySimulation`] value and never
//! touches the scene; [`apply_to_scene`] copies the resulting poses onto
//! nodes. Decorative motion is phase-based: every pose is a function of the
//! absolute wall-clock time, so a window resumed after a pause jumps to the
//! pose implied by the elapsed time instead of replaying missed frames.

use std::f32::consts::FRAC_PI_6;
use std::f64::consts::TAU;

use glam::{Quat, Vec3};
use rand::RngExt;

use crate::animation::confetti::ConfettiState;
use crate::animation::orbit::OrbitState;
use crate::scene::{NodeHandle, Scene};

/// Height of the flame and glow above the candle base.
pub const FLAME_Y: f32 = 0.9;

#[derive(Debug, Clone, PartialEq)]
pub struct CandleState {
    pub lit: bool,
    pub flame: NodeHandle,
    pub glow: NodeHandle,
    pub light: NodeHandle,

    pub flame_scale_y: f32,
    pub flame_y: f32,
    pub glow_scale: f32,
}

impl CandleState {
    #[must_use]
    pub fn new(flame: NodeHandle, glow: NodeHandle, light: NodeHandle) -> Self {
        Self {
            lit: true,
            flame,
            glow,
            light,
            flame_scale_y: 1.3,
            flame_y: FLAME_Y,
            glow_scale: 1.0,
        }
    }

    fn animate(&mut self, index: usize, now_ms: f64) {
        if !self.lit {
            return;
        }
        // Phases are computed in f64: epoch milliseconds overflow f32 precision.
        let t = now_ms * 0.002 + index as f64;
        self.flame_scale_y = 1.3 + ((t * 3.0).sin() * 0.2) as f32;
        self.flame_y = FLAME_Y + ((t * 2.0).sin() * 0.05) as f32;
        self.glow_scale = 1.0 + ((t * 4.0).sin() * 0.1) as f32;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BalloonState {
    pub node: NodeHandle,
    pub index: usize,
    pub base_position: Vec3,
    pub base_yaw: f32,

    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
}

impl BalloonState {
    #[must_use]
    pub fn new(node: NodeHandle, index: usize, base_position: Vec3, base_yaw: f32) -> Self {
        Self {
            node,
            index,
            base_position,
            base_yaw,
            position: base_position,
            yaw: base_yaw,
            pitch: 0.0,
        }
    }

    fn animate(&mut self, now_ms: f64) {
        let i = self.index as f64;
        let t = now_ms * 0.001 + i;
        self.position = self.base_position + Vec3::Y * ((t + i).sin() * 0.5) as f32;
        self.yaw = self.base_yaw + (now_ms * 0.0003 % TAU) as f32;
        self.pitch = ((t * 0.5 + i).sin() * 0.1) as f32;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnvelopeState {
    pub node: NodeHandle,
    pub y: f32,
    pub yaw: f32,
}

impl EnvelopeState {
    #[must_use]
    pub fn new(node: NodeHandle) -> Self {
        Self {
            node,
            y: 0.5,
            yaw: FRAC_PI_6,
        }
    }

    fn animate(&mut self, now_ms: f64) {
        let t = now_ms * 0.001;
        self.y = 0.5 + (t.sin() * 0.05) as f32;
        self.yaw = FRAC_PI_6 + ((t * 0.5).sin() * 0.1) as f32;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SparklesState {
    pub node: NodeHandle,
    pub yaw: f32,
}

/// Everything the party frame loop mutates.
#[derive(Debug, Clone)]
pub struct PartySimulation {
    pub now_ms: f64,
    pub candles: Vec<CandleState>,
    pub balloons: Vec<BalloonState>,
    pub envelope: EnvelopeState,
    pub sparkles: Option<SparklesState>,
    pub confetti: ConfettiState,
    pub orbit: OrbitState,
}

impl PartySimulation {
    /// Marks candle `index` as blown out. Returns `false` if it was already
    /// out or does not exist.
    pub fn blow_out(&mut self, index: usize) -> bool {
        match self.candles.get_mut(index) {
            Some(candle) if candle.lit => {
                candle.lit = false;
                log::info!("Candle {index} blown out");
                true
            }
            _ => false,
        }
    }

    #[must_use]
    pub fn lit_count(&self) -> usize {
        self.candles.iter().filter(|c| c.lit).count()
    }

    pub fn start_confetti(&mut self, now_ms: f64, rng: &mut impl RngExt) {
        self.confetti.start(now_ms, rng);
    }
}

/// Advances the simulation to `now_ms`.
#[must_use]
pub fn advance(mut state: PartySimulation, now_ms: f64) -> PartySimulation {
    state.now_ms = now_ms;

    for (index, candle) in state.candles.iter_mut().enumerate() {
        candle.animate(index, now_ms);
    }
    for balloon in &mut state.balloons {
        balloon.animate(now_ms);
    }
    state.envelope.animate(now_ms);
    if let Some(sparkles) = &mut state.sparkles {
        sparkles.yaw = (now_ms * 0.000_06 % TAU) as f32;
    }
    state.confetti.step(now_ms);
    state.orbit.step(now_ms);

    state
}

/// Copies the simulated poses onto the scene nodes.
pub fn apply_to_scene(state: &PartySimulation, scene: &mut Scene) {
    for candle in &state.candles {
        if let Some(flame) = scene.get_node_mut(candle.flame) {
            flame.visible = candle.lit;
            flame.transform.scale.y = candle.flame_scale_y;
            flame.transform.position.y = candle.flame_y;
        }
        if let Some(glow) = scene.get_node_mut(candle.glow) {
            glow.visible = candle.lit;
            glow.transform.scale = Vec3::splat(candle.glow_scale);
        }
        if !candle.lit
            && let Some(light) = scene.node_light_mut(candle.light)
        {
            light.intensity = 0.0;
        }
    }

    for balloon in &state.balloons {
        if let Some(node) = scene.get_node_mut(balloon.node) {
            node.transform.position = balloon.position;
            node.transform.set_rotation_euler(balloon.pitch, balloon.yaw, 0.0);
        }
    }

    if let Some(node) = scene.get_node_mut(state.envelope.node) {
        node.transform.position.y = state.envelope.y;
        node.transform.set_rotation_euler(0.0, state.envelope.yaw, 0.0);
    }

    if let Some(sparkles) = &state.sparkles
        && let Some(node) = scene.get_node_mut(sparkles.node)
    {
        node.transform.rotation = Quat::from_rotation_y(sparkles.yaw);
    }

    for (handle, particle) in state.confetti.nodes.iter().zip(&state.confetti.particles) {
        if let Some(node) = scene.get_node_mut(*handle) {
            node.visible = particle.visible;
            node.transform.position = particle.position;
            let r = particle.rotation;
            node.transform.set_rotation_euler(r.x, r.y, r.z);
        }
    }

    let orbit = &state.orbit;
    if let Some(root) = scene.get_node_mut(orbit.root) {
        root.transform.set_rotation_euler(orbit.pitch, orbit.yaw, 0.0);
    }
    if let Some(camera) = scene.get_node_mut(orbit.camera) {
        camera.transform.position.z = orbit.distance;
    }
}
