//! Confetti particle pool.
//!
//! The pool is created once with the scene and recycled on every start; no
//! particle is ever reallocated. Integration is per frame (one step per
//! `advance`), matching a display-rate particle effect.

use glam::Vec3;
use rand::RngExt;

use crate::scene::NodeHandle;

pub const POOL_SIZE: usize = 200;
pub const GRAVITY: f32 = 0.001;
/// Particles above this height still count as falling.
pub const SETTLED_Y: f32 = -2.0;
/// Particles never go below this height.
pub const FLOOR_Y: f32 = -3.0;
/// Minimum time confetti stays active after a start.
pub const MIN_ACTIVE_MS: f64 = 6000.0;

pub const PALETTE: [u32; 8] = [
    0xff6b6b, 0x4ecdc4, 0xfeca57, 0xff9ff3, 0x54a0ff, 0x5f27cd, 0x00d2d3, 0xff9ff3,
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfettiParticle {
    pub position: Vec3,
    pub velocity: Vec3,
    /// XYZ Euler angles.
    pub rotation: Vec3,
    pub spin: Vec3,
    pub visible: bool,
}

impl ConfettiParticle {
    /// A hidden particle with a random orientation, waiting for the first start.
    pub fn spawn(rng: &mut impl RngExt) -> Self {
        let mut particle = Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            rotation: Vec3::new(
                rng.random::<f32>() * std::f32::consts::PI,
                rng.random::<f32>() * std::f32::consts::PI,
                rng.random::<f32>() * std::f32::consts::PI,
            ),
            spin: Vec3::ZERO,
            visible: false,
        };
        particle.reset(rng);
        particle.visible = false;
        particle
    }

    /// Moves the particle back to the overhead band with a fresh velocity.
    pub fn reset(&mut self, rng: &mut impl RngExt) {
        let mut centered = || rng.random::<f32>() - 0.5;
        self.position = Vec3::new(centered() * 20.0, 0.0, centered() * 20.0);
        self.velocity = Vec3::new(centered() * 0.02, 0.0, centered() * 0.02);
        self.spin = Vec3::new(centered() * 0.05, centered() * 0.05, centered() * 0.05);
        self.position.y = 15.0 + rng.random::<f32>() * 10.0;
        self.velocity.y = -0.05 - rng.random::<f32>() * 0.05;
        self.visible = true;
    }

    /// One integration step. Returns whether the particle is still falling.
    pub fn step(&mut self) -> bool {
        self.position += self.velocity;
        self.rotation += self.spin;
        self.velocity.y -= GRAVITY;

        let falling = self.position.y > SETTLED_Y;
        if self.position.y < FLOOR_Y {
            self.position.y = FLOOR_Y;
            self.velocity = Vec3::ZERO;
        }
        falling
    }
}

#[derive(Debug, Clone)]
pub struct ConfettiState {
    /// One node per particle, same order as `particles`.
    pub nodes: Vec<NodeHandle>,
    pub particles: Vec<ConfettiParticle>,
    pub active: bool,
    pub started_at_ms: f64,
    /// Number of starts since the pool was built.
    pub starts: u32,
}

impl ConfettiState {
    pub fn new(nodes: Vec<NodeHandle>, rng: &mut impl RngExt) -> Self {
        let particles = nodes.iter().map(|_| ConfettiParticle::spawn(rng)).collect();
        Self {
            nodes,
            particles,
            active: false,
            started_at_ms: 0.0,
            starts: 0,
        }
    }

    /// Resets every particle in place and activates the pool.
    pub fn start(&mut self, now_ms: f64, rng: &mut impl RngExt) {
        for particle in &mut self.particles {
            particle.reset(rng);
        }
        self.active = true;
        self.started_at_ms = now_ms;
        self.starts += 1;
        log::info!("Confetti started ({} particles)", self.particles.len());
    }

    /// Integrates one frame. Deactivates once the minimum duration has passed
    /// and every particle has settled; the particles are hidden then.
    pub fn step(&mut self, now_ms: f64) {
        if !self.active {
            return;
        }

        let mut all_settled = true;
        for particle in &mut self.particles {
            if particle.step() {
                all_settled = false;
            }
        }

        if now_ms - self.started_at_ms >= MIN_ACTIVE_MS && all_settled {
            for particle in &mut self.particles {
                particle.visible = false;
            }
            self.active = false;
            log::debug!("Confetti settled");
        }
    }
}
