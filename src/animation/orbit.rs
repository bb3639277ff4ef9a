//! Orbit state of the party view.
//!
//! Dragging rotates the party root (yaw around Y, clamped pitch around X);
//! zooming moves the camera along its axis within fixed bounds. Auto-rotation
//! pauses while the user interacts and resumes after a quiet period.

use std::f32::consts::FRAC_PI_6;

use crate::scene::NodeHandle;

pub const ROTATE_SPEED: f32 = 0.005;
pub const PITCH_LIMIT: f32 = FRAC_PI_6;
pub const MIN_DISTANCE: f32 = 8.0;
pub const MAX_DISTANCE: f32 = 25.0;
pub const INITIAL_DISTANCE: f32 = 15.0;
/// Auto-rotation speed in radians per second.
pub const AUTO_ROTATE_SPEED: f32 = 0.06;
pub const AUTO_ROTATE_RESUME_MS: f64 = 3000.0;
/// Camera distance easing rate, per second.
const EASING_RATE: f32 = 10.0;
/// Longest frame gap integrated by time-based motion.
const MAX_STEP_S: f32 = 0.1;

#[derive(Debug, Clone)]
pub struct OrbitState {
    pub root: NodeHandle,
    pub camera: NodeHandle,

    pub yaw: f32,
    pub pitch: f32,
    /// Distance requested by wheel / pinch.
    pub target_distance: f32,
    /// Distance the camera is currently drawn at; eases towards the target.
    pub distance: f32,

    pub auto_rotate: bool,
    pub resume_at_ms: Option<f64>,
    last_ms: Option<f64>,
}

impl OrbitState {
    #[must_use]
    pub fn new(root: NodeHandle, camera: NodeHandle) -> Self {
        Self {
            root,
            camera,
            yaw: 0.0,
            pitch: 0.0,
            target_distance: INITIAL_DISTANCE,
            distance: INITIAL_DISTANCE,
            auto_rotate: true,
            resume_at_ms: None,
            last_ms: None,
        }
    }

    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * ROTATE_SPEED;
        self.pitch = (self.pitch + dy * ROTATE_SPEED).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Positive deltas move the camera away.
    pub fn zoom(&mut self, delta: f32) {
        if !delta.is_finite() {
            return;
        }
        self.target_distance = (self.target_distance + delta).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    /// Stops auto-rotation and cancels any pending resume.
    pub fn suspend_auto_rotate(&mut self) {
        self.auto_rotate = false;
        self.resume_at_ms = None;
    }

    pub fn schedule_resume(&mut self, at_ms: f64) {
        self.resume_at_ms = Some(at_ms);
    }

    pub fn step(&mut self, now_ms: f64) {
        let dt = self
            .last_ms
            .map_or(0.0, |last| ((now_ms - last) / 1000.0) as f32)
            .clamp(0.0, MAX_STEP_S);
        self.last_ms = Some(now_ms);

        if let Some(at) = self.resume_at_ms
            && now_ms >= at
        {
            self.auto_rotate = true;
            self.resume_at_ms = None;
        }

        if self.auto_rotate {
            self.yaw += AUTO_ROTATE_SPEED * dt;
        }

        let blend = 1.0 - (-EASING_RATE * dt).exp();
        self.distance += (self.target_distance - self.distance) * blend;
        self.distance = self.distance.clamp(MIN_DISTANCE, MAX_DISTANCE);
    }
}
