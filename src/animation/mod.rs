//! Party animation
//!
//! - [`simulation`]: per-frame state and the pure [`advance`] step
//! - [`confetti`]: the recycled particle pool
//! - [`orbit`]: drag / zoom / auto-rotation state of the view

pub mod confetti;
pub mod orbit;
pub mod simulation;

pub use confetti::{ConfettiParticle, ConfettiState};
pub use orbit::OrbitState;
pub use simulation::{
    BalloonState, CandleState, EnvelopeState, PartySimulation, SparklesState, advance,
    apply_to_scene,
};
