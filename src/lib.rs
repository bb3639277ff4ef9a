#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

//! A procedurally built, animated 3D birthday party on wgpu.
//!
//! A countdown gift box opens into a room with a cake, candles that can be
//! blown out, balloons, confetti, photo frames and an envelope holding a
//! birthday wish. Every object is generated from primitives at runtime.

pub mod animation;
pub mod app;
pub mod assets;
pub mod config;
pub mod engine;
pub mod errors;
pub mod interaction;
pub mod overlay;
pub mod party;
pub mod renderer;
pub mod resources;
pub mod scene;
pub mod utils;

pub use app::{Celebration, GateStage, PartyStage, Stage};
pub use config::PartyConfig;
pub use engine::{Engine, FrameState};
pub use errors::{FeteError, Result};
pub use renderer::{RenderSettings, Renderer};
pub use scene::{Camera, Light, Node, NodeHandle, Scene};

#[cfg(feature = "winit")]
pub use app::{App, AppHandler};

/// Common imports for applications.
pub mod prelude {
    pub use crate::app::router::{AppEvent, Key};
    pub use crate::app::stage::{Celebration, Phase, Stage};
    pub use crate::config::PartyConfig;
    pub use crate::engine::{Engine, FrameState};
    pub use crate::errors::{FeteError, Result};
    pub use crate::interaction::{PointerEvent, PointerKind};
    pub use crate::renderer::RenderSettings;
    pub use crate::utils::time::{Clock, ManualClock, SystemClock};

    #[cfg(feature = "winit")]
    pub use crate::app::winit::{App, AppHandler, Window};

    pub use glam::{Vec2, Vec3};
}
