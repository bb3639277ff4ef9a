//! Application layer
//!
//! - [`router`]: platform events and the listener registry
//! - [`scheduler`]: per-stage frame chains
//! - [`input`]: pointer / touch tracking shared by every backend
//! - [`stage`]: mountable scene instances and the gate-then-party flow
//! - `input_adapter`, `winit`: the winit backend (feature `winit`)

pub mod input;
pub mod router;
pub mod scheduler;
pub mod stage;

#[cfg(feature = "winit")]
pub mod input_adapter;
#[cfg(feature = "winit")]
pub mod winit;

pub use router::{AppEvent, EventKind, EventRouter, Key, ListenerId};
pub use scheduler::{ChainId, FrameInfo, FrameScheduler};
pub use stage::{Celebration, GateStage, PartyStage, Phase, Stage};

#[cfg(feature = "winit")]
pub use self::winit::{App, AppHandler};
