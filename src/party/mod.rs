//! Party content
//!
//! - [`builders`]: procedural decorations (cake, candles, balloons, ...)
//! - [`composer`]: assembles the party scene and returns its handles
//! - [`gift_gate`]: the present shown before the party

pub mod builders;
pub mod composer;
pub mod gift_gate;

pub use builders::CandleParts;
pub use composer::{PartyHandles, PartyScene, apply_photo, compose_party, hide_wish, show_wish};
pub use gift_gate::{GateAnimation, GateHandles, GateScene, build_gift_gate, gift_hit};
