//! Overlay state
//!
//! The logic behind the screens drawn over (or instead of) the party scene:
//! - [`countdown`]: the unlock date, the view selector and the [`GiftGate`]
//! - [`wishes`]: the message shown when the envelope is opened
//!
//! None of this touches the scene graph; stages read it to decide what to draw.

pub mod countdown;
pub mod wishes;

pub use countdown::{GiftGate, TimeLeft, ViewState, select_view, target_date_ms};
pub use wishes::{WISHES, WishOverlay, pick_wish};
