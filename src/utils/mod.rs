//! Utility Module
//!
//! - [`time`]: the wall-clock [`Clock`](time::Clock) abstraction
//! - [`color`]: sRGB hex / HSL helpers producing linear colors
//!
//! Everything time-dependent in the party scene reads milliseconds since the
//! Unix epoch from a [`Clock`](time::Clock), so tests can drive animation,
//! countdowns and auto-rotation timers with a [`ManualClock`](time::ManualClock).

pub mod color;
pub mod time;

pub use color::{hex, hsl};
pub use time::{Clock, ManualClock, SystemClock, local_midnight_ms, year_at};
