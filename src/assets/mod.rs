//! Asset loading
//!
//! - [`photo_loader`]: asynchronous photo fetch + decode with a liveness guard
//! - [`caption`]: text rasterized into RGBA images for caption planes

pub mod caption;
pub mod photo_loader;

pub use caption::{CaptionRasterizer, CaptionStyle, Fill};
pub use photo_loader::{PhotoLoader, PhotoResult};
