//! Renderer Settings
//!
//! Configuration consumed once when the GPU context is created, plus the
//! tone-mapping exposure read every frame.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use fete::renderer::RenderSettings;
//!
//! // Defaults: pink party background, vsync on, exposure 1.2
//! let settings = RenderSettings::default();
//!
//! // Battery-friendly setup for laptops
//! let settings = RenderSettings {
//!     power_preference: wgpu::PowerPreference::LowPower,
//!     ..Default::default()
//! };
//! ```

use crate::utils::color::hex;

/// Global configuration for renderer initialization.
///
/// # Fields
///
/// | Field              | Description                                 | Default            |
/// |--------------------|---------------------------------------------|--------------------|
/// | `vsync`            | Vertical sync enabled                       | `true`             |
/// | `power_preference` | GPU adapter selection strategy              | `HighPerformance`  |
/// | `clear_color`      | Fallback clear color (linear)               | `#ffebf3`          |
/// | `exposure`         | Multiplier applied before ACES tone mapping | `1.2`              |
/// | `required_limits`  | Required wgpu limits                        | WebGL2 downlevel   |
/// | `depth_format`     | Depth buffer texture format                 | `Depth32Float`     |
#[derive(Debug, Clone)]
pub struct RenderSettings {
    /// Enable vertical synchronization (VSync).
    ///
    /// When `true`, the frame rate is capped to the display refresh rate.
    pub vsync: bool,

    /// GPU adapter selection preference.
    ///
    /// - `HighPerformance`: Prefer discrete / dedicated GPU
    /// - `LowPower`: Prefer integrated GPU (better battery life)
    pub power_preference: wgpu::PowerPreference,

    /// Background clear color in linear space.
    ///
    /// Used when the rendered scene does not set its own `background`.
    pub clear_color: wgpu::Color,

    /// Exposure applied to lit and unlit shading before tone mapping.
    pub exposure: f32,

    /// Required wgpu limits.
    ///
    /// Defaults to the WebGL2 downlevel set so the same build runs in
    /// browsers without WebGPU.
    pub required_limits: wgpu::Limits,

    /// Depth buffer texture format.
    pub depth_format: wgpu::TextureFormat,
}

impl Default for RenderSettings {
    fn default() -> Self {
        let background = hex(0xffebf3);
        Self {
            vsync: true,
            power_preference: wgpu::PowerPreference::HighPerformance,
            clear_color: wgpu::Color {
                r: f64::from(background.x),
                g: f64::from(background.y),
                b: f64::from(background.z),
                a: 1.0,
            },
            exposure: 1.2,
            required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
            depth_format: wgpu::TextureFormat::Depth32Float,
        }
    }
}
