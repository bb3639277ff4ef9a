//! Engine Core Module
//!
//! This module contains [`Engine`], the services every stage shares. It holds
//! no window, so it can be driven by the winit runner, by the web entry
//! point, or headless by tests.
//!
//! # Components
//!
//! - **Renderer**: GPU context, pipelines and per-scene caches
//! - **`EventRouter`**: listener registry for pointer, resize and key events
//! - **`FrameScheduler`**: the per-stage frame chains
//! - **`CaptionRasterizer`**: text to texture for every caption in the party
//!
//! # Example
//!
//! ```rust,ignore
//! use fete::{Engine, RenderSettings};
//!
//! let mut engine = Engine::new(RenderSettings::default());
//! engine.init(window, 1280, 720).await?;
//!
//! // Platform events
//! engine.dispatch(&event);
//! ```

use crate::app::router::{AppEvent, EventRouter};
use crate::app::scheduler::FrameScheduler;
use crate::assets::CaptionRasterizer;
use crate::renderer::{RenderSettings, Renderer};

/// Shared services the stages mount into.
///
/// # Lifecycle
///
/// 1. Create with [`Engine::new`] (no GPU yet; enough for headless use)
/// 2. Initialize the GPU with [`Engine::init`]
/// 3. Feed platform events through [`Engine::dispatch`] and [`Engine::resize`]
pub struct Engine {
    pub renderer: Renderer,
    pub router: EventRouter,
    pub scheduler: FrameScheduler,
    pub captions: CaptionRasterizer,

    frame_count: u64,
}

impl Engine {
    /// Creates an engine without GPU resources and without a caption font.
    #[must_use]
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            renderer: Renderer::new(settings),
            router: EventRouter::new(),
            scheduler: FrameScheduler::new(),
            captions: CaptionRasterizer::empty(),
            frame_count: 0,
        }
    }

    /// Loads the caption font. `None` searches the system fonts.
    pub fn load_caption_font(&mut self, font_path: Option<&str>) {
        self.captions = CaptionRasterizer::new(font_path);
    }

    /// Initializes GPU resources for a window or canvas.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No compatible GPU adapter is found
    /// - Device creation fails
    /// - The surface cannot be configured
    pub async fn init(
        &mut self,
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> crate::errors::Result<()> {
        self.renderer.init(target, width, height).await
    }

    /// Routes a platform event to the registered listeners.
    pub fn dispatch(&mut self, event: &AppEvent) {
        self.router.dispatch(event);
    }

    /// Resizes the surface and notifies resize listeners.
    ///
    /// Zero sizes (a minimized window) still reach listeners, which keep
    /// their previous aspect ratio.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.renderer.resize(width, height);
        self.router.dispatch(&AppEvent::Resized { width, height });
    }

    /// Counts a presented frame.
    pub fn end_frame(&mut self) {
        self.frame_count += 1;
    }

    /// Returns the number of frames run since startup.
    #[inline]
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Returns the current surface size in pixels, `(0, 0)` before init.
    #[inline]
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        self.renderer.size()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(RenderSettings::default())
    }
}

/// Per-frame timing handed to application callbacks.
#[derive(Debug, Clone, Copy)]
pub struct FrameState {
    /// Wall-clock time in milliseconds since the Unix epoch.
    pub now_ms: f64,
    /// Seconds since the previous frame.
    pub dt: f32,
    /// Frames run since startup.
    pub frame_count: u64,
}
