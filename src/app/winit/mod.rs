//! Winit-based Application Framework
//!
//! Runs an [`AppHandler`] inside a [winit](https://crates.io/crates/winit)
//! event loop, natively or in a browser canvas.
//!
//! - [`App`]: builder for the window and render settings
//! - [`AppHandler`]: what the application implements
//! - `AppRunner`: the internal `ApplicationHandler`
//!
//! Window events are translated into [`AppEvent`](crate::app::router::AppEvent)s
//! by the [`input_adapter`](crate::app::input_adapter) and dispatched through
//! the engine's router; resizes additionally reconfigure the surface.
//!
//! # Example
//!
//! ```rust,ignore
//! use fete::app::winit::{App, AppHandler, Window};
//! use fete::engine::{Engine, FrameState};
//! use std::sync::Arc;
//!
//! struct Party {
//!     celebration: Celebration,
//! }
//!
//! impl AppHandler for Party {
//!     fn init(engine: &mut Engine, window: &Arc<Window>) -> Self {
//!         // Mount the first stage
//!     }
//!
//!     fn update(&mut self, engine: &mut Engine, window: &Arc<Window>, frame: &FrameState) {
//!         self.celebration.frame(engine, frame.now_ms);
//!     }
//! }
//!
//! fn main() -> fete::errors::Result<()> {
//!     App::new().with_title("Happy Birthday").run::<Party>()
//! }
//! ```

use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
pub use winit::window::{Window, WindowId};

use crate::app::input::PointerTracker;
use crate::app::input_adapter;
use crate::app::router::AppEvent;
use crate::engine::{Engine, FrameState};
use crate::renderer::settings::RenderSettings;
use crate::utils::time::{Clock, SystemClock};

/// Application behavior driven by the runner.
///
/// # Lifecycle
///
/// 1. [`init`](Self::init) - once, after the window and renderer exist
/// 2. [`on_event`](Self::on_event) - for each raw window event
/// 3. [`update`](Self::update) - once per frame
pub trait AppHandler: Sized + 'static {
    fn init(engine: &mut Engine, window: &Arc<Window>) -> Self;

    /// Sees each window event before translation. Return `true` to consume it.
    #[allow(unused_variables)]
    fn on_event(&mut self, engine: &mut Engine, window: &Arc<Window>, event: &WindowEvent) -> bool {
        false
    }

    /// Advances and draws one frame.
    #[allow(unused_variables)]
    fn update(&mut self, engine: &mut Engine, window: &Arc<Window>, frame: &FrameState) {}

    /// Called once before the event loop exits.
    #[allow(unused_variables)]
    fn exit(&mut self, engine: &mut Engine) {}
}

/// Application builder.
///
/// ```rust,ignore
/// App::new()
///     .with_title("Happy Birthday")
///     .with_settings(RenderSettings { vsync: false, ..Default::default() })
///     .run::<Party>()?;
/// ```
pub struct App {
    title: String,
    render_settings: RenderSettings,
    #[cfg(target_arch = "wasm32")]
    canvas_id: Option<String>,
}

impl App {
    #[must_use]
    pub fn new() -> Self {
        Self {
            title: "Fete".into(),
            render_settings: RenderSettings::default(),
            #[cfg(target_arch = "wasm32")]
            canvas_id: None,
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: RenderSettings) -> Self {
        self.render_settings = settings;
        self
    }

    /// Sets the id of the canvas element to render into (WASM only).
    #[cfg(target_arch = "wasm32")]
    #[must_use]
    pub fn with_canvas_id(mut self, id: impl Into<String>) -> Self {
        self.canvas_id = Some(id.into());
        self
    }

    /// Runs the event loop on the current thread until the window closes.
    ///
    /// # Errors
    ///
    /// Returns an error if event loop creation or execution fails.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn run<H: AppHandler>(self) -> crate::errors::Result<()> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut runner = AppRunner::<H>::new(self.title, self.render_settings);
        event_loop.run_app(&mut runner)?;
        Ok(())
    }

    /// Spawns the event loop and returns immediately (WASM version).
    #[cfg(target_arch = "wasm32")]
    pub fn run<H: AppHandler>(self) -> crate::errors::Result<()> {
        use winit::platform::web::EventLoopExtWebSys;

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let runner = AppRunner::<H>::new(self.title, self.render_settings, self.canvas_id);
        event_loop.spawn_app(runner);
        Ok(())
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

struct AppRunner<H: AppHandler> {
    title: String,
    render_settings: RenderSettings,

    #[cfg(target_arch = "wasm32")]
    canvas_id: Option<String>,

    window: Option<Arc<Window>>,
    engine: Option<Engine>,
    user_state: Option<H>,

    clock: SystemClock,
    tracker: PointerTracker,
    last_frame_ms: Option<f64>,

    #[cfg(target_arch = "wasm32")]
    init_state: std::rc::Rc<std::cell::RefCell<WasmInitState<H>>>,
}

/// Result slot for the asynchronous WASM initialization.
#[cfg(target_arch = "wasm32")]
struct WasmInitState<H: AppHandler> {
    result: Option<(Engine, H)>,
}

#[cfg(target_arch = "wasm32")]
impl<H: AppHandler> Default for WasmInitState<H> {
    fn default() -> Self {
        Self { result: None }
    }
}

impl<H: AppHandler> AppRunner<H> {
    fn new(
        title: String,
        render_settings: RenderSettings,
        #[cfg(target_arch = "wasm32")] canvas_id: Option<String>,
    ) -> Self {
        Self {
            title,
            render_settings,
            #[cfg(target_arch = "wasm32")]
            canvas_id,
            window: None,
            engine: None,
            user_state: None,
            clock: SystemClock,
            tracker: PointerTracker::new(),
            last_frame_ms: None,
            #[cfg(target_arch = "wasm32")]
            init_state: std::rc::Rc::new(std::cell::RefCell::new(WasmInitState::default())),
        }
    }

    fn update_frame(&mut self) {
        let now_ms = self.clock.now_ms();
        let dt = self
            .last_frame_ms
            .map_or(0.0, |last| ((now_ms - last) / 1000.0) as f32);
        self.last_frame_ms = Some(now_ms);

        let (Some(window), Some(engine), Some(user_state)) =
            (&self.window, &mut self.engine, &mut self.user_state)
        else {
            return;
        };

        let frame_state = FrameState {
            now_ms,
            dt,
            frame_count: engine.frame_count(),
        };
        user_state.update(engine, window, &frame_state);
    }

    /// Picks up the engine once the WASM init task has finished.
    #[cfg(target_arch = "wasm32")]
    fn poll_init(&mut self) -> bool {
        if self.engine.is_some() {
            return true;
        }
        let Ok(mut state) = self.init_state.try_borrow_mut() else {
            return false;
        };
        let Some((mut engine, user_state)) = state.result.take() else {
            return false;
        };
        drop(state);

        if let Some(window) = &self.window {
            let size = window.inner_size();
            engine.resize(size.width.max(1), size.height.max(1));
        }
        self.engine = Some(engine);
        self.user_state = Some(user_state);
        log::info!("Engine initialization completed, starting render loop");
        true
    }
}

impl<H: AppHandler> ApplicationHandler for AppRunner<H> {
    #[cfg(not(target_arch = "wasm32"))]
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attributes = Window::default_attributes()
            .with_title(&self.title)
            .with_inner_size(winit::dpi::LogicalSize::new(1280.0, 720.0));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };
        self.window = Some(Arc::clone(&window));

        log::info!("Initializing Renderer Backend...");

        let mut engine = Engine::new(self.render_settings.clone());
        let size = window.inner_size();

        if let Err(e) = pollster::block_on(engine.init(Arc::clone(&window), size.width, size.height))
        {
            log::error!("Fatal Renderer Error: {e}");
            event_loop.exit();
            return;
        }

        self.user_state = Some(H::init(&mut engine, &window));
        self.engine = Some(engine);
        self.last_frame_ms = None;
    }

    #[cfg(target_arch = "wasm32")]
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        use wasm_bindgen::JsCast;
        use winit::platform::web::WindowAttributesExtWebSys;

        if self.window.is_some() {
            return;
        }

        let canvas_id = self.canvas_id.as_deref().unwrap_or("fete-canvas");
        let Some(web_window) = web_sys::window() else {
            log::error!("No browser window");
            return;
        };
        let canvas = web_window
            .document()
            .and_then(|document| document.get_element_by_id(canvas_id))
            .and_then(|element| element.dyn_into::<web_sys::HtmlCanvasElement>().ok());
        let Some(canvas) = canvas else {
            log::error!("Canvas element '{canvas_id}' not found");
            return;
        };

        canvas.set_attribute("tabindex", "0").ok();
        canvas.focus().ok();

        let dpr = web_window.device_pixel_ratio();
        let width = (f64::from(canvas.client_width()) * dpr) as u32;
        let height = (f64::from(canvas.client_height()) * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let window_attributes = Window::default_attributes()
            .with_title(&self.title)
            .with_canvas(Some(canvas));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                return;
            }
        };
        self.window = Some(Arc::clone(&window));

        log::info!("Initializing WebGPU Renderer Backend...");

        let render_settings = self.render_settings.clone();
        let init_state = std::rc::Rc::clone(&self.init_state);

        wasm_bindgen_futures::spawn_local(async move {
            let mut engine = Engine::new(render_settings);
            let size = window.inner_size();

            match engine
                .init(Arc::clone(&window), size.width.max(1), size.height.max(1))
                .await
            {
                Ok(()) => {
                    let user_state = H::init(&mut engine, &window);
                    init_state.borrow_mut().result = Some((engine, user_state));
                    window.request_redraw();
                }
                Err(e) => log::error!("Fatal Renderer Error: {e}"),
            }
        });

        self.last_frame_ms = None;
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        #[cfg(target_arch = "wasm32")]
        if !self.poll_init() {
            return;
        }

        let (Some(window), Some(engine), Some(user_state)) =
            (&self.window, &mut self.engine, &mut self.user_state)
        else {
            return;
        };

        if user_state.on_event(engine, window, &event) {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                user_state.exit(engine);
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                self.update_frame();
                if let Some(w) = &self.window {
                    w.request_redraw();
                }
            }
            _ => {
                let now_ms = self.clock.now_ms();
                match input_adapter::process_window_event(&mut self.tracker, &event, now_ms) {
                    Some(AppEvent::Resized { width, height }) => engine.resize(width, height),
                    Some(app_event) => engine.dispatch(&app_event),
                    None => {}
                }
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if self.engine.is_some()
            && let Some(window) = &self.window
        {
            window.request_redraw();
        }
    }
}
