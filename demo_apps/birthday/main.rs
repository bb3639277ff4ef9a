//! Birthday party
//!
//! Shows the countdown gift box until the special date, then the party room
//! once the gift is opened.
//!
//! Native: `cargo run -p birthday -- party.json`. Without an argument
//! `party.json` in the working directory is used; a missing file falls back
//! to the built-in defaults.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

use std::sync::Arc;

use fete::prelude::*;

const DEFAULT_CONFIG: &str = "party.json";

struct BirthdayApp {
    celebration: Celebration,
}

fn config_path() -> String {
    #[cfg(not(target_arch = "wasm32"))]
    if let Some(path) = std::env::args().nth(1) {
        return path;
    }
    DEFAULT_CONFIG.to_string()
}

fn load_config() -> PartyConfig {
    let path = config_path();
    match PartyConfig::load(&path) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("Using default party config, {path} is unusable: {e}");
            PartyConfig::default()
        }
    }
}

impl AppHandler for BirthdayApp {
    fn init(engine: &mut Engine, window: &Arc<Window>) -> Self {
        let config = load_config();
        engine.load_caption_font(config.font_path.as_deref());
        window.set_title(&format!("Happy Birthday, {}!", config.first_name()));

        let now_ms = SystemClock.now_ms();
        let mut celebration = Celebration::new(config, now_ms, now_ms as u64)
            .with_on_open_requested(|| log::info!("Gift opened, revealing the party"));

        let size = window.inner_size();
        celebration.start(engine, (size.width, size.height), now_ms);
        Self { celebration }
    }

    fn update(&mut self, engine: &mut Engine, _window: &Arc<Window>, frame: &FrameState) {
        self.celebration.frame(engine, frame.now_ms);
    }

    fn exit(&mut self, engine: &mut Engine) {
        self.celebration.shutdown(engine);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info,wgpu_core=warn,wgpu_hal=warn"),
    )
    .init();

    App::new()
        .with_title("Happy Birthday")
        .run::<BirthdayApp>()?;
    Ok(())
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    // A second init (hot reload) keeps the first logger.
    console_log::init_with_level(log::Level::Info).ok();

    if let Err(e) = App::new()
        .with_title("Happy Birthday")
        .with_canvas_id("fete-canvas")
        .run::<BirthdayApp>()
    {
        log::error!("Failed to start: {e}");
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}
