//! Browser Build Tests
//!
//! Tests for:
//! - Config parsing with the web build's dependencies
//! - Countdown arithmetic on wasm32 floats and `web_time`
//!
//! Run with `wasm-pack test --headless --firefox`.

#![cfg(target_arch = "wasm32")]

use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};

use fete::config::{PartyConfig, SpecialDate};
use fete::overlay::{TimeLeft, ViewState, select_view, target_date_ms};
use fete::utils::{Clock, SystemClock};

wasm_bindgen_test_configure!(run_in_browser);

/// 2025-11-23T00:00:00Z
const NOV_23_2025: f64 = 1_763_856_000_000.0;
const DAY_MS: f64 = 86_400_000.0;

#[wasm_bindgen_test]
fn config_parses_in_the_browser() {
    let config = PartyConfig::from_json_str(r#"{ "special_date": { "month": 2, "day": 29 } }"#)
        .unwrap();
    assert_eq!(config.special_date, SpecialDate { month: 2, day: 29 });
    assert!(PartyConfig::from_json_str("{").is_err());
}

#[wasm_bindgen_test]
fn countdown_matches_native() {
    let date = SpecialDate { month: 11, day: 23 };
    let now = NOV_23_2025 - 1.5 * DAY_MS;
    let target = target_date_ms(now, date, 7, 0);
    assert_eq!(target, NOV_23_2025);
    assert!(matches!(
        select_view(target - now, false),
        ViewState::CountingDown(TimeLeft { days: 1, hours: 12, .. })
    ));
}

#[wasm_bindgen_test]
fn browser_clock_is_past_the_epoch() {
    let now = SystemClock.now_ms();
    assert!(now > NOV_23_2025 - 365.0 * DAY_MS);
}
