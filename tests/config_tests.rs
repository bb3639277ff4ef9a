//! Config Tests
//!
//! Tests for:
//! - JSON parsing with per-field defaults
//! - Validation of the special date and time zone
//! - Derived values: displayed photos, first name
//! - Loading from disk, including a missing file

use std::io::Write;

use fete::config::{MAX_PHOTOS, PartyConfig, SpecialDate};
use fete::errors::FeteError;

// ============================================================================
// Parsing
// ============================================================================

#[test]
fn empty_document_yields_defaults() {
    let config = PartyConfig::from_json_str("{}").unwrap();
    assert_eq!(config, PartyConfig::default());
}

#[test]
fn defaults_describe_the_built_in_party() {
    let config = PartyConfig::default();
    assert_eq!(config.display_name, "Yadanar Oo");
    assert_eq!(config.photos.len(), 6);
    assert_eq!(config.photos[0], "images/photo_01.jpg");
    assert_eq!(config.special_date, SpecialDate { month: 11, day: 23 });
    assert_eq!(config.celebration_window_days, 7);
    assert_eq!(config.reveal_delay_ms, 1500);
    assert!(config.envelope_message.is_none());
}

#[test]
fn partial_document_keeps_other_defaults() {
    let config = PartyConfig::from_json_str(
        r#"{
            "display_name": "Ada Lovelace",
            "special_date": { "month": 12, "day": 10 },
            "utc_offset_minutes": 60
        }"#,
    )
    .unwrap();
    assert_eq!(config.display_name, "Ada Lovelace");
    assert_eq!(config.special_date, SpecialDate { month: 12, day: 10 });
    assert_eq!(config.utc_offset_minutes, 60);
    assert_eq!(config.photos, PartyConfig::default().photos);
    assert_eq!(config.celebration_window_days, 7);
}

#[test]
fn malformed_json_is_a_json_error() {
    let err = PartyConfig::from_json_str("{ \"display_name\": ").unwrap_err();
    assert!(matches!(err, FeteError::JsonError(_)), "{err}");
}

// ============================================================================
// Validation
// ============================================================================

fn with_date(month: u32, day: u32) -> PartyConfig {
    PartyConfig {
        special_date: SpecialDate { month, day },
        ..PartyConfig::default()
    }
}

#[test]
fn month_out_of_range_is_rejected() {
    for month in [0, 13] {
        let err = with_date(month, 1).validate().unwrap_err();
        assert!(matches!(err, FeteError::ConfigError(_)), "{err}");
    }
}

#[test]
fn day_out_of_range_is_rejected() {
    for (month, day) in [(1, 0), (1, 32), (4, 31), (2, 30)] {
        assert!(
            matches!(with_date(month, day).validate(), Err(FeteError::ConfigError(_))),
            "{month}/{day}"
        );
    }
}

#[test]
fn leap_day_and_month_ends_are_accepted() {
    for (month, day) in [(2, 29), (1, 31), (4, 30), (12, 31)] {
        assert!(with_date(month, day).validate().is_ok(), "{month}/{day}");
    }
}

#[test]
fn time_zone_offset_is_bounded() {
    let config = PartyConfig {
        utc_offset_minutes: 15 * 60,
        ..PartyConfig::default()
    };
    assert!(matches!(config.validate(), Err(FeteError::ConfigError(_))));

    let config = PartyConfig {
        utc_offset_minutes: -(14 * 60),
        ..PartyConfig::default()
    };
    assert!(config.validate().is_ok());
}

#[test]
fn invalid_date_in_json_fails_to_parse() {
    let err = PartyConfig::from_json_str(r#"{ "special_date": { "month": 2, "day": 31 } }"#)
        .unwrap_err();
    assert!(matches!(err, FeteError::ConfigError(_)));
}

// ============================================================================
// Derived values
// ============================================================================

#[test]
fn displayed_photos_are_capped() {
    let config = PartyConfig {
        photos: (0..12).map(|i| format!("p{i}.png")).collect(),
        ..PartyConfig::default()
    };
    let shown = config.displayed_photos();
    assert_eq!(shown.len(), MAX_PHOTOS);
    assert_eq!(shown[0], "p0.png");
    assert_eq!(shown[MAX_PHOTOS - 1], format!("p{}.png", MAX_PHOTOS - 1));
}

#[test]
fn no_photos_is_fine() {
    let config = PartyConfig {
        photos: Vec::new(),
        ..PartyConfig::default()
    };
    assert!(config.displayed_photos().is_empty());
}

#[test]
fn first_name_is_the_first_word() {
    let mut config = PartyConfig::default();
    assert_eq!(config.first_name(), "Yadanar");

    config.display_name = "  Grace   Hopper ".to_string();
    assert_eq!(config.first_name(), "Grace");

    config.display_name = String::new();
    assert_eq!(config.first_name(), "");
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn missing_file_yields_defaults() {
    let path = std::env::temp_dir().join("fete-config-that-does-not-exist.json");
    let config = PartyConfig::load(&path).unwrap();
    assert_eq!(config, PartyConfig::default());
}

#[test]
fn file_on_disk_is_parsed() {
    let path = std::env::temp_dir().join(format!("fete-config-{}.json", std::process::id()));
    {
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, r#"{{ "display_name": "Katherine Johnson", "photos": [] }}"#).unwrap();
    }

    let config = PartyConfig::load(&path);
    std::fs::remove_file(&path).ok();

    let config = config.unwrap();
    assert_eq!(config.first_name(), "Katherine");
    assert!(config.photos.is_empty());
}
