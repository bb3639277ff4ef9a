//! Party configuration
//!
//! Everything personal about a party lives in [`PartyConfig`]: who it is for,
//! which photos to show and when the gift unlocks. It is read from JSON and
//! every field falls back to its default, so a partial file is valid.
//!
//! ```json
//! {
//!   "display_name": "Ada Lovelace",
//!   "photos": ["images/a.jpg", "https://example.com/b.png"],
//!   "special_date": { "month": 12, "day": 10 },
//!   "utc_offset_minutes": 60
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{FeteError, Result};

/// Maximum number of photo frames placed around the table.
pub const MAX_PHOTOS: usize = 8;

/// Month and day of the celebrated date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialDate {
    /// 1 to 12.
    pub month: u32,
    /// 1 to 31.
    pub day: u32,
}

impl Default for SpecialDate {
    fn default() -> Self {
        Self { month: 11, day: 23 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartyConfig {
    pub display_name: String,
    /// Paths or `http(s)` URLs. Only the first [`MAX_PHOTOS`] are shown.
    pub photos: Vec<String>,
    pub special_date: SpecialDate,
    /// Days after the special date during which the gift stays unlockable.
    pub celebration_window_days: u32,
    /// Offset of the celebrating time zone from UTC.
    pub utc_offset_minutes: i32,
    /// Replaces the random wish shown when the envelope is opened.
    pub envelope_message: Option<String>,
    /// Font used for captions. System fonts are searched when unset.
    pub font_path: Option<String>,
    /// Delay between opening the gift and showing the party.
    pub reveal_delay_ms: u64,
}

impl Default for PartyConfig {
    fn default() -> Self {
        Self {
            display_name: "Yadanar Oo".to_string(),
            photos: (1..=6)
                .map(|i| format!("images/photo_{i:02}.jpg"))
                .collect(),
            special_date: SpecialDate::default(),
            celebration_window_days: 7,
            utc_offset_minutes: 0,
            envelope_message: None,
            font_path: None,
            reveal_delay_ms: 1500,
        }
    }
}

impl PartyConfig {
    /// Parses and validates a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a config file. A missing file yields the defaults.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => {
                log::info!("Loaded party config from {}", path.display());
                Self::from_json_str(&json)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// There is no filesystem on the web; the defaults are used.
    #[cfg(target_arch = "wasm32")]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        log::info!(
            "Config files are not read on the web ({}), using defaults",
            path.as_ref().display()
        );
        Ok(Self::default())
    }

    pub fn validate(&self) -> Result<()> {
        let SpecialDate { month, day } = self.special_date;
        if !(1..=12).contains(&month) {
            return Err(FeteError::ConfigError(format!(
                "special_date.month must be 1-12, got {month}"
            )));
        }
        if day == 0 || day > days_in_month(month) {
            return Err(FeteError::ConfigError(format!(
                "special_date.day {day} is out of range for month {month}"
            )));
        }
        if self.utc_offset_minutes.abs() > 14 * 60 {
            return Err(FeteError::ConfigError(format!(
                "utc_offset_minutes {} is out of range",
                self.utc_offset_minutes
            )));
        }
        Ok(())
    }

    /// Photos that get a frame.
    #[must_use]
    pub fn displayed_photos(&self) -> &[String] {
        &self.photos[..self.photos.len().min(MAX_PHOTOS)]
    }

    /// First word of the display name, used on the special balloon.
    #[must_use]
    pub fn first_name(&self) -> &str {
        self.display_name.split_whitespace().next().unwrap_or("")
    }
}

/// Longest month length, leap years included.
fn days_in_month(month: u32) -> u32 {
    match month {
        2 => 29,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}
