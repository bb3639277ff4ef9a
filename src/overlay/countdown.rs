use std::fmt;

use crate::config::{PartyConfig, SpecialDate};
use crate::utils::time::{MS_PER_DAY, local_midnight_ms, year_at};

const MS_PER_HOUR: u64 = 3_600_000;
const MS_PER_MINUTE: u64 = 60_000;
const MS_PER_SECOND: u64 = 1000;

/// Remaining time split into whole units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeLeft {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl TimeLeft {
    /// Floor-divides a positive millisecond distance. Negative input yields zero.
    #[must_use]
    pub fn from_millis(distance_ms: f64) -> Self {
        let d = distance_ms.max(0.0).floor() as u64;
        let day = MS_PER_DAY as u64;
        Self {
            days: d / day,
            hours: (d % day) / MS_PER_HOUR,
            minutes: (d % MS_PER_HOUR) / MS_PER_MINUTE,
            seconds: (d % MS_PER_MINUTE) / MS_PER_SECOND,
        }
    }
}

impl fmt::Display for TimeLeft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}d {:02}h {:02}m {:02}s",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

/// Which top-level screen is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    CountingDown(TimeLeft),
    /// The date has arrived and the gift has not been opened yet.
    Unlockable,
    Opened,
}

/// Epoch milliseconds of the special date that `now_ms` counts towards.
///
/// This year's date is used until the celebration window after it closes;
/// then the countdown moves on to next year.
#[must_use]
pub fn target_date_ms(
    now_ms: f64,
    date: SpecialDate,
    window_days: u32,
    utc_offset_minutes: i32,
) -> f64 {
    let year = year_at(now_ms, utc_offset_minutes);
    let target = local_midnight_ms(year, date.month, date.day, utc_offset_minutes);
    let window_end = target + f64::from(window_days) * MS_PER_DAY;

    if now_ms < target || now_ms <= window_end {
        target
    } else {
        local_midnight_ms(year + 1, date.month, date.day, utc_offset_minutes)
    }
}

/// Maps the distance to the target date onto a view.
#[must_use]
pub fn select_view(distance_ms: f64, opened: bool) -> ViewState {
    if opened {
        ViewState::Opened
    } else if distance_ms <= 0.0 {
        ViewState::Unlockable
    } else {
        ViewState::CountingDown(TimeLeft::from_millis(distance_ms))
    }
}

/// Gate in front of the party: counts down to the special date, then lets
/// the gift be opened once.
pub struct GiftGate {
    special_date: SpecialDate,
    window_days: u32,
    utc_offset_minutes: i32,
    reveal_delay_ms: f64,

    view: ViewState,
    last_second: Option<i64>,
    opened_at: Option<f64>,
    on_open_requested: Option<Box<dyn FnMut()>>,
}

impl GiftGate {
    #[must_use]
    pub fn new(config: &PartyConfig, now_ms: f64) -> Self {
        let mut gate = Self {
            special_date: config.special_date,
            window_days: config.celebration_window_days,
            utc_offset_minutes: config.utc_offset_minutes,
            reveal_delay_ms: config.reveal_delay_ms as f64,
            view: ViewState::Unlockable,
            last_second: None,
            opened_at: None,
            on_open_requested: None,
        };
        gate.refresh(now_ms);
        gate
    }

    /// Registers the callback fired by the first successful open.
    pub fn set_on_open_requested(&mut self, callback: impl FnMut() + 'static) {
        self.on_open_requested = Some(Box::new(callback));
    }

    #[must_use]
    pub fn with_on_open_requested(mut self, callback: impl FnMut() + 'static) -> Self {
        self.set_on_open_requested(callback);
        self
    }

    #[must_use]
    pub fn target_ms(&self, now_ms: f64) -> f64 {
        target_date_ms(
            now_ms,
            self.special_date,
            self.window_days,
            self.utc_offset_minutes,
        )
    }

    /// Recomputes the view unconditionally.
    pub fn refresh(&mut self, now_ms: f64) -> ViewState {
        let distance = self.target_ms(now_ms) - now_ms;
        self.view = select_view(distance, self.opened_at.is_some());
        self.last_second = Some((now_ms / 1000.0).floor() as i64);
        self.view
    }

    /// Recomputes the view at most once per wall-clock second.
    /// Returns whether a refresh happened.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        let second = (now_ms / 1000.0).floor() as i64;
        if self.last_second == Some(second) {
            return false;
        }
        self.refresh(now_ms);
        true
    }

    #[must_use]
    pub fn view(&self) -> ViewState {
        self.view
    }

    #[must_use]
    pub fn is_unlockable(&self) -> bool {
        self.view == ViewState::Unlockable
    }

    #[must_use]
    pub fn is_opened(&self) -> bool {
        self.opened_at.is_some()
    }

    /// Handles the open gesture. Succeeds only while unlockable and only once;
    /// the callback fires on success.
    pub fn request_open(&mut self, now_ms: f64) -> bool {
        if self.opened_at.is_some() {
            return false;
        }
        if self.refresh(now_ms) != ViewState::Unlockable {
            log::debug!("Gift is still locked");
            return false;
        }

        self.opened_at = Some(now_ms);
        self.view = ViewState::Opened;
        log::info!("Gift opened");
        if let Some(callback) = self.on_open_requested.as_mut() {
            callback();
        }
        true
    }

    /// True once the reveal delay after opening has elapsed.
    #[must_use]
    pub fn party_visible(&self, now_ms: f64) -> bool {
        self.opened_at
            .is_some_and(|opened| now_ms - opened >= self.reveal_delay_ms)
    }

    /// Text for the caption floating above the gift.
    #[must_use]
    pub fn caption(&self) -> String {
        match self.view {
            ViewState::CountingDown(left) => left.to_string(),
            ViewState::Unlockable => "Tap the gift!".to_string(),
            ViewState::Opened => "Happy Birthday!".to_string(),
        }
    }
}
