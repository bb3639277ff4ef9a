use std::cell::Cell;

use web_time::{SystemTime, UNIX_EPOCH};

// ============================================================================
// Wall clock
// ============================================================================

/// Source of absolute wall-clock time in milliseconds since the Unix epoch.
///
/// Animation is phase-based: poses are computed from the absolute time, never
/// from accumulated frame deltas, so a suspended window resumes at the phase
/// implied by real elapsed time instead of replaying missed frames.
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// The platform clock (`SystemTime` natively, `Date.now()` on the web).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64() * 1000.0)
            .unwrap_or(0.0)
    }
}

/// A clock that only moves when told to. Used by tests and headless runs.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    #[must_use]
    pub fn new(start_ms: f64) -> Self {
        Self {
            now: Cell::new(start_ms),
        }
    }

    pub fn set(&self, ms: f64) {
        self.now.set(ms);
    }

    pub fn advance(&self, ms: f64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> f64 {
        (**self).now_ms()
    }
}

// ============================================================================
// Calendar
// ============================================================================

pub const MS_PER_DAY: f64 = 86_400_000.0;

/// Days since 1970-01-01 of a proleptic Gregorian date.
#[must_use]
pub fn days_from_civil(year: i64, month: u32, day: u32) -> i64 {
    let y = if month <= 2 { year - 1 } else { year };
    let era = y.div_euclid(400);
    let yoe = y - era * 400;
    let m = i64::from(month);
    let mp = if m > 2 { m - 3 } else { m + 9 };
    let doy = (153 * mp + 2) / 5 + i64::from(day) - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

/// Calendar year containing `epoch_ms` in a zone `utc_offset_minutes` from UTC.
#[must_use]
pub fn year_at(epoch_ms: f64, utc_offset_minutes: i32) -> i64 {
    let local_ms = epoch_ms + f64::from(utc_offset_minutes) * 60_000.0;
    let days = (local_ms / MS_PER_DAY).floor() as i64;

    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400;
    if month <= 2 { year + 1 } else { year }
}

/// Epoch milliseconds of local midnight on `year-month-day`.
#[must_use]
pub fn local_midnight_ms(year: i64, month: u32, day: u32, utc_offset_minutes: i32) -> f64 {
    days_from_civil(year, month, day) as f64 * MS_PER_DAY
        - f64::from(utc_offset_minutes) * 60_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn civil_round_trip_known_dates() {
        assert_eq!(days_from_civil(1970, 1, 1), 0);
        assert_eq!(days_from_civil(2000, 3, 1), 11_017);
        assert_eq!(days_from_civil(2024, 11, 23), 20_050);
    }

    #[test]
    fn year_boundary_respects_offset() {
        let new_year_utc = local_midnight_ms(2025, 1, 1, 0);
        assert_eq!(year_at(new_year_utc - 1.0, 0), 2024);
        assert_eq!(year_at(new_year_utc, 0), 2025);
        // One hour before UTC midnight is already next year at UTC+2.
        assert_eq!(year_at(new_year_utc - 3_600_000.0, 120), 2025);
    }
}
