//! Service-day time handling.
//!
//! Every instant inside the planner is a number of fractional hours since the
//! start of the service day. Schedules may run past 24.0 to describe late
//! trips of the same service day; there is no wraparound into the next day.
//! Minutes only appear at the edges: when a departure is parsed from "HH:MM"
//! and when times and durations are rendered for display.

use std::cmp::Ordering;
use std::fmt;

use chrono::{NaiveTime, Timelike};

/// Error returned when parsing an invalid clock time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time {input:?}: {reason}")]
pub struct TimeError {
    input: String,
    reason: &'static str,
}

impl TimeError {
    fn new(input: &str, reason: &'static str) -> Self {
        Self {
            input: input.to_string(),
            reason,
        }
    }
}

/// Guards display truncation against values such as `8.58333…` whose
/// fractional part lands a hair below a whole minute. Sized to floating-point
/// noise at service-day magnitudes (~1e-13 min), far below any real duration.
const DISPLAY_EPSILON_MINS: f64 = 1e-9;

/// An instant on the service day, in fractional hours.
///
/// Totally ordered (via [`f64::total_cmp`]) so it can key a binary heap.
///
/// # Examples
///
/// ```
/// use transit_server::domain::ServiceTime;
///
/// let t = ServiceTime::parse_hhmm("08:15").unwrap();
/// assert_eq!(t.hours(), 8.25);
/// assert_eq!(t.add_minutes(20.0).to_string(), "08:35");
/// ```
#[derive(Clone, Copy)]
pub struct ServiceTime(f64);

impl ServiceTime {
    pub const fn from_hours(hours: f64) -> Self {
        Self(hours)
    }

    /// Build a time from whole hours and minutes.
    pub fn from_hm(hour: u32, minute: u32) -> Self {
        Self(hour as f64 + minute as f64 / 60.0)
    }

    /// Parse a departure given as "HH:MM" (24-hour clock).
    pub fn parse_hhmm(s: &str) -> Result<Self, TimeError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(TimeError::new(s, "empty time"));
        }
        let time = NaiveTime::parse_from_str(trimmed, "%H:%M")
            .map_err(|_| TimeError::new(s, "expected HH:MM"))?;
        Ok(Self::from_hm(time.hour(), time.minute()))
    }

    /// Fractional hours since the start of the service day.
    pub fn hours(&self) -> f64 {
        self.0
    }

    /// Hour-of-day component, `t mod 24`.
    pub fn hour_of_day(&self) -> f64 {
        self.0.rem_euclid(24.0)
    }

    pub fn add_hours(self, hours: f64) -> Self {
        Self(self.0 + hours)
    }

    pub fn add_minutes(self, minutes: f64) -> Self {
        Self(self.0 + minutes / 60.0)
    }

    /// Minutes elapsed since `earlier` (negative if `earlier` is later).
    pub fn minutes_since(&self, earlier: ServiceTime) -> f64 {
        (self.0 - earlier.0) * 60.0
    }

    /// Whole minutes since `earlier`, truncated. Display only.
    pub fn whole_minutes_since(&self, earlier: ServiceTime) -> i64 {
        (self.minutes_since(earlier) + DISPLAY_EPSILON_MINS).trunc() as i64
    }

    /// Clock hour and minute, hour wrapped to 0-23 and minutes floored.
    pub fn clock(&self) -> (u32, u32) {
        let whole = self.0.floor();
        let hour = (whole as i64).rem_euclid(24) as u32;
        let minute = (((self.0 - whole) * 60.0 + DISPLAY_EPSILON_MINS).floor() as u32).min(59);
        (hour, minute)
    }
}

impl PartialEq for ServiceTime {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ServiceTime {}

impl Ord for ServiceTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl PartialOrd for ServiceTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for ServiceTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ServiceTime({:.4}h {})", self.0, self)
    }
}

impl fmt::Display for ServiceTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (hour, minute) = self.clock();
        write!(f, "{:02}:{:02}", hour, minute)
    }
}
