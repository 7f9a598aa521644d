//! Trailing time windows.

use chrono::{DateTime, Duration, Utc};

/// A trailing window of whole days ending now.
///
/// The length is clamped to `1..=3650` days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    days: i64,
}

impl Window {
    pub const DEFAULT_DAYS: i64 = 30;
    pub const MIN_DAYS: i64 = 1;
    pub const MAX_DAYS: i64 = 3650;

    /// Creates a window of `days` days, clamped into the accepted range.
    pub fn days(days: i64) -> Self {
        Self {
            days: days.clamp(Self::MIN_DAYS, Self::MAX_DAYS),
        }
    }

    /// Returns the window length in days.
    pub fn len_days(&self) -> i64 {
        self.days
    }

    /// Inclusive lower bound of the window when it ends at `now`.
    pub fn since(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(self.days)
    }

    /// Inclusive lower bound of the window ending at the current time.
    pub fn start(&self) -> DateTime<Utc> {
        self.since(Utc::now())
    }
}

impl Default for Window {
    fn default() -> Self {
        Self::days(Self::DEFAULT_DAYS)
    }
}

impl From<Option<i64>> for Window {
    fn from(days: Option<i64>) -> Self {
        days.map(Self::days).unwrap_or_default()
    }
}
