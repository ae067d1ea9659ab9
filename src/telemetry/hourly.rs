//! Per-hour transfer counters
//!
//! 24 buckets keyed by hour of day. The whole array starts over when the
//! UTC date changes, so a multi-day run shows today's activity only.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

pub const HOURS_PER_DAY: usize = 24;

/// Confirmed transfers per hour for the current UTC day
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HourlyActivity {
    /// Date (UTC) the counters belong to
    date: NaiveDate,
    counts: [u32; HOURS_PER_DAY],
}

impl HourlyActivity {
    /// Create counters for the day containing `now`
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            date: now.date_naive(),
            counts: [0; HOURS_PER_DAY],
        }
    }

    /// Create counters for today
    pub fn new_today() -> Self {
        Self::new(Utc::now())
    }

    /// Reset if `now` is on a later UTC date
    pub fn reset_if_new_day(&mut self, now: DateTime<Utc>) {
        if now.date_naive() != self.date {
            *self = Self::new(now);
        }
    }

    /// Count one confirmed transfer in `hour`
    pub fn record(&mut self, hour: u8, now: DateTime<Utc>) {
        self.reset_if_new_day(now);
        if let Some(slot) = self.counts.get_mut(hour as usize) {
            *slot += 1;
        }
    }

    pub fn count(&self, hour: u8) -> u32 {
        self.counts.get(hour as usize).copied().unwrap_or(0)
    }

    pub fn counts(&self) -> &[u32; HOURS_PER_DAY] {
        &self.counts
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }
}

impl Default for HourlyActivity {
    fn default() -> Self {
        Self::new_today()
    }
}
