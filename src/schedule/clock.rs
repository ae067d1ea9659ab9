//! Wall clock and UTC day-boundary arithmetic

use chrono::{DateTime, Local, Timelike, Utc};

/// Seconds in a UTC day
pub const SECONDS_PER_DAY: u64 = 86_400;

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Hour of day (0-23) used to bucket successful transfers
    fn local_hour(&self) -> u8 {
        self.now().with_timezone(&Local).hour() as u8
    }
}

/// System wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Seconds until the next UTC midnight
///
/// Exactly at midnight this is a full day, never zero.
pub fn seconds_until_utc_midnight(unix_seconds: u64) -> u64 {
    SECONDS_PER_DAY - (unix_seconds % SECONDS_PER_DAY)
}

/// Rest duration for the given instant
pub fn rest_until_next_day(now: DateTime<Utc>) -> std::time::Duration {
    let unix = now.timestamp().max(0) as u64;
    std::time::Duration::from_secs(seconds_until_utc_midnight(unix))
}
