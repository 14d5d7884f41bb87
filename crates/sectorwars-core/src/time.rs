//! Wall-clock time for lazily evaluated state
//!
//! Every time-based rule in the economy is a pure function of
//! `(stored_state, now)`. The `Clock` trait is the single source of `now`:
//! - `SystemClock` - real UTC time for servers
//! - `ManualClock` - settable time for tests and offline simulation

use chrono::{DateTime, Duration, Utc};
use std::sync::Mutex;

/// A point in wall-clock time
pub type Timestamp = DateTime<Utc>;

/// Number of seconds in a game day (the regeneration period)
pub const SECONDS_PER_DAY: u64 = 86_400;

/// Source of the current time
pub trait Clock: Send + Sync {
    /// The current instant
    fn now(&self) -> Timestamp;
}

/// Real time from the operating system
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}

/// A clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Timestamp>,
}

impl ManualClock {
    /// Create a clock frozen at `start`
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Jump to an absolute instant (may move backwards to model skew)
    pub fn set(&self, instant: Timestamp) {
        *self.lock() = instant;
    }

    /// Move the clock forward (or backward for a negative duration)
    pub fn advance(&self, by: Duration) {
        let mut now = self.lock();
        *now = *now + by;
    }

    /// Advance by a whole number of hours
    pub fn advance_hours(&self, hours: i64) {
        self.advance(Duration::hours(hours));
    }

    /// Advance by a whole number of days
    pub fn advance_days(&self, days: i64) {
        self.advance(Duration::days(days));
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Timestamp> {
        // A poisoned clock still holds a valid instant.
        self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.lock()
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// Seconds from `since` to `now`, with clock skew (negative elapsed) read as zero
pub fn elapsed_seconds(since: Timestamp, now: Timestamp) -> f64 {
    let elapsed = now.signed_duration_since(since);
    if elapsed <= Duration::zero() {
        return 0.0;
    }
    elapsed.num_milliseconds() as f64 / 1000.0
}

/// Hours from `since` to `now`, never negative
pub fn elapsed_hours(since: Timestamp, now: Timestamp) -> f64 {
    elapsed_seconds(since, now) / 3600.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn epoch() -> Timestamp {
        Utc.with_ymd_and_hms(2102, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(epoch());
        assert_eq!(clock.now(), epoch());

        clock.advance_hours(12);
        assert_eq!(clock.now(), epoch() + Duration::hours(12));

        clock.set(epoch());
        assert_eq!(clock.now(), epoch());
    }

    #[test]
    fn test_elapsed_clamps_skew() {
        let later = epoch() + Duration::seconds(90);
        assert_eq!(elapsed_seconds(epoch(), later), 90.0);
        assert_eq!(elapsed_seconds(later, epoch()), 0.0);
        assert_eq!(elapsed_hours(epoch(), epoch() + Duration::hours(3)), 3.0);
    }

    #[test]
    fn test_elapsed_months_offline() {
        let later = epoch() + Duration::days(400);
        assert_eq!(elapsed_seconds(epoch(), later), 400.0 * SECONDS_PER_DAY as f64);
    }
}
