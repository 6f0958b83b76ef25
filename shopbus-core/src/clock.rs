//! Injectable time source
//!
//! Timestamps on analytics events and notifications come from a [`Clock`]
//! so tests can pin them with [`FixedClock`].

use std::cell::Cell;

use chrono::{DateTime, Duration, Utc};

/// Source of the current time
pub trait Clock {
    /// Get the current time
    fn now(&self) -> DateTime<Utc>;

    /// Current time as milliseconds since the Unix epoch
    fn epoch_millis(&self) -> i64 {
        self.now().timestamp_millis()
    }
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to
///
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use shopbus_core::clock::{Clock, FixedClock};
///
/// let clock = FixedClock::new(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
/// let before = clock.now();
/// assert_eq!(before, clock.now());
///
/// clock.advance(Duration::milliseconds(250));
/// assert_eq!(clock.epoch_millis() - before.timestamp_millis(), 250);
/// ```
#[derive(Debug, Clone)]
pub struct FixedClock {
    time: Cell<DateTime<Utc>>,
}

impl FixedClock {
    /// Create a clock frozen at `time`
    pub fn new(time: DateTime<Utc>) -> Self {
        Self {
            time: Cell::new(time),
        }
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        self.time.set(self.time.get() + by);
    }

    /// Jump to an exact time
    pub fn set(&self, time: DateTime<Utc>) {
        self.time.set(time);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.time.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_system_clock_is_recent() {
        let before = Utc::now();
        let now = SystemClock.now();
        assert!(now >= before);
    }

    #[test]
    fn test_fixed_clock_set() {
        let clock = FixedClock::new(Utc.timestamp_millis_opt(0).unwrap());
        assert_eq!(clock.epoch_millis(), 0);

        clock.set(Utc.timestamp_millis_opt(1_700_000_000_000).unwrap());
        assert_eq!(clock.epoch_millis(), 1_700_000_000_000);
    }
}
