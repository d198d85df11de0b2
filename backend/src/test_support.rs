//! Test utilities shared by unit tests (in `src/`) and integration tests
//! (in `tests/`, via the `test-support` feature).

use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;

/// Clock whose reading only changes when a test moves it.
///
/// # Examples
/// ```
/// use chrono::{TimeDelta, Utc};
/// use mockable::Clock;
/// use smsgate::test_support::MutableClock;
///
/// let start = Utc::now();
/// let clock = MutableClock::new(start);
/// clock.advance_seconds(90);
/// assert_eq!(clock.utc(), start + TimeDelta::seconds(90));
/// ```
#[derive(Debug)]
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    /// Clock frozen at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Move the clock forward by `delta`.
    pub fn advance(&self, delta: Duration) {
        let delta = match TimeDelta::from_std(delta) {
            Ok(delta) => delta,
            Err(error) => {
                panic!("failed to convert Duration to TimeDelta: {error}; delta={delta:?}")
            }
        };
        *self.lock_clock() += delta;
    }

    /// Move the clock forward by whole seconds.
    pub fn advance_seconds(&self, seconds: i64) {
        *self.lock_clock() += TimeDelta::seconds(seconds);
    }

    fn lock_clock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Fixed instant used as "now" across test suites.
pub fn fixed_now() -> DateTime<Utc> {
    match DateTime::from_timestamp(1_767_225_600, 0) {
        Some(now) => now,
        None => panic!("fixture timestamp out of range"),
    }
}
