//! Wall-clock capability.
//!
//! The timer never reads the system time directly; it goes through the
//! [`Clock`] trait so tests can simulate elapsed time deterministically.

use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Source of the current wall-clock time.
pub trait Clock {
    /// Returns the current instant as a duration since the Unix epoch.
    fn now(&self) -> Duration;
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> Duration {
        (**self).now()
    }
}

/// Production clock backed by [`SystemTime`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
    }
}

/// Test clock with a settable current time.
#[derive(Debug, Default)]
pub struct MockClock {
    now: Mutex<Duration>,
}

impl MockClock {
    /// Creates a clock starting at the given instant.
    #[must_use]
    pub fn starting_at(now: Duration) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Sets the current time.
    pub fn set(&self, now: Duration) {
        *self.now.lock().unwrap() = now;
    }

    /// Moves the clock forward.
    pub fn advance(&self, delta: Duration) {
        *self.now.lock().unwrap() += delta;
    }
}

impl Clock for MockClock {
    fn now(&self) -> Duration {
        *self.now.lock().unwrap()
    }
}
