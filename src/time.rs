//! Time abstraction for testability.
//!
//! Catalog loads and extractions are stamped through a [`Clock`] so tests can
//! pin timestamps instead of relying on the wall clock.

use std::time::SystemTime;

use chrono::{DateTime, Utc};

/// Abstraction over system time for testability.
///
/// # Example
///
/// ```
/// use confscout::time::{Clock, SystemClock};
///
/// let clock = SystemClock;
/// let now = clock.now();
/// assert!(now >= std::time::SystemTime::UNIX_EPOCH);
/// ```
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> SystemTime;

    /// Returns the current time as a UTC timestamp.
    fn now_utc(&self) -> DateTime<Utc> {
        DateTime::<Utc>::from(self.now())
    }
}

/// Production clock using actual system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// A clock frozen at a fixed instant.
///
/// Used by tests and by callers that want reproducible catalog output.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub SystemTime);

impl Clock for FixedClock {
    fn now(&self) -> SystemTime {
        self.0
    }
}
