//! Time sources for session timing and export naming
//!
//! [`Clock::monotonic_ns`] stamps sensor events and session starts; it must be
//! the same clock for both so that relative timestamps line up.
//! [`Clock::wall_time`] only names export files.

use chrono::{DateTime, Local};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;
use std::time::Instant;

/// Monotonic and wall-clock time source
pub trait Clock: Send + Sync {
    /// Nanoseconds since an arbitrary, fixed epoch
    fn monotonic_ns(&self) -> i64;

    /// Current local date and time
    fn wall_time(&self) -> DateTime<Local>;
}

/// Clock backed by [`Instant`] and the system calendar
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    /// Create a clock whose epoch is now
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn monotonic_ns(&self) -> i64 {
        i64::try_from(self.origin.elapsed().as_nanos()).unwrap_or(i64::MAX)
    }

    fn wall_time(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Manually advanced clock for deterministic tests and replays
#[derive(Debug)]
pub struct ManualClock {
    nanos: AtomicI64,
    wall: Mutex<DateTime<Local>>,
}

impl ManualClock {
    /// Create a clock at the given monotonic time and wall time
    pub fn new(nanos: i64, wall: DateTime<Local>) -> Self {
        Self {
            nanos: AtomicI64::new(nanos),
            wall: Mutex::new(wall),
        }
    }

    /// Set the monotonic time
    pub fn set_ns(&self, nanos: i64) {
        self.nanos.store(nanos, Ordering::SeqCst);
    }

    /// Advance the monotonic time
    pub fn advance_ns(&self, delta: i64) {
        self.nanos.fetch_add(delta, Ordering::SeqCst);
    }

    /// Set the wall time
    pub fn set_wall_time(&self, wall: DateTime<Local>) {
        *self.wall.lock().unwrap_or_else(|e| e.into_inner()) = wall;
    }
}

impl Clock for ManualClock {
    fn monotonic_ns(&self) -> i64 {
        self.nanos.load(Ordering::SeqCst)
    }

    fn wall_time(&self) -> DateTime<Local> {
        *self.wall.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.monotonic_ns();
        let b = clock.monotonic_ns();
        assert!(b >= a);
        assert!(a >= 0);
    }

    #[test]
    fn test_manual_clock() {
        let wall = Local.with_ymd_and_hms(2024, 3, 9, 14, 30, 5).unwrap();
        let clock = ManualClock::new(1_000, wall);
        assert_eq!(clock.monotonic_ns(), 1_000);

        clock.advance_ns(500);
        assert_eq!(clock.monotonic_ns(), 1_500);

        clock.set_ns(42);
        assert_eq!(clock.monotonic_ns(), 42);
        assert_eq!(clock.wall_time(), wall);
    }
}
