//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;
pub mod mock_helpers;

use chrono::{DateTime, Local, TimeZone};
use std::time::Duration;

/// Monotonic time the test clocks start at
pub const CLOCK_ORIGIN_NS: i64 = 1_000_000_000;

/// Create a test timeout duration
pub fn test_timeout() -> Duration {
    Duration::from_secs(2)
}

/// Fixed wall time used for export names
pub fn wall_time(hour: u32, minute: u32, second: u32) -> DateTime<Local> {
    Local
        .with_ymd_and_hms(2024, 1, 2, hour, minute, second)
        .single()
        .expect("unambiguous local time")
}

/// Assert two floats are approximately equal
pub fn assert_float_eq(a: f64, b: f64, epsilon: f64) {
    assert!(
        (a - b).abs() < epsilon,
        "Expected {} to be approximately equal to {} (epsilon: {})",
        a,
        b,
        epsilon
    );
}
