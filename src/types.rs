//! Core data types for the IMU recorder
//!
//! This module contains the fundamental data structures that flow from the
//! motion sensors through the fuser and into an export.
//!
//! # Main Types
//!
//! - [`SensorKind`] - Which motion sensor produced a reading
//! - [`RawEvent`] - One reading from a single sensor
//! - [`FusedRecord`] - One output row combining the latest reading of both sensors
//!
//! # Units
//!
//! Accelerometer values are in m/s², gyroscope values in rad/s. Timestamps
//! are monotonic nanoseconds; once inside a session they are relative to the
//! session start.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Three-axis sensor value (x, y, z)
pub type Vec3 = [f32; 3];

/// Nanoseconds per millisecond
pub const NANOS_PER_MILLI: f64 = 1_000_000.0;

/// The kind of motion sensor a reading came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    /// Linear acceleration, m/s²
    Accelerometer,
    /// Angular velocity, rad/s
    Gyroscope,
}

impl SensorKind {
    /// Both sensor kinds, in export column order
    pub const ALL: [SensorKind; 2] = [SensorKind::Accelerometer, SensorKind::Gyroscope];

    /// Display name for the sensor kind
    pub fn display_name(&self) -> &'static str {
        match self {
            SensorKind::Accelerometer => "Accelerometer",
            SensorKind::Gyroscope => "Gyroscope",
        }
    }

    /// Physical unit of the readings
    pub fn unit(&self) -> &'static str {
        match self {
            SensorKind::Accelerometer => "m/s²",
            SensorKind::Gyroscope => "rad/s",
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorKind::Accelerometer => write!(f, "accelerometer"),
            SensorKind::Gyroscope => write!(f, "gyroscope"),
        }
    }
}

/// One inbound reading from a single sensor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    /// Sensor that produced the reading
    pub kind: SensorKind,
    /// Axis values (x, y, z)
    pub values: Vec3,
    /// Monotonic nanoseconds
    pub timestamp: i64,
}

impl RawEvent {
    /// Create a new raw event
    pub fn new(kind: SensorKind, values: Vec3, timestamp: i64) -> Self {
        Self {
            kind,
            values,
            timestamp,
        }
    }

    /// Create an accelerometer event
    pub fn accelerometer(values: Vec3, timestamp: i64) -> Self {
        Self::new(SensorKind::Accelerometer, values, timestamp)
    }

    /// Create a gyroscope event
    pub fn gyroscope(values: Vec3, timestamp: i64) -> Self {
        Self::new(SensorKind::Gyroscope, values, timestamp)
    }

    /// Same reading shifted onto a different time origin
    pub fn relative_to(&self, origin: i64) -> Self {
        Self {
            timestamp: self.timestamp - origin,
            ..*self
        }
    }
}

/// One output row: the latest known accelerometer and gyroscope readings
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FusedRecord {
    /// Later of the two sensors' last-seen timestamps, nanoseconds from session start
    pub timestamp: i64,
    /// Accelerometer reading (m/s²)
    pub acc: Vec3,
    /// Gyroscope reading (rad/s)
    pub gyro: Vec3,
}

impl FusedRecord {
    /// Create a new fused record
    pub fn new(timestamp: i64, acc: Vec3, gyro: Vec3) -> Self {
        Self {
            timestamp,
            acc,
            gyro,
        }
    }

    /// Timestamp in milliseconds
    pub fn timestamp_ms(&self) -> f64 {
        self.timestamp as f64 / NANOS_PER_MILLI
    }

    /// Axis group for a sensor kind
    pub fn values(&self, kind: SensorKind) -> Vec3 {
        match kind {
            SensorKind::Accelerometer => self.acc,
            SensorKind::Gyroscope => self.gyro,
        }
    }

    /// Multi-line text for a live readout, given the number of records so far
    pub fn display_text(&self, record_count: usize) -> String {
        let mut text = format!(
            "Records collected: {}\n\nLatest record:\nTimestamp: {:.3} ms\n",
            record_count,
            self.timestamp_ms()
        );
        for kind in SensorKind::ALL {
            let [x, y, z] = self.values(kind);
            text.push_str(&format!(
                "\n{} ({}):\n  X: {:8.4}\n  Y: {:8.4}\n  Z: {:8.4}\n",
                kind.display_name(),
                kind.unit(),
                x,
                y,
                z
            ));
        }
        text
    }
}
