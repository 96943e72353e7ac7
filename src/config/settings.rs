//! Recording and sensor source settings
//!
//! # Main Types
//!
//! - [`RecordingSettings`] - Sampling rate request and live display throttling
//! - [`SamplingRate`] - Delivery rate requested from the sensor source
//! - [`MockSourceConfig`] - Synthetic sensors used by the headless shell
//! - [`MockPattern`] - Waveform generated by a synthetic sensor

use serde::{Deserialize, Serialize};

use crate::types::{SensorKind, Vec3};

/// Default number of records between live display refreshes
pub const DEFAULT_DISPLAY_INTERVAL: usize = 100;

/// Standard gravity, m/s²
pub const STANDARD_GRAVITY: f32 = 9.806_65;

/// Delivery rate requested from the sensor source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SamplingRate {
    /// As fast as the hardware delivers
    #[default]
    Fastest,
    /// Suitable for games (~50 Hz)
    Game,
    /// Suitable for UI updates (~15 Hz)
    Ui,
    /// Screen orientation changes (~5 Hz)
    Normal,
}

impl SamplingRate {
    /// Nominal rate in Hz, for sources that synthesize events
    pub fn nominal_hz(&self) -> u32 {
        match self {
            SamplingRate::Fastest => 200,
            SamplingRate::Game => 50,
            SamplingRate::Ui => 15,
            SamplingRate::Normal => 5,
        }
    }
}

impl std::fmt::Display for SamplingRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SamplingRate::Fastest => write!(f, "fastest"),
            SamplingRate::Game => write!(f, "game"),
            SamplingRate::Ui => write!(f, "ui"),
            SamplingRate::Normal => write!(f, "normal"),
        }
    }
}

/// Settings that govern a recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingSettings {
    /// Rate requested from the sensor source
    #[serde(default)]
    pub sampling_rate: SamplingRate,

    /// Publish a live update every N records (0 = never)
    #[serde(default = "default_display_interval")]
    pub display_interval: usize,
}

fn default_display_interval() -> usize {
    DEFAULT_DISPLAY_INTERVAL
}

impl Default for RecordingSettings {
    fn default() -> Self {
        Self {
            sampling_rate: SamplingRate::default(),
            display_interval: DEFAULT_DISPLAY_INTERVAL,
        }
    }
}

impl RecordingSettings {
    /// Check if a live update is due after `record_count` records
    pub fn is_display_due(&self, record_count: usize) -> bool {
        self.display_interval > 0 && record_count > 0 && record_count % self.display_interval == 0
    }
}

/// Waveform generated by a synthetic sensor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MockPattern {
    /// Fixed reading
    Constant { values: Vec3 },
    /// Sine wave per axis, axes phase-shifted by a third of a period
    Sine {
        frequency_hz: f64,
        amplitude: f32,
        offset: Vec3,
    },
}

impl MockPattern {
    /// Reading at `elapsed_secs` since the source was subscribed
    pub fn sample(&self, elapsed_secs: f64) -> Vec3 {
        match *self {
            MockPattern::Constant { values } => values,
            MockPattern::Sine {
                frequency_hz,
                amplitude,
                offset,
            } => {
                let base = 2.0 * std::f64::consts::PI * frequency_hz * elapsed_secs;
                let mut out = offset;
                for (axis, value) in out.iter_mut().enumerate() {
                    let phase = axis as f64 * 2.0 * std::f64::consts::PI / 3.0;
                    *value += amplitude * (base + phase).sin() as f32;
                }
                out
            }
        }
    }
}

/// One synthetic sensor
///
/// In a config file every field is optional; a missing field keeps the value
/// from [`MockSensorConfig::default_for`] for that sensor kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MockSensorConfig {
    /// Whether the sensor is present
    pub available: bool,

    /// Reported sensor name
    pub name: String,

    /// Reported vendor
    pub vendor: String,

    /// Generated waveform
    pub pattern: MockPattern,

    /// Fixed rate in Hz, overriding the sampling rate request
    pub rate_hz: Option<u32>,
}

impl MockSensorConfig {
    /// Default synthetic sensor for a kind
    pub fn default_for(kind: SensorKind) -> Self {
        match kind {
            SensorKind::Accelerometer => Self {
                available: true,
                name: "Mock Accelerometer".to_string(),
                vendor: "imu-recorder".to_string(),
                pattern: MockPattern::Sine {
                    frequency_hz: 1.0,
                    amplitude: 0.5,
                    offset: [0.0, 0.0, STANDARD_GRAVITY],
                },
                rate_hz: None,
            },
            SensorKind::Gyroscope => Self {
                available: true,
                name: "Mock Gyroscope".to_string(),
                vendor: "imu-recorder".to_string(),
                pattern: MockPattern::Sine {
                    frequency_hz: 0.5,
                    amplitude: 0.2,
                    offset: [0.0; 3],
                },
                rate_hz: None,
            },
        }
    }

    /// Effective event rate for a sampling request
    pub fn effective_hz(&self, rate: SamplingRate) -> u32 {
        self.rate_hz.unwrap_or_else(|| rate.nominal_hz()).max(1)
    }
}

/// A `[mock.<sensor>]` table as written in the config file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct MockSensorTable {
    available: Option<bool>,
    name: Option<String>,
    vendor: Option<String>,
    pattern: Option<MockPattern>,
    rate_hz: Option<u32>,
}

impl MockSensorTable {
    /// Apply the fields present in the file over the kind's defaults
    fn resolve(self, kind: SensorKind) -> MockSensorConfig {
        let base = MockSensorConfig::default_for(kind);
        MockSensorConfig {
            available: self.available.unwrap_or(base.available),
            name: self.name.unwrap_or(base.name),
            vendor: self.vendor.unwrap_or(base.vendor),
            pattern: self.pattern.unwrap_or(base.pattern),
            rate_hz: self.rate_hz.or(base.rate_hz),
        }
    }
}

/// The `[mock]` section as written in the config file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct MockSourceTable {
    accelerometer: MockSensorTable,
    gyroscope: MockSensorTable,
}

/// Synthetic sensor pair used when no hardware source is attached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "MockSourceTable")]
pub struct MockSourceConfig {
    /// Accelerometer settings
    pub accelerometer: MockSensorConfig,

    /// Gyroscope settings
    pub gyroscope: MockSensorConfig,
}

impl From<MockSourceTable> for MockSourceConfig {
    fn from(table: MockSourceTable) -> Self {
        Self {
            accelerometer: table.accelerometer.resolve(SensorKind::Accelerometer),
            gyroscope: table.gyroscope.resolve(SensorKind::Gyroscope),
        }
    }
}

impl Default for MockSourceConfig {
    fn default() -> Self {
        Self {
            accelerometer: MockSensorConfig::default_for(SensorKind::Accelerometer),
            gyroscope: MockSensorConfig::default_for(SensorKind::Gyroscope),
        }
    }
}

impl MockSourceConfig {
    /// Settings for one sensor kind
    pub fn sensor(&self, kind: SensorKind) -> &MockSensorConfig {
        match kind {
            SensorKind::Accelerometer => &self.accelerometer,
            SensorKind::Gyroscope => &self.gyroscope,
        }
    }
}
