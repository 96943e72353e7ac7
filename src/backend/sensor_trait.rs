//! SensorSource trait for motion sensor delivery
//!
//! This module provides a common trait for everything that can deliver raw
//! accelerometer and gyroscope events, so the worker does not care whether
//! readings come from a platform sensor service, a replay or a synthetic
//! generator.

use crossbeam_channel::Sender;
use serde::Serialize;

use crate::config::SamplingRate;
use crate::error::Result;
use crate::types::{RawEvent, SensorKind};

/// Description of one physical or synthetic sensor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SensorInfo {
    /// What the sensor measures
    pub kind: SensorKind,
    /// Sensor name as reported by the source
    pub name: String,
    /// Vendor as reported by the source
    pub vendor: String,
}

impl SensorInfo {
    /// Create a new sensor description
    pub fn new(kind: SensorKind, name: impl Into<String>, vendor: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            vendor: vendor.into(),
        }
    }
}

/// Render the sensor info block shown before recording
pub fn describe_sensors(sensors: &[SensorInfo]) -> String {
    let mut text = String::from("Sensors:\n");
    for kind in SensorKind::ALL {
        match sensors.iter().find(|s| s.kind == kind) {
            Some(info) => text.push_str(&format!("{}: {}\n", kind.display_name(), info.name)),
            None => text.push_str(&format!("{}: not available\n", kind.display_name())),
        }
    }
    text
}

/// Source of raw motion sensor events
///
/// Events are pushed into the channel handed to [`SensorSource::subscribe`]
/// until [`SensorSource::unsubscribe`] returns. Event timestamps must come from
/// the same clock the recorder uses.
pub trait SensorSource: Send {
    /// Get the source name for display
    fn name(&self) -> &str;

    /// Sensors this source can deliver
    fn sensors(&self) -> Vec<SensorInfo>;

    /// Check if a sensor kind is present
    fn is_available(&self, kind: SensorKind) -> bool {
        self.sensors().iter().any(|s| s.kind == kind)
    }

    /// Begin delivering events for every available sensor
    fn subscribe(&mut self, events: Sender<RawEvent>, rate: SamplingRate) -> Result<()>;

    /// Stop delivering events; no event is sent after this returns
    fn unsubscribe(&mut self);

    /// Check if events are currently being delivered
    fn is_subscribed(&self) -> bool;
}
