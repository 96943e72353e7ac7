//! Test data builders for sensor scripts and recorders

use std::path::{Path, PathBuf};
use std::sync::Arc;

use imu_recorder::backend::{AlwaysGranted, ManualClock, PermissionGate};
use imu_recorder::export::{ByteSink, FsSink};
use imu_recorder::{SensorKind, SessionRecorder, Vec3};

use super::{wall_time, CLOCK_ORIGIN_NS};

/// One scripted reading: kind, values, offset from subscription in nanoseconds
pub type ScriptedReading = (SensorKind, Vec3, i64);

/// Builder for a sequence of scripted readings
#[derive(Debug, Default, Clone)]
pub struct ScriptBuilder {
    readings: Vec<ScriptedReading>,
}

impl ScriptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acc(mut self, offset_ns: i64, values: Vec3) -> Self {
        self.readings.push((SensorKind::Accelerometer, values, offset_ns));
        self
    }

    pub fn gyro(mut self, offset_ns: i64, values: Vec3) -> Self {
        self.readings.push((SensorKind::Gyroscope, values, offset_ns));
        self
    }

    /// Alternating readings at a fixed spacing
    pub fn alternating(mut self, count: usize, spacing_ns: i64) -> Self {
        for i in 0..count {
            let offset = (i as i64 + 1) * spacing_ns;
            let v = i as f32;
            let kind = if i % 2 == 0 {
                SensorKind::Accelerometer
            } else {
                SensorKind::Gyroscope
            };
            self.readings.push((kind, [v, v + 0.5, v + 1.0], offset));
        }
        self
    }

    pub fn build(self) -> Vec<ScriptedReading> {
        self.readings
    }
}

/// Builder for a recorder on a manual clock
pub struct RecorderBuilder {
    clock: Arc<ManualClock>,
    gate: Box<dyn PermissionGate>,
    sink: Box<dyn ByteSink>,
    export_dir: PathBuf,
}

impl RecorderBuilder {
    pub fn new(export_dir: &Path) -> Self {
        Self {
            clock: Arc::new(ManualClock::new(CLOCK_ORIGIN_NS, wall_time(3, 4, 5))),
            gate: Box::new(AlwaysGranted),
            sink: Box::new(FsSink),
            export_dir: export_dir.to_path_buf(),
        }
    }

    pub fn gate(mut self, gate: impl PermissionGate + 'static) -> Self {
        self.gate = Box::new(gate);
        self
    }

    pub fn sink(mut self, sink: impl ByteSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn clock(&self) -> Arc<ManualClock> {
        self.clock.clone()
    }

    pub fn build(self) -> SessionRecorder {
        SessionRecorder::new(self.clock, self.gate, self.sink, self.export_dir)
    }
}
