//! Mock collaborators for integration tests

use crossbeam_channel::Sender;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use imu_recorder::backend::{Clock, ManualClock, PermissionGate, SensorInfo, SensorSource};
use imu_recorder::config::SamplingRate;
use imu_recorder::export::{ByteSink, FsSink};
use imu_recorder::{ImuError, RawEvent, Result, SensorKind};

use super::builders::ScriptedReading;

/// Sensor source that replays one scripted batch per subscription
///
/// Readings are stamped with the clock's time at subscription plus their
/// offset and are all delivered before `subscribe` returns.
pub struct ScriptedSource {
    clock: Arc<ManualClock>,
    batches: Vec<Vec<ScriptedReading>>,
    available: Vec<SensorKind>,
    subscribed: bool,
    pub subscriptions: Arc<AtomicUsize>,
}

impl ScriptedSource {
    pub fn new(clock: Arc<ManualClock>, batches: Vec<Vec<ScriptedReading>>) -> Self {
        Self {
            clock,
            batches,
            available: SensorKind::ALL.to_vec(),
            subscribed: false,
            subscriptions: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn without(mut self, kind: SensorKind) -> Self {
        self.available.retain(|k| *k != kind);
        self
    }
}

impl SensorSource for ScriptedSource {
    fn name(&self) -> &str {
        "Scripted"
    }

    fn sensors(&self) -> Vec<SensorInfo> {
        self.available
            .iter()
            .map(|kind| SensorInfo::new(*kind, format!("Scripted {}", kind), "test"))
            .collect()
    }

    fn subscribe(&mut self, events: Sender<RawEvent>, _rate: SamplingRate) -> Result<()> {
        self.subscribed = true;
        self.subscriptions.fetch_add(1, Ordering::SeqCst);

        let base = self.clock.monotonic_ns();
        let batch = if self.batches.is_empty() {
            Vec::new()
        } else {
            self.batches.remove(0)
        };
        for (kind, values, offset) in batch {
            events
                .send(RawEvent::new(kind, values, base + offset))
                .map_err(|e| ImuError::Channel(e.to_string()))?;
        }
        Ok(())
    }

    fn unsubscribe(&mut self) {
        self.subscribed = false;
    }

    fn is_subscribed(&self) -> bool {
        self.subscribed
    }
}

/// Permission gate that always refuses
#[derive(Debug, Clone, Copy, Default)]
pub struct DeniedGate;

impl PermissionGate for DeniedGate {
    fn may_write(&self, _dir: &Path) -> bool {
        false
    }
}

/// Sink that fails a fixed number of times before writing to disk
#[derive(Debug, Clone)]
pub struct FlakySink {
    remaining_failures: Arc<AtomicUsize>,
    pub attempts: Arc<AtomicUsize>,
}

impl FlakySink {
    pub fn failing(times: usize) -> Self {
        Self {
            remaining_failures: Arc::new(AtomicUsize::new(times)),
            attempts: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl ByteSink for FlakySink {
    fn write(&self, dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let failed = self
            .remaining_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(ImuError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk full",
            )));
        }
        FsSink.write(dir, file_name, bytes)
    }
}
