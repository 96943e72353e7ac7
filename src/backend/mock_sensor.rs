//! Mock Sensor Source
//!
//! Synthesizes accelerometer and gyroscope events on a background thread so
//! the recorder can run without motion hardware. Each sensor follows a
//! [`MockPattern`] at its own rate, which makes the two streams interleave
//! the way real sensors do.
//!
//! # Example
//!
//! ```ignore
//! use imu_recorder::backend::{MockSensorSource, SystemClock};
//! use imu_recorder::config::{MockSourceConfig, SamplingRate};
//!
//! let clock = Arc::new(SystemClock::new());
//! let mut source = MockSensorSource::new(MockSourceConfig::default(), clock);
//! let (tx, rx) = crossbeam_channel::unbounded();
//! source.subscribe(tx, SamplingRate::Game)?;
//! let event = rx.recv()?;
//! source.unsubscribe();
//! ```

use crossbeam_channel::Sender;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::config::{MockPattern, MockSourceConfig, SamplingRate};
use crate::error::{ImuError, Result};
use crate::types::{RawEvent, SensorKind};

use super::clock::Clock;
use super::sensor_trait::{SensorInfo, SensorSource};

/// Longest single sleep, so unsubscribe is noticed promptly
const MAX_SLEEP: Duration = Duration::from_millis(20);

/// One synthetic stream
#[derive(Debug, Clone, Copy)]
struct Stream {
    kind: SensorKind,
    pattern: MockPattern,
    interval_ns: i64,
    next_due: i64,
}

/// Sensor source that generates pattern-driven events
pub struct MockSensorSource {
    config: MockSourceConfig,
    clock: Arc<dyn Clock>,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl MockSensorSource {
    /// Create a new mock source using `clock` for event timestamps
    pub fn new(config: MockSourceConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    /// Streams for every available sensor, first due at `start`
    fn streams(&self, rate: SamplingRate, start: i64) -> Vec<Stream> {
        SensorKind::ALL
            .into_iter()
            .filter(|kind| self.config.sensor(*kind).available)
            .map(|kind| {
                let sensor = self.config.sensor(kind);
                Stream {
                    kind,
                    pattern: sensor.pattern,
                    interval_ns: 1_000_000_000 / i64::from(sensor.effective_hz(rate)),
                    next_due: start,
                }
            })
            .collect()
    }
}

impl SensorSource for MockSensorSource {
    fn name(&self) -> &str {
        "Mock"
    }

    fn sensors(&self) -> Vec<SensorInfo> {
        SensorKind::ALL
            .into_iter()
            .filter(|kind| self.config.sensor(*kind).available)
            .map(|kind| {
                let sensor = self.config.sensor(kind);
                SensorInfo::new(kind, sensor.name.clone(), sensor.vendor.clone())
            })
            .collect()
    }

    fn subscribe(&mut self, events: Sender<RawEvent>, rate: SamplingRate) -> Result<()> {
        if self.is_subscribed() {
            self.unsubscribe();
        }

        let start = self.clock.monotonic_ns();
        let mut streams = self.streams(rate, start);
        if streams.is_empty() {
            return Err(ImuError::SensorUnavailable(SensorKind::Accelerometer));
        }

        let clock = self.clock.clone();
        let running = self.running.clone();
        running.store(true, Ordering::SeqCst);

        let handle = std::thread::Builder::new()
            .name("mock-sensor".to_string())
            .spawn(move || {
                while running.load(Ordering::SeqCst) {
                    let Some(stream) = streams.iter_mut().min_by_key(|s| s.next_due) else {
                        break;
                    };

                    let now = clock.monotonic_ns();
                    if stream.next_due > now {
                        let wait = Duration::from_nanos((stream.next_due - now) as u64);
                        std::thread::sleep(wait.min(MAX_SLEEP));
                        continue;
                    }

                    let elapsed_secs = (now - start) as f64 / 1e9;
                    let event = RawEvent::new(stream.kind, stream.pattern.sample(elapsed_secs), now);
                    stream.next_due += stream.interval_ns;

                    if events.send(event).is_err() {
                        tracing::debug!("Event receiver dropped, stopping mock sensors");
                        break;
                    }
                }
            })
            .map_err(|e| ImuError::Io(e).with_context("Failed to spawn mock sensor thread"))?;

        self.handle = Some(handle);
        tracing::debug!("Mock sensors subscribed at {} rate", rate);
        Ok(())
    }

    fn unsubscribe(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("Mock sensor thread panicked");
            }
            tracing::debug!("Mock sensors unsubscribed");
        }
    }

    fn is_subscribed(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for MockSensorSource {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
