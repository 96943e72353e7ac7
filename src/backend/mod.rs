//! Backend module: the recording worker and its environment
//!
//! This module runs the [`SessionRecorder`] in its own thread and provides
//! the collaborators it depends on. It uses crossbeam channels for
//! thread-safe communication with the shell.
//!
//! # Architecture
//!
//! - [`RecorderCommand`] - Messages sent from the shell to the worker (start, stop, ...)
//! - [`RecorderMessage`] - Messages sent from the worker to the shell (outcomes, live data)
//! - [`RecorderHandle`] - Shell-side handle for sending commands and receiving messages
//! - [`RecorderBackend`] - Entry point that owns the worker until it is run
//!
//! # Components
//!
//! - [`SensorSource`] / [`MockSensorSource`] - Raw event delivery
//! - [`Clock`] / [`SystemClock`] / [`ManualClock`] - Monotonic and wall time
//! - [`PermissionGate`] / [`WritableDirGate`] - Storage permission check before start
//! - [`RecorderWorker`] - Main loop that serializes commands and events
//!
//! # Example
//!
//! ```ignore
//! use imu_recorder::backend::RecorderBackend;
//!
//! let (backend, handle) = RecorderBackend::new(recorder, Box::new(source), settings);
//!
//! // Spawn worker thread
//! let worker = std::thread::spawn(move || backend.run());
//!
//! handle.start();
//! // ...
//! handle.stop();
//!
//! // Receive messages
//! for msg in handle.drain() {
//!     match msg {
//!         RecorderMessage::Stop(StopOutcome::Stopped(summary)) => {
//!             // Show summary
//!         }
//!         _ => {}
//!     }
//! }
//! ```

pub mod clock;
pub mod mock_sensor;
pub mod permission;
pub mod sensor_trait;
pub mod worker;

pub use clock::{Clock, ManualClock, SystemClock};
pub use mock_sensor::MockSensorSource;
pub use permission::{AlwaysGranted, PermissionGate, WritableDirGate};
pub use sensor_trait::{describe_sensors, SensorInfo, SensorSource};
pub use worker::RecorderWorker;

use crate::config::RecordingSettings;
use crate::error::Result;
use crate::session::{ExportOutcome, SessionRecorder, StartOutcome, StopOutcome};
use crate::types::FusedRecord;
use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Latest record together with the session's record count
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiveRecord {
    /// Records in the session so far
    pub record_count: usize,
    /// Most recent fused record
    pub record: FusedRecord,
}

/// Message sent from the shell to the worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderCommand {
    /// Begin a session
    Start,
    /// End the session and export it
    Stop,
    /// Retry the last failed export
    RetryExport,
    /// Request the sensor list
    RequestSensors,
    /// Shutdown the worker
    Shutdown,
}

/// Message sent from the worker to the shell
#[derive(Debug)]
pub enum RecorderMessage {
    /// Reply to [`RecorderCommand::Start`]
    Start(Result<StartOutcome>),
    /// Reply to [`RecorderCommand::Stop`]
    Stop(StopOutcome),
    /// Reply to [`RecorderCommand::RetryExport`]; `None` if nothing was pending
    Retry(Option<ExportOutcome>),
    /// Throttled live update
    Live(LiveRecord),
    /// Reply to [`RecorderCommand::RequestSensors`]
    Sensors(Vec<SensorInfo>),
    /// Worker is shutting down
    Shutdown,
}

/// Shell-side handle to a running worker
pub struct RecorderHandle {
    /// Receiver for worker messages
    pub receiver: Receiver<RecorderMessage>,
    /// Sender for commands to the worker
    pub command_sender: Sender<RecorderCommand>,
    /// Latest record slot written by the worker
    latest: Arc<Mutex<Option<LiveRecord>>>,
}

impl RecorderHandle {
    /// Wait up to `timeout` for a message
    pub fn recv_timeout(&self, timeout: Duration) -> Option<RecorderMessage> {
        match self.receiver.recv_timeout(timeout) {
            Ok(msg) => Some(msg),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Receive all pending messages
    pub fn drain(&self) -> Vec<RecorderMessage> {
        let mut messages = Vec::new();
        while let Ok(msg) = self.receiver.try_recv() {
            messages.push(msg);
        }
        messages
    }

    /// Send a command to the worker
    pub fn send_command(&self, cmd: RecorderCommand) -> bool {
        self.command_sender.send(cmd).is_ok()
    }

    /// Start recording
    pub fn start(&self) {
        let _ = self.command_sender.send(RecorderCommand::Start);
    }

    /// Stop recording and export
    pub fn stop(&self) {
        let _ = self.command_sender.send(RecorderCommand::Stop);
    }

    /// Retry a failed export
    pub fn retry_export(&self) {
        let _ = self.command_sender.send(RecorderCommand::RetryExport);
    }

    /// Request the sensor list
    pub fn request_sensors(&self) {
        let _ = self.command_sender.send(RecorderCommand::RequestSensors);
    }

    /// Request shutdown
    pub fn shutdown(&self) {
        let _ = self.command_sender.send(RecorderCommand::Shutdown);
    }

    /// Latest fused record, updated on every ingest
    pub fn latest_record(&self) -> Option<FusedRecord> {
        self.live().map(|live| live.record)
    }

    /// Latest record with the record count
    pub fn live(&self) -> Option<LiveRecord> {
        *self.latest.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// The recorder backend that runs in a separate thread
pub struct RecorderBackend {
    worker: RecorderWorker,
}

impl RecorderBackend {
    /// Create a new backend with communication channels
    pub fn new(
        recorder: SessionRecorder,
        source: Box<dyn SensorSource>,
        settings: RecordingSettings,
    ) -> (Self, RecorderHandle) {
        let (cmd_tx, cmd_rx) = bounded(64);
        // Bounded for backpressure; live updates are dropped rather than blocking ingestion
        let (msg_tx, msg_rx) = bounded(1_024);
        // Sensor sources must never block on delivery
        let event_channel = unbounded();
        let latest = Arc::new(Mutex::new(None));

        let worker = RecorderWorker::new(
            recorder,
            source,
            settings,
            cmd_rx,
            msg_tx,
            event_channel,
            latest.clone(),
        );

        let handle = RecorderHandle {
            receiver: msg_rx,
            command_sender: cmd_tx,
            latest,
        };

        (Self { worker }, handle)
    }

    /// Run the worker loop until shutdown
    pub fn run(mut self) {
        self.worker.run();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::permission::AlwaysGranted;
    use crate::config::MockSourceConfig;
    use crate::export::FsSink;

    fn backend() -> (RecorderBackend, RecorderHandle) {
        let clock = Arc::new(SystemClock::new());
        let recorder = SessionRecorder::new(
            clock.clone(),
            Box::new(AlwaysGranted),
            Box::new(FsSink),
            std::env::temp_dir().join("imu-recorder-unit"),
        );
        let source = MockSensorSource::new(MockSourceConfig::default(), clock);
        RecorderBackend::new(recorder, Box::new(source), RecordingSettings::default())
    }

    #[test]
    fn test_backend_creation() {
        let (_backend, handle) = backend();
        assert!(handle.send_command(RecorderCommand::Shutdown));
        assert!(handle.latest_record().is_none());
    }

    #[test]
    fn test_shutdown_message() {
        let (backend, handle) = backend();
        let worker = std::thread::spawn(move || backend.run());

        handle.shutdown();
        worker.join().unwrap();
        assert!(matches!(handle.drain().last(), Some(RecorderMessage::Shutdown)));
    }

    #[test]
    fn test_worker_exits_when_handle_dropped() {
        let (backend, handle) = backend();
        let worker = std::thread::spawn(move || backend.run());

        drop(handle);
        worker.join().unwrap();
    }

    #[test]
    fn test_stop_while_idle_is_reported() {
        let (backend, handle) = backend();
        let worker = std::thread::spawn(move || backend.run());

        handle.stop();
        let msg = handle.recv_timeout(Duration::from_secs(2));
        assert!(matches!(
            msg,
            Some(RecorderMessage::Stop(StopOutcome::NotRecording))
        ));

        handle.shutdown();
        worker.join().unwrap();
    }

    #[test]
    fn test_sensor_request() {
        let (backend, handle) = backend();
        let worker = std::thread::spawn(move || backend.run());

        handle.request_sensors();
        match handle.recv_timeout(Duration::from_secs(2)) {
            Some(RecorderMessage::Sensors(sensors)) => assert_eq!(sensors.len(), 2),
            other => panic!("unexpected message: {:?}", other),
        }

        handle.shutdown();
        worker.join().unwrap();
    }
}
