//! Recorder Worker Thread Implementation
//!
//! This module contains the main worker loop that runs in a separate thread
//! and owns the [`SessionRecorder`]. Commands from the shell and events from
//! the sensor source arrive on crossbeam channels and are handled one at a
//! time, so ingestion never interleaves with a start or stop.
//!
//! # Responsibilities
//!
//! - **Command processing**: start, stop, export retry, sensor queries
//! - **Subscription**: subscribes the source on start and unsubscribes on stop
//! - **Ingestion**: fuses every delivered event into the session
//! - **Live updates**: publishes the latest record on every ingest and a
//!   `Live` message every `display_interval` records

use crate::backend::sensor_trait::SensorSource;
use crate::backend::{LiveRecord, RecorderCommand, RecorderMessage};
use crate::config::RecordingSettings;
use crate::error::ImuError;
use crate::session::{SessionRecorder, StartOutcome};
use crate::types::{RawEvent, SensorKind};
use crossbeam_channel::{select, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// How long the loop waits before re-checking the running flag
const IDLE_TICK: Duration = Duration::from_millis(100);

/// The worker that runs the recording loop
pub struct RecorderWorker {
    /// Session state machine
    recorder: SessionRecorder,
    /// Sensor event source
    source: Box<dyn SensorSource>,
    /// Recording settings
    settings: RecordingSettings,
    /// Command receiver from the shell
    command_rx: Receiver<RecorderCommand>,
    /// Message sender to the shell
    message_tx: Sender<RecorderMessage>,
    /// Handed to the source on subscribe
    event_tx: Sender<RawEvent>,
    /// Delivered sensor events
    event_rx: Receiver<RawEvent>,
    /// Latest record slot shared with the handle
    latest: Arc<Mutex<Option<LiveRecord>>>,
    /// Cleared by `Shutdown` or a dropped handle
    running: bool,
}

impl RecorderWorker {
    /// Create a new recorder worker
    pub fn new(
        recorder: SessionRecorder,
        source: Box<dyn SensorSource>,
        settings: RecordingSettings,
        command_rx: Receiver<RecorderCommand>,
        message_tx: Sender<RecorderMessage>,
        event_channel: (Sender<RawEvent>, Receiver<RawEvent>),
        latest: Arc<Mutex<Option<LiveRecord>>>,
    ) -> Self {
        let (event_tx, event_rx) = event_channel;
        Self {
            recorder,
            source,
            settings,
            command_rx,
            message_tx,
            event_tx,
            event_rx,
            latest,
            running: true,
        }
    }

    /// Run the main worker loop
    pub fn run(&mut self) {
        tracing::info!("Recorder worker started with {} source", self.source.name());

        // Local clones keep the select borrows off `self`
        let command_rx = self.command_rx.clone();
        let event_rx = self.event_rx.clone();

        while self.running {
            select! {
                recv(command_rx) -> cmd => match cmd {
                    Ok(cmd) => self.handle_command(cmd),
                    Err(_) => self.running = false,
                },
                recv(event_rx) -> event => {
                    if let Ok(event) = event {
                        self.handle_event(event);
                    }
                },
                default(IDLE_TICK) => {}
            }
        }

        // Cleanup
        if self.recorder.is_recording() {
            tracing::warn!("Shutting down while recording, discarding session");
            self.source.unsubscribe();
            self.recorder.cancel();
        }

        let _ = self.message_tx.send(RecorderMessage::Shutdown);
        tracing::info!("Recorder worker stopped");
    }

    /// Handle a single command
    fn handle_command(&mut self, cmd: RecorderCommand) {
        match cmd {
            RecorderCommand::Start => self.start(),
            RecorderCommand::Stop => self.stop(),
            RecorderCommand::RetryExport => {
                let outcome = self.recorder.retry_export();
                let _ = self.message_tx.send(RecorderMessage::Retry(outcome));
            }
            RecorderCommand::RequestSensors => {
                let _ = self
                    .message_tx
                    .send(RecorderMessage::Sensors(self.source.sensors()));
            }
            RecorderCommand::Shutdown => {
                self.running = false;
            }
        }
    }

    fn start(&mut self) {
        if !self.recorder.is_recording() {
            if let Some(kind) = self.missing_sensor() {
                tracing::warn!("Refusing to start: {} unavailable", kind);
                let _ = self
                    .message_tx
                    .send(RecorderMessage::Start(Err(ImuError::SensorUnavailable(kind))));
                return;
            }
        }

        let result = match self.recorder.start() {
            Ok(StartOutcome::Started { start_time }) => {
                self.set_latest(None);
                match self
                    .source
                    .subscribe(self.event_tx.clone(), self.settings.sampling_rate)
                {
                    Ok(()) => Ok(StartOutcome::Started { start_time }),
                    Err(e) => {
                        tracing::error!("Failed to subscribe to sensors: {}", e);
                        self.recorder.cancel();
                        Err(e.with_context("Failed to subscribe to sensors"))
                    }
                }
            }
            other => other,
        };

        let _ = self.message_tx.send(RecorderMessage::Start(result));
    }

    fn stop(&mut self) {
        if self.recorder.is_recording() {
            self.source.unsubscribe();

            // Events delivered before the unsubscribe still belong to this session
            let pending: Vec<RawEvent> = self.event_rx.try_iter().collect();
            for event in pending {
                self.handle_event(event);
            }
        }

        let outcome = self.recorder.stop();
        let _ = self.message_tx.send(RecorderMessage::Stop(outcome));
    }

    /// Fuse one delivered event
    fn handle_event(&mut self, event: RawEvent) {
        let Some(record) = self.recorder.ingest(event) else {
            return;
        };

        let live = LiveRecord {
            record_count: self.recorder.record_count(),
            record,
        };
        self.set_latest(Some(live));

        if self.settings.is_display_due(live.record_count) {
            // Never block ingestion on a slow consumer
            if self.message_tx.try_send(RecorderMessage::Live(live)).is_err() {
                tracing::trace!("Dropping live update, message queue full");
            }
        }
    }

    fn missing_sensor(&self) -> Option<SensorKind> {
        SensorKind::ALL
            .into_iter()
            .find(|kind| !self.source.is_available(*kind))
    }

    fn set_latest(&self, live: Option<LiveRecord>) {
        *self.latest.lock().unwrap_or_else(|e| e.into_inner()) = live;
    }
}
