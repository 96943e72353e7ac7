//! Session recorder: owns the recording lifecycle and the record buffer

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::backend::clock::Clock;
use crate::backend::permission::PermissionGate;
use crate::error::{ImuError, Result};
use crate::export::{self, ByteSink};
use crate::types::{FusedRecord, RawEvent};

use super::fuser;
use super::types::{
    ExportOutcome, Session, SessionState, SessionSummary, StartOutcome, StopOutcome,
};

/// Session recorder for capturing IMU sessions
///
/// `Idle --start()--> Recording --stop()--> Idle`. Events are only fused while
/// Recording. A redundant `start()` or `stop()` is reported and otherwise
/// ignored.
pub struct SessionRecorder {
    /// Session state, buffer and last-known-value cache
    session: Session,
    /// Shared with the sensor source so event timestamps line up with `start_time`
    clock: Arc<dyn Clock>,
    /// Queried before every start
    gate: Box<dyn PermissionGate>,
    /// Export destination
    sink: Box<dyn ByteSink>,
    /// Directory exports are written to
    export_dir: PathBuf,
    /// Set when the last export failed and the buffer can be retried
    export_pending: bool,
}

impl SessionRecorder {
    /// Create a new idle recorder
    pub fn new(
        clock: Arc<dyn Clock>,
        gate: Box<dyn PermissionGate>,
        sink: Box<dyn ByteSink>,
        export_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            session: Session::new(),
            clock,
            gate,
            sink,
            export_dir: export_dir.into(),
            export_pending: false,
        }
    }

    /// Get current state
    pub fn state(&self) -> SessionState {
        self.session.state
    }

    /// Check if recording
    pub fn is_recording(&self) -> bool {
        self.session.state.is_recording()
    }

    /// Get the session
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Records of the current or most recent session
    pub fn records(&self) -> &[FusedRecord] {
        &self.session.records
    }

    /// Get number of recorded records
    pub fn record_count(&self) -> usize {
        self.session.record_count()
    }

    /// Latest fused record, for live display
    pub fn latest_record(&self) -> Option<FusedRecord> {
        self.session.latest
    }

    /// Directory exports are written to
    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    /// Check if a failed export can be retried
    pub fn has_pending_export(&self) -> bool {
        self.export_pending
    }

    /// Start a new recording
    ///
    /// Refused with [`ImuError::PermissionDenied`] if the export directory may
    /// not be written; the recorder stays Idle.
    pub fn start(&mut self) -> Result<StartOutcome> {
        if self.is_recording() {
            tracing::warn!("Ignoring start: already recording");
            return Ok(StartOutcome::AlreadyRecording);
        }

        if !self.gate.may_write(&self.export_dir) {
            tracing::warn!("Refusing to start: cannot write to {:?}", self.export_dir);
            return Err(ImuError::PermissionDenied {
                path: self.export_dir.clone(),
            });
        }

        let start_time = self.clock.monotonic_ns();
        self.session.begin(start_time);
        self.export_pending = false;

        tracing::info!("Recording started at {} ns", start_time);
        Ok(StartOutcome::Started { start_time })
    }

    /// Fuse a raw event into the session
    ///
    /// `event.timestamp` is on the recorder's clock. Returns the appended record,
    /// or `None` if the event was dropped (Idle, or stamped before this session
    /// started).
    pub fn ingest(&mut self, event: RawEvent) -> Option<FusedRecord> {
        if !self.is_recording() {
            tracing::trace!("Dropping {} event while idle", event.kind);
            return None;
        }

        if event.timestamp < self.session.start_time {
            tracing::trace!(
                "Dropping stale {} event at {} ns (session start {} ns)",
                event.kind,
                event.timestamp,
                self.session.start_time
            );
            return None;
        }

        let relative = event.relative_to(self.session.start_time);
        let record = fuser::ingest(&relative, &mut self.session);
        self.session.records.push(record);
        self.session.latest = Some(record);
        Some(record)
    }

    /// Stop recording and export the session
    pub fn stop(&mut self) -> StopOutcome {
        if !self.is_recording() {
            tracing::warn!("Ignoring stop: not recording");
            return StopOutcome::NotRecording;
        }

        self.session.end();
        tracing::info!(
            "Recording stopped with {} records",
            self.session.record_count()
        );

        let export = self.export();
        StopOutcome::Stopped(self.summary(export))
    }

    /// Retry a failed export of the retained buffer
    ///
    /// Returns `None` if recording or if there is nothing pending.
    pub fn retry_export(&mut self) -> Option<ExportOutcome> {
        if self.is_recording() || !self.export_pending {
            return None;
        }

        tracing::info!("Retrying export of {} records", self.session.record_count());
        Some(self.export())
    }

    /// Abandon the current recording without exporting
    pub fn cancel(&mut self) {
        if self.is_recording() {
            tracing::info!(
                "Discarding recording with {} records",
                self.session.record_count()
            );
        }
        self.session.end();
        self.session.records = Vec::new();
        self.session.latest = None;
        self.export_pending = false;
    }

    /// Summarize the current buffer with an export outcome
    fn summary(&self, export: ExportOutcome) -> SessionSummary {
        SessionSummary {
            record_count: self.session.record_count(),
            duration_ns: self.session.duration_ns(),
            export,
        }
    }

    fn export(&mut self) -> ExportOutcome {
        if self.session.is_empty() {
            tracing::info!("No records to export");
            self.export_pending = false;
            return ExportOutcome::EmptySession;
        }

        let bytes = export::encode(&self.session.records);
        let file_name = export::export_file_name(self.clock.wall_time());

        match self.sink.write(&self.export_dir, &file_name, &bytes) {
            Ok(path) => {
                tracing::info!(
                    "Exported {} records to {:?}",
                    self.session.record_count(),
                    path
                );
                self.export_pending = false;
                ExportOutcome::Written { path }
            }
            Err(error) => {
                tracing::error!("Export failed, keeping records for retry: {}", error);
                self.export_pending = true;
                ExportOutcome::Failed { error }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::clock::ManualClock;
    use crate::backend::permission::{AlwaysGranted, MockPermissionGate};
    use crate::export::sink::MockByteSink;
    use chrono::{Local, TimeZone};

    fn clock() -> Arc<ManualClock> {
        let wall = Local.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
        Arc::new(ManualClock::new(1_000_000_000, wall))
    }

    fn accepting_sink() -> MockByteSink {
        let mut sink = MockByteSink::new();
        sink.expect_write()
            .returning(|dir, name, _| Ok(dir.join(name)));
        sink
    }

    fn recorder_with(clock: Arc<ManualClock>, sink: MockByteSink) -> SessionRecorder {
        SessionRecorder::new(clock, Box::new(AlwaysGranted), Box::new(sink), "/data/IMUData")
    }

    #[test]
    fn test_recorder_lifecycle() {
        let clock = clock();
        let mut recorder = recorder_with(clock.clone(), accepting_sink());
        assert_eq!(recorder.state(), SessionState::Idle);

        let outcome = recorder.start().unwrap();
        assert_eq!(
            outcome,
            StartOutcome::Started {
                start_time: 1_000_000_000
            }
        );
        assert!(recorder.is_recording());

        recorder.ingest(RawEvent::accelerometer([1.0, 2.0, 3.0], 1_001_000_000));
        let StopOutcome::Stopped(summary) = recorder.stop() else {
            panic!("expected a summary");
        };
        assert_eq!(summary.record_count, 1);
        assert_eq!(summary.duration_ns, 1_000_000);
        assert_eq!(
            summary.export.path(),
            Some(&PathBuf::from("/data/IMUData/IMU_Data_20240506_070809.csv"))
        );
        assert!(!recorder.is_recording());
    }

    #[test]
    fn test_timestamps_relative_to_start() {
        let clock = clock();
        let mut recorder = recorder_with(clock.clone(), accepting_sink());
        recorder.start().unwrap();

        let a = recorder
            .ingest(RawEvent::accelerometer([1.0, 2.0, 3.0], 1_001_000_000))
            .unwrap();
        let b = recorder
            .ingest(RawEvent::gyroscope([0.1, 0.2, 0.3], 1_001_500_000))
            .unwrap();
        assert_eq!(a.timestamp, 1_000_000);
        assert_eq!(b, FusedRecord::new(1_500_000, [1.0, 2.0, 3.0], [0.1, 0.2, 0.3]));
        assert_eq!(recorder.latest_record(), Some(b));
        assert_eq!(recorder.record_count(), 2);
    }

    #[test]
    fn test_events_ignored_while_idle() {
        let mut recorder = recorder_with(clock(), MockByteSink::new());
        assert!(recorder
            .ingest(RawEvent::accelerometer([1.0; 3], 2_000_000_000))
            .is_none());
        assert_eq!(recorder.record_count(), 0);
        assert!(recorder.latest_record().is_none());
    }

    #[test]
    fn test_stale_events_dropped() {
        let mut recorder = recorder_with(clock(), MockByteSink::new());
        recorder.start().unwrap();
        assert!(recorder
            .ingest(RawEvent::gyroscope([1.0; 3], 999_999_999))
            .is_none());
        assert_eq!(recorder.record_count(), 0);
    }

    #[test]
    fn test_redundant_transitions() {
        let clock = clock();
        let mut recorder = recorder_with(clock.clone(), MockByteSink::new());
        assert!(matches!(recorder.stop(), StopOutcome::NotRecording));

        recorder.start().unwrap();
        recorder.ingest(RawEvent::accelerometer([1.0; 3], 1_000_000_100));
        clock.advance_ns(10);
        assert_eq!(recorder.start().unwrap(), StartOutcome::AlreadyRecording);

        // The second start did not reset anything
        assert_eq!(recorder.record_count(), 1);
        assert_eq!(recorder.session().start_time, 1_000_000_000);
    }

    #[test]
    fn test_permission_denied_stays_idle() {
        let mut gate = MockPermissionGate::new();
        gate.expect_may_write().times(1).return_const(false);

        let mut recorder = SessionRecorder::new(
            clock(),
            Box::new(gate),
            Box::new(MockByteSink::new()),
            "/data/IMUData",
        );
        let err = recorder.start().unwrap_err();
        assert!(matches!(err, ImuError::PermissionDenied { .. }));
        assert_eq!(recorder.state(), SessionState::Idle);
    }

    #[test]
    fn test_empty_session_skips_sink() {
        let mut sink = MockByteSink::new();
        sink.expect_write().never();

        let mut recorder = recorder_with(clock(), sink);
        recorder.start().unwrap();
        let StopOutcome::Stopped(summary) = recorder.stop() else {
            panic!("expected a summary");
        };
        assert_eq!(summary.record_count, 0);
        assert!(matches!(summary.export, ExportOutcome::EmptySession));
        assert!(recorder.retry_export().is_none());
    }

    #[test]
    fn test_export_failure_keeps_buffer_for_retry() {
        let mut sink = MockByteSink::new();
        let mut seq = mockall::Sequence::new();
        sink.expect_write()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| {
                Err(ImuError::Io(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "revoked",
                )))
            });
        sink.expect_write()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|dir, name, bytes| {
                assert!(bytes.starts_with(export::CSV_HEADER.as_bytes()));
                Ok(dir.join(name))
            });

        let mut recorder = recorder_with(clock(), sink);
        recorder.start().unwrap();
        recorder.ingest(RawEvent::accelerometer([1.0; 3], 1_000_000_500));
        recorder.ingest(RawEvent::gyroscope([2.0; 3], 1_000_000_900));

        let StopOutcome::Stopped(summary) = recorder.stop() else {
            panic!("expected a summary");
        };
        assert!(summary.export.is_failed());
        assert_eq!(recorder.record_count(), 2);
        assert!(recorder.has_pending_export());

        let retried = recorder.retry_export().unwrap();
        assert!(retried.path().is_some());
        assert!(!recorder.has_pending_export());
        assert!(recorder.retry_export().is_none());
    }

    #[test]
    fn test_start_clears_previous_session() {
        let clock = clock();
        let mut recorder = recorder_with(clock.clone(), accepting_sink());

        recorder.start().unwrap();
        recorder.ingest(RawEvent::accelerometer([5.0; 3], 1_000_000_010));
        recorder.stop();

        clock.set_ns(2_000_000_000);
        recorder.start().unwrap();
        assert_eq!(recorder.record_count(), 0);
        assert!(recorder.latest_record().is_none());

        let record = recorder
            .ingest(RawEvent::gyroscope([1.0; 3], 2_000_000_010))
            .unwrap();
        // Accelerometer cache was reset to zero
        assert_eq!(record.acc, [0.0; 3]);
        assert_eq!(record.timestamp, 10);
    }

    #[test]
    fn test_cancel_discards() {
        let mut sink = MockByteSink::new();
        sink.expect_write().never();

        let mut recorder = recorder_with(clock(), sink);
        recorder.start().unwrap();
        recorder.ingest(RawEvent::accelerometer([1.0; 3], 1_000_000_001));
        recorder.cancel();

        assert_eq!(recorder.state(), SessionState::Idle);
        assert_eq!(recorder.record_count(), 0);
        assert!(matches!(recorder.stop(), StopOutcome::NotRecording));
    }
}
