//! Session data types

use serde::Serialize;
use std::path::PathBuf;

use crate::error::ImuError;
use crate::types::{FusedRecord, Vec3};

/// State of the recording lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SessionState {
    /// No active session
    #[default]
    Idle,
    /// Currently recording a session
    Recording,
}

impl SessionState {
    /// Check if currently recording
    pub fn is_recording(&self) -> bool {
        matches!(self, SessionState::Recording)
    }
}

/// A recording session: lifecycle state, record buffer and last-known-value cache
///
/// One `Session` lives for the whole run and is reused across start/stop
/// cycles. Only the fuser and the recorder mutate it.
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// Current lifecycle state
    pub state: SessionState,
    /// Monotonic clock reading at the last transition to Recording
    pub start_time: i64,
    /// Fused records in ingestion order
    pub records: Vec<FusedRecord>,
    /// Last accelerometer reading
    pub last_acc: Vec3,
    /// Last gyroscope reading
    pub last_gyro: Vec3,
    /// Relative timestamp of the last accelerometer reading
    pub last_acc_ts: i64,
    /// Relative timestamp of the last gyroscope reading
    pub last_gyro_ts: i64,
    /// Most recently produced record, for live display
    pub latest: Option<FusedRecord>,
}

impl Session {
    /// Create a new idle session
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter Recording with a fresh buffer and a zeroed cache
    pub fn begin(&mut self, start_time: i64) {
        self.state = SessionState::Recording;
        self.start_time = start_time;
        // Replace rather than clear so no allocation from the prior session is reused
        self.records = Vec::new();
        self.last_acc = [0.0; 3];
        self.last_gyro = [0.0; 3];
        self.last_acc_ts = 0;
        self.last_gyro_ts = 0;
        self.latest = None;
    }

    /// Return to Idle, keeping the buffer for export
    pub fn end(&mut self) {
        self.state = SessionState::Idle;
    }

    /// Number of records in the buffer
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Check if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Relative timestamp of the last record, nanoseconds
    pub fn duration_ns(&self) -> i64 {
        self.records.last().map(|r| r.timestamp).unwrap_or(0)
    }
}

/// Result of a `start()` call that was not refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// A new session began at this monotonic time
    Started { start_time: i64 },
    /// Already recording; nothing changed
    AlreadyRecording,
}

/// Result of a `stop()` call
#[derive(Debug)]
pub enum StopOutcome {
    /// The session ended and its export was attempted
    Stopped(SessionSummary),
    /// Not recording; nothing changed
    NotRecording,
}

/// What happened to the session buffer on export
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExportOutcome {
    /// The CSV was written to this path
    Written { path: PathBuf },
    /// Nothing was recorded, so nothing was written
    EmptySession,
    /// The sink failed; the buffer is kept for `retry_export()`
    Failed {
        #[serde(serialize_with = "serialize_error")]
        error: ImuError,
    },
}

impl ExportOutcome {
    /// Path of the written file, if any
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            ExportOutcome::Written { path } => Some(path),
            _ => None,
        }
    }

    /// Check if the export failed
    pub fn is_failed(&self) -> bool {
        matches!(self, ExportOutcome::Failed { .. })
    }
}

fn serialize_error<S>(error: &ImuError, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_str(error)
}

/// Summary of a finished session
#[derive(Debug, Serialize)]
pub struct SessionSummary {
    /// Number of fused records produced
    pub record_count: usize,
    /// Timestamp of the last record, nanoseconds from session start
    pub duration_ns: i64,
    /// Export result
    pub export: ExportOutcome,
}
