//! Session recording
//!
//! This module turns the two independent sensor streams into one ordered list
//! of fused records and governs when those records are produced and exported.
//!
//! # Components
//!
//! - [`fuser::ingest`] - Combines a single-sensor event with the last known
//!   reading of the other sensor (hold-last-value)
//! - [`SessionRecorder`] - Idle/Recording state machine that owns the buffer
//!   and exports it on stop
//!
//! # Outcomes
//!
//! Nothing in here panics or throws on expected conditions. A redundant start
//! or stop, an empty session and a failed export are all reported through
//! [`StartOutcome`], [`StopOutcome`] and [`ExportOutcome`].

pub mod fuser;
pub mod recorder;
pub mod types;

pub use fuser::ingest;
pub use recorder::SessionRecorder;
pub use types::{
    ExportOutcome, Session, SessionState, SessionSummary, StartOutcome, StopOutcome,
};
