//! # IMU Recorder: accelerometer and gyroscope session capture
//!
//! Records motion sensor sessions and exports each one as a timestamped CSV
//! file. The two sensors report independently and at different rates; every
//! reading from either one produces a fused row holding the latest known
//! value of both.
//!
//! ## Architecture
//!
//! - **Session**: the sample fuser and the Idle/Recording state machine
//! - **Export**: CSV encoding and the byte sink that persists it
//! - **Backend**: a worker thread that serializes commands and sensor events,
//!   plus the environment it needs (sensor source, clock, permission gate)
//! - **Communication**: crossbeam channels between the worker and the shell
//!
//! ## Configuration
//!
//! The config file lives in the platform-appropriate config directory under
//! `dev.hxyulin.imu-recorder` (see [`config`]). Exports go to
//! `<documents>/IMUData/IMU_Data_<YYYYMMDD_HHmmss>.csv` unless configured
//! otherwise.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use imu_recorder::{
//!     backend::{MockSensorSource, RecorderBackend, SystemClock, WritableDirGate},
//!     config::AppConfig,
//!     export::FsSink,
//!     session::SessionRecorder,
//! };
//!
//! let config = AppConfig::load_default_location();
//! let clock = Arc::new(SystemClock::new());
//! let recorder = SessionRecorder::new(
//!     clock.clone(),
//!     Box::new(WritableDirGate),
//!     Box::new(FsSink),
//!     config.export_dir(),
//! );
//! let source = MockSensorSource::new(config.mock.clone(), clock);
//! let (backend, handle) = RecorderBackend::new(recorder, Box::new(source), config.recording);
//!
//! std::thread::spawn(move || backend.run());
//! handle.start();
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod export;
pub mod session;
pub mod types;

// Re-export commonly used types
pub use backend::{RecorderBackend, RecorderCommand, RecorderHandle, RecorderMessage};
pub use config::AppConfig;
pub use error::{ImuError, Result};
pub use session::{SessionRecorder, SessionSummary};
pub use types::{FusedRecord, RawEvent, SensorKind, Vec3};
