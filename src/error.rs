//! Error handling for the IMU recorder
//!
//! This module defines custom error types and a Result alias for use
//! throughout the crate. Conditions that are expected during normal use
//! (an empty session, a redundant start or stop) are not errors; they are
//! reported through the outcome enums in [`crate::session`].

use std::path::PathBuf;

use thiserror::Error;

use crate::types::SensorKind;

/// Main error type for IMU recorder operations
#[derive(Error, Debug)]
pub enum ImuError {
    /// The export location may not be written to
    #[error("Storage permission denied for {}", path.display())]
    PermissionDenied { path: PathBuf },

    /// A required motion sensor is missing on this device
    #[error("Sensor unavailable: {0}")]
    SensorUnavailable(SensorKind),

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors related to channel communication
    #[error("Channel error: {0}")]
    Channel(String),

    /// Malformed line in an exported CSV file
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<ImuError>,
    },
}

impl ImuError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ImuError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Create a parse error for a 1-based line number
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        ImuError::Parse {
            line,
            message: message.into(),
        }
    }
}

/// Result type alias for IMU recorder operations
pub type Result<T> = std::result::Result<T, ImuError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| ImuError::from(e).with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| ImuError::from(e).with_context(f()))
    }
}
