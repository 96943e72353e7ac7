//! Byte sinks that persist encoded exports

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

use crate::error::{Result, ResultExt};

/// Prefix of every export file name
pub const EXPORT_FILE_PREFIX: &str = "IMU_Data_";

/// Extension of export files
pub const EXPORT_FILE_EXTENSION: &str = "csv";

/// Build the export file name for the moment of export: `IMU_Data_<YYYYMMDD_HHmmss>.csv`
pub fn export_file_name(at: DateTime<Local>) -> String {
    format!(
        "{}{}.{}",
        EXPORT_FILE_PREFIX,
        at.format("%Y%m%d_%H%M%S"),
        EXPORT_FILE_EXTENSION
    )
}

/// Destination for encoded export bytes
#[cfg_attr(test, mockall::automock)]
pub trait ByteSink: Send {
    /// Write `bytes` to `dir/file_name`, creating `dir` if needed, and return the full path
    fn write(&self, dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf>;
}

/// Sink that writes files to the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSink;

impl ByteSink for FsSink {
    fn write(&self, dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
        if !dir.exists() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create export directory {:?}", dir))?;
        }

        let path = dir.join(file_name);
        std::fs::write(&path, bytes)
            .with_context(|| format!("Failed to write export file {:?}", path))?;

        tracing::debug!("Wrote {} bytes to {:?}", bytes.len(), path);
        Ok(path)
    }
}
