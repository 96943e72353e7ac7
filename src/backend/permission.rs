//! Storage permission gate
//!
//! The recorder asks the gate before every `start()`. A refusal leaves the
//! session Idle; prompting the user and retrying is the shell's job.

use std::path::Path;

/// Answers whether exports may be written under a directory
#[cfg_attr(test, mockall::automock)]
pub trait PermissionGate: Send {
    /// Check if the export directory may be written
    fn may_write(&self, dir: &Path) -> bool;
}

/// Gate that always grants
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysGranted;

impl PermissionGate for AlwaysGranted {
    fn may_write(&self, _dir: &Path) -> bool {
        true
    }
}

/// Gate that checks the filesystem
///
/// Grants if the directory, or its nearest existing ancestor when it does not
/// exist yet, is a directory that is not read-only.
#[derive(Debug, Clone, Copy, Default)]
pub struct WritableDirGate;

impl PermissionGate for WritableDirGate {
    fn may_write(&self, dir: &Path) -> bool {
        let Some(existing) = dir.ancestors().find(|p| p.exists()) else {
            return false;
        };

        match std::fs::metadata(existing) {
            Ok(meta) => meta.is_dir() && !meta.permissions().readonly(),
            Err(e) => {
                tracing::debug!("Cannot stat {:?}: {}", existing, e);
                false
            }
        }
    }
}
