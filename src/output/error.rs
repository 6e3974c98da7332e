use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while persisting a compiled script.
#[derive(Debug, Error)]
pub enum OutputError {
    /// The compiled script is empty (nothing to persist).
    #[error("Nothing to write: the script is empty")]
    NothingToWrite,
    /// Target path has no file name component.
    #[error("Invalid script path: {0}")]
    InvalidPath(PathBuf),
    /// Backup directory cannot be created or written to.
    #[error("Backup directory not writable: {0}")]
    BackupDirNotWritable(PathBuf),
    /// Failed to create backup file.
    #[error("Failed to create backup: {0}")]
    BackupFailed(String),
    /// Atomic write operation failed.
    #[error("Atomic write failed: {0}")]
    WriteFailed(String),
    /// Generic I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
