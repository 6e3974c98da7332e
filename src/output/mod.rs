//! Script file persistence with atomic writes and backup support.
//!
//! The compiler produces text; this module is the only place that puts it
//! on disk. Key features:
//!
//! - **`.ahk` extension**: the target always carries it
//! - **Atomic writes**: temp-file-then-rename, the script is never half-written
//! - **Automatic backups**: an existing script is copied to `backups/` first
//! - **Empty scripts refused**: empty compiler output means "nothing to persist"
//!
//! # Example
//!
//! ```no_run
//! use ahk_keymapper::output::ScriptWriter;
//!
//! let writer = ScriptWriter::new("mappings".into())?;
//! assert!(writer.script_path().ends_with("mappings.ahk"));
//!
//! writer.write("; generated by ahk-keymapper\n#Requires AutoHotkey v2.0+")?;
//! # Ok::<(), ahk_keymapper::output::OutputError>(())
//! ```

mod error;
mod transaction;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use log::{debug, warn};

pub use error::OutputError;
pub use transaction::ScriptTransaction;

/// Extension every written script carries
pub const SCRIPT_EXTENSION: &str = "ahk";

/// Timestamp format of backup file suffixes
pub const BACKUP_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H%M%S";

/// Writes compiled scripts to one target file.
#[derive(Debug)]
pub struct ScriptWriter {
    /// Path of the `.ahk` file.
    script_path: PathBuf,
    backup_dir: PathBuf,
}

impl ScriptWriter {
    /// Creates a writer for the given target.
    ///
    /// The path gets a `.ahk` extension if it has a different one or none.
    /// The target need not exist yet, but its directory is created, along
    /// with a `backups/` directory next to it.
    ///
    /// # Errors
    ///
    /// Returns `OutputError::InvalidPath` if the path has no file name.
    /// Returns `OutputError::BackupDirNotWritable` if the backup directory
    /// cannot be created.
    pub fn new(script_path: PathBuf) -> Result<Self, OutputError> {
        let script_path = with_script_extension(script_path)?;

        if script_path.read_link().is_ok() {
            warn!("Script path is a symlink: {}", script_path.display());
        }

        // e.g. ~/scripts/keys.ahk → ~/scripts/backups/
        let parent = match script_path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent)?;

        let backup_dir = parent.join("backups");
        if !backup_dir.exists() {
            fs::create_dir_all(&backup_dir)
                .map_err(|_| OutputError::BackupDirNotWritable(backup_dir.clone()))?;
        }

        if backup_dir.metadata()?.permissions().readonly() {
            return Err(OutputError::BackupDirNotWritable(backup_dir));
        }

        Ok(Self {
            script_path,
            backup_dir,
        })
    }

    pub fn script_path(&self) -> &Path {
        &self.script_path
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// Reads the script currently on disk.
    pub fn read_script(&self) -> Result<String, OutputError> {
        Ok(fs::read_to_string(&self.script_path)?)
    }

    /// Starts a transaction (backs up the current script, if any).
    pub fn begin_transaction(&self) -> Result<ScriptTransaction<'_>, OutputError> {
        ScriptTransaction::begin(self)
    }

    /// Backs up the existing script and atomically writes the new one.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(path))` - Written; the previous script was saved to `path`
    /// * `Ok(None)` - Written; there was no previous script
    /// * `Err(OutputError::NothingToWrite)` - `script` is empty, disk untouched
    pub fn write(&self, script: &str) -> Result<Option<PathBuf>, OutputError> {
        if script.is_empty() {
            return Err(OutputError::NothingToWrite);
        }

        let tx = self.begin_transaction()?;
        let backup = tx.backup_path().map(Path::to_path_buf);
        tx.commit(script)?;

        debug!("Wrote {} bytes to {}", script.len(), self.script_path.display());
        Ok(backup)
    }

    /// Lists backups of this script, oldest first.
    pub fn list_backups(&self) -> Result<Vec<PathBuf>, OutputError> {
        let prefix = format!("{}.", self.file_name()?);
        let mut backups: Vec<PathBuf> = fs::read_dir(&self.backup_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(&prefix))
            })
            .collect();
        backups.sort();
        Ok(backups)
    }

    /// Copies the current script to `backups/<name>.<timestamp>`.
    ///
    /// Returns `None` when there is no script on disk yet.
    pub(crate) fn create_timestamped_backup(&self) -> Result<Option<PathBuf>, OutputError> {
        if !self.script_path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.script_path)?;
        let timestamp = Local::now().format(BACKUP_TIMESTAMP_FORMAT);
        let backup_path = self
            .backup_dir
            .join(format!("{}.{}", self.file_name()?, timestamp));

        fs::write(&backup_path, content).map_err(|e| OutputError::BackupFailed(e.to_string()))?;

        debug!("Backed up previous script to {}", backup_path.display());
        Ok(Some(backup_path))
    }

    fn file_name(&self) -> Result<&str, OutputError> {
        self.script_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| OutputError::InvalidPath(self.script_path.clone()))
    }
}

/// Replaces or adds the `.ahk` extension
fn with_script_extension(path: PathBuf) -> Result<PathBuf, OutputError> {
    if path.file_name().is_none() {
        return Err(OutputError::InvalidPath(path));
    }

    let has_ext = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(SCRIPT_EXTENSION));

    if has_ext {
        Ok(path)
    } else {
        Ok(path.with_extension(SCRIPT_EXTENSION))
    }
}

#[cfg(test)]
mod tests;
