// Copyright 2025 Eric Jingryd (tidynest@proton.me)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Script write transactions with automatic backups
//!
//! Provides atomic write operations for compiled scripts.

use atomic_write_file::AtomicWriteFile;
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use crate::output::{OutputError, ScriptWriter};

/// Atomic script transaction with automatic backup.
///
/// # Lifecycle
///
/// 1. `begin()` - Backs up the existing script (if there is one)
/// 2. Caller compiles the new script (in memory)
/// 3. `commit()` - Writes atomically, or `rollback()` - Restores the original
///
/// # Example
///
/// ```no_run
/// use ahk_keymapper::output::{ScriptTransaction, ScriptWriter};
/// use std::path::PathBuf;
///
/// let writer = ScriptWriter::new(PathBuf::from("keys.ahk"))?;
/// let tx = ScriptTransaction::begin(&writer)?;
///
/// match tx.commit("#Requires AutoHotkey v2.0+") {
///     Ok(()) => println!("Script written"),
///     Err(e) => eprintln!("Commit failed: {}", e),
/// }
/// # Ok::<(), ahk_keymapper::output::OutputError>(())
/// ```
pub struct ScriptTransaction<'a> {
    writer: &'a ScriptWriter,
    backup_path: Option<PathBuf>,
}

impl<'a> ScriptTransaction<'a> {
    /// Begins a new transaction by backing up the current script.
    ///
    /// When no script exists yet there is nothing to back up, and a later
    /// rollback removes whatever the transaction wrote.
    pub fn begin(writer: &'a ScriptWriter) -> Result<Self, OutputError> {
        let backup_path = writer.create_timestamped_backup()?;

        Ok(Self {
            writer,
            backup_path,
        })
    }

    /// Backup taken by `begin()`, if a script existed
    pub fn backup_path(&self) -> Option<&Path> {
        self.backup_path.as_deref()
    }

    /// Atomically writes the new script.
    ///
    /// Consumes the transaction. On error the previous script is untouched
    /// and the backup stays in place.
    ///
    /// # Errors
    ///
    /// `OutputError::NothingToWrite` for an empty script,
    /// `OutputError::WriteFailed` if the atomic write fails.
    pub fn commit(self, new_content: &str) -> Result<(), OutputError> {
        if new_content.is_empty() {
            return Err(OutputError::NothingToWrite);
        }
        write_atomic(self.writer.script_path(), new_content)
    }

    /// Restores the script to its state when the transaction began.
    ///
    /// Borrows `self`, so it can be retried after a failure.
    pub fn rollback(&self) -> Result<(), OutputError> {
        match &self.backup_path {
            Some(backup_path) => {
                let backup_content = fs::read_to_string(backup_path)?;
                write_atomic(self.writer.script_path(), &backup_content)
            }
            None => {
                let path = self.writer.script_path();
                if path.exists() {
                    fs::remove_file(path)?;
                }
                Ok(())
            }
        }
    }
}

fn write_atomic(path: &Path, content: &str) -> Result<(), OutputError> {
    let mut file = AtomicWriteFile::options()
        .open(path)
        .map_err(|e| OutputError::WriteFailed(format!("Failed to open for atomic write: {}", e)))?;

    file.write_all(content.as_bytes())
        .map_err(|e| OutputError::WriteFailed(format!("Failed to write content: {}", e)))?;

    file.commit()
        .map_err(|e| OutputError::WriteFailed(format!("Failed to commit atomic write: {}", e)))?;

    Ok(())
}
