// Copyright 2025 bakri (tidynest@proton.me)
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

//! Executable builds through the external Ahk2Exe compiler
//!
//! # Modes
//!
//! - **DryRun**: Validates inputs only, never spawns the compiler
//! - **Live**: Writes `temp.ahk` into a scratch directory and runs
//!   `<compiler> /in <temp.ahk> /out <target>`
//!
//! Tests default to DryRun mode unless they bring their own fake compiler.
//!
//! A failed build is reported once, with the compiler's own diagnostic text.
//! Nothing is retried.
//!
//! # Example
//! ```
//! use ahk_keymapper::builder::{BuildMode, ExeBuilder};
//! use std::path::Path;
//!
//! // Safe: DryRun mode validates but never runs the compiler
//! let builder = ExeBuilder::new("Ahk2Exe.exe".into(), BuildMode::DryRun);
//!
//! assert!(builder.build("F1:: Send \"^c\"", Path::new("keys.exe")).is_ok());
//! assert!(builder.build("", Path::new("keys.exe")).is_err());
//! ```

use std::env;
use std::ffi::OsStr;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use log::{debug, info, warn};
use tempfile::TempDir;
use thiserror::Error;
use wait_timeout::ChildExt;

/// File names searched for on `PATH`, in order
pub const COMPILER_NAMES: &[&str] = &["Ahk2Exe.exe", "Ahk2Exe"];

/// Name of the intermediate script handed to the compiler
pub const TEMP_SCRIPT_NAME: &str = "temp.ahk";

/// How long a build may run before it is killed
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Builder operation mode
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuildMode {
    /// Validation only - NEVER spawns the compiler
    DryRun,

    /// Runs the compiler
    Live,
}

/// Errors from executable builds
#[derive(Debug, Error)]
pub enum BuildError {
    /// The script is empty (nothing to build)
    #[error("Nothing to build: the script is empty")]
    EmptyScript,

    /// Target path has no file name component
    #[error("Invalid output path: {0}")]
    InvalidOutput(PathBuf),

    /// No compiler on PATH
    #[error("Ahk2Exe not found on PATH (looked for {})", COMPILER_NAMES.join(", "))]
    CompilerNotFound,

    /// The compiler could not be started
    #[error("Failed to start {compiler}: {source}")]
    Spawn {
        compiler: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The compiler did not finish in time and was killed
    #[error("Compiler timed out after {0:?}")]
    TimedOut(Duration),

    /// The compiler exited unsuccessfully; `diagnostic` is its output verbatim
    #[error("Compiler failed ({}): {diagnostic}", exit_code_text(.code))]
    Failed {
        code: Option<i32>,
        diagnostic: String,
    },

    /// The compiler reported success but wrote no executable
    #[error("Compiler produced no output at {0}")]
    MissingOutput(PathBuf),

    /// Generic I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn exit_code_text(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

/// Runs the external compiler on compiled script text
#[derive(Clone, Debug)]
pub struct ExeBuilder {
    compiler: PathBuf,
    mode: BuildMode,
    timeout: Duration,
}

impl ExeBuilder {
    /// Creates a builder for an explicit compiler path
    pub fn new(compiler: PathBuf, mode: BuildMode) -> Self {
        Self {
            compiler,
            mode,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Creates a builder for the first compiler found on `PATH`
    ///
    /// # Errors
    /// `BuildError::CompilerNotFound` when no candidate exists.
    pub fn locate(mode: BuildMode) -> Result<Self, BuildError> {
        let path_var = env::var_os("PATH").unwrap_or_default();
        let compiler = find_on_path(&path_var, COMPILER_NAMES).ok_or(BuildError::CompilerNotFound)?;
        debug!("Found compiler at {}", compiler.display());
        Ok(Self::new(compiler, mode))
    }

    /// Overrides the build timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn compiler(&self) -> &Path {
        &self.compiler
    }

    pub fn mode(&self) -> BuildMode {
        self.mode
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Builds `script` into the executable at `output`
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Inputs valid (DryRun) or executable written (Live)
    /// * `Err(BuildError::EmptyScript)` - Nothing to build
    /// * `Err(BuildError::Failed)` - Compiler exited non-zero; its stderr
    ///   (or stdout when stderr is empty) is returned unchanged
    /// * `Err(BuildError::TimedOut)` - Compiler killed after the timeout
    pub fn build(&self, script: &str, output: &Path) -> Result<(), BuildError> {
        if script.is_empty() {
            return Err(BuildError::EmptyScript);
        }
        if output.file_name().is_none() {
            return Err(BuildError::InvalidOutput(output.to_path_buf()));
        }

        match self.mode {
            BuildMode::DryRun => {
                info!("Dry run: would build {} with {}", output.display(), self.compiler.display());
                Ok(())
            }
            BuildMode::Live => self.run_compiler(script, output),
        }
    }

    fn run_compiler(&self, script: &str, output: &Path) -> Result<(), BuildError> {
        let scratch = TempDir::new()?;
        let script_path = scratch.path().join(TEMP_SCRIPT_NAME);
        fs::write(&script_path, script)?;

        // Files rather than pipes, so a chatty compiler cannot block on a full pipe
        let stdout_path = scratch.path().join("stdout.log");
        let stderr_path = scratch.path().join("stderr.log");

        info!("Building {} with {}", output.display(), self.compiler.display());
        let mut child = Command::new(&self.compiler)
            .arg("/in")
            .arg(&script_path)
            .arg("/out")
            .arg(output)
            .stdin(Stdio::null())
            .stdout(File::create(&stdout_path)?)
            .stderr(File::create(&stderr_path)?)
            .spawn()
            .map_err(|source| BuildError::Spawn {
                compiler: self.compiler.clone(),
                source,
            })?;

        let status = match child.wait_timeout(self.timeout)? {
            Some(status) => status,
            None => {
                warn!("Compiler exceeded {:?}, killing it", self.timeout);
                child.kill()?;
                child.wait()?;
                return Err(BuildError::TimedOut(self.timeout));
            }
        };

        if !status.success() {
            let stderr = fs::read_to_string(&stderr_path)?;
            let diagnostic = if stderr.trim().is_empty() {
                fs::read_to_string(&stdout_path)?
            } else {
                stderr
            };
            warn!("Compiler failed with {}", exit_code_text(&status.code()));
            return Err(BuildError::Failed {
                code: status.code(),
                diagnostic,
            });
        }

        if !output.exists() {
            return Err(BuildError::MissingOutput(output.to_path_buf()));
        }

        info!("Built {}", output.display());
        Ok(())
    }
}

/// Searches every directory of a `PATH`-style list for the first name that exists
pub fn find_on_path(path_var: &OsStr, names: &[&str]) -> Option<PathBuf> {
    env::split_paths(path_var)
        .flat_map(|dir| names.iter().map(move |name| dir.join(name)))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests;
