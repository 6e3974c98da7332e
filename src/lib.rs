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

//! AutoHotkey Keymapper
//!
//! Turns hotkey-to-action mappings into AutoHotkey v2 scripts, refusing any
//! change that would bind the same hotkey twice.
//!
//! # Features
//!
//! - **Hotkey notation:** `ctrl+alt+p`, `shift-F1`, `^!p`, click phrases
//! - **Action steps:** key presses, `0.5 s` delays, `"literal text"`, clicks
//! - **Conflict gate:** every mutation is all-or-nothing
//! - **Full regeneration:** the script is rebuilt from the model every time
//! - **Atomic writes:** timestamped backups and rollback on failure
//! - **Executable builds:** Ahk2Exe with a timeout and verbatim diagnostics
//!
//! # Architecture
//!
//! - **`core`:** Business logic (types, parser, encoder, conflicts, model, compiler)
//! - **`editor`:** Editing session for front ends (draft fields, commit, listing)
//! - **`session`:** TOML session files
//! - **`output`:** Script file writes, backups and transactions
//! - **`builder`:** Ahk2Exe invocation
//!
//! # Examples
//!
//! ## Compiling a program
//!
//! ```
//! use ahk_keymapper::core::{compile, parse_step, parse_trigger, ClickModifierPolicy, ControlRole, Program};
//!
//! let mut program = Program::new();
//! program.set_control(ControlRole::Toggle, Some(parse_trigger("ctrl+alt+p", ClickModifierPolicy::Ignore)?))?;
//! program.add_mapping(
//!     parse_trigger("F1", ClickModifierPolicy::Ignore)?,
//!     vec![parse_step("ctrl+c")?, parse_step("0.5 s")?],
//! )?;
//!
//! let script = compile(&program);
//! assert!(script.contains("#HotIf scriptEnabled"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Editing and saving
//!
//! ```no_run
//! use ahk_keymapper::editor::Editor;
//! use ahk_keymapper::output::ScriptWriter;
//! use std::path::PathBuf;
//!
//! let mut editor = Editor::default();
//! editor.set_trigger("F1");
//! editor.push_step("ctrl+c")?;
//! let script = editor.commit()?.to_string();
//!
//! let writer = ScriptWriter::new(PathBuf::from("/tmp/keys.ahk"))?;
//! writer.write(&script)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod builder;
pub mod core;
pub mod editor;
pub mod output;
pub mod session;

// Re-export commonly used types for convenience
pub use core::{compile, ActionStep, ControlRole, KeyCombo, Mapping, Modifier, Program};
