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

//! src/core/mod.rs
//!
//! Core business logic module
//!
//! This module contains the data structures and algorithms that turn
//! hotkey mappings into an AutoHotkey v2 script:
//! - Type definitions for key combos, action steps and mappings
//! - Hotkey notation parsing (parser.rs) and step encoding (encoder.rs)
//! - Key whitelisting and text validation (validator.rs)
//! - The mapping model with its conflict gate (program.rs, conflict.rs)
//! - The script compiler (compiler.rs)
//!
//! Nothing here touches the filesystem or spawns processes, so every part
//! can be unit tested in isolation.

pub mod compiler;
pub mod conflict;
pub mod encoder;
pub mod parser;
pub mod program;
pub mod types;
pub mod validator;

pub use compiler::compile;
pub use conflict::{Conflict, ConflictDetector, ConflictGroup, TriggerOwner};
pub use encoder::{encode, parse_step};
pub use parser::{parse_combo, parse_trigger, ClickModifierPolicy, ParseError};
pub use program::{ChangeSet, Outcome, Program};
pub use types::*;
pub use validator::ValidationError;
