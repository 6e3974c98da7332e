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

//! Session files
//!
//! A session file is the TOML form of an editing session: notation
//! options, control bindings, the optional launcher and every mapping in
//! hotkey / step notation.
//!
//! ```toml
//! [options]
//! click_modifiers = "ignore"
//!
//! [controls]
//! toggle = "ctrl+alt+p"
//! exit = "ctrl+alt+x"
//!
//! [[mapping]]
//! trigger = "F1"
//! steps = ["ctrl+c", "0.5 s", "\"done\""]
//! ```
//!
//! Notation stays as typed text on disk. `into_program` parses it and runs
//! every mapping through the same conflict gate the editor uses.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::conflict::TriggerOwner;
use crate::core::parser::parse_trigger;
use crate::core::{parse_step, ClickModifierPolicy, Conflict, ControlRole, KeyCombo, Launcher, ParseError, Program};
use crate::editor::Editor;

/// Errors from loading or interpreting a session file
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session file not found: {0}")]
    NotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid session file: {0}")]
    Syntax(#[from] toml::de::Error),

    #[error("Failed to serialise session: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("{owner}: invalid hotkey '{text}': {source}")]
    Trigger {
        owner: TriggerOwner,
        text: String,
        #[source]
        source: ParseError,
    },

    #[error("Mapping #{}: invalid step '{text}': {source}", .mapping + 1)]
    Step {
        mapping: usize,
        text: String,
        #[source]
        source: ParseError,
    },

    #[error(transparent)]
    Conflict(#[from] Conflict),
}

/// Notation options
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct SessionOptions {
    /// What to do with modifiers in front of a click trigger
    pub click_modifiers: ClickModifierPolicy,
}

/// Control hotkeys as typed
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct ControlBindings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toggle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
}

impl ControlBindings {
    /// Non-empty bindings in emission order
    pub fn iter(&self) -> impl Iterator<Item = (ControlRole, &str)> {
        [
            (ControlRole::Toggle, &self.toggle),
            (ControlRole::Exit, &self.exit),
            (ControlRole::Info, &self.info),
        ]
        .into_iter()
        .filter_map(|(role, text)| {
            text.as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(|t| (role, t))
        })
    }

    fn set(&mut self, role: ControlRole, text: String) {
        let slot = match role {
            ControlRole::Toggle => &mut self.toggle,
            ControlRole::Exit => &mut self.exit,
            ControlRole::Info => &mut self.info,
        };
        *slot = Some(text);
    }
}

/// One mapping as typed
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct MappingEntry {
    pub trigger: String,
    #[serde(default)]
    pub steps: Vec<String>,
}

/// A whole session file
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct SessionFile {
    #[serde(default)]
    pub options: SessionOptions,

    #[serde(default)]
    pub controls: ControlBindings,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub launch: Option<Launcher>,

    #[serde(default, rename = "mapping", skip_serializing_if = "Vec::is_empty")]
    pub mappings: Vec<MappingEntry>,
}

impl SessionFile {
    /// Reads and parses a session file
    pub fn load(path: &Path) -> Result<Self, SessionError> {
        if !path.exists() {
            return Err(SessionError::NotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        let session = Self::from_toml_str(&content)?;
        log::debug!(
            "Loaded {} mapping(s) from {}",
            session.mappings.len(),
            path.display()
        );
        Ok(session)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, SessionError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> Result<String, SessionError> {
        Ok(toml::to_string(self)?)
    }

    /// Describes a program in session form
    ///
    /// Hotkeys are written in their canonical display form, steps in the
    /// notation the encoder reads back.
    pub fn from_program(program: &Program, options: SessionOptions) -> Self {
        let mut controls = ControlBindings::default();
        for role in ControlRole::ALL {
            if let Some(combo) = program.control(role) {
                controls.set(role, combo.to_string());
            }
        }

        let mappings = program
            .mappings()
            .iter()
            .map(|m| MappingEntry {
                trigger: m.trigger.to_string(),
                steps: m.steps.iter().map(|s| s.to_notation()).collect(),
            })
            .collect();

        Self {
            options,
            controls,
            launch: program.launcher().cloned(),
            mappings,
        }
    }

    /// Builds the program this session describes
    ///
    /// Controls are bound first, then mappings in file order. Mappings
    /// without steps are skipped like in the editor.
    ///
    /// # Errors
    /// The first parse error or conflict, naming the offending entry by its
    /// position in the file.
    pub fn into_program(&self) -> Result<Program, SessionError> {
        let policy = self.options.click_modifiers;
        let mut program = Program::new();

        for (role, text) in self.controls.iter() {
            let combo = parse_trigger(text, policy).map_err(|source| SessionError::Trigger {
                owner: TriggerOwner::Control(role),
                text: text.to_string(),
                source,
            })?;
            program.set_control(role, Some(combo))?;
        }

        // file position of each mapping added to the program
        let mut positions = Vec::new();
        for (index, entry) in self.live_mappings() {
            let trigger = parse_trigger(&entry.trigger, policy).map_err(|source| SessionError::Trigger {
                owner: TriggerOwner::Mapping(index),
                text: entry.trigger.clone(),
                source,
            })?;

            let steps = entry
                .steps
                .iter()
                .map(|text| {
                    parse_step(text).map_err(|source| SessionError::Step {
                        mapping: index,
                        text: text.clone(),
                        source,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            program
                .add_mapping(trigger, steps)
                .map_err(|conflict| in_file_order(conflict, &positions))?;
            positions.push(index);
        }

        program.set_launcher(self.launch.clone());
        Ok(program)
    }

    /// Opens an editor over the program this session describes
    pub fn into_editor(&self) -> Result<Editor, SessionError> {
        Ok(Editor::with_program(self.into_program()?, self.options.click_modifiers))
    }

    /// Every trigger that parses, with its owner
    ///
    /// Lenient counterpart of `into_program` for reporting: unparsable
    /// hotkeys are returned separately instead of stopping the scan, and
    /// duplicates are kept so a `ConflictDetector` can list them all.
    /// Mappings without steps never reach the script and are left out.
    pub fn triggers(&self) -> (Vec<(TriggerOwner, KeyCombo)>, Vec<SessionError>) {
        let policy = self.options.click_modifiers;
        let controls = self
            .controls
            .iter()
            .map(|(role, text)| (TriggerOwner::Control(role), text));
        let mappings = self
            .live_mappings()
            .map(|(i, m)| (TriggerOwner::Mapping(i), m.trigger.as_str()));

        let mut triggers = Vec::new();
        let mut errors = Vec::new();
        for (owner, text) in controls.chain(mappings) {
            match parse_trigger(text, policy) {
                Ok(combo) => triggers.push((owner, combo)),
                Err(source) => errors.push(SessionError::Trigger {
                    owner,
                    text: text.to_string(),
                    source,
                }),
            }
        }
        (triggers, errors)
    }

    /// Mappings that have steps, with their 0-based position in the file
    fn live_mappings(&self) -> impl Iterator<Item = (usize, &MappingEntry)> {
        self.mappings.iter().enumerate().filter(|(index, entry)| {
            if entry.steps.is_empty() {
                log::debug!("Skipping mapping #{} without steps", index + 1);
            }
            !entry.steps.is_empty()
        })
    }
}

/// Renumbers a mapping owner from program position to file position
fn in_file_order(mut conflict: Conflict, positions: &[usize]) -> Conflict {
    if let TriggerOwner::Mapping(index) = conflict.owner {
        if let Some(&position) = positions.get(index) {
            conflict.owner = TriggerOwner::Mapping(position);
        }
    }
    conflict
}

#[cfg(test)]
mod tests;
