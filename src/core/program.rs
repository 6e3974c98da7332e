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

//! The mapping model (aggregate root)
//!
//! A `Program` owns every mapping, the three optional control bindings and
//! the optional startup launcher. Every mutation either fully applies or
//! leaves the program untouched: the conflict gate runs before anything
//! commits, and bundled requests (`ChangeSet`) are staged on a copy that
//! only replaces `self` once every part has passed.

use std::collections::BTreeMap;

use log::debug;

use crate::core::conflict::{self, Conflict, TriggerOwner};
use crate::core::types::{ActionStep, ControlRole, KeyCombo, Launcher, Mapping};

/// Whether a mutation changed the program
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    Changed,
    Unchanged,
}

impl Outcome {
    pub fn is_changed(self) -> bool {
        self == Outcome::Changed
    }
}

/// One bundled edit: control bindings plus an optional new mapping
///
/// Mirrors an "add mapping" request from the editor, which carries the
/// current control fields together with the draft trigger and steps.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChangeSet {
    /// Control bindings to set (each replaces the previous value)
    pub controls: Vec<(ControlRole, KeyCombo)>,

    /// Trigger of the new mapping, if any
    pub trigger: Option<KeyCombo>,

    /// Steps of the new mapping
    pub steps: Vec<ActionStep>,
}

/// The set of all mappings and control bindings of an editing session
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Program {
    mappings: Vec<Mapping>,
    controls: BTreeMap<ControlRole, KeyCombo>,
    launcher: Option<Launcher>,
}

impl Program {
    /// Creates an empty program
    pub fn new() -> Self {
        Self::default()
    }

    /// All mappings in insertion order
    pub fn mappings(&self) -> &[Mapping] {
        &self.mappings
    }

    /// The combo bound to a control role, if any
    pub fn control(&self, role: ControlRole) -> Option<&KeyCombo> {
        self.controls.get(&role)
    }

    /// The startup launcher, if any
    pub fn launcher(&self) -> Option<&Launcher> {
        self.launcher.as_ref()
    }

    /// True when there is nothing to compile
    ///
    /// The info binding and launcher on their own do not make a script.
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
            && self.control(ControlRole::Toggle).is_none()
            && self.control(ControlRole::Exit).is_none()
    }

    /// Every trigger with its owner: controls first, then mappings
    pub fn triggers(&self) -> impl Iterator<Item = (TriggerOwner, &KeyCombo)> {
        let controls = self
            .controls
            .iter()
            .map(|(role, combo)| (TriggerOwner::Control(*role), combo));
        let mappings = self
            .mappings
            .iter()
            .enumerate()
            .map(|(i, m)| (TriggerOwner::Mapping(i), &m.trigger));
        controls.chain(mappings)
    }

    /// Adds a mapping
    ///
    /// An empty step list is not a mapping: the call is a no-op and
    /// returns `Outcome::Unchanged`.
    ///
    /// # Errors
    /// `Conflict` when the trigger is already used by a mapping or control.
    pub fn add_mapping(&mut self, trigger: KeyCombo, steps: Vec<ActionStep>) -> Result<Outcome, Conflict> {
        if steps.is_empty() {
            debug!("Ignoring mapping for '{}' without steps", trigger);
            return Ok(Outcome::Unchanged);
        }

        conflict::validate(&trigger, self)?;

        debug!("Adding mapping '{}' with {} step(s)", trigger, steps.len());
        self.mappings.push(Mapping { trigger, steps });
        Ok(Outcome::Changed)
    }

    /// Removes the mapping with an equal trigger
    pub fn remove_mapping(&mut self, trigger: &KeyCombo) -> Option<Mapping> {
        let index = self.mappings.iter().position(|m| &m.trigger == trigger)?;
        self.remove_mapping_at(index)
    }

    /// Removes the mapping at `index`
    pub fn remove_mapping_at(&mut self, index: usize) -> Option<Mapping> {
        if index >= self.mappings.len() {
            return None;
        }
        let removed = self.mappings.remove(index);
        debug!("Removed mapping '{}'", removed.trigger);
        Some(removed)
    }

    /// Sets or clears a control binding
    ///
    /// Setting a role replaces its previous value; `None` clears it.
    ///
    /// # Errors
    /// `Conflict` when the combo is used by any other mapping or control.
    pub fn set_control(&mut self, role: ControlRole, combo: Option<KeyCombo>) -> Result<Outcome, Conflict> {
        let Some(combo) = combo else {
            return Ok(match self.controls.remove(&role) {
                Some(old) => {
                    debug!("Cleared {} control (was '{}')", role, old);
                    Outcome::Changed
                }
                None => Outcome::Unchanged,
            });
        };

        if self.controls.get(&role) == Some(&combo) {
            return Ok(Outcome::Unchanged);
        }

        conflict::validate_except(&combo, self, Some(TriggerOwner::Control(role)))?;

        debug!("Binding {} control to '{}'", role, combo);
        self.controls.insert(role, combo);
        Ok(Outcome::Changed)
    }

    /// Sets or clears the startup launcher
    pub fn set_launcher(&mut self, launcher: Option<Launcher>) -> Outcome {
        if self.launcher == launcher {
            return Outcome::Unchanged;
        }
        self.launcher = launcher;
        Outcome::Changed
    }

    /// Applies a bundled change atomically
    ///
    /// Control bindings are applied first, then the mapping (if both a
    /// trigger and at least one step are present). If any part conflicts,
    /// nothing is committed.
    pub fn apply(&mut self, change: ChangeSet) -> Result<Outcome, Conflict> {
        let mut staged = self.clone();
        let mut outcome = Outcome::Unchanged;

        for (role, combo) in change.controls {
            if staged.set_control(role, Some(combo))?.is_changed() {
                outcome = Outcome::Changed;
            }
        }

        match change.trigger {
            Some(trigger) if !change.steps.is_empty() => {
                if staged.add_mapping(trigger, change.steps)?.is_changed() {
                    outcome = Outcome::Changed;
                }
            }
            Some(trigger) => debug!("No steps for '{}', mapping skipped", trigger),
            None if !change.steps.is_empty() => debug!("Steps without a trigger, mapping skipped"),
            None => {}
        }

        *self = staged;
        Ok(outcome)
    }

    /// Reinitialises the program to empty
    pub fn reset(&mut self) {
        debug!("Resetting program");
        *self = Self::default();
    }
}
