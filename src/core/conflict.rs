//! Trigger conflict detection
//!
//! Every trigger-bearing entity of a `Program` (mappings and the three
//! control bindings) must use a distinct `KeyCombo`. This module provides:
//! - `validate`: the gate every mutation passes before it commits
//! - `ConflictDetector`: a HashMap index that lists every collision in an
//!   arbitrary set of triggers (used to report on session files)
//!
//! Combo equality ignores case and modifier order (see `KeyCombo`).

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

use crate::core::program::Program;
use crate::core::types::{ControlRole, KeyCombo};

/// Who holds a trigger
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum TriggerOwner {
    /// A control binding
    Control(ControlRole),
    /// A mapping, by position in the program (0-based)
    Mapping(usize),
}

impl fmt::Display for TriggerOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerOwner::Control(role) => write!(f, "the {} control", role),
            TriggerOwner::Mapping(index) => write!(f, "mapping #{}", index + 1),
        }
    }
}

/// A candidate trigger collides with one already in the program
#[derive(Clone, Debug, Error, PartialEq)]
#[error("Hotkey '{trigger}' is already used by {owner}")]
pub struct Conflict {
    /// The candidate trigger that was refused
    pub trigger: KeyCombo,

    /// The existing entity holding an equal trigger
    pub owner: TriggerOwner,
}

/// Checks a candidate trigger against every trigger in the program
///
/// # Example
/// ```
/// use ahk_keymapper::core::{conflict, KeyCombo, Modifier, Program, ControlRole};
///
/// let mut program = Program::new();
/// program.set_control(ControlRole::Toggle, Some(KeyCombo::new(vec![Modifier::Ctrl], "p")))?;
///
/// let candidate = KeyCombo::new(vec![Modifier::Ctrl], "P");
/// assert!(conflict::validate(&candidate, &program).is_err());
/// # Ok::<(), ahk_keymapper::core::Conflict>(())
/// ```
pub fn validate(candidate: &KeyCombo, program: &Program) -> Result<(), Conflict> {
    validate_except(candidate, program, None)
}

/// Like `validate`, but skips the trigger currently held by `skip`
///
/// Re-binding a control to the value it already holds is not a conflict.
pub fn validate_except(
    candidate: &KeyCombo,
    program: &Program,
    skip: Option<TriggerOwner>,
) -> Result<(), Conflict> {
    let clash = program
        .triggers()
        .find(|(owner, combo)| Some(*owner) != skip && *combo == candidate);

    match clash {
        Some((owner, _)) => {
            log::info!("Refusing '{}': already used by {}", candidate, owner);
            Err(Conflict {
                trigger: candidate.clone(),
                owner,
            })
        }
        None => Ok(()),
    }
}

/// A key combo used by two or more owners
#[derive(Clone, Debug, PartialEq)]
pub struct ConflictGroup {
    /// The key combination that has conflicts
    pub key_combo: KeyCombo,

    /// Every owner using this key combo (always 2 or more), in insertion order
    pub owners: Vec<TriggerOwner>,
}

/// Detects trigger conflicts in O(1) time using HashMap-based indexing.
///
/// Keys are KeyCombos and values are every owner using that combo.
/// A conflict exists when any vector has length > 1.
pub struct ConflictDetector {
    triggers: HashMap<KeyCombo, Vec<TriggerOwner>>,
}

impl ConflictDetector {
    /// Creates a new empty conflict detector.
    pub fn new() -> Self {
        Self {
            triggers: HashMap::new(),
        }
    }

    /// Indexes every trigger of a program.
    pub fn from_program(program: &Program) -> Self {
        let mut detector = Self::new();
        for (owner, combo) in program.triggers() {
            detector.add_trigger(combo.clone(), owner);
        }
        detector
    }

    /// Adds a trigger to the detector.
    ///
    /// Time complexity: O(1) average case
    pub fn add_trigger(&mut self, combo: KeyCombo, owner: TriggerOwner) {
        self.triggers.entry(combo).or_default().push(owner);
    }

    /// Finds all conflicts (key combos with 2 or more owners).
    ///
    /// Groups are ordered by their first owner so reports are stable.
    pub fn find_conflicts(&self) -> Vec<ConflictGroup> {
        let mut groups: Vec<ConflictGroup> = self
            .triggers
            .iter()
            .filter(|(_, owners)| owners.len() > 1)
            .map(|(key_combo, owners)| ConflictGroup {
                key_combo: key_combo.clone(),
                owners: owners.clone(),
            })
            .collect();
        groups.sort_by_key(|g| g.owners.first().copied());
        groups
    }

    /// Returns the total number of triggers tracked.
    pub fn total_triggers(&self) -> usize {
        self.triggers.values().map(|v| v.len()).sum()
    }
}

impl Default for ConflictDetector {
    fn default() -> Self {
        Self::new()
    }
}
