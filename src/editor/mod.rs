//! Editor session - the text-facing controller over a `Program`
//!
//! # Responsibilities
//!
//! - Hold the draft trigger and draft step list as typed text
//! - Edit the draft (push, replace, replicate, remove steps)
//! - Hold the three control binding fields
//! - Turn the draft into one atomic `ChangeSet` on commit
//! - Recompile the full script after every change
//!
//! # Architecture
//!
//! The editor owns the model and knows nothing about widgets or files. A
//! front end (GUI, CLI, session loader) calls an operation and reads the
//! compiled script it returns; there is no change notification to wire up.

use std::collections::BTreeMap;
use std::fmt;

use log::debug;
use thiserror::Error;

use crate::core::parser::parse_trigger;
use crate::core::validator::validate_text;
use crate::core::{
    compile, format_seconds, parse_step, ChangeSet, ClickModifierPolicy, Conflict, ControlRole, Launcher,
    Outcome, ParseError, Program,
};

/// Longest delay the editor accepts, in seconds
pub const MAX_DELAY_SECS: f64 = 3600.0;

/// Which editor field a parse error came from
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Field {
    Trigger,
    /// Draft step, 0-based
    Step(usize),
    Control(ControlRole),
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Trigger => write!(f, "trigger"),
            Field::Step(index) => write!(f, "step #{}", index + 1),
            Field::Control(role) => write!(f, "{} hotkey", role),
        }
    }
}

/// Errors returned by editor operations
#[derive(Clone, Debug, Error, PartialEq)]
pub enum EditorError {
    #[error("Invalid {field}: {source}")]
    Parse {
        field: Field,
        #[source]
        source: ParseError,
    },

    #[error(transparent)]
    Conflict(#[from] Conflict),

    #[error("No step at position {0}")]
    NoSuchStep(usize),

    #[error("No mapping at position {0}")]
    NoSuchMapping(usize),
}

impl EditorError {
    fn parse(field: Field) -> impl FnOnce(ParseError) -> Self {
        move |source| EditorError::Parse { field, source }
    }
}

/// Editing session over one program
///
/// # Example
///
/// ```
/// use ahk_keymapper::editor::Editor;
///
/// let mut editor = Editor::default();
/// editor.set_trigger("F1");
/// editor.push_step("ctrl+c")?;
/// let script = editor.commit()?;
/// assert!(script.contains("F1:: Send \"^c\""));
/// # Ok::<(), ahk_keymapper::editor::EditorError>(())
/// ```
#[derive(Debug, Default)]
pub struct Editor {
    program: Program,
    policy: ClickModifierPolicy,
    trigger: String,
    steps: Vec<String>,
    controls: BTreeMap<ControlRole, String>,
    script: String,
}

impl Editor {
    /// Creates an empty editor
    pub fn new(policy: ClickModifierPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Creates an editor over an existing program
    ///
    /// Control fields are filled from the program's bindings.
    pub fn with_program(program: Program, policy: ClickModifierPolicy) -> Self {
        let controls = ControlRole::ALL
            .into_iter()
            .filter_map(|role| program.control(role).map(|combo| (role, combo.to_string())))
            .collect();
        let script = compile(&program);

        Self {
            program,
            policy,
            trigger: String::new(),
            steps: Vec::new(),
            controls,
            script,
        }
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn policy(&self) -> ClickModifierPolicy {
        self.policy
    }

    /// The most recently compiled script
    pub fn script(&self) -> &str {
        &self.script
    }

    pub fn draft_trigger(&self) -> &str {
        &self.trigger
    }

    pub fn draft_steps(&self) -> &[String] {
        &self.steps
    }

    /// Current text of a control field (empty when unset)
    pub fn control_text(&self, role: ControlRole) -> &str {
        self.controls.get(&role).map(String::as_str).unwrap_or("")
    }

    /// Sets the draft trigger text (parsed on commit)
    pub fn set_trigger(&mut self, text: &str) {
        self.trigger = text.trim().to_string();
    }

    /// Appends a step typed in step notation
    ///
    /// # Errors
    /// `EditorError::Parse` when the text is not a valid step; the draft is
    /// left unchanged.
    pub fn push_step(&mut self, text: &str) -> Result<(), EditorError> {
        let index = self.steps.len();
        parse_step(text).map_err(EditorError::parse(Field::Step(index)))?;
        self.steps.push(text.trim().to_string());
        Ok(())
    }

    /// Appends a delay step (`<seconds> s`)
    pub fn push_delay(&mut self, seconds: f64) -> Result<(), EditorError> {
        let text = delay_text(seconds).map_err(EditorError::parse(Field::Step(self.steps.len())))?;
        self.steps.push(text);
        Ok(())
    }

    /// Appends a literal text step (quoted for the encoder)
    pub fn push_text(&mut self, text: &str) -> Result<(), EditorError> {
        let field = Field::Step(self.steps.len());
        validate_text(text).map_err(|e| EditorError::Parse {
            field,
            source: e.into(),
        })?;
        self.steps.push(format!("\"{}\"", text));
        Ok(())
    }

    /// Replaces the draft step at `index`
    pub fn replace_step(&mut self, index: usize, text: &str) -> Result<(), EditorError> {
        if index >= self.steps.len() {
            return Err(EditorError::NoSuchStep(index));
        }
        parse_step(text).map_err(EditorError::parse(Field::Step(index)))?;
        self.steps[index] = text.trim().to_string();
        Ok(())
    }

    /// Appends copies of the selected steps, in selection order
    pub fn replicate_steps(&mut self, indices: &[usize]) -> Result<(), EditorError> {
        self.check_steps(indices)?;
        let copies: Vec<String> = indices.iter().map(|&i| self.steps[i].clone()).collect();
        debug!("Replicating {} step(s)", copies.len());
        self.steps.extend(copies);
        Ok(())
    }

    /// Removes the selected steps
    ///
    /// Duplicate indices are ignored. Nothing is removed if any index is
    /// out of range.
    pub fn remove_steps(&mut self, indices: &[usize]) -> Result<(), EditorError> {
        self.check_steps(indices)?;
        let mut rows = indices.to_vec();
        rows.sort_unstable();
        rows.dedup();
        for row in rows.into_iter().rev() {
            self.steps.remove(row);
        }
        Ok(())
    }

    /// Sets the text of a control field (applied on commit)
    ///
    /// An empty field leaves the existing binding alone; use
    /// `remove_control` to clear one.
    pub fn set_control_text(&mut self, role: ControlRole, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            self.controls.remove(&role);
        } else {
            self.controls.insert(role, text.to_string());
        }
    }

    /// Applies the control fields and the draft mapping as one change
    ///
    /// The draft is cleared only when a mapping was actually added. On any
    /// error the program, the draft and the script stay as they were.
    ///
    /// # Returns
    ///
    /// The newly compiled script
    pub fn commit(&mut self) -> Result<&str, EditorError> {
        let mut change = ChangeSet::default();

        for (role, text) in &self.controls {
            let combo = parse_trigger(text, self.policy).map_err(EditorError::parse(Field::Control(*role)))?;
            change.controls.push((*role, combo));
        }

        if !self.trigger.is_empty() {
            let trigger = parse_trigger(&self.trigger, self.policy).map_err(EditorError::parse(Field::Trigger))?;
            change.trigger = Some(trigger);
        }

        for (index, text) in self.steps.iter().enumerate() {
            let step = parse_step(text).map_err(EditorError::parse(Field::Step(index)))?;
            change.steps.push(step);
        }

        let adds_mapping = change.trigger.is_some() && !change.steps.is_empty();
        let outcome = self.program.apply(change)?;

        if adds_mapping {
            self.trigger.clear();
            self.steps.clear();
        }
        Ok(self.recompile(outcome))
    }

    /// Removes the mapping at `index` (0-based, mappings only)
    pub fn remove_mapping(&mut self, index: usize) -> Result<&str, EditorError> {
        self.program
            .remove_mapping_at(index)
            .ok_or(EditorError::NoSuchMapping(index))?;
        Ok(self.recompile(Outcome::Changed))
    }

    /// Clears a control field and its binding
    pub fn remove_control(&mut self, role: ControlRole) -> &str {
        self.controls.remove(&role);
        // Clearing never conflicts
        let outcome = self.program.set_control(role, None).unwrap_or(Outcome::Unchanged);
        self.recompile(outcome)
    }

    /// Sets or clears the startup launcher
    pub fn set_launcher(&mut self, launcher: Option<Launcher>) -> &str {
        let outcome = self.program.set_launcher(launcher);
        self.recompile(outcome)
    }

    /// Clears every mapping, control, field and the draft
    pub fn reset(&mut self) -> &str {
        self.program.reset();
        self.trigger.clear();
        self.steps.clear();
        self.controls.clear();
        self.recompile(Outcome::Changed)
    }

    /// Display lines: controls first (`Toggle → ^!p`), then mappings
    pub fn entries(&self) -> Vec<String> {
        let controls = ControlRole::ALL.into_iter().filter_map(|role| {
            self.program
                .control(role)
                .map(|combo| format!("{} → {}", role.label(), combo))
        });
        let mappings = self.program.mappings().iter().map(|m| m.to_string());
        controls.chain(mappings).collect()
    }

    fn check_steps(&self, indices: &[usize]) -> Result<(), EditorError> {
        match indices.iter().find(|&&i| i >= self.steps.len()) {
            Some(&bad) => Err(EditorError::NoSuchStep(bad)),
            None => Ok(()),
        }
    }

    fn recompile(&mut self, outcome: Outcome) -> &str {
        if outcome.is_changed() {
            self.script = compile(&self.program);
            debug!("Recompiled script ({} bytes)", self.script.len());
        }
        &self.script
    }
}

/// Step text for a delay in seconds (`1.5 s`, `2 s`)
fn delay_text(seconds: f64) -> Result<String, ParseError> {
    if !seconds.is_finite() || !(0.0..=MAX_DELAY_SECS).contains(&seconds) {
        return Err(ParseError::DelayOutOfRange(seconds.to_string()));
    }
    let millis = (seconds * 1000.0).round() as u64;
    Ok(format!("{} s", format_seconds(millis)))
}

#[cfg(test)]
mod tests;
