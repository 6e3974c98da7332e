//! src/core/types.rs
//!
//! Core type definitions for hotkey mapping
//!
//! This module defines the fundamental types used throughout the application:
//! - `Modifier`: Keyboard modifier keys (CTRL, ALT, SHIFT, WIN)
//! - `KeyCombo`: A combination of modifiers and a base key
//! - `ActionStep`: One step of a mapping (key press, delay, text, click)
//! - `Mapping`: A trigger plus its ordered, non-empty step sequence
//! - `ControlRole`: The three singleton control bindings (toggle, exit, info)
//!
//! Equality and hashing of `KeyCombo` are case-insensitive and independent
//! of modifier order, which is what the conflict detector relies on.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Keyboard modifier keys
///
/// Variant order is the canonical emission order (ctrl, alt, shift, win).
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Modifier {
    /// Control key
    Ctrl,
    /// Alt key
    Alt,
    /// Shift key
    Shift,
    /// Windows key
    Win,
}

impl Modifier {
    /// All modifiers in canonical order
    pub const ALL: [Modifier; 4] = [Modifier::Ctrl, Modifier::Alt, Modifier::Shift, Modifier::Win];

    /// Looks up a modifier by its typed name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "ctrl" => Some(Modifier::Ctrl),
            "alt" => Some(Modifier::Alt),
            "shift" => Some(Modifier::Shift),
            "win" => Some(Modifier::Win),
            _ => None,
        }
    }

    /// Looks up a modifier by its AutoHotkey sigil
    pub fn from_sigil(sigil: char) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.sigil() == sigil)
    }

    /// The single-character AutoHotkey sigil for this modifier
    pub fn sigil(self) -> char {
        match self {
            Modifier::Ctrl => '^',
            Modifier::Alt => '!',
            Modifier::Shift => '+',
            Modifier::Win => '#',
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modifier::Ctrl => write!(f, "ctrl"),
            Modifier::Alt => write!(f, "alt"),
            Modifier::Shift => write!(f, "shift"),
            Modifier::Win => write!(f, "win"),
        }
    }
}

/// A combination of modifier keys and a base key
///
/// Used both as a trigger (hotkey) and as the payload of a key-press step.
/// Click trigger phrases resolve to the base keys `LButton` / `RButton`.
///
/// # Equality
/// Two combos are equal when their modifier sets, their unrecognised
/// modifier tokens and their base keys match case-insensitively. Modifier
/// order never matters because `KeyCombo::new` sorts and de-duplicates.
///
/// # Example
/// ```
/// use ahk_keymapper::core::{KeyCombo, Modifier};
///
/// let a = KeyCombo::new(vec![Modifier::Shift, Modifier::Ctrl], "A");
/// let b = KeyCombo::new(vec![Modifier::Ctrl, Modifier::Shift], "a");
/// assert_eq!(a, b);
/// ```
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct KeyCombo {
    /// Recognised modifiers, canonical order, no duplicates
    pub modifiers: Vec<Modifier>,

    /// Modifier tokens that are not in the modifier table.
    /// These pass through to the output verbatim instead of failing.
    pub extra_modifiers: Vec<String>,

    /// Base key name as typed (e.g. "a", "F1", "Enter", "+")
    pub key: String,
}

impl KeyCombo {
    /// Create a new KeyCombo with normalised modifiers
    ///
    /// Normalisation sorts modifiers into canonical order and removes
    /// duplicates. The key keeps its original spelling.
    pub fn new(modifiers: Vec<Modifier>, key: &str) -> Self {
        Self::with_extras(modifiers, Vec::new(), key)
    }

    /// Create a KeyCombo that also carries unrecognised modifier tokens
    pub fn with_extras(mut modifiers: Vec<Modifier>, extra_modifiers: Vec<String>, key: &str) -> Self {
        modifiers.sort();
        modifiers.dedup();

        Self {
            modifiers,
            extra_modifiers,
            key: key.to_string(),
        }
    }

    /// True when the base key is exactly one alphanumeric character
    pub fn has_simple_key(&self) -> bool {
        is_simple_key(&self.key)
    }

    /// True when this combo is a mouse-click trigger
    pub fn is_click(&self) -> bool {
        self.key.eq_ignore_ascii_case("LButton") || self.key.eq_ignore_ascii_case("RButton")
    }

    /// Case-folded identity used by `PartialEq` and `Hash`
    fn identity(&self) -> (&[Modifier], Vec<String>, String) {
        let mut extras: Vec<String> = self.extra_modifiers.iter().map(|e| e.to_lowercase()).collect();
        extras.sort();
        extras.dedup();
        (&self.modifiers, extras, self.key.to_lowercase())
    }
}

/// True when `key` is exactly one alphanumeric character
pub fn is_simple_key(key: &str) -> bool {
    let mut chars = key.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_alphanumeric())
}

impl PartialEq for KeyCombo {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for KeyCombo {}

impl Hash for KeyCombo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for m in &self.modifiers {
            write!(f, "{}+", m)?;
        }
        for extra in &self.extra_modifiers {
            write!(f, "{}+", extra)?;
        }
        write!(f, "{}", self.key)
    }
}

/// Kind of click a click step performs
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ClickKind {
    Single,
    Double,
    Triple,
    Right,
    /// Repeat counts above three, or click phrases with extra arguments
    Other,
}

impl fmt::Display for ClickKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ClickKind::Single => "single click",
            ClickKind::Double => "double click",
            ClickKind::Triple => "triple click",
            ClickKind::Right => "right click",
            ClickKind::Other => "click",
        };
        write!(f, "{}", name)
    }
}

/// A click action inside a mapping
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum ClickAction {
    /// A click phrase (e.g. "Click", "Click right") that is already
    /// valid target syntax and is emitted unchanged
    Phrase(String),

    /// `click x<N>`: N left clicks, emitted as `Click N`
    Repeat(u32),
}

impl ClickAction {
    pub fn kind(&self) -> ClickKind {
        match self {
            ClickAction::Repeat(1) => ClickKind::Single,
            ClickAction::Repeat(2) => ClickKind::Double,
            ClickAction::Repeat(3) => ClickKind::Triple,
            ClickAction::Repeat(_) => ClickKind::Other,
            ClickAction::Phrase(text) => {
                let phrase = text.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
                match phrase.as_str() {
                    "click" | "click left" | "left click" => ClickKind::Single,
                    "click right" | "right click" => ClickKind::Right,
                    _ => ClickKind::Other,
                }
            }
        }
    }

    /// Number of clicks performed
    pub fn count(&self) -> u32 {
        match self {
            ClickAction::Repeat(n) => *n,
            ClickAction::Phrase(_) => 1,
        }
    }

    /// Short description for listings (`double click`, `5 clicks`)
    pub fn label(&self) -> String {
        match self.kind() {
            ClickKind::Other if self.count() > 1 => format!("{} clicks", self.count()),
            kind => kind.to_string(),
        }
    }
}

impl fmt::Display for ClickAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClickAction::Phrase(text) => write!(f, "{}", text),
            ClickAction::Repeat(n) => write!(f, "Click x{}", n),
        }
    }
}

/// One step of a mapping's action sequence
///
/// Steps are immutable once parsed. The editor keeps the mutable text form.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum ActionStep {
    /// Send a key combination
    KeyPress(KeyCombo),
    /// Wait, in milliseconds
    Delay { millis: u64 },
    /// Send literal text (stored without the surrounding quotes)
    Text(String),
    /// Mouse click
    Click(ClickAction),
}

impl fmt::Display for ActionStep {
    /// Human-readable form, as listed in the info tooltip and the CLI.
    /// Literal text is shown without its quotes.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionStep::KeyPress(combo) => write!(f, "{}", combo),
            ActionStep::Delay { millis } => write!(f, "{} s", format_seconds(*millis)),
            ActionStep::Text(text) => write!(f, "{}", text),
            ActionStep::Click(click) => write!(f, "{}", click),
        }
    }
}

/// Formats milliseconds as seconds without trailing zeros ("1.5", "2", "0.25")
pub fn format_seconds(millis: u64) -> String {
    let whole = millis / 1000;
    let frac = millis % 1000;
    if frac == 0 {
        whole.to_string()
    } else {
        let digits = format!("{:03}", frac);
        format!("{}.{}", whole, digits.trim_end_matches('0'))
    }
}

/// A trigger and its ordered action sequence
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Mapping {
    /// The hotkey that activates this mapping
    pub trigger: KeyCombo,

    /// Steps in execution order (never empty inside a `Program`)
    pub steps: Vec<ActionStep>,
}

impl fmt::Display for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let steps = self
            .steps
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{} → {}", self.trigger, steps)
    }
}

/// The three singleton control bindings
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlRole {
    /// Pause / resume all mappings
    Toggle,
    /// Terminate the script
    Exit,
    /// Show the list of mappings
    Info,
}

impl ControlRole {
    /// All roles in emission order
    pub const ALL: [ControlRole; 3] = [ControlRole::Toggle, ControlRole::Exit, ControlRole::Info];

    /// Capitalised label used in listings ("Toggle", "Exit", "Info")
    pub fn label(self) -> &'static str {
        match self {
            ControlRole::Toggle => "Toggle",
            ControlRole::Exit => "Exit",
            ControlRole::Info => "Info",
        }
    }
}

impl fmt::Display for ControlRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlRole::Toggle => write!(f, "toggle"),
            ControlRole::Exit => write!(f, "exit"),
            ControlRole::Info => write!(f, "info"),
        }
    }
}

/// A program started by the generated script when it loads
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Launcher {
    /// Executable path
    pub path: String,

    /// Command-line arguments appended after the path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<String>,

    /// Seconds to wait after starting it
    #[serde(default)]
    pub delay: f64,
}

impl Launcher {
    /// The launch delay in whole milliseconds (negative values clamp to 0)
    pub fn delay_millis(&self) -> u64 {
        if self.delay.is_finite() && self.delay > 0.0 {
            (self.delay * 1000.0).trunc() as u64
        } else {
            0
        }
    }
}
