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

//! src/core/parser.rs
//!
//! Hotkey notation parser and trigger emitter
//!
//! This module turns human-typed hotkey descriptions into `KeyCombo`s and
//! back into AutoHotkey trigger syntax. It handles:
//! - Separator-based notation (`ctrl+shift+a`, `alt-F4`, `win e`)
//! - AutoHotkey sigil notation (`^!p`, `+F1`), so emitted triggers parse back
//! - Punctuation base keys written after a separator (`ctrl++`, `shift+-`)
//! - Click phrases (`click`, `right click`, ...) in trigger position
//!
//! # Architecture
//! Tokenisation uses nom combinators. Modifier tokens are looked up in the
//! modifier table; unknown ones are kept verbatim (permissive fallback) and
//! emitted after the canonical sigils. The base key is checked against the
//! key whitelist in validator.rs.

use nom::{
    bytes::complete::{take_while, take_while1},
    multi::separated_list0,
    sequence::preceded,
    IResult, Parser,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::{is_simple_key, KeyCombo, Modifier};
use crate::core::validator::{validate_key, ValidationError};

/// Parse errors for hotkey and step notation
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("Hotkey text is empty")]
    Empty,

    #[error("No base key in '{0}'")]
    MissingKey(String),

    #[error("Modifiers cannot be combined with a click trigger: '{0}'")]
    ModifiedClick(String),

    #[error("Repeated clicks cannot be used as a trigger: '{0}'")]
    RepeatClickTrigger(String),

    #[error("Click repeat count must be a positive integer: '{0}'")]
    InvalidRepeatCount(String),

    #[error("Delay out of range: '{0}'")]
    DelayOutOfRange(String),

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// What to do with modifiers written in front of a click trigger
///
/// Click triggers emit to fixed identifiers (`LButton` / `RButton`), so
/// `ctrl+click` has no modifier-carrying form here.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClickModifierPolicy {
    /// Drop the modifiers and log a warning
    #[default]
    Ignore,
    /// Refuse the trigger with `ParseError::ModifiedClick`
    Reject,
}

/// Fixed table of click trigger phrases
const CLICK_TRIGGERS: &[(&str, &str)] = &[
    ("click", "LButton"),
    ("left click", "LButton"),
    ("click left", "LButton"),
    ("click right", "RButton"),
    ("right click", "RButton"),
];

/// Token separators: `+`, `-` and whitespace
pub fn is_separator(c: char) -> bool {
    c == '+' || c == '-' || c.is_whitespace()
}

/// Splits notation into tokens on runs of separators
fn tokens(input: &str) -> IResult<&str, Vec<&str>> {
    preceded(
        take_while(is_separator),
        separated_list0(take_while1(is_separator), take_while1(|c: char| !is_separator(c))),
    )
    .parse(input)
}

/// Tokenises `input`, ignoring whatever the tokenizer cannot consume
pub fn split_tokens(input: &str) -> Vec<&str> {
    tokens(input).map(|(_, toks)| toks).unwrap_or_default()
}

/// A combo split into parts but not yet validated
#[derive(Debug, PartialEq)]
struct RawCombo<'a> {
    modifiers: Vec<Modifier>,
    extras: Vec<&'a str>,
    key: &'a str,
}

impl<'a> RawCombo<'a> {
    fn from_modifier_tokens(toks: &[&'a str], key: &'a str) -> Self {
        let mut modifiers = Vec::new();
        let mut extras = Vec::new();
        for &tok in toks {
            // `^ a`, `^x+a`: sigils in a modifier token are modifiers too
            let rest = tok.trim_start_matches(|c: char| Modifier::from_sigil(c).is_some());
            modifiers.extend(tok[..tok.len() - rest.len()].chars().filter_map(Modifier::from_sigil));
            if rest.is_empty() {
                continue;
            }
            match Modifier::from_name(rest) {
                Some(m) => modifiers.push(m),
                None => extras.push(rest),
            }
        }
        Self { modifiers, extras, key }
    }

    fn into_combo(self) -> Result<KeyCombo, ParseError> {
        validate_key(self.key)?;
        let extras = self.extras.into_iter().map(str::to_string).collect();
        Ok(KeyCombo::with_extras(self.modifiers, extras, self.key))
    }
}

/// Reads leading AutoHotkey sigils (`^!+#`)
///
/// Returns `None` unless at least one sigil is followed by a single key
/// token, so plain punctuation keys like `+` or `^` stay keys.
fn split_sigils(text: &str) -> Option<RawCombo<'_>> {
    if text.chars().any(char::is_whitespace) {
        return None;
    }

    let mut modifiers = Vec::new();
    let mut rest = text;
    while let Some(c) = rest.chars().next() {
        let Some(m) = Modifier::from_sigil(c) else { break };
        if modifiers.contains(&m) || rest.len() == 1 {
            break;
        }
        modifiers.push(m);
        rest = &rest[1..];
    }

    if modifiers.is_empty() {
        return None;
    }
    if rest.chars().count() > 1 && rest.contains(['+', '-']) {
        return None;
    }

    Some(RawCombo {
        modifiers,
        extras: Vec::new(),
        key: rest,
    })
}

/// Splits notation into modifiers and base key
fn split_combo(text: &str) -> Result<RawCombo<'_>, ParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ParseError::Empty);
    }

    if let Some(raw) = split_sigils(text) {
        return Ok(raw);
    }

    // `ctrl++`, `shift+-`, `-`: the separator character is the key itself
    if let Some(last) = text.strip_suffix(['+', '-']) {
        if last.is_empty() || last.ends_with(is_separator) {
            let toks = split_tokens(last);
            return Ok(RawCombo::from_modifier_tokens(&toks, &text[last.len()..]));
        }
    }

    let toks = split_tokens(text);
    match toks.split_last() {
        Some((key, mods)) => Ok(RawCombo::from_modifier_tokens(mods, *key)),
        None => Err(ParseError::MissingKey(text.to_string())),
    }
}

/// Collapses whitespace and lower-cases a phrase for table lookup
fn normalise_phrase(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Looks a whole phrase up in the click trigger table
fn click_trigger(text: &str) -> Option<&'static str> {
    let phrase = normalise_phrase(text);
    CLICK_TRIGGERS
        .iter()
        .find(|(name, _)| *name == phrase)
        .map(|(_, button)| *button)
}

/// True for `click x<digits>` in any case
pub(crate) fn is_repeat_click(text: &str) -> bool {
    let phrase = normalise_phrase(text);
    phrase
        .strip_prefix("click x")
        .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
}

/// Detects a click phrase at the end of a modifier-carrying combo
///
/// Removes the click words from `raw` and returns the button identifier.
fn take_trailing_click(raw: &mut RawCombo<'_>) -> Option<&'static str> {
    let key = raw.key.to_lowercase();
    let prev = raw.extras.last().map(|e| e.to_lowercase());

    let (button, drop_prev) = match (key.as_str(), prev.as_deref()) {
        ("click", Some("left")) => ("LButton", true),
        ("click", Some("right")) => ("RButton", true),
        ("click", _) => ("LButton", false),
        ("left", Some("click")) => ("LButton", true),
        ("right", Some("click")) => ("RButton", true),
        _ => return None,
    };

    if drop_prev {
        raw.extras.pop();
    }
    Some(button)
}

/// Parses a trigger hotkey
///
/// # Arguments
/// * `text` - Human-typed or picker-produced notation (e.g. "ctrl+alt+p")
/// * `policy` - How to treat modifiers in front of a click phrase
///
/// # Example
/// ```
/// use ahk_keymapper::core::parser::{emit_trigger, parse_trigger, ClickModifierPolicy};
///
/// let combo = parse_trigger("ctrl+alt+p", ClickModifierPolicy::Ignore)?;
/// assert_eq!(emit_trigger(&combo), "^!p");
/// # Ok::<(), ahk_keymapper::core::parser::ParseError>(())
/// ```
pub fn parse_trigger(text: &str, policy: ClickModifierPolicy) -> Result<KeyCombo, ParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }

    if let Some(button) = click_trigger(trimmed) {
        return Ok(KeyCombo::new(Vec::new(), button));
    }

    if is_repeat_click(trimmed) {
        return Err(ParseError::RepeatClickTrigger(trimmed.to_string()));
    }

    let mut raw = split_combo(trimmed)?;
    if let Some(button) = take_trailing_click(&mut raw) {
        if !(raw.modifiers.is_empty() && raw.extras.is_empty()) {
            match policy {
                ClickModifierPolicy::Reject => {
                    return Err(ParseError::ModifiedClick(trimmed.to_string()));
                }
                ClickModifierPolicy::Ignore => {
                    log::warn!("Dropping modifiers from click trigger '{}'", trimmed);
                }
            }
        }
        return Ok(KeyCombo::new(Vec::new(), button));
    }

    raw.into_combo()
}

/// Parses a key combination in action position (no click phrases)
pub fn parse_combo(text: &str) -> Result<KeyCombo, ParseError> {
    split_combo(text)?.into_combo()
}

/// Emits a base key: single alphanumerics lower-cased, others unchanged
pub fn emit_key(key: &str) -> String {
    if is_simple_key(key) {
        key.to_lowercase()
    } else {
        key.to_string()
    }
}

/// Emits modifier sigils in canonical order, then unrecognised tokens verbatim
pub fn emit_modifiers(combo: &KeyCombo) -> String {
    let mut out: String = combo.modifiers.iter().map(|m| m.sigil()).collect();
    for extra in &combo.extra_modifiers {
        out.push_str(extra);
    }
    out
}

/// Emits a combo in trigger syntax (e.g. `^!p`, `F1`, `LButton`)
///
/// Unlike action syntax, the base key is never wrapped in braces.
pub fn emit_trigger(combo: &KeyCombo) -> String {
    format!("{}{}", emit_modifiers(combo), emit_key(&combo.key))
}
