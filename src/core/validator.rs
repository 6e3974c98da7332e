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

//! Whitelist validation for key names and literal text
//!
//! Base keys must come from a fixed vocabulary:
//! - A single alphanumeric character or a single ASCII punctuation mark
//! - Function keys F1 to F24
//! - Named special keys (editing, navigation, numpad, media, browser, mouse)
//!
//! We use WHITELIST validation (allow known-good) so a typo such as
//! `Entr` is reported instead of silently producing a hotkey that the
//! script runtime refuses to load.

use thiserror::Error;

/// Validation errors
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Key name not in the whitelist
    #[error("Unknown key name '{0}'")]
    InvalidKey(String),

    /// Literal text spans several lines
    #[error("Literal text must fit on one line")]
    MultilineText,
}

/// Named keys accepted as base keys (compared case-insensitively)
///
/// Source: AutoHotkey v2 key list
pub(crate) const NAMED_KEYS: &[&str] = &[
    // Editing and navigation
    "Enter",
    "Return",
    "Tab",
    "Esc",
    "Escape",
    "Space",
    "Backspace",
    "BS",
    "Delete",
    "Del",
    "Insert",
    "Ins",
    "Home",
    "End",
    "PgUp",
    "PgDn",
    "Up",
    "Down",
    "Left",
    "Right",
    "Pause",
    "PrintScreen",
    "ScrollLock",
    "CapsLock",
    "NumLock",
    "AppsKey",
    "Sleep",
    "Help",
    "CtrlBreak",
    // Modifier keys used on their own
    "Ctrl",
    "Alt",
    "Shift",
    "LCtrl",
    "RCtrl",
    "LAlt",
    "RAlt",
    "LShift",
    "RShift",
    "LWin",
    "RWin",
    // Numpad
    "NumpadDot",
    "NumpadAdd",
    "NumpadSub",
    "NumpadMult",
    "NumpadDiv",
    "NumpadEnter",
    "NumpadDel",
    "NumpadIns",
    "NumpadClear",
    "NumpadUp",
    "NumpadDown",
    "NumpadLeft",
    "NumpadRight",
    "NumpadHome",
    "NumpadEnd",
    "NumpadPgUp",
    "NumpadPgDn",
    // Browser
    "Browser_Back",
    "Browser_Forward",
    "Browser_Refresh",
    "Browser_Stop",
    "Browser_Search",
    "Browser_Favorites",
    "Browser_Home",
    // Media and launch
    "Volume_Mute",
    "Volume_Down",
    "Volume_Up",
    "Media_Next",
    "Media_Prev",
    "Media_Stop",
    "Media_Play_Pause",
    "Launch_Mail",
    "Launch_Media",
    "Launch_App1",
    "Launch_App2",
    // Mouse
    "LButton",
    "RButton",
    "MButton",
    "WheelUp",
    "WheelDown",
    "WheelLeft",
    "WheelRight",
    "XButton1",
    "XButton2",
];

/// True for `F1` .. `F24` (case-insensitive)
fn is_function_key(key: &str) -> bool {
    let Some(number) = key.strip_prefix('F').or_else(|| key.strip_prefix('f')) else {
        return false;
    };
    !number.starts_with('0')
        && number.chars().all(|c| c.is_ascii_digit())
        && matches!(number.parse::<u8>(), Ok(1..=24))
}

/// True for `Numpad0` .. `Numpad9` (case-insensitive)
fn is_numpad_digit(key: &str) -> bool {
    key.len() == 7
        && key.get(..6).is_some_and(|prefix| prefix.eq_ignore_ascii_case("numpad"))
        && key.as_bytes()[6].is_ascii_digit()
}

/// Validates a base key name
///
/// Accepts single alphanumeric characters, single ASCII punctuation,
/// function keys and the named keys of the whitelist.
pub fn validate_key(key: &str) -> Result<(), ValidationError> {
    let mut chars = key.chars();
    let single = match (chars.next(), chars.next()) {
        (Some(c), None) => c.is_alphanumeric() || c.is_ascii_punctuation(),
        _ => false,
    };

    let valid = single
        || is_function_key(key)
        || is_numpad_digit(key)
        || NAMED_KEYS.iter().any(|name| name.eq_ignore_ascii_case(key));

    if valid {
        Ok(())
    } else {
        Err(ValidationError::InvalidKey(key.to_string()))
    }
}

/// Validates the content of a literal text step
///
/// Line breaks would split the emitted statement, so they are refused.
pub fn validate_text(text: &str) -> Result<(), ValidationError> {
    if text.contains('\n') || text.contains('\r') {
        return Err(ValidationError::MultilineText);
    }

    Ok(())
}
