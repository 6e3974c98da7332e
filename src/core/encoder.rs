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

//! Action step parsing and statement encoding
//!
//! Step notation, checked in this order:
//! - `click x<N>` → `Click N`
//! - any other `click...` phrase → passed through unchanged
//! - `<number>[.<number>] s` → `Sleep <ms>`
//! - `"text"` → `Send "text"`
//! - anything else is a key combo → `Send "<mods><key>"`
//!
//! Encoding is a pure function of the step text.

use nom::{
    bytes::complete::tag_no_case,
    character::complete::{char, digit1, multispace0, multispace1},
    combinator::{eof, opt},
    sequence::preceded,
    IResult, Parser,
};

use crate::core::parser::{emit_key, emit_modifiers, parse_combo, ParseError};
use crate::core::types::{ActionStep, ClickAction, KeyCombo};
use crate::core::validator::validate_text;

/// Recognises `click x<digits>` and returns the digits
fn repeat_click(input: &str) -> IResult<&str, &str> {
    let (input, _) = (tag_no_case("click"), multispace1, tag_no_case("x")).parse(input)?;
    let (input, count) = digit1(input)?;
    let (input, _) = eof(input)?;
    Ok((input, count))
}

/// Recognises `<digits>[.<digits>] s` and returns both digit runs
fn delay(input: &str) -> IResult<&str, (&str, Option<&str>)> {
    let (input, whole) = digit1(input)?;
    let (input, frac) = opt(preceded(char('.'), digit1)).parse(input)?;
    let (input, _) = (multispace0, tag_no_case("s"), eof).parse(input)?;
    Ok((input, (whole, frac)))
}

/// Converts decimal seconds to milliseconds, truncating toward zero
///
/// Works on the digits directly, so `0.57` gives 570 rather than the
/// 569 a float multiplication would produce.
fn seconds_to_millis(whole: &str, frac: Option<&str>) -> Option<u64> {
    let whole: u64 = whole.parse().ok()?;
    let frac = frac.unwrap_or("");
    let mut millis_digits: String = frac.chars().take(3).collect();
    while millis_digits.len() < 3 {
        millis_digits.push('0');
    }
    let part: u64 = millis_digits.parse().ok()?;
    whole.checked_mul(1000)?.checked_add(part)
}

/// Parses one step of a mapping
///
/// # Example
/// ```
/// use ahk_keymapper::core::encoder::parse_step;
/// use ahk_keymapper::core::ActionStep;
///
/// assert_eq!(parse_step("1.5 s")?, ActionStep::Delay { millis: 1500 });
/// # Ok::<(), ahk_keymapper::core::parser::ParseError>(())
/// ```
pub fn parse_step(text: &str) -> Result<ActionStep, ParseError> {
    let t = text.trim();
    if t.is_empty() {
        return Err(ParseError::Empty);
    }

    if let Ok((_, count)) = repeat_click(t) {
        return match count.parse::<u32>() {
            Ok(n) if n > 0 => Ok(ActionStep::Click(ClickAction::Repeat(n))),
            _ => Err(ParseError::InvalidRepeatCount(t.to_string())),
        };
    }

    if t.to_lowercase().starts_with("click") {
        return Ok(ActionStep::Click(ClickAction::Phrase(t.to_string())));
    }

    if let Ok((_, (whole, frac))) = delay(t) {
        return seconds_to_millis(whole, frac)
            .map(|millis| ActionStep::Delay { millis })
            .ok_or_else(|| ParseError::DelayOutOfRange(t.to_string()));
    }

    if t.len() >= 2 && t.starts_with('"') && t.ends_with('"') {
        let content = &t[1..t.len() - 1];
        validate_text(content)?;
        return Ok(ActionStep::Text(content.to_string()));
    }

    Ok(ActionStep::KeyPress(parse_combo(t)?))
}

/// Emits a combo in send syntax: braces around anything but one alphanumeric
pub fn send_keys(combo: &KeyCombo) -> String {
    let key = emit_key(&combo.key);
    if combo.has_simple_key() {
        format!("{}{}", emit_modifiers(combo), key)
    } else {
        format!("{}{{{}}}", emit_modifiers(combo), key)
    }
}

impl ActionStep {
    /// The AutoHotkey statement for this step
    pub fn to_statement(&self) -> String {
        match self {
            ActionStep::KeyPress(combo) => format!("Send \"{}\"", send_keys(combo)),
            ActionStep::Delay { millis } => format!("Sleep {}", millis),
            ActionStep::Text(text) => format!("Send \"{}\"", text),
            ActionStep::Click(ClickAction::Phrase(phrase)) => phrase.clone(),
            ActionStep::Click(ClickAction::Repeat(n)) => format!("Click {}", n),
        }
    }

    /// Step notation that `parse_step` reads back to this step
    pub fn to_notation(&self) -> String {
        match self {
            ActionStep::Text(text) => format!("\"{}\"", text),
            ActionStep::Click(ClickAction::Repeat(n)) => format!("click x{}", n),
            other => other.to_string(),
        }
    }
}

/// Parses and encodes a step in one call
pub fn encode(text: &str) -> Result<String, ParseError> {
    parse_step(text).map(|step| step.to_statement())
}
