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

//! AutoHotkey v2 script compiler
//!
//! Walks a `Program` and emits the complete script from scratch every time.
//! Output is a pure function of the program: compiling an unchanged program
//! twice yields byte-identical text.
//!
//! # Layout
//! 1. Preamble (header, `#Requires`, `scriptEnabled` / `infoVisible` globals)
//! 2. Launcher block, if set
//! 3. Toggle block, if bound
//! 4. Exit block, if bound
//! 5. Info block, if bound
//! 6. `#HotIf scriptEnabled` region holding every mapping, closed by `#HotIf`
//!
//! A program without mappings, toggle or exit compiles to the empty string,
//! which collaborators read as "nothing to persist".

use crate::core::parser::emit_trigger;
use crate::core::program::Program;
use crate::core::types::{ActionStep, ControlRole, Launcher, Mapping};

/// First line of every generated script
pub const HEADER: &str = "; generated by ahk-keymapper";

/// Name of the runtime flag that guards all mappings
pub const ENABLED_FLAG: &str = "scriptEnabled";

/// Name of the runtime flag tracking the info tooltip
pub const INFO_FLAG: &str = "infoVisible";

/// How long the toggle status tooltip stays up
pub const TOGGLE_TOOLTIP_MS: u32 = 1000;

/// How long the info tooltip stays up
pub const INFO_TOOLTIP_MS: u32 = 5000;

/// Compiles a program into script text
///
/// # Example
/// ```
/// use ahk_keymapper::core::{compile, Program};
///
/// assert_eq!(compile(&Program::new()), "");
/// ```
pub fn compile(program: &Program) -> String {
    if program.is_empty() {
        return String::new();
    }

    let mut lines: Vec<String> = vec![
        HEADER.to_string(),
        "#Requires AutoHotkey v2.0+".to_string(),
        String::new(),
        format!("global {} := true", ENABLED_FLAG),
        format!("global {} := false", INFO_FLAG),
        String::new(),
    ];

    if let Some(launcher) = program.launcher() {
        lines.extend(launcher_block(launcher));
    }

    if let Some(combo) = program.control(ControlRole::Toggle) {
        let trigger = emit_trigger(combo);
        lines.extend([
            format!("{}:: {{", trigger),
            format!("    global {}", ENABLED_FLAG),
            format!("    {0} := !{0}", ENABLED_FLAG),
            format!("    ToolTip({}?\"ENABLED\":\"DISABLED\")", ENABLED_FLAG),
            format!("    SetTimer(() => ToolTip(), -{})", TOGGLE_TOOLTIP_MS),
            "}".to_string(),
            String::new(),
        ]);
    }

    if let Some(combo) = program.control(ControlRole::Exit) {
        lines.push(format!("{}::ExitApp", emit_trigger(combo)));
        lines.push(String::new());
    }

    if let Some(combo) = program.control(ControlRole::Info) {
        let tooltip = info_tooltip(program.mappings());
        lines.extend([
            format!("{}:: {{", emit_trigger(combo)),
            format!("    global {}", INFO_FLAG),
            format!("    if {} {{", INFO_FLAG),
            "        ToolTip()".to_string(),
            format!("        {} := false", INFO_FLAG),
            "    } else {".to_string(),
            format!("        ToolTip(\"{}\")", tooltip),
            format!("        SetTimer(() => ToolTip(), -{})", INFO_TOOLTIP_MS),
            format!("        {} := true", INFO_FLAG),
            "    }".to_string(),
            "}".to_string(),
            String::new(),
        ]);
    }

    lines.push(format!("#HotIf {}", ENABLED_FLAG));
    for mapping in program.mappings() {
        lines.extend(mapping_block(mapping));
    }
    lines.push("#HotIf".to_string());

    lines.join("\n")
}

/// `Run` plus `Sleep` for the startup launcher
fn launcher_block(launcher: &Launcher) -> Vec<String> {
    let command_line = match launcher.args.as_deref().map(str::trim) {
        Some(args) if !args.is_empty() => format!("{} {}", launcher.path, args),
        _ => launcher.path.clone(),
    };

    vec![
        format!("Run \"{}\"", command_line),
        format!("Sleep {}", launcher.delay_millis()),
        String::new(),
    ]
}

/// One mapping: inline for a single step, a braced block otherwise
fn mapping_block(mapping: &Mapping) -> Vec<String> {
    let trigger = emit_trigger(&mapping.trigger);
    let body: Vec<String> = mapping.steps.iter().map(ActionStep::to_statement).collect();

    if let [only] = body.as_slice() {
        return vec![format!("{}:: {}", trigger, only)];
    }

    let mut lines = Vec::with_capacity(body.len() + 3);
    lines.push(format!("{}::", trigger));
    lines.push("{".to_string());
    lines.extend(body.into_iter().map(|statement| format!("    {}", statement)));
    lines.push("}".to_string());
    lines
}

/// Tooltip text listing every mapping, `` `n ``-separated
///
/// Literal text is shown without its quotes. Embedded double quotes are
/// escaped so the tooltip stays one string literal.
fn info_tooltip(mappings: &[Mapping]) -> String {
    let mut tooltip = String::from("Info:");
    for mapping in mappings {
        tooltip.push_str("`n");
        tooltip.push_str(&mapping.to_string().replace('"', "`\""));
    }
    tooltip
}
