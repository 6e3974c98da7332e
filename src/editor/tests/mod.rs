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

//! Editor tests
//!
//! Tests for the editing session sitting between a front end and the model

use super::*;
use crate::core::TriggerOwner;

/// Helper: Editor with one committed mapping (F1 → ctrl+c) and a toggle
fn create_test_editor() -> Editor {
    let mut editor = Editor::default();
    editor.set_control_text(ControlRole::Toggle, "ctrl+alt+p");
    editor.set_trigger("F1");
    editor.push_step("ctrl+c").unwrap();
    editor.commit().unwrap();
    editor
}

#[test]
fn test_new_editor_is_empty() {
    let editor = Editor::new(ClickModifierPolicy::Reject);

    assert_eq!(editor.script(), "");
    assert!(editor.entries().is_empty());
    assert_eq!(editor.policy(), ClickModifierPolicy::Reject);
}

#[test]
fn test_commit_adds_mapping_and_clears_draft() {
    let editor = create_test_editor();

    assert_eq!(editor.program().mappings().len(), 1);
    assert_eq!(editor.draft_trigger(), "");
    assert!(editor.draft_steps().is_empty());
    assert!(editor.script().contains("^!p:: {"));
    assert!(editor.script().contains("F1:: Send \"^c\""));
}

#[test]
fn test_control_only_commit_keeps_draft() {
    let mut editor = Editor::default();
    editor.set_control_text(ControlRole::Exit, "ctrl+alt+x");
    editor.set_trigger("F2");

    // No steps yet: controls apply, the trigger waits
    let script = editor.commit().unwrap().to_string();

    assert!(script.contains("^!x::ExitApp"));
    assert_eq!(editor.draft_trigger(), "F2");
    assert!(editor.program().mappings().is_empty());
}

#[test]
fn test_conflicting_commit_changes_nothing() {
    let mut editor = create_test_editor();
    let script_before = editor.script().to_string();

    editor.set_trigger("alt+ctrl+P");
    editor.push_step("\"hello\"").unwrap();
    let result = editor.commit();

    match result {
        Err(EditorError::Conflict(conflict)) => {
            assert_eq!(conflict.owner, TriggerOwner::Control(ControlRole::Toggle));
        }
        other => panic!("Expected Conflict, got: {:?}", other),
    }
    assert_eq!(editor.script(), script_before);
    assert_eq!(editor.draft_trigger(), "alt+ctrl+P", "Draft should survive a refused commit");
    assert_eq!(editor.draft_steps(), ["\"hello\""]);
    assert_eq!(editor.program().mappings().len(), 1);
}

#[test]
fn test_conflicting_control_rolls_back_whole_commit() {
    let mut editor = create_test_editor();

    // Exit collides with the existing F1 mapping; the new F3 mapping must not land either
    editor.set_control_text(ControlRole::Exit, "F1");
    editor.set_trigger("F3");
    editor.push_step("b").unwrap();

    assert!(matches!(editor.commit(), Err(EditorError::Conflict(_))));
    assert!(editor.program().control(ControlRole::Exit).is_none());
    assert_eq!(editor.program().mappings().len(), 1);
}

#[test]
fn test_rebinding_control_to_same_value() {
    let mut editor = create_test_editor();
    let script_before = editor.script().to_string();

    editor.set_control_text(ControlRole::Toggle, "^!p");
    assert_eq!(editor.commit().unwrap(), script_before);
}

#[test]
fn test_invalid_trigger_names_field() {
    let mut editor = Editor::default();
    editor.set_trigger("ctrl+Nope");
    editor.push_step("a").unwrap();

    match editor.commit() {
        Err(EditorError::Parse { field, .. }) => assert_eq!(field, Field::Trigger),
        other => panic!("Expected Parse error, got: {:?}", other),
    }
}

#[test]
fn test_reject_policy_refuses_modified_click() {
    let mut editor = Editor::new(ClickModifierPolicy::Reject);
    editor.set_trigger("ctrl+click");
    editor.push_step("a").unwrap();

    assert!(matches!(
        editor.commit(),
        Err(EditorError::Parse {
            source: ParseError::ModifiedClick(_),
            ..
        })
    ));
}

#[test]
fn test_push_step_validates() {
    let mut editor = Editor::default();

    let result = editor.push_step("ctrl+Nope");

    assert!(matches!(result, Err(EditorError::Parse { field: Field::Step(0), .. })));
    assert!(editor.draft_steps().is_empty());
}

#[test]
fn test_push_delay_formats_seconds() {
    let mut editor = Editor::default();

    editor.push_delay(1.0).unwrap();
    editor.push_delay(0.25).unwrap();
    editor.push_delay(0.57).unwrap();

    assert_eq!(editor.draft_steps(), ["1 s", "0.25 s", "0.57 s"]);
}

#[test]
fn test_push_delay_out_of_range() {
    let mut editor = Editor::default();

    assert!(editor.push_delay(-1.0).is_err());
    assert!(editor.push_delay(MAX_DELAY_SECS + 1.0).is_err());
    assert!(editor.push_delay(f64::NAN).is_err());
    assert!(editor.draft_steps().is_empty());
}

#[test]
fn test_push_text_quotes() {
    let mut editor = Editor::default();

    editor.push_text("hello world").unwrap();
    assert_eq!(editor.draft_steps(), ["\"hello world\""]);

    assert!(editor.push_text("two\nlines").is_err());
}

#[test]
fn test_replace_step() {
    let mut editor = Editor::default();
    editor.push_step("a").unwrap();
    editor.push_step("b").unwrap();

    editor.replace_step(1, "ctrl+v").unwrap();
    assert_eq!(editor.draft_steps(), ["a", "ctrl+v"]);

    assert!(matches!(editor.replace_step(2, "c"), Err(EditorError::NoSuchStep(2))));
    assert!(editor.replace_step(0, "ctrl+Nope").is_err());
    assert_eq!(editor.draft_steps(), ["a", "ctrl+v"]);
}

#[test]
fn test_replicate_steps_in_selection_order() {
    let mut editor = Editor::default();
    editor.push_step("a").unwrap();
    editor.push_step("b").unwrap();
    editor.push_step("c").unwrap();

    editor.replicate_steps(&[2, 0]).unwrap();

    assert_eq!(editor.draft_steps(), ["a", "b", "c", "c", "a"]);
}

#[test]
fn test_remove_steps() {
    let mut editor = Editor::default();
    for step in ["a", "b", "c", "d"] {
        editor.push_step(step).unwrap();
    }

    editor.remove_steps(&[3, 1, 1]).unwrap();
    assert_eq!(editor.draft_steps(), ["a", "c"]);
}

#[test]
fn test_remove_steps_out_of_range_removes_nothing() {
    let mut editor = Editor::default();
    editor.push_step("a").unwrap();
    editor.push_step("b").unwrap();

    assert!(matches!(editor.remove_steps(&[0, 5]), Err(EditorError::NoSuchStep(5))));
    assert_eq!(editor.draft_steps(), ["a", "b"]);
}

#[test]
fn test_remove_mapping() {
    let mut editor = create_test_editor();

    let script = editor.remove_mapping(0).unwrap().to_string();

    assert!(!script.contains("F1::"));
    assert!(script.contains("^!p:: {"), "Toggle keeps the script alive");
    assert!(matches!(editor.remove_mapping(0), Err(EditorError::NoSuchMapping(0))));
}

#[test]
fn test_remove_last_binding_empties_script() {
    let mut editor = create_test_editor();

    editor.remove_mapping(0).unwrap();
    let script = editor.remove_control(ControlRole::Toggle);

    assert_eq!(script, "");
    assert_eq!(editor.control_text(ControlRole::Toggle), "");
}

#[test]
fn test_info_alone_compiles_to_nothing() {
    let mut editor = Editor::default();
    editor.set_control_text(ControlRole::Info, "ctrl+alt+i");

    assert_eq!(editor.commit().unwrap(), "");
    assert!(editor.program().control(ControlRole::Info).is_some());
}

#[test]
fn test_set_launcher() {
    let mut editor = create_test_editor();

    let script = editor
        .set_launcher(Some(Launcher {
            path: "C:\\app.exe".to_string(),
            args: Some("-q".to_string()),
            delay: 2.0,
        }))
        .to_string();

    assert!(script.contains("Run \"C:\\app.exe -q\"\nSleep 2000\n"));

    let script = editor.set_launcher(None).to_string();
    assert!(!script.contains("Run "));
}

#[test]
fn test_entries() {
    let mut editor = create_test_editor();
    editor.set_control_text(ControlRole::Info, "ctrl+alt+i");
    editor.set_trigger("F2");
    editor.push_step("shift+Home").unwrap();
    editor.push_delay(0.5).unwrap();
    editor.push_text("done").unwrap();
    editor.commit().unwrap();

    assert_eq!(
        editor.entries(),
        vec![
            "Toggle → ctrl+alt+p".to_string(),
            "Info → ctrl+alt+i".to_string(),
            "F1 → ctrl+c".to_string(),
            "F2 → shift+Home, 0.5 s, done".to_string(),
        ]
    );
}

#[test]
fn test_reset() {
    let mut editor = create_test_editor();
    editor.set_trigger("F9");
    editor.push_step("a").unwrap();

    assert_eq!(editor.reset(), "");
    assert!(editor.program().is_empty());
    assert!(editor.entries().is_empty());
    assert_eq!(editor.draft_trigger(), "");
    assert!(editor.draft_steps().is_empty());
    assert_eq!(editor.control_text(ControlRole::Toggle), "");
}

#[test]
fn test_with_program_fills_control_fields() {
    let editor = create_test_editor();
    let reopened = Editor::with_program(editor.program().clone(), ClickModifierPolicy::Ignore);

    assert_eq!(reopened.control_text(ControlRole::Toggle), "ctrl+alt+p");
    assert_eq!(reopened.script(), editor.script());
}

#[test]
fn test_error_messages() {
    let err = EditorError::Parse {
        field: Field::Step(2),
        source: ParseError::Empty,
    };
    assert_eq!(err.to_string(), "Invalid step #3: Hotkey text is empty");

    let err = EditorError::Parse {
        field: Field::Control(ControlRole::Exit),
        source: ParseError::Empty,
    };
    assert_eq!(err.to_string(), "Invalid exit hotkey: Hotkey text is empty");
}
