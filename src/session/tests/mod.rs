//! Session file tests

use super::*;
use std::fs;
use tempfile::TempDir;

use crate::core::{compile, ConflictDetector};

fn trigger(text: &str) -> KeyCombo {
    parse_trigger(text, ClickModifierPolicy::Ignore).unwrap()
}

const SESSION: &str = r#"
[options]
click_modifiers = "ignore"

[controls]
toggle = "ctrl+alt+p"
exit = "ctrl+alt+x"

[launch]
path = "C:\\Tools\\app.exe"
args = "--quiet"
delay = 1.5

[[mapping]]
trigger = "F1"
steps = ["ctrl+c", "0.5 s", "\"done\""]

[[mapping]]
trigger = "right click"
steps = ["click x2"]
"#;

#[test]
fn test_parse_session() {
    let session = SessionFile::from_toml_str(SESSION).unwrap();

    assert_eq!(session.options.click_modifiers, ClickModifierPolicy::Ignore);
    assert_eq!(session.controls.toggle.as_deref(), Some("ctrl+alt+p"));
    assert_eq!(session.controls.info, None);
    assert_eq!(session.mappings.len(), 2);
    assert_eq!(session.mappings[0].steps, vec!["ctrl+c", "0.5 s", "\"done\""]);

    let launch = session.launch.unwrap();
    assert_eq!(launch.path, "C:\\Tools\\app.exe");
    assert_eq!(launch.delay_millis(), 1500);
}

#[test]
fn test_empty_session_is_default() {
    let session = SessionFile::from_toml_str("").unwrap();
    assert_eq!(session, SessionFile::default());
    assert!(session.into_program().unwrap().is_empty());
}

#[test]
fn test_unknown_policy_is_syntax_error() {
    let result = SessionFile::from_toml_str("[options]\nclick_modifiers = \"sometimes\"\n");
    assert!(matches!(result, Err(SessionError::Syntax(_))));
}

#[test]
fn test_toml_round_trip() {
    let session = SessionFile::from_toml_str(SESSION).unwrap();

    let text = session.to_toml_string().unwrap();
    let reparsed = SessionFile::from_toml_str(&text).unwrap();

    assert_eq!(reparsed, session);
}

#[test]
fn test_into_program() {
    let session = SessionFile::from_toml_str(SESSION).unwrap();
    let program = session.into_program().unwrap();

    assert_eq!(program.mappings().len(), 2);
    assert_eq!(program.mappings()[1].trigger.key, "RButton");
    assert!(program.control(ControlRole::Toggle).is_some());
    assert!(program.control(ControlRole::Info).is_none());
    assert!(program.launcher().is_some());
}

#[test]
fn test_program_round_trip_compiles_identically() {
    let session = SessionFile::from_toml_str(SESSION).unwrap();
    let program = session.into_program().unwrap();

    let rewritten = SessionFile::from_program(&program, session.options.clone());
    let again = rewritten.into_program().unwrap();

    assert_eq!(compile(&again), compile(&program));
}

#[test]
fn test_conflicting_mapping_is_refused() {
    let session = SessionFile::from_toml_str(
        r#"
[controls]
toggle = "ctrl+alt+p"

[[mapping]]
trigger = "alt+ctrl+P"
steps = ["a"]
"#,
    )
    .unwrap();

    match session.into_program() {
        Err(SessionError::Conflict(conflict)) => {
            assert_eq!(conflict.owner, TriggerOwner::Control(ControlRole::Toggle));
        }
        other => panic!("Expected Conflict, got: {:?}", other),
    }
}

#[test]
fn test_bad_step_names_mapping() {
    let session = SessionFile::from_toml_str(
        r#"
[[mapping]]
trigger = "F1"
steps = ["a"]

[[mapping]]
trigger = "F2"
steps = ["ctrl+NotAKey"]
"#,
    )
    .unwrap();

    let err = session.into_program().unwrap_err();
    assert!(matches!(err, SessionError::Step { mapping: 1, .. }));
    assert!(err.to_string().starts_with("Mapping #2"), "got: {}", err);
}

#[test]
fn test_bad_trigger_names_owner() {
    let session = SessionFile::from_toml_str("[controls]\nexit = \"ctrl+Bogus\"\n").unwrap();

    let err = session.into_program().unwrap_err();
    assert!(matches!(
        err,
        SessionError::Trigger {
            owner: TriggerOwner::Control(ControlRole::Exit),
            ..
        }
    ));
}

#[test]
fn test_mapping_without_steps_is_skipped() {
    let session = SessionFile::from_toml_str("[[mapping]]\ntrigger = \"F1\"\n").unwrap();

    let program = session.into_program().unwrap();
    assert!(program.mappings().is_empty());
}

#[test]
fn test_triggers_skip_mappings_without_steps() {
    let session = SessionFile::from_toml_str(
        r#"
[controls]
toggle = "F1"

[[mapping]]
trigger = "F1"
"#,
    )
    .unwrap();

    let (triggers, errors) = session.triggers();
    assert_eq!(triggers, vec![(TriggerOwner::Control(ControlRole::Toggle), trigger("F1"))]);
    assert!(errors.is_empty());

    // check and compile agree: no conflict either way
    let program = session.into_program().unwrap();
    assert!(program.mappings().is_empty());
}

#[test]
fn test_conflict_names_mapping_by_file_position() {
    let session = SessionFile::from_toml_str(
        r#"
[[mapping]]
trigger = "F9"

[[mapping]]
trigger = "F1"
steps = ["a"]

[[mapping]]
trigger = "F1"
steps = ["b"]
"#,
    )
    .unwrap();

    let (triggers, _) = session.triggers();
    let owners: Vec<_> = triggers.into_iter().map(|(owner, _)| owner).collect();
    assert_eq!(owners, vec![TriggerOwner::Mapping(1), TriggerOwner::Mapping(2)]);

    match session.into_program() {
        Err(SessionError::Conflict(conflict)) => {
            assert_eq!(conflict.owner, TriggerOwner::Mapping(1));
            assert_eq!(conflict.to_string(), "Hotkey 'F1' is already used by mapping #2");
        }
        other => panic!("Expected Conflict, got: {:?}", other),
    }
}

#[test]
fn test_blank_control_is_unset() {
    let session = SessionFile::from_toml_str("[controls]\ninfo = \"  \"\n").unwrap();

    assert_eq!(session.controls.iter().count(), 0);
}

#[test]
fn test_triggers_reports_every_conflict() {
    let session = SessionFile::from_toml_str(
        r#"
[controls]
toggle = "F1"

[[mapping]]
trigger = "F1"
steps = ["a"]

[[mapping]]
trigger = "shift+F2"
steps = ["b"]

[[mapping]]
trigger = "+F2"
steps = ["c"]

[[mapping]]
trigger = "ctrl+Bogus"
steps = ["d"]
"#,
    )
    .unwrap();

    let (triggers, errors) = session.triggers();
    assert_eq!(triggers.len(), 4);
    assert_eq!(errors.len(), 1);

    let mut detector = ConflictDetector::new();
    for (owner, combo) in triggers {
        detector.add_trigger(combo, owner);
    }

    let conflicts = detector.find_conflicts();
    assert_eq!(conflicts.len(), 2);
    assert_eq!(
        conflicts[0].owners,
        vec![TriggerOwner::Control(ControlRole::Toggle), TriggerOwner::Mapping(0)]
    );
    assert_eq!(
        conflicts[1].owners,
        vec![TriggerOwner::Mapping(1), TriggerOwner::Mapping(2)]
    );
}

#[test]
fn test_load_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("missing.toml");

    assert!(matches!(SessionFile::load(&path), Err(SessionError::NotFound(p)) if p == path));
}

#[test]
fn test_load_and_open_editor() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("session.toml");
    fs::write(&path, SESSION).unwrap();

    let editor = SessionFile::load(&path).unwrap().into_editor().unwrap();

    assert_eq!(editor.control_text(ControlRole::Toggle), "ctrl+alt+p");
    assert_eq!(editor.entries().len(), 4);
    assert!(editor.script().starts_with("; generated by ahk-keymapper"));
}
