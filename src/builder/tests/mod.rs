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

//! Builder tests
//!
//! DryRun tests never spawn anything. Live tests run a shell script that
//! stands in for Ahk2Exe, so they are Unix-only.

use super::*;
use std::ffi::OsString;
use tempfile::TempDir;

const SCRIPT: &str = "#HotIf scriptEnabled\nF1:: Send \"^c\"\n#HotIf";

// ============================================================================
// DryRun Mode Tests
// ============================================================================

#[test]
fn test_dry_run_accepts_valid_input() {
    let builder = ExeBuilder::new(PathBuf::from("/nonexistent/Ahk2Exe.exe"), BuildMode::DryRun);

    // The compiler does not exist, but DryRun never touches it
    assert!(builder.build(SCRIPT, Path::new("keys.exe")).is_ok());
}

#[test]
fn test_dry_run_refuses_empty_script() {
    let builder = ExeBuilder::new(PathBuf::from("Ahk2Exe.exe"), BuildMode::DryRun);

    let result = builder.build("", Path::new("keys.exe"));
    assert!(matches!(result, Err(BuildError::EmptyScript)));
}

#[test]
fn test_dry_run_refuses_output_without_file_name() {
    let builder = ExeBuilder::new(PathBuf::from("Ahk2Exe.exe"), BuildMode::DryRun);

    let result = builder.build(SCRIPT, Path::new("/"));
    assert!(matches!(result, Err(BuildError::InvalidOutput(_))));
}

#[test]
fn test_dry_run_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("keys.exe");
    let builder = ExeBuilder::new(PathBuf::from("Ahk2Exe.exe"), BuildMode::DryRun);

    builder.build(SCRIPT, &output).unwrap();
    assert!(!output.exists());
}

#[test]
fn test_default_timeout() {
    let builder = ExeBuilder::new(PathBuf::from("Ahk2Exe.exe"), BuildMode::Live);
    assert_eq!(builder.timeout(), DEFAULT_TIMEOUT);

    let builder = builder.with_timeout(Duration::from_secs(5));
    assert_eq!(builder.timeout(), Duration::from_secs(5));
    assert_eq!(builder.mode(), BuildMode::Live);
}

// ============================================================================
// PATH Lookup Tests
// ============================================================================

#[test]
fn test_find_on_path_picks_first_directory() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    fs::write(first.path().join("Ahk2Exe.exe"), "").unwrap();
    fs::write(second.path().join("Ahk2Exe.exe"), "").unwrap();

    let path_var = env::join_paths([first.path(), second.path()]).unwrap();

    assert_eq!(
        find_on_path(&path_var, COMPILER_NAMES),
        Some(first.path().join("Ahk2Exe.exe"))
    );
}

#[test]
fn test_find_on_path_tries_every_name() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("Ahk2Exe"), "").unwrap();

    let path_var = env::join_paths([dir.path()]).unwrap();

    assert_eq!(find_on_path(&path_var, COMPILER_NAMES), Some(dir.path().join("Ahk2Exe")));
}

#[test]
fn test_find_on_path_ignores_directories() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("Ahk2Exe.exe")).unwrap();

    let path_var = env::join_paths([dir.path()]).unwrap();

    assert_eq!(find_on_path(&path_var, COMPILER_NAMES), None);
}

#[test]
fn test_find_on_path_empty() {
    assert_eq!(find_on_path(&OsString::new(), COMPILER_NAMES), None);
}

// ============================================================================
// Live Mode Tests (fake compiler)
// ============================================================================

#[cfg(unix)]
mod live {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    /// Writes an executable shell script standing in for Ahk2Exe.
    /// It receives `/in <script> /out <target>`, so `$2` and `$4`.
    fn fake_compiler(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("Ahk2Exe");
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    /// Runs a build, retrying while the fresh script is still busy.
    /// A fork in a parallel test can hold its write handle open (ETXTBSY).
    fn run(builder: ExeBuilder, output: &Path) -> Result<(), BuildError> {
        for _ in 0..10 {
            match builder.build(SCRIPT, output) {
                Err(BuildError::Spawn { source, .. }) if source.raw_os_error() == Some(26) => {
                    std::thread::sleep(Duration::from_millis(50));
                }
                other => return other,
            }
        }
        builder.build(SCRIPT, output)
    }

    #[test]
    fn test_live_build_passes_script_and_target() {
        let temp_dir = TempDir::new().unwrap();
        let compiler = fake_compiler(temp_dir.path(), r#"[ "$1" = "/in" ] && [ "$3" = "/out" ] && cp "$2" "$4""#);
        let output = temp_dir.path().join("keys.exe");

        run(ExeBuilder::new(compiler, BuildMode::Live), &output).unwrap();

        assert_eq!(fs::read_to_string(&output).unwrap(), SCRIPT);
    }

    #[test]
    fn test_live_build_uses_temp_ahk_name() {
        let temp_dir = TempDir::new().unwrap();
        let compiler = fake_compiler(temp_dir.path(), r#"basename "$2" > "$4""#);
        let output = temp_dir.path().join("keys.exe");

        run(ExeBuilder::new(compiler, BuildMode::Live), &output).unwrap();

        assert_eq!(fs::read_to_string(&output).unwrap().trim(), TEMP_SCRIPT_NAME);
    }

    #[test]
    fn test_live_build_failure_returns_stderr_verbatim() {
        let temp_dir = TempDir::new().unwrap();
        let compiler = fake_compiler(
            temp_dir.path(),
            "echo 'progress' ; echo 'Error at line 3: Missing \"}\"' >&2 ; exit 2",
        );

        let result = run(ExeBuilder::new(compiler, BuildMode::Live), &temp_dir.path().join("keys.exe"));

        match result {
            Err(BuildError::Failed { code, diagnostic }) => {
                assert_eq!(code, Some(2));
                assert_eq!(diagnostic, "Error at line 3: Missing \"}\"\n");
            }
            other => panic!("Expected Failed, got: {:?}", other),
        }
    }

    #[test]
    fn test_live_build_failure_falls_back_to_stdout() {
        let temp_dir = TempDir::new().unwrap();
        let compiler = fake_compiler(temp_dir.path(), "echo 'Syntax error' ; exit 1");

        let result = run(ExeBuilder::new(compiler, BuildMode::Live), &temp_dir.path().join("keys.exe"));

        match result {
            Err(BuildError::Failed { diagnostic, .. }) => assert_eq!(diagnostic, "Syntax error\n"),
            other => panic!("Expected Failed, got: {:?}", other),
        }
    }

    #[test]
    fn test_live_build_success_without_output() {
        let temp_dir = TempDir::new().unwrap();
        let compiler = fake_compiler(temp_dir.path(), "exit 0");
        let output = temp_dir.path().join("keys.exe");

        let result = run(ExeBuilder::new(compiler, BuildMode::Live), &output);
        assert!(matches!(result, Err(BuildError::MissingOutput(p)) if p == output));
    }

    #[test]
    fn test_live_build_times_out() {
        let temp_dir = TempDir::new().unwrap();
        let compiler = fake_compiler(temp_dir.path(), "sleep 10");

        let builder = ExeBuilder::new(compiler, BuildMode::Live).with_timeout(Duration::from_millis(200));
        let result = run(builder, &temp_dir.path().join("keys.exe"));

        assert!(matches!(result, Err(BuildError::TimedOut(_))));
    }

    #[test]
    fn test_live_build_missing_compiler() {
        let temp_dir = TempDir::new().unwrap();
        let compiler = temp_dir.path().join("does-not-exist");

        let result = ExeBuilder::new(compiler, BuildMode::Live).build(SCRIPT, &temp_dir.path().join("keys.exe"));
        assert!(matches!(result, Err(BuildError::Spawn { .. })));
    }
}
