//! CLI entry point for ahk-keymapper
//!
//! Compiles session files into AutoHotkey v2 scripts, reports trigger
//! conflicts, builds executables and tries out hotkey / step notation.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::*;

use ahk_keymapper::builder::{BuildMode, ExeBuilder};
use ahk_keymapper::core::parser::emit_trigger;
use ahk_keymapper::core::{compile, parse_step, parse_trigger, ActionStep, ClickModifierPolicy, ConflictDetector};
use ahk_keymapper::output::ScriptWriter;
use ahk_keymapper::session::SessionFile;

#[derive(Parser)]
#[command(name = "ahk-keymapper")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Show debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a session file into a script
    Compile {
        /// Path to the session file
        session: PathBuf,

        /// Write the script here instead of printing it
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check a session file for invalid notation and hotkey conflicts
    Check {
        /// Path to the session file
        session: PathBuf,
    },

    /// List all bindings in a session file
    List {
        /// Path to the session file
        session: PathBuf,
    },

    /// Compile a session file and build an executable with Ahk2Exe
    Build {
        /// Path to the session file
        session: PathBuf,

        /// Executable to produce
        #[arg(short, long)]
        output: PathBuf,

        /// Compiler to use (default: Ahk2Exe on PATH)
        #[arg(long)]
        compiler: Option<PathBuf>,

        /// Validate inputs without running the compiler
        #[arg(long)]
        dry_run: bool,

        /// Seconds before the compiler is killed
        #[arg(long, default_value_t = 60)]
        timeout: u64,
    },

    /// Show the statement each step compiles to
    Encode {
        /// Steps in step notation (e.g. ctrl+c, "0.5 s", click x2)
        #[arg(required = true)]
        steps: Vec<String>,
    },

    /// Show how a hotkey is parsed and emitted
    Trigger {
        /// Hotkey notation (e.g. ctrl+alt+p)
        text: String,

        /// Refuse modifiers in front of a click trigger
        #[arg(long)]
        reject_click_modifiers: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Commands::Compile { session, output } => compile_session(&session, output.as_deref())?,
        Commands::Check { session } => check_session(&session)?,
        Commands::List { session } => list_session(&session)?,
        Commands::Build {
            session,
            output,
            compiler,
            dry_run,
            timeout,
        } => build_session(&session, &output, compiler, dry_run, timeout)?,
        Commands::Encode { steps } => encode_steps(&steps),
        Commands::Trigger {
            text,
            reject_click_modifiers,
        } => show_trigger(&text, reject_click_modifiers)?,
    }

    Ok(())
}

/// Expands a leading `~` in a user-supplied path
fn expand(path: &Path) -> anyhow::Result<PathBuf> {
    let text = path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid path encoding"))?;
    Ok(PathBuf::from(shellexpand::tilde(text).as_ref()))
}

fn load_session(path: &Path) -> anyhow::Result<(PathBuf, SessionFile)> {
    let path = expand(path)?;
    let session = SessionFile::load(&path)
        .with_context(|| format!("Failed to load session {}", path.display()))?;
    Ok((path, session))
}

/// Compile a session and print or write the script
fn compile_session(session_path: &Path, output: Option<&Path>) -> anyhow::Result<()> {
    let (_, session) = load_session(session_path)?;
    let script = compile(&session.into_program()?);

    let Some(output) = output else {
        if !script.is_empty() {
            println!("{}", script);
        }
        return Ok(());
    };

    if script.is_empty() {
        println!("{} Nothing to write: no mappings, toggle or exit hotkey", "⚠".yellow());
        return Ok(());
    }

    let writer = ScriptWriter::new(expand(output)?)?;
    let backup = writer.write(&script)?;

    println!("{} Wrote {}", "✓".green(), writer.script_path().display());
    if let Some(backup) = backup {
        println!("  {} {}", "backup:".dimmed(), backup.display());
    }

    Ok(())
}

/// Check a session for notation errors and conflicts
fn check_session(session_path: &Path) -> anyhow::Result<()> {
    let (path, session) = load_session(session_path)?;

    println!("{} Checking session: {}", "→".cyan(), path.display());

    let (triggers, errors) = session.triggers();

    let mut detector = ConflictDetector::new();
    for (owner, combo) in triggers {
        detector.add_trigger(combo, owner);
    }

    println!("{} Found {} hotkeys\n", "✓".green(), detector.total_triggers());

    let conflicts = detector.find_conflicts();

    for error in &errors {
        println!("{} {}", "✗".red().bold(), error);
    }
    if !errors.is_empty() {
        println!();
    }

    if conflicts.is_empty() && errors.is_empty() {
        println!("{} {}", "✓".green().bold(), "No conflicts detected!".bold());
        return Ok(());
    }

    if !conflicts.is_empty() {
        println!(
            "{} Found {} conflict{}:\n",
            "✗".red().bold(),
            conflicts.len(),
            if conflicts.len() == 1 { "" } else { "s" }
        );

        for (i, conflict) in conflicts.iter().enumerate() {
            println!(
                "{} {}",
                format!("Conflict {}", i + 1).yellow().bold(),
                format!("{}", conflict.key_combo).cyan()
            );

            for (idx, owner) in conflict.owners.iter().enumerate() {
                println!("  {} {}", format!("{}.", idx + 1).dimmed(), owner);
            }
            println!();
        }
    }

    std::process::exit(1);
}

/// List every binding of a session
fn list_session(session_path: &Path) -> anyhow::Result<()> {
    let (path, session) = load_session(session_path)?;
    let editor = session.into_editor()?;

    println!("{}", format!("Bindings from: {}\n", path.display()).bold());

    let entries = editor.entries();
    for entry in &entries {
        match entry.split_once(" → ") {
            Some((trigger, steps)) => println!("{} → {}", trigger.cyan().bold(), steps.green()),
            None => println!("{}", entry),
        }
    }

    if let Some(launcher) = editor.program().launcher() {
        println!("\n{} {}", "Launch:".magenta(), launcher.path);
    }

    println!(
        "\n{} Total: {} mappings",
        "✓".green(),
        editor.program().mappings().len()
    );

    Ok(())
}

/// Compile a session and hand the script to Ahk2Exe
fn build_session(
    session_path: &Path,
    output: &Path,
    compiler: Option<PathBuf>,
    dry_run: bool,
    timeout: u64,
) -> anyhow::Result<()> {
    let (_, session) = load_session(session_path)?;
    let script = compile(&session.into_program()?);

    let mode = if dry_run { BuildMode::DryRun } else { BuildMode::Live };
    let builder = match compiler {
        Some(compiler) => ExeBuilder::new(expand(&compiler)?, mode),
        None => ExeBuilder::locate(mode)?,
    }
    .with_timeout(Duration::from_secs(timeout));

    let output = expand(output)?;
    builder.build(&script, &output)?;

    if dry_run {
        println!(
            "{} Dry run: would build {} with {}",
            "→".cyan(),
            output.display(),
            builder.compiler().display()
        );
    } else {
        println!("{} Built {}", "✓".green(), output.display());
    }

    Ok(())
}

/// Print the statement for each step
fn encode_steps(steps: &[String]) {
    let mut failed = false;

    for step in steps {
        match parse_step(step) {
            Ok(action) => {
                let statement = action.to_statement();
                match &action {
                    ActionStep::Click(click) => {
                        println!("{} → {} {}", step.cyan(), statement, format!("({})", click.label()).dimmed())
                    }
                    _ => println!("{} → {}", step.cyan(), statement),
                }
            }
            Err(e) => {
                failed = true;
                println!("{} {} {}", "✗".red().bold(), step.cyan(), e);
            }
        }
    }

    if failed {
        std::process::exit(1);
    }
}

/// Print the parsed and emitted form of a hotkey
fn show_trigger(text: &str, reject_click_modifiers: bool) -> anyhow::Result<()> {
    let policy = if reject_click_modifiers {
        ClickModifierPolicy::Reject
    } else {
        ClickModifierPolicy::Ignore
    };

    let combo = parse_trigger(text, policy)?;
    println!("{} → {}", format!("{}", combo).cyan().bold(), emit_trigger(&combo).green());

    Ok(())
}
