//! Output module tests
//!
//! - ScriptWriter: extension handling, backups, empty-script refusal
//! - ScriptTransaction: commit and rollback
