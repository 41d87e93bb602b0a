// covenant-cli/tests/support/mod.rs
// ============================================================================
// Module: Test Support
// Description: Shared assertions, fixtures, and binary invocation for CLI tests.
// ============================================================================
//! ## Overview
//! Shared helpers for covenant-cli integration tests.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    dead_code,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;

// ========================================================================
// Test Result Helpers
// ========================================================================

/// Standard result type used across CLI integration tests.
pub type TestResult<T = ()> = Result<T, Box<dyn Error>>;

/// Lightweight error type for test assertions.
#[derive(Debug)]
struct TestError {
    /// Human-readable failure message.
    message: String,
}

impl fmt::Display for TestError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.message)
    }
}

impl Error for TestError {}

/// Returns an error when a test condition fails.
///
/// # Errors
/// Returns a `TestError` when the condition is false.
pub fn ensure(condition: bool, message: impl Into<String>) -> TestResult {
    if condition {
        Ok(())
    } else {
        Err(Box::new(TestError {
            message: message.into(),
        }))
    }
}

// ========================================================================
// Fixtures
// ========================================================================

/// Writes `contents` to `name` inside `dir` and returns the path.
pub fn write_file(dir: &Path, name: &str, contents: &str) -> TestResult<PathBuf> {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, contents)?;
    Ok(path)
}

/// Returns the path of the shipped default corpus.
pub fn default_corpus_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../constitution/default.toml")
}

/// Returns the path of the shipped config file.
pub fn shipped_config_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../covenant.toml")
}

/// Writes a config pointing at the default corpus with the given `[audit]` body.
pub fn write_config(dir: &Path, audit: &str, extra: &str) -> TestResult<PathBuf> {
    let corpus = default_corpus_path();
    let contents = format!(
        "[corpus]\npath = '{}'\n\n[logging]\nfilter = \"warn\"\n\n[audit]\n{audit}\n{extra}",
        corpus.display()
    );
    write_file(dir, "covenant.toml", &contents)
}

// ========================================================================
// Binary Invocation
// ========================================================================

/// Runs the `covenant` binary inside `dir` with a clean environment.
pub fn covenant(dir: &Path, args: &[&str]) -> TestResult<Output> {
    let output = Command::new(env!("CARGO_BIN_EXE_covenant"))
        .args(args)
        .current_dir(dir)
        .env_remove("COVENANT_CONFIG")
        .env_remove("COVENANT_LOG")
        .output()?;
    Ok(output)
}

/// Returns stdout as UTF-8 text.
pub fn stdout_text(output: &Output) -> TestResult<String> {
    Ok(String::from_utf8(output.stdout.clone())?)
}

/// Returns stderr as UTF-8 text.
pub fn stderr_text(output: &Output) -> TestResult<String> {
    Ok(String::from_utf8(output.stderr.clone())?)
}
