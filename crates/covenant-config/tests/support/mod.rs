// covenant-config/tests/support/mod.rs
// ============================================================================
// Module: Test Support
// Description: Shared assertions and file fixtures for config tests.
// ============================================================================
//! ## Overview
//! Shared helpers for covenant-config integration tests.

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

// ========================================================================
// Test Result Helpers
// ========================================================================

/// Standard result type used across config integration tests.
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
// File Fixtures
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

/// Minimal two-rule corpus used by loader tests.
pub const MINIMAL_CORPUS: &str = r#"
[constitution]
name = "minimal"
version = "0.1.0"

[[domains]]
id = "privacy"

[[articles]]
id = "GDPR_ART_5"
domain = "privacy"
regime = "GDPR"
default_severity = "HIGH"

[[rules]]
id = "GDPR_5_1_A"
article = "GDPR_ART_5"
when = 'input.personal_data_present == true and input.lawful_basis == "NONE"'
status = "VIOLATED"
impact = "No lawful basis."

[[rules]]
id = "GDPR_5_1_B"
article = "GDPR_ART_5"
label = "Lawful basis recorded"
when = 'input.personal_data_present == true and input.lawful_basis != "NONE"'
status = "SATISFIED"
severity = "LOW"
"#;
