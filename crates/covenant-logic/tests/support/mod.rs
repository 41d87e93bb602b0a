// covenant-logic/tests/support/mod.rs
// ============================================================================
// Module: Test Support
// Description: Shared result helpers and a flag-set predicate for logic tests.
// ============================================================================
//! ## Overview
//! Shared test helpers for consistent Result-based assertions.

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

use std::cell::Cell;
use std::error::Error;
use std::fmt;

use covenant_logic::PredicateEval;

// ========================================================================
// Test Result Helpers
// ========================================================================

/// Standard result type used across logic integration tests.
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
// Flag Predicate
// ========================================================================

/// Context for [`Flag`]: a bit set plus a counter of evaluated leaves.
pub struct Flags {
    /// Active bits.
    pub bits: u64,
    /// Number of predicate evaluations performed.
    pub evaluated: Cell<usize>,
}

impl Flags {
    /// Creates a context with the given bits set.
    pub const fn new(bits: u64) -> Self {
        Self {
            bits,
            evaluated: Cell::new(0),
        }
    }
}

/// Predicate that holds when its bit is set in the context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Flag(pub u8);

impl PredicateEval for Flag {
    type Context<'a> = Flags;

    fn eval(&self, ctx: &Self::Context<'_>) -> bool {
        ctx.evaluated.set(ctx.evaluated.get() + 1);
        ctx.bits & (1u64 << self.0) != 0
    }
}
