// covenant-core/src/runtime/retry.rs
// ============================================================================
// Module: Covenant Retry Policy
// Description: Bounded retry for collaborator calls.
// Purpose: Absorb transient collaborator failures without touching L1 or L7.
// Dependencies: tracing
// ============================================================================

//! ## Overview
//! Collaborator calls (feed reads, recalibration requests, audit emission,
//! ADRA publication) are retried a bounded number of times. The policy never
//! sleeps; pacing belongs to the collaborator.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Display;

use tracing::error;
use tracing::warn;

// ============================================================================
// SECTION: Retry Policy
// ============================================================================

/// Default attempt budget.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Bounded retry policy.
///
/// # Invariants
/// - At least one attempt is always made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum attempts, including the first.
    max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}

/// Result of a retried call.
#[derive(Debug)]
pub struct Attempted<T, E> {
    /// Final outcome.
    pub result: Result<T, E>,
    /// Attempts made.
    pub attempts: u32,
}

impl RetryPolicy {
    /// Creates a policy; zero is raised to one attempt.
    #[must_use]
    pub const fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: if max_attempts == 0 { 1 } else { max_attempts },
        }
    }

    /// Returns the attempt budget.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Runs `call` until it succeeds or the budget is spent.
    pub fn run<T, E, F>(&self, operation: &str, mut call: F) -> Attempted<T, E>
    where
        E: Display,
        F: FnMut() -> Result<T, E>,
    {
        let mut attempts = 0;
        loop {
            attempts += 1;
            match call() {
                Ok(value) => {
                    return Attempted {
                        result: Ok(value),
                        attempts,
                    };
                }
                Err(err) if attempts < self.max_attempts => {
                    warn!(operation, attempt = attempts, error = %err, "collaborator call failed");
                }
                Err(err) => {
                    error!(operation, attempts, error = %err, "collaborator retries exhausted");
                    return Attempted {
                        result: Err(err),
                        attempts,
                    };
                }
            }
        }
    }
}
