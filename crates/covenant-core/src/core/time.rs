// covenant-core/src/core/time.rs
// ============================================================================
// Module: Covenant Time Model
// Description: Canonical timestamp representation for custody records.
// Purpose: Keep evaluation records replayable by never reading the wall clock.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The kernel stamps custody steps through the [`crate::interfaces::Clock`]
//! collaborator. Hosts choose between wall-clock milliseconds and a logical
//! counter; tests use the latter so records are byte-stable.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Time Values
// ============================================================================

/// Timestamp attached to custody steps, audit events, and signals.
///
/// # Invariants
/// - Values are supplied by a clock collaborator; monotonicity is the clock's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Timestamp {
    /// Unix epoch milliseconds.
    UnixMillis(i64),
    /// Monotonic logical time value.
    Logical(u64),
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnixMillis(value) => write!(f, "unix_ms:{value}"),
            Self::Logical(value) => write!(f, "logical:{value}"),
        }
    }
}
