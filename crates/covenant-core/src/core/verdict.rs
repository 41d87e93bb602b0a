// covenant-core/src/core/verdict.rs
// ============================================================================
// Module: Covenant L1 Verdict
// Description: Aggregate decision derived from policy outcomes.
// Purpose: Define the L1 record consumed by the veto path and the ADRA.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The [`Verdict`] is a pure function of the outcome sequence; see
//! [`crate::runtime::verdict::assemble_verdict`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::constitution::Severity;

// ============================================================================
// SECTION: Verdict Types
// ============================================================================

/// L1 decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    /// Execution may proceed.
    Allow,
    /// Execution is blocked.
    Deny,
}

impl Decision {
    /// Returns the canonical upper-case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Allow => "ALLOW",
            Self::Deny => "DENY",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome tallies by status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PolicyCounts {
    /// All recorded outcomes.
    pub total: usize,
    /// Violated outcomes.
    pub violated: usize,
    /// Satisfied outcomes.
    pub satisfied: usize,
    /// Not-applicable outcomes.
    pub not_applicable: usize,
}

/// L1 verdict.
///
/// # Invariants
/// - `decision == Deny` iff a violated outcome is `High` or `Critical`.
/// - `safe_state_triggered == (decision == Deny)`.
/// - `human_oversight_required == (severity >= Medium)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// Allow or deny.
    pub decision: Decision,
    /// Maximum violated severity, `Low` when nothing is violated.
    pub severity: Severity,
    /// Whether a human must review the decision.
    pub human_oversight_required: bool,
    /// Whether the system must enter its safe state.
    pub safe_state_triggered: bool,
    /// Short human-readable justification.
    pub rationale: String,
    /// Outcome tallies.
    pub counts: PolicyCounts,
}

impl Verdict {
    /// Returns true when the decision is deny.
    #[must_use]
    pub fn is_deny(&self) -> bool {
        self.decision == Decision::Deny
    }
}
