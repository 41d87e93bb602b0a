// covenant-core/src/runtime/verdict.rs
// ============================================================================
// Module: Covenant Verdict Assembler
// Description: L1 verdict derivation from policy outcomes.
// Purpose: Collapse the outcome sequence into a single allow/deny decision.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! The verdict is a pure function of the outcome sequence. Any violated
//! outcome at `High` or `Critical` denies; the aggregate severity is the
//! highest violated severity.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::constitution::PolicyStatus;
use crate::core::constitution::Severity;
use crate::core::outcome::PolicyOutcome;
use crate::core::verdict::Decision;
use crate::core::verdict::PolicyCounts;
use crate::core::verdict::Verdict;

// ============================================================================
// SECTION: Verdict Assembly
// ============================================================================

/// Derives the L1 verdict from an outcome sequence.
#[must_use]
pub fn assemble_verdict(outcomes: &[PolicyOutcome]) -> Verdict {
    let counts = count_outcomes(outcomes);
    let worst = outcomes.iter().filter(|outcome| outcome.is_violated()).map(|o| o.severity).max();
    let severity = worst.unwrap_or(Severity::Low);
    let decision = if severity.is_blocking() { Decision::Deny } else { Decision::Allow };

    let rationale = match (decision, worst) {
        (Decision::Deny, _) => format!(
            "{} blocking violation(s); highest severity {severity}",
            outcomes.iter().filter(|outcome| outcome.is_blocking()).count()
        ),
        (Decision::Allow, Some(_)) => format!(
            "{} non-blocking violation(s); highest severity {severity}",
            counts.violated
        ),
        (Decision::Allow, None) => "no violations recorded".to_string(),
    };

    Verdict {
        decision,
        severity,
        human_oversight_required: severity >= Severity::Medium,
        safe_state_triggered: decision == Decision::Deny,
        rationale,
        counts,
    }
}

/// Tallies outcomes by status.
fn count_outcomes(outcomes: &[PolicyOutcome]) -> PolicyCounts {
    let mut counts = PolicyCounts {
        total: outcomes.len(),
        ..PolicyCounts::default()
    };
    for outcome in outcomes {
        match outcome.status {
            PolicyStatus::Violated => counts.violated += 1,
            PolicyStatus::Satisfied => counts.satisfied += 1,
            PolicyStatus::NotApplicable => counts.not_applicable += 1,
        }
    }
    counts
}
