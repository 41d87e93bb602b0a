// covenant-core/src/runtime/veto.rs
// ============================================================================
// Module: Covenant Veto Path
// Description: L7 veto computation from the verdict and outcomes.
// Purpose: Block execution with a corrective signal on blocking violations.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! [`compute_veto`] is the only constructor of [`VetoResult`]. It reads the
//! L1 verdict and outcomes and nothing else; in particular it has no access
//! to drift state. Emission of the veto audit event is owned by the kernel.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::outcome::PolicyOutcome;
use crate::core::verdict::Verdict;
use crate::core::veto::BLOCKED_AT_PRE_EXECUTION;
use crate::core::veto::CORRECTIVE_INSTRUCTION;
use crate::core::veto::CORRECTIVE_SIGNAL_TYPE;
use crate::core::veto::CorrectiveSignal;
use crate::core::veto::CorrectiveViolation;
use crate::core::veto::Escalation;
use crate::core::veto::NO_ALLOW_ON_HIGH_CLAUSE;
use crate::core::veto::REPLAN_AND_RESUBMIT;
use crate::core::veto::VetoBasisEntry;
use crate::core::veto::VetoCategory;
use crate::core::veto::VetoResult;

// ============================================================================
// SECTION: Veto Computation
// ============================================================================

/// Computes the L7 veto result.
///
/// # Invariants
/// - `veto_triggered` iff the verdict denies.
/// - A triggered veto always carries a non-empty corrective signal.
#[must_use]
pub fn compute_veto(verdict: &Verdict, outcomes: &[PolicyOutcome]) -> VetoResult {
    let triggered = verdict.is_deny();
    let escalation = if triggered || verdict.human_oversight_required {
        Escalation::HumanReviewer
    } else {
        Escalation::None
    };
    let basis: Vec<VetoBasisEntry> =
        outcomes.iter().filter(|outcome| outcome.is_blocking()).map(basis_entry).collect();

    if !triggered {
        return VetoResult::new(false, VetoCategory::None, Vec::new(), None, escalation);
    }

    let category = veto_category(outcomes);
    let signal = CorrectiveSignal {
        signal_type: CORRECTIVE_SIGNAL_TYPE,
        action_required: REPLAN_AND_RESUBMIT,
        blocked_at: BLOCKED_AT_PRE_EXECUTION,
        violations: basis.iter().map(corrective_violation).collect(),
        instruction: CORRECTIVE_INSTRUCTION,
    };
    VetoResult::new(true, category, basis, Some(signal), escalation)
}

/// Picks the category of the first highest-severity violated outcome.
fn veto_category(outcomes: &[PolicyOutcome]) -> VetoCategory {
    let mut chosen: Option<&PolicyOutcome> = None;
    for outcome in outcomes.iter().filter(|outcome| outcome.is_violated()) {
        if chosen.is_none_or(|current| outcome.severity > current.severity) {
            chosen = Some(outcome);
        }
    }
    chosen.map_or(VetoCategory::ConstitutionalBlock, |outcome| {
        VetoCategory::for_regime(&outcome.regime)
    })
}

/// Builds a basis entry for a blocking outcome.
fn basis_entry(outcome: &PolicyOutcome) -> VetoBasisEntry {
    VetoBasisEntry {
        article_id: outcome.article_id.clone(),
        rule_id: outcome.rule_id.clone(),
        severity: outcome.severity,
        regime: outcome.regime.clone(),
        constitutional_clause: NO_ALLOW_ON_HIGH_CLAUSE,
        explanation: outcome.impact.clone(),
    }
}

/// Builds the remediation item for a basis entry.
fn corrective_violation(entry: &VetoBasisEntry) -> CorrectiveViolation {
    CorrectiveViolation {
        article: entry.article_id.clone(),
        rule: entry.rule_id.clone(),
        severity: entry.severity,
        reason: entry.explanation.clone(),
        required_change: format!(
            "Revise the request so rule {} of article {} is no longer violated.",
            entry.rule_id, entry.article_id
        ),
    }
}
