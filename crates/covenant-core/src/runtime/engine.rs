// covenant-core/src/runtime/engine.rs
// ============================================================================
// Module: Covenant Rule Engine
// Description: Two-pass rule evaluation over a constitution snapshot.
// Purpose: Produce the ordered policy outcome sequence for one payload.
// Dependencies: crate::core, crate::runtime::evaluator, tracing
// ============================================================================

//! ## Overview
//! The first pass evaluates every rule outside meta domains against the
//! payload. The meta pass runs strictly afterwards and exposes the complete
//! first-pass outcomes as `policies`. Every rule is evaluated exactly once;
//! matching rules contribute one outcome each, in declaration order, with the
//! meta outcomes appended.
//!
//! [`evaluate_rules_in_scope`] restricts both passes to articles of enabled
//! regimes; rules of other regimes are skipped and produce no outcome.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use tracing::debug;

use crate::core::constitution::Constitution;
use crate::core::constitution::RuleRef;
use crate::core::identifiers::RegimeId;
use crate::core::outcome::PolicyOutcome;
use crate::runtime::evaluator::EvalScope;

// ============================================================================
// SECTION: Rule Engine
// ============================================================================

/// Evaluates every regime of a constitution against a payload.
///
/// # Invariants
/// - Output depends only on `constitution` and `payload`.
/// - Meta-rule outcomes follow all first-pass outcomes.
#[must_use]
pub fn evaluate_rules(constitution: &Constitution, payload: &Value) -> Vec<PolicyOutcome> {
    evaluate_rules_in_scope(constitution, payload, &constitution.regimes())
}

/// Evaluates the articles of enabled regimes against a payload.
///
/// # Invariants
/// - Output depends only on `constitution`, `payload`, and `enabled`.
/// - Meta-rule outcomes follow all first-pass outcomes.
/// - No outcome names a regime outside `enabled`.
#[must_use]
pub fn evaluate_rules_in_scope(
    constitution: &Constitution,
    payload: &Value,
    enabled: &[RegimeId],
) -> Vec<PolicyOutcome> {
    let scope = EvalScope::new(payload);
    let in_scope = |entry: &RuleRef<'_>| enabled.contains(&entry.article.regime);

    let mut outcomes: Vec<PolicyOutcome> = constitution
        .rules()
        .filter(|entry| !entry.domain.meta && in_scope(entry))
        .filter(|entry| entry.rule.condition.eval(&scope))
        .map(PolicyOutcome::from_rule)
        .collect();
    debug!(matched = outcomes.len(), "rule engine first pass complete");

    let rows: Vec<Value> = outcomes.iter().map(PolicyOutcome::to_fact).collect();
    let meta_scope = scope.with_policies(&rows);
    let meta_outcomes: Vec<PolicyOutcome> = constitution
        .rules()
        .filter(|entry| entry.domain.meta && in_scope(entry))
        .filter(|entry| entry.rule.condition.eval(&meta_scope))
        .map(PolicyOutcome::from_rule)
        .collect();
    debug!(matched = meta_outcomes.len(), "rule engine meta pass complete");

    outcomes.extend(meta_outcomes);
    outcomes
}
