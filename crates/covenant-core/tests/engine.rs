// covenant-core/tests/engine.rs
// ============================================================================
// Module: Rule Engine Tests
// Description: Two-pass ordering, determinism, and meta-rule soundness.
// ============================================================================
//! ## Overview
//! Exercises the rule engine directly against the sample constitution.

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
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod support;

use covenant_core::Constitution;
use covenant_core::Decision;
use covenant_core::PolicyStatus;
use covenant_core::Severity;
use covenant_core::runtime::assemble_verdict;
use covenant_core::runtime::evaluate_rules;
use proptest::prelude::*;
use serde_json::Value;
use serde_json::json;
use support::TestResult;
use support::ensure;
use support::sample_constitution;

/// Returns the rule ids of the outcomes, in order.
fn rule_ids(constitution: &Constitution, payload: &Value) -> Vec<String> {
    evaluate_rules(constitution, payload)
        .into_iter()
        .map(|outcome| outcome.rule_id.as_str().to_string())
        .collect()
}

/// Returns the sample constitution with its meta domains removed.
fn without_meta(constitution: &Constitution) -> Constitution {
    let mut stripped = constitution.clone();
    stripped.domains.retain(|domain| !domain.meta);
    stripped
}

// ============================================================================
// SECTION: Evaluation Order
// ============================================================================

/// Verifies a clean payload produces no outcomes.
#[test]
fn clean_payload_matches_nothing() -> TestResult {
    let sample = sample_constitution()?;
    let payload = json!({ "personal_data_present": false, "toxicity": 0.1 });
    ensure(evaluate_rules(&sample, &payload).is_empty(), "no rule should match")
}

/// Verifies outcomes follow declaration order and carry rule metadata.
#[test]
fn outcomes_follow_declaration_order() -> TestResult {
    let sample = sample_constitution()?;
    let payload =
        json!({ "personal_data_present": true, "lawful_basis": "NONE", "toxicity": 0.9 });
    let outcomes = evaluate_rules(&sample, &payload);
    let ids: Vec<&str> = outcomes.iter().map(|outcome| outcome.rule_id.as_str()).collect();
    ensure(ids == ["GDPR_5_1_A", "DSA_34_BLOCK"], "first-pass outcomes should be ordered")?;

    let first = outcomes.first().ok_or("missing outcome")?;
    ensure(first.article_id.as_str() == "GDPR_ART_5", "article should be recorded")?;
    ensure(first.domain_id.as_str() == "privacy", "domain should be recorded")?;
    ensure(first.regime.as_str() == "GDPR", "regime should be recorded")?;
    ensure(first.status == PolicyStatus::Violated, "status should come from the effect")?;
    ensure(first.severity == Severity::High, "severity should come from the effect")?;
    ensure(first.impact == "GDPR_5_1_A impact", "impact should come from the effect")
}

/// Verifies meta-rules see the first pass and append after it.
#[test]
fn meta_rules_run_after_first_pass() -> TestResult {
    let sample = sample_constitution()?;
    let payload =
        json!({ "personal_data_present": true, "lawful_basis": "CONSENT", "toxicity": 0.5 });
    let ids = rule_ids(&sample, &payload);
    ensure(
        ids == ["GDPR_5_1_B", "DSA_34_REVIEW", "META_ESCALATE"],
        format!("meta outcome should follow first-pass outcomes: {}", ids.join(",")),
    )?;

    let verdict = assemble_verdict(&evaluate_rules(&sample, &payload));
    ensure(verdict.decision == Decision::Deny, "meta escalation should deny")?;
    ensure(verdict.severity == Severity::High, "escalated severity should be HIGH")
}

/// Verifies meta-rules do not fire without a first-pass trigger.
#[test]
fn meta_rules_need_first_pass_rows() -> TestResult {
    let sample = sample_constitution()?;
    let payload = json!({ "personal_data_present": true, "lawful_basis": "CONSENT" });
    ensure(rule_ids(&sample, &payload) == ["GDPR_5_1_B"], "only the satisfied rule should match")
}

// ============================================================================
// SECTION: Properties
// ============================================================================

/// Strategy for payloads over the sample constitution's fields.
fn payload_strategy() -> impl Strategy<Value = Value> {
    (
        proptest::option::of(any::<bool>()),
        proptest::option::of(prop_oneof![Just("NONE"), Just("CONSENT"), Just("CONTRACT")]),
        proptest::option::of(0u32 ..= 100),
    )
        .prop_map(|(personal, basis, toxicity)| {
            let mut payload = serde_json::Map::new();
            if let Some(personal) = personal {
                payload.insert("personal_data_present".to_string(), json!(personal));
            }
            if let Some(basis) = basis {
                payload.insert("lawful_basis".to_string(), json!(basis));
            }
            if let Some(toxicity) = toxicity {
                payload.insert("toxicity".to_string(), json!(f64::from(toxicity) / 100.0));
            }
            Value::Object(payload)
        })
}

proptest! {
    /// The same constitution and payload always yield the same outcomes.
    #[test]
    fn evaluation_is_deterministic(payload in payload_strategy()) {
        let sample = sample_constitution().map_err(|err| TestCaseError::fail(err.to_string()))?;
        let first = evaluate_rules(&sample, &payload);
        let second = evaluate_rules(&sample.clone(), &payload.clone());
        prop_assert_eq!(first, second);
    }

    /// Meta-rules only append: the first pass is a prefix and a deny stays a deny.
    #[test]
    fn meta_rules_never_weaken_first_pass(payload in payload_strategy()) {
        let sample = sample_constitution().map_err(|err| TestCaseError::fail(err.to_string()))?;
        let first_pass = evaluate_rules(&without_meta(&sample), &payload);
        let full = evaluate_rules(&sample, &payload);

        prop_assert!(full.len() >= first_pass.len());
        prop_assert_eq!(&full[.. first_pass.len()], first_pass.as_slice());

        let base = assemble_verdict(&first_pass);
        let combined = assemble_verdict(&full);
        prop_assert!(combined.severity >= base.severity);
        if base.decision == Decision::Deny {
            prop_assert_eq!(combined.decision, Decision::Deny);
        }
    }
}
