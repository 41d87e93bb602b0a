// covenant-core/tests/scope.rs
// ============================================================================
// Module: Regime Scope Tests
// Description: Profile selection, jurisdiction coverage, and summaries.
// ============================================================================
//! ## Overview
//! Ensures regime enablement follows profiles and jurisdictions and that
//! scoped evaluation never reports a disabled regime.

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

use covenant_core::Decision;
use covenant_core::EvaluationScope;
use covenant_core::RegimeId;
use covenant_core::RegimeScope;
use covenant_core::ScopeProfile;
use covenant_core::Severity;
use covenant_core::jurisdiction_covers;
use covenant_core::runtime::evaluate_rules_in_scope;
use covenant_core::summarize_regimes;
use serde_json::json;
use support::TestResult;
use support::ensure;
use support::sample_constitution;

/// Builds a scope from optional parts.
fn scope(
    industry: Option<&str>,
    profile: Option<&str>,
    jurisdiction: Option<&str>,
) -> EvaluationScope {
    EvaluationScope {
        industry: industry.map(str::to_string),
        profile: profile.map(str::to_string),
        jurisdiction: jurisdiction.map(str::to_string),
    }
}

// ============================================================================
// SECTION: Jurisdictions
// ============================================================================

/// Verifies jurisdiction coverage rules.
#[test]
fn jurisdiction_coverage_rules() -> TestResult {
    let cases = [
        (Some("EU"), None, true),
        (None, Some("EU"), true),
        (Some("GLOBAL"), Some("BR"), true),
        (Some("all"), Some("JP"), true),
        (Some("EU"), Some("eu"), true),
        (Some("US"), Some("US-CA"), true),
        (Some("EU"), Some("EU-DE"), true),
        (Some("US"), Some("USA"), false),
        (Some("US-CA"), Some("US"), false),
        (Some("UK"), Some("UK-SCT"), false),
        (Some("EU"), Some("US"), false),
    ];
    for (declared, requested, expected) in cases {
        ensure(
            jurisdiction_covers(declared, requested) == expected,
            format!("{declared:?} covering {requested:?} should be {expected}"),
        )?;
    }
    Ok(())
}

// ============================================================================
// SECTION: Profiles
// ============================================================================

/// Verifies profiles bound to an industry only match that industry.
#[test]
fn profile_requires_matching_industry() -> TestResult {
    let constitution = sample_constitution()?;
    let mut tables = RegimeScope::default();
    tables.profiles.insert("privacy".to_string(), ScopeProfile {
        industry: Some("health".to_string()),
        regimes: vec![RegimeId::new("gdpr")],
    });

    let request = scope(Some("HEALTH"), Some("Privacy"), None);
    let matched = tables.enabled_regimes(&constitution, &request);
    let names: Vec<&str> = matched.iter().map(RegimeId::as_str).collect();
    ensure(names == ["GDPR", "CONSTITUTIONAL"], "matching industry selects the profile")?;

    let request = scope(Some("retail"), Some("privacy"), None);
    let other = tables.enabled_regimes(&constitution, &request);
    ensure(other.len() == 3, "another industry leaves the request unscoped")?;
    let request = scope(None, Some("privacy"), None);
    let bare = tables.enabled_regimes(&constitution, &request);
    ensure(bare.len() == 3, "a missing industry leaves the request unscoped")
}

// ============================================================================
// SECTION: Scoped Evaluation
// ============================================================================

/// Verifies scoped evaluation skips disabled regimes, meta rules included.
#[test]
fn scoped_evaluation_skips_disabled_regimes() -> TestResult {
    let constitution = sample_constitution()?;
    let payload = json!({
        "personal_data_present": true,
        "lawful_basis": "NONE",
        "toxicity": 0.5,
    });
    let all = constitution.regimes();
    let full = evaluate_rules_in_scope(&constitution, &payload, &all);
    let ids: Vec<&str> = full.iter().map(|outcome| outcome.rule_id.as_str()).collect();
    ensure(ids == ["GDPR_5_1_A", "DSA_34_REVIEW", "META_ESCALATE"], "full scope sees all")?;

    let privacy_only = [RegimeId::new("GDPR")];
    let scoped = evaluate_rules_in_scope(&constitution, &payload, &privacy_only);
    let ids: Vec<&str> = scoped.iter().map(|outcome| outcome.rule_id.as_str()).collect();
    ensure(ids == ["GDPR_5_1_A"], "only GDPR rules run")?;

    let summaries = summarize_regimes(&all, &full);
    ensure(summaries.len() == 3, "one summary per enabled regime")?;
    ensure(
        summaries[1].decision == Decision::Allow
            && summaries[1].severity == Severity::Medium
            && summaries[1].violations == 1
            && summaries[1].blocking_violations == 0,
        "a MEDIUM-only regime allows",
    )?;
    ensure(
        summaries[2].decision == Decision::Deny && summaries[2].blocking_violations == 1,
        "the HIGH meta escalation denies",
    )
}
