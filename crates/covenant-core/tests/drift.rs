// covenant-core/tests/drift.rs
// ============================================================================
// Module: Drift Monitor Tests
// Description: Baseline establishment, alerting, resolution, and config bounds.
// ============================================================================
//! ## Overview
//! Drives the L6 monitor with feature maps and checks scores and states.

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

use std::collections::BTreeMap;
use std::sync::Arc;

use covenant_core::AgentId;
use covenant_core::DriftOutcome;
use covenant_core::ResolutionState;
use covenant_core::runtime::DriftConfig;
use covenant_core::runtime::DriftError;
use covenant_core::runtime::DriftMonitor;
use covenant_core::runtime::InMemoryBaselineStore;
use proptest::prelude::*;
use support::TestResult;
use support::ensure;
use support::features;
use support::signal;

/// Monitor with uniform weights so scores are plain mean deltas.
fn uniform_monitor() -> TestResult<DriftMonitor> {
    Ok(DriftMonitor::new(DriftConfig {
        weights: BTreeMap::new(),
        ..DriftConfig::default()
    })?)
}

// ============================================================================
// SECTION: Baseline
// ============================================================================

/// Verifies the first observation establishes a baseline without alerting.
#[test]
fn first_observation_establishes_baseline() -> TestResult {
    let monitor = uniform_monitor()?;
    let result = monitor.assess(&signal("agent-1", 1, &[("bot_probability", 0.9)]))?;
    ensure(result.drift_outcome == DriftOutcome::NoDrift, "first sample should not alert")?;
    ensure(result.resolution_state == ResolutionState::NotApplicable, "state should be N/A")?;
    ensure(result.drift_score.abs() < f64::EPSILON, "score should be zero")?;
    let stored = monitor.baseline(&AgentId::new("agent-1"))?;
    ensure(stored == Some(features(&[("bot_probability", 0.9)])), "baseline should be stored")
}

/// Verifies baselines are tracked per identity.
#[test]
fn baselines_are_per_identity() -> TestResult {
    let monitor = uniform_monitor()?;
    monitor.assess(&signal("agent-1", 1, &[("bot_probability", 0.0)]))?;
    let other = monitor.assess(&signal("agent-2", 2, &[("bot_probability", 1.0)]))?;
    ensure(other.resolution_state == ResolutionState::NotApplicable, "new identity is N/A")?;
    ensure(monitor.baseline(&AgentId::new("agent-3"))?.is_none(), "unknown identity has none")
}

// ============================================================================
// SECTION: Alerting
// ============================================================================

/// Verifies a large shift alerts with an explanation.
#[test]
fn large_shift_alerts_and_explains() -> TestResult {
    let monitor = uniform_monitor()?;
    monitor.assess(&signal("agent-1", 1, &[("bot_probability", 0.1), ("harmful_content", 0.1)]))?;
    let shifted = signal("agent-1", 2, &[("bot_probability", 0.9), ("harmful_content", 0.9)]);
    let result = monitor.assess(&shifted)?;
    ensure(result.is_alert(), "0.8 mean delta should alert at 0.6")?;
    ensure(result.resolution_state == ResolutionState::Unresolved, "alert is unresolved")?;
    ensure((result.drift_score - 0.8).abs() < 1e-9, "score should be the mean delta")?;
    ensure(
        result
            .explanation
            .iter()
            .any(|line| line == "bot_probability increased significantly (0.10 -> 0.90)"),
        "feature movement should be explained",
    )?;
    ensure(
        result.explanation.last().is_some_and(|line| line == "Forced recalibration recommended."),
        "alert should recommend recalibration",
    )
}

/// Verifies small movements stay within tolerance.
#[test]
fn small_shift_stays_within_tolerance() -> TestResult {
    let monitor = uniform_monitor()?;
    monitor.assess(&signal("agent-1", 1, &[("bot_probability", 0.2)]))?;
    let result = monitor.assess(&signal("agent-1", 2, &[("bot_probability", 0.3)]))?;
    ensure(!result.is_alert(), "0.1 delta should not alert")?;
    ensure(
        result.explanation == ["Behavior within baseline tolerance."],
        "quiet result should say so",
    )
}

/// Verifies an alert followed by a return to baseline reports resolution.
#[test]
fn alert_then_recovery_is_resolved() -> TestResult {
    let monitor = uniform_monitor()?;
    monitor.assess(&signal("agent-1", 1, &[("bot_probability", 0.0)]))?;
    let alert = monitor.assess(&signal("agent-1", 2, &[("bot_probability", 1.0)]))?;
    ensure(alert.is_alert(), "full swing should alert")?;
    let recovered = monitor.assess(&signal("agent-1", 3, &[("bot_probability", 0.1)]))?;
    ensure(!recovered.is_alert(), "return near baseline should clear")?;
    ensure(recovered.resolution_state == ResolutionState::Resolved, "cleared alert is resolved")
}

/// Verifies an external baseline takes precedence over the rolling one.
#[test]
fn external_baseline_overrides_rolling() -> TestResult {
    let monitor = uniform_monitor()?;
    let mut observed = signal("agent-1", 1, &[("bot_probability", 0.9)]);
    observed.baseline = Some(features(&[("bot_probability", 0.0)]));
    let result = monitor.assess(&observed)?;
    ensure(result.is_alert(), "external baseline should be compared on first sample")
}

/// Verifies out-of-range and non-finite values are sanitized.
#[test]
fn feature_values_are_sanitized() -> TestResult {
    let monitor = uniform_monitor()?;
    monitor.assess(&signal("agent-1", 1, &[("a", 5.0), ("b", f64::NAN)]))?;
    let stored = monitor.baseline(&AgentId::new("agent-1"))?.ok_or("missing baseline")?;
    ensure(stored.get("a") == Some(&1.0), "values above one should clamp")?;
    ensure(stored.get("b") == Some(&0.0), "non-finite values should become zero")
}

/// Verifies default weights emphasize harmful content.
#[test]
fn default_weights_shape_the_score() -> TestResult {
    let monitor = DriftMonitor::new(DriftConfig::default())?;
    monitor.assess(&signal("agent-1", 1, &[("harmful_content", 0.0), ("violation_count", 0.0)]))?;
    let result = monitor
        .assess(&signal("agent-1", 2, &[("harmful_content", 1.0), ("violation_count", 0.0)]))?;
    let expected = 2.5 / 3.5;
    ensure((result.drift_score - expected).abs() < 1e-9, "weighted mean should apply")?;
    ensure(result.is_alert(), "weighted harmful content shift should alert")
}

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Verifies out-of-bound configuration is rejected.
#[test]
fn invalid_config_is_rejected() -> TestResult {
    let cases = [
        DriftConfig {
            threshold: 0.0,
            ..DriftConfig::default()
        },
        DriftConfig {
            ema_alpha: 1.5,
            ..DriftConfig::default()
        },
        DriftConfig {
            significant_delta: -0.1,
            ..DriftConfig::default()
        },
        DriftConfig {
            weights: BTreeMap::from([("x".to_string(), f64::INFINITY)]),
            ..DriftConfig::default()
        },
    ];
    for config in cases {
        ensure(
            matches!(DriftMonitor::new(config), Err(DriftError::InvalidConfig(_))),
            "invalid config should be rejected",
        )?;
    }
    Ok(())
}

// ============================================================================
// SECTION: Persistence
// ============================================================================

/// Verifies a stored baseline carries across monitor instances.
#[test]
fn stored_baseline_survives_restart() -> TestResult {
    let store = InMemoryBaselineStore::new();
    let first = uniform_monitor()?.with_store(Arc::new(store.clone()));
    let result = first.assess(&signal("agent-1", 1, &[("bot_probability", 0.05)]))?;
    ensure(!result.is_alert(), "first run establishes the baseline")?;
    let saved = store.get(&AgentId::new("agent-1"));
    ensure(
        saved.is_some_and(|baseline| baseline.features == features(&[("bot_probability", 0.05)])),
        "established baseline should be saved",
    )?;

    let restarted = uniform_monitor()?.with_store(Arc::new(store.clone()));
    let result = restarted.assess(&signal("agent-1", 2, &[("bot_probability", 0.95)]))?;
    ensure(result.is_alert(), "restarted monitor should compare against the stored baseline")?;
    ensure(
        store.get(&AgentId::new("agent-1")).is_some_and(|baseline| baseline.last_alert),
        "alert flag should be saved for resolution tracking",
    )
}

/// Verifies an unreadable store fails the assessment.
#[test]
fn store_load_failure_is_an_error() -> TestResult {
    let store = InMemoryBaselineStore::new();
    store.fail_next_loads(1);
    let monitor = uniform_monitor()?.with_store(Arc::new(store));
    let result = monitor.assess(&signal("agent-1", 1, &[("bot_probability", 0.5)]));
    ensure(matches!(result, Err(DriftError::Store(_))), "load failure should surface")
}

/// Verifies a failed save keeps the assessment and the in-memory baseline.
#[test]
fn store_save_failure_keeps_assessment() -> TestResult {
    let store = InMemoryBaselineStore::new();
    store.fail_next_saves(1);
    let monitor = uniform_monitor()?.with_store(Arc::new(store.clone()));
    let result = monitor.assess(&signal("agent-1", 1, &[("bot_probability", 0.5)]))?;
    ensure(result.drift_outcome == DriftOutcome::NoDrift, "assessment should stand")?;
    ensure(store.get(&AgentId::new("agent-1")).is_none(), "failed save stores nothing")?;
    ensure(
        monitor.baseline(&AgentId::new("agent-1"))?.is_some(),
        "in-memory baseline should still advance",
    )
}

// ============================================================================
// SECTION: Properties
// ============================================================================

proptest! {
    /// Scores stay in `[0, 1]` and alerts match the threshold.
    #[test]
    fn score_is_bounded(
        before in proptest::collection::btree_map("[a-d]", -2.0f64 .. 2.0, 0 .. 4),
        after in proptest::collection::btree_map("[a-d]", -2.0f64 .. 2.0, 0 .. 4),
    ) {
        let monitor = DriftMonitor::new(DriftConfig::default())
            .map_err(|err| TestCaseError::fail(err.to_string()))?;
        let mut first = signal("agent", 1, &[]);
        first.features = before;
        let mut second = signal("agent", 2, &[]);
        second.features = after;
        monitor.assess(&first).map_err(|err| TestCaseError::fail(err.to_string()))?;
        let result = monitor.assess(&second).map_err(|err| TestCaseError::fail(err.to_string()))?;
        prop_assert!((0.0 ..= 1.0).contains(&result.drift_score));
        prop_assert_eq!(result.is_alert(), result.drift_score >= 0.6);
        prop_assert_eq!(result.is_alert(), result.resolution_state == ResolutionState::Unresolved);
    }
}
