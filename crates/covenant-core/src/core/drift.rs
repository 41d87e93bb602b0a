// covenant-core/src/core/drift.rs
// ============================================================================
// Module: Covenant L6 Drift
// Description: Behavioral signals, drift results, and recalibration requests.
// Purpose: Define the non-blocking post-execution monitoring records.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Drift is computed from a [`BehavioralSignal`] alone. None of the types here
//! reference payloads, outcomes, verdicts, or veto results, which keeps the L6
//! path structurally unable to read or write L7 state.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::AgentId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Signals
// ============================================================================

/// Feature map of behavioral metrics, each expected in `[0, 1]`.
pub type FeatureMap = BTreeMap<String, f64>;

/// Observation of an agent's recent behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehavioralSignal {
    /// Agent or session identity.
    pub identity: AgentId,
    /// When the observation was taken.
    pub observed_at: Timestamp,
    /// Observed features.
    pub features: FeatureMap,
    /// Externally supplied baseline; the rolling baseline is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline: Option<FeatureMap>,
}

/// Rolling baseline kept for one identity between assessments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DriftBaseline {
    /// Smoothed feature values.
    pub features: FeatureMap,
    /// Whether the previous assessment alerted.
    #[serde(default)]
    pub last_alert: bool,
}

// ============================================================================
// SECTION: Drift Results
// ============================================================================

/// L6 outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DriftOutcome {
    /// Behavior is within tolerance.
    NoDrift,
    /// Behavior diverges from baseline.
    DriftAlert,
}

impl DriftOutcome {
    /// Returns the canonical upper-case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoDrift => "NO_DRIFT",
            Self::DriftAlert => "DRIFT_ALERT",
        }
    }
}

impl fmt::Display for DriftOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolution state of a drift assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResolutionState {
    /// A prior alert has cleared.
    #[serde(rename = "RESOLVED")]
    Resolved,
    /// An alert is open.
    #[serde(rename = "UNRESOLVED")]
    Unresolved,
    /// No signal was available.
    #[serde(rename = "UNKNOWN")]
    Unknown,
    /// Nothing to resolve.
    #[serde(rename = "N/A")]
    NotApplicable,
}

impl ResolutionState {
    /// Returns the canonical label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Resolved => "RESOLVED",
            Self::Unresolved => "UNRESOLVED",
            Self::Unknown => "UNKNOWN",
            Self::NotApplicable => "N/A",
        }
    }
}

impl fmt::Display for ResolutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// L6 drift result.
///
/// # Invariants
/// - `drift_outcome == DriftAlert` iff `resolution_state == Unresolved`.
/// - `drift_score` is within `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftResult {
    /// Drift outcome.
    pub drift_outcome: DriftOutcome,
    /// Resolution state.
    pub resolution_state: ResolutionState,
    /// Weighted divergence score.
    pub drift_score: f64,
    /// Assessed identity.
    pub identity: AgentId,
    /// Human-readable findings.
    pub explanation: Vec<String>,
    /// Whether a forced recalibration was requested and accepted.
    pub recalibration_requested: bool,
}

impl DriftResult {
    /// Builds the result used when no signal could be observed.
    #[must_use]
    pub fn unknown(identity: AgentId, reason: impl Into<String>) -> Self {
        Self {
            drift_outcome: DriftOutcome::NoDrift,
            resolution_state: ResolutionState::Unknown,
            drift_score: 0.0,
            identity,
            explanation: vec![reason.into()],
            recalibration_requested: false,
        }
    }

    /// Returns true when drift was detected.
    #[must_use]
    pub fn is_alert(&self) -> bool {
        self.drift_outcome == DriftOutcome::DriftAlert
    }
}

// ============================================================================
// SECTION: Recalibration
// ============================================================================

/// Forced recalibration request raised by a drift alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecalibrationRequest {
    /// Identity to recalibrate.
    pub identity: AgentId,
    /// Score that triggered the request.
    pub drift_score: f64,
    /// Findings copied from the drift result.
    pub reasons: Vec<String>,
    /// When the request was raised.
    pub requested_at: Timestamp,
}
