// covenant-core/src/runtime/drift.rs
// ============================================================================
// Module: Covenant Drift Monitor
// Description: L6 behavioral drift scoring against rolling baselines.
// Purpose: Flag divergence from baseline behavior without touching L7 state.
// Dependencies: crate::{core, interfaces}, thiserror, tracing
// ============================================================================

//! ## Overview
//! The monitor scores a [`BehavioralSignal`] against either the baseline the
//! signal carries or a rolling baseline kept per identity. The score is the
//! weighted mean absolute difference over the union of features, capped at 1.
//! After every assessment the rolling baseline moves toward the observation
//! by an exponential moving average.
//!
//! With a [`BaselineStore`] attached, an identity's baseline is loaded the
//! first time the monitor sees it and saved after every assessment. A failed
//! load is an error; a failed save is logged and the assessment stands.
//!
//! The monitor only ever sees behavioral signals; it cannot observe payloads,
//! outcomes, verdicts, or veto results.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use thiserror::Error;
use tracing::warn;

use crate::core::drift::BehavioralSignal;
use crate::core::drift::DriftBaseline;
use crate::core::drift::DriftOutcome;
use crate::core::drift::DriftResult;
use crate::core::drift::FeatureMap;
use crate::core::drift::ResolutionState;
use crate::core::identifiers::AgentId;
use crate::interfaces::BaselineStore;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Default alert threshold.
pub const DEFAULT_DRIFT_THRESHOLD: f64 = 0.6;
/// Default EMA smoothing factor.
pub const DEFAULT_EMA_ALPHA: f64 = 0.1;
/// Default per-feature delta reported as significant.
pub const DEFAULT_SIGNIFICANT_DELTA: f64 = 0.3;
/// Weight applied to features without an explicit weight.
pub const DEFAULT_FEATURE_WEIGHT: f64 = 1.0;

/// Drift monitor configuration.
///
/// # Invariants
/// - Enforced by [`DriftConfig::validate`]: `threshold` and `ema_alpha` lie in
///   `(0, 1]`, `significant_delta` in `[0, 1]`, weights are finite and positive.
#[derive(Debug, Clone, PartialEq)]
pub struct DriftConfig {
    /// Score at or above which drift is alerted.
    pub threshold: f64,
    /// EMA smoothing factor for the rolling baseline.
    pub ema_alpha: f64,
    /// Absolute delta above which a feature is reported.
    pub significant_delta: f64,
    /// Per-feature weights.
    pub weights: BTreeMap<String, f64>,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_DRIFT_THRESHOLD,
            ema_alpha: DEFAULT_EMA_ALPHA,
            significant_delta: DEFAULT_SIGNIFICANT_DELTA,
            weights: default_weights(),
        }
    }
}

impl DriftConfig {
    /// Validates configuration bounds.
    ///
    /// # Errors
    ///
    /// Returns [`DriftError::InvalidConfig`] when a bound is violated.
    pub fn validate(&self) -> Result<(), DriftError> {
        if !(self.threshold > 0.0 && self.threshold <= 1.0) {
            return Err(DriftError::InvalidConfig("threshold must be in (0, 1]".to_string()));
        }
        if !(self.ema_alpha > 0.0 && self.ema_alpha <= 1.0) {
            return Err(DriftError::InvalidConfig("ema_alpha must be in (0, 1]".to_string()));
        }
        if !(0.0 ..= 1.0).contains(&self.significant_delta) {
            return Err(DriftError::InvalidConfig(
                "significant_delta must be in [0, 1]".to_string(),
            ));
        }
        for (feature, weight) in &self.weights {
            if !weight.is_finite() || *weight <= 0.0 {
                return Err(DriftError::InvalidConfig(format!(
                    "weight for {feature} must be finite and positive"
                )));
            }
        }
        Ok(())
    }

    /// Returns the weight for a feature.
    #[must_use]
    pub fn weight(&self, feature: &str) -> f64 {
        self.weights.get(feature).copied().unwrap_or(DEFAULT_FEATURE_WEIGHT)
    }
}

/// Returns the default feature weights.
#[must_use]
pub fn default_weights() -> BTreeMap<String, f64> {
    [
        ("harmful_content", 2.5),
        ("severity_score", 2.0),
        ("bot_probability", 1.5),
        ("previous_violations", 1.5),
        ("violation_count", 1.0),
    ]
    .into_iter()
    .map(|(feature, weight)| (feature.to_string(), weight))
    .collect()
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Drift monitor errors.
#[derive(Debug, Error)]
pub enum DriftError {
    /// Configuration is out of bounds.
    #[error("invalid drift configuration: {0}")]
    InvalidConfig(String),
    /// Baseline table could not be accessed.
    #[error("drift baseline state unavailable: {0}")]
    StateUnavailable(String),
    /// Baseline store could not be read.
    #[error("drift baseline store failed: {0}")]
    Store(String),
}

// ============================================================================
// SECTION: Drift Monitor
// ============================================================================

/// L6 drift monitor.
pub struct DriftMonitor {
    /// Scoring configuration.
    config: DriftConfig,
    /// Rolling baselines keyed by identity.
    baselines: Mutex<BTreeMap<AgentId, DriftBaseline>>,
    /// Optional durable store for baselines.
    store: Option<Arc<dyn BaselineStore>>,
}

impl fmt::Debug for DriftMonitor {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("DriftMonitor")
            .field("config", &self.config)
            .field("persistent", &self.store.is_some())
            .finish_non_exhaustive()
    }
}

impl DriftMonitor {
    /// Creates a monitor with validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DriftError::InvalidConfig`] when the configuration is invalid.
    pub fn new(config: DriftConfig) -> Result<Self, DriftError> {
        config.validate()?;
        Ok(Self {
            config,
            baselines: Mutex::new(BTreeMap::new()),
            store: None,
        })
    }

    /// Attaches a durable baseline store.
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn BaselineStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Returns the monitor configuration.
    #[must_use]
    pub const fn config(&self) -> &DriftConfig {
        &self.config
    }

    /// Returns the rolling baseline for an identity, if one exists.
    ///
    /// # Errors
    ///
    /// Returns [`DriftError::StateUnavailable`] when the baseline table is poisoned.
    pub fn baseline(&self, identity: &AgentId) -> Result<Option<FeatureMap>, DriftError> {
        let guard = self.lock()?;
        Ok(guard.get(identity).map(|state| state.features.clone()))
    }

    /// Scores a signal and advances the identity's rolling baseline.
    ///
    /// # Errors
    ///
    /// Returns [`DriftError::StateUnavailable`] when the baseline table is poisoned
    /// and [`DriftError::Store`] when an attached store cannot be read.
    pub fn assess(&self, signal: &BehavioralSignal) -> Result<DriftResult, DriftError> {
        let observed = sanitize(&signal.features);
        let mut guard = self.lock()?;
        let stored = match guard.get(&signal.identity) {
            Some(state) => Some(state.clone()),
            None => self.load_stored(&signal.identity)?,
        };

        let external = signal.baseline.as_ref().map(sanitize);
        let Some(reference) = external.or_else(|| stored.as_ref().map(|s| s.features.clone()))
        else {
            let established = DriftBaseline {
                features: observed,
                last_alert: false,
            };
            self.save_stored(&signal.identity, &established);
            guard.insert(signal.identity.clone(), established);
            return Ok(DriftResult {
                drift_outcome: DriftOutcome::NoDrift,
                resolution_state: ResolutionState::NotApplicable,
                drift_score: 0.0,
                identity: signal.identity.clone(),
                explanation: vec!["Baseline established from first observation.".to_string()],
                recalibration_requested: false,
            });
        };

        let score = self.score(&observed, &reference);
        let alert = score >= self.config.threshold;
        let previously_alerted = stored.as_ref().is_some_and(|state| state.last_alert);
        let resolution_state = if alert {
            ResolutionState::Unresolved
        } else if previously_alerted {
            ResolutionState::Resolved
        } else {
            ResolutionState::NotApplicable
        };
        let explanation = self.explain(&observed, &reference, alert, resolution_state);

        let rolling = stored.map_or(reference, |state| state.features);
        let advanced = DriftBaseline {
            features: ema(&rolling, &observed, self.config.ema_alpha),
            last_alert: alert,
        };
        self.save_stored(&signal.identity, &advanced);
        guard.insert(signal.identity.clone(), advanced);

        Ok(DriftResult {
            drift_outcome: if alert { DriftOutcome::DriftAlert } else { DriftOutcome::NoDrift },
            resolution_state,
            drift_score: score,
            identity: signal.identity.clone(),
            explanation,
            recalibration_requested: false,
        })
    }

    /// Loads an identity's baseline from the attached store.
    fn load_stored(&self, identity: &AgentId) -> Result<Option<DriftBaseline>, DriftError> {
        let Some(store) = &self.store else {
            return Ok(None);
        };
        store.load(identity).map_err(|err| DriftError::Store(err.to_string()))
    }

    /// Saves an identity's baseline to the attached store, logging failures.
    fn save_stored(&self, identity: &AgentId, baseline: &DriftBaseline) {
        if let Some(store) = &self.store
            && let Err(err) = store.save(identity, baseline)
        {
            warn!(identity = %identity, error = %err, "drift baseline not persisted");
        }
    }

    /// Computes the weighted mean absolute difference, capped at 1.
    fn score(&self, observed: &FeatureMap, baseline: &FeatureMap) -> f64 {
        let mut weighted = 0.0;
        let mut total_weight = 0.0;
        for feature in feature_union(observed, baseline) {
            let weight = self.config.weight(feature);
            weighted += weight * (value_of(observed, feature) - value_of(baseline, feature)).abs();
            total_weight += weight;
        }
        if total_weight <= 0.0 { 0.0 } else { (weighted / total_weight).min(1.0) }
    }

    /// Lists significant feature movements and the alert recommendation.
    fn explain(
        &self,
        observed: &FeatureMap,
        baseline: &FeatureMap,
        alert: bool,
        resolution: ResolutionState,
    ) -> Vec<String> {
        let mut lines = Vec::new();
        for feature in feature_union(observed, baseline) {
            let before = value_of(baseline, feature);
            let after = value_of(observed, feature);
            let delta = after - before;
            if delta.abs() > self.config.significant_delta {
                let direction = if delta > 0.0 { "increased" } else { "decreased" };
                lines.push(format!(
                    "{feature} {direction} significantly ({before:.2} -> {after:.2})"
                ));
            }
        }
        if alert {
            lines.push("Forced recalibration recommended.".to_string());
        } else if resolution == ResolutionState::Resolved {
            lines.push("Previous drift alert resolved.".to_string());
        } else if lines.is_empty() {
            lines.push("Behavior within baseline tolerance.".to_string());
        }
        lines
    }

    /// Locks the baseline table.
    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<AgentId, DriftBaseline>>, DriftError> {
        self.baselines
            .lock()
            .map_err(|_| DriftError::StateUnavailable("baseline mutex poisoned".to_string()))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Clamps feature values to `[0, 1]`; non-finite values become 0.
fn sanitize(features: &FeatureMap) -> FeatureMap {
    features
        .iter()
        .map(|(feature, value)| {
            let value = if value.is_finite() { value.clamp(0.0, 1.0) } else { 0.0 };
            (feature.clone(), value)
        })
        .collect()
}

/// Returns the sorted union of feature names.
fn feature_union<'a>(left: &'a FeatureMap, right: &'a FeatureMap) -> BTreeSet<&'a str> {
    left.keys().chain(right.keys()).map(String::as_str).collect()
}

/// Returns a feature value, treating missing features as 0.
fn value_of(features: &FeatureMap, feature: &str) -> f64 {
    features.get(feature).copied().unwrap_or(0.0)
}

/// Moves a baseline toward an observation by `alpha`.
fn ema(baseline: &FeatureMap, observed: &FeatureMap, alpha: f64) -> FeatureMap {
    feature_union(baseline, observed)
        .into_iter()
        .map(|feature| {
            let before = value_of(baseline, feature);
            let after = value_of(observed, feature);
            (feature.to_string(), alpha.mul_add(after - before, before))
        })
        .collect()
}
