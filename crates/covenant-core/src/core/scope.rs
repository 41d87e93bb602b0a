// covenant-core/src/core/scope.rs
// ============================================================================
// Module: Covenant Regime Scope
// Description: Profile-driven regime enablement and per-regime summaries.
// Purpose: Decide which regimes a cycle evaluates and summarize each one.
// Dependencies: crate::core, serde
// ============================================================================

//! ## Overview
//! A [`RegimeScope`] maps deployment profiles to the regimes they enable and
//! regimes to the jurisdiction they apply in. Resolution against a request's
//! [`EvaluationScope`]:
//! - a known profile whose industry matches (or names none) restricts the
//!   cycle to its regimes; an unknown profile leaves every regime enabled;
//! - a requested jurisdiction keeps regimes that apply there: regimes without
//!   a jurisdiction, `ALL` and `GLOBAL` regimes, exact matches, and `US`/`EU`
//!   regimes for subdivisions such as `US-CA`.
//!
//! Regimes declared in meta domains are always enabled so constitutional
//! meta-rules keep running in every scope. Matching is ASCII case-insensitive.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Serialize;

use crate::core::adra::EvaluationScope;
use crate::core::constitution::Constitution;
use crate::core::constitution::Severity;
use crate::core::identifiers::RegimeId;
use crate::core::outcome::PolicyOutcome;
use crate::core::verdict::Decision;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Jurisdictions that act as parents of hyphenated subdivisions.
const PARENT_JURISDICTIONS: [&str; 2] = ["US", "EU"];

/// Jurisdiction tags that apply everywhere.
const UNIVERSAL_JURISDICTIONS: [&str; 2] = ["ALL", "GLOBAL"];

// ============================================================================
// SECTION: Regime Scope
// ============================================================================

/// Regimes enabled by one deployment profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeProfile {
    /// Industry the profile belongs to; `None` matches any industry.
    pub industry: Option<String>,
    /// Regimes the profile enables.
    pub regimes: Vec<RegimeId>,
}

/// Profile and jurisdiction tables used to scope a cycle.
///
/// The default scope has no profiles and no jurisdictions and enables every
/// regime of the constitution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegimeScope {
    /// Profiles keyed by name.
    pub profiles: BTreeMap<String, ScopeProfile>,
    /// Jurisdiction each regime applies in.
    pub jurisdictions: BTreeMap<RegimeId, String>,
}

impl RegimeScope {
    /// Returns the profile a request selects, if any.
    ///
    /// A profile bound to an industry is only selected when the request names
    /// the same industry.
    #[must_use]
    pub fn profile_for(&self, scope: &EvaluationScope) -> Option<&ScopeProfile> {
        let requested = scope.profile.as_deref()?;
        let profile = self
            .profiles
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(requested))
            .map(|(_, profile)| profile)?;
        match (&profile.industry, &scope.industry) {
            (None, _) => Some(profile),
            (Some(bound), Some(industry)) if bound.eq_ignore_ascii_case(industry) => Some(profile),
            _ => None,
        }
    }

    /// Returns the constitution's regimes enabled for a request, in
    /// declaration order.
    #[must_use]
    pub fn enabled_regimes(
        &self,
        constitution: &Constitution,
        scope: &EvaluationScope,
    ) -> Vec<RegimeId> {
        let meta: BTreeSet<&str> = constitution
            .domains
            .iter()
            .filter(|domain| domain.meta)
            .flat_map(|domain| &domain.articles)
            .map(|article| article.regime.as_str())
            .collect();
        let profile = self.profile_for(scope);
        constitution
            .regimes()
            .into_iter()
            .filter(|regime| {
                if meta.contains(regime.as_str()) {
                    return true;
                }
                let in_profile = profile.is_none_or(|profile| {
                    profile.regimes.iter().any(|enabled| same_regime(enabled, regime))
                });
                in_profile && self.applies_in(regime, scope.jurisdiction.as_deref())
            })
            .collect()
    }

    /// Returns true when a regime applies in the requested jurisdiction.
    fn applies_in(&self, regime: &RegimeId, requested: Option<&str>) -> bool {
        let declared = self
            .jurisdictions
            .iter()
            .find(|(candidate, _)| same_regime(candidate, regime))
            .map(|(_, jurisdiction)| jurisdiction.as_str());
        jurisdiction_covers(declared, requested)
    }
}

/// Compares regime identifiers case-insensitively.
fn same_regime(left: &RegimeId, right: &RegimeId) -> bool {
    left.as_str().eq_ignore_ascii_case(right.as_str())
}

/// Returns true when a regime's jurisdiction covers the requested one.
///
/// Missing values on either side never hide a regime.
#[must_use]
pub fn jurisdiction_covers(declared: Option<&str>, requested: Option<&str>) -> bool {
    let Some(requested) = requested.map(str::trim).filter(|value| !value.is_empty()) else {
        return true;
    };
    let Some(declared) = declared.map(str::trim).filter(|value| !value.is_empty()) else {
        return true;
    };
    let declared = declared.to_ascii_uppercase();
    let requested = requested.to_ascii_uppercase();
    if UNIVERSAL_JURISDICTIONS.contains(&declared.as_str()) || declared == requested {
        return true;
    }
    PARENT_JURISDICTIONS.contains(&declared.as_str())
        && requested
            .strip_prefix(declared.as_str())
            .is_some_and(|subdivision| subdivision.starts_with('-'))
}

// ============================================================================
// SECTION: Regime Summaries
// ============================================================================

/// Decision a single regime would reach on its own outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegimeSummary {
    /// Regime identifier.
    pub regime: RegimeId,
    /// DENY when the regime has a blocking violation.
    pub decision: Decision,
    /// Highest violated severity, LOW when nothing was violated.
    pub severity: Severity,
    /// Violated outcomes attributed to the regime.
    pub violations: usize,
    /// Violated outcomes at HIGH or CRITICAL.
    pub blocking_violations: usize,
}

/// Summarizes outcomes per enabled regime, in the order given.
#[must_use]
pub fn summarize_regimes(enabled: &[RegimeId], outcomes: &[PolicyOutcome]) -> Vec<RegimeSummary> {
    enabled
        .iter()
        .map(|regime| {
            let violated: Vec<&PolicyOutcome> = outcomes
                .iter()
                .filter(|outcome| &outcome.regime == regime && outcome.is_violated())
                .collect();
            let blocking_violations =
                violated.iter().filter(|outcome| outcome.is_blocking()).count();
            RegimeSummary {
                regime: regime.clone(),
                decision: if blocking_violations > 0 { Decision::Deny } else { Decision::Allow },
                severity: violated
                    .iter()
                    .map(|outcome| outcome.severity)
                    .max()
                    .unwrap_or(Severity::Low),
                violations: violated.len(),
                blocking_violations,
            }
        })
        .collect()
}
