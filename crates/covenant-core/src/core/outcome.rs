// covenant-core/src/core/outcome.rs
// ============================================================================
// Module: Covenant Policy Outcomes
// Description: Per-rule results produced by the rule engine.
// Purpose: Carry rule matches into L1, L7, and the ADRA.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! A [`PolicyOutcome`] is recorded for every rule whose condition holds.
//! Outcomes are immutable once produced; meta-rules observe them through the
//! JSON projection returned by [`PolicyOutcome::to_fact`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;

use crate::core::constitution::PolicyStatus;
use crate::core::constitution::RuleRef;
use crate::core::constitution::Severity;
use crate::core::identifiers::ArticleId;
use crate::core::identifiers::DomainId;
use crate::core::identifiers::RegimeId;
use crate::core::identifiers::RuleId;

// ============================================================================
// SECTION: Policy Outcome
// ============================================================================

/// Result of one matching rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyOutcome {
    /// Matching rule.
    pub rule_id: RuleId,
    /// Enclosing article.
    pub article_id: ArticleId,
    /// Enclosing domain.
    pub domain_id: DomainId,
    /// Status assigned by the rule effect.
    pub status: PolicyStatus,
    /// Severity assigned by the rule effect.
    pub severity: Severity,
    /// Impact statement.
    pub impact: String,
    /// Regime of the enclosing article.
    pub regime: RegimeId,
}

impl PolicyOutcome {
    /// Builds the outcome recorded for a matching rule.
    #[must_use]
    pub fn from_rule(rule: RuleRef<'_>) -> Self {
        Self {
            rule_id: rule.rule.id.clone(),
            article_id: rule.article.id.clone(),
            domain_id: rule.domain.id.clone(),
            status: rule.rule.effect.status,
            severity: rule.rule.effect.severity,
            impact: rule.rule.effect.impact.clone(),
            regime: rule.article.regime.clone(),
        }
    }

    /// Returns true for violated outcomes.
    #[must_use]
    pub fn is_violated(&self) -> bool {
        self.status == PolicyStatus::Violated
    }

    /// Returns true for violated outcomes with blocking severity.
    #[must_use]
    pub fn is_blocking(&self) -> bool {
        self.is_violated() && self.severity.is_blocking()
    }

    /// Projects the outcome into the row shape meta-rules quantify over.
    #[must_use]
    pub fn to_fact(&self) -> Value {
        json!({
            "rule_id": self.rule_id.as_str(),
            "article_id": self.article_id.as_str(),
            "domain_id": self.domain_id.as_str(),
            "status": self.status.as_str(),
            "severity": self.severity.as_str(),
            "impact": self.impact,
            "regime": self.regime.as_str(),
        })
    }
}
