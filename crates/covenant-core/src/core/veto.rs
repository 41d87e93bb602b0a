// covenant-core/src/core/veto.rs
// ============================================================================
// Module: Covenant L7 Veto
// Description: Veto result, basis entries, and corrective signal types.
// Purpose: Keep veto state sealed so only the veto path can construct it.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! [`VetoResult`] fields are private and the only constructor is
//! crate-visible, so downstream code (drift, dashboards, ADRA consumers) can
//! read veto state but never author or amend it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Serialize;

use crate::core::constitution::Severity;
use crate::core::identifiers::ArticleId;
use crate::core::identifiers::RegimeId;
use crate::core::identifiers::RuleId;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Constitutional clause cited by every veto basis entry.
pub const NO_ALLOW_ON_HIGH_CLAUSE: &str = "No HIGH/CRITICAL violation may yield ALLOW.";

/// Signal type carried by corrective signals.
pub const CORRECTIVE_SIGNAL_TYPE: &str = "VETO_CORRECTIVE_SIGNAL";

/// Action required by corrective signals.
pub const REPLAN_AND_RESUBMIT: &str = "REPLAN_AND_RESUBMIT";

/// Execution point at which a veto blocks.
pub const BLOCKED_AT_PRE_EXECUTION: &str = "PRE_EXECUTION";

/// Fixed instruction attached to corrective signals.
pub const CORRECTIVE_INSTRUCTION: &str =
    "Request cannot proceed. Revise inputs/plan to satisfy the violated constraints and resubmit.";

// ============================================================================
// SECTION: Categories
// ============================================================================

/// Coarse classification of what a veto protects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VetoCategory {
    /// No veto triggered.
    None,
    /// Privacy and personal data regimes.
    DataProtection,
    /// Platform content regimes.
    ContentSafety,
    /// AI oversight regimes.
    AiAutonomy,
    /// Market competition regimes.
    Competition,
    /// Financial controls regimes.
    FinancialIntegrity,
    /// Cyber security regimes.
    CyberSecurity,
    /// Constitutional meta-rules and unmapped regimes.
    ConstitutionalBlock,
}

impl VetoCategory {
    /// Maps a regime tag to its category; unmapped tags are constitutional blocks.
    #[must_use]
    pub fn for_regime(regime: &RegimeId) -> Self {
        match regime.as_str().trim().to_ascii_uppercase().as_str() {
            "GDPR" | "HIPAA" | "GLBA" | "CCPA" => Self::DataProtection,
            "DSA" => Self::ContentSafety,
            "EU_AI_ACT" | "NIST_AI_RMF" | "ISO_42001" => Self::AiAutonomy,
            "DMA" => Self::Competition,
            "PCI_DSS" | "SOX" | "FINRA" | "BSA_AML" | "SEC_17A4" => Self::FinancialIntegrity,
            "NYDFS_500" | "CYBER_CONTROLS" => Self::CyberSecurity,
            _ => Self::ConstitutionalBlock,
        }
    }

    /// Returns the canonical upper-case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::DataProtection => "DATA_PROTECTION",
            Self::ContentSafety => "CONTENT_SAFETY",
            Self::AiAutonomy => "AI_AUTONOMY",
            Self::Competition => "COMPETITION",
            Self::FinancialIntegrity => "FINANCIAL_INTEGRITY",
            Self::CyberSecurity => "CYBER_SECURITY",
            Self::ConstitutionalBlock => "CONSTITUTIONAL_BLOCK",
        }
    }
}

impl fmt::Display for VetoCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Escalation target for a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Escalation {
    /// No escalation.
    None,
    /// A human reviewer must look at the request.
    HumanReviewer,
}

// ============================================================================
// SECTION: Veto Records
// ============================================================================

/// One blocking violation cited by a veto.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VetoBasisEntry {
    /// Violated article.
    pub article_id: ArticleId,
    /// Violated rule.
    pub rule_id: RuleId,
    /// Violation severity.
    pub severity: Severity,
    /// Regime of the article.
    pub regime: RegimeId,
    /// Clause that turns the violation into a veto.
    pub constitutional_clause: &'static str,
    /// Impact statement of the violated rule.
    pub explanation: String,
}

/// One remediation item in a corrective signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CorrectiveViolation {
    /// Violated article.
    pub article: ArticleId,
    /// Violated rule.
    pub rule: RuleId,
    /// Violation severity.
    pub severity: Severity,
    /// Why the request was blocked.
    pub reason: String,
    /// What must change before resubmitting.
    pub required_change: String,
}

/// Structured remediation guidance attached to a triggered veto.
///
/// # Invariants
/// - `violations` is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CorrectiveSignal {
    /// Always [`CORRECTIVE_SIGNAL_TYPE`].
    pub signal_type: &'static str,
    /// Always [`REPLAN_AND_RESUBMIT`].
    pub action_required: &'static str,
    /// Always [`BLOCKED_AT_PRE_EXECUTION`].
    pub blocked_at: &'static str,
    /// Remediation items in veto basis order.
    pub violations: Vec<CorrectiveViolation>,
    /// Always [`CORRECTIVE_INSTRUCTION`].
    pub instruction: &'static str,
}

/// L7 veto result.
///
/// # Invariants
/// - `execution_authorized == !veto_triggered`.
/// - `corrective_signal.is_some() == veto_triggered`.
/// - `veto_category == None` iff the veto did not trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VetoResult {
    /// Whether execution is blocked.
    veto_triggered: bool,
    /// Category of the blocking regime.
    veto_category: VetoCategory,
    /// Whether execution may proceed.
    execution_authorized: bool,
    /// Blocking violations in engine order.
    veto_basis: Vec<VetoBasisEntry>,
    /// Remediation guidance, present iff the veto triggered.
    #[serde(skip_serializing_if = "Option::is_none")]
    corrective_signal: Option<CorrectiveSignal>,
    /// Escalation target.
    escalation_required: Escalation,
}

impl VetoResult {
    /// Builds a veto result. Only the veto path calls this.
    pub(crate) fn new(
        veto_triggered: bool,
        veto_category: VetoCategory,
        veto_basis: Vec<VetoBasisEntry>,
        corrective_signal: Option<CorrectiveSignal>,
        escalation_required: Escalation,
    ) -> Self {
        Self {
            veto_triggered,
            veto_category,
            execution_authorized: !veto_triggered,
            veto_basis,
            corrective_signal,
            escalation_required,
        }
    }

    /// Returns whether execution is blocked.
    #[must_use]
    pub const fn veto_triggered(&self) -> bool {
        self.veto_triggered
    }

    /// Returns the veto category.
    #[must_use]
    pub const fn veto_category(&self) -> VetoCategory {
        self.veto_category
    }

    /// Returns whether execution may proceed.
    #[must_use]
    pub const fn execution_authorized(&self) -> bool {
        self.execution_authorized
    }

    /// Returns the blocking violations.
    #[must_use]
    pub fn veto_basis(&self) -> &[VetoBasisEntry] {
        &self.veto_basis
    }

    /// Returns the corrective signal, if any.
    #[must_use]
    pub const fn corrective_signal(&self) -> Option<&CorrectiveSignal> {
        self.corrective_signal.as_ref()
    }

    /// Returns the escalation target.
    #[must_use]
    pub const fn escalation_required(&self) -> Escalation {
        self.escalation_required
    }
}
