// covenant-core/src/core/adra.rs
// ============================================================================
// Module: Covenant ADRA
// Description: Audit/Decision Record Artifact and its sections.
// Purpose: Define the immutable composite record emitted per evaluation cycle.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! An [`Adra`] bundles the L1 verdict and outcomes, the L6 drift result, the
//! L7 veto result, the chain of custody, and the governance context, sealed
//! by an envelope hash over the canonical JSON of everything else.
//!
//! Ordering is carried by types: a [`ChainOfCustody`] only comes from
//! [`CustodyRecorder::finalize`], which needs the finished [`VetoResult`], and
//! a [`GovernanceContext`] only comes from a finished [`Verdict`].
//!
//! Security posture: the ADRA is read-only after assembly; all fields are
//! exposed through getters.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::core::constitution::Severity;
use crate::core::drift::DriftResult;
use crate::core::hashing::HashDigest;
use crate::core::hashing::HashError;
use crate::core::identifiers::ConstitutionName;
use crate::core::identifiers::ConstitutionVersion;
use crate::core::identifiers::EvaluationId;
use crate::core::identifiers::RegimeId;
use crate::core::outcome::PolicyOutcome;
use crate::core::scope::RegimeSummary;
use crate::core::time::Timestamp;
use crate::core::verdict::Decision;
use crate::core::verdict::Verdict;
use crate::core::veto::VetoResult;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Record format version stamped into every ADRA.
pub const ADRA_VERSION: &str = "1.0";

// ============================================================================
// SECTION: Chain of Custody
// ============================================================================

/// Layer events recorded in the custody timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustodyStage {
    /// The kernel accepted the request.
    RequestReceived,
    /// Both engine passes completed.
    RulesEvaluated,
    /// The L1 verdict was computed.
    #[serde(rename = "L1_VERDICT_COMPUTED")]
    L1VerdictComputed,
    /// The L7 veto path completed.
    #[serde(rename = "L7_VETO_EVALUATED")]
    L7VetoEvaluated,
    /// The veto audit event was emitted.
    VetoCorrectiveSignalEmitted,
    /// The L6 drift path completed.
    #[serde(rename = "L6_DRIFT_EVALUATED")]
    L6DriftEvaluated,
    /// A forced recalibration was requested.
    RecalibrationRequested,
}

impl CustodyStage {
    /// Returns the canonical upper-case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RequestReceived => "REQUEST_RECEIVED",
            Self::RulesEvaluated => "RULES_EVALUATED",
            Self::L1VerdictComputed => "L1_VERDICT_COMPUTED",
            Self::L7VetoEvaluated => "L7_VETO_EVALUATED",
            Self::VetoCorrectiveSignalEmitted => "VETO_CORRECTIVE_SIGNAL_EMITTED",
            Self::L6DriftEvaluated => "L6_DRIFT_EVALUATED",
            Self::RecalibrationRequested => "RECALIBRATION_REQUESTED",
        }
    }
}

impl fmt::Display for CustodyStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One timeline entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustodyStep {
    /// Position in the timeline, starting at 1.
    pub sequence: u32,
    /// Layer event.
    pub stage: CustodyStage,
    /// When the event happened.
    pub at: Timestamp,
    /// Short description.
    pub detail: String,
}

/// Finalized custody timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainOfCustody {
    /// Cycle identifier.
    evaluation_id: EvaluationId,
    /// Timeline entries in recording order.
    steps: Vec<CustodyStep>,
    /// Veto state the chain was sealed against.
    sealed_with_veto: bool,
}

impl ChainOfCustody {
    /// Returns the cycle identifier.
    #[must_use]
    pub const fn evaluation_id(&self) -> &EvaluationId {
        &self.evaluation_id
    }

    /// Returns the timeline entries.
    #[must_use]
    pub fn steps(&self) -> &[CustodyStep] {
        &self.steps
    }

    /// Returns the stages in recording order.
    pub fn stages(&self) -> impl Iterator<Item = CustodyStage> + '_ {
        self.steps.iter().map(|step| step.stage)
    }

    /// Returns whether the veto had triggered when the chain was sealed.
    #[must_use]
    pub const fn sealed_with_veto(&self) -> bool {
        self.sealed_with_veto
    }
}

/// Mutable custody timeline for an in-flight cycle.
#[derive(Debug, Clone)]
pub struct CustodyRecorder {
    /// Cycle identifier.
    evaluation_id: EvaluationId,
    /// Recorded entries.
    steps: Vec<CustodyStep>,
}

impl CustodyRecorder {
    /// Starts a timeline with a `REQUEST_RECEIVED` entry.
    #[must_use]
    pub fn start(evaluation_id: EvaluationId, at: Timestamp) -> Self {
        let mut recorder = Self {
            evaluation_id,
            steps: Vec::new(),
        };
        recorder.record(CustodyStage::RequestReceived, at, "evaluation request accepted");
        recorder
    }

    /// Appends a timeline entry.
    pub fn record(&mut self, stage: CustodyStage, at: Timestamp, detail: impl Into<String>) {
        let sequence = u32::try_from(self.steps.len()).map_or(u32::MAX, |len| len + 1);
        self.steps.push(CustodyStep {
            sequence,
            stage,
            at,
            detail: detail.into(),
        });
    }

    /// Seals the timeline against the finished veto result.
    #[must_use]
    pub fn finalize(self, veto: &VetoResult) -> ChainOfCustody {
        ChainOfCustody {
            evaluation_id: self.evaluation_id,
            steps: self.steps,
            sealed_with_veto: veto.veto_triggered(),
        }
    }
}

// ============================================================================
// SECTION: Governance Context
// ============================================================================

/// Identity of the constitution a cycle ran against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstitutionRef {
    /// Constitution name.
    pub name: ConstitutionName,
    /// Constitution version.
    pub version: ConstitutionVersion,
    /// Canonical content hash.
    pub hash: HashDigest,
}

/// Caller-supplied evaluation scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EvaluationScope {
    /// Industry of the requesting deployment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    /// Deployment profile.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    /// Legal jurisdiction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<String>,
}

/// L1-only view of a verdict carried in the governance context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerdictSnapshot {
    /// Allow or deny.
    pub decision: Decision,
    /// Aggregate severity.
    pub severity: Severity,
    /// Whether human oversight is required.
    pub human_oversight_required: bool,
    /// Whether the safe state was triggered.
    pub safe_state_triggered: bool,
}

/// Governance context section of the ADRA.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GovernanceContext {
    /// Constitution identity.
    constitution: ConstitutionRef,
    /// Caller-supplied scope.
    scope: EvaluationScope,
    /// Regimes enabled for the cycle, in declaration order.
    scope_enabled_regimes: Vec<RegimeId>,
    /// Per-regime decisions over the enabled regimes.
    regime_summaries: Vec<RegimeSummary>,
    /// L1 fields of the finished verdict.
    verdict_snapshot: VerdictSnapshot,
}

impl GovernanceContext {
    /// Builds the context from a finished verdict.
    #[must_use]
    pub fn new(
        constitution: ConstitutionRef,
        scope: EvaluationScope,
        scope_enabled_regimes: Vec<RegimeId>,
        regime_summaries: Vec<RegimeSummary>,
        verdict: &Verdict,
    ) -> Self {
        Self {
            constitution,
            scope,
            scope_enabled_regimes,
            regime_summaries,
            verdict_snapshot: VerdictSnapshot {
                decision: verdict.decision,
                severity: verdict.severity,
                human_oversight_required: verdict.human_oversight_required,
                safe_state_triggered: verdict.safe_state_triggered,
            },
        }
    }

    /// Returns the constitution identity.
    #[must_use]
    pub const fn constitution(&self) -> &ConstitutionRef {
        &self.constitution
    }

    /// Returns the caller-supplied scope.
    #[must_use]
    pub const fn scope(&self) -> &EvaluationScope {
        &self.scope
    }

    /// Returns the regimes enabled for the cycle.
    #[must_use]
    pub fn scope_enabled_regimes(&self) -> &[RegimeId] {
        &self.scope_enabled_regimes
    }

    /// Returns the per-regime decisions.
    #[must_use]
    pub fn regime_summaries(&self) -> &[RegimeSummary] {
        &self.regime_summaries
    }

    /// Returns the L1 verdict snapshot.
    #[must_use]
    pub const fn verdict_snapshot(&self) -> &VerdictSnapshot {
        &self.verdict_snapshot
    }
}

// ============================================================================
// SECTION: ADRA Record
// ============================================================================

/// L1 section: verdict plus the outcomes it was derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct L1Section {
    /// L1 verdict.
    pub verdict: Verdict,
    /// Policy outcomes in engine order.
    pub outcomes: Vec<PolicyOutcome>,
}

/// ADRA body covered by the envelope hash.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdraRecord {
    /// Record format version.
    pub(crate) adra_version: &'static str,
    /// Cycle identifier.
    pub(crate) evaluation_id: EvaluationId,
    /// Canonical hash of the constitution snapshot.
    pub(crate) constitution_hash: HashDigest,
    /// L1 section.
    pub(crate) l1_verdict: L1Section,
    /// L6 section.
    pub(crate) l6_drift: DriftResult,
    /// L7 section.
    pub(crate) l7_veto: VetoResult,
    /// Custody timeline.
    pub(crate) chain_of_custody: ChainOfCustody,
    /// Governance context.
    pub(crate) governance_context: GovernanceContext,
}

/// Sealed Audit/Decision Record Artifact.
///
/// # Invariants
/// - `envelope_hash` is the SHA-256 of the RFC 8785 form of `record`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Adra {
    /// Hashed body.
    #[serde(flatten)]
    pub(crate) record: AdraRecord,
    /// Envelope hash over `record`.
    pub(crate) envelope_hash: HashDigest,
}

impl Adra {
    /// Returns the record format version.
    #[must_use]
    pub const fn adra_version(&self) -> &'static str {
        self.record.adra_version
    }

    /// Returns the cycle identifier.
    #[must_use]
    pub const fn evaluation_id(&self) -> &EvaluationId {
        &self.record.evaluation_id
    }

    /// Returns the constitution hash.
    #[must_use]
    pub const fn constitution_hash(&self) -> &HashDigest {
        &self.record.constitution_hash
    }

    /// Returns the L1 verdict.
    #[must_use]
    pub const fn verdict(&self) -> &Verdict {
        &self.record.l1_verdict.verdict
    }

    /// Returns the L1 outcomes.
    #[must_use]
    pub fn outcomes(&self) -> &[PolicyOutcome] {
        &self.record.l1_verdict.outcomes
    }

    /// Returns the L6 drift result.
    #[must_use]
    pub const fn drift(&self) -> &DriftResult {
        &self.record.l6_drift
    }

    /// Returns the L7 veto result.
    #[must_use]
    pub const fn veto(&self) -> &VetoResult {
        &self.record.l7_veto
    }

    /// Returns the custody timeline.
    #[must_use]
    pub const fn chain_of_custody(&self) -> &ChainOfCustody {
        &self.record.chain_of_custody
    }

    /// Returns the governance context.
    #[must_use]
    pub const fn governance_context(&self) -> &GovernanceContext {
        &self.record.governance_context
    }

    /// Returns the envelope hash.
    #[must_use]
    pub const fn envelope_hash(&self) -> &HashDigest {
        &self.envelope_hash
    }

    /// Returns the hashed body.
    #[must_use]
    pub const fn record(&self) -> &AdraRecord {
        &self.record
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// ADRA sections that must be present at assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdraSection {
    /// L1 verdict.
    L1Verdict,
    /// L6 drift result.
    L6Drift,
    /// L7 veto result.
    L7Veto,
    /// Chain of custody.
    ChainOfCustody,
}

impl fmt::Display for AdraSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::L1Verdict => "l1_verdict",
            Self::L6Drift => "l6_drift",
            Self::L7Veto => "l7_veto",
            Self::ChainOfCustody => "chain_of_custody",
        };
        f.write_str(label)
    }
}

/// ADRA assembly failures.
#[derive(Debug, Error)]
pub enum AdraError {
    /// A required section was not supplied.
    #[error("adra section missing: {0}")]
    MissingSection(AdraSection),
    /// The envelope hash could not be computed.
    #[error("adra hashing failed: {0}")]
    Hash(#[from] HashError),
}
