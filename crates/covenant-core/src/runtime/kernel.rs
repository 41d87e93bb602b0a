// covenant-core/src/runtime/kernel.rs
// ============================================================================
// Module: Covenant Kernel
// Description: Evaluation cycle orchestration across L1, L6, and L7.
// Purpose: Run one request through the rule engine, veto path, and drift
//          monitor and seal the result into an ADRA.
// Dependencies: crate::{core, interfaces, runtime}, thiserror, tracing
// ============================================================================

//! ## Overview
//! A cycle snapshots the active constitution, then runs two independent
//! paths:
//! - the decision path (rule engine, L1 verdict, L7 veto, veto emission) on
//!   the calling thread;
//! - the drift path (feed, monitor, recalibration) on a scoped thread.
//!
//! The drift path receives only the identity; it never sees the payload,
//! outcomes, verdict, or veto. The two results meet only at ADRA assembly.
//! Collaborator failures are retried and reported but never change L1 or L7.
//! A failing or panicking drift path degrades to an UNKNOWN drift result;
//! once the decision path has run, the cycle always seals a record.
//!
//! The request's [`EvaluationScope`] selects the enabled regimes through the
//! kernel's [`RegimeScope`]; articles of other regimes are not evaluated.
//!
//! Veto emissions are deduplicated per evaluation id within a bounded window
//! of the most recent claims; older ids are forgotten first.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::thread;

use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::core::adra::Adra;
use crate::core::adra::AdraError;
use crate::core::adra::AdraSection;
use crate::core::adra::ConstitutionRef;
use crate::core::adra::CustodyRecorder;
use crate::core::adra::CustodyStage;
use crate::core::adra::EvaluationScope;
use crate::core::adra::GovernanceContext;
use crate::core::adra::L1Section;
use crate::core::audit::AuditEvent;
use crate::core::constitution::Constitution;
use crate::core::drift::DriftResult;
use crate::core::drift::RecalibrationRequest;
use crate::core::identifiers::AgentId;
use crate::core::identifiers::EvaluationId;
use crate::core::identifiers::RegimeId;
use crate::core::scope::RegimeScope;
use crate::core::scope::summarize_regimes;
use crate::core::time::Timestamp;
use crate::core::veto::VetoResult;
use crate::interfaces::AuditSink;
use crate::interfaces::BehavioralFeed;
use crate::interfaces::Clock;
use crate::interfaces::RecalibrationChannel;
use crate::runtime::adra::assemble_adra;
use crate::runtime::drift::DriftMonitor;
use crate::runtime::engine::evaluate_rules_in_scope;
use crate::runtime::registry::ActiveConstitution;
use crate::runtime::registry::ConstitutionRegistry;
use crate::runtime::registry::RegistryError;
use crate::runtime::retry::RetryPolicy;
use crate::runtime::verdict::assemble_verdict;
use crate::runtime::veto::compute_veto;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default number of recent evaluation ids remembered for veto deduplication.
pub const DEFAULT_EMISSION_WINDOW: usize = 65_536;

// ============================================================================
// SECTION: Requests and Reports
// ============================================================================

/// Input to one evaluation cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationRequest {
    /// Cycle identifier; also the idempotency key for audit emissions.
    pub evaluation_id: EvaluationId,
    /// Agent or session whose behavior the drift path observes.
    pub identity: AgentId,
    /// Payload the rules evaluate.
    pub payload: Value,
    /// Caller-supplied scope recorded in the governance context.
    pub scope: EvaluationScope,
}

impl EvaluationRequest {
    /// Creates a request with an empty scope.
    #[must_use]
    pub fn new(evaluation_id: EvaluationId, identity: AgentId, payload: Value) -> Self {
        Self {
            evaluation_id,
            identity,
            payload,
            scope: EvaluationScope::default(),
        }
    }
}

/// Delivery status of the sealed ADRA.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishStatus {
    /// The audit sink accepted the record.
    Published {
        /// Attempts made.
        attempts: u32,
    },
    /// Every attempt failed.
    Failed {
        /// Attempts made.
        attempts: u32,
        /// Last error message.
        error: String,
    },
}

/// Result of one evaluation cycle.
#[derive(Debug, Clone)]
pub struct EvaluationReport {
    /// Sealed record.
    pub adra: Adra,
    /// Delivery status of the record.
    pub publish_status: PublishStatus,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Kernel errors.
#[derive(Debug, Error)]
pub enum KernelError {
    /// The rule corpus failed validation.
    #[error("malformed rule corpus: {0}")]
    MalformedCorpus(String),
    /// The ADRA could not be assembled because a section was missing.
    #[error("incomplete record: section {0} missing")]
    IncompleteRecord(AdraSection),
    /// Shared state could not be accessed.
    #[error("kernel state unavailable: {0}")]
    StateUnavailable(String),
    /// Canonical hashing failed.
    #[error("hashing failed: {0}")]
    HashingFailed(String),
}

impl KernelError {
    /// Returns the taxonomy tag for the error.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::MalformedCorpus(_) => "MALFORMED_CORPUS",
            Self::IncompleteRecord(_) => "INCOMPLETE_RECORD",
            Self::StateUnavailable(_) => "STATE_UNAVAILABLE",
            Self::HashingFailed(_) => "HASHING_FAILED",
        }
    }
}

impl From<RegistryError> for KernelError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::Rejected(inner) => Self::MalformedCorpus(inner.to_string()),
            RegistryError::Hash(inner) => Self::HashingFailed(inner.to_string()),
            RegistryError::StateUnavailable(message) => Self::StateUnavailable(message),
        }
    }
}

impl From<AdraError> for KernelError {
    fn from(err: AdraError) -> Self {
        match err {
            AdraError::MissingSection(section) => Self::IncompleteRecord(section),
            AdraError::Hash(inner) => Self::HashingFailed(inner.to_string()),
        }
    }
}

// ============================================================================
// SECTION: Kernel
// ============================================================================

/// Host-supplied collaborators.
#[derive(Debug, Clone)]
pub struct Collaborators<A, F, R, C> {
    /// Audit sink.
    pub audit: A,
    /// Behavioral feed.
    pub feed: F,
    /// Recalibration channel.
    pub recalibration: R,
    /// Clock.
    pub clock: C,
}

/// Bounded record of evaluation ids whose veto event was claimed.
#[derive(Debug)]
struct EmissionLedger {
    /// Claimed ids.
    claimed: BTreeSet<EvaluationId>,
    /// Claim order, oldest first.
    order: VecDeque<EvaluationId>,
    /// Maximum ids remembered; at least one.
    capacity: usize,
}

impl EmissionLedger {
    /// Creates an empty ledger.
    fn new(capacity: usize) -> Self {
        Self {
            claimed: BTreeSet::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Claims an id, evicting the oldest claims when full; false if held.
    fn claim(&mut self, evaluation_id: &EvaluationId) -> bool {
        if self.claimed.contains(evaluation_id) {
            return false;
        }
        while self.order.len() >= self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.claimed.remove(&oldest);
        }
        self.claimed.insert(evaluation_id.clone());
        self.order.push_back(evaluation_id.clone());
        true
    }

    /// Drops a claim.
    fn release(&mut self, evaluation_id: &EvaluationId) {
        if self.claimed.remove(evaluation_id) {
            self.order.retain(|held| held != evaluation_id);
        }
    }
}

/// Outcome of the decision path.
struct DecisionPath {
    /// Regimes the cycle evaluated.
    enabled_regimes: Vec<RegimeId>,
    /// L1 section.
    l1: L1Section,
    /// L7 result.
    veto: VetoResult,
}

/// Outcome of the drift path.
struct DriftPath {
    /// L6 result.
    result: DriftResult,
    /// When the assessment completed.
    assessed_at: Timestamp,
    /// When a recalibration request was accepted, if one was.
    recalibrated_at: Option<Timestamp>,
}

/// Constitutional rule-evaluation kernel.
///
/// # Invariants
/// - At most one veto audit event is emitted per evaluation id among the
///   most recent emission-window claims.
/// - Each cycle evaluates against a single constitution snapshot.
pub struct Kernel<A, F, R, C> {
    /// Active constitution holder.
    registry: Arc<ConstitutionRegistry>,
    /// L6 monitor with rolling baselines.
    drift: DriftMonitor,
    /// Retry policy for collaborator calls.
    retry: RetryPolicy,
    /// Collaborators.
    collaborators: Collaborators<A, F, R, C>,
    /// Profile and jurisdiction tables for regime enablement.
    scope: RegimeScope,
    /// Evaluation ids whose veto event has been emitted or is being emitted.
    emitted: Mutex<EmissionLedger>,
}

impl<A, F, R, C> Kernel<A, F, R, C>
where
    A: AuditSink,
    F: BehavioralFeed,
    R: RecalibrationChannel,
    C: Clock,
{
    /// Creates a kernel.
    #[must_use]
    pub fn new(
        registry: Arc<ConstitutionRegistry>,
        drift: DriftMonitor,
        retry: RetryPolicy,
        collaborators: Collaborators<A, F, R, C>,
    ) -> Self {
        Self {
            registry,
            drift,
            retry,
            collaborators,
            scope: RegimeScope::default(),
            emitted: Mutex::new(EmissionLedger::new(DEFAULT_EMISSION_WINDOW)),
        }
    }

    /// Replaces the regime scope tables.
    #[must_use]
    pub fn with_regime_scope(mut self, scope: RegimeScope) -> Self {
        self.scope = scope;
        self
    }

    /// Sets how many recent evaluation ids are remembered for veto
    /// deduplication; values below one are raised to one.
    #[must_use]
    pub fn with_emission_window(mut self, capacity: usize) -> Self {
        self.emitted = Mutex::new(EmissionLedger::new(capacity));
        self
    }

    /// Returns the constitution registry.
    #[must_use]
    pub const fn registry(&self) -> &Arc<ConstitutionRegistry> {
        &self.registry
    }

    /// Returns the drift monitor.
    #[must_use]
    pub const fn drift_monitor(&self) -> &DriftMonitor {
        &self.drift
    }

    /// Returns the regime scope tables.
    #[must_use]
    pub const fn regime_scope(&self) -> &RegimeScope {
        &self.scope
    }

    /// Returns the collaborators.
    #[must_use]
    pub const fn collaborators(&self) -> &Collaborators<A, F, R, C> {
        &self.collaborators
    }

    /// Validates a candidate constitution and makes it active for new cycles.
    ///
    /// # Errors
    ///
    /// Returns [`KernelError::MalformedCorpus`] when the candidate is rejected.
    pub fn activate(&self, candidate: Constitution) -> Result<(), KernelError> {
        self.registry.activate(candidate)?;
        Ok(())
    }

    /// Runs one evaluation cycle.
    ///
    /// # Errors
    ///
    /// Returns [`KernelError`] when shared state is unavailable, the record is
    /// incomplete, or hashing fails. Collaborator failures are not errors.
    pub fn evaluate(&self, request: &EvaluationRequest) -> Result<EvaluationReport, KernelError> {
        let snapshot = self.registry.snapshot()?;
        info!(
            evaluation_id = %request.evaluation_id,
            identity = %request.identity,
            constitution = %snapshot.constitution().name,
            generation = snapshot.generation(),
            "evaluation cycle started"
        );
        let mut custody =
            CustodyRecorder::start(request.evaluation_id.clone(), self.collaborators.clock.now());

        let (decision, drift) = thread::scope(|scope| {
            let identity = &request.identity;
            let drift_worker = scope.spawn(move || self.run_drift(identity));
            let decision = self.run_decision(&snapshot, request, &mut custody);
            (decision, drift_worker.join())
        });
        let DecisionPath {
            enabled_regimes,
            l1,
            veto,
        } = decision?;
        let drift = drift.unwrap_or_else(|_| {
            warn!(
                evaluation_id = %request.evaluation_id,
                identity = %request.identity,
                "drift worker panicked; drift recorded as unknown"
            );
            DriftPath {
                result: DriftResult::unknown(
                    request.identity.clone(),
                    "Drift assessment aborted unexpectedly.",
                ),
                assessed_at: self.collaborators.clock.now(),
                recalibrated_at: None,
            }
        });

        custody.record(
            CustodyStage::L6DriftEvaluated,
            drift.assessed_at,
            format!(
                "{} ({}), score {:.3}",
                drift.result.drift_outcome, drift.result.resolution_state, drift.result.drift_score
            ),
        );
        if let Some(at) = drift.recalibrated_at {
            custody.record(
                CustodyStage::RecalibrationRequested,
                at,
                "forced recalibration requested",
            );
        }

        let governance = GovernanceContext::new(
            ConstitutionRef {
                name: snapshot.constitution().name.clone(),
                version: snapshot.constitution().version.clone(),
                hash: snapshot.hash().clone(),
            },
            request.scope.clone(),
            enabled_regimes.clone(),
            summarize_regimes(&enabled_regimes, &l1.outcomes),
            &l1.verdict,
        );
        let chain = custody.finalize(&veto);
        let adra =
            assemble_adra(Some(l1), Some(drift.result), Some(veto), Some(chain), governance)?;

        let attempt = self.retry.run("audit.publish", || self.collaborators.audit.publish(&adra));
        let publish_status = match attempt.result {
            Ok(()) => PublishStatus::Published {
                attempts: attempt.attempts,
            },
            Err(err) => PublishStatus::Failed {
                attempts: attempt.attempts,
                error: err.to_string(),
            },
        };

        info!(
            evaluation_id = %request.evaluation_id,
            decision = %adra.verdict().decision,
            veto_triggered = adra.veto().veto_triggered(),
            drift_outcome = %adra.drift().drift_outcome,
            envelope_hash = %adra.envelope_hash().to_prefixed(),
            "evaluation cycle complete"
        );
        Ok(EvaluationReport {
            adra,
            publish_status,
        })
    }

    /// Runs the rule engine, L1 verdict, and L7 veto path.
    fn run_decision(
        &self,
        snapshot: &ActiveConstitution,
        request: &EvaluationRequest,
        custody: &mut CustodyRecorder,
    ) -> Result<DecisionPath, KernelError> {
        let clock = &self.collaborators.clock;
        let enabled_regimes = self.scope.enabled_regimes(snapshot.constitution(), &request.scope);
        let outcomes =
            evaluate_rules_in_scope(snapshot.constitution(), &request.payload, &enabled_regimes);
        custody.record(
            CustodyStage::RulesEvaluated,
            clock.now(),
            format!(
                "{} policy outcome(s) across {} enabled regime(s)",
                outcomes.len(),
                enabled_regimes.len()
            ),
        );

        let verdict = assemble_verdict(&outcomes);
        custody.record(
            CustodyStage::L1VerdictComputed,
            clock.now(),
            format!("{} at {}", verdict.decision, verdict.severity),
        );

        let veto = compute_veto(&verdict, &outcomes);
        custody.record(
            CustodyStage::L7VetoEvaluated,
            clock.now(),
            format!("veto_triggered={} category={}", veto.veto_triggered(), veto.veto_category()),
        );
        self.emit_veto_once(&request.evaluation_id, &veto, custody)?;

        Ok(DecisionPath {
            enabled_regimes,
            l1: L1Section {
                verdict,
                outcomes,
            },
            veto,
        })
    }

    /// Emits the veto audit event unless this evaluation id already emitted one.
    fn emit_veto_once(
        &self,
        evaluation_id: &EvaluationId,
        veto: &VetoResult,
        custody: &mut CustodyRecorder,
    ) -> Result<(), KernelError> {
        let Some(signal) = veto.corrective_signal() else {
            return Ok(());
        };
        if !self.reserve_emission(evaluation_id)? {
            debug!(evaluation_id = %evaluation_id, "veto event already emitted");
            return Ok(());
        }

        let emitted_at = self.collaborators.clock.now();
        let event = AuditEvent::veto_emitted(
            evaluation_id,
            emitted_at,
            veto.veto_category(),
            signal.clone(),
        );
        let attempt = self.retry.run("audit.emit", || self.collaborators.audit.emit(&event));
        if attempt.result.is_ok() {
            custody.record(
                CustodyStage::VetoCorrectiveSignalEmitted,
                emitted_at,
                format!("idempotency_key={}", event.idempotency_key()),
            );
        } else {
            self.release_emission(evaluation_id)?;
        }
        Ok(())
    }

    /// Claims the emission slot for an evaluation id; false if already claimed.
    fn reserve_emission(&self, evaluation_id: &EvaluationId) -> Result<bool, KernelError> {
        let mut emitted = self.emitted.lock().map_err(|_| {
            KernelError::StateUnavailable("emission ledger mutex poisoned".to_string())
        })?;
        Ok(emitted.claim(evaluation_id))
    }

    /// Releases a claimed emission slot after a failed emission.
    fn release_emission(&self, evaluation_id: &EvaluationId) -> Result<(), KernelError> {
        let mut emitted = self.emitted.lock().map_err(|_| {
            KernelError::StateUnavailable("emission ledger mutex poisoned".to_string())
        })?;
        emitted.release(evaluation_id);
        Ok(())
    }

    /// Runs the feed, drift monitor, and recalibration channel.
    ///
    /// Every failure on this path degrades to an UNKNOWN drift result.
    fn run_drift(&self, identity: &AgentId) -> DriftPath {
        let clock = &self.collaborators.clock;
        let attempt = self.retry.run("feed.observe", || self.collaborators.feed.observe(identity));
        let mut result = match attempt.result {
            Ok(Some(signal)) => match self.drift.assess(&signal) {
                Ok(result) => result,
                Err(err) => {
                    warn!(identity = %identity, error = %err, "drift assessment failed");
                    DriftResult::unknown(
                        identity.clone(),
                        format!("Drift assessment unavailable: {err}"),
                    )
                }
            },
            Ok(None) => DriftResult::unknown(identity.clone(), "No behavioral signal available."),
            Err(err) => DriftResult::unknown(
                identity.clone(),
                format!("Behavioral feed unavailable: {err}"),
            ),
        };
        let assessed_at = clock.now();

        let mut recalibrated_at = None;
        if result.is_alert() {
            let request = RecalibrationRequest {
                identity: result.identity.clone(),
                drift_score: result.drift_score,
                reasons: result.explanation.clone(),
                requested_at: clock.now(),
            };
            let attempt = self.retry.run("recalibration.request", || {
                self.collaborators.recalibration.request(&request)
            });
            if attempt.result.is_ok() {
                result.recalibration_requested = true;
                recalibrated_at = Some(request.requested_at);
            }
        }

        DriftPath {
            result,
            assessed_at,
            recalibrated_at,
        }
    }
}
