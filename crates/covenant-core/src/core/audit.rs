// covenant-core/src/core/audit.rs
// ============================================================================
// Module: Covenant Audit Events
// Description: Side-effect events emitted to the audit sink.
// Purpose: Describe once-per-cycle emissions keyed by evaluation id.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Audit events are the only side effects the kernel raises outside the ADRA
//! itself. Each carries an idempotency key so sinks can drop duplicates.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

use crate::core::identifiers::EvaluationId;
use crate::core::time::Timestamp;
use crate::core::veto::CorrectiveSignal;
use crate::core::veto::VetoCategory;

// ============================================================================
// SECTION: Audit Events
// ============================================================================

/// Event emitted to an [`crate::interfaces::AuditSink`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditEvent {
    /// A veto triggered and its corrective signal was published.
    VetoCorrectiveSignalEmitted {
        /// Cycle identifier.
        evaluation_id: EvaluationId,
        /// Key sinks use to drop duplicates; equal to the evaluation id.
        idempotency_key: String,
        /// Emission time.
        emitted_at: Timestamp,
        /// Veto category.
        veto_category: VetoCategory,
        /// Corrective signal published to the caller.
        corrective_signal: CorrectiveSignal,
    },
}

impl AuditEvent {
    /// Builds the veto emission event for a cycle.
    #[must_use]
    pub fn veto_emitted(
        evaluation_id: &EvaluationId,
        emitted_at: Timestamp,
        veto_category: VetoCategory,
        corrective_signal: CorrectiveSignal,
    ) -> Self {
        Self::VetoCorrectiveSignalEmitted {
            evaluation_id: evaluation_id.clone(),
            idempotency_key: evaluation_id.as_str().to_string(),
            emitted_at,
            veto_category,
            corrective_signal,
        }
    }

    /// Returns the event's idempotency key.
    #[must_use]
    pub fn idempotency_key(&self) -> &str {
        match self {
            Self::VetoCorrectiveSignalEmitted {
                idempotency_key,
                ..
            } => idempotency_key,
        }
    }

    /// Returns the event name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::VetoCorrectiveSignalEmitted {
                ..
            } => "VETO_CORRECTIVE_SIGNAL_EMITTED",
        }
    }
}
