// covenant-core/src/interfaces/mod.rs
// ============================================================================
// Module: Covenant Interfaces
// Description: Collaborator contracts for audit, behavior feeds, and clocks.
// Purpose: Keep the kernel free of I/O by routing every side effect through traits.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! The kernel never touches files, sockets, or the wall clock directly. Audit
//! sinks, behavioral feeds, recalibration channels, and clocks are supplied by
//! the host. Implementations must be thread-safe because the drift path runs
//! on its own scoped thread.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::adra::Adra;
use crate::core::audit::AuditEvent;
use crate::core::drift::BehavioralSignal;
use crate::core::drift::DriftBaseline;
use crate::core::drift::RecalibrationRequest;
use crate::core::identifiers::AgentId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Audit Sink
// ============================================================================

/// Audit sink errors.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Sink is temporarily unavailable.
    #[error("audit sink unavailable: {0}")]
    Unavailable(String),
    /// Record could not be serialized.
    #[error("audit record serialization failed: {0}")]
    Serialization(String),
}

/// Destination for audit events and sealed ADRAs.
pub trait AuditSink: Send + Sync {
    /// Emits a side-effect event.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError`] when the event cannot be recorded.
    fn emit(&self, event: &AuditEvent) -> Result<(), AuditError>;

    /// Publishes a sealed ADRA.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError`] when the record cannot be published.
    fn publish(&self, adra: &Adra) -> Result<(), AuditError>;
}

// ============================================================================
// SECTION: Behavioral Feed
// ============================================================================

/// Behavioral feed errors.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Feed is temporarily unavailable.
    #[error("behavioral feed unavailable: {0}")]
    Unavailable(String),
    /// Feed returned an unreadable signal.
    #[error("behavioral feed returned an invalid signal: {0}")]
    InvalidSignal(String),
}

/// Source of behavioral observations for the drift monitor.
pub trait BehavioralFeed: Send + Sync {
    /// Returns the latest observation for an identity, if any.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError`] when the feed cannot be read.
    fn observe(&self, identity: &AgentId) -> Result<Option<BehavioralSignal>, FeedError>;
}

// ============================================================================
// SECTION: Recalibration Channel
// ============================================================================

/// Recalibration channel errors.
#[derive(Debug, Error)]
pub enum RecalibrationError {
    /// Channel is temporarily unavailable.
    #[error("recalibration channel unavailable: {0}")]
    Unavailable(String),
}

/// Receiver of forced-recalibration requests.
pub trait RecalibrationChannel: Send + Sync {
    /// Submits a recalibration request.
    ///
    /// # Errors
    ///
    /// Returns [`RecalibrationError`] when the request is not accepted.
    fn request(&self, request: &RecalibrationRequest) -> Result<(), RecalibrationError>;
}

// ============================================================================
// SECTION: Baseline Store
// ============================================================================

/// Baseline store errors.
#[derive(Debug, Error)]
pub enum BaselineStoreError {
    /// Store is temporarily unavailable.
    #[error("baseline store unavailable: {0}")]
    Unavailable(String),
    /// Stored baselines could not be decoded or encoded.
    #[error("baseline store corrupt: {0}")]
    Corrupt(String),
}

/// Durable home for rolling drift baselines.
///
/// The drift monitor loads an identity's baseline the first time it sees the
/// identity and saves it after every assessment, so baselines survive process
/// restarts.
pub trait BaselineStore: Send + Sync {
    /// Returns the stored baseline for an identity, if any.
    ///
    /// # Errors
    ///
    /// Returns [`BaselineStoreError`] when the store cannot be read.
    fn load(&self, identity: &AgentId) -> Result<Option<DriftBaseline>, BaselineStoreError>;

    /// Replaces the stored baseline for an identity.
    ///
    /// # Errors
    ///
    /// Returns [`BaselineStoreError`] when the baseline cannot be written.
    fn save(&self, identity: &AgentId, baseline: &DriftBaseline) -> Result<(), BaselineStoreError>;
}

// ============================================================================
// SECTION: Clock
// ============================================================================

/// Time source for custody steps and audit events.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> Timestamp;
}
