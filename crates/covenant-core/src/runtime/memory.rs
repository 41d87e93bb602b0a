// covenant-core/src/runtime/memory.rs
// ============================================================================
// Module: Covenant In-Memory Collaborators
// Description: In-memory collaborators, baseline store, and logical clock.
// Purpose: Provide deterministic collaborator implementations without external deps.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! These implementations back tests and local demos. Handles are cheap to
//! clone and share state, so a test can hand one clone to the kernel and
//! inspect another. Each fallible collaborator can be told to fail its next
//! `n` calls to exercise retry paths.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::atomic::AtomicU32;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use crate::core::adra::Adra;
use crate::core::audit::AuditEvent;
use crate::core::drift::BehavioralSignal;
use crate::core::drift::DriftBaseline;
use crate::core::drift::RecalibrationRequest;
use crate::core::identifiers::AgentId;
use crate::core::time::Timestamp;
use crate::interfaces::AuditError;
use crate::interfaces::AuditSink;
use crate::interfaces::BaselineStore;
use crate::interfaces::BaselineStoreError;
use crate::interfaces::BehavioralFeed;
use crate::interfaces::Clock;
use crate::interfaces::FeedError;
use crate::interfaces::RecalibrationChannel;
use crate::interfaces::RecalibrationError;

// ============================================================================
// SECTION: Failure Injection
// ============================================================================

/// Countdown of calls that should fail.
#[derive(Debug, Default, Clone)]
struct FailureBudget {
    /// Remaining failures.
    remaining: Arc<AtomicU32>,
}

impl FailureBudget {
    /// Sets the number of upcoming calls that fail.
    fn set(&self, count: u32) {
        self.remaining.store(count, Ordering::SeqCst);
    }

    /// Consumes one failure if any remain.
    fn take(&self) -> bool {
        self.remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

/// Locks a mutex, mapping poisoning to a message.
fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, String> {
    mutex.lock().map_err(|_| "in-memory collaborator mutex poisoned".to_string())
}

// ============================================================================
// SECTION: Audit Sink
// ============================================================================

/// In-memory audit sink recording events and published ADRAs.
#[derive(Debug, Default, Clone)]
pub struct InMemoryAuditSink {
    /// Emitted events in order.
    events: Arc<Mutex<Vec<AuditEvent>>>,
    /// Published records in order.
    published: Arc<Mutex<Vec<Adra>>>,
    /// Upcoming emit failures.
    emit_failures: FailureBudget,
    /// Upcoming publish failures.
    publish_failures: FailureBudget,
}

impl InMemoryAuditSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `count` emit calls fail.
    pub fn fail_next_emits(&self, count: u32) {
        self.emit_failures.set(count);
    }

    /// Makes the next `count` publish calls fail.
    pub fn fail_next_publishes(&self, count: u32) {
        self.publish_failures.set(count);
    }

    /// Returns emitted events.
    #[must_use]
    pub fn events(&self) -> Vec<AuditEvent> {
        lock(&self.events).map(|guard| guard.clone()).unwrap_or_default()
    }

    /// Returns published records.
    #[must_use]
    pub fn published(&self) -> Vec<Adra> {
        lock(&self.published).map(|guard| guard.clone()).unwrap_or_default()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn emit(&self, event: &AuditEvent) -> Result<(), AuditError> {
        if self.emit_failures.take() {
            return Err(AuditError::Unavailable("injected emit failure".to_string()));
        }
        lock(&self.events).map_err(AuditError::Unavailable)?.push(event.clone());
        Ok(())
    }

    fn publish(&self, adra: &Adra) -> Result<(), AuditError> {
        if self.publish_failures.take() {
            return Err(AuditError::Unavailable("injected publish failure".to_string()));
        }
        lock(&self.published).map_err(AuditError::Unavailable)?.push(adra.clone());
        Ok(())
    }
}

// ============================================================================
// SECTION: Behavioral Feed
// ============================================================================

/// In-memory behavioral feed holding the latest signal per identity.
#[derive(Debug, Default, Clone)]
pub struct InMemoryBehavioralFeed {
    /// Latest signal per identity.
    signals: Arc<Mutex<BTreeMap<AgentId, BehavioralSignal>>>,
    /// Upcoming observe failures.
    failures: FailureBudget,
}

impl InMemoryBehavioralFeed {
    /// Creates an empty feed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a signal, replacing any previous one for the same identity.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Unavailable`] when the feed mutex is poisoned.
    pub fn push(&self, signal: BehavioralSignal) -> Result<(), FeedError> {
        let mut guard = lock(&self.signals).map_err(FeedError::Unavailable)?;
        guard.insert(signal.identity.clone(), signal);
        Ok(())
    }

    /// Makes the next `count` observe calls fail.
    pub fn fail_next(&self, count: u32) {
        self.failures.set(count);
    }
}

impl BehavioralFeed for InMemoryBehavioralFeed {
    fn observe(&self, identity: &AgentId) -> Result<Option<BehavioralSignal>, FeedError> {
        if self.failures.take() {
            return Err(FeedError::Unavailable("injected feed failure".to_string()));
        }
        Ok(lock(&self.signals).map_err(FeedError::Unavailable)?.get(identity).cloned())
    }
}

// ============================================================================
// SECTION: Recalibration Channel
// ============================================================================

/// In-memory recalibration channel recording accepted requests.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRecalibrationChannel {
    /// Accepted requests in order.
    requests: Arc<Mutex<Vec<RecalibrationRequest>>>,
    /// Upcoming request failures.
    failures: FailureBudget,
}

impl InMemoryRecalibrationChannel {
    /// Creates an empty channel.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `count` request calls fail.
    pub fn fail_next(&self, count: u32) {
        self.failures.set(count);
    }

    /// Returns accepted requests.
    #[must_use]
    pub fn requests(&self) -> Vec<RecalibrationRequest> {
        lock(&self.requests).map(|guard| guard.clone()).unwrap_or_default()
    }
}

impl RecalibrationChannel for InMemoryRecalibrationChannel {
    fn request(&self, request: &RecalibrationRequest) -> Result<(), RecalibrationError> {
        if self.failures.take() {
            return Err(RecalibrationError::Unavailable("injected channel failure".to_string()));
        }
        lock(&self.requests).map_err(RecalibrationError::Unavailable)?.push(request.clone());
        Ok(())
    }
}

// ============================================================================
// SECTION: Baseline Store
// ============================================================================

/// In-memory baseline store shared between clones.
#[derive(Debug, Default, Clone)]
pub struct InMemoryBaselineStore {
    /// Stored baselines per identity.
    baselines: Arc<Mutex<BTreeMap<AgentId, DriftBaseline>>>,
    /// Upcoming load failures.
    load_failures: FailureBudget,
    /// Upcoming save failures.
    save_failures: FailureBudget,
}

impl InMemoryBaselineStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `count` load calls fail.
    pub fn fail_next_loads(&self, count: u32) {
        self.load_failures.set(count);
    }

    /// Makes the next `count` save calls fail.
    pub fn fail_next_saves(&self, count: u32) {
        self.save_failures.set(count);
    }

    /// Returns the stored baseline for an identity.
    #[must_use]
    pub fn get(&self, identity: &AgentId) -> Option<DriftBaseline> {
        lock(&self.baselines).ok().and_then(|guard| guard.get(identity).cloned())
    }
}

impl BaselineStore for InMemoryBaselineStore {
    fn load(&self, identity: &AgentId) -> Result<Option<DriftBaseline>, BaselineStoreError> {
        if self.load_failures.take() {
            return Err(BaselineStoreError::Unavailable("injected load failure".to_string()));
        }
        Ok(lock(&self.baselines).map_err(BaselineStoreError::Unavailable)?.get(identity).cloned())
    }

    fn save(&self, identity: &AgentId, baseline: &DriftBaseline) -> Result<(), BaselineStoreError> {
        if self.save_failures.take() {
            return Err(BaselineStoreError::Unavailable("injected save failure".to_string()));
        }
        lock(&self.baselines)
            .map_err(BaselineStoreError::Unavailable)?
            .insert(identity.clone(), baseline.clone());
        Ok(())
    }
}

// ============================================================================
// SECTION: Logical Clock
// ============================================================================

/// Monotonic logical clock; each call returns the next tick.
#[derive(Debug, Default, Clone)]
pub struct LogicalClock {
    /// Last issued tick.
    tick: Arc<AtomicU64>,
}

impl LogicalClock {
    /// Creates a clock starting at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for LogicalClock {
    fn now(&self) -> Timestamp {
        Timestamp::Logical(self.tick.fetch_add(1, Ordering::SeqCst) + 1)
    }
}
