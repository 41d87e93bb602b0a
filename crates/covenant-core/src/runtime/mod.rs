// covenant-core/src/runtime/mod.rs
// ============================================================================
// Module: Covenant Runtime
// Description: Rule engine, verdict, veto, drift, ADRA assembly, and kernel.
// Purpose: Execute constitutional evaluation cycles against host collaborators.
// Dependencies: crate::{core, interfaces}, covenant-logic
// ============================================================================

//! ## Overview
//! Runtime modules turn a validated constitution and a payload into a sealed
//! ADRA. The engine, verdict, and veto functions are pure; the drift monitor
//! and registry hold shared state; the kernel sequences a full cycle.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod adra;
pub mod drift;
pub mod engine;
pub mod evaluator;
pub mod kernel;
pub mod memory;
pub mod registry;
pub mod retry;
pub mod verdict;
pub mod veto;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use adra::assemble_adra;
pub use adra::verify_envelope;
pub use drift::DEFAULT_DRIFT_THRESHOLD;
pub use drift::DEFAULT_EMA_ALPHA;
pub use drift::DEFAULT_SIGNIFICANT_DELTA;
pub use drift::DriftConfig;
pub use drift::DriftError;
pub use drift::DriftMonitor;
pub use drift::default_weights;
pub use engine::evaluate_rules;
pub use engine::evaluate_rules_in_scope;
pub use evaluator::EvalScope;
pub use kernel::Collaborators;
pub use kernel::DEFAULT_EMISSION_WINDOW;
pub use kernel::EvaluationReport;
pub use kernel::EvaluationRequest;
pub use kernel::Kernel;
pub use kernel::KernelError;
pub use kernel::PublishStatus;
pub use memory::InMemoryAuditSink;
pub use memory::InMemoryBaselineStore;
pub use memory::InMemoryBehavioralFeed;
pub use memory::InMemoryRecalibrationChannel;
pub use memory::LogicalClock;
pub use registry::ActiveConstitution;
pub use registry::ConstitutionRegistry;
pub use registry::RegistryError;
pub use retry::Attempted;
pub use retry::DEFAULT_MAX_ATTEMPTS;
pub use retry::RetryPolicy;
pub use verdict::assemble_verdict;
pub use veto::compute_veto;
