// covenant-core/src/lib.rs
// ============================================================================
// Module: Covenant Core Library
// Description: Public API surface for the Covenant constitutional kernel.
// Purpose: Expose core types, the condition DSL, interfaces, and runtime.
// Dependencies: crate::{core, dsl, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Covenant core evaluates requests against a constitution of domains,
//! articles, and rules. It produces a deterministic L1 verdict, a fail-closed
//! L7 veto with a corrective signal, an independent L6 behavioral drift
//! assessment, and a hash-sealed ADRA record joining all three. Hosts plug
//! in through the traits in [`interfaces`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod dsl;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::*;

pub use dsl::DslError;
pub use dsl::parse_condition;
pub use interfaces::AuditError;
pub use interfaces::AuditSink;
pub use interfaces::BaselineStore;
pub use interfaces::BaselineStoreError;
pub use interfaces::BehavioralFeed;
pub use interfaces::Clock;
pub use interfaces::FeedError;
pub use interfaces::RecalibrationChannel;
pub use interfaces::RecalibrationError;
pub use runtime::Collaborators;
pub use runtime::ConstitutionRegistry;
pub use runtime::DriftConfig;
pub use runtime::DriftMonitor;
pub use runtime::EvaluationReport;
pub use runtime::EvaluationRequest;
pub use runtime::Kernel;
pub use runtime::KernelError;
pub use runtime::PublishStatus;
pub use runtime::RetryPolicy;
