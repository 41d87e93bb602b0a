// covenant-logic/src/lib.rs
// ============================================================================
// Module: Covenant Logic Root
// Description: Public API surface for the boolean requirement algebra.
// Purpose: Wire together requirement trees, evaluation traits, and validation.
// Dependencies: crate::{requirement, traits, validator}
// ============================================================================

//! ## Overview
//! `covenant-logic` is the domain-agnostic half of the condition language. It
//! owns the `and`/`or`/`not` tree shape and its short-circuit evaluation, while
//! leaves (predicates) are supplied by the caller through [`PredicateEval`].
//! The constitution kernel instantiates it with field-path predicates.

// ============================================================================
// SECTION: Core Modules
// ============================================================================

pub mod requirement;
pub mod traits;
pub mod validator;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use requirement::Requirement;
pub use traits::PredicateEval;
pub use validator::RequirementValidator;
pub use validator::ValidationError;
pub use validator::ValidatorConfig;
