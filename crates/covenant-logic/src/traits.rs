// covenant-logic/src/traits.rs
// ============================================================================
// Module: Requirement Traits
// Description: Evaluation contract for requirement leaves.
// Purpose: Let domains plug predicate semantics into the generic tree walker.
// Dependencies: none
// ============================================================================

//! ## Overview
//! A predicate is evaluated against a borrowed context supplied by the caller.
//! The context is a generic associated type so that domains can thread scoped
//! bindings (for example the element bound by an existential quantifier)
//! through nested requirement trees without allocation.

// ============================================================================
// SECTION: Predicate Trait
// ============================================================================

/// Core trait for predicate evaluation.
///
/// # Invariants
/// - Evaluation must be side-effect free. Short-circuit order in
///   [`crate::Requirement::eval`] is an optimization only and must never be
///   observable through a predicate.
/// - Evaluation must be total: predicates return `false` rather than fail when
///   their inputs are missing or mistyped.
pub trait PredicateEval {
    /// Domain-specific evaluation context.
    type Context<'a>;

    /// Evaluates the predicate against the context.
    fn eval(&self, ctx: &Self::Context<'_>) -> bool;
}
