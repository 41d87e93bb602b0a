// covenant-logic/src/requirement.rs
// ============================================================================
// Module: Requirement Tree
// Description: Boolean algebra over typed predicates.
// Purpose: Define `Requirement` with short-circuit evaluation and tree helpers.
// Dependencies: serde::{Deserialize, Serialize}, smallvec::SmallVec
// ============================================================================

//! ## Overview
//! This module defines the requirement tree. The logical operators (`And`,
//! `Or`, `Not`) are universal, while [`Requirement::Predicate`] is the boundary
//! where domain semantics are injected through [`PredicateEval`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use smallvec::SmallVec;

use crate::traits::PredicateEval;

// ============================================================================
// SECTION: Requirement Definition
// ============================================================================

/// Requirement tree with domain-specific leaves.
///
/// # Invariants
/// - Empty `And` is trivially satisfied; empty `Or` is trivially unsatisfiable.
///   Validators may reject empty combinators before they reach evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Requirement<P> {
    /// Logical AND: all sub-requirements must hold.
    ///
    /// Evaluation short-circuits on the first failure.
    And(SmallVec<[Box<Self>; 4]>),

    /// Logical OR: at least one sub-requirement must hold.
    ///
    /// Evaluation short-circuits on the first success.
    Or(SmallVec<[Box<Self>; 4]>),

    /// Logical NOT.
    Not(Box<Self>),

    /// Domain-specific atomic predicate.
    Predicate(P),
}

// ============================================================================
// SECTION: Evaluation
// ============================================================================

impl<P> Requirement<P> {
    /// Evaluates this requirement left-to-right with short-circuiting.
    pub fn eval(&self, ctx: &P::Context<'_>) -> bool
    where
        P: PredicateEval,
    {
        match self {
            Self::Predicate(predicate) => predicate.eval(ctx),
            Self::Not(requirement) => !requirement.eval(ctx),
            Self::And(requirements) => {
                for inner in requirements {
                    if !inner.eval(ctx) {
                        return false;
                    }
                }
                true
            }
            Self::Or(requirements) => {
                for inner in requirements {
                    if inner.eval(ctx) {
                        return true;
                    }
                }
                false
            }
        }
    }

    /// Returns the number of nodes in this requirement tree.
    pub fn complexity(&self) -> usize {
        match self {
            Self::Predicate(_) => 1,
            Self::Not(inner) => 1 + inner.complexity(),
            Self::And(children) | Self::Or(children) => {
                1 + children.iter().map(|child| child.complexity()).sum::<usize>()
            }
        }
    }

    /// Returns the depth of this requirement tree (a lone predicate has depth 1).
    pub fn depth(&self) -> usize {
        match self {
            Self::Predicate(_) => 1,
            Self::Not(inner) => 1 + inner.depth(),
            Self::And(children) | Self::Or(children) => {
                1 + children.iter().map(|child| child.depth()).max().unwrap_or(0)
            }
        }
    }

    /// Visits every predicate leaf in declaration order.
    pub fn for_each_predicate<F>(&self, visit: &mut F)
    where
        F: FnMut(&P),
    {
        match self {
            Self::Predicate(predicate) => visit(predicate),
            Self::Not(inner) => inner.for_each_predicate(visit),
            Self::And(children) | Self::Or(children) => {
                for inner in children {
                    inner.for_each_predicate(visit);
                }
            }
        }
    }

    /// Returns true when any predicate leaf satisfies the test.
    pub fn any_predicate<F>(&self, test: &F) -> bool
    where
        F: Fn(&P) -> bool,
    {
        match self {
            Self::Predicate(predicate) => test(predicate),
            Self::Not(inner) => inner.any_predicate(test),
            Self::And(children) | Self::Or(children) => {
                children.iter().any(|child| child.any_predicate(test))
            }
        }
    }
}

// ============================================================================
// SECTION: Constructor Helpers
// ============================================================================

impl<P> Requirement<P> {
    /// Creates a logical AND of the given requirements.
    pub fn and(requirements: Vec<Self>) -> Self {
        Self::And(requirements.into_iter().map(Box::new).collect())
    }

    /// Creates a logical OR of the given requirements.
    pub fn or(requirements: Vec<Self>) -> Self {
        Self::Or(requirements.into_iter().map(Box::new).collect())
    }

    /// Creates a logical NOT of the given requirement.
    pub fn negate(requirement: Self) -> Self {
        Self::Not(Box::new(requirement))
    }

    /// Creates a requirement from a predicate.
    pub const fn predicate(predicate: P) -> Self {
        Self::Predicate(predicate)
    }
}

impl<P> std::ops::Not for Requirement<P> {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self::Not(Box::new(self))
    }
}

impl<P> Default for Requirement<P> {
    /// Creates an empty And requirement (trivially satisfied).
    fn default() -> Self {
        Self::And(SmallVec::new())
    }
}
