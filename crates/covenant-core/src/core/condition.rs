// covenant-core/src/core/condition.rs
// ============================================================================
// Module: Covenant Conditions
// Description: Predicate leaves of the constitutional condition language.
// Purpose: Define the typed condition tree produced by corpus parsers.
// Dependencies: covenant-logic, serde, serde_json
// ============================================================================

//! ## Overview
//! A [`Condition`] is a [`Requirement`] tree whose leaves are [`Predicate`]s:
//! comparisons, set membership, `missing`/`empty` checks, and the existential
//! quantifier `any`. The tree shape is part of the kernel contract; any corpus
//! format must produce it. Evaluation lives in
//! [`crate::runtime::evaluator`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use covenant_logic::Requirement;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::value::FieldPath;

// ============================================================================
// SECTION: Condition Types
// ============================================================================

/// Condition tree evaluated against a payload.
pub type Condition = Requirement<Predicate>;

/// Comparison operators for [`Predicate::Compare`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `<`
    LessThan,
    /// `<=`
    LessThanOrEqual,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterThanOrEqual,
}

impl CompareOp {
    /// Returns the operator's surface symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Collection scanned by [`Predicate::Any`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    /// A list (or map values) at a path.
    Path(FieldPath),
    /// The outcome sequence produced by the non-meta pass.
    Policies,
}

/// Leaf predicate of the condition language.
///
/// # Invariants
/// - Literals are JSON scalars (string, number, bool, null).
/// - `Any` bodies may reference `item.…` paths; other predicates may only do
///   so when nested inside an `Any`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Predicate {
    /// `path <op> literal`.
    Compare {
        /// Field being compared.
        path: FieldPath,
        /// Comparison operator.
        op: CompareOp,
        /// Literal right-hand side.
        literal: Value,
    },
    /// `path in [...]` or `path not_in [...]`.
    Membership {
        /// Field being tested.
        path: FieldPath,
        /// True for `not_in`.
        negated: bool,
        /// Literal set.
        set: Vec<Value>,
    },
    /// `missing(path)`: absent or null.
    Missing {
        /// Field being checked.
        path: FieldPath,
    },
    /// `empty(path)`: present blank string or empty collection.
    Empty {
        /// Field being checked.
        path: FieldPath,
    },
    /// `any(collection, condition)`: existential quantifier.
    Any {
        /// Collection to scan.
        collection: Collection,
        /// Condition evaluated once per element, with the element bound to `item`.
        condition: Box<Condition>,
    },
}

impl Predicate {
    /// Returns true when this leaf (or a nested quantifier body) scans the
    /// outcome sequence.
    #[must_use]
    pub fn scans_policies(&self) -> bool {
        match self {
            Self::Any {
                collection,
                condition,
            } => {
                matches!(collection, Collection::Policies)
                    || condition.any_predicate(&Self::scans_policies)
            }
            Self::Compare {
                ..
            }
            | Self::Membership {
                ..
            }
            | Self::Missing {
                ..
            }
            | Self::Empty {
                ..
            } => false,
        }
    }
}
