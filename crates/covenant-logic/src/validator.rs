// covenant-logic/src/validator.rs
// ============================================================================
// Module: Requirement Validator
// Description: Structural validation for requirement trees.
// Purpose: Bound depth and reject degenerate combinators before evaluation.
// Dependencies: std::fmt
// ============================================================================

//! ## Overview
//! Requirement trees arrive from untrusted rule corpora. The validator enforces
//! a depth ceiling (so evaluation recursion stays bounded) and, optionally,
//! rejects empty `And`/`Or` nodes whose vacuous truth values are easy to
//! author by accident.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use crate::requirement::Requirement;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Structural validation failures.
///
/// # Invariants
/// - Each variant names the violated limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Requirement tree exceeds the depth ceiling.
    TooDeep {
        /// Maximum supported tree depth.
        max_depth: usize,
        /// Depth encountered during validation.
        actual_depth: usize,
    },
    /// An empty combinator was found while empty combinators are disallowed.
    EmptyLogical {
        /// Combinator name (`and` or `or`).
        operator: &'static str,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooDeep {
                max_depth,
                actual_depth,
            } => {
                write!(f, "requirement tree too deep: {actual_depth} levels (max {max_depth})")
            }
            Self::EmptyLogical {
                operator,
            } => write!(f, "empty `{operator}` requirement not allowed"),
        }
    }
}

impl std::error::Error for ValidationError {}

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Validator configuration.
///
/// # Invariants
/// - Bounds are taken as given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorConfig {
    /// Maximum allowed depth for requirement trees.
    pub max_depth: usize,
    /// Whether to allow empty And/Or requirements.
    pub allow_empty_logical: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_depth: 32,
            allow_empty_logical: false,
        }
    }
}

// ============================================================================
// SECTION: Requirement Validator
// ============================================================================

/// Validator for requirement trees.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequirementValidator {
    /// Validation configuration for structure limits.
    config: ValidatorConfig,
}

impl RequirementValidator {
    /// Creates a new validator with the given configuration.
    #[must_use]
    pub const fn new(config: ValidatorConfig) -> Self {
        Self {
            config,
        }
    }

    /// Creates a validator with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Validates a requirement tree.
    ///
    /// Only structure is checked; predicate semantics belong to the domain.
    ///
    /// # Errors
    /// Returns [`ValidationError`] when the requirement violates structural limits.
    pub fn validate<P>(&self, requirement: &Requirement<P>) -> Result<(), ValidationError> {
        self.validate_node(requirement, 1)
    }

    /// Validates one node and recurses into its children.
    fn validate_node<P>(
        &self,
        requirement: &Requirement<P>,
        depth: usize,
    ) -> Result<(), ValidationError> {
        if depth > self.config.max_depth {
            return Err(ValidationError::TooDeep {
                max_depth: self.config.max_depth,
                actual_depth: depth,
            });
        }

        match requirement {
            Requirement::And(children) | Requirement::Or(children) => {
                if children.is_empty() && !self.config.allow_empty_logical {
                    let operator = if matches!(requirement, Requirement::And(_)) {
                        "and"
                    } else {
                        "or"
                    };
                    return Err(ValidationError::EmptyLogical {
                        operator,
                    });
                }
                for inner in children {
                    self.validate_node(inner, depth + 1)?;
                }
            }
            Requirement::Not(inner) => self.validate_node(inner, depth + 1)?,
            Requirement::Predicate(_) => {}
        }
        Ok(())
    }
}
