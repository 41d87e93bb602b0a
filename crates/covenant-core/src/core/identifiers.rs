// covenant-core/src/core/identifiers.rs
// ============================================================================
// Module: Covenant Identifiers
// Description: Canonical opaque identifiers for constitutions and evaluations.
// Purpose: Provide strongly typed, serializable IDs with stable string forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Identifiers are opaque strings that serialize transparently. Uniqueness and
//! non-emptiness are checked where they matter (constitution validation),
//! not inside these wrappers.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Identifier Macro
// ============================================================================

/// Declares a transparent string identifier with the standard conversions.
macro_rules! string_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns true when the identifier is empty or whitespace.
            #[must_use]
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::new(value)
            }
        }
    };
}

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

string_identifier! {
    /// Constitution name (e.g. `covenant-default`).
    ConstitutionName
}

string_identifier! {
    /// Constitution version label.
    ConstitutionVersion
}

string_identifier! {
    /// Domain identifier within a constitution.
    DomainId
}

string_identifier! {
    /// Article identifier (e.g. `GDPR_ART_5`).
    ArticleId
}

string_identifier! {
    /// Rule identifier, unique across the whole constitution.
    RuleId
}

string_identifier! {
    /// Regulatory regime tag attached to an article (e.g. `GDPR`, `DSA`).
    RegimeId
}

string_identifier! {
    /// Evaluation cycle identifier; the idempotency key for audit emissions.
    EvaluationId
}

string_identifier! {
    /// Agent or session identity observed by the behavioral feed.
    AgentId
}
