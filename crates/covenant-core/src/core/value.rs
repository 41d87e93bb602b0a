// covenant-core/src/core/value.rs
// ============================================================================
// Module: Covenant Fact Values
// Description: Field paths and tagged present/absent/null lookup results.
// Purpose: Resolve loosely typed payload fields without runtime type errors.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Payloads are arbitrary JSON documents. A [`FieldPath`] names a location in
//! either the payload (`input.…`) or the element bound by the innermost
//! existential quantifier (`item.…`). Resolution never fails: a path that
//! walks off the document yields [`FactValue::Absent`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Number;
use serde_json::Value;

// ============================================================================
// SECTION: Field Paths
// ============================================================================

/// Root a field path is resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathSource {
    /// The evaluation payload.
    Input,
    /// The element bound by the innermost `any(...)`.
    Item,
}

impl PathSource {
    /// Returns the DSL keyword for this source.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Item => "item",
        }
    }
}

/// Dot-separated lookup path into a fact document.
///
/// # Invariants
/// - Segments are non-empty. Segments made only of ASCII digits also index lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldPath {
    /// Document the path is resolved against.
    pub source: PathSource,
    /// Path segments below the root.
    pub segments: Vec<String>,
}

impl FieldPath {
    /// Creates a path rooted at the payload.
    #[must_use]
    pub fn input<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            source: PathSource::Input,
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a path rooted at the bound collection element.
    #[must_use]
    pub fn item<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            source: PathSource::Item,
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Resolves the path segments below an already selected root value.
    #[must_use]
    pub fn resolve<'a>(&self, root: &'a Value) -> FactValue<'a> {
        let mut current = root;
        for segment in &self.segments {
            let next = match current {
                Value::Object(map) => map.get(segment),
                Value::Array(items) => segment.parse::<usize>().ok().and_then(|idx| items.get(idx)),
                _ => None,
            };
            match next {
                Some(value) => current = value,
                None => return FactValue::Absent,
            }
        }
        FactValue::from(current)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.source.keyword())?;
        for segment in &self.segments {
            write!(f, ".{segment}")?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Fact Values
// ============================================================================

/// Tagged result of resolving a field path.
///
/// # Invariants
/// - `Absent` means the path did not resolve; `Null` means it resolved to JSON null.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FactValue<'a> {
    /// String value.
    String(&'a str),
    /// Numeric value.
    Number(&'a Number),
    /// Boolean value.
    Bool(bool),
    /// Ordered collection.
    List(&'a [Value]),
    /// Keyed collection.
    Map(&'a Map<String, Value>),
    /// The path resolved to JSON null.
    Null,
    /// The path did not resolve.
    Absent,
}

impl<'a> From<&'a Value> for FactValue<'a> {
    fn from(value: &'a Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(flag) => Self::Bool(*flag),
            Value::Number(number) => Self::Number(number),
            Value::String(text) => Self::String(text),
            Value::Array(items) => Self::List(items),
            Value::Object(map) => Self::Map(map),
        }
    }
}

impl FactValue<'_> {
    /// Returns true when the path did not resolve or resolved to null.
    #[must_use]
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::Absent | Self::Null)
    }

    /// Returns true for present blank strings and empty collections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::String(text) => text.trim().is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Map(map) => map.is_empty(),
            Self::Number(_) | Self::Bool(_) | Self::Null | Self::Absent => false,
        }
    }
}
