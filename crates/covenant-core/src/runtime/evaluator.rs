// covenant-core/src/runtime/evaluator.rs
// ============================================================================
// Module: Covenant Condition Evaluator
// Description: Total evaluation of condition predicates against payloads.
// Purpose: Turn predicate leaves into booleans without ever faulting.
// Dependencies: bigdecimal, covenant-logic, serde_json, time
// ============================================================================

//! ## Overview
//! Evaluation is total. Lookups that miss resolve to [`FactValue::Absent`],
//! every comparison against an absent value is false, and mismatched types
//! are non-matches rather than errors. Numbers compare as decimals, so
//! `1 == 1.0`; ordering also accepts RFC 3339 date-times and dates.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cmp::Ordering;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use covenant_logic::PredicateEval;
use serde_json::Number;
use serde_json::Value;
use time::Date;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::core::condition::Collection;
use crate::core::condition::CompareOp;
use crate::core::condition::Condition;
use crate::core::condition::Predicate;
use crate::core::value::FactValue;
use crate::core::value::FieldPath;
use crate::core::value::PathSource;

// ============================================================================
// SECTION: Evaluation Scope
// ============================================================================

/// Facts visible to a condition during evaluation.
///
/// # Invariants
/// - `policies` is `None` during the first engine pass and holds the complete
///   first-pass outcome rows during the meta pass.
#[derive(Debug, Clone, Copy)]
pub struct EvalScope<'a> {
    /// The payload.
    input: &'a Value,
    /// Outcome rows visible to meta-rules.
    policies: Option<&'a [Value]>,
    /// Element bound by the innermost `any(...)`.
    item: Option<&'a Value>,
}

impl<'a> EvalScope<'a> {
    /// Creates a scope over a payload with no outcome rows.
    #[must_use]
    pub const fn new(input: &'a Value) -> Self {
        Self {
            input,
            policies: None,
            item: None,
        }
    }

    /// Returns a scope that also exposes outcome rows as `policies`.
    #[must_use]
    pub const fn with_policies(self, policies: &'a [Value]) -> Self {
        Self {
            policies: Some(policies),
            ..self
        }
    }

    /// Returns a scope with `item` bound to a collection element.
    #[must_use]
    pub const fn bind_item(self, item: &'a Value) -> Self {
        Self {
            item: Some(item),
            ..self
        }
    }

    /// Resolves a field path within this scope.
    #[must_use]
    pub fn resolve(&self, path: &FieldPath) -> FactValue<'a> {
        match path.source {
            PathSource::Input => path.resolve(self.input),
            PathSource::Item => self.item.map_or(FactValue::Absent, |item| path.resolve(item)),
        }
    }
}

// ============================================================================
// SECTION: Predicate Evaluation
// ============================================================================

impl PredicateEval for Predicate {
    type Context<'a> = EvalScope<'a>;

    fn eval(&self, ctx: &EvalScope<'_>) -> bool {
        match self {
            Self::Compare {
                path,
                op,
                literal,
            } => compare(*op, ctx.resolve(path), literal),
            Self::Membership {
                path,
                negated,
                set,
            } => membership(ctx.resolve(path), *negated, set),
            Self::Missing {
                path,
            } => ctx.resolve(path).is_missing(),
            Self::Empty {
                path,
            } => ctx.resolve(path).is_empty(),
            Self::Any {
                collection,
                condition,
            } => any_element(ctx, collection, condition),
        }
    }
}

/// Evaluates a comparison; absent facts never match.
fn compare(op: CompareOp, fact: FactValue<'_>, literal: &Value) -> bool {
    if matches!(fact, FactValue::Absent) {
        return false;
    }
    match op {
        CompareOp::Equal => fact_equals(fact, literal),
        CompareOp::NotEqual => !fact_equals(fact, literal),
        CompareOp::LessThan => fact_ordering(fact, literal).is_some_and(Ordering::is_lt),
        CompareOp::LessThanOrEqual => fact_ordering(fact, literal).is_some_and(Ordering::is_le),
        CompareOp::GreaterThan => fact_ordering(fact, literal).is_some_and(Ordering::is_gt),
        CompareOp::GreaterThanOrEqual => {
            fact_ordering(fact, literal).is_some_and(Ordering::is_ge)
        }
    }
}

/// Evaluates `in` / `not_in`; absent facts never match either form.
fn membership(fact: FactValue<'_>, negated: bool, set: &[Value]) -> bool {
    if matches!(fact, FactValue::Absent) {
        return false;
    }
    let found = set.iter().any(|literal| fact_equals(fact, literal));
    found != negated
}

/// Evaluates an existential quantifier over a collection.
fn any_element(ctx: &EvalScope<'_>, collection: &Collection, condition: &Condition) -> bool {
    match collection {
        Collection::Policies => ctx
            .policies
            .unwrap_or_default()
            .iter()
            .any(|row| condition.eval(&ctx.bind_item(row))),
        Collection::Path(path) => match ctx.resolve(path) {
            FactValue::List(items) => {
                items.iter().any(|item| condition.eval(&ctx.bind_item(item)))
            }
            FactValue::Map(map) => map.values().any(|item| condition.eval(&ctx.bind_item(item))),
            FactValue::String(_)
            | FactValue::Number(_)
            | FactValue::Bool(_)
            | FactValue::Null
            | FactValue::Absent => false,
        },
    }
}

// ============================================================================
// SECTION: Value Comparison
// ============================================================================

/// Returns true when a fact equals a literal; numbers compare as decimals.
fn fact_equals(fact: FactValue<'_>, literal: &Value) -> bool {
    match (fact, literal) {
        (FactValue::Number(left), Value::Number(right)) => {
            decimal_cmp(left, right).is_some_and(Ordering::is_eq)
        }
        (FactValue::String(left), Value::String(right)) => left == right,
        (FactValue::Bool(left), Value::Bool(right)) => left == *right,
        (FactValue::Null, Value::Null) => true,
        (FactValue::List(left), Value::Array(right)) => left == right.as_slice(),
        (FactValue::Map(left), Value::Object(right)) => left == right,
        _ => false,
    }
}

/// Orders a fact against a literal when both are numbers or temporal strings.
fn fact_ordering(fact: FactValue<'_>, literal: &Value) -> Option<Ordering> {
    match (fact, literal) {
        (FactValue::Number(left), Value::Number(right)) => decimal_cmp(left, right),
        (FactValue::String(left), Value::String(right)) => temporal_cmp(left, right),
        _ => None,
    }
}

/// Orders numeric JSON values using decimal-aware comparison.
fn decimal_cmp(left: &Number, right: &Number) -> Option<Ordering> {
    let left = decimal_from_number(left)?;
    let right = decimal_from_number(right)?;
    Some(left.cmp(&right))
}

/// Parses a JSON number into `BigDecimal` through its rendered form.
fn decimal_from_number(number: &Number) -> Option<BigDecimal> {
    BigDecimal::from_str(&number.to_string()).ok()
}

/// Compares RFC 3339 date-time or date-only strings.
fn temporal_cmp(left: &str, right: &str) -> Option<Ordering> {
    if let (Ok(left), Ok(right)) =
        (OffsetDateTime::parse(left, &Rfc3339), OffsetDateTime::parse(right, &Rfc3339))
    {
        return Some(left.cmp(&right));
    }
    let left = parse_date(left)?;
    let right = parse_date(right)?;
    Some(left.cmp(&right))
}

/// Parses a `YYYY-MM-DD` date.
fn parse_date(value: &str) -> Option<Date> {
    let mut parts = value.split('-');
    let year: i32 = parts.next()?.parse().ok()?;
    let month: u8 = parts.next()?.parse().ok()?;
    let day: u8 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    let month = time::Month::try_from(month).ok()?;
    Date::from_calendar_date(year, month, day).ok()
}
