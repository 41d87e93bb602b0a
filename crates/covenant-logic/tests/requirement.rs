// covenant-logic/tests/requirement.rs
// ============================================================================
// Module: Requirement Tests
// Description: Evaluation, short-circuit, and tree-helper coverage.
// ============================================================================
//! ## Overview
//! Integration tests for the requirement algebra.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod support;

use covenant_logic::Requirement;
use proptest::prelude::*;
use support::Flag;
use support::Flags;
use support::TestResult;
use support::ensure;

/// Builds a predicate leaf for the given bit.
fn leaf(bit: u8) -> Requirement<Flag> {
    Requirement::predicate(Flag(bit))
}

// ============================================================================
// SECTION: Evaluation
// ============================================================================

/// Verifies the basic truth tables of the combinators.
#[test]
fn combinators_follow_truth_tables() -> TestResult {
    let ctx = Flags::new(0b01);
    ensure(leaf(0).eval(&ctx), "bit 0 should be set")?;
    ensure(!leaf(1).eval(&ctx), "bit 1 should be clear")?;
    ensure(!Requirement::and(vec![leaf(0), leaf(1)]).eval(&ctx), "and should fail")?;
    ensure(Requirement::or(vec![leaf(1), leaf(0)]).eval(&ctx), "or should pass")?;
    ensure(Requirement::negate(leaf(1)).eval(&ctx), "not should invert")?;
    ensure((!leaf(0)).eval(&Flags::new(0)), "ops::Not should invert")?;
    Ok(())
}

/// Verifies empty combinators keep their identity values.
#[test]
fn empty_combinators_use_identity_values() -> TestResult {
    let ctx = Flags::new(0);
    ensure(Requirement::<Flag>::default().eval(&ctx), "empty and is true")?;
    ensure(!Requirement::<Flag>::or(Vec::new()).eval(&ctx), "empty or is false")?;
    Ok(())
}

/// Verifies AND stops at the first failing child and OR at the first success.
#[test]
fn evaluation_short_circuits_left_to_right() -> TestResult {
    let ctx = Flags::new(0b10);
    let and = Requirement::and(vec![leaf(0), leaf(1), leaf(2)]);
    ensure(!and.eval(&ctx), "and should fail")?;
    ensure(ctx.evaluated.get() == 1, "and should stop after first child")?;

    let ctx = Flags::new(0b10);
    let or = Requirement::or(vec![leaf(1), leaf(0), leaf(2)]);
    ensure(or.eval(&ctx), "or should pass")?;
    ensure(ctx.evaluated.get() == 1, "or should stop after first child")?;
    Ok(())
}

// ============================================================================
// SECTION: Tree Helpers
// ============================================================================

/// Verifies complexity, depth, and predicate visitation order.
#[test]
fn tree_helpers_report_shape() -> TestResult {
    let tree = Requirement::and(vec![
        leaf(3),
        Requirement::negate(Requirement::or(vec![leaf(4), leaf(5)])),
    ]);
    ensure(tree.complexity() == 6, format!("complexity was {}", tree.complexity()))?;
    ensure(tree.depth() == 4, format!("depth was {}", tree.depth()))?;

    let mut seen = Vec::new();
    tree.for_each_predicate(&mut |flag: &Flag| seen.push(flag.0));
    ensure(seen == vec![3, 4, 5], format!("visited {seen:?}"))?;
    ensure(tree.any_predicate(&|flag: &Flag| flag.0 == 5), "should find bit 5")?;
    ensure(!tree.any_predicate(&|flag: &Flag| flag.0 == 9), "should not find bit 9")?;
    Ok(())
}

/// Verifies requirement trees survive a JSON round trip.
#[test]
fn requirement_serializes_with_snake_case_tags() -> TestResult {
    let tree = Requirement::or(vec![leaf(1), Requirement::negate(leaf(2))]);
    let json = serde_json::to_value(&tree)?;
    ensure(json.get("or").is_some(), format!("unexpected encoding {json}"))?;
    let decoded: Requirement<Flag> = serde_json::from_value(json)?;
    ensure(decoded == tree, "decoded tree should match")?;
    Ok(())
}

// ============================================================================
// SECTION: Properties
// ============================================================================

proptest! {
    /// De Morgan: not(a and b) == (not a) or (not b) for every flag assignment.
    #[test]
    fn de_morgan_holds(bits in any::<u64>(), a in 0u8 .. 64, b in 0u8 .. 64) {
        let ctx = Flags::new(bits);
        let left = Requirement::negate(Requirement::and(vec![leaf(a), leaf(b)]));
        let right =
            Requirement::or(vec![Requirement::negate(leaf(a)), Requirement::negate(leaf(b))]);
        prop_assert_eq!(left.eval(&ctx), right.eval(&ctx));
    }
}
