// covenant-core/tests/registry.rs
// ============================================================================
// Module: Constitution Registry Tests
// Description: Activation, rejection, and snapshot isolation.
// ============================================================================
//! ## Overview
//! Ensures hot swaps are atomic and rejected candidates change nothing.

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

use std::sync::Arc;
use std::thread;

use covenant_core::ConstitutionVersion;
use covenant_core::runtime::ConstitutionRegistry;
use covenant_core::runtime::RegistryError;
use support::TestResult;
use support::constitution;
use support::ensure;
use support::sample_constitution;

/// Verifies the initial constitution is generation one.
#[test]
fn initial_constitution_is_generation_one() -> TestResult {
    let sample = sample_constitution()?;
    let expected_hash = sample.canonical_hash()?;
    let registry = ConstitutionRegistry::new(sample)?;
    let active = registry.snapshot()?;
    ensure(active.generation() == 1, "first activation is generation one")?;
    ensure(active.hash() == &expected_hash, "hash should be computed at activation")
}

/// Verifies an invalid initial constitution is refused.
#[test]
fn invalid_initial_constitution_is_refused() -> TestResult {
    let result = ConstitutionRegistry::new(constitution("1.0.0", Vec::new()));
    ensure(matches!(result, Err(RegistryError::Rejected(_))), "empty corpus should be refused")
}

/// Verifies activation swaps the snapshot and old snapshots stay intact.
#[test]
fn activation_swaps_without_touching_held_snapshots() -> TestResult {
    let registry = ConstitutionRegistry::new(sample_constitution()?)?;
    let held = registry.snapshot()?;

    let mut next = sample_constitution()?;
    next.version = ConstitutionVersion::new("2.0.0");
    let activated = registry.activate(next)?;

    ensure(activated.generation() == 2, "activation should bump the generation")?;
    ensure(held.constitution().version.as_str() == "1.0.0", "held snapshot is unchanged")?;
    let current = registry.snapshot()?;
    ensure(current.constitution().version.as_str() == "2.0.0", "new cycles see the candidate")?;
    ensure(current.hash() != held.hash(), "hash should follow content")
}

/// Verifies a rejected candidate leaves the active constitution in place.
#[test]
fn rejected_candidate_keeps_previous() -> TestResult {
    let registry = ConstitutionRegistry::new(sample_constitution()?)?;
    let result = registry.activate(constitution("9.9.9", Vec::new()));
    ensure(matches!(result, Err(RegistryError::Rejected(_))), "empty candidate is rejected")?;
    let current = registry.snapshot()?;
    ensure(current.generation() == 1, "generation should not move")?;
    ensure(current.constitution().version.as_str() == "1.0.0", "previous stays active")
}

/// Verifies concurrent readers always see a complete constitution.
#[test]
fn concurrent_readers_see_whole_snapshots() -> TestResult {
    let registry = Arc::new(ConstitutionRegistry::new(sample_constitution()?)?);
    let readers: Vec<_> = (0 .. 4)
        .map(|_| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || -> Result<bool, String> {
                for _ in 0 .. 200 {
                    let snapshot = registry.snapshot().map_err(|err| err.to_string())?;
                    let version = snapshot.constitution().version.as_str();
                    if version != "1.0.0" && version != "2.0.0" {
                        return Ok(false);
                    }
                    if snapshot.constitution().rule_count() != 5 {
                        return Ok(false);
                    }
                }
                Ok(true)
            })
        })
        .collect();

    let mut next = sample_constitution()?;
    next.version = ConstitutionVersion::new("2.0.0");
    registry.activate(next)?;

    for reader in readers {
        let consistent = reader.join().map_err(|_| "reader panicked")??;
        ensure(consistent, "reader observed a partial constitution")?;
    }
    Ok(())
}

/// Verifies racing activations each receive a distinct generation.
#[test]
fn concurrent_activations_get_distinct_generations() -> TestResult {
    let registry = Arc::new(ConstitutionRegistry::new(sample_constitution()?)?);
    let mut candidates = Vec::new();
    for index in 0 .. 8 {
        let mut candidate = sample_constitution()?;
        candidate.version = ConstitutionVersion::new(format!("3.0.{index}"));
        candidates.push(candidate);
    }
    let writers: Vec<_> = candidates
        .into_iter()
        .map(|candidate| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || -> Result<u64, String> {
                let activated = registry.activate(candidate).map_err(|err| err.to_string())?;
                Ok(activated.generation())
            })
        })
        .collect();

    let mut generations = Vec::new();
    for writer in writers {
        generations.push(writer.join().map_err(|_| "writer panicked")??);
    }
    generations.sort_unstable();
    let expected: Vec<u64> = (2 ..= 9).collect();
    ensure(generations == expected, format!("generations should be 2..=9, got {generations:?}"))?;
    ensure(registry.snapshot()?.generation() == 9, "last activation should be current")
}
