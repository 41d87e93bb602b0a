// covenant-cli/src/lib.rs
// ============================================================================
// Module: Covenant CLI Library
// Description: Host collaborators and helpers for the Covenant command line.
// Purpose: Provide file, stderr, and wall-clock implementations of the kernel traits.
// Dependencies: covenant-core, covenant-config, serde_json, tracing-subscriber
// ============================================================================

//! ## Overview
//! The kernel talks to its host only through traits. This library supplies
//! the implementations the `covenant` binary wires in: JSON-lines audit sinks,
//! a file-backed behavioral feed, a JSON baseline store, a log-only
//! recalibration channel, and the system clock. The binary entry point
//! (`src/main.rs`) selects among them from `covenant.toml`.

// ============================================================================
// SECTION: Modules
// ============================================================================

/// JSON file store for drift baselines.
pub mod baselines;
/// Wall-clock implementation of the kernel clock.
pub mod clock;
/// File-backed behavioral feed.
pub mod feed;
/// Size-limited input reading.
pub mod input;
/// Tracing subscriber installation.
pub mod logging;
/// Log-only recalibration channel.
pub mod recalibration;
/// JSON-lines audit sinks.
pub mod sinks;
