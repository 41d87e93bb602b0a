// covenant-config/src/lib.rs
// ============================================================================
// Module: Covenant Config Library
// Description: Kernel configuration model and rule-corpus loading.
// Purpose: Single source of truth for covenant.toml and corpus file semantics.
// Dependencies: covenant-core, serde, toml, tracing
// ============================================================================

//! ## Overview
//! `covenant-config` turns files on disk into validated kernel inputs: the
//! `covenant.toml` configuration and the TOML rule corpus that becomes a
//! [`covenant_core::Constitution`]. Both loaders enforce size limits and fail
//! closed on anything they cannot validate.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod corpus;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use corpus::CorpusError;
pub use corpus::MAX_CORPUS_FILE_SIZE;
pub use corpus::load_constitution;
pub use corpus::parse_constitution;
