// covenant-cli/src/logging.rs
// ============================================================================
// Module: Covenant CLI Logging
// Description: Tracing subscriber installation for the CLI.
// Purpose: Route kernel and loader events to stderr under a configurable filter.
// Dependencies: tracing-subscriber
// ============================================================================

//! ## Overview
//! The filter comes from `COVENANT_LOG` when set and from the config's
//! `[logging].filter` otherwise. Output always goes to stderr so stdout stays
//! reserved for command results.

// ============================================================================
// SECTION: Imports
// ============================================================================

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable that overrides the configured filter.
pub const LOG_ENV_VAR: &str = "COVENANT_LOG";

// ============================================================================
// SECTION: Installation
// ============================================================================

/// Builds the effective filter.
///
/// # Errors
///
/// Returns the parse error message when neither directive is valid.
pub fn resolve_filter(configured: &str) -> Result<EnvFilter, String> {
    if std::env::var_os(LOG_ENV_VAR).is_some() {
        return EnvFilter::try_from_env(LOG_ENV_VAR)
            .map_err(|err| format!("invalid {LOG_ENV_VAR}: {err}"));
    }
    EnvFilter::try_new(configured).map_err(|err| format!("invalid logging.filter: {err}"))
}

/// Installs the global subscriber; a subscriber already installed is kept.
///
/// # Errors
///
/// Returns the parse error message when the filter is invalid.
pub fn install(configured: &str) -> Result<(), String> {
    let filter = resolve_filter(configured)?;
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(true))
        .try_init();
    Ok(())
}
