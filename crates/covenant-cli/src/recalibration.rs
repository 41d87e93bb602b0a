// covenant-cli/src/recalibration.rs
// ============================================================================
// Module: Covenant Log Recalibration Channel
// Description: Recalibration requests surfaced as structured log events.
// Purpose: Make drift alerts visible when no operator queue is attached.
// Dependencies: covenant-core, tracing
// ============================================================================

//! ## Overview
//! The CLI has no operator queue, so recalibration requests are written to
//! the log at `warn` level and always accepted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use covenant_core::RecalibrationChannel;
use covenant_core::RecalibrationError;
use covenant_core::RecalibrationRequest;
use tracing::warn;

// ============================================================================
// SECTION: Channel
// ============================================================================

/// Recalibration channel that logs each request.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogRecalibrationChannel;

impl RecalibrationChannel for LogRecalibrationChannel {
    fn request(&self, request: &RecalibrationRequest) -> Result<(), RecalibrationError> {
        warn!(
            identity = %request.identity,
            drift_score = request.drift_score,
            requested_at = %request.requested_at,
            reasons = %request.reasons.join("; "),
            "forced recalibration requested"
        );
        Ok(())
    }
}
