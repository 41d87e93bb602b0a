// covenant-cli/src/clock.rs
// ============================================================================
// Module: Covenant System Clock
// Description: Wall-clock timestamps for custody steps and audit events.
// Purpose: Give CLI cycles real time while the core stays clock-free.
// Dependencies: covenant-core
// ============================================================================

//! ## Overview
//! [`SystemClock`] reports Unix epoch milliseconds. A clock set before the
//! epoch reports zero rather than failing a cycle.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use covenant_core::Clock;
use covenant_core::Timestamp;

// ============================================================================
// SECTION: System Clock
// ============================================================================

/// Clock backed by [`SystemTime`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX));
        Timestamp::UnixMillis(millis)
    }
}
