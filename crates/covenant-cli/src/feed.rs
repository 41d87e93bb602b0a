// covenant-cli/src/feed.rs
// ============================================================================
// Module: Covenant File Behavioral Feed
// Description: Behavioral signals read from a JSON file on every observation.
// Purpose: Let operators drive the L6 path from an external telemetry export.
// Dependencies: covenant-core, serde_json
// ============================================================================

//! ## Overview
//! The feed file holds a JSON array of behavioral signals. Each observation
//! re-reads the file and returns the latest signal for the identity, ordered
//! by `observed_at`; later entries win ties. A feed without a file returns no
//! signal, which the kernel records as an UNKNOWN drift state.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;

use covenant_core::AgentId;
use covenant_core::BehavioralFeed;
use covenant_core::BehavioralSignal;
use covenant_core::FeedError;

use crate::input::ReadLimitError;
use crate::input::read_bytes_with_limit;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum feed file size in bytes.
pub const MAX_FEED_FILE_BYTES: usize = 4 * 1024 * 1024;

// ============================================================================
// SECTION: Feed
// ============================================================================

/// Behavioral feed backed by an optional JSON file.
#[derive(Debug, Default, Clone)]
pub struct FileBehavioralFeed {
    /// Signal file; `None` means no behavioral data is available.
    path: Option<PathBuf>,
}

impl FileBehavioralFeed {
    /// Creates a feed reading `path`.
    #[must_use]
    pub const fn new(path: Option<PathBuf>) -> Self {
        Self {
            path,
        }
    }

    /// Reads and decodes every signal in the file.
    fn read_signals(&self) -> Result<Vec<BehavioralSignal>, FeedError> {
        let Some(path) = &self.path else {
            return Ok(Vec::new());
        };
        let bytes = read_bytes_with_limit(path, MAX_FEED_FILE_BYTES).map_err(|err| match err {
            ReadLimitError::Io(err) => FeedError::Unavailable(format!("{}: {err}", path.display())),
            ReadLimitError::TooLarge {
                ..
            } => FeedError::InvalidSignal(err.to_string()),
        })?;
        serde_json::from_slice(&bytes).map_err(|err| FeedError::InvalidSignal(err.to_string()))
    }
}

impl BehavioralFeed for FileBehavioralFeed {
    fn observe(&self, identity: &AgentId) -> Result<Option<BehavioralSignal>, FeedError> {
        let latest = self
            .read_signals()?
            .into_iter()
            .filter(|signal| &signal.identity == identity)
            .reduce(|best, next| if next.observed_at >= best.observed_at { next } else { best });
        Ok(latest)
    }
}
