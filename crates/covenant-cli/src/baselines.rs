// covenant-cli/src/baselines.rs
// ============================================================================
// Module: Covenant File Baseline Store
// Description: Drift baselines persisted as a JSON object on disk.
// Purpose: Carry rolling L6 baselines across separate CLI invocations.
// Dependencies: covenant-core, serde_json
// ============================================================================

//! ## Overview
//! The baseline file holds one JSON object keyed by identity; each value is a
//! [`DriftBaseline`]. A missing file means no identity has a baseline yet.
//! Saves rewrite the whole file through a sibling temporary file and a rename
//! so a crash never leaves a half-written table behind.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;

use covenant_core::AgentId;
use covenant_core::BaselineStore;
use covenant_core::BaselineStoreError;
use covenant_core::DriftBaseline;

use crate::input::ReadLimitError;
use crate::input::read_bytes_with_limit;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum baseline file size in bytes.
pub const MAX_BASELINE_FILE_BYTES: usize = 8 * 1024 * 1024;

// ============================================================================
// SECTION: Store
// ============================================================================

/// Baseline table keyed by identity.
type BaselineTable = BTreeMap<AgentId, DriftBaseline>;

/// Baseline store backed by a JSON file.
#[derive(Debug)]
pub struct FileBaselineStore {
    /// Baseline file.
    path: PathBuf,
    /// Serializes read-modify-write cycles within the process.
    write_lock: Mutex<()>,
}

impl FileBaselineStore {
    /// Creates a store over `path`; the file is created on first save.
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    /// Returns the baseline file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the whole table; a missing file is an empty table.
    fn read_table(&self) -> Result<BaselineTable, BaselineStoreError> {
        let bytes = match read_bytes_with_limit(&self.path, MAX_BASELINE_FILE_BYTES) {
            Ok(bytes) => bytes,
            Err(ReadLimitError::Io(err)) if err.kind() == ErrorKind::NotFound => {
                return Ok(BaselineTable::new());
            }
            Err(ReadLimitError::Io(err)) => {
                return Err(BaselineStoreError::Unavailable(format!(
                    "{}: {err}",
                    self.path.display()
                )));
            }
            Err(err @ ReadLimitError::TooLarge {
                ..
            }) => return Err(BaselineStoreError::Corrupt(err.to_string())),
        };
        serde_json::from_slice(&bytes).map_err(|err| {
            BaselineStoreError::Corrupt(format!("{}: {err}", self.path.display()))
        })
    }

    /// Writes the whole table through a temporary sibling file.
    fn write_table(&self, table: &BaselineTable) -> Result<(), BaselineStoreError> {
        let unavailable = |err: std::io::Error| {
            BaselineStoreError::Unavailable(format!("{}: {err}", self.path.display()))
        };
        let mut bytes = serde_json::to_vec_pretty(table)
            .map_err(|err| BaselineStoreError::Corrupt(err.to_string()))?;
        bytes.push(b'\n');
        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(unavailable)?;
        }
        let temp_path = self.path.with_extension("tmp");
        let mut file = fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(unavailable)?;
        file.write_all(&bytes).map_err(unavailable)?;
        file.sync_all().map_err(unavailable)?;
        fs::rename(&temp_path, &self.path).map_err(unavailable)
    }
}

impl BaselineStore for FileBaselineStore {
    fn load(&self, identity: &AgentId) -> Result<Option<DriftBaseline>, BaselineStoreError> {
        Ok(self.read_table()?.remove(identity))
    }

    fn save(&self, identity: &AgentId, baseline: &DriftBaseline) -> Result<(), BaselineStoreError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| BaselineStoreError::Unavailable("baseline file lock poisoned".into()))?;
        let mut table = self.read_table()?;
        table.insert(identity.clone(), baseline.clone());
        self.write_table(&table)
    }
}
