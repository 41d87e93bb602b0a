// covenant-cli/src/input.rs
// ============================================================================
// Module: Covenant CLI Input
// Description: Size-limited reads from files and stdin.
// Purpose: Keep untrusted inputs from exhausting memory.
// Dependencies: Standard library.
// ============================================================================

//! ## Overview
//! Every file the CLI reads goes through these helpers. The limit is checked
//! against file metadata first and again against the bytes actually read, so
//! a file that grows between the two checks is still refused.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::path::Path;

use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Size-limited read failures.
#[derive(Debug, Error)]
pub enum ReadLimitError {
    /// I/O failure.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Input exceeds the configured limit.
    #[error("input exceeds size limit ({size} > {limit} bytes)")]
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
}

// ============================================================================
// SECTION: Readers
// ============================================================================

/// Reads a file from disk while enforcing a hard size limit.
///
/// # Errors
///
/// Returns [`ReadLimitError`] when the file cannot be read or is too large.
pub fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path)?;
    let size = file.metadata()?.len();
    let limit = u64::try_from(max_bytes).unwrap_or(u64::MAX);
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }
    read_to_limit(file, max_bytes)
}

/// Reads stdin while enforcing a hard size limit.
///
/// # Errors
///
/// Returns [`ReadLimitError`] when stdin cannot be read or is too large.
pub fn read_stdin_with_limit(max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    read_to_limit(std::io::stdin().lock(), max_bytes)
}

/// Reads at most one byte past `max_bytes` and refuses anything longer.
fn read_to_limit(reader: impl Read, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let read_limit = u64::try_from(max_bytes).unwrap_or(u64::MAX).saturating_add(1);
    let mut bytes = Vec::new();
    reader.take(read_limit).read_to_end(&mut bytes)?;
    if bytes.len() > max_bytes {
        return Err(ReadLimitError::TooLarge {
            size: u64::try_from(bytes.len()).unwrap_or(u64::MAX),
            limit: max_bytes,
        });
    }
    Ok(bytes)
}
