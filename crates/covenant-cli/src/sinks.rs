// covenant-cli/src/sinks.rs
// ============================================================================
// Module: Covenant Audit Sinks
// Description: JSON-lines audit sinks for stderr and append-only files, plus `none`.
// Purpose: Deliver veto events and sealed ADRAs outside the process.
// Dependencies: covenant-core, covenant-config, serde_json
// ============================================================================

//! ## Overview
//! Every line a sink writes is one JSON object with a `kind` discriminator:
//! `audit_event` lines carry the veto emission and `adra` lines carry the
//! sealed record. The `none` kind (alias `noop`) discards both. Durability
//! beyond the write call is the host's concern.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use covenant_config::AuditConfig;
use covenant_config::AuditSinkKind;
use covenant_config::CovenantConfig;
use covenant_core::Adra;
use covenant_core::AuditError;
use covenant_core::AuditEvent;
use covenant_core::AuditSink;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Line Encoding
// ============================================================================

/// Encodes a veto event as a JSON line.
fn event_line(event: &AuditEvent) -> Result<String, AuditError> {
    let body = serde_json::to_value(event)
        .map_err(|err| AuditError::Serialization(err.to_string()))?;
    encode_line("audit_event", body)
}

/// Encodes a sealed record as a JSON line.
fn record_line(adra: &Adra) -> Result<String, AuditError> {
    let body =
        serde_json::to_value(adra).map_err(|err| AuditError::Serialization(err.to_string()))?;
    encode_line("adra", body)
}

/// Wraps a body with its `kind` discriminator.
fn encode_line(kind: &str, body: Value) -> Result<String, AuditError> {
    let mut line = serde_json::to_string(&json!({ "kind": kind, "body": body }))
        .map_err(|err| AuditError::Serialization(err.to_string()))?;
    line.push('\n');
    Ok(line)
}

// ============================================================================
// SECTION: Stderr Sink
// ============================================================================

/// Sink writing JSON lines to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrAuditSink;

impl StderrAuditSink {
    /// Writes one encoded line to stderr.
    fn write(line: &str) -> Result<(), AuditError> {
        let mut stderr = std::io::stderr().lock();
        stderr.write_all(line.as_bytes()).map_err(|err| AuditError::Unavailable(err.to_string()))
    }
}

impl AuditSink for StderrAuditSink {
    fn emit(&self, event: &AuditEvent) -> Result<(), AuditError> {
        Self::write(&event_line(event)?)
    }

    fn publish(&self, adra: &Adra) -> Result<(), AuditError> {
        Self::write(&record_line(adra)?)
    }
}

// ============================================================================
// SECTION: File Sink
// ============================================================================

/// Sink appending JSON lines to a file.
#[derive(Debug)]
pub struct FileAuditSink {
    /// Open append-only handle.
    file: Mutex<File>,
}

impl FileAuditSink {
    /// Opens `path` for appending, creating it when absent.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Unavailable`] when the file cannot be opened.
    pub fn open(path: &Path) -> Result<Self, AuditError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|err| AuditError::Unavailable(format!("{}: {err}", path.display())))?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Appends one encoded line and flushes it.
    fn append(&self, line: &str) -> Result<(), AuditError> {
        let mut file = self
            .file
            .lock()
            .map_err(|_| AuditError::Unavailable("audit file lock poisoned".to_string()))?;
        file.write_all(line.as_bytes())
            .and_then(|()| file.flush())
            .map_err(|err| AuditError::Unavailable(err.to_string()))
    }
}

impl AuditSink for FileAuditSink {
    fn emit(&self, event: &AuditEvent) -> Result<(), AuditError> {
        self.append(&event_line(event)?)
    }

    fn publish(&self, adra: &Adra) -> Result<(), AuditError> {
        self.append(&record_line(adra)?)
    }
}

// ============================================================================
// SECTION: Discarding Sink
// ============================================================================

/// Sink that accepts and discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardAuditSink;

impl AuditSink for DiscardAuditSink {
    fn emit(&self, _event: &AuditEvent) -> Result<(), AuditError> {
        Ok(())
    }

    fn publish(&self, _adra: &Adra) -> Result<(), AuditError> {
        Ok(())
    }
}

// ============================================================================
// SECTION: Configured Sink
// ============================================================================

/// Sink selected by the `[audit]` config section.
#[derive(Debug)]
pub enum ConfiguredAuditSink {
    /// JSON lines on stderr.
    Stderr(StderrAuditSink),
    /// JSON lines appended to a file.
    File(FileAuditSink),
    /// `none`: discards everything.
    Discard(DiscardAuditSink),
}

impl ConfiguredAuditSink {
    /// Builds the sink described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Unavailable`] when a file sink cannot be opened.
    pub fn from_config(config: &CovenantConfig) -> Result<Self, AuditError> {
        let AuditConfig {
            sink,
            path,
        } = &config.audit;
        match (sink, path) {
            (AuditSinkKind::Stderr, _) => Ok(Self::Stderr(StderrAuditSink)),
            (AuditSinkKind::None, _) => Ok(Self::Discard(DiscardAuditSink)),
            (AuditSinkKind::File, Some(path)) => {
                Ok(Self::File(FileAuditSink::open(&config.resolve(path))?))
            }
            (AuditSinkKind::File, None) => {
                Err(AuditError::Unavailable("file sink requires audit.path".to_string()))
            }
        }
    }
}

impl AuditSink for ConfiguredAuditSink {
    fn emit(&self, event: &AuditEvent) -> Result<(), AuditError> {
        match self {
            Self::Stderr(sink) => sink.emit(event),
            Self::File(sink) => sink.emit(event),
            Self::Discard(sink) => sink.emit(event),
        }
    }

    fn publish(&self, adra: &Adra) -> Result<(), AuditError> {
        match self {
            Self::Stderr(sink) => sink.publish(adra),
            Self::File(sink) => sink.publish(adra),
            Self::Discard(sink) => sink.publish(adra),
        }
    }
}
