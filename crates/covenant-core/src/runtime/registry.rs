// covenant-core/src/runtime/registry.rs
// ============================================================================
// Module: Covenant Constitution Registry
// Description: Atomic hot-swap holder for the active constitution.
// Purpose: Give every evaluation cycle a stable snapshot of the corpus.
// Dependencies: crate::core, thiserror, tracing
// ============================================================================

//! ## Overview
//! The registry keeps the active constitution behind an `Arc`. Cycles clone
//! the `Arc` once and evaluate against that snapshot, so an activation that
//! lands mid-cycle never changes the rules a running cycle sees. Candidates
//! are validated and hashed before the swap; a rejected candidate leaves the
//! previous constitution active.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::RwLock;

use thiserror::Error;
use tracing::info;
use tracing::warn;

use crate::core::constitution::Constitution;
use crate::core::constitution::ConstitutionError;
use crate::core::hashing::HashDigest;
use crate::core::hashing::HashError;

// ============================================================================
// SECTION: Active Constitution
// ============================================================================

/// Validated constitution plus the metadata computed at activation.
#[derive(Debug)]
pub struct ActiveConstitution {
    /// The corpus.
    constitution: Constitution,
    /// Canonical content hash.
    hash: HashDigest,
    /// Activation counter, starting at 1.
    generation: u64,
}

impl ActiveConstitution {
    /// Returns the corpus.
    #[must_use]
    pub const fn constitution(&self) -> &Constitution {
        &self.constitution
    }

    /// Returns the canonical content hash.
    #[must_use]
    pub const fn hash(&self) -> &HashDigest {
        &self.hash
    }

    /// Returns the activation counter.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Registry errors.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Candidate failed validation; the previous constitution stays active.
    #[error("constitution rejected: {0}")]
    Rejected(#[from] ConstitutionError),
    /// Candidate could not be hashed.
    #[error("constitution hashing failed: {0}")]
    Hash(#[from] HashError),
    /// Registry lock was poisoned.
    #[error("constitution registry unavailable: {0}")]
    StateUnavailable(String),
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Holder of the active constitution.
#[derive(Debug)]
pub struct ConstitutionRegistry {
    /// Active snapshot; the lock is held only to clone or replace the `Arc`.
    active: RwLock<Arc<ActiveConstitution>>,
}

impl ConstitutionRegistry {
    /// Creates a registry with an initial constitution.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when the constitution fails validation or hashing.
    pub fn new(constitution: Constitution) -> Result<Self, RegistryError> {
        let (constitution, hash) = prepare(constitution)?;
        let active = ActiveConstitution {
            constitution,
            hash,
            generation: 1,
        };
        info!(
            constitution = %active.constitution.name,
            version = %active.constitution.version,
            hash = %active.hash.to_prefixed(),
            "constitution activated"
        );
        Ok(Self {
            active: RwLock::new(Arc::new(active)),
        })
    }

    /// Returns the current snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::StateUnavailable`] when the lock is poisoned.
    pub fn snapshot(&self) -> Result<Arc<ActiveConstitution>, RegistryError> {
        let guard = self
            .active
            .read()
            .map_err(|_| RegistryError::StateUnavailable("registry lock poisoned".to_string()))?;
        Ok(Arc::clone(&guard))
    }

    /// Validates a candidate and atomically makes it active.
    ///
    /// Validation and hashing run outside the lock; the generation is taken
    /// from the constitution being replaced while the write lock is held, so
    /// concurrent activations always receive distinct generations.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Rejected`] when validation fails; the previous
    /// constitution remains active.
    pub fn activate(
        &self,
        candidate: Constitution,
    ) -> Result<Arc<ActiveConstitution>, RegistryError> {
        let (constitution, hash) = match prepare(candidate) {
            Ok(prepared) => prepared,
            Err(err) => {
                warn!(error = %err, "constitution candidate rejected");
                return Err(err);
            }
        };
        let activated = {
            let mut guard = self.active.write().map_err(|_| {
                RegistryError::StateUnavailable("registry lock poisoned".to_string())
            })?;
            let activated = Arc::new(ActiveConstitution {
                constitution,
                hash,
                generation: guard.generation + 1,
            });
            *guard = Arc::clone(&activated);
            activated
        };
        info!(
            constitution = %activated.constitution.name,
            version = %activated.constitution.version,
            hash = %activated.hash.to_prefixed(),
            generation = activated.generation,
            "constitution activated"
        );
        Ok(activated)
    }
}

/// Validates and hashes a constitution.
fn prepare(constitution: Constitution) -> Result<(Constitution, HashDigest), RegistryError> {
    constitution.validate()?;
    let hash = constitution.canonical_hash()?;
    Ok((constitution, hash))
}
