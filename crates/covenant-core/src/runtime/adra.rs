// covenant-core/src/runtime/adra.rs
// ============================================================================
// Module: Covenant ADRA Assembler
// Description: Assembly and sealing of Audit/Decision Record Artifacts.
// Purpose: Refuse incomplete records and bind complete ones with a hash.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! [`assemble_adra`] accepts each section as an `Option` so callers that lost
//! a layer fail loudly with [`AdraError::MissingSection`] rather than
//! publishing a partial record. The envelope hash covers every other field.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::adra::ADRA_VERSION;
use crate::core::adra::Adra;
use crate::core::adra::AdraError;
use crate::core::adra::AdraRecord;
use crate::core::adra::AdraSection;
use crate::core::adra::ChainOfCustody;
use crate::core::adra::GovernanceContext;
use crate::core::adra::L1Section;
use crate::core::drift::DriftResult;
use crate::core::hashing::hash_canonical_json;
use crate::core::veto::VetoResult;

// ============================================================================
// SECTION: Assembly
// ============================================================================

/// Assembles and seals an ADRA.
///
/// # Errors
///
/// Returns [`AdraError::MissingSection`] when L1, L6, L7, or the chain of
/// custody is absent, and [`AdraError::Hash`] when sealing fails.
pub fn assemble_adra(
    l1: Option<L1Section>,
    drift: Option<DriftResult>,
    veto: Option<VetoResult>,
    chain_of_custody: Option<ChainOfCustody>,
    governance_context: GovernanceContext,
) -> Result<Adra, AdraError> {
    let l1_verdict = l1.ok_or(AdraError::MissingSection(AdraSection::L1Verdict))?;
    let l6_drift = drift.ok_or(AdraError::MissingSection(AdraSection::L6Drift))?;
    let l7_veto = veto.ok_or(AdraError::MissingSection(AdraSection::L7Veto))?;
    let chain_of_custody =
        chain_of_custody.ok_or(AdraError::MissingSection(AdraSection::ChainOfCustody))?;

    let record = AdraRecord {
        adra_version: ADRA_VERSION,
        evaluation_id: chain_of_custody.evaluation_id().clone(),
        constitution_hash: governance_context.constitution().hash.clone(),
        l1_verdict,
        l6_drift,
        l7_veto,
        chain_of_custody,
        governance_context,
    };
    let envelope_hash = hash_canonical_json(&record)?;
    Ok(Adra {
        record,
        envelope_hash,
    })
}

/// Recomputes the envelope hash and compares it with the sealed value.
///
/// # Errors
///
/// Returns [`AdraError::Hash`] when the record cannot be canonicalized.
pub fn verify_envelope(adra: &Adra) -> Result<bool, AdraError> {
    let recomputed = hash_canonical_json(adra.record())?;
    Ok(&recomputed == adra.envelope_hash())
}
