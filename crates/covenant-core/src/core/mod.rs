// covenant-core/src/core/mod.rs
// ============================================================================
// Module: Covenant Core Types
// Description: Constitution model and per-layer evaluation records.
// Purpose: Provide stable, serializable types for rules, verdicts, and ADRAs.
// Dependencies: covenant-logic, serde
// ============================================================================

//! ## Overview
//! Core types define the constitution tree, the condition language, and the
//! records each layer produces (L1 verdict, L6 drift, L7 veto) together with
//! the ADRA that bundles them. These types are the canonical source of truth
//! for any derived surface (CLI output, dashboards, audit sinks).

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod adra;
pub mod audit;
pub mod condition;
pub mod constitution;
pub mod drift;
pub mod hashing;
pub mod identifiers;
pub mod outcome;
pub mod scope;
pub mod time;
pub mod value;
pub mod verdict;
pub mod veto;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use adra::ADRA_VERSION;
pub use adra::Adra;
pub use adra::AdraError;
pub use adra::AdraRecord;
pub use adra::AdraSection;
pub use adra::ChainOfCustody;
pub use adra::ConstitutionRef;
pub use adra::CustodyRecorder;
pub use adra::CustodyStage;
pub use adra::CustodyStep;
pub use adra::EvaluationScope;
pub use adra::GovernanceContext;
pub use adra::L1Section;
pub use adra::VerdictSnapshot;
pub use audit::AuditEvent;
pub use condition::Collection;
pub use condition::CompareOp;
pub use condition::Condition;
pub use condition::Predicate;
pub use constitution::Article;
pub use constitution::Constitution;
pub use constitution::ConstitutionError;
pub use constitution::Domain;
pub use constitution::Effect;
pub use constitution::PolicyStatus;
pub use constitution::Rule;
pub use constitution::RuleRef;
pub use constitution::Severity;
pub use drift::BehavioralSignal;
pub use drift::DriftBaseline;
pub use drift::DriftOutcome;
pub use drift::DriftResult;
pub use drift::FeatureMap;
pub use drift::RecalibrationRequest;
pub use drift::ResolutionState;
pub use hashing::HashAlgorithm;
pub use hashing::HashDigest;
pub use hashing::HashError;
pub use identifiers::AgentId;
pub use identifiers::ArticleId;
pub use identifiers::ConstitutionName;
pub use identifiers::ConstitutionVersion;
pub use identifiers::DomainId;
pub use identifiers::EvaluationId;
pub use identifiers::RegimeId;
pub use identifiers::RuleId;
pub use outcome::PolicyOutcome;
pub use scope::RegimeScope;
pub use scope::RegimeSummary;
pub use scope::ScopeProfile;
pub use scope::jurisdiction_covers;
pub use scope::summarize_regimes;
pub use time::Timestamp;
pub use value::FactValue;
pub use value::FieldPath;
pub use value::PathSource;
pub use verdict::Decision;
pub use verdict::PolicyCounts;
pub use verdict::Verdict;
pub use veto::CorrectiveSignal;
pub use veto::CorrectiveViolation;
pub use veto::Escalation;
pub use veto::VetoBasisEntry;
pub use veto::VetoCategory;
pub use veto::VetoResult;
