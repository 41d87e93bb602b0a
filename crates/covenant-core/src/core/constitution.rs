// covenant-core/src/core/constitution.rs
// ============================================================================
// Module: Covenant Constitution Model
// Description: Constitution, domain, article, and rule definitions.
// Purpose: Represent the rule corpus as an immutable, validated tree.
// Dependencies: covenant-logic, serde, thiserror
// ============================================================================

//! ## Overview
//! A [`Constitution`] is an ordered tree: domains contain articles, articles
//! contain rules, and each rule pairs a [`Condition`] with an [`Effect`].
//! Declaration order is preserved everywhere because it fixes the order of
//! policy outcomes; it never changes which outcomes are produced.
//!
//! Domains flagged `meta` hold meta-rules. Only meta-rules may quantify over
//! the outcome sequence (`any(policies, …)`), which is what lets the engine
//! evaluate them in a strictly later pass.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fmt;

use covenant_logic::RequirementValidator;
use covenant_logic::ValidationError;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::condition::Condition;
use crate::core::condition::Predicate;
use crate::core::hashing::HashDigest;
use crate::core::hashing::HashError;
use crate::core::hashing::hash_canonical_json;
use crate::core::identifiers::ArticleId;
use crate::core::identifiers::ConstitutionName;
use crate::core::identifiers::ConstitutionVersion;
use crate::core::identifiers::DomainId;
use crate::core::identifiers::RegimeId;
use crate::core::identifiers::RuleId;

// ============================================================================
// SECTION: Severity and Status
// ============================================================================

/// Rule severity, ordered `Low < Medium < High < Critical`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    /// Informational.
    #[default]
    Low,
    /// Requires human attention.
    Medium,
    /// Blocking.
    High,
    /// Blocking, highest rank.
    Critical,
}

impl Severity {
    /// Returns the canonical upper-case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }

    /// Returns true for severities that block execution when violated.
    #[must_use]
    pub const fn is_blocking(self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status a matching rule assigns to its policy outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PolicyStatus {
    /// The rule's obligation is met.
    Satisfied,
    /// The rule's obligation is breached.
    Violated,
    /// The rule does not apply to this payload.
    NotApplicable,
}

impl PolicyStatus {
    /// Returns the canonical upper-case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Satisfied => "SATISFIED",
            Self::Violated => "VIOLATED",
            Self::NotApplicable => "NOT_APPLICABLE",
        }
    }
}

impl fmt::Display for PolicyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Constitution Tree
// ============================================================================

/// Outcome a rule produces when its condition holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Effect {
    /// Outcome status.
    pub status: PolicyStatus,
    /// Outcome severity.
    pub severity: Severity,
    /// Human-readable impact statement.
    pub impact: String,
}

/// A single constitutional rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Rule identifier, unique across the constitution.
    pub id: RuleId,
    /// Short human-readable label.
    pub label: String,
    /// Condition that makes the rule match.
    pub condition: Condition,
    /// Effect recorded when the rule matches.
    pub effect: Effect,
}

/// An article groups rules under one regime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// Article identifier, unique across the constitution.
    pub id: ArticleId,
    /// Regulatory regime tag.
    pub regime: RegimeId,
    /// Severity applied by loaders when a rule omits one.
    pub default_severity: Severity,
    /// Free-form tags.
    pub tags: BTreeSet<String>,
    /// Rules in declaration order.
    pub rules: Vec<Rule>,
}

/// A domain groups articles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    /// Domain identifier, unique across the constitution.
    pub id: DomainId,
    /// Human-readable description.
    pub description: String,
    /// Meta domains are evaluated after all other domains.
    pub meta: bool,
    /// Articles in declaration order.
    pub articles: Vec<Article>,
}

/// The full rule corpus.
///
/// # Invariants
/// - After [`Constitution::validate`] succeeds: identifiers are non-blank and
///   unique per kind, condition trees are structurally valid, and only meta
///   domains scan the outcome sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constitution {
    /// Constitution name.
    pub name: ConstitutionName,
    /// Constitution version.
    pub version: ConstitutionVersion,
    /// Domains in declaration order.
    pub domains: Vec<Domain>,
}

/// Borrowed view of one rule with its enclosing article and domain.
#[derive(Debug, Clone, Copy)]
pub struct RuleRef<'a> {
    /// Enclosing domain.
    pub domain: &'a Domain,
    /// Enclosing article.
    pub article: &'a Article,
    /// The rule.
    pub rule: &'a Rule,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Structural corpus errors; a constitution with any of these is never activated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstitutionError {
    /// Constitution name or version is blank.
    #[error("constitution {0} must be non-empty")]
    MissingHeader(&'static str),
    /// Constitution has no domains.
    #[error("constitution has no domains")]
    NoDomains,
    /// Identifier is blank.
    #[error("{kind} identifier must be non-empty")]
    BlankIdentifier {
        /// Identifier kind (`domain`, `article`, `rule`).
        kind: &'static str,
    },
    /// Duplicate domain identifier.
    #[error("duplicate domain identifier: {0}")]
    DuplicateDomain(DomainId),
    /// Duplicate article identifier.
    #[error("duplicate article identifier: {0}")]
    DuplicateArticle(ArticleId),
    /// Duplicate rule identifier.
    #[error("duplicate rule identifier: {0}")]
    DuplicateRule(RuleId),
    /// A definition references a domain that does not exist.
    #[error("article {article} references undefined domain {domain}")]
    UndefinedDomain {
        /// Referencing article.
        article: ArticleId,
        /// Missing domain.
        domain: DomainId,
    },
    /// A definition references an article that does not exist.
    #[error("rule {rule} references undefined article {article}")]
    UndefinedArticle {
        /// Referencing rule.
        rule: RuleId,
        /// Missing article.
        article: ArticleId,
    },
    /// A rule outside a meta domain scans the outcome sequence.
    #[error("rule {rule} scans policies but domain {domain} is not a meta domain")]
    PolicyScanOutsideMeta {
        /// Offending rule.
        rule: RuleId,
        /// Its domain.
        domain: DomainId,
    },
    /// A rule condition failed structural validation.
    #[error("rule {rule} has an invalid condition: {reason}")]
    InvalidCondition {
        /// Offending rule.
        rule: RuleId,
        /// Validator message.
        reason: String,
    },
}

// ============================================================================
// SECTION: Validation and Traversal
// ============================================================================

impl Constitution {
    /// Validates structural invariants of the corpus.
    ///
    /// # Errors
    ///
    /// Returns [`ConstitutionError`] for the first structural problem found.
    pub fn validate(&self) -> Result<(), ConstitutionError> {
        if self.name.is_blank() {
            return Err(ConstitutionError::MissingHeader("name"));
        }
        if self.version.is_blank() {
            return Err(ConstitutionError::MissingHeader("version"));
        }
        if self.domains.is_empty() {
            return Err(ConstitutionError::NoDomains);
        }
        ensure_unique_domains(&self.domains)?;
        ensure_unique_articles(&self.domains)?;
        ensure_unique_rules(&self.domains)?;
        ensure_conditions_valid(&self.domains)
    }

    /// Returns every rule with its enclosing article and domain, in declaration order.
    pub fn rules(&self) -> impl Iterator<Item = RuleRef<'_>> {
        self.domains.iter().flat_map(|domain| {
            domain.articles.iter().flat_map(move |article| {
                article.rules.iter().map(move |rule| RuleRef {
                    domain,
                    article,
                    rule,
                })
            })
        })
    }

    /// Returns the number of rules in the corpus.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules().count()
    }

    /// Returns distinct regimes in declaration order.
    #[must_use]
    pub fn regimes(&self) -> Vec<RegimeId> {
        let mut seen = BTreeSet::new();
        let mut regimes = Vec::new();
        for article in self.domains.iter().flat_map(|domain| &domain.articles) {
            if seen.insert(article.regime.as_str()) {
                regimes.push(article.regime.clone());
            }
        }
        regimes
    }

    /// Computes the canonical content hash of the corpus.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] when canonicalization fails.
    pub fn canonical_hash(&self) -> Result<HashDigest, HashError> {
        hash_canonical_json(self)
    }
}

/// Ensures domain identifiers are present and unique.
fn ensure_unique_domains(domains: &[Domain]) -> Result<(), ConstitutionError> {
    let mut seen = BTreeSet::new();
    for domain in domains {
        if domain.id.is_blank() {
            return Err(ConstitutionError::BlankIdentifier {
                kind: "domain",
            });
        }
        if !seen.insert(domain.id.as_str()) {
            return Err(ConstitutionError::DuplicateDomain(domain.id.clone()));
        }
    }
    Ok(())
}

/// Ensures article identifiers are present and unique across all domains.
fn ensure_unique_articles(domains: &[Domain]) -> Result<(), ConstitutionError> {
    let mut seen = BTreeSet::new();
    for article in domains.iter().flat_map(|domain| &domain.articles) {
        if article.id.is_blank() {
            return Err(ConstitutionError::BlankIdentifier {
                kind: "article",
            });
        }
        if !seen.insert(article.id.as_str()) {
            return Err(ConstitutionError::DuplicateArticle(article.id.clone()));
        }
    }
    Ok(())
}

/// Ensures rule identifiers are present and unique across the constitution.
fn ensure_unique_rules(domains: &[Domain]) -> Result<(), ConstitutionError> {
    let mut seen = BTreeSet::new();
    let rules = domains
        .iter()
        .flat_map(|domain| &domain.articles)
        .flat_map(|article| &article.rules);
    for rule in rules {
        if rule.id.is_blank() {
            return Err(ConstitutionError::BlankIdentifier {
                kind: "rule",
            });
        }
        if !seen.insert(rule.id.as_str()) {
            return Err(ConstitutionError::DuplicateRule(rule.id.clone()));
        }
    }
    Ok(())
}

/// Ensures condition trees are well formed and policy scans stay in meta domains.
fn ensure_conditions_valid(domains: &[Domain]) -> Result<(), ConstitutionError> {
    let validator = RequirementValidator::with_defaults();
    for domain in domains {
        for rule in domain.articles.iter().flat_map(|article| &article.rules) {
            validate_condition(&validator, &rule.condition).map_err(|err| {
                ConstitutionError::InvalidCondition {
                    rule: rule.id.clone(),
                    reason: err.to_string(),
                }
            })?;
            if !domain.meta && rule.condition.any_predicate(&Predicate::scans_policies) {
                return Err(ConstitutionError::PolicyScanOutsideMeta {
                    rule: rule.id.clone(),
                    domain: domain.id.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Validates a condition tree and every nested quantifier body.
fn validate_condition(
    validator: &RequirementValidator,
    condition: &Condition,
) -> Result<(), ValidationError> {
    validator.validate(condition)?;
    let mut result = Ok(());
    condition.for_each_predicate(&mut |predicate| {
        if result.is_ok()
            && let Predicate::Any {
                condition: body,
                ..
            } = predicate
        {
            result = validate_condition(validator, body);
        }
    });
    result
}
