// covenant-config/src/corpus.rs
// ============================================================================
// Module: Covenant Rule Corpus Loader
// Description: TOML rule corpus parsing into a validated constitution.
// Purpose: Turn declarative domain, article, and rule tables into the core model.
// Dependencies: covenant-core, serde, toml, tracing
// ============================================================================

//! ## Overview
//! A corpus file declares one `[constitution]` header and flat arrays of
//! `[[domains]]`, `[[articles]]`, and `[[rules]]`. Articles name their domain
//! and rules name their article; declaration order within each parent is kept
//! and becomes rule evaluation order. Rule conditions are written in the
//! condition DSL and parsed here, so a loaded constitution never carries an
//! unparsed condition.
//!
//! ```toml
//! [constitution]
//! name = "example"
//! version = "1.0.0"
//!
//! [[domains]]
//! id = "privacy"
//!
//! [[articles]]
//! id = "GDPR_ART_5"
//! domain = "privacy"
//! regime = "GDPR"
//! default_severity = "HIGH"
//!
//! [[rules]]
//! id = "GDPR_5_1_A"
//! article = "GDPR_ART_5"
//! when = 'input.personal_data_present == true and input.lawful_basis == "NONE"'
//! status = "VIOLATED"
//! impact = "Processing personal data without a lawful basis."
//! ```

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use covenant_core::Article;
use covenant_core::ArticleId;
use covenant_core::Constitution;
use covenant_core::ConstitutionError;
use covenant_core::ConstitutionName;
use covenant_core::ConstitutionVersion;
use covenant_core::Domain;
use covenant_core::DomainId;
use covenant_core::DslError;
use covenant_core::Effect;
use covenant_core::PolicyStatus;
use covenant_core::RegimeId;
use covenant_core::Rule;
use covenant_core::RuleId;
use covenant_core::Severity;
use covenant_core::parse_condition;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum corpus file size in bytes.
pub const MAX_CORPUS_FILE_SIZE: usize = 4 * 1024 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Corpus loading errors.
#[derive(Debug, Error)]
pub enum CorpusError {
    /// The corpus file could not be read.
    #[error("corpus io error: {0}")]
    Io(String),
    /// The corpus exceeds [`MAX_CORPUS_FILE_SIZE`].
    #[error("corpus exceeds size limit ({actual} > {limit} bytes)")]
    TooLarge {
        /// Actual size in bytes.
        actual: usize,
        /// Allowed size in bytes.
        limit: usize,
    },
    /// The corpus is not valid TOML or has an unexpected shape.
    #[error("corpus parse error: {0}")]
    Parse(String),
    /// A rule condition failed to parse.
    #[error("rule {rule} has an invalid condition: {error}")]
    Condition {
        /// Offending rule.
        rule: RuleId,
        /// Parser error.
        error: DslError,
    },
    /// The assembled constitution failed structural validation.
    #[error("malformed corpus: {0}")]
    Structure(#[from] ConstitutionError),
}

// ============================================================================
// SECTION: Document Types
// ============================================================================

/// Top-level corpus document.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CorpusDocument {
    /// Constitution header.
    constitution: HeaderDocument,
    /// Domain declarations.
    #[serde(default)]
    domains: Vec<DomainDocument>,
    /// Article declarations.
    #[serde(default)]
    articles: Vec<ArticleDocument>,
    /// Rule declarations.
    #[serde(default)]
    rules: Vec<RuleDocument>,
}

/// `[constitution]` table.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct HeaderDocument {
    /// Constitution name.
    name: String,
    /// Constitution version.
    version: String,
}

/// `[[domains]]` entry.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DomainDocument {
    /// Domain identifier.
    id: String,
    /// Free-form description.
    #[serde(default)]
    description: String,
    /// Whether rules in this domain run in the meta pass.
    #[serde(default)]
    meta: bool,
}

/// `[[articles]]` entry.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ArticleDocument {
    /// Article identifier.
    id: String,
    /// Owning domain.
    domain: String,
    /// Regulatory regime.
    regime: String,
    /// Severity for rules that omit one.
    #[serde(default)]
    default_severity: Severity,
    /// Free-form tags.
    #[serde(default)]
    tags: BTreeSet<String>,
}

/// `[[rules]]` entry.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleDocument {
    /// Rule identifier.
    id: String,
    /// Owning article.
    article: String,
    /// Human-readable label; defaults to the id.
    #[serde(default)]
    label: Option<String>,
    /// Condition in the DSL.
    when: String,
    /// Status produced when the condition holds.
    status: PolicyStatus,
    /// Severity; falls back to the article default.
    #[serde(default)]
    severity: Option<Severity>,
    /// Impact description carried into outcomes.
    #[serde(default)]
    impact: String,
}

// ============================================================================
// SECTION: Loading
// ============================================================================

/// Reads and parses a corpus file.
///
/// # Errors
///
/// Returns [`CorpusError`] when the file cannot be read, is too large, or
/// does not describe a valid constitution.
pub fn load_constitution(path: &Path) -> Result<Constitution, CorpusError> {
    let metadata = fs::metadata(path).map_err(|err| CorpusError::Io(err.to_string()))?;
    let size = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
    if size > MAX_CORPUS_FILE_SIZE {
        return Err(CorpusError::TooLarge {
            actual: size,
            limit: MAX_CORPUS_FILE_SIZE,
        });
    }
    let bytes = fs::read(path).map_err(|err| CorpusError::Io(err.to_string()))?;
    let content = std::str::from_utf8(&bytes)
        .map_err(|_| CorpusError::Parse("corpus file must be utf-8".to_string()))?;
    let constitution = parse_constitution(content)?;
    info!(
        path = %path.display(),
        constitution = %constitution.name,
        version = %constitution.version,
        rules = constitution.rule_count(),
        "rule corpus loaded"
    );
    Ok(constitution)
}

/// Parses corpus text into a validated constitution.
///
/// # Errors
///
/// Returns [`CorpusError`] for parse failures, invalid conditions, dangling
/// references, or structural violations.
pub fn parse_constitution(content: &str) -> Result<Constitution, CorpusError> {
    if content.len() > MAX_CORPUS_FILE_SIZE {
        return Err(CorpusError::TooLarge {
            actual: content.len(),
            limit: MAX_CORPUS_FILE_SIZE,
        });
    }
    let document: CorpusDocument =
        toml::from_str(content).map_err(|err| CorpusError::Parse(err.to_string()))?;
    let constitution = assemble(document)?;
    constitution.validate()?;
    Ok(constitution)
}

/// Builds the nested model from the flat document.
fn assemble(document: CorpusDocument) -> Result<Constitution, CorpusError> {
    let mut domains: Vec<Domain> = document
        .domains
        .into_iter()
        .map(|domain| Domain {
            id: DomainId::new(domain.id),
            description: domain.description,
            meta: domain.meta,
            articles: Vec::new(),
        })
        .collect();

    let mut article_slots: BTreeMap<ArticleId, (usize, usize)> = BTreeMap::new();
    for article in document.articles {
        let id = ArticleId::new(article.id);
        let domain_id = DomainId::new(article.domain);
        let Some((domain_index, domain)) =
            domains.iter_mut().enumerate().find(|(_, domain)| domain.id == domain_id)
        else {
            return Err(ConstitutionError::UndefinedDomain {
                article: id,
                domain: domain_id,
            }
            .into());
        };
        if article_slots.contains_key(&id) {
            return Err(ConstitutionError::DuplicateArticle(id).into());
        }
        article_slots.insert(id.clone(), (domain_index, domain.articles.len()));
        domain.articles.push(Article {
            id,
            regime: RegimeId::new(article.regime),
            default_severity: article.default_severity,
            tags: article.tags,
            rules: Vec::new(),
        });
    }

    for rule in document.rules {
        let id = RuleId::new(rule.id);
        let article_id = ArticleId::new(rule.article);
        let condition = parse_condition(&rule.when).map_err(|error| CorpusError::Condition {
            rule: id.clone(),
            error,
        })?;
        let slot = article_slots.get(&article_id).and_then(|&(domain_index, article_index)| {
            domains.get_mut(domain_index).and_then(|domain| domain.articles.get_mut(article_index))
        });
        let Some(article) = slot else {
            return Err(ConstitutionError::UndefinedArticle {
                rule: id,
                article: article_id,
            }
            .into());
        };
        article.rules.push(Rule {
            label: rule.label.unwrap_or_else(|| id.as_str().to_string()),
            id,
            condition,
            effect: Effect {
                status: rule.status,
                severity: rule.severity.unwrap_or(article.default_severity),
                impact: rule.impact,
            },
        });
    }

    Ok(Constitution {
        name: ConstitutionName::new(document.constitution.name),
        version: ConstitutionVersion::new(document.constitution.version),
        domains,
    })
}
