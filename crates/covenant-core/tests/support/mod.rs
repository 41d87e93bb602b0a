// covenant-core/tests/support/mod.rs
// ============================================================================
// Module: Test Support
// Description: Shared assertions, fixture constitutions, and kernel harness.
// ============================================================================
//! ## Overview
//! Shared helpers for covenant-core integration tests.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    dead_code,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::collections::BTreeSet;
use std::error::Error;
use std::fmt;
use std::sync::Arc;

use covenant_core::AgentId;
use covenant_core::Article;
use covenant_core::ArticleId;
use covenant_core::BehavioralSignal;
use covenant_core::Constitution;
use covenant_core::ConstitutionName;
use covenant_core::ConstitutionVersion;
use covenant_core::Domain;
use covenant_core::DomainId;
use covenant_core::Effect;
use covenant_core::FeatureMap;
use covenant_core::PolicyStatus;
use covenant_core::RegimeId;
use covenant_core::Rule;
use covenant_core::RuleId;
use covenant_core::Severity;
use covenant_core::Timestamp;
use covenant_core::dsl::parse_condition;
use covenant_core::runtime::Collaborators;
use covenant_core::runtime::ConstitutionRegistry;
use covenant_core::runtime::DriftConfig;
use covenant_core::runtime::DriftMonitor;
use covenant_core::runtime::InMemoryAuditSink;
use covenant_core::runtime::InMemoryBehavioralFeed;
use covenant_core::runtime::InMemoryRecalibrationChannel;
use covenant_core::runtime::Kernel;
use covenant_core::runtime::LogicalClock;
use covenant_core::runtime::RetryPolicy;

// ========================================================================
// Test Result Helpers
// ========================================================================

/// Standard result type used across core integration tests.
pub type TestResult<T = ()> = Result<T, Box<dyn Error>>;

/// Lightweight error type for test assertions.
#[derive(Debug)]
struct TestError {
    /// Human-readable failure message.
    message: String,
}

impl fmt::Display for TestError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.message)
    }
}

impl Error for TestError {}

/// Returns an error when a test condition fails.
///
/// # Errors
/// Returns a `TestError` when the condition is false.
pub fn ensure(condition: bool, message: impl Into<String>) -> TestResult {
    if condition {
        Ok(())
    } else {
        Err(Box::new(TestError {
            message: message.into(),
        }))
    }
}

// ========================================================================
// Constitution Fixtures
// ========================================================================

/// Builds a rule from a DSL condition.
pub fn rule(id: &str, when: &str, status: PolicyStatus, severity: Severity) -> TestResult<Rule> {
    Ok(Rule {
        id: RuleId::new(id),
        label: format!("{id} label"),
        condition: parse_condition(when)?,
        effect: Effect {
            status,
            severity,
            impact: format!("{id} impact"),
        },
    })
}

/// Builds an article.
pub fn article(id: &str, regime: &str, rules: Vec<Rule>) -> Article {
    Article {
        id: ArticleId::new(id),
        regime: RegimeId::new(regime),
        default_severity: Severity::Medium,
        tags: BTreeSet::new(),
        rules,
    }
}

/// Builds a domain.
pub fn domain(id: &str, meta: bool, articles: Vec<Article>) -> Domain {
    Domain {
        id: DomainId::new(id),
        description: format!("{id} domain"),
        meta,
        articles,
    }
}

/// Builds a constitution header around domains.
pub fn constitution(version: &str, domains: Vec<Domain>) -> Constitution {
    Constitution {
        name: ConstitutionName::new("covenant-test"),
        version: ConstitutionVersion::new(version),
        domains,
    }
}

/// Privacy, content, and meta domains exercised by most tests.
///
/// - `GDPR_5_1_A` (HIGH) fires on personal data without a lawful basis.
/// - `GDPR_5_1_B` (LOW, satisfied) fires on personal data with a basis.
/// - `DSA_34_BLOCK` (CRITICAL) fires at toxicity >= 0.7.
/// - `DSA_34_REVIEW` (MEDIUM) fires at toxicity in [0.4, 0.7).
/// - `META_ESCALATE` (HIGH, meta) fires when personal data is present and
///   any MEDIUM violation was recorded.
pub fn sample_constitution() -> TestResult<Constitution> {
    Ok(constitution("1.0.0", vec![
        domain("privacy", false, vec![article("GDPR_ART_5", "GDPR", vec![
            rule(
                "GDPR_5_1_A",
                r#"input.personal_data_present == true and input.lawful_basis == "NONE""#,
                PolicyStatus::Violated,
                Severity::High,
            )?,
            rule(
                "GDPR_5_1_B",
                r#"input.personal_data_present == true and input.lawful_basis != "NONE""#,
                PolicyStatus::Satisfied,
                Severity::Low,
            )?,
        ])]),
        domain("content", false, vec![article("DSA_ART_34", "DSA", vec![
            rule(
                "DSA_34_BLOCK",
                "input.toxicity >= 0.7",
                PolicyStatus::Violated,
                Severity::Critical,
            )?,
            rule(
                "DSA_34_REVIEW",
                "input.toxicity >= 0.4 and input.toxicity < 0.7",
                PolicyStatus::Violated,
                Severity::Medium,
            )?,
        ])]),
        domain("meta", true, vec![article("META_1", "CONSTITUTIONAL", vec![rule(
            "META_ESCALATE",
            r#"input.personal_data_present == true
                and any(policies, item.status == "VIOLATED" and item.severity == "MEDIUM")"#,
            PolicyStatus::Violated,
            Severity::High,
        )?])]),
    ]))
}

// ========================================================================
// Kernel Harness
// ========================================================================

/// Kernel wired to in-memory collaborators.
pub type TestKernel =
    Kernel<InMemoryAuditSink, InMemoryBehavioralFeed, InMemoryRecalibrationChannel, LogicalClock>;

/// Kernel plus handles sharing state with its collaborators.
pub struct Harness {
    /// The kernel.
    pub kernel: TestKernel,
    /// Audit sink handle.
    pub audit: InMemoryAuditSink,
    /// Feed handle.
    pub feed: InMemoryBehavioralFeed,
    /// Recalibration handle.
    pub recalibration: InMemoryRecalibrationChannel,
}

/// Builds a harness over a constitution with default drift and retry settings.
pub fn harness(constitution: Constitution) -> TestResult<Harness> {
    let audit = InMemoryAuditSink::new();
    let feed = InMemoryBehavioralFeed::new();
    let recalibration = InMemoryRecalibrationChannel::new();
    let kernel = Kernel::new(
        Arc::new(ConstitutionRegistry::new(constitution)?),
        DriftMonitor::new(DriftConfig::default())?,
        RetryPolicy::default(),
        Collaborators {
            audit: audit.clone(),
            feed: feed.clone(),
            recalibration: recalibration.clone(),
            clock: LogicalClock::new(),
        },
    );
    Ok(Harness {
        kernel,
        audit,
        feed,
        recalibration,
    })
}

/// Builds a feature map from pairs.
pub fn features(pairs: &[(&str, f64)]) -> FeatureMap {
    pairs.iter().map(|(name, value)| ((*name).to_string(), *value)).collect()
}

/// Builds a signal for an identity.
pub fn signal(identity: &str, tick: u64, observed: &[(&str, f64)]) -> BehavioralSignal {
    BehavioralSignal {
        identity: AgentId::new(identity),
        observed_at: Timestamp::Logical(tick),
        features: features(observed),
        baseline: None,
    }
}
