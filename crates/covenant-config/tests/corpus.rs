// covenant-config/tests/corpus.rs
// ============================================================================
// Module: Corpus Loader Tests
// Description: Corpus parsing, reference resolution, and failure modes.
// ============================================================================
//! ## Overview
//! Loads small corpora from strings and temp files and checks the resulting
//! constitution or the reported error.

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
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod support;

use covenant_config::CorpusError;
use covenant_config::MAX_CORPUS_FILE_SIZE;
use covenant_config::load_constitution;
use covenant_config::parse_constitution;
use covenant_core::ConstitutionError;
use covenant_core::PolicyStatus;
use covenant_core::Severity;
use support::MINIMAL_CORPUS;
use support::TestResult;
use support::ensure;
use support::write_file;

/// Header plus one domain and article, ready for extra rule tables.
const PREAMBLE: &str = r#"
[constitution]
name = "broken"
version = "0.0.1"

[[domains]]
id = "privacy"

[[articles]]
id = "A1"
domain = "privacy"
regime = "GDPR"
"#;

/// Renders a `[[rules]]` table.
fn rule_table(id: &str, article: &str, when: &str) -> String {
    format!(
        "[[rules]]\nid = \"{id}\"\narticle = \"{article}\"\nwhen = '{when}'\n\
         status = \"VIOLATED\"\n"
    )
}

/// Renders an `[[articles]]` table.
fn article_table(id: &str, domain: &str) -> String {
    format!("[[articles]]\nid = \"{id}\"\ndomain = \"{domain}\"\nregime = \"DSA\"\n")
}

// ============================================================================
// SECTION: Successful Loads
// ============================================================================

/// Verifies the minimal corpus builds the nested model in order.
#[test]
fn minimal_corpus_builds_nested_model() -> TestResult {
    let constitution = parse_constitution(MINIMAL_CORPUS)?;
    ensure(constitution.name.as_str() == "minimal", "name")?;
    ensure(constitution.version.as_str() == "0.1.0", "version")?;
    let ids: Vec<&str> = constitution.rules().map(|entry| entry.rule.id.as_str()).collect();
    ensure(ids == ["GDPR_5_1_A", "GDPR_5_1_B"], "declaration order is kept")?;

    let first = constitution.rules().next().ok_or("missing first rule")?;
    ensure(first.rule.effect.severity == Severity::High, "severity falls back to article")?;
    ensure(first.rule.label == "GDPR_5_1_A", "label falls back to id")?;
    ensure(first.article.regime.as_str() == "GDPR", "regime")?;

    let second = constitution.rules().nth(1).ok_or("missing second rule")?;
    ensure(second.rule.effect.status == PolicyStatus::Satisfied, "status")?;
    ensure(second.rule.effect.severity == Severity::Low, "explicit severity")?;
    ensure(second.rule.label == "Lawful basis recorded", "explicit label")
}

/// Verifies loading from disk matches parsing the same text.
#[test]
fn file_load_matches_parse() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = write_file(dir.path(), "corpus.toml", MINIMAL_CORPUS)?;
    let loaded = load_constitution(&path)?;
    let parsed = parse_constitution(MINIMAL_CORPUS)?;
    ensure(loaded == parsed, "file and text loads should agree")?;
    ensure(
        loaded.canonical_hash()? == parsed.canonical_hash()?,
        "hash should not depend on the source",
    )
}

/// Verifies articles attach to their declared domain regardless of file order.
#[test]
fn articles_attach_to_declared_domain() -> TestResult {
    let text = r#"
[constitution]
name = "split"
version = "1"

[[domains]]
id = "one"

[[domains]]
id = "two"

[[articles]]
id = "B"
domain = "two"
regime = "DSA"

[[articles]]
id = "A"
domain = "one"
regime = "GDPR"

[[rules]]
id = "R_B"
article = "B"
when = "input.x == 1"
status = "VIOLATED"

[[rules]]
id = "R_A"
article = "A"
when = "input.x == 2"
status = "VIOLATED"
"#;
    let constitution = parse_constitution(text)?;
    let ids: Vec<&str> = constitution.rules().map(|entry| entry.rule.id.as_str()).collect();
    ensure(ids == ["R_A", "R_B"], "traversal follows domain order")
}

// ============================================================================
// SECTION: Failures
// ============================================================================

/// Verifies dangling references are reported.
#[test]
fn dangling_references_are_rejected() -> TestResult {
    let bad_article = format!("{PREAMBLE}\n{}", article_table("A2", "nowhere"));
    ensure(
        matches!(
            parse_constitution(&bad_article),
            Err(CorpusError::Structure(ConstitutionError::UndefinedDomain { .. }))
        ),
        "undefined domain should be reported",
    )?;

    let bad_rule = format!("{PREAMBLE}\n{}", rule_table("R1", "A9", "input.x == 1"));
    ensure(
        matches!(
            parse_constitution(&bad_rule),
            Err(CorpusError::Structure(ConstitutionError::UndefinedArticle { .. }))
        ),
        "undefined article should be reported",
    )
}

/// Verifies duplicates and structural problems are rejected.
#[test]
fn structural_problems_are_rejected() -> TestResult {
    let duplicate_article = format!("{PREAMBLE}\n{}", article_table("A1", "privacy"));
    ensure(
        matches!(
            parse_constitution(&duplicate_article),
            Err(CorpusError::Structure(ConstitutionError::DuplicateArticle(_)))
        ),
        "duplicate article should be rejected",
    )?;

    let rule = rule_table("R1", "A1", "input.x == 1");
    let duplicate_rule = format!("{PREAMBLE}\n{rule}\n{rule}");
    ensure(
        matches!(
            parse_constitution(&duplicate_rule),
            Err(CorpusError::Structure(ConstitutionError::DuplicateRule(_)))
        ),
        "duplicate rule should be rejected",
    )?;

    let scan = rule_table("R1", "A1", r#"any(policies, item.status == "VIOLATED")"#);
    let policy_scan = format!("{PREAMBLE}\n{scan}");
    ensure(
        matches!(
            parse_constitution(&policy_scan),
            Err(CorpusError::Structure(ConstitutionError::PolicyScanOutsideMeta { .. }))
        ),
        "policies scan outside meta should be rejected",
    )
}

/// Verifies invalid conditions name the offending rule.
#[test]
fn invalid_condition_names_rule() -> TestResult {
    let text = format!("{PREAMBLE}\n{}", rule_table("R_BAD", "A1", "input.x =="));
    let Err(CorpusError::Condition {
        rule,
        ..
    }) = parse_constitution(&text)
    else {
        return Err("invalid condition should be reported".into());
    };
    ensure(rule.as_str() == "R_BAD", "error should name the rule")
}

/// Verifies TOML shape errors are parse errors.
#[test]
fn shape_errors_are_parse_errors() -> TestResult {
    let header = "[constitution]\nname = \"x\"\nversion = \"1\"\n[[domains]]\nid = \"d\"\n";
    let unknown_field = format!("{header}color = \"red\"");
    let unknown_severity =
        format!("{header}{}default_severity = \"SEVERE\"", article_table("a", "d"));
    let cases = [
        ("", "missing header"),
        ("[constitution]\nname = \"x\"", "missing version"),
        (unknown_field.as_str(), "unknown field"),
        (unknown_severity.as_str(), "unknown severity"),
    ];
    for (text, label) in cases {
        ensure(
            matches!(parse_constitution(text), Err(CorpusError::Parse(_))),
            format!("{label} should be a parse error"),
        )?;
    }
    Ok(())
}

/// Verifies oversized corpora are refused before parsing.
#[test]
fn oversized_corpus_is_refused() -> TestResult {
    let dir = tempfile::tempdir()?;
    let text = format!("{MINIMAL_CORPUS}\n# {}\n", "x".repeat(MAX_CORPUS_FILE_SIZE));
    let path = write_file(dir.path(), "big.toml", &text)?;
    ensure(
        matches!(load_constitution(&path), Err(CorpusError::TooLarge { .. })),
        "oversized file should be refused",
    )?;
    ensure(
        matches!(load_constitution(&dir.path().join("absent.toml")), Err(CorpusError::Io(_))),
        "missing file should be an io error",
    )
}
