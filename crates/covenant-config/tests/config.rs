// covenant-config/tests/config.rs
// ============================================================================
// Module: Configuration Tests
// Description: Defaults, section validation, and file loading limits.
// ============================================================================
//! ## Overview
//! Ensures `covenant.toml` parsing applies defaults and fails closed on
//! invalid sections.

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

use std::path::Path;

use covenant_config::AuditSinkKind;
use covenant_config::ConfigError;
use covenant_config::CovenantConfig;
use covenant_config::DEFAULT_MAX_PAYLOAD_BYTES;
use covenant_config::MAX_CONFIG_FILE_SIZE;
use covenant_core::RegimeId;
use covenant_core::RegimeScope;
use covenant_core::runtime::DEFAULT_EMISSION_WINDOW;
use covenant_core::runtime::DriftConfig;
use support::TestResult;
use support::ensure;
use support::write_file;

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Verifies an empty file yields kernel defaults.
#[test]
fn empty_config_uses_defaults() -> TestResult {
    let config = CovenantConfig::parse("")?;
    ensure(config.corpus.path == "constitution/default.toml", "default corpus path")?;
    ensure(config.drift.to_drift_config() == DriftConfig::default(), "default drift config")?;
    ensure(config.retry.policy().max_attempts() == 3, "default retry budget")?;
    ensure(config.audit.sink == AuditSinkKind::Stderr, "default sink is stderr")?;
    ensure(config.logging.filter == "info", "default filter")?;
    ensure(config.kernel.max_payload_bytes == DEFAULT_MAX_PAYLOAD_BYTES, "default payload limit")?;
    ensure(config.kernel.feed_path.is_none(), "no feed by default")?;
    ensure(config.kernel.emission_window == DEFAULT_EMISSION_WINDOW, "default window")?;
    ensure(config.drift.baseline_path.is_none(), "baselines are in-memory by default")?;
    ensure(config.scope.to_regime_scope() == RegimeScope::default(), "unscoped by default")
}

/// Verifies the shipped sample config is valid.
#[test]
fn shipped_sample_config_is_valid() -> TestResult {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../covenant.toml");
    let config = CovenantConfig::load(Some(&path))?;
    ensure(config.corpus_path().ends_with("constitution/default.toml"), "corpus resolves")?;
    ensure(config.corpus_path().exists(), "sample corpus path should exist")?;
    let scope = config.scope.to_regime_scope();
    ensure(scope.profiles.contains_key("content_platform"), "sample profile is loaded")?;
    ensure(
        scope.jurisdictions.get(&RegimeId::new("GDPR")).map(String::as_str) == Some("EU"),
        "sample jurisdictions are loaded",
    )
}

/// Verifies explicit sections override defaults.
#[test]
fn sections_override_defaults() -> TestResult {
    let config = CovenantConfig::parse(
        r#"
[drift]
threshold = 0.4
weights = { bot_probability = 3.0 }

[retry]
max_attempts = 5

[audit]
sink = "file"
path = "audit/adra.jsonl"

[logging]
filter = "covenant_core=debug"
"#,
    )?;
    let drift = config.drift.to_drift_config();
    ensure((drift.threshold - 0.4).abs() < f64::EPSILON, "threshold override")?;
    ensure(drift.weights.len() == 1, "weights table replaces the default")?;
    ensure(config.retry.policy().max_attempts() == 5, "retry override")?;
    ensure(config.audit.sink == AuditSinkKind::File, "file sink")?;
    ensure(config.logging.filter == "covenant_core=debug", "filter override")
}

/// Verifies the `none` sink also accepts the `noop` spelling.
#[test]
fn none_sink_accepts_noop_alias() -> TestResult {
    let none = CovenantConfig::parse("[audit]\nsink = \"none\"")?;
    let noop = CovenantConfig::parse("[audit]\nsink = \"noop\"")?;
    ensure(none.audit.sink == AuditSinkKind::None, "none selects the discarding sink")?;
    ensure(noop.audit.sink == AuditSinkKind::None, "noop is an alias of none")
}

/// Verifies scope tables, baseline path, and emission window parse.
#[test]
fn scope_and_persistence_settings_parse() -> TestResult {
    let config = CovenantConfig::parse(
        r#"
[drift]
baseline_path = "state/baselines.json"

[kernel]
emission_window = 128

[scope.profiles.content_moderation]
industry = "media"
regimes = ["DSA", " EU_AI_ACT "]

[scope.jurisdictions]
GDPR = "EU"
DSA = "EU"
"#,
    )?;
    ensure(config.drift.baseline_path.as_deref() == Some("state/baselines.json"), "path")?;
    ensure(config.kernel.emission_window == 128, "window override")?;
    let scope = config.scope.to_regime_scope();
    let profile = scope.profiles.get("content_moderation");
    ensure(
        profile.is_some_and(|profile| {
            profile.industry.as_deref() == Some("media")
                && profile.regimes == [RegimeId::new("DSA"), RegimeId::new("EU_AI_ACT")]
        }),
        "profile regimes should be trimmed and kept in order",
    )?;
    ensure(
        scope.jurisdictions.get(&RegimeId::new("GDPR")).map(String::as_str) == Some("EU"),
        "jurisdiction table should carry through",
    )
}

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Verifies invalid sections are rejected.
#[test]
fn invalid_sections_are_rejected() -> TestResult {
    let cases = [
        ("[drift]\nthreshold = 0.0", "zero threshold"),
        ("[drift]\nema_alpha = 2.0", "alpha above one"),
        ("[drift.weights]\nbot_probability = -1.0", "negative weight"),
        ("[retry]\nmax_attempts = 0", "zero attempts"),
        ("[retry]\nmax_attempts = 11", "too many attempts"),
        ("[audit]\nsink = \"file\"", "file sink without path"),
        ("[audit]\nsink = \"none\"\npath = \"x.jsonl\"", "path without file sink"),
        ("[logging]\nfilter = \"  \"", "blank filter"),
        ("[kernel]\nmax_payload_bytes = 0", "zero payload limit"),
        ("[corpus]\npath = \"\"", "blank corpus path"),
        ("[drift]\nbaseline_path = \" \"", "blank baseline path"),
        ("[kernel]\nemission_window = 0", "zero emission window"),
        ("[scope.profiles.empty]\nregimes = []", "profile without regimes"),
        ("[scope.profiles.blank]\nregimes = [\"\"]", "blank regime name"),
        ("[scope.jurisdictions]\nGDPR = \"\"", "blank jurisdiction"),
    ];
    for (text, label) in cases {
        ensure(
            matches!(CovenantConfig::parse(text), Err(ConfigError::Invalid(_))),
            format!("{label} should be invalid"),
        )?;
    }
    Ok(())
}

/// Verifies unknown keys and malformed TOML are parse errors.
#[test]
fn unknown_keys_are_parse_errors() -> TestResult {
    ensure(
        matches!(CovenantConfig::parse("[server]\nbind = 1"), Err(ConfigError::Parse(_))),
        "unknown section should be rejected",
    )?;
    ensure(
        matches!(CovenantConfig::parse("[retry]\nretries = 2"), Err(ConfigError::Parse(_))),
        "unknown key should be rejected",
    )?;
    ensure(
        matches!(CovenantConfig::parse("[retry"), Err(ConfigError::Parse(_))),
        "malformed TOML should be rejected",
    )
}

// ============================================================================
// SECTION: Loading
// ============================================================================

/// Verifies relative paths resolve against the config directory.
#[test]
fn relative_paths_resolve_against_config_dir() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = write_file(dir.path(), "covenant.toml", "[corpus]\npath = \"rules/main.toml\"")?;
    let config = CovenantConfig::load(Some(&path))?;
    ensure(config.corpus_path() == dir.path().join("rules/main.toml"), "relative corpus path")?;
    ensure(config.resolve("/abs/feed.json") == Path::new("/abs/feed.json"), "absolute kept")
}

/// Verifies oversized and non-UTF-8 files are rejected.
#[test]
fn oversized_and_binary_files_are_rejected() -> TestResult {
    let dir = tempfile::tempdir()?;
    let padding = format!("# {}\n", "x".repeat(MAX_CONFIG_FILE_SIZE));
    let big = write_file(dir.path(), "big.toml", &padding)?;
    ensure(
        matches!(CovenantConfig::load(Some(&big)), Err(ConfigError::Invalid(_))),
        "oversized file should be rejected",
    )?;

    let binary = dir.path().join("binary.toml");
    std::fs::write(&binary, [0xff, 0xfe, 0x00])?;
    ensure(
        matches!(CovenantConfig::load(Some(&binary)), Err(ConfigError::Invalid(_))),
        "non-utf-8 file should be rejected",
    )
}

/// Verifies a missing file is an I/O error.
#[test]
fn missing_file_is_io_error() -> TestResult {
    let dir = tempfile::tempdir()?;
    let missing = dir.path().join("absent.toml");
    ensure(
        matches!(CovenantConfig::load(Some(&missing)), Err(ConfigError::Io(_))),
        "missing file should be an io error",
    )
}
