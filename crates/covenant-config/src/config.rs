// covenant-config/src/config.rs
// ============================================================================
// Module: Covenant Configuration
// Description: Configuration loading and validation for the Covenant kernel.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: covenant-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Every section is optional and defaults to the kernel defaults; anything
//! present is validated before the config is returned. Relative paths inside
//! the file resolve against the directory that holds it.
//!
//! The `[scope]` section maps deployment profiles to the regimes they enable
//! and regimes to their jurisdictions; an empty section leaves every regime
//! enabled.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use covenant_core::RegimeId;
use covenant_core::RegimeScope;
use covenant_core::ScopeProfile;
use covenant_core::runtime::DEFAULT_DRIFT_THRESHOLD;
use covenant_core::runtime::DEFAULT_EMA_ALPHA;
use covenant_core::runtime::DEFAULT_EMISSION_WINDOW;
use covenant_core::runtime::DEFAULT_MAX_ATTEMPTS;
use covenant_core::runtime::DEFAULT_SIGNIFICANT_DELTA;
use covenant_core::runtime::DriftConfig;
use covenant_core::runtime::RetryPolicy;
use covenant_core::runtime::default_weights;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "covenant.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "COVENANT_CONFIG";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default rule corpus location.
const DEFAULT_CORPUS_PATH: &str = "constitution/default.toml";
/// Upper bound on configured retry attempts.
const MAX_RETRY_ATTEMPTS: u32 = 10;
/// Default tracing filter directive.
const DEFAULT_LOG_FILTER: &str = "info";
/// Maximum length of the tracing filter directive.
const MAX_LOG_FILTER_LENGTH: usize = 1024;
/// Default maximum payload size accepted per evaluation.
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 1024 * 1024;
/// Upper bound on the configurable payload size.
const MAX_PAYLOAD_BYTES_LIMIT: usize = 16 * 1024 * 1024;
/// Upper bound on the veto deduplication window.
const MAX_EMISSION_WINDOW: usize = 1 << 20;
/// Maximum number of profiles or jurisdiction entries in `[scope]`.
const MAX_SCOPE_ENTRIES: usize = 256;
/// Maximum length of a profile, regime, industry, or jurisdiction name.
const MAX_SCOPE_NAME_LENGTH: usize = 128;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Covenant kernel configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CovenantConfig {
    /// Rule corpus location.
    #[serde(default)]
    pub corpus: CorpusConfig,
    /// L6 drift monitor settings.
    #[serde(default)]
    pub drift: DriftSettings,
    /// Collaborator retry settings.
    #[serde(default)]
    pub retry: RetrySettings,
    /// Audit sink selection.
    #[serde(default)]
    pub audit: AuditConfig,
    /// Log filter settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Per-cycle kernel limits and inputs.
    #[serde(default)]
    pub kernel: KernelConfig,
    /// Profile and jurisdiction tables for regime enablement.
    #[serde(default)]
    pub scope: ScopeConfig,
    /// Directory of the loaded file; relative paths resolve against it.
    #[serde(skip)]
    pub source_dir: Option<PathBuf>,
}

impl CovenantConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// Resolution order is the explicit path, then `COVENANT_CONFIG`, then
    /// `covenant.toml` in the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let mut config = Self::parse(content)?;
        config.source_dir = resolved.parent().map(Path::to_path_buf);
        Ok(config)
    }

    /// Parses and validates configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        if content.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.corpus.validate()?;
        self.drift.validate()?;
        self.retry.validate()?;
        self.audit.validate()?;
        self.logging.validate()?;
        self.kernel.validate()?;
        self.scope.validate()
    }

    /// Resolves a configured path against the config file's directory.
    #[must_use]
    pub fn resolve(&self, path: &str) -> PathBuf {
        let candidate = Path::new(path.trim());
        match &self.source_dir {
            Some(dir) if candidate.is_relative() => dir.join(candidate),
            _ => candidate.to_path_buf(),
        }
    }

    /// Returns the resolved rule corpus path.
    #[must_use]
    pub fn corpus_path(&self) -> PathBuf {
        self.resolve(&self.corpus.path)
    }
}

/// Rule corpus configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CorpusConfig {
    /// Path to the TOML rule corpus.
    #[serde(default = "default_corpus_path")]
    pub path: String,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            path: default_corpus_path(),
        }
    }
}

impl CorpusConfig {
    /// Validates the corpus section.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_path_string("corpus.path", &self.path)
    }
}

/// Drift monitor settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DriftSettings {
    /// Alert threshold in `(0, 1]`.
    #[serde(default = "default_drift_threshold")]
    pub threshold: f64,
    /// EMA smoothing factor in `(0, 1]`.
    #[serde(default = "default_ema_alpha")]
    pub ema_alpha: f64,
    /// Per-feature delta reported as significant.
    #[serde(default = "default_significant_delta")]
    pub significant_delta: f64,
    /// Per-feature weights; replaces the default table when present.
    #[serde(default = "default_weights")]
    pub weights: BTreeMap<String, f64>,
    /// JSON file persisting rolling baselines across runs; in-memory when unset.
    #[serde(default)]
    pub baseline_path: Option<String>,
}

impl Default for DriftSettings {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_DRIFT_THRESHOLD,
            ema_alpha: DEFAULT_EMA_ALPHA,
            significant_delta: DEFAULT_SIGNIFICANT_DELTA,
            weights: default_weights(),
            baseline_path: None,
        }
    }
}

impl DriftSettings {
    /// Returns the monitor configuration.
    #[must_use]
    pub fn to_drift_config(&self) -> DriftConfig {
        DriftConfig {
            threshold: self.threshold,
            ema_alpha: self.ema_alpha,
            significant_delta: self.significant_delta,
            weights: self.weights.clone(),
        }
    }

    /// Validates drift bounds and the baseline path.
    fn validate(&self) -> Result<(), ConfigError> {
        self.to_drift_config()
            .validate()
            .map_err(|err| ConfigError::Invalid(format!("drift: {err}")))?;
        if let Some(path) = &self.baseline_path {
            validate_path_string("drift.baseline_path", path)?;
        }
        Ok(())
    }
}

/// Collaborator retry settings.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetrySettings {
    /// Attempts per collaborator call, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl RetrySettings {
    /// Returns the retry policy.
    #[must_use]
    pub const fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts)
    }

    /// Validates the attempt budget.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 || self.max_attempts > MAX_RETRY_ATTEMPTS {
            return Err(ConfigError::Invalid(format!(
                "retry.max_attempts must be between 1 and {MAX_RETRY_ATTEMPTS}"
            )));
        }
        Ok(())
    }
}

/// Audit sink kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// JSON lines on stderr.
    #[default]
    Stderr,
    /// JSON lines appended to a file.
    File,
    /// Discard events and records.
    #[serde(alias = "noop")]
    None,
}

/// Audit sink configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Sink kind.
    #[serde(default)]
    pub sink: AuditSinkKind,
    /// Output path for the file sink.
    #[serde(default)]
    pub path: Option<String>,
}

impl AuditConfig {
    /// Validates the audit section.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, &self.path) {
            (AuditSinkKind::File, None) => Err(ConfigError::Invalid(
                "audit.path is required when sink = \"file\"".to_string(),
            )),
            (AuditSinkKind::File, Some(path)) => validate_path_string("audit.path", path),
            (_, Some(_)) => Err(ConfigError::Invalid(
                "audit.path is only valid when sink = \"file\"".to_string(),
            )),
            (_, None) => Ok(()),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Tracing filter directive; `COVENANT_LOG` overrides it at runtime.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl LoggingConfig {
    /// Validates the logging section.
    fn validate(&self) -> Result<(), ConfigError> {
        let trimmed = self.filter.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::Invalid("logging.filter must be non-empty".to_string()));
        }
        if trimmed.len() > MAX_LOG_FILTER_LENGTH {
            return Err(ConfigError::Invalid("logging.filter exceeds max length".to_string()));
        }
        Ok(())
    }
}

/// Kernel limits and inputs.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KernelConfig {
    /// Maximum payload size accepted per evaluation.
    #[serde(default = "default_max_payload_bytes")]
    pub max_payload_bytes: usize,
    /// Behavioral signal file backing the feed; drift is UNKNOWN without one.
    #[serde(default)]
    pub feed_path: Option<String>,
    /// Recent evaluation ids remembered for veto deduplication.
    #[serde(default = "default_emission_window")]
    pub emission_window: usize,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
            feed_path: None,
            emission_window: DEFAULT_EMISSION_WINDOW,
        }
    }
}

impl KernelConfig {
    /// Validates kernel limits.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_payload_bytes == 0 || self.max_payload_bytes > MAX_PAYLOAD_BYTES_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "kernel.max_payload_bytes must be between 1 and {MAX_PAYLOAD_BYTES_LIMIT}"
            )));
        }
        if let Some(path) = &self.feed_path {
            validate_path_string("kernel.feed_path", path)?;
        }
        if self.emission_window == 0 || self.emission_window > MAX_EMISSION_WINDOW {
            return Err(ConfigError::Invalid(format!(
                "kernel.emission_window must be between 1 and {MAX_EMISSION_WINDOW}"
            )));
        }
        Ok(())
    }
}

/// Regimes enabled by one profile.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileSettings {
    /// Industry the profile is bound to; any industry when unset.
    #[serde(default)]
    pub industry: Option<String>,
    /// Regimes the profile enables.
    pub regimes: Vec<String>,
}

/// Regime scope tables.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScopeConfig {
    /// Profiles keyed by name.
    #[serde(default)]
    pub profiles: BTreeMap<String, ProfileSettings>,
    /// Jurisdiction per regime (`EU`, `US-CA`, `GLOBAL`, ...).
    #[serde(default)]
    pub jurisdictions: BTreeMap<String, String>,
}

impl ScopeConfig {
    /// Returns the kernel's regime scope tables.
    #[must_use]
    pub fn to_regime_scope(&self) -> RegimeScope {
        RegimeScope {
            profiles: self
                .profiles
                .iter()
                .map(|(name, profile)| {
                    let settings = ScopeProfile {
                        industry: profile.industry.as_deref().map(str::trim).map(str::to_string),
                        regimes: profile
                            .regimes
                            .iter()
                            .map(|regime| RegimeId::new(regime.trim()))
                            .collect(),
                    };
                    (name.trim().to_string(), settings)
                })
                .collect(),
            jurisdictions: self
                .jurisdictions
                .iter()
                .map(|(regime, jurisdiction)| {
                    (RegimeId::new(regime.trim()), jurisdiction.trim().to_string())
                })
                .collect(),
        }
    }

    /// Validates table sizes and names.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.profiles.len() > MAX_SCOPE_ENTRIES || self.jurisdictions.len() > MAX_SCOPE_ENTRIES {
            return Err(ConfigError::Invalid(format!(
                "scope tables are limited to {MAX_SCOPE_ENTRIES} entries"
            )));
        }
        for (name, profile) in &self.profiles {
            validate_scope_name("scope.profiles", name)?;
            if let Some(industry) = &profile.industry {
                validate_scope_name(&format!("scope.profiles.{name}.industry"), industry)?;
            }
            if profile.regimes.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "scope.profiles.{name}.regimes must list at least one regime"
                )));
            }
            for regime in &profile.regimes {
                validate_scope_name(&format!("scope.profiles.{name}.regimes"), regime)?;
            }
        }
        for (regime, jurisdiction) in &self.jurisdictions {
            validate_scope_name("scope.jurisdictions", regime)?;
            validate_scope_name(&format!("scope.jurisdictions.{regime}"), jurisdiction)?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default corpus path.
fn default_corpus_path() -> String {
    DEFAULT_CORPUS_PATH.to_string()
}

/// Default drift threshold.
const fn default_drift_threshold() -> f64 {
    DEFAULT_DRIFT_THRESHOLD
}

/// Default EMA factor.
const fn default_ema_alpha() -> f64 {
    DEFAULT_EMA_ALPHA
}

/// Default significant delta.
const fn default_significant_delta() -> f64 {
    DEFAULT_SIGNIFICANT_DELTA
}

/// Default retry budget.
const fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

/// Default log filter.
fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

/// Default payload limit.
const fn default_max_payload_bytes() -> usize {
    DEFAULT_MAX_PAYLOAD_BYTES
}

/// Default veto deduplication window.
const fn default_emission_window() -> usize {
    DEFAULT_EMISSION_WINDOW
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a configured path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates a profile, regime, industry, or jurisdiction name.
fn validate_scope_name(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} entries must be non-empty")));
    }
    if trimmed.len() > MAX_SCOPE_NAME_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} entry exceeds max length")));
    }
    Ok(())
}
