// covenant-cli/src/main.rs
// ============================================================================
// Module: Covenant CLI Entry Point
// Description: Command dispatcher for evaluation, corpus, and config workflows.
// Purpose: Run governed evaluation cycles and validate operator inputs offline.
// Dependencies: clap, covenant-config, covenant-core, serde_json, thiserror, tracing
// ============================================================================

//! ## Overview
//! `covenant evaluate` runs one kernel cycle over a JSON payload and prints the
//! sealed ADRA to stdout. `covenant corpus` validates or hashes a rule corpus
//! and `covenant config validate` checks a `covenant.toml`. Diagnostics and
//! audit lines go to stderr so stdout carries only command results.
//!
//! Exit codes: `0` success, `1` failure, `2` veto triggered under
//! `--fail-on-veto`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use covenant_cli::baselines::FileBaselineStore;
use covenant_cli::clock::SystemClock;
use covenant_cli::feed::FileBehavioralFeed;
use covenant_cli::input::read_bytes_with_limit;
use covenant_cli::input::read_stdin_with_limit;
use covenant_cli::logging;
use covenant_cli::recalibration::LogRecalibrationChannel;
use covenant_cli::sinks::ConfiguredAuditSink;
use covenant_config::CONFIG_ENV_VAR;
use covenant_config::CovenantConfig;
use covenant_config::DEFAULT_CONFIG_NAME;
use covenant_config::load_constitution;
use covenant_core::AgentId;
use covenant_core::Collaborators;
use covenant_core::Constitution;
use covenant_core::ConstitutionRegistry;
use covenant_core::DriftMonitor;
use covenant_core::EvaluationId;
use covenant_core::EvaluationRequest;
use covenant_core::EvaluationScope;
use covenant_core::Kernel;
use covenant_core::PublishStatus;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Kernel wired with the CLI collaborators.
type CliKernel =
    Kernel<ConfiguredAuditSink, FileBehavioralFeed, LogRecalibrationChannel, SystemClock>;

/// Exit code returned when `--fail-on-veto` is set and the veto fired.
const VETO_EXIT_CODE: u8 = 2;

/// Default identity when none is supplied.
const DEFAULT_IDENTITY: &str = "anonymous";

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "covenant", version, disable_help_subcommand = true)]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one evaluation cycle and print the sealed ADRA.
    Evaluate(EvaluateCommand),
    /// Rule corpus utilities.
    Corpus {
        /// Selected corpus subcommand.
        #[command(subcommand)]
        command: CorpusCommand,
    },
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Configuration and corpus selection shared by commands.
#[derive(Args, Debug, Clone)]
struct SourceArgs {
    /// Config file path (defaults to `COVENANT_CONFIG` or `covenant.toml`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Rule corpus path overriding `[corpus].path`.
    #[arg(long, value_name = "PATH")]
    corpus: Option<PathBuf>,
}

/// Arguments for `evaluate`.
#[derive(Args, Debug)]
struct EvaluateCommand {
    /// Config and corpus selection.
    #[command(flatten)]
    source: SourceArgs,
    /// Payload JSON file, or `-` for stdin.
    #[arg(long, value_name = "PATH")]
    payload: String,
    /// Agent or session identity observed by the drift path.
    #[arg(long, value_name = "ID", default_value = DEFAULT_IDENTITY)]
    identity: String,
    /// Evaluation identifier (defaults to `eval-<unix millis>`).
    #[arg(long, value_name = "ID")]
    evaluation_id: Option<String>,
    /// Industry recorded in the governance scope.
    #[arg(long, value_name = "NAME")]
    industry: Option<String>,
    /// Deployment profile recorded in the governance scope.
    #[arg(long, value_name = "NAME")]
    profile: Option<String>,
    /// Jurisdiction recorded in the governance scope.
    #[arg(long, value_name = "NAME")]
    jurisdiction: Option<String>,
    /// Exit with code 2 when the veto is triggered.
    #[arg(long)]
    fail_on_veto: bool,
}

/// Corpus subcommands.
#[derive(Subcommand, Debug)]
enum CorpusCommand {
    /// Parse and validate a rule corpus.
    Validate(SourceArgs),
    /// Print the canonical hash of a rule corpus.
    Hash(SourceArgs),
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Load and validate a config file.
    Validate(ConfigValidateCommand),
}

/// Arguments for `config validate`.
#[derive(Args, Debug)]
struct ConfigValidateCommand {
    /// Config file path (defaults to `COVENANT_CONFIG` or `covenant.toml`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper carrying a user-facing message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Evaluate(command) => command_evaluate(&command),
        Commands::Corpus {
            command,
        } => match command {
            CorpusCommand::Validate(source) => command_corpus_validate(&source),
            CorpusCommand::Hash(source) => command_corpus_hash(&source),
        },
        Commands::Config {
            command,
        } => match command {
            ConfigCommand::Validate(command) => command_config_validate(&command),
        },
    }
}

// ============================================================================
// SECTION: Evaluate
// ============================================================================

/// Executes `evaluate`.
fn command_evaluate(command: &EvaluateCommand) -> CliResult<ExitCode> {
    let config = load_config(command.source.config.as_deref())?;
    install_logging(&config)?;
    let constitution = load_corpus(&config, command.source.corpus.as_deref())?;
    let payload = read_payload(&command.payload, config.kernel.max_payload_bytes)?;
    let kernel = build_kernel(&config, constitution)?;

    let evaluation_id =
        command.evaluation_id.clone().unwrap_or_else(|| format!("eval-{}", unix_millis()));
    let mut request = EvaluationRequest::new(
        EvaluationId::new(evaluation_id),
        AgentId::new(command.identity.clone()),
        payload,
    );
    request.scope = EvaluationScope {
        industry: command.industry.clone(),
        profile: command.profile.clone(),
        jurisdiction: command.jurisdiction.clone(),
    };

    let report = kernel
        .evaluate(&request)
        .map_err(|err| CliError::new(format!("evaluation failed [{}]: {err}", err.tag())))?;
    let rendered = serde_json::to_string_pretty(&report.adra)
        .map_err(|err| CliError::new(format!("failed to render ADRA: {err}")))?;
    write_stdout_line(&rendered).map_err(|err| CliError::new(output_error("stdout", &err)))?;

    if let PublishStatus::Failed {
        attempts,
        error,
    } = &report.publish_status
    {
        warn!(
            evaluation_id = %report.adra.evaluation_id(),
            attempts,
            error = %error,
            "ADRA was not published"
        );
        return Err(CliError::new(format!(
            "audit sink rejected the ADRA after {attempts} attempts: {error}"
        )));
    }
    if command.fail_on_veto && report.adra.veto().veto_triggered() {
        return Ok(ExitCode::from(VETO_EXIT_CODE));
    }
    Ok(ExitCode::SUCCESS)
}

/// Wires the kernel with the collaborators selected by `config`.
fn build_kernel(config: &CovenantConfig, constitution: Constitution) -> CliResult<CliKernel> {
    let registry = ConstitutionRegistry::new(constitution)
        .map_err(|err| CliError::new(format!("corpus rejected: {err}")))?;
    let mut drift = DriftMonitor::new(config.drift.to_drift_config())
        .map_err(|err| CliError::new(format!("drift settings rejected: {err}")))?;
    if let Some(path) = &config.drift.baseline_path {
        drift = drift.with_store(Arc::new(FileBaselineStore::new(config.resolve(path))));
    }
    let audit = ConfiguredAuditSink::from_config(config)
        .map_err(|err| CliError::new(format!("audit sink unavailable: {err}")))?;
    let feed_path = config.kernel.feed_path.as_deref().map(|path| config.resolve(path));
    let collaborators = Collaborators {
        audit,
        feed: FileBehavioralFeed::new(feed_path),
        recalibration: LogRecalibrationChannel,
        clock: SystemClock,
    };
    Ok(Kernel::new(Arc::new(registry), drift, config.retry.policy(), collaborators)
        .with_regime_scope(config.scope.to_regime_scope())
        .with_emission_window(config.kernel.emission_window))
}

/// Reads and parses the payload from a file or stdin.
fn read_payload(source: &str, max_bytes: usize) -> CliResult<Value> {
    let bytes = if source == "-" {
        read_stdin_with_limit(max_bytes)
    } else {
        read_bytes_with_limit(Path::new(source), max_bytes)
    }
    .map_err(|err| CliError::new(format!("failed to read payload: {err}")))?;
    serde_json::from_slice(&bytes)
        .map_err(|err| CliError::new(format!("payload is not valid JSON: {err}")))
}

/// Returns the current Unix time in milliseconds.
fn unix_millis() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |elapsed| elapsed.as_millis())
}

// ============================================================================
// SECTION: Corpus
// ============================================================================

/// Executes `corpus validate`.
fn command_corpus_validate(source: &SourceArgs) -> CliResult<ExitCode> {
    let config = load_config(source.config.as_deref())?;
    install_logging(&config)?;
    let constitution = load_corpus(&config, source.corpus.as_deref())?;
    let message = format!(
        "Corpus valid: {} {} ({} rules)",
        constitution.name,
        constitution.version,
        constitution.rule_count()
    );
    write_stdout_line(&message).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `corpus hash`.
fn command_corpus_hash(source: &SourceArgs) -> CliResult<ExitCode> {
    let config = load_config(source.config.as_deref())?;
    install_logging(&config)?;
    let constitution = load_corpus(&config, source.corpus.as_deref())?;
    let digest = constitution
        .canonical_hash()
        .map_err(|err| CliError::new(format!("failed to hash corpus: {err}")))?;
    write_stdout_line(&digest.to_prefixed())
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Loads the corpus named on the command line or in the config.
fn load_corpus(config: &CovenantConfig, override_path: Option<&Path>) -> CliResult<Constitution> {
    let path = override_path.map_or_else(|| config.corpus_path(), Path::to_path_buf);
    load_constitution(&path)
        .map_err(|err| CliError::new(format!("failed to load {}: {err}", path.display())))
}

// ============================================================================
// SECTION: Config
// ============================================================================

/// Executes `config validate`.
fn command_config_validate(command: &ConfigValidateCommand) -> CliResult<ExitCode> {
    CovenantConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(format!("config load failed: {err}")))?;
    write_stdout_line("Config valid").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Loads configuration, falling back to defaults when no file is present.
///
/// Defaults apply only when no path was given, `COVENANT_CONFIG` is unset, and
/// `covenant.toml` does not exist in the working directory.
fn load_config(path: Option<&Path>) -> CliResult<CovenantConfig> {
    let implicit = path.is_none() && std::env::var_os(CONFIG_ENV_VAR).is_none();
    if implicit && !Path::new(DEFAULT_CONFIG_NAME).exists() {
        return Ok(CovenantConfig::default());
    }
    CovenantConfig::load(path).map_err(|err| CliError::new(format!("config load failed: {err}")))
}

/// Installs logging from the `[logging]` section.
fn install_logging(config: &CovenantConfig) -> CliResult<()> {
    logging::install(&config.logging.filter).map_err(CliError::new)
}

// ============================================================================
// SECTION: Output
// ============================================================================

/// Writes a line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output failure message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
