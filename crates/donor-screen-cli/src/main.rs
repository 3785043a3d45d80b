// crates/donor-screen-cli/src/main.rs
// ============================================================================
// Module: Donor Screen CLI Entry Point
// Description: Command dispatcher for rule management and evaluation runs.
// Purpose: Provide an operator CLI over the screening store and engine.
// Dependencies: clap, donor-screen-batch, donor-screen-config, donor-screen-core,
//               donor-screen-store-sqlite, serde_json, tokio, tracing-subscriber
// ============================================================================

//! ## Overview
//! The Donor Screen CLI manages the screening rule set, imports intake
//! submissions, and triggers single or batch evaluations against the durable
//! store. Inputs are untrusted: file reads are size-limited and every rule
//! field is parsed through the core's strict parsers before it reaches the
//! store.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use donor_screen_batch::BatchConfig;
use donor_screen_batch::BatchRunner;
use donor_screen_batch::CancelToken;
use donor_screen_config::ScreeningConfig;
use donor_screen_core::ComparisonOp;
use donor_screen_core::EvaluationResult;
use donor_screen_core::FieldPath;
use donor_screen_core::RuleCheck;
use donor_screen_core::RuleDraft;
use donor_screen_core::RuleId;
use donor_screen_core::RuleKey;
use donor_screen_core::RulePatch;
use donor_screen_core::RuleStore;
use donor_screen_core::RuleType;
use donor_screen_core::RuleValue;
use donor_screen_core::ScreeningRule;
use donor_screen_core::Severity;
use donor_screen_core::Submission;
use donor_screen_core::SubmissionId;
use donor_screen_core::Timestamp;
use donor_screen_core::runtime::ScreeningEngine;
use donor_screen_store_sqlite::SqliteScreeningStore;
use serde::Deserialize;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of a submission import file.
const MAX_IMPORT_BYTES: u64 = 1_048_576;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "donor-screen", version, about = "Donor intake eligibility screening")]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Screening rule management.
    Rule {
        /// Selected rule subcommand.
        #[command(subcommand)]
        command: RuleCommand,
    },
    /// Submission intake utilities.
    Submission {
        /// Selected submission subcommand.
        #[command(subcommand)]
        command: SubmissionCommand,
    },
    /// Evaluate one submission now.
    Evaluate(EvaluateCommand),
    /// Evaluate the unevaluated backlog.
    Batch(BatchCommand),
}

/// Rule management subcommands.
#[derive(Subcommand, Debug)]
enum RuleCommand {
    /// Create a new screening rule.
    Add(RuleAddCommand),
    /// List screening rules.
    List(RuleListCommand),
    /// Update fields of an existing rule.
    Update(RuleUpdateCommand),
    /// Delete a rule permanently.
    Delete(RuleDeleteCommand),
    /// Activate or deactivate a rule.
    Toggle(RuleToggleCommand),
}

/// Arguments for rule creation.
#[derive(Args, Debug)]
struct RuleAddCommand {
    /// Stable unique rule key.
    #[arg(long, value_name = "KEY")]
    key: String,
    /// Rule classification (`hard_disqualify` or `soft_flag`).
    #[arg(long = "type", value_name = "TYPE")]
    rule_type: String,
    /// Display name embedded in evaluation flags.
    #[arg(long, value_name = "NAME")]
    name: String,
    /// Submission field the rule inspects.
    #[arg(long, value_name = "FIELD")]
    field: String,
    /// Comparison operator (`gt`, `gte`, `lt`, `lte`, `eq`, `neq`).
    #[arg(long, value_name = "OP")]
    op: String,
    /// Comparison value; coerced to boolean or number where possible.
    #[arg(long, value_name = "VALUE")]
    value: String,
    /// Severity (`critical`, `high`, `medium`, `low`).
    #[arg(long, value_name = "SEVERITY")]
    severity: String,
    /// Display ordering among rules of the same type.
    #[arg(long, value_name = "N", default_value_t = 0)]
    order: i64,
    /// Optional operator-facing description.
    #[arg(long, value_name = "TEXT")]
    description: Option<String>,
    /// Create the rule in a deactivated state.
    #[arg(long)]
    inactive: bool,
}

/// Arguments for rule listing.
#[derive(Args, Debug)]
struct RuleListCommand {
    /// Include deactivated rules.
    #[arg(long)]
    all: bool,
}

/// Arguments for rule updates. The rule key is immutable and has no flag.
#[derive(Args, Debug)]
struct RuleUpdateCommand {
    /// Store identity of the rule.
    #[arg(long, value_name = "ID")]
    id: i64,
    /// New rule classification.
    #[arg(long = "type", value_name = "TYPE")]
    rule_type: Option<String>,
    /// New display name.
    #[arg(long, value_name = "NAME")]
    name: Option<String>,
    /// New submission field.
    #[arg(long, value_name = "FIELD")]
    field: Option<String>,
    /// New comparison operator; must be paired with `--value`.
    #[arg(long, value_name = "OP", requires = "value")]
    op: Option<String>,
    /// New comparison value; must be paired with `--op`.
    #[arg(long, value_name = "VALUE", requires = "op")]
    value: Option<String>,
    /// New severity.
    #[arg(long, value_name = "SEVERITY")]
    severity: Option<String>,
    /// New display ordering.
    #[arg(long, value_name = "N")]
    order: Option<i64>,
    /// New description.
    #[arg(long, value_name = "TEXT")]
    description: Option<String>,
}

/// Arguments for rule deletion.
#[derive(Args, Debug)]
struct RuleDeleteCommand {
    /// Store identity of the rule.
    #[arg(long, value_name = "ID")]
    id: i64,
}

/// Arguments for rule activation toggling.
#[derive(Args, Debug)]
struct RuleToggleCommand {
    /// Store identity of the rule.
    #[arg(long, value_name = "ID")]
    id: i64,
    /// Desired activation state.
    #[arg(long, value_name = "BOOL")]
    active: bool,
}

/// Submission subcommands.
#[derive(Subcommand, Debug)]
enum SubmissionCommand {
    /// Import intake submissions from a JSON file.
    Import(SubmissionImportCommand),
}

/// Arguments for submission import.
#[derive(Args, Debug)]
struct SubmissionImportCommand {
    /// Path to a JSON file holding one record or an array of records.
    #[arg(long, value_name = "PATH")]
    file: PathBuf,
}

/// Arguments for single-submission evaluation.
#[derive(Args, Debug)]
struct EvaluateCommand {
    /// Submission identifier to evaluate.
    #[arg(long, value_name = "ID")]
    id: String,
    /// Evaluation instant as unix epoch milliseconds (defaults to now).
    #[arg(long, value_name = "MILLIS")]
    as_of: Option<i64>,
}

/// Arguments for batch evaluation.
#[derive(Args, Debug)]
struct BatchCommand {
    /// Override the configured backlog limit.
    #[arg(long, value_name = "N")]
    limit: Option<usize>,
    /// Evaluation instant as unix epoch milliseconds (defaults to now).
    #[arg(long, value_name = "MILLIS")]
    as_of: Option<i64>,
}

// ============================================================================
// SECTION: Import Payloads
// ============================================================================

/// One imported submission record.
#[derive(Debug, Deserialize)]
struct ImportRecord {
    /// External submission identifier.
    submission_id: String,
    /// Raw intake fields.
    #[serde(flatten)]
    intake: Submission,
}

/// Import file shape: a single record or an array of records.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ImportPayload {
    /// Multiple records.
    Many(Vec<ImportRecord>),
    /// A single record.
    One(ImportRecord),
}

impl ImportPayload {
    /// Flattens the payload into a record list.
    fn into_records(self) -> Vec<ImportRecord> {
        match self {
            Self::Many(records) => records,
            Self::One(record) => vec![record],
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper carrying a rendered message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a rendered message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }

    /// Wraps any displayable error.
    fn from_display(err: impl std::fmt::Display) -> Self {
        Self::new(err.to_string())
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    init_tracing();
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Installs the stderr tracing subscriber.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let config = ScreeningConfig::load(cli.config.as_deref()).map_err(CliError::from_display)?;
    let store = Arc::new(
        SqliteScreeningStore::open(&config.store).map_err(CliError::from_display)?,
    );

    match cli.command {
        Commands::Rule {
            command,
        } => command_rule(command, &store),
        Commands::Submission {
            command,
        } => command_submission(command, &store),
        Commands::Evaluate(command) => command_evaluate(&command, &store, &config),
        Commands::Batch(command) => command_batch(command, store, &config).await,
    }
}

// ============================================================================
// SECTION: Rule Commands
// ============================================================================

/// Executes a `rule` subcommand.
fn command_rule(command: RuleCommand, store: &Arc<SqliteScreeningStore>) -> CliResult<ExitCode> {
    match command {
        RuleCommand::Add(command) => {
            let draft = build_draft(&command)?;
            let rule = store.create(draft).map_err(CliError::from_display)?;
            write_stdout_line(&render_rule(&rule))?;
        }
        RuleCommand::List(command) => {
            let rules = store.list(!command.all).map_err(CliError::from_display)?;
            for rule in &rules {
                write_stdout_line(&render_rule(rule))?;
            }
        }
        RuleCommand::Update(command) => {
            let patch = build_patch(&command)?;
            let rule = store
                .update(RuleId::new(command.id), patch)
                .map_err(CliError::from_display)?;
            write_stdout_line(&render_rule(&rule))?;
        }
        RuleCommand::Delete(command) => {
            store.delete(RuleId::new(command.id)).map_err(CliError::from_display)?;
            write_stdout_line(&format!("deleted rule {}", command.id))?;
        }
        RuleCommand::Toggle(command) => {
            let rule = store
                .set_active(RuleId::new(command.id), command.active)
                .map_err(CliError::from_display)?;
            write_stdout_line(&render_rule(&rule))?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Builds a rule draft from `rule add` arguments.
fn build_draft(command: &RuleAddCommand) -> CliResult<RuleDraft> {
    Ok(RuleDraft {
        rule_key: RuleKey::new(command.key.clone()),
        rule_type: RuleType::from_str(&command.rule_type).map_err(CliError::from_display)?,
        rule_name: command.name.clone(),
        field_path: FieldPath::from_str(&command.field).map_err(CliError::from_display)?,
        check: RuleCheck {
            op: ComparisonOp::from_str(&command.op).map_err(CliError::from_display)?,
            value: RuleValue::coerce(&command.value),
        },
        severity: Severity::from_str(&command.severity).map_err(CliError::from_display)?,
        is_active: !command.inactive,
        display_order: command.order,
        description: command.description.clone(),
    })
}

/// Builds a rule patch from `rule update` arguments.
fn build_patch(command: &RuleUpdateCommand) -> CliResult<RulePatch> {
    let rule_type = match &command.rule_type {
        Some(raw) => Some(RuleType::from_str(raw).map_err(CliError::from_display)?),
        None => None,
    };
    let field_path = match &command.field {
        Some(raw) => Some(FieldPath::from_str(raw).map_err(CliError::from_display)?),
        None => None,
    };
    let severity = match &command.severity {
        Some(raw) => Some(Severity::from_str(raw).map_err(CliError::from_display)?),
        None => None,
    };
    let check = match (&command.op, &command.value) {
        (Some(op), Some(value)) => Some(RuleCheck {
            op: ComparisonOp::from_str(op).map_err(CliError::from_display)?,
            value: RuleValue::coerce(value),
        }),
        _ => None,
    };
    Ok(RulePatch {
        rule_type,
        rule_name: command.name.clone(),
        field_path,
        check,
        severity,
        is_active: None,
        display_order: command.order,
        description: command.description.clone(),
    })
}

// ============================================================================
// SECTION: Submission Commands
// ============================================================================

/// Executes a `submission` subcommand.
fn command_submission(
    command: SubmissionCommand,
    store: &Arc<SqliteScreeningStore>,
) -> CliResult<ExitCode> {
    match command {
        SubmissionCommand::Import(command) => {
            let raw = read_bounded(&command.file)?;
            let payload: ImportPayload =
                serde_json::from_str(&raw).map_err(CliError::from_display)?;
            let records = payload.into_records();
            let count = records.len();
            for record in records {
                store
                    .insert_submission(&SubmissionId::new(record.submission_id), &record.intake)
                    .map_err(CliError::from_display)?;
            }
            write_stdout_line(&format!("imported {count} submission(s)"))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Reads a file with the import size limit enforced.
fn read_bounded(path: &Path) -> CliResult<String> {
    let metadata = fs::metadata(path).map_err(CliError::from_display)?;
    if metadata.len() > MAX_IMPORT_BYTES {
        return Err(CliError::new(format!(
            "import file exceeds size limit ({} > {MAX_IMPORT_BYTES} bytes)",
            metadata.len()
        )));
    }
    fs::read_to_string(path).map_err(CliError::from_display)
}

// ============================================================================
// SECTION: Evaluation Commands
// ============================================================================

/// Executes the `evaluate` command.
fn command_evaluate(
    command: &EvaluateCommand,
    store: &Arc<SqliteScreeningStore>,
    config: &ScreeningConfig,
) -> CliResult<ExitCode> {
    let engine =
        ScreeningEngine::new(Arc::clone(store), Arc::clone(store), config.scoring);
    let as_of = command.as_of.map_or_else(Timestamp::now, Timestamp::from_unix_millis);
    let id = SubmissionId::new(command.id.clone());
    let result = engine.evaluate(&id, as_of).map_err(CliError::from_display)?;
    write_stdout_line(&render_result(&id, &result))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `batch` command.
async fn command_batch(
    command: BatchCommand,
    store: Arc<SqliteScreeningStore>,
    config: &ScreeningConfig,
) -> CliResult<ExitCode> {
    let engine = Arc::new(ScreeningEngine::new(
        Arc::clone(&store),
        Arc::clone(&store),
        config.scoring,
    ));
    let batch_config = BatchConfig {
        limit: command.limit.unwrap_or(config.batch.limit),
        ..config.batch
    };
    let runner = BatchRunner::new(engine, batch_config);
    let as_of = command.as_of.map_or_else(Timestamp::now, Timestamp::from_unix_millis);
    let report =
        runner.run(as_of, &CancelToken::new()).await.map_err(CliError::from_display)?;
    write_stdout_line(&format!(
        "batch complete: {} processed of {} requested",
        report.processed, report.requested
    ))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Renders one rule as a stable single-line summary.
fn render_rule(rule: &ScreeningRule) -> String {
    let state = if rule.is_active { "active" } else { "inactive" };
    format!(
        "{} {} [{}/{}] {} {} {} ({state}) {}",
        rule.id,
        rule.rule_key,
        rule.rule_type,
        rule.severity,
        rule.field_path,
        rule.check.op,
        rule.check.value,
        rule.rule_name,
    )
}

/// Renders an evaluation result with its flags.
fn render_result(id: &SubmissionId, result: &EvaluationResult) -> String {
    let mut output = format!(
        "{id}: score {} recommendation {} ({} flag(s))",
        result.score,
        result.recommendation,
        result.flags.len(),
    );
    for flag in &result.flags {
        output.push_str(&format!(
            "\n  - [{}/{}] {}: {}",
            flag.rule_type, flag.severity, flag.rule_key, flag.message
        ));
    }
    output
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> CliResult<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
        .map_err(|err| CliError::new(format!("stdout write failed: {err}")))
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
