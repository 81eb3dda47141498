// crates/sigfox-cli/src/main.rs
// ============================================================================
// Module: Sigfox Pipeline CLI Entry Point
// Description: Command dispatcher for step, callback, decode, and config tasks.
// Purpose: Run pipeline entry points from files for local operation and tests.
// Dependencies: clap, sigfox-cli, sigfox-config, sigfox-runtime, tokio
// ============================================================================

//! ## Overview
//! The `sigfox-pipeline` binary runs one step invocation or one callback
//! ingestion from files on disk, decodes structured payloads, and checks
//! configuration. All user-facing strings are routed through the message
//! catalog. Inputs are untrusted and read with hard size limits.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use serde_json::Map;
use serde_json::Value;
use sigfox_broker::MAX_TRIGGER_BYTES;
use sigfox_cli::input::MAX_CALLBACK_BODY_BYTES;
use sigfox_cli::input::ReadLimitError;
use sigfox_cli::input::read_bytes_with_limit;
use sigfox_cli::input::read_json_object;
use sigfox_cli::t;
use sigfox_cli::wiring::build_callback_ingestor;
use sigfox_cli::wiring::build_step_handler;
use sigfox_config::PipelineConfig;
use sigfox_config::config_toml_example;
use sigfox_runtime::CallbackRequest;
use sigfox_steps::decode_message;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "sigfox-pipeline", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one step invocation from a trigger file.
    Step(StepCommand),
    /// Ingest one Sigfox callback body.
    Callback(CallbackCommand),
    /// Decode a structured sensor payload.
    Decode(DecodeCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Arguments for `step`.
#[derive(Args, Debug)]
struct StepCommand {
    /// Raw trigger file (queue event or HTTP body).
    #[arg(long, value_name = "PATH")]
    trigger: PathBuf,
    /// Built-in step to run (defaults to function.name).
    #[arg(long, value_name = "NAME")]
    function: Option<String>,
    /// Decode the trigger as an HTTP request body.
    #[arg(long, action = ArgAction::SetTrue)]
    http: bool,
    /// Optional config file path (defaults to sigfox-pipeline.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Arguments for `callback`.
#[derive(Args, Debug)]
struct CallbackCommand {
    /// JSON file holding the callback body.
    #[arg(long, value_name = "PATH")]
    body: PathBuf,
    /// Message type query parameter.
    #[arg(long = "type", value_name = "TYPE")]
    message_type: Option<String>,
    /// Device query parameter.
    #[arg(long, value_name = "DEVICE")]
    device: Option<String>,
    /// Optional config file path (defaults to sigfox-pipeline.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Arguments for `decode`.
#[derive(Args, Debug)]
struct DecodeCommand {
    /// Hex payload.
    #[arg(value_name = "HEX")]
    data: String,
    /// Field decoded as text instead of a number (repeatable).
    #[arg(long = "text-field", value_name = "NAME")]
    text_fields: Vec<String>,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Load and validate a configuration file.
    Check(ConfigCheckCommand),
    /// Print a canonical example configuration.
    Example,
}

/// Arguments for `config check`.
#[derive(Args, Debug)]
struct ConfigCheckCommand {
    /// Optional config file path (defaults to sigfox-pipeline.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for catalog messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a catalog message.
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
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Step(command) => command_step(command).await,
        Commands::Callback(command) => command_callback(command).await,
        Commands::Decode(command) => command_decode(&command),
        Commands::Config {
            command,
        } => command_config(command),
    }
}

/// Prints the top-level help text.
fn show_help() -> CliResult<()> {
    let help = Cli::command().render_help().to_string();
    write_stdout_line(help.trim_end()).map_err(|err| CliError::new(output_error("stdout", &err)))
}

// ============================================================================
// SECTION: Step Command
// ============================================================================

/// Runs one step invocation and prints its report.
///
/// Exits with failure only when the trigger could not be decoded.
async fn command_step(command: StepCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref())?;
    let function = command
        .function
        .or_else(|| config.function.name.clone())
        .ok_or_else(|| CliError::new(t!("step.function_missing")))?;
    let raw = read_input(&command.trigger, "trigger", MAX_TRIGGER_BYTES)?;
    let handler = build_step_handler(&config, &function, command.http)
        .map_err(|err| CliError::new(t!("step.wiring_failed", error = err)))?;
    let report = handler.handle(&raw).await;
    write_json_value(&report.to_json())?;
    if report.envelope.is_some() { Ok(ExitCode::SUCCESS) } else { Ok(ExitCode::FAILURE) }
}

// ============================================================================
// SECTION: Callback Command
// ============================================================================

/// Ingests one callback body and prints the downlink response and envelope.
async fn command_callback(command: CallbackCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref())?;
    let body = read_json_object(&command.body, MAX_CALLBACK_BODY_BYTES)
        .map_err(|err| input_error(&command.body, "callback body", err))?;
    let mut query = Map::new();
    if let Some(message_type) = command.message_type {
        query.insert("type".to_string(), Value::String(message_type));
    }
    if let Some(device) = command.device {
        query.insert("device".to_string(), Value::String(device));
    }
    let ingestor = build_callback_ingestor(&config)
        .map_err(|err| CliError::new(t!("callback.wiring_failed", error = err)))?;
    let result = ingestor
        .ingest(CallbackRequest {
            body,
            query,
            path: config.callback.path.clone(),
        })
        .await;
    write_json_value(&result.to_json())?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Decode Command
// ============================================================================

/// Decodes a structured payload and prints the fields.
fn command_decode(command: &DecodeCommand) -> CliResult<ExitCode> {
    let fields = decode_message(command.data.trim(), &command.text_fields)
        .map_err(|err| CliError::new(t!("decode.failed", error = err)))?;
    write_json_value(&Value::Object(fields))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Check(command) => command_config_check(&command),
        ConfigCommand::Example => command_config_example(),
    }
}

/// Executes the config check command.
fn command_config_check(command: &ConfigCheckCommand) -> CliResult<ExitCode> {
    let _config = load_config(command.config.as_deref())?;
    write_stdout_line(&t!("config.check.ok"))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Prints the canonical example configuration.
fn command_config_example() -> CliResult<ExitCode> {
    write_stdout_line(config_toml_example().trim_end())
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Input Helpers
// ============================================================================

/// Loads and validates configuration.
fn load_config(path: Option<&Path>) -> CliResult<PipelineConfig> {
    PipelineConfig::load(path).map_err(|err| CliError::new(t!("config.load_failed", error = err)))
}

/// Reads a raw input file with a size limit.
fn read_input(path: &Path, kind: &str, max_bytes: usize) -> CliResult<Vec<u8>> {
    read_bytes_with_limit(path, max_bytes).map_err(|err| input_error(path, kind, err))
}

/// Maps a bounded-read failure onto a catalog message.
fn input_error(path: &Path, kind: &str, error: ReadLimitError) -> CliError {
    let path = path.display();
    let message = match error {
        ReadLimitError::TooLarge {
            size,
            limit,
        } => t!("input.read_too_large", kind = kind, path = path, size = size, limit = limit),
        ReadLimitError::Io(err) => t!("input.read_failed", kind = kind, path = path, error = err),
        ReadLimitError::Json(err) => {
            t!("input.parse_failed", kind = kind, path = path, error = err)
        }
        ReadLimitError::NotObject => t!("input.not_object", kind = kind, path = path),
    };
    CliError::new(message)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a JSON value to stdout as one line.
fn write_json_value(value: &Value) -> CliResult<()> {
    let line = serde_json::to_string(value)
        .map_err(|err| CliError::new(t!("output.json_failed", error = err)))?;
    write_stdout_line(&line).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
