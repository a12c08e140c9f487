//! CLI module for nb2report
//!
//! ## Commands
//!
//! - `create-scaffolding -n <name> -v <version> -i <schema>` - Create the test tree from a schema notebook
//! - `create-report -n <name> -v <version>` - Execute the test notebooks and write `summary.html`
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use crate::version::NB2REPORT_VERSION;

/// Process exit status of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// A command failure, printed to stderr by [`run`].
#[derive(Debug)]
pub struct CliError {
    pub message: String,
    pub exit_code: ExitCode,
}

impl CliError {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            exit_code: ExitCode::FAILURE,
        }
    }

    /// Render a diagnostic (code, help and cause chain) as a failure.
    pub fn diagnostic(err: impl miette::Diagnostic + Send + Sync + 'static) -> Self {
        Self::failure(format!("{:?}", miette::Report::new(err)))
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Scaffold, execute and report on Jupyter test notebooks
#[derive(Parser, Debug)]
#[command(name = "nb2report")]
#[command(version = NB2REPORT_VERSION)]
#[command(
    about = "Generate the scaffolding of test notebooks and an HTML report from executing them",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log at debug level (overridden by RUST_LOG)
    #[arg(long, global = true)]
    pub debug: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the scaffolding of a framework from a test schema notebook
    CreateScaffolding {
        /// Framework name
        #[arg(short = 'n', long)]
        name: String,
        /// Framework version
        #[arg(short = 'v', long)]
        version: String,
        /// Path to the notebook with the test schema
        #[arg(short = 'i', long, value_name = "NOTEBOOK")]
        input: PathBuf,
    },

    /// Execute the notebooks of a framework version and write the HTML report
    CreateReport {
        /// Framework name
        #[arg(short = 'n', long)]
        name: String,
        /// Framework version
        #[arg(short = 'v', long)]
        version: String,
        /// Seconds allowed for executing one notebook
        #[arg(long, value_name = "SECS", default_value_t = 600, value_parser = clap::value_parser!(u64).range(1..))]
        timeout: u64,
        /// Jupyter command (default: $NB2REPORT_JUPYTER or `jupyter`)
        #[arg(long, value_name = "CMD")]
        jupyter: Option<String>,
        /// Custom Jinja HTML template, rendered with `title` and the `report` rows
        #[arg(long, value_name = "FILE")]
        template: Option<PathBuf>,
        /// Report file name inside <name>/<version>/
        #[arg(short = 'o', long, value_name = "FILE", default_value = crate::config::REPORT_FILE_NAME)]
        output: String,
    },
}

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Initialize structured logging with env-based filter, defaulting to info
fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .try_init();
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Command::CreateScaffolding { name, version, input } => commands::create_scaffolding(&name, &version, &input),
        Command::CreateReport {
            name,
            version,
            timeout,
            jupyter,
            template,
            output,
        } => {
            let mut config = crate::config::ReportConfig::from_env()
                .with_timeout(std::time::Duration::from_secs(timeout))
                .with_report_file_name(output);
            if let Some(jupyter) = jupyter {
                config = config.with_jupyter(jupyter);
            }
            if let Some(template) = template {
                config = config.with_template(template);
            }
            commands::create_report(&name, &version, &config)
        }
    }
}
