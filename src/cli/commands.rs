//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::path::Path;

use crate::config::ReportConfig;
use crate::executor::NbconvertExecutor;
use crate::{report, scaffolding};

use super::{CliError, CliResult, ExitCode};

/// Create `./<name>/<version>/` from a schema notebook.
pub fn create_scaffolding(name: &str, version: &str, input: &Path) -> CliResult<ExitCode> {
    let schema = std::path::absolute(input)
        .map_err(|e| CliError::failure(format!("Cannot resolve schema path '{}': {}", input.display(), e)))?;

    let scaffold = scaffolding::create(name, version, &schema).map_err(CliError::diagnostic)?;

    println!(
        "Created {} director{} and {} notebook{} under {}",
        scaffold.directories.len(),
        if scaffold.directories.len() == 1 { "y" } else { "ies" },
        scaffold.notebooks.len(),
        if scaffold.notebooks.len() == 1 { "" } else { "s" },
        scaffold.root.display()
    );
    Ok(ExitCode::SUCCESS)
}

/// Execute every notebook under `./<name>/<version>/` and write the summary.
///
/// Any notebook failure aborts the command before the summary is written.
pub fn create_report(name: &str, version: &str, config: &ReportConfig) -> CliResult<ExitCode> {
    let base = std::env::current_dir().map_err(|e| CliError::failure(format!("Cannot read current directory: {}", e)))?;
    // Kernels start where the command was run, next to `<name>/`.
    let executor = NbconvertExecutor::from_config(config).with_working_dir(&base);
    let path = report::generate_summary_in(&base, name, version, config, &executor).map_err(CliError::diagnostic)?;
    println!("{}", path.display());
    Ok(ExitCode::SUCCESS)
}
