//! Summary report generation
//!
//! ## Pipeline
//!
//! 1. `explorer` walks `<name>/<version>/` depth-first
//! 2. `runner` loads and executes each notebook found on the way
//! 3. `assertions` locates the `# Asserts` cell and judges the cells after it
//! 4. `render` turns the collected rows into `summary.html`
//!
//! ## Failure policy
//!
//! Every notebook-level error (format, missing marker, non-boolean output, execution failure) is
//! fatal for the whole generation. Nothing is written unless every notebook produced a verdict;
//! a broken notebook is never reported as `KO`.

pub mod assertions;
pub mod explorer;
pub mod render;
pub mod runner;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use nb2report_notebook::NotebookError;
use thiserror::Error;

pub use assertions::{Verdict, aggregate, evaluate_output, find_assert_index};
pub use explorer::{DisplayRecord, ReportItems, ScaffoldExplorer};
pub use render::SummaryTemplate;
pub use runner::NotebookTestRunner;

use crate::config::ReportConfig;
use crate::executor::{ExecutionError, NotebookExecutor};

/// Errors raised while generating a summary
#[derive(Debug, Error, Diagnostic)]
pub enum ReportError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Notebook(#[from] NotebookError),

    #[error("asserts cell cannot be found")]
    #[diagnostic(
        code(nb2report::report::no_asserts),
        help("add a markdown cell containing `# Asserts` above the assertion cells")
    )]
    MissingAsserts,

    #[error("received string '{text}' (length: {len}) is not a binary output")]
    #[diagnostic(
        code(nb2report::report::not_boolean),
        help("every code cell after `# Asserts` must return True or False")
    )]
    NotBoolean { text: String, len: usize },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Execution(#[from] ExecutionError),

    #[error("error executing notebook '{}'", path.display())]
    #[diagnostic(code(nb2report::report::notebook))]
    InNotebook { path: PathBuf, source: Box<ReportError> },

    #[error("scaffold directory '{}' does not exist", path.display())]
    #[diagnostic(
        code(nb2report::report::no_scaffold),
        help("create it first with `nb2report create-scaffolding`")
    )]
    MissingScaffold { path: PathBuf },

    #[error("cannot access '{}'", path.display())]
    #[diagnostic(code(nb2report::report::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("template {origin} never uses `{placeholder}`")]
    #[diagnostic(
        code(nb2report::report::template),
        help("the template receives `title` and `report`, the list of rows to show")
    )]
    Template { origin: String, placeholder: &'static str },

    #[error("template {origin} cannot be rendered")]
    #[diagnostic(code(nb2report::report::template_syntax))]
    InvalidTemplate {
        origin: String,
        #[source]
        source: minijinja::Error,
    },
}

pub type ReportResult<T> = Result<T, ReportError>;

/// Title of the summary document.
pub fn summary_title(name: &str, version: &str) -> String {
    format!("Test summary for {} {}", name, version)
}

/// Generate the summary for `./<name>/<version>/`.
pub fn generate_summary(
    name: &str,
    version: &str,
    config: &ReportConfig,
    executor: &dyn NotebookExecutor,
) -> ReportResult<PathBuf> {
    let cwd = env::current_dir().map_err(|source| ReportError::Io {
        path: PathBuf::from("."),
        source,
    })?;
    generate_summary_in(&cwd, name, version, config, executor)
}

/// Generate the summary for `<base>/<name>/<version>/` and return the path of the written file.
///
/// The summary file is only written once every notebook has been executed and judged.
#[tracing::instrument(skip(base, config, executor))]
pub fn generate_summary_in(
    base: &Path,
    name: &str,
    version: &str,
    config: &ReportConfig,
    executor: &dyn NotebookExecutor,
) -> ReportResult<PathBuf> {
    let root = base.join(name).join(version);
    if !root.is_dir() {
        return Err(ReportError::MissingScaffold { path: root });
    }
    let template = SummaryTemplate::from_config(config)?;

    let runner = NotebookTestRunner::new(executor);
    let items = ScaffoldExplorer::new(&runner, config).explore(&root)?;

    let report_path = root.join(&config.report_file_name);
    let html = template.render(&summary_title(name, version), &items)?;
    fs::write(&report_path, html).map_err(|source| ReportError::Io {
        path: report_path.clone(),
        source,
    })?;

    tracing::info!(
        items = items.len(),
        "Summary report generated successfully at {}",
        report_path.display()
    );
    Ok(report_path)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_title() {
        assert_eq!(summary_title("pandas", "2.1.0"), "Test summary for pandas 2.1.0");
    }

    #[test]
    fn test_in_notebook_message_names_path_and_cause() {
        let err = ReportError::InNotebook {
            path: PathBuf::from("fw/1.0/t.ipynb"),
            source: Box::new(ReportError::MissingAsserts),
        };
        assert!(err.to_string().contains("fw/1.0/t.ipynb"));
        let cause = std::error::Error::source(&err).unwrap();
        assert_eq!(cause.to_string(), "asserts cell cannot be found");
    }

    #[test]
    fn test_missing_scaffold() {
        struct Never;
        impl NotebookExecutor for Never {
            fn execute(
                &self,
                _notebook: &mut nb2report_notebook::Notebook,
                _path: &Path,
            ) -> Result<(), ExecutionError> {
                unreachable!("nothing to execute")
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let err = generate_summary_in(dir.path(), "fw", "1.0", &ReportConfig::default(), &Never).unwrap_err();
        assert!(matches!(err, ReportError::MissingScaffold { .. }));
    }
}
