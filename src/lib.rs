#![forbid(unsafe_code)]
//! nb2report: test reports from Jupyter notebooks
//!
//! A framework's tests live in a scaffold of notebooks under `<name>/<version>/`. Each notebook
//! has a markdown `# Asserts` cell; every code cell after it must evaluate to `True`. This crate
//! creates such scaffolds from a schema notebook, executes every notebook in one, and renders a
//! pass/fail summary as HTML.
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.

pub mod cli;
pub mod config;
pub mod executor;
pub mod report;
pub mod scaffolding;
pub mod version;

pub use config::ReportConfig;
pub use executor::{ExecutionError, NbconvertExecutor, NotebookExecutor};
pub use report::{ReportError, Verdict, generate_summary, generate_summary_in};
pub use scaffolding::ScaffoldError;

pub use nb2report_notebook as notebook;
