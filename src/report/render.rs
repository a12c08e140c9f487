//! HTML summary rendering
//!
//! Templates are Jinja documents rendered with minijinja. The context holds `title`, `version`
//! and `report`, the list of rows in walk order. Each row has `kind` (`heading` or `result`),
//! `title`, `color`, `verdict` and `verdict_color`. Output is HTML-escaped.

use std::fs;
use std::path::Path;

use minijinja::{AutoEscape, Environment, context};
use serde::Serialize;

use super::explorer::{DisplayRecord, ReportItems};
use super::{ReportError, ReportResult};
use crate::config::ReportConfig;
use crate::version::NB2REPORT_VERSION;

/// Template shipped with the binary.
pub const DEFAULT_TEMPLATE: &str = include_str!("../../assets/report_template.html");

/// Variables a template must use.
const REQUIRED: [&str; 2] = ["title", "report"];

/// A summary template that compiled and uses the required variables.
#[derive(Debug, Clone)]
pub struct SummaryTemplate {
    origin: String,
    source: String,
}

/// Template view of one [`DisplayRecord`].
#[derive(Debug, Serialize)]
struct Row<'a> {
    kind: &'static str,
    title: &'a str,
    color: &'a str,
    verdict: &'static str,
    verdict_color: &'static str,
}

impl<'a> From<&'a DisplayRecord> for Row<'a> {
    fn from(record: &'a DisplayRecord) -> Self {
        Self {
            kind: if record.verdict.is_some() { "result" } else { "heading" },
            title: &record.title,
            color: &record.color,
            verdict: record.verdict_label(),
            verdict_color: record.verdict_color(),
        }
    }
}

fn environment<'source>() -> Environment<'source> {
    let mut env = Environment::new();
    env.set_auto_escape_callback(|_| AutoEscape::Html);
    env
}

impl SummaryTemplate {
    /// The embedded default template.
    pub fn embedded() -> Self {
        Self {
            origin: "embedded template".to_string(),
            source: DEFAULT_TEMPLATE.to_string(),
        }
    }

    /// Load a template from disk and validate it.
    pub fn load(path: &Path) -> ReportResult<Self> {
        let source = fs::read_to_string(path).map_err(|source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_source(source, &path.display().to_string())
    }

    /// Compile `source` once to reject syntax errors and templates that ignore the report.
    pub fn from_source(source: String, origin: &str) -> ReportResult<Self> {
        let env = environment();
        let template = env
            .template_from_named_str(origin, &source)
            .map_err(|source| ReportError::InvalidTemplate {
                origin: origin.to_string(),
                source,
            })?;

        let used = template.undeclared_variables(false);
        if let Some(placeholder) = REQUIRED.into_iter().find(|name| !used.contains(*name)) {
            return Err(ReportError::Template {
                origin: origin.to_string(),
                placeholder,
            });
        }

        Ok(Self {
            origin: origin.to_string(),
            source,
        })
    }

    /// The configured template, or the embedded one.
    pub fn from_config(config: &ReportConfig) -> ReportResult<Self> {
        match &config.template {
            Some(path) => Self::load(path),
            None => Ok(Self::embedded()),
        }
    }

    /// Render the summary document.
    pub fn render(&self, title: &str, items: &ReportItems) -> ReportResult<String> {
        let rows: Vec<Row<'_>> = items.iter().map(Row::from).collect();
        environment()
            .render_named_str(
                &self.origin,
                &self.source,
                context! {
                    title => title,
                    version => NB2REPORT_VERSION,
                    report => rows,
                },
            )
            .map_err(|source| ReportError::InvalidTemplate {
                origin: self.origin.clone(),
                source,
            })
    }
}
