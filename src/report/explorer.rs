//! Scaffold exploration
//!
//! Walks `<name>/<version>/` depth-first in pre-order. Every directory below the root becomes a
//! heading row of the summary; every notebook is executed and becomes a result row.
//!
//! Symlinked directories are followed, but a directory already on the walk (by canonical path)
//! is skipped, so `latest -> .` style links cannot loop.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use nb2report_notebook::NOTEBOOK_EXTENSION;

use super::assertions::Verdict;
use super::runner::NotebookTestRunner;
use super::{ReportError, ReportResult};
use crate::config::ReportConfig;

/// One renderable row of the summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRecord {
    pub title: String,
    pub color: String,
    /// `None` for directory headings.
    pub verdict: Option<Verdict>,
}

impl DisplayRecord {
    pub fn heading(title: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            color: color.into(),
            verdict: None,
        }
    }

    pub fn result(title: impl Into<String>, color: impl Into<String>, verdict: Verdict) -> Self {
        Self {
            title: title.into(),
            color: color.into(),
            verdict: Some(verdict),
        }
    }

    /// `OK`, `KO`, or empty for headings.
    pub fn verdict_label(&self) -> &'static str {
        self.verdict.map(Verdict::as_str).unwrap_or("")
    }

    /// `green` for passing notebooks, `red` for everything else.
    pub fn verdict_color(&self) -> &'static str {
        match self.verdict {
            Some(Verdict::Ok) => "green",
            _ => "red",
        }
    }
}

/// Rows collected during one summary generation, in walk order.
#[derive(Debug, Default)]
pub struct ReportItems {
    items: Vec<DisplayRecord>,
}

impl ReportItems {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: DisplayRecord) {
        tracing::debug!(title = %record.title, verdict = record.verdict_label(), "add report item");
        self.items.push(record);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DisplayRecord> {
        self.items.iter()
    }

    pub fn into_vec(self) -> Vec<DisplayRecord> {
        self.items
    }
}

impl<'a> IntoIterator for &'a ReportItems {
    type Item = &'a DisplayRecord;
    type IntoIter = std::slice::Iter<'a, DisplayRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Depth-first walker over a scaffold.
pub struct ScaffoldExplorer<'a> {
    runner: &'a NotebookTestRunner<'a>,
    config: &'a ReportConfig,
}

impl<'a> ScaffoldExplorer<'a> {
    pub fn new(runner: &'a NotebookTestRunner<'a>, config: &'a ReportConfig) -> Self {
        Self { runner, config }
    }

    /// Explore `root` and return the collected rows. The root itself is not a row.
    #[tracing::instrument(skip_all, fields(root = %root.display()))]
    pub fn explore(&self, root: &Path) -> ReportResult<ReportItems> {
        let mut items = ReportItems::new();
        let mut visited = HashSet::new();
        self.visit(root, 0, &mut items, &mut visited)?;
        Ok(items)
    }

    fn visit(
        &self,
        path: &Path,
        depth: usize,
        items: &mut ReportItems,
        visited: &mut HashSet<PathBuf>,
    ) -> ReportResult<()> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if path.is_dir() {
            let canonical = path.canonicalize().map_err(|source| ReportError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            if !visited.insert(canonical) {
                tracing::warn!("skipping {}, already explored", path.display());
                return Ok(());
            }
            if depth > 0 {
                items.push(DisplayRecord::heading(name, self.config.color_for_depth(depth)));
            }
            for child in sorted_children(path)? {
                self.visit(&child, depth + 1, items, visited)?;
            }
        } else if path.extension().is_some_and(|ext| ext == NOTEBOOK_EXTENSION) {
            let verdict = self.runner.run(path)?;
            items.push(DisplayRecord::result(name, self.config.leaf_color(), verdict));
        }

        Ok(())
    }
}

/// Non-hidden entries of `dir`, sorted by file name.
fn sorted_children(dir: &Path) -> ReportResult<Vec<PathBuf>> {
    let io_err = |source: std::io::Error| ReportError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut children = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        children.push(entry.path());
    }
    children.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(children)
}
