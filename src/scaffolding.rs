//! Scaffold creation from a schema notebook
//!
//! The schema is an ordinary notebook whose markdown cells describe the test tree:
//!
//! ```text
//! # IO                -> <name>/<version>/IO/
//! ## Read             -> <name>/<version>/IO/Read/
//! * csv files         -> <name>/<version>/IO/Read/csv_files.ipynb
//! * json files        -> <name>/<version>/IO/Read/json_files.ipynb
//! # Core              -> <name>/<version>/Core/
//! ```
//!
//! Headings open a directory at their level, closing deeper ones. Bullet lines create one test
//! notebook each in the innermost open directory. Existing notebooks are never overwritten.

use std::fs;
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use nb2report_notebook::{Cell, Notebook, NotebookError, NOTEBOOK_EXTENSION};
use thiserror::Error;

/// Errors raised while creating a scaffold
#[derive(Debug, Error, Diagnostic)]
pub enum ScaffoldError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Notebook(#[from] NotebookError),

    #[error("cannot create '{}'", path.display())]
    #[diagnostic(code(nb2report::scaffold::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type ScaffoldResult<T> = Result<T, ScaffoldError>;

/// What a scaffolding run created.
#[derive(Debug, Default)]
pub struct Scaffold {
    pub root: PathBuf,
    pub directories: Vec<PathBuf>,
    pub notebooks: Vec<PathBuf>,
    /// Notebooks that already existed and were left alone.
    pub kept: Vec<PathBuf>,
}

/// Create `./<name>/<version>/` from the schema notebook at `schema`.
pub fn create(name: &str, version: &str, schema: &Path) -> ScaffoldResult<Scaffold> {
    let cwd = std::env::current_dir().map_err(|source| ScaffoldError::Io {
        path: PathBuf::from("."),
        source,
    })?;
    create_in(&cwd, name, version, schema)
}

/// Create `<base>/<name>/<version>/` from the schema notebook at `schema`.
#[tracing::instrument(skip(base, schema), fields(schema = %schema.display()))]
pub fn create_in(base: &Path, name: &str, version: &str, schema: &Path) -> ScaffoldResult<Scaffold> {
    let notebook = Notebook::load(schema)?;
    let root = base.join(name).join(version);
    make_dir(&root)?;

    let mut scaffold = Scaffold {
        root: root.clone(),
        ..Scaffold::default()
    };
    // Open directory names, one per heading level.
    let mut open: Vec<String> = Vec::new();

    for cell in &notebook.cells {
        if !cell.is_markdown()? {
            continue;
        }

        let mut bullets = &cell.source[..];
        if cell.is_title()? {
            let level = cell.heading_level()?;
            let heading = slugify(cell.first_line()?.trim_start_matches('#'));
            if heading.is_empty() {
                tracing::warn!("ignoring empty heading in schema cell {}", cell.describe());
                continue;
            }
            open.truncate(level.saturating_sub(1));
            open.push(heading);

            let dir = current_dir(&root, &open);
            make_dir(&dir)?;
            scaffold.directories.push(dir);
            bullets = &cell.source[1..];
        } else if !cell.is_list_item()? {
            continue;
        }

        let dir = current_dir(&root, &open);
        for line in bullets {
            let Some(item) = line.trim().strip_prefix('*') else { continue };
            let stem = slugify(item);
            if stem.is_empty() {
                continue;
            }
            let path = dir.join(format!("{stem}.{NOTEBOOK_EXTENSION}"));
            if path.exists() {
                tracing::warn!("{} already exists, keeping it", path.display());
                scaffold.kept.push(path);
                continue;
            }
            test_notebook(item.trim()).save(&path)?;
            tracing::debug!("created {}", path.display());
            scaffold.notebooks.push(path);
        }
    }

    tracing::info!(
        directories = scaffold.directories.len(),
        notebooks = scaffold.notebooks.len(),
        "Scaffolding created at {}",
        root.display()
    );
    Ok(scaffold)
}

/// The notebook created for one schema bullet.
pub fn test_notebook(title: &str) -> Notebook {
    Notebook::new(vec![
        Cell::markdown(&format!("# {title}")),
        Cell::code(""),
        Cell::markdown("# Asserts"),
        Cell::code(""),
    ])
}

/// File-system friendly name: whitespace runs become `_`, separators and leading dots are dropped.
pub fn slugify(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|'))
        .collect();
    cleaned
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .trim_start_matches('.')
        .to_string()
}

fn current_dir(root: &Path, open: &[String]) -> PathBuf {
    open.iter().fold(root.to_path_buf(), |dir, name| dir.join(name))
}

fn make_dir(path: &Path) -> ScaffoldResult<()> {
    fs::create_dir_all(path).map_err(|source| ScaffoldError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::report::find_assert_index;

    fn schema(dir: &Path, cells: Vec<Cell>) -> PathBuf {
        let path = dir.join("schema.ipynb");
        Notebook::new(cells).save(&path).unwrap();
        path
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("  csv   files "), "csv_files");
        assert_eq!(slugify("a/b\\c"), "abc");
        assert_eq!(slugify("..hidden"), "hidden");
        assert_eq!(slugify("   "), "");
    }

    #[test]
    fn test_create_nested_tree() {
        let dir = tempfile::tempdir().unwrap();
        let schema = schema(
            dir.path(),
            vec![
                Cell::markdown("# Test schema for pandas"),
                Cell::markdown("Some prose that is ignored"),
                Cell::markdown("## IO"),
                Cell::markdown("### Read"),
                Cell::markdown("* csv files\n* json files"),
                Cell::markdown("## Core\n* groupby"),
                Cell::code("print('ignored')"),
            ],
        );

        let scaffold = create_in(dir.path(), "pandas", "2.1", &schema).unwrap();
        let root = dir.path().join("pandas/2.1");
        assert_eq!(scaffold.root, root);

        let top = root.join("Test_schema_for_pandas");
        assert!(top.join("IO/Read/csv_files.ipynb").is_file());
        assert!(top.join("IO/Read/json_files.ipynb").is_file());
        assert!(top.join("Core/groupby.ipynb").is_file());
        assert!(!top.join("IO/Core").exists());
        assert_eq!(scaffold.directories.len(), 4);
        assert_eq!(scaffold.notebooks.len(), 3);
    }

    #[test]
    fn test_created_notebooks_have_assert_boundary() {
        let dir = tempfile::tempdir().unwrap();
        let schema = schema(dir.path(), vec![Cell::markdown("* only test")]);

        let scaffold = create_in(dir.path(), "fw", "0.0.0", &schema).unwrap();
        assert_eq!(scaffold.notebooks, vec![dir.path().join("fw/0.0.0/only_test.ipynb")]);

        let nb = Notebook::load(&scaffold.notebooks[0]).unwrap();
        assert_eq!(find_assert_index(&nb.cells).unwrap(), 2);
        assert_eq!(nb.cells[0].first_line().unwrap(), "# only test");
    }

    #[test]
    fn test_existing_notebooks_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let schema = schema(dir.path(), vec![Cell::markdown("* t")]);
        let target = dir.path().join("fw/1/t.ipynb");
        fs::create_dir_all(target.parent().unwrap()).unwrap();
        fs::write(&target, "precious").unwrap();

        let scaffold = create_in(dir.path(), "fw", "1", &schema).unwrap();
        assert_eq!(scaffold.kept, vec![target.clone()]);
        assert!(scaffold.notebooks.is_empty());
        assert_eq!(fs::read_to_string(&target).unwrap(), "precious");
    }

    #[test]
    fn test_schema_must_be_a_notebook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.ipynb");
        fs::write(&path, "# not json").unwrap();
        let err = create_in(dir.path(), "fw", "1", &path).unwrap_err();
        assert!(matches!(err, ScaffoldError::Notebook(NotebookError::Format { .. })));
        assert!(!dir.path().join("fw").exists());
    }

    #[test]
    fn test_untyped_schema_cell_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let schema = schema(dir.path(), vec![Cell::default()]);
        let err = create_in(dir.path(), "fw", "1", &schema).unwrap_err();
        assert!(matches!(err, ScaffoldError::Notebook(NotebookError::CellFormat { .. })));
    }
}
