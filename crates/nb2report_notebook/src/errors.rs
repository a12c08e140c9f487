//! Errors raised while loading notebooks and classifying their cells.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Error raised by the notebook model.
#[derive(Debug, Error, Diagnostic)]
pub enum NotebookError {
    /// A value presented as a cell has no `cell_type` tag.
    #[error("wrong cell format, missing `cell_type`: {cell}")]
    #[diagnostic(
        code(nb2report::notebook::cell_format),
        help("a notebook cell needs at least a `cell_type` string and a `source` list")
    )]
    CellFormat { cell: String },

    /// The first line of a cell was requested but the cell has no source.
    #[error("cell source is empty: {cell}")]
    #[diagnostic(code(nb2report::notebook::empty_source))]
    EmptySource { cell: String },

    /// The document is not JSON or does not have the shape of a notebook.
    #[error("{origin} is not a notebook document")]
    #[diagnostic(code(nb2report::notebook::format))]
    Format {
        origin: String,
        #[source]
        reason: serde_json::Error,
    },

    #[error("{origin} uses nbformat {found}, only version 4 is supported")]
    #[diagnostic(
        code(nb2report::notebook::version),
        help("upgrade the notebook with `jupyter nbconvert --to notebook --inplace`")
    )]
    UnsupportedVersion { origin: String, found: u32 },

    #[error("cannot access notebook file '{}'", path.display())]
    #[diagnostic(code(nb2report::notebook::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type NotebookResult<T> = Result<T, NotebookError>;
