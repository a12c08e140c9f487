#![forbid(unsafe_code)]
//! Notebook document model for nb2report
//!
//! This crate owns everything nb2report knows about the Jupyter notebook format:
//!
//! - [`Notebook`], [`Cell`] and [`CellOutput`]: an nbformat v4 document, loaded with serde
//! - the cell classifier (`is_markdown`, `is_code`, `is_assert_marker`, `is_title`, ...)
//! - [`NotebookError`]: format and I/O failures
//!
//! Executing notebooks and judging their results live in the `nb2report` crate.

pub mod cell;
pub mod errors;
pub mod notebook;

pub use errors::{NotebookError, NotebookResult};
pub use notebook::{Cell, CellOutput, Notebook, split_lines};

/// Type tag of markdown cells.
pub const MARKDOWN: &str = "markdown";
/// Type tag of code cells.
pub const CODE: &str = "code";
/// Lower-case token marking the start of the assertion cells.
pub const ASSERT_MARKER: &str = "# asserts";
/// Output text assumed for cells that produced nothing.
pub const FALSE_OUTPUT: &str = "False";
/// File extension of notebooks.
pub const NOTEBOOK_EXTENSION: &str = "ipynb";
