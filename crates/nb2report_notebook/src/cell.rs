//! Cell classification.
//!
//! Every predicate first checks that the cell carries a `cell_type`; a cell without one is a
//! format error, never a silent `false`.

use crate::errors::{NotebookError, NotebookResult};
use crate::notebook::Cell;
use crate::{ASSERT_MARKER, CODE, FALSE_OUTPUT, MARKDOWN};

impl Cell {
    /// The cell's type tag.
    pub fn kind(&self) -> NotebookResult<&str> {
        self.cell_type
            .as_deref()
            .ok_or_else(|| NotebookError::CellFormat { cell: self.describe() })
    }

    pub fn is_markdown(&self) -> NotebookResult<bool> {
        Ok(self.kind()? == MARKDOWN)
    }

    pub fn is_code(&self) -> NotebookResult<bool> {
        Ok(self.kind()? == CODE)
    }

    /// True for a markdown cell whose source mentions `# asserts` in any casing.
    pub fn is_assert_marker(&self) -> NotebookResult<bool> {
        if !self.is_markdown()? {
            return Ok(false);
        }
        Ok(self.source.concat().to_lowercase().contains(ASSERT_MARKER))
    }

    /// True when the first source line starts with a markdown list bullet.
    pub fn is_list_item(&self) -> NotebookResult<bool> {
        self.first_line_starts_with('*')
    }

    /// True when the first source line starts with a markdown heading.
    pub fn is_title(&self) -> NotebookResult<bool> {
        self.first_line_starts_with('#')
    }

    /// The trimmed first source line.
    pub fn first_line(&self) -> NotebookResult<&str> {
        self.kind()?;
        self.source
            .first()
            .map(|line| line.trim())
            .ok_or_else(|| NotebookError::EmptySource { cell: self.describe() })
    }

    /// Number of leading `#` of a title cell, zero for anything else.
    pub fn heading_level(&self) -> NotebookResult<usize> {
        if !self.is_title()? {
            return Ok(0);
        }
        Ok(self.first_line()?.chars().take_while(|c| *c == '#').count())
    }

    /// Plain-text result of the cell.
    ///
    /// For a code cell this is the `text/plain` payload of its first output. Missing outputs or a
    /// missing payload count as a negative assertion and yield `"False"`.
    pub fn output(&self) -> NotebookResult<String> {
        if !self.is_code()? {
            return Ok(FALSE_OUTPUT.to_string());
        }
        let text = self
            .outputs
            .as_deref()
            .and_then(|outputs| outputs.first())
            .and_then(|first| first.payload("text/plain"));
        Ok(text.unwrap_or_else(|| FALSE_OUTPUT.to_string()))
    }

    fn first_line_starts_with(&self, token: char) -> NotebookResult<bool> {
        self.kind()?;
        Ok(self
            .source
            .first()
            .is_some_and(|line| line.trim().starts_with(token)))
    }
}
