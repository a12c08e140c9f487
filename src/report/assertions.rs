//! Judging the assertion section of an executed notebook.
//!
//! Cells after the `# Asserts` marker are assertions: each code cell must evaluate to `True`.

use std::fmt;

use nb2report_notebook::Cell;

use super::{ReportError, ReportResult};

/// Pass/fail classification of one notebook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Ok,
    Ko,
}

impl Verdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Ok => "OK",
            Verdict::Ko => "KO",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Index of the first markdown cell carrying the asserts marker.
pub fn find_assert_index(cells: &[Cell]) -> ReportResult<usize> {
    for (index, cell) in cells.iter().enumerate() {
        if cell.is_markdown()? && cell.is_assert_marker()? {
            return Ok(index);
        }
    }
    Err(ReportError::MissingAsserts)
}

/// Coerce an assertion output to a boolean.
///
/// The text is trimmed, lower-cased and capitalized; the result must then be exactly `True` or
/// `False`. Anything else is an error, never a silent `false`.
pub fn evaluate_output(output: &str) -> ReportResult<bool> {
    tracing::debug!(output, "evaluating output");
    match capitalize(&output.trim().to_lowercase()).as_str() {
        "True" => Ok(true),
        "False" => Ok(false),
        _ => {
            let err = ReportError::NotBoolean {
                text: output.to_string(),
                len: output.chars().count(),
            };
            tracing::error!("{err}. Please check all assert cells return True or False");
            Err(err)
        }
    }
}

/// OK iff there is at least one result and every result is true.
pub fn aggregate(results: &[bool]) -> Verdict {
    if !results.is_empty() && results.iter().all(|r| *r) {
        Verdict::Ok
    } else {
        Verdict::Ko
    }
}

/// Evaluate every code cell after the marker and aggregate them.
pub fn judge(cells: &[Cell]) -> ReportResult<Verdict> {
    let start = find_assert_index(cells)?;
    tracing::debug!(index = start, "assert cell found");

    let mut results = Vec::new();
    for cell in &cells[start + 1..] {
        if cell.is_code()? {
            results.push(evaluate_output(&cell.output()?)?);
        }
    }
    Ok(aggregate(&results))
}

/// Upper-case the first character, leaving the rest as given.
fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn assert_section(outputs: &[&str]) -> Vec<Cell> {
        let mut cells = vec![
            Cell::markdown("# setup"),
            Cell::code("import os").with_result("<module 'os'>"),
            Cell::markdown("# Asserts"),
        ];
        cells.extend(outputs.iter().map(|o| Cell::code("check()").with_result(o)));
        cells
    }

    #[test]
    fn test_evaluate_canonical_forms() {
        assert!(evaluate_output("True").unwrap());
        assert!(evaluate_output(" true ").unwrap());
        assert!(evaluate_output("TRUE\n").unwrap());
        assert!(!evaluate_output("FALSE").unwrap());
        assert!(!evaluate_output("false").unwrap());
    }

    #[test]
    fn test_evaluate_rejects_non_boolean() {
        for bad in ["1", "0", "", "yes", "Truee", "'True'", "None"] {
            assert!(
                matches!(evaluate_output(bad), Err(ReportError::NotBoolean { .. })),
                "{bad:?} should not evaluate"
            );
        }
    }

    #[test]
    fn test_parse_error_reports_text_and_length() {
        let err = evaluate_output(" 42 ").unwrap_err();
        match &err {
            ReportError::NotBoolean { text, len } => {
                assert_eq!(text, " 42 ");
                assert_eq!(*len, 4);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("' 42 '"));
        assert!(err.to_string().contains("length: 4"));
    }

    #[test]
    fn test_aggregate() {
        assert_eq!(aggregate(&[]), Verdict::Ko);
        assert_eq!(aggregate(&[true]), Verdict::Ok);
        assert_eq!(aggregate(&[true, false]), Verdict::Ko);
        assert_eq!(aggregate(&[true, true, true]), Verdict::Ok);
        assert_eq!(aggregate(&[false]), Verdict::Ko);
    }

    #[test]
    fn test_verdict_display() {
        assert_eq!(Verdict::Ok.to_string(), "OK");
        assert_eq!(Verdict::Ko.to_string(), "KO");
    }

    #[test]
    fn test_find_assert_index() {
        let cells = assert_section(&["True"]);
        assert_eq!(find_assert_index(&cells).unwrap(), 2);
    }

    #[test]
    fn test_find_assert_index_takes_first_marker() {
        let cells = vec![
            Cell::code("# asserts"),
            Cell::markdown("intro"),
            Cell::markdown("# ASSERTS"),
            Cell::markdown("# Asserts again"),
        ];
        assert_eq!(find_assert_index(&cells).unwrap(), 2);
    }

    #[test]
    fn test_find_assert_index_missing() {
        let cells = vec![Cell::markdown("# setup"), Cell::code("# asserts")];
        assert!(matches!(find_assert_index(&cells), Err(ReportError::MissingAsserts)));
        assert!(matches!(find_assert_index(&[]), Err(ReportError::MissingAsserts)));
    }

    #[test]
    fn test_find_assert_index_untyped_cell_is_format_error() {
        let cells = vec![Cell::default(), Cell::markdown("# Asserts")];
        assert!(matches!(find_assert_index(&cells), Err(ReportError::Notebook(_))));
    }

    #[test]
    fn test_judge_all_true() {
        assert_eq!(judge(&assert_section(&["True", "True"])).unwrap(), Verdict::Ok);
    }

    #[test]
    fn test_judge_one_false() {
        assert_eq!(judge(&assert_section(&["True", "False"])).unwrap(), Verdict::Ko);
    }

    #[test]
    fn test_judge_no_assertions_is_ko() {
        assert_eq!(judge(&assert_section(&[])).unwrap(), Verdict::Ko);
    }

    #[test]
    fn test_judge_ignores_markdown_after_marker() {
        let mut cells = assert_section(&["True"]);
        cells.push(Cell::markdown("Notes: this is not an assertion"));
        assert_eq!(judge(&cells).unwrap(), Verdict::Ok);
    }

    #[test]
    fn test_judge_missing_output_counts_as_false() {
        let mut cells = assert_section(&["True"]);
        cells.push(Cell::code("print('no result')"));
        assert_eq!(judge(&cells).unwrap(), Verdict::Ko);
    }

    #[test]
    fn test_judge_propagates_parse_error() {
        let cells = assert_section(&["True", "3"]);
        assert!(matches!(judge(&cells), Err(ReportError::NotBoolean { .. })));
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("true"), "True");
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("ß"), "SS");
    }
}
