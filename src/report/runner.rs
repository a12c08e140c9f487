//! Notebook test runner: load, execute, judge.

use std::path::Path;

use nb2report_notebook::Notebook;

use super::assertions::{Verdict, judge};
use super::{ReportError, ReportResult};
use crate::executor::NotebookExecutor;

/// Runs one test notebook end to end.
pub struct NotebookTestRunner<'e> {
    executor: &'e dyn NotebookExecutor,
}

impl<'e> NotebookTestRunner<'e> {
    pub fn new(executor: &'e dyn NotebookExecutor) -> Self {
        Self { executor }
    }

    /// Execute the notebook at `path` and classify its assertions.
    ///
    /// There are no retries and no partial results: any load, execution, lookup or parse failure
    /// is returned wrapped with the notebook path.
    #[tracing::instrument(skip_all, fields(path = %path.display()))]
    pub fn run(&self, path: &Path) -> ReportResult<Verdict> {
        self.run_inner(path).map_err(|err| {
            tracing::error!("Error executing notebook {}", path.display());
            ReportError::InNotebook {
                path: path.to_path_buf(),
                source: Box::new(err),
            }
        })
    }

    fn run_inner(&self, path: &Path) -> ReportResult<Verdict> {
        let mut notebook = Notebook::load(path)?;

        tracing::debug!("executing notebook");
        self.executor.execute(&mut notebook, path)?;

        let verdict = judge(&notebook.cells)?;
        tracing::debug!(%verdict, "notebook judged");
        Ok(verdict)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::Cell as Counter;

    use nb2report_notebook::Cell;

    use super::*;
    use crate::executor::ExecutionError;

    /// Leaves the stored outputs untouched and counts invocations.
    struct Passthrough {
        calls: Counter<usize>,
    }

    impl NotebookExecutor for Passthrough {
        fn execute(&self, _notebook: &mut Notebook, _path: &Path) -> Result<(), ExecutionError> {
            self.calls.set(self.calls.get() + 1);
            Ok(())
        }
    }

    /// Simulates a kernel: every code cell after the marker evaluates to "True".
    struct AllTrue;

    impl NotebookExecutor for AllTrue {
        fn execute(&self, notebook: &mut Notebook, _path: &Path) -> Result<(), ExecutionError> {
            for cell in &mut notebook.cells {
                if cell.is_code()? {
                    *cell = Cell::code(&cell.source.concat()).with_result("True");
                }
            }
            Ok(())
        }
    }

    struct Exploding;

    impl NotebookExecutor for Exploding {
        fn execute(&self, _notebook: &mut Notebook, path: &Path) -> Result<(), ExecutionError> {
            Err(ExecutionError::Timeout {
                path: path.to_path_buf(),
                timeout: std::time::Duration::from_secs(600),
            })
        }
    }

    fn write(dir: &Path, name: &str, cells: Vec<Cell>) -> std::path::PathBuf {
        let path = dir.join(name);
        Notebook::new(cells).save(&path).unwrap();
        path
    }

    #[test]
    fn test_run_uses_executed_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "t.ipynb",
            vec![Cell::markdown("# Asserts"), Cell::code("check()")],
        );
        let executor = AllTrue;
        assert_eq!(NotebookTestRunner::new(&executor).run(&path).unwrap(), Verdict::Ok);
    }

    #[test]
    fn test_run_executes_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "t.ipynb",
            vec![Cell::markdown("# Asserts"), Cell::code("x").with_result("False")],
        );
        let executor = Passthrough { calls: Counter::new(0) };
        let verdict = NotebookTestRunner::new(&executor).run(&path).unwrap();
        assert_eq!(verdict, Verdict::Ko);
        assert_eq!(executor.calls.get(), 1);
    }

    #[test]
    fn test_run_execution_error_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "t.ipynb", vec![Cell::markdown("# Asserts")]);
        let err = NotebookTestRunner::new(&Exploding).run(&path).unwrap_err();
        match err {
            ReportError::InNotebook { path: failed, source } => {
                assert_eq!(failed, path);
                assert!(matches!(*source, ReportError::Execution(ExecutionError::Timeout { .. })));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_run_missing_marker_names_notebook() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "nomarker.ipynb", vec![Cell::code("x").with_result("True")]);
        let executor = Passthrough { calls: Counter::new(0) };
        let err = NotebookTestRunner::new(&executor).run(&path).unwrap_err();
        assert!(err.to_string().contains("nomarker.ipynb"));
        assert!(matches!(err, ReportError::InNotebook { ref source, .. } if matches!(**source, ReportError::MissingAsserts)));
    }

    #[test]
    fn test_run_unparseable_notebook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ipynb");
        std::fs::write(&path, "{ not json").unwrap();
        let executor = Passthrough { calls: Counter::new(0) };
        let err = NotebookTestRunner::new(&executor).run(&path).unwrap_err();
        assert!(matches!(err, ReportError::InNotebook { ref source, .. } if matches!(**source, ReportError::Notebook(_))));
        assert_eq!(executor.calls.get(), 0);
    }
}
