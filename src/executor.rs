//! Notebook execution boundary
//!
//! The report pipeline never talks to a kernel itself. It hands a loaded notebook to a
//! [`NotebookExecutor`], which runs every code cell in order and fills in the outputs. The default
//! [`NbconvertExecutor`] drives `jupyter nbconvert --execute` as a child process; tests substitute
//! an in-process fake.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use miette::Diagnostic;
use nb2report_notebook::{Notebook, NotebookError};
use thiserror::Error;

use crate::config::ReportConfig;

/// How often a running child is polled for completion.
const POLL_INTERVAL: Duration = Duration::from_millis(50);
/// Lines of kernel stderr kept in an execution error.
const STDERR_TAIL_LINES: usize = 20;

/// Errors raised while executing a notebook
#[derive(Debug, Error, Diagnostic)]
pub enum ExecutionError {
    #[error("failed to start `{command}`")]
    #[diagnostic(
        code(nb2report::execute::spawn),
        help("install Jupyter (`pip install nbconvert ipykernel`) or point NB2REPORT_JUPYTER at it")
    )]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("execution of '{}' did not finish within {}s", path.display(), timeout.as_secs())]
    #[diagnostic(code(nb2report::execute::timeout))]
    Timeout { path: PathBuf, timeout: Duration },

    #[error("execution of '{}' failed ({status})\n{stderr}", path.display())]
    #[diagnostic(code(nb2report::execute::cell))]
    Failed {
        path: PathBuf,
        status: ExitStatus,
        stderr: String,
    },

    #[error("cell {index} of '{}' raised {ename}: {evalue}", path.display())]
    #[diagnostic(code(nb2report::execute::cell))]
    CellError {
        path: PathBuf,
        index: usize,
        ename: String,
        evalue: String,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Notebook(#[from] NotebookError),

    #[error("I/O error while executing notebook: {0}")]
    #[diagnostic(code(nb2report::execute::io))]
    Io(#[from] std::io::Error),
}

/// Execute all code cells of a notebook in order, storing their outputs in place.
///
/// Implementations must fail rather than return a partially executed notebook.
pub trait NotebookExecutor {
    /// Execute `notebook`, which was loaded from `path`.
    fn execute(&self, notebook: &mut Notebook, path: &Path) -> Result<(), ExecutionError>;
}

/// `jupyter nbconvert --execute` with a wall-clock deadline.
///
/// The in-memory notebook is written to a scratch directory and fed to nbconvert on stdin, so the
/// kernel starts in the executor's working directory rather than next to the notebook file.
#[derive(Debug, Clone)]
pub struct NbconvertExecutor {
    jupyter: String,
    timeout: Duration,
    working_dir: Option<PathBuf>,
}

impl NbconvertExecutor {
    pub fn new(jupyter: impl Into<String>, timeout: Duration) -> Self {
        Self {
            jupyter: jupyter.into(),
            timeout,
            working_dir: None,
        }
    }

    pub fn from_config(config: &ReportConfig) -> Self {
        Self::new(config.jupyter.clone(), config.timeout)
    }

    /// Start kernels in `dir`. Without one they inherit the current directory.
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}

impl NotebookExecutor for NbconvertExecutor {
    #[tracing::instrument(skip_all, fields(path = %path.display()))]
    fn execute(&self, notebook: &mut Notebook, path: &Path) -> Result<(), ExecutionError> {
        let scratch = tempfile::Builder::new().prefix("nb2report-").tempdir()?;
        let input = scratch.path().join("input.ipynb");
        notebook.save(&input)?;
        let stderr_path = scratch.path().join("nbconvert.log");
        let stderr_file = File::create(&stderr_path)?;

        let mut command = Command::new(&self.jupyter);
        command
            .arg("nbconvert")
            .arg("--stdin")
            .arg("--to")
            .arg("notebook")
            .arg("--execute")
            .arg(format!("--ExecutePreprocessor.timeout={}", self.timeout.as_secs()))
            .arg("--output-dir")
            .arg(scratch.path())
            .arg("--output")
            .arg("executed")
            .stdin(Stdio::from(File::open(&input)?))
            .stdout(Stdio::null())
            .stderr(Stdio::from(stderr_file));
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }
        tracing::debug!(jupyter = %self.jupyter, "starting nbconvert");

        let child = command.spawn().map_err(|source| ExecutionError::Spawn {
            command: self.jupyter.clone(),
            source,
        })?;

        let Some(status) = wait_with_deadline(child, self.timeout)? else {
            return Err(ExecutionError::Timeout {
                path: path.to_path_buf(),
                timeout: self.timeout,
            });
        };

        if !status.success() {
            let log = fs::read_to_string(&stderr_path).unwrap_or_default();
            return Err(ExecutionError::Failed {
                path: path.to_path_buf(),
                status,
                stderr: tail(&log, STDERR_TAIL_LINES),
            });
        }

        *notebook = Notebook::load(&scratch.path().join("executed.ipynb"))?;
        check_cell_errors(notebook, path)
    }
}

/// Fail on the first `error` output left in an executed notebook.
///
/// nbconvert already aborts on cell errors unless told otherwise; this catches kernels or
/// configurations that record the error and carry on.
pub fn check_cell_errors(notebook: &Notebook, path: &Path) -> Result<(), ExecutionError> {
    for (index, cell) in notebook.cells.iter().enumerate() {
        let Some(outputs) = cell.outputs.as_deref() else { continue };
        for output in outputs {
            if output.output_type.as_deref() == Some("error") {
                let field = |key: &str| {
                    output
                        .extra
                        .get(key)
                        .and_then(|v| v.as_str())
                        .unwrap_or_default()
                        .to_string()
                };
                return Err(ExecutionError::CellError {
                    path: path.to_path_buf(),
                    index,
                    ename: field("ename"),
                    evalue: field("evalue"),
                });
            }
        }
    }
    Ok(())
}

/// Wait for `child` until `timeout` elapses. Returns `None` (after killing it) on expiry.
fn wait_with_deadline(mut child: Child, timeout: Duration) -> std::io::Result<Option<ExitStatus>> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn tail(text: &str, lines: usize) -> String {
    let all: Vec<&str> = text.lines().collect();
    let start = all.len().saturating_sub(lines);
    all[start..].join("\n")
}
