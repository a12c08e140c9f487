//! Report generation configuration

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Name of the summary document written next to the scaffold.
pub const REPORT_FILE_NAME: &str = "summary.html";
/// Per-notebook execution timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);
/// Environment variable overriding the Jupyter command.
pub const JUPYTER_ENV: &str = "NB2REPORT_JUPYTER";
/// CSS colors by depth. Notebooks always use the last one.
pub const REPORT_COLORS: [&str; 5] = ["Teal", "DarkCyan", "LightSeaGreen", "DarkSeaGreen", "MediumAquamarine"];

/// Report configuration
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// File name of the summary, created inside `<name>/<version>/`
    pub report_file_name: String,
    /// Wall-clock limit for executing one notebook
    pub timeout: Duration,
    /// Command used to run `nbconvert`
    pub jupyter: String,
    /// Custom HTML template; the embedded one is used when unset
    pub template: Option<PathBuf>,
    /// Depth colors of the summary rows
    pub palette: Vec<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            report_file_name: REPORT_FILE_NAME.to_string(),
            timeout: DEFAULT_TIMEOUT,
            jupyter: "jupyter".to_string(),
            template: None,
            palette: REPORT_COLORS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl ReportConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults, with the Jupyter command taken from `NB2REPORT_JUPYTER` when set
    pub fn from_env() -> Self {
        let config = Self::default();
        match env::var(JUPYTER_ENV) {
            Ok(cmd) if !cmd.trim().is_empty() => config.with_jupyter(cmd.trim()),
            _ => config,
        }
    }

    pub fn with_report_file_name(mut self, name: impl Into<String>) -> Self {
        self.report_file_name = name.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_jupyter(mut self, jupyter: impl Into<String>) -> Self {
        self.jupyter = jupyter.into();
        self
    }

    pub fn with_template(mut self, template: impl Into<PathBuf>) -> Self {
        self.template = Some(template.into());
        self
    }

    /// Color for a directory at `depth`, clamped to the last palette entry.
    pub fn color_for_depth(&self, depth: usize) -> &str {
        let last = self.palette.len().saturating_sub(1);
        self.palette.get(depth.min(last)).map(String::as_str).unwrap_or("Black")
    }

    /// Color for notebook rows.
    pub fn leaf_color(&self) -> &str {
        self.palette.last().map(String::as_str).unwrap_or("Black")
    }
}
