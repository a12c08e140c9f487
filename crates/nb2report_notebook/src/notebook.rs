//! nbformat v4 document model and loader.
//!
//! Only the parts of the format the report pipeline reads are typed: cell type, source lines and
//! output MIME bundles. Every other key is carried in an `extra` map so a notebook survives a
//! load/save round trip through the executor untouched.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{NotebookError, NotebookResult};

/// The only major nbformat version the loader accepts.
pub const NBFORMAT_MAJOR: u32 = 4;
/// Minor version written into newly created notebooks.
pub const NBFORMAT_MINOR: u32 = 5;

/// A notebook document: ordered cells plus format metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notebook {
    pub cells: Vec<Cell>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    pub nbformat: u32,
    #[serde(default)]
    pub nbformat_minor: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One cell of a notebook.
///
/// `cell_type` is optional at the type level so that malformed cells still load; the classifier
/// reports them as format errors when they are inspected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell_type: Option<String>,
    #[serde(default, with = "multiline")]
    pub source: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Vec<CellOutput>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One captured output record of a code cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CellOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_type: Option<String>,
    /// MIME type -> payload. Absent for `stream` and `error` outputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Notebook {
    /// Create an empty v4 notebook.
    pub fn new(cells: Vec<Cell>) -> Self {
        Self {
            cells,
            metadata: Map::new(),
            nbformat: NBFORMAT_MAJOR,
            nbformat_minor: NBFORMAT_MINOR,
            extra: Map::new(),
        }
    }

    /// Read and parse the notebook stored at `path`.
    #[tracing::instrument(skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> NotebookResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| NotebookError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let notebook = Self::parse(&content, &path.display().to_string())?;
        tracing::debug!(cells = notebook.cells.len(), "notebook loaded");
        Ok(notebook)
    }

    /// Parse a notebook from its JSON text. `origin` names the document in error messages.
    pub fn parse(content: &str, origin: &str) -> NotebookResult<Self> {
        let notebook: Notebook = serde_json::from_str(content).map_err(|reason| NotebookError::Format {
            origin: origin.to_string(),
            reason,
        })?;

        if notebook.nbformat != NBFORMAT_MAJOR {
            return Err(NotebookError::UnsupportedVersion {
                origin: origin.to_string(),
                found: notebook.nbformat,
            });
        }

        Ok(notebook)
    }

    /// Serialize the notebook the way Jupyter writes it (one-space indent, trailing newline).
    pub fn to_json(&self) -> String {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b" ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        // Serializing plain maps and strings into a Vec cannot fail.
        let _ = self.serialize(&mut ser);
        let mut out = String::from_utf8_lossy(&buf).into_owned();
        out.push('\n');
        out
    }

    /// Write the notebook to `path`, replacing any existing file.
    pub fn save(&self, path: &Path) -> NotebookResult<()> {
        fs::write(path, self.to_json()).map_err(|source| NotebookError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl Cell {
    /// Create a markdown cell from source text.
    pub fn markdown(source: &str) -> Self {
        let mut extra = Map::new();
        extra.insert("metadata".to_string(), Value::Object(Map::new()));
        Self {
            cell_type: Some(crate::MARKDOWN.to_string()),
            source: split_lines(source),
            outputs: None,
            extra,
        }
    }

    /// Create a code cell from source text, with no outputs yet.
    pub fn code(source: &str) -> Self {
        let mut extra = Map::new();
        extra.insert("metadata".to_string(), Value::Object(Map::new()));
        extra.insert("execution_count".to_string(), Value::Null);
        Self {
            cell_type: Some(crate::CODE.to_string()),
            source: split_lines(source),
            outputs: Some(Vec::new()),
            extra,
        }
    }

    /// Append an `execute_result` output whose `text/plain` payload is `text`.
    pub fn with_result(mut self, text: &str) -> Self {
        self.outputs.get_or_insert_with(Vec::new).push(CellOutput::execute_result(text));
        self
    }

    /// Compact rendering used to identify a cell in error messages.
    pub fn describe(&self) -> String {
        const MAX: usize = 120;
        let json = serde_json::to_string(self).unwrap_or_default();
        if json.chars().count() > MAX {
            let cut: String = json.chars().take(MAX).collect();
            format!("{cut}...")
        } else {
            json
        }
    }
}

impl CellOutput {
    /// An `execute_result` record carrying a single `text/plain` payload.
    pub fn execute_result(text: &str) -> Self {
        let mut data = Map::new();
        data.insert("text/plain".to_string(), Value::String(text.to_string()));
        let mut extra = Map::new();
        extra.insert("metadata".to_string(), Value::Object(Map::new()));
        extra.insert("execution_count".to_string(), Value::Null);
        Self {
            output_type: Some("execute_result".to_string()),
            data: Some(data),
            extra,
        }
    }

    /// Payload stored under `mime`, joined if it was written as a list of lines.
    pub fn payload(&self, mime: &str) -> Option<String> {
        match self.data.as_ref()?.get(mime)? {
            Value::String(s) => Some(s.clone()),
            Value::Array(parts) => Some(parts.iter().filter_map(Value::as_str).collect()),
            _ => None,
        }
    }
}

/// Split text into lines, keeping the line terminators as nbformat does.
pub fn split_lines(text: &str) -> Vec<String> {
    text.split_inclusive('\n').map(str::to_string).collect()
}

/// nbformat allows multiline strings to be stored either as one string or as a list of lines.
mod multiline {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        One(String),
        Many(Vec<String>),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
        Ok(match Repr::deserialize(deserializer)? {
            Repr::One(text) => super::split_lines(&text),
            Repr::Many(lines) => lines,
        })
    }

    pub fn serialize<S: Serializer>(lines: &[String], serializer: S) -> Result<S::Ok, S::Error> {
        lines.serialize(serializer)
    }
}
