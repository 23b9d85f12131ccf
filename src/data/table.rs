use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::TableError;

/// Source format of a loaded table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Csv,
    Json,
    Jsonl,
}

impl FileType {
    /// Map a file extension (without the dot, any case) to a format.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(FileType::Csv),
            "json" => Some(FileType::Json),
            "jsonl" => Some(FileType::Jsonl),
            _ => None,
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileType::Csv => "csv",
            FileType::Json => "json",
            FileType::Jsonl => "jsonl",
        };
        write!(f, "{}", name)
    }
}

/// Canonical in-memory representation of a parsed document.
///
/// Cells are always strings; numeric coercion happens transiently in the
/// sort comparator and is never stored back. Headers and provenance are
/// fixed for the life of the table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    file_name: String,
    file_type: FileType,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Build a table, validating that every row matches the header width.
    /// A mismatched row fails fast naming its index; rows are never padded
    /// or truncated.
    pub fn new(
        file_name: impl Into<String>,
        file_type: FileType,
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    ) -> Result<Self, TableError> {
        let expected = headers.len();
        for (idx, row) in rows.iter().enumerate() {
            if row.len() != expected {
                return Err(TableError::MalformedRow {
                    row: idx,
                    expected,
                    found: row.len(),
                });
            }
        }

        Ok(Self {
            file_name: file_name.into(),
            file_type,
            headers,
            rows,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Always derived from the row storage, never independently settable.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get a cell by row and column index.
    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col).map(|s| s.as_str())
    }
}
