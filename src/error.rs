use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while constructing a Table from parsed data.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("row {row} has {found} cells but the table has {expected} columns")]
    MalformedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Errors raised while loading a source file into a Table.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Rejected before any parser runs.
    #[error("unsupported file format: {extension:?} (expected .csv, .json or .jsonl)")]
    UnsupportedFormat { extension: String },

    /// Unreadable file, malformed syntax, empty input. The message is
    /// surfaced to the user verbatim.
    #[error("{0}")]
    Parse(String),

    #[error(transparent)]
    Table(#[from] TableError),
}

/// Errors raised while writing an export to its destination.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize export: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors raised by session command handlers. All of these are terminal for
/// the triggering operation only; the active Table/View stays usable.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no table loaded")]
    NoTable,

    #[error("column index {0} is out of bounds")]
    ColumnOutOfBounds(usize),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Export(#[from] ExportError),
}
