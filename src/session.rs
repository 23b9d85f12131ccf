use std::io;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::data::exporter::Exporter;
use crate::data::loaders;
use crate::data::view::{SortState, TableView};
use crate::error::{ExportError, LoadError, SessionError};

/// Explicit session context owning the one active Table/View pair.
///
/// Each command handler replaces state wholesale; a failed operation leaves
/// the previous table and view untouched and usable. Parsing and export run
/// on the blocking pool so a caller's executor stays responsive while they
/// are outstanding.
pub struct Session {
    config: Config,
    view: Option<TableView>,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self { config, view: None }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn view(&self) -> Option<&TableView> {
        self.view.as_ref()
    }

    /// Parse a file and make it the active table. The previous Table/View is
    /// discarded only once the new one is ready (last-load-wins); filter and
    /// sort reset with the new table.
    pub async fn load(&mut self, path: impl AsRef<Path>) -> Result<&TableView, SessionError> {
        let path = path.as_ref().to_path_buf();
        let table = tokio::task::spawn_blocking(move || loaders::load_table(&path))
            .await
            .map_err(|e| LoadError::Parse(format!("load task failed: {}", e)))??;

        info!(
            target: "session",
            "loaded {} ({}, {} rows, {} columns)",
            table.file_name(),
            table.file_type(),
            table.row_count(),
            table.column_count()
        );
        Ok(self.view.insert(TableView::new(Arc::new(table))))
    }

    /// Replace the filter term; the active sort is re-applied to the new row
    /// set. Returns the filtered row count for display.
    pub fn filter_change(&mut self, term: &str) -> Result<usize, SessionError> {
        let view = self.view.as_mut().ok_or(SessionError::NoTable)?;
        view.set_filter(term);
        Ok(view.row_count())
    }

    /// Toggle or select the sort column.
    pub fn sort_click(&mut self, column: usize) -> Result<SortState, SessionError> {
        let view = self.view.as_mut().ok_or(SessionError::NoTable)?;
        view.sort_on(column)
            .ok_or(SessionError::ColumnOutOfBounds(column))
    }

    pub fn clear_sort(&mut self) -> Result<(), SessionError> {
        let view = self.view.as_mut().ok_or(SessionError::NoTable)?;
        view.clear_sort();
        Ok(())
    }

    /// Serialize the current view (filtered and sorted) to CSV on disk.
    pub async fn export_csv(&self, path: impl AsRef<Path>) -> Result<String, SessionError> {
        let view = self.view.as_ref().ok_or(SessionError::NoTable)?;
        let headers = view.headers().to_vec();
        let rows = view.rows();
        let path = path.as_ref().to_path_buf();
        let task_path = path.clone();

        let message = tokio::task::spawn_blocking(move || {
            Exporter::export_csv(&task_path, &headers, &rows)
        })
        .await
        .map_err(|e| join_error(path, e))??;
        Ok(message)
    }

    /// Serialize the current view (filtered and sorted) to JSON on disk.
    pub async fn export_json(&self, path: impl AsRef<Path>) -> Result<String, SessionError> {
        let view = self.view.as_ref().ok_or(SessionError::NoTable)?;
        let headers = view.headers().to_vec();
        let rows = view.rows();
        let path = path.as_ref().to_path_buf();
        let task_path = path.clone();
        let pretty = self.config.export.pretty_json;

        let message = tokio::task::spawn_blocking(move || {
            Exporter::export_json(&task_path, &headers, &rows, pretty)
        })
        .await
        .map_err(|e| join_error(path, e))??;
        Ok(message)
    }
}

fn join_error(path: std::path::PathBuf, e: tokio::task::JoinError) -> ExportError {
    ExportError::Io {
        path,
        source: io::Error::new(io::ErrorKind::Other, e.to_string()),
    }
}
