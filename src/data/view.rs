use std::sync::Arc;
use tracing::debug;

use crate::data::compare;
use crate::data::table::Table;

/// The active sort column and direction. Reset when a new table is loaded,
/// kept across filter changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub column: usize,
    pub ascending: bool,
}

/// A disposable projection of a Table: the active filter term, the active
/// sort, and the derived list of visible row indices.
///
/// The view never mutates its source. Every filter or sort change recomputes
/// the row set wholesale: filtering always restarts from the full table in
/// source order, then the active sort (if any) is re-applied to the filtered
/// set.
#[derive(Debug, Clone)]
pub struct TableView {
    source: Arc<Table>,
    filter: String,
    sort: Option<SortState>,
    visible_rows: Vec<usize>,
}

impl TableView {
    /// Identity view over a freshly loaded table.
    pub fn new(source: Arc<Table>) -> Self {
        let visible_rows = (0..source.row_count()).collect();
        Self {
            source,
            filter: String::new(),
            sort: None,
            visible_rows,
        }
    }

    pub fn source(&self) -> &Table {
        &self.source
    }

    pub fn headers(&self) -> &[String] {
        self.source.headers()
    }

    pub fn filter_term(&self) -> &str {
        &self.filter
    }

    pub fn sort_state(&self) -> Option<SortState> {
        self.sort
    }

    /// Number of rows after filtering. This is what a caller displays.
    pub fn row_count(&self) -> usize {
        self.visible_rows.len()
    }

    /// Row indices into the source table, in view order.
    pub fn visible_row_indices(&self) -> &[usize] {
        &self.visible_rows
    }

    /// Materialize the visible rows in view order, for rendering or export.
    pub fn rows(&self) -> Vec<Vec<String>> {
        let source_rows = self.source.rows();
        self.visible_rows
            .iter()
            .map(|&idx| source_rows[idx].clone())
            .collect()
    }

    /// Replace the filter term and recompute the view. An empty or
    /// whitespace-only term is the identity filter. The active sort is
    /// re-applied to the new row set.
    pub fn set_filter(&mut self, term: &str) {
        self.filter = term.to_string();
        self.update_visible_rows();
        debug!(
            target: "view",
            "filter {:?}: {} of {} rows visible",
            self.filter,
            self.visible_rows.len(),
            self.source.row_count()
        );
    }

    /// Toggle rule: clicking the sorted column flips its direction, a
    /// different column selects it with direction reset to ascending.
    /// Returns the new sort state, or None when the index is out of bounds.
    pub fn sort_on(&mut self, column: usize) -> Option<SortState> {
        if column >= self.source.column_count() {
            return None;
        }

        let ascending = match self.sort {
            Some(current) if current.column == column => !current.ascending,
            _ => true,
        };
        self.sort = Some(SortState { column, ascending });
        self.update_visible_rows();
        debug!(target: "view", "sort on column {} ascending={}", column, ascending);
        self.sort
    }

    /// Drop the sort; rows return to filtered source order.
    pub fn clear_sort(&mut self) {
        self.sort = None;
        self.update_visible_rows();
    }

    fn update_visible_rows(&mut self) {
        // Filtering always recomputes from the unfiltered table, keeping
        // source order.
        let term = self.filter.to_lowercase();
        let identity = term.trim().is_empty();
        let mut visible: Vec<usize> = (0..self.source.row_count())
            .filter(|&idx| identity || self.row_matches(idx, &term))
            .collect();

        // The sort applies to the filtered set. Vec::sort_by is stable, so
        // equal keys keep their relative source order.
        if let Some(sort) = self.sort {
            let source = &self.source;
            let numeric = compare::column_is_numeric(
                visible
                    .iter()
                    .map(|&idx| source.get(idx, sort.column).unwrap_or("")),
            );
            visible.sort_by(|&a, &b| {
                let cell_a = source.get(a, sort.column).unwrap_or("");
                let cell_b = source.get(b, sort.column).unwrap_or("");
                let ord = compare::compare_cells(cell_a, cell_b, numeric);
                if sort.ascending {
                    ord
                } else {
                    ord.reverse()
                }
            });
        }

        self.visible_rows = visible;
    }

    fn row_matches(&self, row_idx: usize, term: &str) -> bool {
        (0..self.source.column_count()).any(|col| {
            self.source
                .get(row_idx, col)
                .map(|cell| cell.to_lowercase().contains(term))
                .unwrap_or(false)
        })
    }
}
