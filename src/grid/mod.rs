//! The view-state engine: records plus the filter/sort/selection/page
//! state, reduced to one display-ready page at a time. Everything here is
//! presentation-agnostic; the terminal layer only consumes `PageView`s.

pub mod column;
pub mod derive;
pub mod filter;
pub mod page;
pub mod record;
pub mod select;
pub mod sort;

use std::time::Instant;

use tracing::trace;

pub use column::{Align, ColumnDescriptor, ColumnSet, FilterKind, Pin};
pub use derive::{Derivation, DisplayValue};
pub use filter::{ColumnPredicate, FilterState};
pub use page::{PageSlice, PageState};
pub use record::{Record, RecordStore, Value};
pub use select::Selection;
pub use sort::{SortKey, SortState};

use crate::domain::DGError;

/// One rendered cell: the resolved display value plus the flags the
/// presentation layer styles by.
#[derive(Debug, Clone, PartialEq)]
pub struct CellView {
    pub value: DisplayValue,
    pub editable: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowView {
    pub id: i64,
    pub selected: bool,
    pub cells: Vec<CellView>,
}

/// The fully resolved current page, plus the counts the status line
/// shows.
#[derive(Debug, Clone, PartialEq)]
pub struct PageView {
    pub rows: Vec<RowView>,
    pub page: usize,
    pub total_pages: usize,
    pub visible_rows: usize,
    pub total_rows: usize,
}

/// Owns the record store and every piece of view state. All mutations go
/// through here so the visible row mapping is never stale.
#[derive(Debug)]
pub struct Grid {
    store: RecordStore,
    columns: ColumnSet,
    filter: FilterState,
    sort: SortState,
    selection: Selection,
    page: PageState,
    // Store indices of the visible rows, filtered and sorted.
    view_rows: Vec<usize>,
}

impl Grid {
    pub fn new(
        columns: Vec<ColumnDescriptor>,
        records: Vec<Record>,
        page_size: usize,
    ) -> Result<Self, DGError> {
        let columns = ColumnSet::new(columns)?;
        let mut store = RecordStore::new();
        store.load(records);
        let mut grid = Grid {
            store,
            columns,
            filter: FilterState::default(),
            sort: SortState::default(),
            selection: Selection::default(),
            page: PageState::new(page_size),
            view_rows: Vec::new(),
        };
        grid.refresh();
        Ok(grid)
    }

    /// Recompute the visible row mapping from the current filter and sort
    /// state. The pipeline is pure, so re-running it on unchanged state
    /// reproduces the same mapping.
    fn refresh(&mut self) {
        let start = Instant::now();
        let filtered = filter::apply(self.store.all(), &self.filter, &self.columns);
        self.view_rows = sort::apply(self.store.all(), filtered, &self.sort, &self.columns);
        self.clamp_page();
        trace!(
            "View refresh: {} of {} rows visible, took {}µs",
            self.view_rows.len(),
            self.store.len(),
            start.elapsed().as_micros()
        );
    }

    fn clamp_page(&mut self) {
        let slice = page::slice(self.view_rows.len(), &self.page);
        self.page.set_page(slice.page);
    }

    // ------------------------------ filtering ------------------------------

    pub fn set_query(&mut self, query: &str) {
        self.filter.set_query(query);
        self.refresh();
    }

    pub fn query(&self) -> &str {
        self.filter.query()
    }

    /// Install, replace or (with empty input) clear one column's filter.
    /// Rejected input leaves the previous filter state fully intact.
    pub fn set_column_filter(&mut self, key: &str, input: &str) -> Result<(), DGError> {
        let Some(column) = self.columns.by_key(key) else {
            return Err(DGError::InvalidFilterPredicate(format!(
                "unknown column \"{key}\""
            )));
        };
        let predicate = ColumnPredicate::parse(column.filter, input)?;
        self.filter.set_column(key, predicate);
        self.refresh();
        Ok(())
    }

    pub fn clear_filters(&mut self) {
        self.filter.clear();
        self.refresh();
    }

    pub fn filter_state(&self) -> &FilterState {
        &self.filter
    }

    // ------------------------------- sorting -------------------------------

    /// Cycle a column's sort key. Columns not marked sortable ignore the
    /// gesture.
    pub fn toggle_sort(&mut self, key: &str, additive: bool) {
        match self.columns.by_key(key) {
            Some(column) if column.sortable => {
                self.sort.toggle(key, additive);
                self.refresh();
            }
            _ => {}
        }
    }

    pub fn sort_state(&self) -> &SortState {
        &self.sort
    }

    // ------------------------------- paging --------------------------------

    pub fn set_page(&mut self, page: usize) {
        self.page.set_page(page);
        self.clamp_page();
    }

    pub fn next_page(&mut self) {
        self.set_page(self.page.page() + 1);
    }

    pub fn prev_page(&mut self) {
        self.set_page(self.page.page().saturating_sub(1));
    }

    pub fn set_page_size(&mut self, size: usize) {
        self.page.set_size(size);
        self.clamp_page();
    }

    pub fn page_size(&self) -> usize {
        self.page.size()
    }

    // --------------------------- record mutation ---------------------------

    /// Replace one field value on one record and fold the change into the
    /// visible mapping.
    pub fn edit_cell(&mut self, id: i64, field: &str, value: Value) -> Result<(), DGError> {
        self.store.update(id, field, value)?;
        self.refresh();
        Ok(())
    }

    /// Remove one record. Its id also leaves the selection.
    pub fn remove_record(&mut self, id: i64) -> Result<(), DGError> {
        self.store.remove(id)?;
        let store = &self.store;
        self.selection.retain(|rid| store.contains(rid));
        self.refresh();
        Ok(())
    }

    pub fn record(&self, id: i64) -> Option<&Record> {
        self.store.get(id)
    }

    // ------------------------------ selection ------------------------------

    /// Toggle one record's selection. Unknown ids are ignored.
    pub fn toggle_selection(&mut self, id: i64) {
        if self.store.contains(id) {
            self.selection.toggle(id);
        }
    }

    /// Tri-state select-all across the whole filtered view, not just the
    /// current page.
    pub fn toggle_select_all(&mut self) {
        let ids: Vec<i64> = self
            .view_rows
            .iter()
            .map(|&idx| self.store.all()[idx].id())
            .collect();
        self.selection.toggle_all(&ids);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    // ------------------------------ rendering ------------------------------

    pub fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    pub fn current_page(&self) -> PageView {
        let slice = page::slice(self.view_rows.len(), &self.page);
        let records: Vec<&Record> = self.view_rows[slice.start..slice.end]
            .iter()
            .map(|&idx| &self.store.all()[idx])
            .collect();
        PageView {
            rows: render(&records, &self.columns, &self.selection),
            page: slice.page,
            total_pages: slice.total_pages,
            visible_rows: self.view_rows.len(),
            total_rows: self.store.len(),
        }
    }
}

/// Resolve a run of records against the column set: per column the display
/// value plus the editable flag, per row the selected flag. Never fails;
/// missing data degrades to placeholder values.
pub fn render(records: &[&Record], columns: &ColumnSet, selection: &Selection) -> Vec<RowView> {
    records
        .iter()
        .map(|record| {
            let selected = selection.contains(record.id());
            let cells = columns
                .displayed()
                .map(|column| CellView {
                    value: cell_value(record, column, selected),
                    editable: column.editable,
                })
                .collect();
            RowView {
                id: record.id(),
                selected,
                cells,
            }
        })
        .collect()
}

fn cell_value(record: &Record, column: &ColumnDescriptor, selected: bool) -> DisplayValue {
    if let Some(derivation) = &column.derive {
        return derivation.resolve(record, column.field.as_deref());
    }
    match &column.field {
        Some(field) => match record.get(field) {
            Some(value) => DisplayValue::Text(value.to_string()),
            None => DisplayValue::Text("∅".to_string()),
        },
        // The field-less, derivation-less column is the checkbox column.
        None => DisplayValue::Marker { selected },
    }
}
