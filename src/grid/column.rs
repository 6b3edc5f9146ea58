use std::collections::HashSet;

use crate::domain::DGError;
use crate::grid::derive::Derivation;

/// Which filter editor a column offers. `None` means the column rejects
/// per-column predicates entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterKind {
    #[default]
    None,
    Text,
    Number,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pin {
    #[default]
    None,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Declarative description of one display column. Columns are configured
/// as plain literals; everything not set falls back to the default.
///
/// A column usually binds a record field. A column without a field needs
/// its own `id` to stay addressable; the one field-less, derivation-less
/// column acts as the selection checkbox column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDescriptor {
    pub field: Option<String>,
    pub id: Option<String>,
    pub label: String,
    pub sortable: bool,
    pub filter: FilterKind,
    pub editable: bool,
    pub derive: Option<Derivation>,
    pub pinned: Pin,
    pub align: Align,
    pub width: usize,
}

impl Default for ColumnDescriptor {
    fn default() -> Self {
        ColumnDescriptor {
            field: None,
            id: None,
            label: String::new(),
            sortable: false,
            filter: FilterKind::None,
            editable: false,
            derive: None,
            pinned: Pin::None,
            align: Align::Left,
            width: 10,
        }
    }
}

impl ColumnDescriptor {
    /// The addressing key: the explicit id when present, the bound field
    /// otherwise. At most one column may end up with the empty key.
    pub fn key(&self) -> &str {
        self.id
            .as_deref()
            .or(self.field.as_deref())
            .unwrap_or("")
    }
}

/// The validated, ordered column configuration. Display order differs
/// from declaration order: left-pinned columns come first, right-pinned
/// ones last, and the unpinned middle keeps declaration order.
#[derive(Debug, Clone)]
pub struct ColumnSet {
    columns: Vec<ColumnDescriptor>,
    display: Vec<usize>,
}

impl ColumnSet {
    pub fn new(columns: Vec<ColumnDescriptor>) -> Result<Self, DGError> {
        let mut seen: HashSet<&str> = HashSet::new();
        for column in &columns {
            if !seen.insert(column.key()) {
                return Err(DGError::DuplicateColumnId(column.key().to_string()));
            }
        }

        let mut display = Vec::with_capacity(columns.len());
        for pin in [Pin::Left, Pin::None, Pin::Right] {
            display.extend(
                columns
                    .iter()
                    .enumerate()
                    .filter(|(_, c)| c.pinned == pin)
                    .map(|(i, _)| i),
            );
        }

        Ok(ColumnSet { columns, display })
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Columns in display order.
    pub fn displayed(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.display.iter().map(|&i| &self.columns[i])
    }

    pub fn displayed_at(&self, idx: usize) -> Option<&ColumnDescriptor> {
        self.display.get(idx).map(|&i| &self.columns[i])
    }

    pub fn display_len(&self) -> usize {
        self.display.len()
    }

    pub fn by_key(&self, key: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.key() == key)
    }

    /// The record field a keyed column reads from, if it binds one.
    pub fn field_of(&self, key: &str) -> Option<&str> {
        self.by_key(key).and_then(|c| c.field.as_deref())
    }
}
