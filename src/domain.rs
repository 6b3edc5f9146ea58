use std::fmt;
use std::io;

use derive_setters::Setters;
use polars::error::PolarsError;
use ratatui::crossterm::event::KeyEvent;

/// Page sizes the size-cycle key walks through.
pub const PAGE_SIZES: [usize; 4] = [10, 25, 50, 100];

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const DEFAULT_PROGRESS_CEILING: f64 = 150_000.0;
pub const DEFAULT_CURRENCY_PREFIX: &str = "RM";

#[derive(Debug, Clone, Setters)]
pub struct DGConfig {
    /// Rows shown per page at startup.
    pub page_size: usize,
    /// Ceiling against which bar cells scale to 100%.
    pub progress_ceiling: f64,
    /// Prefix for currency cells.
    pub currency_prefix: String,
    /// Milliseconds to wait for a terminal event per loop turn.
    pub event_poll_time: u64,
    /// Hard cap on rendered column width.
    pub max_column_width: usize,
}

impl Default for DGConfig {
    fn default() -> Self {
        DGConfig {
            page_size: DEFAULT_PAGE_SIZE,
            progress_ceiling: DEFAULT_PROGRESS_CEILING,
            currency_prefix: DEFAULT_CURRENCY_PREFIX.to_string(),
            event_poll_time: 100,
            max_column_width: 40,
        }
    }
}

#[derive(Debug)]
pub enum DGError {
    IoError(io::Error),
    PolarsError(PolarsError),
    LoadingFailed(String),
    FileNotFound,
    PermissionDenied,
    UnknownFileType,
    /// An operation targeted a record id the store does not hold.
    RecordNotFound(i64),
    /// Two column descriptors resolved to the same key. Raised once at
    /// setup, never at runtime.
    DuplicateColumnId(String),
    /// Filter input rejected at the setting boundary; whatever filter was
    /// active before stays in effect.
    InvalidFilterPredicate(String),
}

impl From<io::Error> for DGError {
    fn from(err: io::Error) -> Self {
        DGError::IoError(err)
    }
}

impl From<PolarsError> for DGError {
    fn from(err: PolarsError) -> Self {
        DGError::PolarsError(err)
    }
}

impl fmt::Display for DGError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DGError::IoError(err) => write!(f, "IO error: {err}"),
            DGError::PolarsError(err) => write!(f, "Data error: {err}"),
            DGError::LoadingFailed(msg) => write!(f, "Loading failed: {msg}"),
            DGError::FileNotFound => write!(f, "File not found"),
            DGError::PermissionDenied => write!(f, "Permission denied"),
            DGError::UnknownFileType => write!(f, "Unknown file type"),
            DGError::RecordNotFound(id) => write!(f, "No record with id {id}"),
            DGError::DuplicateColumnId(key) => write!(f, "Duplicate column id \"{key}\""),
            DGError::InvalidFilterPredicate(msg) => write!(f, "Invalid filter: {msg}"),
        }
    }
}

impl std::error::Error for DGError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DGError::IoError(err) => Some(err),
            DGError::PolarsError(err) => Some(err),
            _ => None,
        }
    }
}

/// Which consumer the command line input goes to once committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CMDMode {
    Query,
    ColumnFilter,
    CellEdit,
}

/// Everything the controller can ask the model to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Message {
    Quit,
    Help,
    Exit,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    MoveTop,
    MoveBottom,
    PageNext,
    PagePrev,
    CyclePageSize,
    EnterQuery,
    EnterColumnFilter,
    ClearFilters,
    ToggleSort,
    ToggleSortAdditive,
    ToggleSelect,
    ToggleSelectAll,
    ClearSelection,
    EditCell,
    DeleteRow,
    CopyCell,
    CopyRow,
    Resize(u16, u16),
    RawKey(KeyEvent),
}

pub const HELP_TEXT: &str = "\
 Navigation
   ↑/k ↓/j         move row          ←/h →/l    move column
   Home/g End/G    first/last row    n/p        next/previous page
   z               cycle page size

 View
   /               global search     f          filter current column
   F               clear filters     s          sort by current column
   S               add sort key      Esc        close popup or cancel

 Records
   Space           select row        a          select/deselect all
   c               clear selection   e          edit current cell
   d               delete row        y/Y       copy cell/row

 q quits. Number filters accept 42, 10..20, 10.. or ..20.";
