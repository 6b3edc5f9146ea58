use std::time::Instant;

use arboard::Clipboard;
use ratatui::crossterm::event::KeyEvent;
use tracing::{debug, error, trace};

use crate::domain::{CMDMode, DGConfig, DGError, HELP_TEXT, Message, PAGE_SIZES};
use crate::grid::{Align, ColumnDescriptor, ColumnPredicate, DisplayValue, FilterKind, Grid, Value};
use crate::inputter::{InputResult, Inputter};
use crate::loader::Dataset;

#[derive(Debug, PartialEq)]
pub enum Status {
    READY,
    QUITTING,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    TABLE,
    POPUP,
    CMDINPUT,
}

/// One display-ready column header, already padded to its width.
#[derive(Clone)]
pub struct UIColumn {
    pub title: String,
    pub width: usize,
}

/// One display-ready row: padded cell strings in display order.
#[derive(Clone)]
pub struct UIRow {
    pub id: i64,
    pub selected: bool,
    pub cells: Vec<String>,
}

/// Everything the presentation layer needs for one frame. The model
/// prepares all strings; the UI only styles and places them.
pub struct UIData {
    pub name: String,
    pub header: Vec<UIColumn>,
    pub rows: Vec<UIRow>,
    pub curser_row: usize,
    pub curser_column: usize,
    pub page: usize,
    pub total_pages: usize,
    pub page_size: usize,
    pub visible_rows: usize,
    pub total_rows: usize,
    pub selected_count: usize,
    pub filter_summary: String,
    pub show_popup: bool,
    pub popup_message: String,
    pub cmdinput: InputResult,
    pub cmd_mode: Option<CMDMode>,
    pub active_cmdinput: bool,
    pub status_message: String,
    pub last_status_message_update: Instant,
    pub last_update: Instant,
}

impl UIData {
    pub fn empty() -> Self {
        UIData {
            name: String::new(),
            header: Vec::new(),
            rows: Vec::new(),
            curser_row: 0,
            curser_column: 0,
            page: 0,
            total_pages: 1,
            page_size: 0,
            visible_rows: 0,
            total_rows: 0,
            selected_count: 0,
            filter_summary: String::new(),
            show_popup: false,
            popup_message: String::new(),
            cmdinput: InputResult::default(),
            cmd_mode: None,
            active_cmdinput: false,
            status_message: String::new(),
            last_status_message_update: Instant::now(),
            last_update: Instant::now(),
        }
    }
}

pub struct Model {
    config: DGConfig,
    pub status: Status,
    modus: Modus,
    previous_modus: Modus,
    grid: Grid,
    name: String,
    curser_row: usize,
    curser_column: usize,
    clipboard: Option<Clipboard>,
    input: Inputter,
    cmd_mode: Option<CMDMode>,
    last_input: InputResult,
    active_cmdinput: bool,
    edit_target: Option<(i64, String)>,
    filter_target: Option<String>,
    status_message: String,
    last_status_message_update: Instant,
    uidata: UIData,
}

impl Model {
    pub fn new(dataset: Dataset, config: &DGConfig) -> Result<Self, DGError> {
        let grid = Grid::new(dataset.columns, dataset.records, config.page_size)?;
        let clipboard = match Clipboard::new() {
            Ok(clipboard) => Some(clipboard),
            Err(e) => {
                debug!("Clipboard unavailable: {e}");
                None
            }
        };

        let mut model = Self {
            config: config.clone(),
            status: Status::READY,
            modus: Modus::TABLE,
            previous_modus: Modus::TABLE,
            grid,
            name: dataset.name,
            curser_row: 0,
            curser_column: 0,
            clipboard,
            input: Inputter::default(),
            cmd_mode: None,
            last_input: InputResult::default(),
            active_cmdinput: false,
            edit_target: None,
            filter_target: None,
            status_message: String::new(),
            last_status_message_update: Instant::now(),
            uidata: UIData::empty(),
        };
        model.update_table_data();
        model.set_status_message(format!(
            "Loaded {} records. Press ? for help.",
            model.uidata.total_rows
        ));
        Ok(model)
    }

    pub fn get_uidata(&self) -> &UIData {
        &self.uidata
    }

    /// While the command line is active, the controller forwards key
    /// events unmapped.
    pub fn raw_keyevents(&self) -> bool {
        self.active_cmdinput
    }

    pub fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    pub fn update(&mut self, message: Message) -> Result<(), DGError> {
        match self.modus {
            Modus::TABLE => match message {
                Message::Quit => self.quit(),
                Message::Help => self.show_help(),
                Message::Exit => {}
                Message::MoveUp => self.move_curser_up(),
                Message::MoveDown => self.move_curser_down(),
                Message::MoveLeft => self.move_curser_left(),
                Message::MoveRight => self.move_curser_right(),
                Message::MoveTop => self.move_curser_top(),
                Message::MoveBottom => self.move_curser_bottom(),
                Message::PageNext => self.page_next(),
                Message::PagePrev => self.page_prev(),
                Message::CyclePageSize => self.cycle_page_size(),
                Message::EnterQuery => {
                    let prefill = self.grid.query().to_string();
                    self.enter_cmd_mode(CMDMode::Query, &prefill);
                }
                Message::EnterColumnFilter => self.enter_column_filter(),
                Message::ClearFilters => self.clear_filters(),
                Message::ToggleSort => self.toggle_sort(false),
                Message::ToggleSortAdditive => self.toggle_sort(true),
                Message::ToggleSelect => self.toggle_select(),
                Message::ToggleSelectAll => self.toggle_select_all(),
                Message::ClearSelection => self.clear_selection(),
                Message::EditCell => self.enter_cell_edit(),
                Message::DeleteRow => self.delete_row(),
                Message::CopyCell => self.copy_cell(),
                Message::CopyRow => self.copy_row(),
                Message::Resize(width, height) => self.ui_resize(width, height),
                Message::RawKey(_) => {}
            },
            Modus::POPUP => match message {
                Message::Quit => self.quit(),
                Message::Exit | Message::Help => self.exit(),
                Message::Resize(width, height) => self.ui_resize(width, height),
                _ => {}
            },
            Modus::CMDINPUT => match message {
                Message::RawKey(key) => self.raw_input(key),
                Message::Resize(width, height) => self.ui_resize(width, height),
                _ => {}
            },
        }
        Ok(())
    }

    /// Rebuild the display-ready table from the grid. Invoked after every
    /// change that can move rows, cells or the curser.
    fn update_table_data(&mut self) {
        let page = self.grid.current_page();

        if self.curser_row >= page.rows.len() {
            self.curser_row = page.rows.len().saturating_sub(1);
        }
        let ncolumns = self.grid.columns().display_len();
        if self.curser_column >= ncolumns {
            self.curser_column = ncolumns.saturating_sub(1);
        }

        let max_width = self.config.max_column_width;
        let multi_sort = self.grid.sort_state().keys().len() > 1;
        let header = self
            .grid
            .columns()
            .displayed()
            .map(|column| {
                let mut title = column.label.clone();
                if self.grid.filter_state().column(column.key()).is_some() {
                    title.push('*');
                }
                if let Some((idx, descending)) = self.grid.sort_state().position(column.key()) {
                    title.push_str(if descending { " ↓" } else { " ↑" });
                    if multi_sort {
                        title.push_str(&(idx + 1).to_string());
                    }
                }
                let width = column.width.min(max_width);
                UIColumn {
                    title: fit(&title, width, column.align),
                    width,
                }
            })
            .collect();

        let columns: Vec<&ColumnDescriptor> = self.grid.columns().displayed().collect();
        let rows = page
            .rows
            .iter()
            .map(|row| UIRow {
                id: row.id,
                selected: row.selected,
                cells: row
                    .cells
                    .iter()
                    .zip(columns.iter())
                    .map(|(cell, column)| {
                        display_cell(&cell.value, column, column.width.min(max_width))
                    })
                    .collect(),
            })
            .collect();

        self.uidata = UIData {
            name: self.name.clone(),
            header,
            rows,
            curser_row: self.curser_row,
            curser_column: self.curser_column,
            page: page.page,
            total_pages: page.total_pages,
            page_size: self.grid.page_size(),
            visible_rows: page.visible_rows,
            total_rows: page.total_rows,
            selected_count: self.grid.selection().len(),
            filter_summary: self.filter_summary(),
            show_popup: false,
            popup_message: String::new(),
            cmdinput: self.last_input.clone(),
            cmd_mode: self.cmd_mode,
            active_cmdinput: self.active_cmdinput,
            status_message: self.status_message.clone(),
            last_status_message_update: self.last_status_message_update,
            last_update: Instant::now(),
        };
    }

    fn filter_summary(&self) -> String {
        let state = self.grid.filter_state();
        let mut parts = Vec::new();
        if !state.query().trim().is_empty() {
            parts.push(format!("\"{}\"", state.query().trim()));
        }
        match state.active_columns() {
            0 => {}
            1 => parts.push("1 column filter".to_string()),
            n => parts.push(format!("{n} column filters")),
        }
        parts.join(" + ")
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.last_status_message_update = Instant::now();
        self.uidata.status_message = self.status_message.clone();
        self.uidata.last_status_message_update = self.last_status_message_update;
        self.uidata.last_update = Instant::now();
    }

    // -------------------- Control handling functions ---------------------- //

    fn show_help(&mut self) {
        self.previous_modus = self.modus;
        self.modus = Modus::POPUP;
        self.uidata.popup_message = HELP_TEXT.to_string();
        self.uidata.show_popup = true;
        self.uidata.last_update = Instant::now();
    }

    fn exit(&mut self) {
        if self.modus == Modus::POPUP {
            trace!("Close popup ...");
            self.modus = self.previous_modus;
            self.previous_modus = Modus::POPUP;
            self.uidata.show_popup = false;
            self.uidata.last_update = Instant::now();
        }
    }

    fn ui_resize(&mut self, width: u16, height: u16) {
        // The UI lays itself out from the frame area on every draw; the
        // model only has to trigger a redraw.
        trace!("UI was resized to {width}x{height}");
        self.uidata.last_update = Instant::now();
    }

    fn move_curser_up(&mut self) {
        if self.curser_row > 0 {
            self.curser_row -= 1;
            self.update_table_data();
        } else if self.uidata.page > 0 {
            // Walk onto the previous page's last row.
            self.grid.prev_page();
            self.curser_row = self.grid.page_size().saturating_sub(1);
            self.update_table_data();
        }
    }

    fn move_curser_down(&mut self) {
        if self.curser_row + 1 < self.uidata.rows.len() {
            self.curser_row += 1;
            self.update_table_data();
        } else if self.uidata.page + 1 < self.uidata.total_pages {
            self.grid.next_page();
            self.curser_row = 0;
            self.update_table_data();
        }
    }

    fn move_curser_left(&mut self) {
        if self.curser_column > 0 {
            self.curser_column -= 1;
            self.update_table_data();
        }
    }

    fn move_curser_right(&mut self) {
        if self.curser_column + 1 < self.grid.columns().display_len() {
            self.curser_column += 1;
            self.update_table_data();
        }
    }

    fn move_curser_top(&mut self) {
        self.curser_row = 0;
        self.update_table_data();
    }

    fn move_curser_bottom(&mut self) {
        self.curser_row = self.uidata.rows.len().saturating_sub(1);
        self.update_table_data();
    }

    fn page_next(&mut self) {
        self.grid.next_page();
        self.update_table_data();
    }

    fn page_prev(&mut self) {
        self.grid.prev_page();
        self.update_table_data();
    }

    fn cycle_page_size(&mut self) {
        let current = self.grid.page_size();
        let next = PAGE_SIZES
            .iter()
            .position(|&size| size == current)
            .map(|idx| PAGE_SIZES[(idx + 1) % PAGE_SIZES.len()])
            .unwrap_or(PAGE_SIZES[0]);
        self.grid.set_page_size(next);
        self.curser_row = 0;
        self.update_table_data();
        self.set_status_message(format!("Page size {next}"));
    }

    fn toggle_sort(&mut self, additive: bool) {
        let Some(column) = self.grid.columns().displayed_at(self.curser_column) else {
            return;
        };
        if !column.sortable {
            let label = column.label.clone();
            self.set_status_message(format!("\"{label}\" is not sortable"));
            return;
        }
        let key = column.key().to_string();
        let label = column.label.clone();
        self.grid.toggle_sort(&key, additive);
        self.update_table_data();

        let message = match self.grid.sort_state().position(&key) {
            Some((idx, false)) => format!("Sort by {label} ↑ (key {})", idx + 1),
            Some((idx, true)) => format!("Sort by {label} ↓ (key {})", idx + 1),
            None => format!("Sort by {label} removed"),
        };
        self.set_status_message(message);
    }

    fn toggle_select(&mut self) {
        if let Some(row) = self.uidata.rows.get(self.curser_row) {
            let id = row.id;
            self.grid.toggle_selection(id);
            self.update_table_data();
        }
    }

    fn toggle_select_all(&mut self) {
        self.grid.toggle_select_all();
        self.update_table_data();
        self.set_status_message(format!("{} selected", self.grid.selection().len()));
    }

    fn clear_selection(&mut self) {
        self.grid.clear_selection();
        self.update_table_data();
        self.set_status_message("Selection cleared");
    }

    fn clear_filters(&mut self) {
        self.grid.clear_filters();
        self.update_table_data();
        self.set_status_message("Filters cleared");
    }

    fn enter_column_filter(&mut self) {
        let Some(column) = self.grid.columns().displayed_at(self.curser_column) else {
            return;
        };
        if column.filter == FilterKind::None {
            let label = column.label.clone();
            self.set_status_message(format!("\"{label}\" has no filter"));
            return;
        }
        let key = column.key().to_string();
        // Re-offer an active text needle for editing; ranges re-enter
        // from scratch.
        let prefill = match self.grid.filter_state().column(&key) {
            Some(ColumnPredicate::Text { needle }) => needle.clone(),
            _ => String::new(),
        };
        self.filter_target = Some(key);
        self.enter_cmd_mode(CMDMode::ColumnFilter, &prefill);
    }

    fn enter_cell_edit(&mut self) {
        let Some(column) = self.grid.columns().displayed_at(self.curser_column) else {
            return;
        };
        let (editable, label, field) = (column.editable, column.label.clone(), column.field.clone());
        let Some(field) = field else {
            self.set_status_message(format!("\"{label}\" is not editable"));
            return;
        };
        if !editable {
            self.set_status_message(format!("\"{label}\" is not editable"));
            return;
        }
        let Some(row) = self.uidata.rows.get(self.curser_row) else {
            return;
        };
        let id = row.id;
        let prefill = self
            .grid
            .record(id)
            .and_then(|record| record.get(&field))
            .map(|value| value.to_string())
            .unwrap_or_default();
        self.edit_target = Some((id, field));
        self.enter_cmd_mode(CMDMode::CellEdit, &prefill);
    }

    fn delete_row(&mut self) {
        let Some(row) = self.uidata.rows.get(self.curser_row) else {
            return;
        };
        let id = row.id;
        match self.grid.remove_record(id) {
            Ok(()) => {
                self.update_table_data();
                self.set_status_message(format!("Removed record {id}"));
            }
            Err(e) => self.set_status_message(e.to_string()),
        }
    }

    fn copy_cell(&mut self) {
        let content = self
            .uidata
            .rows
            .get(self.curser_row)
            .and_then(|row| row.cells.get(self.curser_column))
            .map(|cell| cell.trim().to_string());
        if let Some(content) = content {
            self.to_clipboard(content, "cell");
        }
    }

    fn copy_row(&mut self) {
        let Some(row) = self.uidata.rows.get(self.curser_row) else {
            return;
        };
        // The selection marker is display state, not data; skip it.
        let content = row
            .cells
            .iter()
            .zip(self.grid.columns().displayed())
            .filter(|(_, column)| !column.key().is_empty() && column.field.is_some())
            .map(|(cell, _)| wrap_cell_content(cell.trim()))
            .collect::<Vec<String>>()
            .join(",");
        self.to_clipboard(content, "row");
    }

    fn to_clipboard(&mut self, content: String, what: &str) {
        trace!("Copying {what}: {content}");
        match self.clipboard.as_mut() {
            Some(clipboard) => match clipboard.set_text(content) {
                Ok(_) => self.set_status_message(format!("Copied {what} to clipboard")),
                Err(e) => self.set_status_message(format!("Clipboard error: {e}")),
            },
            None => self.set_status_message("No clipboard available"),
        }
    }

    // ---------------------- Command line handling ------------------------- //

    fn enter_cmd_mode(&mut self, mode: CMDMode, prefill: &str) {
        trace!("Entering command mode {mode:?} ...");
        self.previous_modus = self.modus;
        self.modus = Modus::CMDINPUT;
        self.cmd_mode = Some(mode);
        self.active_cmdinput = true;

        self.input.prefill(prefill);
        self.last_input = self.input.get();

        self.uidata.cmdinput = self.last_input.clone();
        self.uidata.active_cmdinput = self.active_cmdinput;
        self.uidata.cmd_mode = self.cmd_mode;
        self.uidata.last_update = Instant::now();
    }

    fn raw_input(&mut self, key: KeyEvent) {
        if self.active_cmdinput {
            self.last_input = self.input.read(key);
            if self.last_input.finished {
                self.handle_cmd_input();
            }
            self.uidata.cmdinput = self.last_input.clone();
            self.uidata.cmd_mode = self.cmd_mode;
            self.uidata.last_update = Instant::now();
        }
    }

    fn handle_cmd_input(&mut self) {
        trace!("Handle cmd input {}", self.last_input.input);

        self.active_cmdinput = false;
        self.modus = self.previous_modus;
        self.previous_modus = Modus::CMDINPUT;
        self.uidata.active_cmdinput = false;

        let cmd_input = self.last_input.input.clone();
        let mode = self.cmd_mode.take();

        if self.last_input.canceled {
            self.edit_target = None;
            self.filter_target = None;
            self.set_status_message("Canceled");
            return;
        }

        match mode {
            Some(CMDMode::Query) => self.apply_query(&cmd_input),
            Some(CMDMode::ColumnFilter) => self.apply_column_filter(&cmd_input),
            Some(CMDMode::CellEdit) => self.apply_cell_edit(&cmd_input),
            None => error!("Cmd input \"{cmd_input}\" with no mode set!"),
        }
    }

    fn apply_query(&mut self, input: &str) {
        self.grid.set_query(input);
        self.update_table_data();
        if input.trim().is_empty() {
            self.set_status_message("Search cleared");
        } else {
            self.set_status_message(format!(
                "{} of {} rows match",
                self.uidata.visible_rows, self.uidata.total_rows
            ));
        }
    }

    fn apply_column_filter(&mut self, input: &str) {
        let Some(key) = self.filter_target.take() else {
            return;
        };
        match self.grid.set_column_filter(&key, input) {
            Ok(()) => {
                self.update_table_data();
                if input.trim().is_empty() {
                    self.set_status_message(format!("Filter on \"{key}\" cleared"));
                } else {
                    self.set_status_message(format!(
                        "{} of {} rows match",
                        self.uidata.visible_rows, self.uidata.total_rows
                    ));
                }
            }
            Err(e) => self.set_status_message(e.to_string()),
        }
    }

    fn apply_cell_edit(&mut self, input: &str) {
        let Some((id, field)) = self.edit_target.take() else {
            return;
        };
        let value = Value::parse(input.trim());
        match self.grid.edit_cell(id, &field, value) {
            Ok(()) => {
                self.update_table_data();
                self.set_status_message(format!("Updated {field} of record {id}"));
            }
            Err(e) => self.set_status_message(e.to_string()),
        }
    }
}

fn display_cell(value: &DisplayValue, column: &ColumnDescriptor, width: usize) -> String {
    match value {
        DisplayValue::Text(text) => fit(text, width, column.align),
        DisplayValue::Bar { percent } => bar(*percent, width),
        DisplayValue::Marker { selected } => {
            fit(if *selected { "[x]" } else { "[ ]" }, width, Align::Center)
        }
    }
}

/// Pad or truncate to exactly `width` chars.
fn fit(text: &str, width: usize, align: Align) -> String {
    let count = text.chars().count();
    if count > width {
        if width < 4 {
            return text.chars().take(width).collect();
        }
        let cut: String = text.chars().take(width - 3).collect();
        return format!("{cut}...");
    }
    let padding = width - count;
    match align {
        Align::Left => format!("{text}{}", " ".repeat(padding)),
        Align::Right => format!("{}{text}", " ".repeat(padding)),
        Align::Center => {
            let left = padding / 2;
            format!("{}{text}{}", " ".repeat(left), " ".repeat(padding - left))
        }
    }
}

/// Render a percent as `███░░░░ 43%`, exactly `width` chars wide.
fn bar(percent: u8, width: usize) -> String {
    let label = format!("{percent:>3}%");
    if width <= label.len() + 1 {
        return fit(&label, width, Align::Right);
    }
    let track = width - label.len() - 1;
    let filled = percent as usize * track / 100;
    format!("{}{} {label}", "█".repeat(filled), "░".repeat(track - filled))
}

fn wrap_cell_content(c: &str) -> String {
    let needs_escaping = c.contains('"');
    let needs_wrapping = c.chars().any(|c| c == ' ' || c == '\t' || c == ',');
    let mut out = String::from(c);

    if needs_escaping {
        out = out.replace('"', "\"\"");
    }
    if needs_wrapping {
        out = format!("\"{out}\"");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::demo_dataset;
    use ratatui::crossterm::event::{KeyCode, KeyModifiers};

    fn demo_model() -> Model {
        let config = DGConfig::default();
        Model::new(demo_dataset(&config), &config).unwrap()
    }

    fn send(model: &mut Model, message: Message) {
        model.update(message).unwrap();
    }

    fn type_line(model: &mut Model, line: &str) {
        for c in line.chars() {
            send(
                model,
                Message::RawKey(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)),
            );
        }
        send(
            model,
            Message::RawKey(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)),
        );
    }

    fn move_to_column(model: &mut Model, idx: usize) {
        for _ in 0..idx {
            send(model, Message::MoveRight);
        }
    }

    #[test]
    fn startup_prepares_a_full_page() {
        let model = demo_model();
        let uidata = model.get_uidata();
        assert_eq!(uidata.name, "inventory");
        assert_eq!(uidata.rows.len(), 8);
        assert_eq!(uidata.total_pages, 1);
        assert_eq!(uidata.header.len(), 10);
        // Every cell is padded to its column width.
        for (header, cell) in uidata.header.iter().zip(&uidata.rows[0].cells) {
            assert_eq!(cell.chars().count(), header.width);
        }
        assert_eq!(uidata.rows[0].cells[0].trim(), "[ ]");
    }

    #[test]
    fn query_flow_narrows_the_rows() {
        let mut model = demo_model();
        send(&mut model, Message::EnterQuery);
        assert!(model.raw_keyevents());
        type_line(&mut model, "tesla");

        let uidata = model.get_uidata();
        assert!(!uidata.active_cmdinput);
        assert_eq!(uidata.rows.len(), 1);
        assert_eq!(uidata.rows[0].id, 1);
        assert_eq!(uidata.filter_summary, "\"tesla\"");
        assert_eq!(uidata.status_message, "1 of 8 rows match");
    }

    #[test]
    fn canceled_input_changes_nothing() {
        let mut model = demo_model();
        send(&mut model, Message::EnterQuery);
        for c in "tes".chars() {
            send(
                &mut model,
                Message::RawKey(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)),
            );
        }
        send(
            &mut model,
            Message::RawKey(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)),
        );

        let uidata = model.get_uidata();
        assert_eq!(uidata.rows.len(), 8);
        assert_eq!(uidata.status_message, "Canceled");
        assert!(!model.raw_keyevents());
    }

    #[test]
    fn column_filter_flow_marks_the_header() {
        let mut model = demo_model();
        // year sits at display index 4.
        move_to_column(&mut model, 4);
        send(&mut model, Message::EnterColumnFilter);
        type_line(&mut model, "2024");

        let uidata = model.get_uidata();
        assert_eq!(uidata.rows.len(), 3);
        assert!(uidata.header[4].title.contains("Year*"));

        // Malformed input keeps the active filter and reports why.
        send(&mut model, Message::EnterColumnFilter);
        type_line(&mut model, "20..abc");
        let uidata = model.get_uidata();
        assert_eq!(uidata.rows.len(), 3);
        assert!(uidata.status_message.starts_with("Invalid filter"));

        send(&mut model, Message::ClearFilters);
        assert_eq!(model.get_uidata().rows.len(), 8);
    }

    #[test]
    fn sort_flow_marks_the_header_and_reorders() {
        let mut model = demo_model();
        // price sits at display index 5.
        move_to_column(&mut model, 5);
        send(&mut model, Message::ToggleSort);
        send(&mut model, Message::ToggleSort);

        let uidata = model.get_uidata();
        assert!(uidata.header[5].title.contains("↓"));
        assert_eq!(uidata.rows[0].id, 7);
        assert_eq!(uidata.rows[0].cells[5].trim(), "RM 125,000");

        // Third toggle drops the key and restores load order.
        send(&mut model, Message::ToggleSort);
        assert_eq!(model.get_uidata().rows[0].id, 1);
    }

    #[test]
    fn edit_flow_prefills_and_updates_the_cell() {
        let mut model = demo_model();
        move_to_column(&mut model, 2);
        send(&mut model, Message::MoveDown);
        send(&mut model, Message::EditCell);

        assert_eq!(model.get_uidata().cmdinput.input, "F-Series");
        // Wipe the prefill, type the replacement.
        for _ in 0..8 {
            send(
                &mut model,
                Message::RawKey(KeyEvent::new(KeyCode::Backspace, KeyModifiers::NONE)),
            );
        }
        type_line(&mut model, "Maverick");

        let uidata = model.get_uidata();
        assert_eq!(uidata.rows[1].cells[2].trim(), "Maverick");
        assert_eq!(uidata.rows.len(), 8);
        assert_eq!(uidata.status_message, "Updated model of record 2");
    }

    #[test]
    fn non_editable_cells_refuse_the_edit() {
        let mut model = demo_model();
        move_to_column(&mut model, 1);
        send(&mut model, Message::EditCell);
        assert!(!model.raw_keyevents());
        assert_eq!(
            model.get_uidata().status_message,
            "\"Manufacturer\" is not editable"
        );
    }

    #[test]
    fn selection_keys_toggle_and_clear() {
        let mut model = demo_model();
        send(&mut model, Message::ToggleSelect);
        let uidata = model.get_uidata();
        assert_eq!(uidata.selected_count, 1);
        assert!(uidata.rows[0].selected);
        assert_eq!(uidata.rows[0].cells[0].trim(), "[x]");

        send(&mut model, Message::ToggleSelectAll);
        assert_eq!(model.get_uidata().selected_count, 8);
        send(&mut model, Message::ToggleSelectAll);
        assert_eq!(model.get_uidata().selected_count, 0);

        send(&mut model, Message::ToggleSelect);
        send(&mut model, Message::ClearSelection);
        assert_eq!(model.get_uidata().selected_count, 0);
    }

    #[test]
    fn delete_removes_the_row_under_the_curser() {
        let mut model = demo_model();
        send(&mut model, Message::MoveDown);
        send(&mut model, Message::MoveDown);
        send(&mut model, Message::DeleteRow);

        let uidata = model.get_uidata();
        assert_eq!(uidata.total_rows, 7);
        assert_eq!(uidata.status_message, "Removed record 3");
        assert!(uidata.rows.iter().all(|row| row.id != 3));
    }

    #[test]
    fn curser_walks_across_page_boundaries() {
        let config = DGConfig::default().page_size(3);
        let mut model = Model::new(demo_dataset(&config), &config).unwrap();

        send(&mut model, Message::MoveBottom);
        assert_eq!(model.get_uidata().curser_row, 2);
        send(&mut model, Message::MoveDown);
        let uidata = model.get_uidata();
        assert_eq!(uidata.page, 1);
        assert_eq!(uidata.curser_row, 0);

        send(&mut model, Message::MoveUp);
        let uidata = model.get_uidata();
        assert_eq!(uidata.page, 0);
        assert_eq!(uidata.curser_row, 2);
    }

    #[test]
    fn page_size_cycle_walks_the_ladder() {
        let mut model = demo_model();
        assert_eq!(model.get_uidata().page_size, 10);
        send(&mut model, Message::CyclePageSize);
        assert_eq!(model.get_uidata().page_size, 25);
        send(&mut model, Message::CyclePageSize);
        send(&mut model, Message::CyclePageSize);
        send(&mut model, Message::CyclePageSize);
        assert_eq!(model.get_uidata().page_size, 10);
    }

    #[test]
    fn help_popup_opens_and_closes() {
        let mut model = demo_model();
        send(&mut model, Message::Help);
        assert!(model.get_uidata().show_popup);
        // Table keys are inert while the popup is up.
        send(&mut model, Message::MoveDown);
        assert_eq!(model.get_uidata().curser_row, 0);
        send(&mut model, Message::Exit);
        assert!(!model.get_uidata().show_popup);
    }

    #[test]
    fn quit_message_flips_the_status() {
        let mut model = demo_model();
        send(&mut model, Message::Quit);
        assert_eq!(model.status, Status::QUITTING);
    }

    #[test]
    fn fit_pads_truncates_and_aligns() {
        assert_eq!(fit("abc", 5, Align::Left), "abc  ");
        assert_eq!(fit("abc", 5, Align::Right), "  abc");
        assert_eq!(fit("abc", 5, Align::Center), " abc ");
        assert_eq!(fit("Manufacturer", 8, Align::Left), "Manuf...");
        assert_eq!(fit("abc", 2, Align::Left), "ab");
        // Chars, not bytes.
        assert_eq!(fit("⚡ Electric", 12, Align::Left), "⚡ Electric  ");
    }

    #[test]
    fn bar_fills_proportionally() {
        assert_eq!(bar(43, 20), "██████░░░░░░░░░  43%");
        assert_eq!(bar(100, 10), "█████ 100%");
        assert_eq!(bar(0, 10), "░░░░░   0%");
        // Too narrow for a track: the label alone.
        assert_eq!(bar(43, 4), " 43%");
    }

    #[test]
    fn wrap_cell_content_escapes_for_csv() {
        assert_eq!(wrap_cell_content("plain"), "plain");
        assert_eq!(wrap_cell_content("Model Y"), "\"Model Y\"");
        assert_eq!(wrap_cell_content("a,b"), "\"a,b\"");
        assert_eq!(wrap_cell_content("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
