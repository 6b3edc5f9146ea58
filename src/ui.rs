use std::ops::Range;

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Stylize,
    symbols::border,
    text::{Line, Span},
    widgets::{Block, Clear, Paragraph},
};

use crate::domain::CMDMode;
use crate::model::UIData;

/// Renders the display-ready [`UIData`]. All strings arrive padded from
/// the model; this layer only styles and places them.
#[derive(Debug, Default)]
pub struct GridUI {}

impl GridUI {
    pub fn new() -> Self {
        Self {}
    }

    pub fn draw(&self, uidata: &UIData, frame: &mut Frame) {
        let [table_area, status_area, cmd_area] = Layout::vertical([
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        self.draw_table(uidata, frame, table_area);
        self.draw_status(uidata, frame, status_area);
        self.draw_cmdline(uidata, frame, cmd_area);

        if uidata.show_popup {
            self.draw_popup(uidata, frame);
        }
    }

    fn draw_table(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let title = Line::from(format!(" dg [{}] ", uidata.name).bold());
        let hints = Line::from(vec![
            " Help ".into(),
            "<?> ".blue().bold(),
            " Search ".into(),
            "</> ".blue().bold(),
            " Sort ".into(),
            "<s> ".blue().bold(),
            " Quit ".into(),
            "<q> ".blue().bold(),
        ]);
        let block = Block::bordered()
            .title(title.centered())
            .title_bottom(hints.centered())
            .border_set(border::THICK);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let height = inner.height as usize;
        if height == 0 {
            return;
        }

        let mut lines: Vec<Line> = Vec::with_capacity(height);
        let header: Vec<Span> = uidata
            .header
            .iter()
            .map(|column| Span::from(format!("{} ", column.title)).bold())
            .collect();
        lines.push(Line::from(header));

        for idx in window(uidata.curser_row, uidata.rows.len(), height.saturating_sub(1)) {
            let row = &uidata.rows[idx];
            let mut spans = Vec::with_capacity(row.cells.len());
            for (col, cell) in row.cells.iter().enumerate() {
                let mut span = Span::from(format!("{cell} "));
                if row.selected {
                    span = span.green();
                }
                if idx == uidata.curser_row && col == uidata.curser_column {
                    span = span.reversed();
                }
                spans.push(span);
            }
            lines.push(Line::from(spans));
        }

        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn draw_status(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let mut left = format!(" {}/{} rows", uidata.visible_rows, uidata.total_rows);
        if uidata.selected_count > 0 {
            left.push_str(&format!(" | {} selected", uidata.selected_count));
        }
        if !uidata.filter_summary.is_empty() {
            left.push_str(&format!(" | filter: {}", uidata.filter_summary));
        }
        let right = format!(
            "page {}/{} ({} per page) ",
            uidata.page + 1,
            uidata.total_pages,
            uidata.page_size
        );

        let pad = (area.width as usize).saturating_sub(left.chars().count() + right.chars().count());
        let line = Line::from(vec![left.into(), " ".repeat(pad).into(), right.yellow()]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn draw_cmdline(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        if uidata.active_cmdinput {
            let prompt = match uidata.cmd_mode {
                Some(CMDMode::Query) => " search: ",
                Some(CMDMode::ColumnFilter) => " filter: ",
                Some(CMDMode::CellEdit) => " edit: ",
                None => " > ",
            };
            let input = &uidata.cmdinput.input;
            let pos = uidata.cmdinput.curser_pos;
            let before: String = input.chars().take(pos).collect();
            let mut under: String = input.chars().skip(pos).take(1).collect();
            let after: String = input.chars().skip(pos + 1).collect();
            if under.is_empty() {
                under.push(' ');
            }
            let line = Line::from(vec![
                prompt.bold(),
                before.into(),
                under.reversed(),
                after.into(),
            ]);
            frame.render_widget(Paragraph::new(line), area);
        } else {
            let line = Line::from(format!(" {}", uidata.status_message).italic());
            frame.render_widget(Paragraph::new(line), area);
        }
    }

    fn draw_popup(&self, uidata: &UIData, frame: &mut Frame) {
        let area = popup_rect(frame.area(), 60, 80);
        frame.render_widget(Clear, area);

        let block = Block::bordered()
            .title(Line::from(" Help ".bold()).centered())
            .title_bottom(Line::from(" <Esc> to close ".blue()).centered())
            .border_set(border::THICK);
        let text: Vec<Line> = uidata.popup_message.lines().map(Line::from).collect();
        frame.render_widget(Paragraph::new(text).block(block), area);
    }
}

/// The range of row indices to draw so that the curser stays visible,
/// centered where the page allows it.
fn window(curser: usize, nrows: usize, height: usize) -> Range<usize> {
    if height == 0 || nrows == 0 {
        return 0..0;
    }
    if nrows <= height {
        return 0..nrows;
    }
    let start = curser.saturating_sub(height / 2).min(nrows - height);
    start..start + height
}

fn popup_rect(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let [_, mid, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(area);
    let [_, rect, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(mid);
    rect
}
