//! Epoch table component - the main screen
//!
//! Owns the table state (sort, page, search), derives both query requests
//! from it, and renders whatever the client holds for the current variables:
//! a loading row, a terse error, or one row per epoch.

use crate::action::Action;
use crate::component::Component;
use crate::components::calculate_main_layout;
use crate::components::pagination::draw_pagination;
use crate::model::{page_count, Epoch, InputMode, Load, SortField, TableState};
use crate::services::{
    count_request, decode_count, decode_epochs, list_request, CacheKey, EpochCount, QueryClient,
    QueryError, QueryState,
};
use anyhow::Result;
use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    layout::{Alignment, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use serde_json::Value;
use unicode_width::UnicodeWidthStr;

const COLUMN_SEPARATOR: &str = " │ ";

// ═══════════════════════════════════════════════════════════════════════════════
// Epoch Table Component
// ═══════════════════════════════════════════════════════════════════════════════

pub struct EpochTableComponent {
    pub state: TableState,
    pub input_mode: InputMode,

    /// Keys of the requests issued for the current state
    list_key: Option<CacheKey>,
    count_key: Option<CacheKey>,

    /// Decoded results for the current keys
    pub epochs: Load<Vec<Epoch>>,
    pub count: Load<EpochCount>,

    /// Highlighted row on the current page
    pub selected: Option<usize>,

    /// When the current page last arrived
    pub last_updated: Option<DateTime<Local>>,

    /// Endpoint shown in the status bar
    endpoint_label: String,

    // Click targets from the last frame
    header_hits: Vec<(Rect, SortField)>,
    row_hits: Vec<(Rect, usize)>,
    page_hits: Vec<(Rect, u32)>,
}

impl EpochTableComponent {
    pub fn new(endpoint_label: impl Into<String>) -> Self {
        Self {
            state: TableState::new(),
            input_mode: InputMode::Normal,
            list_key: None,
            count_key: None,
            epochs: Load::Loading,
            count: Load::Loading,
            selected: None,
            last_updated: None,
            endpoint_label: endpoint_label.into(),
            header_hits: Vec::new(),
            row_hits: Vec::new(),
            page_hits: Vec::new(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    /// Ask the client for both queries under the current state
    pub fn issue_queries(&mut self, client: &mut QueryClient) -> Result<()> {
        let list = list_request(&self.state)?;
        let count = count_request(&self.state)?;
        self.list_key = Some(client.fetch(&list));
        self.count_key = Some(client.fetch(&count));
        self.sync_results(client);
        Ok(())
    }

    /// Re-run both queries for the current state, bypassing the cache
    pub fn refresh(&mut self, client: &mut QueryClient) -> Result<()> {
        let list = list_request(&self.state)?;
        let count = count_request(&self.state)?;
        self.list_key = Some(client.refetch(&list));
        self.count_key = Some(client.refetch(&count));
        self.sync_results(client);
        Ok(())
    }

    /// Pull the client's state for the current keys into the view
    pub fn sync_results(&mut self, client: &QueryClient) {
        let epochs = match &self.list_key {
            Some(key) => resolve(client.state(key), decode_epochs),
            None => Load::Loading,
        };
        let count = match &self.count_key {
            Some(key) => resolve(client.state(key), decode_count),
            None => Load::Loading,
        };

        if epochs != self.epochs {
            if epochs.ready().is_some() {
                self.last_updated = Some(Local::now());
            }
            self.epochs = epochs;
        }
        self.count = count;
        self.clamp_selection();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Sorting & Search
    // ─────────────────────────────────────────────────────────────────────────

    pub fn sort_by(&mut self, field: SortField, client: &mut QueryClient) -> Result<()> {
        self.state.sort_by(field);
        self.selected = None;
        self.issue_queries(client)
    }

    pub fn enter_search_mode(&mut self) {
        self.input_mode = InputMode::Search;
    }

    pub fn exit_search_mode(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn search_input(&mut self, c: char, client: &mut QueryClient) -> Result<()> {
        self.state.push_search_char(c);
        self.selected = None;
        self.issue_queries(client)
    }

    pub fn search_backspace(&mut self, client: &mut QueryClient) -> Result<()> {
        if self.state.pop_search_char() {
            self.selected = None;
            self.issue_queries(client)?;
        }
        Ok(())
    }

    pub fn clear_search(&mut self, client: &mut QueryClient) -> Result<()> {
        if self.state.search().is_empty() {
            return Ok(());
        }
        self.state.set_search("");
        self.selected = None;
        self.issue_queries(client)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Pagination
    // ─────────────────────────────────────────────────────────────────────────

    /// Known number of pages, `None` while counting or when the count is capped
    pub fn page_limit(&self) -> Option<u32> {
        match &self.count {
            Load::Ready(count) if !count.capped => Some(page_count(count.count)),
            _ => None,
        }
    }

    /// Pages to draw in the pagination row
    fn displayed_page_count(&self) -> Option<(u32, bool)> {
        self.count
            .ready()
            .map(|count| (page_count(count.count), count.capped))
    }

    pub fn go_to_page(&mut self, page: u32, client: &mut QueryClient) -> Result<()> {
        if self.state.go_to_page(page, self.page_limit()) {
            self.selected = None;
            self.issue_queries(client)?;
        }
        Ok(())
    }

    pub fn next_page(&mut self, client: &mut QueryClient) -> Result<()> {
        self.go_to_page(self.state.page().saturating_add(1), client)
    }

    pub fn prev_page(&mut self, client: &mut QueryClient) -> Result<()> {
        self.go_to_page(self.state.page().saturating_sub(1), client)
    }

    pub fn first_page(&mut self, client: &mut QueryClient) -> Result<()> {
        self.go_to_page(1, client)
    }

    /// Last page as far as the count knows
    pub fn last_page(&mut self, client: &mut QueryClient) -> Result<()> {
        match self.displayed_page_count() {
            Some((pages, _)) if pages > 0 => self.go_to_page(pages, client),
            _ => Ok(()),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Rows
    // ─────────────────────────────────────────────────────────────────────────

    fn row_count(&self) -> usize {
        self.epochs.ready().map_or(0, Vec::len)
    }

    fn clamp_selection(&mut self) {
        let rows = self.row_count();
        self.selected = if rows == 0 {
            None
        } else {
            Some(self.selected.unwrap_or(0).min(rows - 1))
        };
    }

    pub fn next_row(&mut self) {
        let rows = self.row_count();
        if rows > 0 {
            self.selected = Some(self.selected.map_or(0, |i| (i + 1) % rows));
        }
    }

    pub fn prev_row(&mut self) {
        let rows = self.row_count();
        if rows > 0 {
            self.selected = Some(self.selected.map_or(0, |i| (i + rows - 1) % rows));
        }
    }

    pub fn select_row(&mut self, row: usize) {
        if row < self.row_count() {
            self.selected = Some(row);
        }
    }

    pub fn epoch_at(&self, row: usize) -> Option<&Epoch> {
        self.epochs.ready()?.get(row)
    }

    pub fn selected_epoch(&self) -> Option<&Epoch> {
        self.epoch_at(self.selected?)
    }

    /// Either query failed for the current variables
    pub fn has_error(&self) -> bool {
        self.epochs.is_failed() || self.count.is_failed()
    }
}

/// Map a client state to a view state, decoding data
fn resolve<T>(state: QueryState<'_>, decode: fn(&Value) -> Result<T, QueryError>) -> Load<T> {
    match state {
        QueryState::Loading => Load::Loading,
        QueryState::Error(_) => Load::Failed,
        QueryState::Data(data) => match decode(data) {
            Ok(value) => Load::Ready(value),
            Err(err) => {
                tracing::warn!(error = %err, "unexpected response shape");
                Load::Failed
            }
        },
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Component Implementation
// ═══════════════════════════════════════════════════════════════════════════════

impl Component for EpochTableComponent {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Char('?') => Some(Action::OpenHelp),
            KeyCode::Char('r') => Some(Action::Refresh),

            // Search
            KeyCode::Char('/') => Some(Action::EnterSearchMode),
            KeyCode::Esc if !self.state.search().is_empty() => Some(Action::ClearSearch),

            // Sorting
            KeyCode::Char(c @ '1'..='7') => SortField::from_shortcut(c).map(Action::SortBy),
            KeyCode::Char('s') => Some(Action::SortBy(self.state.sort().field.next())),
            KeyCode::Char('S') => Some(Action::SortBy(self.state.sort().field)),

            // Pagination
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('n') => Some(Action::NextPage),
            KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('p') => Some(Action::PrevPage),
            KeyCode::Home | KeyCode::Char('g') => Some(Action::FirstPage),
            KeyCode::End | KeyCode::Char('G') => Some(Action::LastPage),

            // Rows
            KeyCode::Down | KeyCode::Char('j') => Some(Action::NextRow),
            KeyCode::Up | KeyCode::Char('k') => Some(Action::PrevRow),
            KeyCode::Enter => Some(Action::OpenEpochDetail),

            _ => None,
        };
        Ok(action)
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        let position = Position::new(mouse.column, mouse.row);
        let action = match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some((_, field)) =
                    self.header_hits.iter().find(|(r, _)| r.contains(position))
                {
                    Some(Action::SortBy(*field))
                } else if let Some((_, page)) =
                    self.page_hits.iter().find(|(r, _)| r.contains(position))
                {
                    Some(Action::GoToPage(*page))
                } else {
                    self.row_hits
                        .iter()
                        .find(|(r, _)| r.contains(position))
                        .map(|(_, row)| Action::SelectRow(*row))
                }
            }
            MouseEventKind::ScrollDown => Some(Action::NextRow),
            MouseEventKind::ScrollUp => Some(Action::PrevRow),
            _ => None,
        };
        Ok(action)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let layout = calculate_main_layout(area);

        self.render_search_bar(frame, layout.search);
        self.render_table(frame, layout.table);

        self.page_hits = match self.displayed_page_count() {
            Some((pages, capped)) if !self.has_error() => {
                draw_pagination(frame, layout.pagination, self.state.page(), pages, capped)
            }
            _ => Vec::new(),
        };

        self.render_status_bar(frame, layout.status);
        self.render_help_bar(frame, layout.help);
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Rendering
// ═══════════════════════════════════════════════════════════════════════════════

/// Header text for a column, with room reserved for the sort arrow
fn header_label(field: SortField, active: Option<&str>) -> String {
    format!("{} {}", field.label(), active.unwrap_or(" "))
}

/// Column widths fitting the headers and every cell
fn column_widths(rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = SortField::all()
        .iter()
        .map(|f| header_label(*f, None).width())
        .collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.width());
        }
    }
    widths
}

fn total_width(widths: &[usize]) -> usize {
    widths.iter().sum::<usize>() + COLUMN_SEPARATOR.width() * widths.len().saturating_sub(1)
}

/// A body line spanning the whole table
fn spanning_line(text: &str, widths: &[usize], style: Style) -> Line<'static> {
    Line::from(Span::styled(
        format!("{:^width$}", text, width = total_width(widths)),
        style,
    ))
}

/// Table content: header, separator and body lines
pub fn build_table_lines(
    table: &EpochTableComponent,
    widths: &[usize],
) -> Vec<Line<'static>> {
    let sort = table.state.sort();
    let mut lines = Vec::new();

    let header_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let active_style = header_style.fg(Color::Yellow);
    let mut header_spans = Vec::new();
    for (i, field) in SortField::all().iter().enumerate() {
        let is_active = *field == sort.field;
        let label = header_label(*field, is_active.then(|| sort.direction.arrow()));
        if i > 0 {
            header_spans.push(Span::raw(COLUMN_SEPARATOR));
        }
        header_spans.push(Span::styled(
            format!("{:width$}", label, width = widths[i]),
            if is_active { active_style } else { header_style },
        ));
    }
    lines.push(Line::from(header_spans));

    let separator = widths
        .iter()
        .map(|w| "─".repeat(*w))
        .collect::<Vec<_>>()
        .join("─┼─");
    lines.push(Line::from(Span::styled(
        separator,
        Style::default().fg(Color::DarkGray),
    )));

    match &table.epochs {
        Load::Loading => lines.push(spanning_line(
            "Loading data...",
            widths,
            Style::default().fg(Color::DarkGray),
        )),
        Load::Failed => {}
        Load::Ready(epochs) if epochs.is_empty() => lines.push(spanning_line(
            "No epochs found",
            widths,
            Style::default().fg(Color::DarkGray),
        )),
        Load::Ready(epochs) => {
            for (row, epoch) in epochs.iter().enumerate() {
                let style = if table.selected == Some(row) {
                    Style::default()
                        .bg(Color::Blue)
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                };
                let cells: Vec<String> = epoch
                    .table_cells()
                    .iter()
                    .zip(widths)
                    .map(|(cell, width)| format!("{:>width$}", cell, width = *width))
                    .collect();
                lines.push(Line::from(Span::styled(cells.join(COLUMN_SEPARATOR), style)));
            }
        }
    }

    lines
}

impl EpochTableComponent {
    fn render_search_bar(&self, frame: &mut Frame, area: Rect) {
        let searching = self.input_mode == InputMode::Search;
        let mut spans = Vec::new();

        if self.state.search().is_empty() && !searching {
            spans.push(Span::styled(
                "Press / to search by start block",
                Style::default().fg(Color::DarkGray),
            ));
        } else {
            spans.push(Span::styled(
                self.state.search().to_string(),
                Style::default().fg(Color::White),
            ));
        }
        if searching {
            spans.push(Span::styled("█", Style::default().fg(Color::Cyan)));
        }
        if self.state.search_is_ignored() {
            spans.push(Span::styled(
                "  (not a block number, showing all epochs)",
                Style::default().fg(Color::Yellow),
            ));
        }

        let border = if searching { Color::Cyan } else { Color::DarkGray };
        let paragraph = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Search by Start Block ")
                .border_style(Style::default().fg(border)),
        );
        frame.render_widget(paragraph, area);
    }

    fn render_table(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Epochs ")
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(area);

        self.header_hits.clear();
        self.row_hits.clear();

        if self.has_error() {
            let content = vec![
                Line::from(""),
                Line::from(Span::styled(
                    "Error :(",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    "Press r to retry",
                    Style::default().fg(Color::DarkGray),
                )),
            ];
            let paragraph = Paragraph::new(content)
                .block(block)
                .alignment(Alignment::Center);
            frame.render_widget(paragraph, area);
            return;
        }

        let rows: Vec<Vec<String>> = self
            .epochs
            .ready()
            .map(|epochs| epochs.iter().map(Epoch::table_cells).collect())
            .unwrap_or_default();
        let widths = column_widths(&rows);
        let lines = build_table_lines(self, &widths);

        // Header cells
        let mut x = inner.x;
        for (field, width) in SortField::all().iter().zip(&widths) {
            let hit = Rect::new(x, inner.y, *width as u16, 1).intersection(inner);
            if !hit.is_empty() {
                self.header_hits.push((hit, *field));
            }
            x = x.saturating_add((*width + COLUMN_SEPARATOR.width()) as u16);
        }

        // Body rows start below header and separator
        let row_width = total_width(&widths) as u16;
        for row in 0..rows.len() {
            let y = inner.y.saturating_add(2 + row as u16);
            let hit = Rect::new(inner.x, y, row_width, 1).intersection(inner);
            if !hit.is_empty() {
                self.row_hits.push((hit, row));
            }
        }

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![
            Span::styled(
                format!(" {} ", self.endpoint_label),
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
        ];

        let count_text = match &self.count {
            Load::Loading => "counting…".to_string(),
            Load::Failed => "count unavailable".to_string(),
            Load::Ready(count) => format!(
                "{}{} epochs · page {} of {}{}",
                count.count,
                if count.capped { "+" } else { "" },
                self.state.page(),
                page_count(count.count),
                if count.capped { "+" } else { "" },
            ),
        };
        spans.push(Span::styled(count_text, Style::default().fg(Color::White)));

        let sort = self.state.sort();
        spans.push(Span::styled(
            format!("  sorted by {} {}", sort.field.label(), sort.direction.name()),
            Style::default().fg(Color::DarkGray),
        ));

        if self.epochs.is_loading() {
            spans.push(Span::styled("  loading…", Style::default().fg(Color::Yellow)));
        } else if let Some(updated) = self.last_updated {
            spans.push(Span::styled(
                format!("  updated {}", updated.format("%H:%M:%S")),
                Style::default().fg(Color::DarkGray),
            ));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_help_bar(&self, frame: &mut Frame, area: Rect) {
        let key = |k: &'static str, color: Color| {
            Span::styled(k, Style::default().fg(color).add_modifier(Modifier::BOLD))
        };

        let spans = if self.input_mode == InputMode::Search {
            vec![
                key(" Enter/Esc ", Color::Green),
                Span::raw("Done  "),
                key(" Backspace ", Color::Yellow),
                Span::raw("Delete  "),
                key(" Ctrl+U ", Color::Yellow),
                Span::raw("Clear"),
            ]
        } else {
            vec![
                key(" q ", Color::Yellow),
                Span::raw("Quit "),
                key(" / ", Color::Cyan),
                Span::raw("Search "),
                key(" 1-7 ", Color::Cyan),
                Span::raw("Sort "),
                key(" ←/→ ", Color::Green),
                Span::raw("Page "),
                key(" ↑/↓ ", Color::Green),
                Span::raw("Row "),
                key(" Enter ", Color::Green),
                Span::raw("Details "),
                key(" r ", Color::Magenta),
                Span::raw("Refresh "),
                key(" ? ", Color::White),
                Span::raw("Help"),
            ]
        };

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}
