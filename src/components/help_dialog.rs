//! Help dialog component
//!
//! Lists the keyboard and mouse shortcuts, grouped by what they act on.

use crate::action::Action;
use crate::component::Component;
use crate::components::centered_popup;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

const KEY_WIDTH: usize = 14;
const DIALOG_WIDTH: u16 = 60;
const PAGE_STEP: isize = 10;

/// Section title and its `(keys, description)` rows
const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Rows",
        &[
            ("j / ↓", "Select next row"),
            ("k / ↑", "Select previous row"),
            ("Enter", "Show epoch details"),
            ("Click", "Select row, again for details"),
        ],
    ),
    (
        "Sorting",
        &[
            ("1-7", "Sort by column"),
            ("s", "Sort by next column"),
            ("S", "Toggle sort direction"),
            ("Click", "Sort by header, again to reverse"),
        ],
    ),
    (
        "Pages",
        &[
            ("l / → / n", "Next page"),
            ("h / ← / p", "Previous page"),
            ("g / Home", "First page"),
            ("G / End", "Last page"),
            ("Click", "Go to page"),
        ],
    ),
    (
        "Search",
        &[
            ("/", "Search by start block"),
            ("Esc / Enter", "Leave search mode"),
            ("Ctrl+u", "Clear search"),
            ("Esc", "Clear search outside search mode"),
        ],
    ),
    (
        "General",
        &[
            ("r", "Refresh from the endpoint"),
            ("?", "Show this help"),
            ("q", "Quit, or close a dialog"),
            ("Ctrl+c", "Quit"),
        ],
    ),
];

fn help_lines() -> Vec<Line<'static>> {
    let heading = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
    let key_style = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);

    SECTIONS
        .iter()
        .flat_map(|(title, rows)| {
            let header = [
                Line::from(""),
                Line::from(vec![Span::raw("  "), Span::styled(*title, heading)]),
            ];
            let rows = rows.iter().map(move |(keys, description)| {
                Line::from(vec![
                    Span::styled(format!("  {:width$}", keys, width = KEY_WIDTH), key_style),
                    Span::raw(*description),
                ])
            });
            header.into_iter().chain(rows)
        })
        .collect()
}

/// Help dialog showing all shortcuts
#[derive(Default)]
pub struct HelpDialog {
    scroll_offset: usize,
    /// Known after the first draw
    max_scroll: Option<usize>,
}

impl HelpDialog {
    /// Back to the top, for a freshly opened dialog
    pub fn reset(&mut self) {
        self.scroll_offset = 0;
    }

    fn scroll_by(&mut self, delta: isize) {
        let offset = self.scroll_offset.saturating_add_signed(delta);
        self.scroll_offset = match self.max_scroll {
            Some(max) => offset.min(max),
            None => offset,
        };
    }
}

impl Component for HelpDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
                return Ok(Some(Action::CloseModal))
            }
            KeyCode::Char('j') | KeyCode::Down => self.scroll_by(1),
            KeyCode::Char('k') | KeyCode::Up => self.scroll_by(-1),
            KeyCode::PageDown => self.scroll_by(PAGE_STEP),
            KeyCode::PageUp => self.scroll_by(-PAGE_STEP),
            KeyCode::Home => self.scroll_offset = 0,
            _ => {}
        }
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let lines = help_lines();
        let total = lines.len();

        // Borders plus the footer row
        let wanted = total as u16 + 3;
        let popup = centered_popup(area, DIALOG_WIDTH, wanted.min(area.height.saturating_sub(2)));
        frame.render_widget(Clear, popup);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(popup);

        let visible = chunks[0].height.saturating_sub(2) as usize;
        let max_scroll = total.saturating_sub(visible);
        self.max_scroll = Some(max_scroll);
        self.scroll_offset = self.scroll_offset.min(max_scroll);

        let paragraph = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan))
                    .title(" Keyboard Shortcuts ")
                    .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            )
            .scroll((self.scroll_offset as u16, 0));
        frame.render_widget(paragraph, chunks[0]);

        let mut footer = vec![
            Span::styled(
                " q/Esc/? ",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::raw("Close"),
        ];
        if max_scroll > 0 {
            let last = (self.scroll_offset + visible).min(total);
            footer.push(Span::styled(
                format!("  j/k scroll  {}-{} of {}", self.scroll_offset + 1, last, total),
                Style::default().fg(Color::DarkGray),
            ));
        }
        frame.render_widget(Paragraph::new(Line::from(footer)), chunks[1]);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use ratatui::{backend::TestBackend, Terminal};

    fn press(dialog: &mut HelpDialog, code: KeyCode) -> Option<Action> {
        dialog
            .handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap()
    }

    fn draw(dialog: &mut HelpDialog, width: u16, height: u16) {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal
            .draw(|frame| {
                dialog.draw(frame, frame.area()).unwrap();
            })
            .unwrap();
    }

    #[test]
    fn test_close_keys() {
        let mut dialog = HelpDialog::default();
        assert_eq!(press(&mut dialog, KeyCode::Char('?')), Some(Action::CloseModal));
        assert_eq!(press(&mut dialog, KeyCode::Esc), Some(Action::CloseModal));
        assert_eq!(press(&mut dialog, KeyCode::Char('x')), None);
    }

    #[test]
    fn test_every_section_is_listed() {
        let text: Vec<String> = help_lines()
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect();
        for (title, rows) in SECTIONS {
            assert!(text.iter().any(|l| l.trim() == *title));
            assert!(rows
                .iter()
                .all(|(_, description)| text.iter().any(|l| l.ends_with(*description))));
        }
    }

    #[test]
    fn test_scroll_is_clamped_on_draw() {
        let mut dialog = HelpDialog::default();
        for _ in 0..5 {
            press(&mut dialog, KeyCode::PageDown);
        }
        assert_eq!(dialog.scroll_offset, 50);

        // 28 row popup: 27 for the bordered list, 25 inside the borders
        draw(&mut dialog, 80, 30);
        let max_scroll = help_lines().len() - 25;
        assert_eq!(dialog.scroll_offset, max_scroll);

        // Clamped right away once the size is known
        press(&mut dialog, KeyCode::PageDown);
        assert_eq!(dialog.scroll_offset, max_scroll);
        press(&mut dialog, KeyCode::Up);
        assert_eq!(dialog.scroll_offset, max_scroll - 1);

        press(&mut dialog, KeyCode::Home);
        assert_eq!(dialog.scroll_offset, 0);
        press(&mut dialog, KeyCode::PageUp);
        assert_eq!(dialog.scroll_offset, 0);
    }

    #[test]
    fn test_tall_terminal_does_not_scroll() {
        let mut dialog = HelpDialog::default();
        draw(&mut dialog, 80, 60);
        press(&mut dialog, KeyCode::Char('j'));
        assert_eq!(dialog.scroll_offset, 0);
    }
}
