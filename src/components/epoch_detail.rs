//! Epoch detail dialog component
//!
//! Shows every field of the selected epoch, with amounts at full precision.

use crate::action::Action;
use crate::component::Component;
use crate::components::centered_popup;
use crate::model::Epoch;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

const LABEL_WIDTH: usize = 25;

/// Epoch detail dialog component
#[derive(Default)]
pub struct EpochDetailDialog {
    /// Cached content lines
    content: Vec<Line<'static>>,
}

impl EpochDetailDialog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update content for the selected epoch
    pub fn set_epoch(&mut self, epoch: Option<&Epoch>) {
        self.content = match epoch {
            Some(epoch) => render_epoch(epoch),
            None => vec![
                Line::from(""),
                Line::from(Span::styled(
                    "No epoch selected",
                    Style::default().fg(Color::DarkGray),
                )),
            ],
        };
    }
}

impl Component for EpochDetailDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => Some(Action::CloseModal),
            _ => None,
        };
        Ok(action)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let height = self.content.len() as u16 + 5;
        let popup = centered_popup(area, 78, height);
        frame.render_widget(Clear, popup);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(popup);

        let paragraph = Paragraph::new(self.content.clone()).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Epoch ")
                .title_style(
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
        );
        frame.render_widget(paragraph, chunks[0]);

        let help = Paragraph::new(Line::from(vec![
            Span::styled(
                " Esc/Enter ",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("Close"),
        ]));
        frame.render_widget(help, chunks[1]);

        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helper functions
// ─────────────────────────────────────────────────────────────────────────────

fn field_line(label: &str, value: String, value_style: Style) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("  {:width$}", label, width = LABEL_WIDTH),
            Style::default().fg(Color::Yellow),
        ),
        Span::styled(value, value_style),
    ])
}

fn render_epoch(epoch: &Epoch) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let white = Style::default().fg(Color::White);

    lines.push(Line::from(""));
    lines.push(field_line("Id", epoch.id.clone(), white));
    lines.push(field_line("Start Block", epoch.start_block.to_string(), white));
    lines.push(field_line("End Block", epoch.end_block.to_string(), white));
    lines.push(Line::from(""));

    lines.push(Line::from(Span::styled(
        "  Amounts (tokens)",
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
    )));
    for (label, amount) in epoch.amounts() {
        let style = if amount.is_negative() {
            Style::default().fg(Color::Red)
        } else if amount.is_zero() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Cyan)
        };
        lines.push(field_line(label, amount.to_decimal_string(), style));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::epoch::tests::epoch_json;
    use crossterm::event::KeyModifiers;
    use serde_json::json;

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_render_epoch_shows_exact_amounts() {
        let mut value = epoch_json("7", 100, 2);
        value["totalRewards"] = json!("1500000000000000000");
        let epoch: Epoch = serde_json::from_value(value).unwrap();

        let text: Vec<String> = render_epoch(&epoch).iter().map(line_text).collect();
        assert!(text.iter().any(|l| l.contains("Id") && l.ends_with('7')));
        assert!(text.iter().any(|l| l.contains("End Block") && l.ends_with("6746")));
        assert!(text
            .iter()
            .any(|l| l.contains("Total Rewards") && l.ends_with("1.5")));
        // blank, 3 fields, blank, heading, 10 amounts
        assert_eq!(text.len(), 16);
    }

    #[test]
    fn test_without_epoch_shows_placeholder() {
        let mut dialog = EpochDetailDialog::new();
        dialog.set_epoch(None);
        assert!(dialog
            .content
            .iter()
            .any(|l| line_text(l) == "No epoch selected"));
    }

    #[test]
    fn test_close_keys() {
        let mut dialog = EpochDetailDialog::new();
        for code in [KeyCode::Esc, KeyCode::Enter, KeyCode::Char('q')] {
            let key = KeyEvent::new(code, KeyModifiers::NONE);
            assert_eq!(dialog.handle_key_event(key).unwrap(), Some(Action::CloseModal));
        }
        let key = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE);
        assert_eq!(dialog.handle_key_event(key).unwrap(), None);
    }
}
