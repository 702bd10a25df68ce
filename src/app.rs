//! Root application component
//!
//! The App struct implements the Component trait, acting as the root component
//! that routes input to the focused child and applies actions. It owns the
//! query client; the table only borrows it to issue requests.

use crate::action::Action;
use crate::component::Component;
use crate::components::{EpochDetailDialog, EpochTableComponent, HelpDialog};
use crate::model::modal::{Modal, ModalStack};
use crate::model::InputMode;
use crate::services::QueryClient;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent};
use ratatui::{layout::Rect, Frame};

// ═══════════════════════════════════════════════════════════════════════════════
// App State
// ═══════════════════════════════════════════════════════════════════════════════

pub struct App {
    /// Cached, background GraphQL execution
    client: QueryClient,

    /// Stack of open modals (top is active)
    pub modals: ModalStack,

    /// Flag to indicate the app should quit
    pub should_quit: bool,

    // ─────────────────────────────────────────────────────────────────────────
    // Child Components
    // ─────────────────────────────────────────────────────────────────────────
    pub table: EpochTableComponent,
    pub help_dialog: HelpDialog,
    pub detail_dialog: EpochDetailDialog,
}

impl App {
    pub fn new(client: QueryClient, endpoint_label: impl Into<String>) -> App {
        App {
            client,
            modals: ModalStack::new(),
            should_quit: false,
            table: EpochTableComponent::new(endpoint_label),
            help_dialog: HelpDialog::default(),
            detail_dialog: EpochDetailDialog::new(),
        }
    }

    /// Drain finished queries into the view
    fn poll_queries(&mut self) {
        if !self.client.poll() {
            return;
        }
        self.table.sync_results(&self.client);

        // Keep an open detail view in step with a refreshed page
        if let Some(Modal::EpochDetail { row }) = self.modals.top() {
            self.detail_dialog.set_epoch(self.table.epoch_at(*row));
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Component Implementation
// ═══════════════════════════════════════════════════════════════════════════════

impl Component for App {
    fn init(&mut self) -> Result<()> {
        tracing::debug!("issuing initial queries");
        self.table.issue_queries(&mut self.client)
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        if let Some(modal) = self.modals.top().cloned() {
            self.handle_modal_key_event(&modal, key)
        } else if self.table.input_mode == InputMode::Search {
            self.handle_search_key_event(key)
        } else {
            self.table.handle_key_event(key)
        }
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        if !self.modals.is_empty() {
            return Ok(None);
        }
        self.table.handle_mouse_event(mouse)
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            // ─────────────────────────────────────────────────────────────────
            // App Lifecycle
            // ─────────────────────────────────────────────────────────────────
            Action::Tick => self.poll_queries(),
            Action::Resize(_, _) => {}
            Action::Quit => {
                self.should_quit = true;
            }

            // ─────────────────────────────────────────────────────────────────
            // Table
            // ─────────────────────────────────────────────────────────────────
            Action::SortBy(field) => self.table.sort_by(field, &mut self.client)?,
            Action::NextPage => self.table.next_page(&mut self.client)?,
            Action::PrevPage => self.table.prev_page(&mut self.client)?,
            Action::FirstPage => self.table.first_page(&mut self.client)?,
            Action::LastPage => self.table.last_page(&mut self.client)?,
            Action::GoToPage(page) => self.table.go_to_page(page, &mut self.client)?,
            Action::NextRow => self.table.next_row(),
            Action::PrevRow => self.table.prev_row(),
            Action::SelectRow(row) => {
                // A second click on the highlighted row opens it
                if self.table.selected == Some(row) {
                    return Ok(Some(Action::OpenEpochDetail));
                }
                self.table.select_row(row);
            }
            Action::Refresh => {
                tracing::info!("refreshing epochs");
                self.table.refresh(&mut self.client)?;
            }

            // ─────────────────────────────────────────────────────────────────
            // Search
            // ─────────────────────────────────────────────────────────────────
            Action::EnterSearchMode => self.table.enter_search_mode(),
            Action::ExitSearchMode => self.table.exit_search_mode(),
            Action::SearchInput(c) => self.table.search_input(c, &mut self.client)?,
            Action::SearchBackspace => self.table.search_backspace(&mut self.client)?,
            Action::ClearSearch => self.table.clear_search(&mut self.client)?,

            // ─────────────────────────────────────────────────────────────────
            // Modals
            // ─────────────────────────────────────────────────────────────────
            Action::OpenHelp => {
                self.help_dialog.reset();
                self.modals.push(Modal::Help);
            }
            Action::OpenEpochDetail => {
                if let Some(row) = self.table.selected {
                    self.detail_dialog.set_epoch(self.table.selected_epoch());
                    self.modals.push(Modal::EpochDetail { row });
                }
            }
            Action::CloseModal => {
                self.modals.pop();
            }
        }

        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        self.table.draw(frame, area)?;

        // Draw modal overlay if active
        if let Some(modal) = self.modals.top().cloned() {
            self.draw_modal(frame, area, &modal)?;
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Helper Methods
// ═══════════════════════════════════════════════════════════════════════════════

impl App {
    fn handle_modal_key_event(&mut self, modal: &Modal, key: KeyEvent) -> Result<Option<Action>> {
        match modal {
            Modal::Help => self.help_dialog.handle_key_event(key),
            Modal::EpochDetail { .. } => self.detail_dialog.handle_key_event(key),
        }
    }

    fn handle_search_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Esc | KeyCode::Enter => Some(Action::ExitSearchMode),
            KeyCode::Backspace => Some(Action::SearchBackspace),
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Action::ClearSearch)
            }
            // Chords like Alt+x are not text
            KeyCode::Char(c) if key.modifiers.difference(KeyModifiers::SHIFT).is_empty() => {
                Some(Action::SearchInput(c))
            }
            _ => None,
        };
        Ok(action)
    }

    fn draw_modal(&mut self, frame: &mut Frame, area: Rect, modal: &Modal) -> Result<()> {
        match modal {
            Modal::Help => self.help_dialog.draw(frame, area),
            Modal::EpochDetail { .. } => self.detail_dialog.draw(frame, area),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::epoch::tests::epoch_json;
    use crate::services::epochs::EPOCH_COUNT_QUERY;
    use crate::services::graphql::testing::{settle, FakeTransport};
    use crossterm::event::{MouseButton, MouseEventKind};
    use serde_json::{json, Value};

    fn app_with_epochs(total: u64) -> (App, std::sync::Arc<FakeTransport>) {
        let transport = FakeTransport::new(move |req| {
            if req.query == EPOCH_COUNT_QUERY {
                let ids: Vec<Value> = (1..=total).map(|i| json!({ "id": i.to_string() })).collect();
                return Ok(json!({ "epoches": ids }));
            }
            let skip = req.variables["skip"].as_u64().unwrap_or(0);
            let epochs: Vec<Value> = (skip + 1..=total)
                .take(10)
                .map(|i| epoch_json(&i.to_string(), i * 100, i))
                .collect();
            Ok(json!({ "epoches": epochs }))
        });
        let mut app = App::new(QueryClient::new(transport.clone()), "example.com");
        app.init().unwrap();
        settle_app(&mut app);
        (app, transport)
    }

    /// Wait for queries and apply them; settle drains the channel itself,
    /// so a Tick afterwards would see nothing new
    fn settle_app(app: &mut App) {
        settle(&mut app.client);
        app.table.sync_results(&app.client);
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    /// Feed an event's action and its follow-ups through update
    fn dispatch(app: &mut App, action: Option<Action>) {
        let mut current = action;
        while let Some(a) = current {
            current = app.update(a).unwrap();
        }
    }

    fn press(app: &mut App, code: KeyCode) {
        let action = app.handle_key_event(key(code)).unwrap();
        dispatch(app, action);
    }

    #[test]
    fn test_init_loads_first_page() {
        let (app, transport) = app_with_epochs(12);
        assert_eq!(app.table.epochs.ready().map(Vec::len), Some(10));
        assert_eq!(app.table.page_limit(), Some(2));
        assert_eq!(transport.request_count(), 2);
    }

    #[test]
    fn test_ctrl_c_quits_from_search_mode() {
        let (mut app, _) = app_with_epochs(1);
        press(&mut app, KeyCode::Char('/'));
        assert_eq!(app.table.input_mode, InputMode::Search);

        let action = app
            .handle_key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL))
            .unwrap();
        assert_eq!(action, Some(Action::Quit));
    }

    #[test]
    fn test_search_mode_captures_characters() {
        let (mut app, _) = app_with_epochs(3);
        press(&mut app, KeyCode::Char('/'));
        press(&mut app, KeyCode::Char('2'));
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit);
        assert_eq!(app.table.state.search(), "2q");

        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Char('0'));
        press(&mut app, KeyCode::Char('0'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.table.input_mode, InputMode::Normal);
        assert_eq!(app.table.state.start_block_filter(), Some(200));

        let action = app
            .handle_key_event(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL))
            .unwrap();
        assert_eq!(action, None);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.table.state.search(), "");
    }

    #[test]
    fn test_search_mode_ignores_modified_characters() {
        let (mut app, _) = app_with_epochs(3);
        press(&mut app, KeyCode::Char('/'));

        for modifiers in [KeyModifiers::ALT, KeyModifiers::CONTROL | KeyModifiers::SHIFT] {
            let action = app
                .handle_key_event(KeyEvent::new(KeyCode::Char('x'), modifiers))
                .unwrap();
            assert_eq!(action, None);
        }

        let action = app
            .handle_key_event(KeyEvent::new(KeyCode::Char('X'), KeyModifiers::SHIFT))
            .unwrap();
        assert_eq!(action, Some(Action::SearchInput('X')));
        dispatch(&mut app, action);
        assert_eq!(app.table.state.search(), "X");
    }

    #[test]
    fn test_tick_applies_results_that_arrive_later() {
        let (mut app, _) = app_with_epochs(3);
        press(&mut app, KeyCode::Char('r'));
        assert!(app.table.epochs.is_loading());

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while app.table.epochs.is_loading() || app.table.count.is_loading() {
            app.update(Action::Tick).unwrap();
            assert!(std::time::Instant::now() < deadline, "tick never applied results");
            std::thread::sleep(std::time::Duration::from_millis(2));
        }
        assert_eq!(app.table.epochs.ready().map(Vec::len), Some(3));
    }

    #[test]
    fn test_help_modal_takes_input_until_closed() {
        let (mut app, _) = app_with_epochs(3);
        press(&mut app, KeyCode::Char('?'));
        assert_eq!(app.modals.top(), Some(&Modal::Help));

        press(&mut app, KeyCode::Char('q'));
        assert!(app.modals.is_empty());
        assert!(!app.should_quit);

        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_enter_opens_selected_epoch() {
        let (mut app, _) = app_with_epochs(3);
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.modals.top(), Some(&Modal::EpochDetail { row: 1 }));
        assert_eq!(app.table.selected_epoch().map(|e| e.id.as_str()), Some("2"));

        press(&mut app, KeyCode::Esc);
        assert!(app.modals.is_empty());
    }

    #[test]
    fn test_second_click_on_row_opens_detail() {
        let (mut app, _) = app_with_epochs(3);
        dispatch(&mut app, Some(Action::SelectRow(2)));
        assert_eq!(app.table.selected, Some(2));
        assert!(app.modals.is_empty());

        dispatch(&mut app, Some(Action::SelectRow(2)));
        assert_eq!(app.modals.top(), Some(&Modal::EpochDetail { row: 2 }));

        // Table ignores the mouse under a modal
        let scroll = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(app.handle_mouse_event(scroll).unwrap(), None);
    }

    #[test]
    fn test_refresh_refetches_both_queries() {
        let (mut app, transport) = app_with_epochs(3);
        press(&mut app, KeyCode::Char('r'));
        assert!(app.table.epochs.is_loading());
        settle_app(&mut app);

        assert_eq!(transport.request_count(), 4);
        assert_eq!(app.table.epochs.ready().map(Vec::len), Some(3));
    }

    #[test]
    fn test_paging_keys() {
        let (mut app, _) = app_with_epochs(25);
        press(&mut app, KeyCode::Right);
        assert_eq!(app.table.state.page(), 2);
        press(&mut app, KeyCode::End);
        assert_eq!(app.table.state.page(), 3);
        press(&mut app, KeyCode::Char('h'));
        assert_eq!(app.table.state.page(), 2);
        press(&mut app, KeyCode::Home);
        assert_eq!(app.table.state.page(), 1);
    }
}
