//! epoch-tui - A terminal UI for browsing network epochs
//!
//! Reads the subgraph endpoint from `NETWORK_HTTP_URI` and shows a sortable,
//! searchable, paginated table of epochs. It uses the Component Architecture
//! pattern from ratatui.

mod action;
mod app;
mod component;
mod components;
mod config;
mod logging;
mod model;
mod services;
mod tui;

use crate::action::Action;
use crate::app::App;
use crate::component::Component;
use crate::config::Config;
use crate::services::{HttpTransport, QueryClient};
use crate::tui::Tui;
use anyhow::Result;
use crossterm::event::Event;
use std::sync::Arc;
use std::time::Duration;

fn main() -> Result<()> {
    // Fail before touching the terminal so the message stays readable
    let config = Config::from_env()?;

    if let Err(err) = logging::init() {
        eprintln!("Warning: logging disabled: {:#}", err);
    }
    tracing::info!(endpoint = %config.endpoint, "starting epoch-tui");

    let client = QueryClient::new(Arc::new(HttpTransport::new(config.endpoint.clone())));
    let mut app = App::new(client, config.endpoint_label());

    // Setup terminal
    let mut tui = Tui::new(Duration::from_millis(100))?;
    tui.enter()?;

    let result = app.init().and_then(|_| run_app(&mut tui, &mut app));

    // Cleanup terminal
    tui.exit()?;

    if let Err(err) = result {
        tracing::error!(error = ?err, "exiting after error");
        eprintln!("Error: {:?}", err);
        std::process::exit(1);
    }

    tracing::info!("bye");
    Ok(())
}

/// Run the main application loop
fn run_app(tui: &mut Tui, app: &mut App) -> Result<()> {
    while !app.should_quit {
        let mut draw_result = Ok(());
        tui.draw(|frame| {
            draw_result = app.draw(frame, frame.area());
        })?;
        draw_result?;

        // Poll for events
        let action = match tui.poll_event()? {
            Some(Event::Key(key)) => app.handle_key_event(key)?,
            Some(Event::Mouse(mouse)) => app.handle_mouse_event(mouse)?,
            Some(Event::Resize(w, h)) => Some(Action::Resize(w, h)),
            Some(_) => None,
            // No event - send a tick for time-based updates
            None => Some(Action::Tick),
        };

        // Action might produce a follow-up action
        let mut current_action = action;
        while let Some(a) = current_action {
            current_action = app.update(a)?;
        }

        // Results can land while input keeps arriving
        app.update(Action::Tick)?;
    }

    Ok(())
}
