use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::app::{App, View};
use crate::data::PageAction;
use crate::ui;

/// File written by the export key.
pub const EXPORT_FILE: &str = "watchdog_export.json";

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    match key.code {
        // Quit
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),

        // View switching
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.prev_view();
            } else {
                app.next_view();
            }
        }
        KeyCode::BackTab => app.prev_view(),
        KeyCode::Char('1') => app.set_view(View::Overview),
        KeyCode::Char('2') => app.set_view(View::Events),

        // Event log pages
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('p') | KeyCode::PageUp => {
            app.page(PageAction::Prev)
        }
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('n') | KeyCode::PageDown => {
            app.page(PageAction::Next)
        }
        KeyCode::Home => app.page(PageAction::First),
        KeyCode::End => app.page(PageAction::Last),

        // Refresh now (still skipped while a fetch is in flight)
        KeyCode::Char('r') => app.refresh_now(),

        // Help
        KeyCode::Char('?') => app.toggle_help(),

        // Export
        KeyCode::Char('e') => {
            let export_path = PathBuf::from(EXPORT_FILE);
            match app.export_state(&export_path) {
                Ok(()) => {
                    app.set_status_message(format!("Exported to {}", export_path.display()));
                }
                Err(e) => {
                    tracing::warn!("Export failed: {}", e);
                    app.set_status_message(format!("Export failed: {}", e));
                }
            }
        }

        _ => {}
    }
}

/// Handle mouse events
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        // Scroll wheel pages through the event log
        MouseEventKind::ScrollUp if app.current_view == View::Events => {
            app.page(PageAction::Prev);
        }
        MouseEventKind::ScrollDown if app.current_view == View::Events => {
            app.page(PageAction::Next);
        }

        // Tab clicks (row 1, after header)
        MouseEventKind::Down(MouseButton::Left) if mouse.row == 1 => {
            if let Some(view) = ui::common::tab_at(mouse.column) {
                app.set_view(view);
            }
        }

        _ => {}
    }
}
