//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use chrono::Local;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};

/// Render the header bar with the current connection status.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = Span::styled(" WATCHDOG ", Style::default().add_modifier(Modifier::BOLD));

    if app.state.history().is_empty() {
        let line = Line::from(vec![
            Span::styled(" ● ", Style::default().add_modifier(Modifier::DIM)),
            title,
            Span::raw("│ Waiting for data..."),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let status = app.state.current_status();
    let status_style = app.theme.status_style(&status);
    let stats = app.state.stats();

    let line = Line::from(vec![
        Span::styled(" ● ", status_style),
        title,
        Span::raw("│ "),
        Span::styled(status.to_string(), status_style),
        Span::raw(" │ "),
        Span::styled(
            format!("{}", stats.samples),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" samples │ "),
        if stats.down_samples > 0 {
            Span::styled(
                format!("{}", stats.down_samples),
                Style::default().fg(app.theme.down),
            )
        } else {
            Span::styled("0", Style::default().add_modifier(Modifier::DIM))
        },
        Span::raw(" down"),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Tab titles in display order.
const TABS: [(View, &str); 2] = [(View::Overview, " 1:Overview "), (View::Events, " 2:Events ")];
const TAB_DIVIDER: &str = "|";

/// The view whose tab covers `column` of the tab bar, if any.
pub fn tab_at(column: u16) -> Option<View> {
    let divider = Line::from(TAB_DIVIDER).width() as u16;
    let mut start = 0u16;
    for (view, title) in TABS {
        // Tabs pads every title with one cell on each side
        let end = start + Line::from(title).width() as u16 + 2;
        if column < end {
            return Some(view);
        }
        start = end + divider;
    }
    None
}

/// Render the tab bar showing available views.
///
/// Highlights the currently active view.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = TABS.iter().map(|(_, title)| Line::from(*title)).collect();
    let selected = TABS
        .iter()
        .position(|(view, _)| *view == app.current_view)
        .unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider(TAB_DIVIDER);

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows: source, time of the last successful refresh, last fetch error and
/// available controls. Temporary status messages take precedence.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    // Check for temporary status message first
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let controls = match app.current_view {
        View::Overview => "Tab:switch r:refresh e:export ?:help q:quit",
        View::Events => "←/→:page Home/End Tab:switch r:refresh ?:help q:quit",
    };

    let updated = match app.state.last_updated() {
        Some(at) => format!("Updated {}", at.with_timezone(&Local).format("%H:%M:%S")),
        None => "Loading...".to_string(),
    };

    let mut spans = vec![Span::raw(format!(
        " {} | {} | ",
        app.source_description(),
        updated
    ))];
    if let Some(err) = app.state.last_error() {
        spans.push(Span::styled(
            format!("Error: {} | ", err),
            Style::default().fg(app.theme.down),
        ));
    }
    spans.push(Span::raw(controls));

    let paragraph =
        Paragraph::new(Line::from(spans)).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Views",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  Tab / 1 / 2   Switch views"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Event log",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  ←/→ h/l p/n   Previous/next page"),
        Line::from("  Home/End      First/last page"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " General",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  r             Refresh now"),
        Line::from("  e             Export to JSON"),
        Line::from("  q             Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    // Center the help overlay - responsive to terminal size
    let help_width = 42u16.min(area.width.saturating_sub(4));
    let help_height = 19u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    // Clear the area behind the help
    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
