//! Event log rendering.
//!
//! Displays one page of the connection history, newest first, with the
//! page-number bar underneath.

use chrono::Local;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::app::App;
use crate::data::{CanonicalEntry, PageControls, PageItem};

/// Render the Events view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let controls = app.state.page_controls();
    let chunks = if controls.is_visible() {
        Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).split(area)
    } else {
        Layout::vertical([Constraint::Min(3)]).split(area)
    };

    render_table(frame, app, chunks[0]);
    if let Some(bar) = chunks.get(1) {
        render_controls(frame, app, &controls, *bar);
    }
}

fn render_table(frame: &mut Frame, app: &App, area: Rect) {
    let page = app.state.page();

    let header = Row::new(vec![
        Cell::from("Time"),
        Cell::from("Status"),
        Cell::from("Latency"),
        Cell::from("Message"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = page.entries.iter().map(|e| entry_row(app, e)).collect();

    let widths = [
        Constraint::Length(19), // Time
        Constraint::Length(8),  // Status
        Constraint::Length(9),  // Latency
        Constraint::Fill(1),    // Message
    ];

    let title = if page.total == 0 {
        " Events ".to_string()
    } else {
        format!(
            " Events (Showing {}-{} of {}) [page {}/{}] ",
            page.first, page.last, page.total, page.page, page.total_pages
        )
    };

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border)),
    );

    frame.render_widget(table, area);
}

fn entry_row<'a>(app: &App, entry: &CanonicalEntry) -> Row<'a> {
    Row::new(vec![
        Cell::from(
            entry
                .timestamp
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
        ),
        Cell::from(entry.status.to_string()).style(app.theme.status_style(&entry.status)),
        Cell::from(latency_cell(entry)),
        Cell::from(entry.message.clone()),
    ])
}

/// Latency only means something for an UP sample.
fn latency_cell(entry: &CanonicalEntry) -> String {
    if entry.status.is_up() {
        format!("{} ms", entry.latency_ms)
    } else {
        "-".to_string()
    }
}

fn render_controls(frame: &mut Frame, app: &App, controls: &PageControls, area: Rect) {
    let current = app.state.pagination().current_page();
    let enabled = Style::default().fg(app.theme.highlight);
    let disabled = Style::default().add_modifier(Modifier::DIM);

    let mut spans = vec![Span::styled(
        " ‹ Prev ",
        if controls.has_prev { enabled } else { disabled },
    )];

    for item in &controls.items {
        match item {
            PageItem::Page(n) if *n == current => {
                spans.push(Span::styled(format!("[{}]", n), app.theme.tab_active));
            }
            PageItem::Page(n) => spans.push(Span::raw(format!(" {} ", n))),
            PageItem::Ellipsis => spans.push(Span::styled(" … ", disabled)),
        }
    }

    spans.push(Span::styled(
        " Next › ",
        if controls.has_next { enabled } else { disabled },
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::normalize_sample;
    use crate::source::Sample;

    #[test]
    fn test_latency_cell() {
        let up = normalize_sample(&Sample {
            status: Some("UP".into()),
            latency: Some("42".into()),
            ..Default::default()
        });
        assert_eq!(latency_cell(&up), "42 ms");

        let down = normalize_sample(&Sample {
            status: Some("DOWN".into()),
            latency: Some("-1".into()),
            ..Default::default()
        });
        assert_eq!(latency_cell(&down), "-");
    }
}
