//! Overview rendering.
//!
//! Shows the status card, a row of latency and uptime stats, and the
//! latency chart with outage markers.

use chrono::{DateTime, Local, Utc};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::duration::format_elapsed;
use crate::data::{LatencySeries, Stats, Status};

/// Render the Overview view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::vertical([
        Constraint::Length(5), // Status card
        Constraint::Length(3), // Stats row
        Constraint::Min(6),    // Latency chart
    ])
    .split(area);

    render_status_card(frame, app, chunks[0]);
    render_stats(frame, app, &app.state.stats(), chunks[1]);
    render_chart(frame, app, &app.state.latency_series(), chunks[2]);
}

fn bordered<'a>(app: &App, title: &'a str) -> Block<'a> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border))
}

fn render_status_card(frame: &mut Frame, app: &App, area: Rect) {
    let status = app.state.current_status();
    let style = app.theme.status_style(&status).add_modifier(Modifier::BOLD);

    let since = app
        .state
        .status_window()
        .map(|w| format!("for {}", format_elapsed(w.elapsed(Utc::now()))))
        .unwrap_or_default();

    let duration = match (app.state.current_duration_label(), &status) {
        (Some(label), Status::Up) => format!("Uptime {}", label),
        (Some(label), _) => format!("Downtime {}", label),
        (None, _) => String::new(),
    };

    let message = app
        .state
        .history()
        .latest()
        .map(|e| e.message.as_str())
        .unwrap_or("");

    let lines = vec![
        Line::from(vec![
            Span::styled(format!(" {} ", status), style),
            Span::raw(" "),
            Span::raw(since),
        ]),
        Line::from(Span::raw(format!(" {}", duration))),
        Line::from(Span::styled(
            format!(" {}", message),
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];

    frame.render_widget(Paragraph::new(lines).block(bordered(app, " Connection ")), area);
}

fn render_stats(frame: &mut Frame, app: &App, stats: &Stats, area: Rect) {
    let cells = [
        (" Avg ", format!("{} ms", stats.avg_latency_ms)),
        (" Max ", format!("{} ms", stats.max_latency_ms)),
        (" Last ", format!("{} ms", stats.last_latency_ms)),
        (" Uptime ", stats.uptime.clone()),
        (" Downtime ", stats.downtime.clone()),
        (" Changes ", stats.changes.to_string()),
    ];

    let columns = Layout::horizontal([Constraint::Ratio(1, 6); 6]).split(area);

    for ((title, value), column) in cells.into_iter().zip(columns.iter()) {
        let paragraph = Paragraph::new(value)
            .alignment(Alignment::Center)
            .block(bordered(app, title));
        frame.render_widget(paragraph, *column);
    }
}

/// Local wall-clock label for an x position of the series.
fn time_label(origin: Option<DateTime<Utc>>, x: f64) -> String {
    origin
        .map(|o| o + chrono::Duration::milliseconds((x * 1000.0) as i64))
        .map(|t| t.with_timezone(&Local).format("%H:%M:%S").to_string())
        .unwrap_or_default()
}

fn render_chart(frame: &mut Frame, app: &App, series: &LatencySeries, area: Rect) {
    let block = bordered(app, " Latency (ms) ");

    if series.is_empty() {
        let paragraph = Paragraph::new("No samples yet")
            .alignment(Alignment::Center)
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let mut datasets = vec![Dataset::default()
        .name("latency")
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(app.theme.latency))
        .data(&series.points)];

    if !series.outages.is_empty() {
        datasets.push(
            Dataset::default()
                .name("down")
                .marker(symbols::Marker::Dot)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(app.theme.down))
                .data(&series.outages),
        );
    }

    let [x_min, x_max] = series.x_bounds;
    let [y_min, y_max] = series.y_bounds;

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .style(Style::default().fg(app.theme.border))
                .bounds(series.x_bounds)
                .labels(vec![
                    Line::from(time_label(series.origin, x_min)),
                    Line::from(time_label(series.origin, x_max)),
                ]),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(app.theme.border))
                .bounds(series.y_bounds)
                .labels(vec![
                    Line::from(format!("{:.0}", y_min)),
                    Line::from(format!("{:.0}", y_max)),
                ]),
        );

    frame.render_widget(chart, area);
}
