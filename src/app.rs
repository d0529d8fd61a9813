//! Application state and navigation logic.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::data::export::write_export;
use crate::data::{Action, DashboardState, PageAction};
use crate::scheduler::RefreshHandle;
use crate::ui::Theme;

/// How long a status message stays in the status bar.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// The current view/tab in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Status card, stats row and latency chart.
    Overview,
    /// Paginated event log.
    Events,
}

impl View {
    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Overview => View::Events,
            View::Events => View::Overview,
        }
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        // Two views: previous and next coincide.
        self.next()
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Overview => "Overview",
            View::Events => "Events",
        }
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,

    pub state: DashboardState,
    refresh: RefreshHandle,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App fed by a running refresh loop.
    pub fn new(refresh: RefreshHandle, page_size: usize) -> Self {
        Self::with_theme(refresh, page_size, Theme::auto_detect())
    }

    /// Create a new App with an explicit theme.
    pub fn with_theme(refresh: RefreshHandle, page_size: usize, theme: Theme) -> Self {
        Self {
            running: true,
            current_view: View::Overview,
            show_help: false,
            state: DashboardState::new(page_size),
            refresh,
            theme,
            status_message: None,
        }
    }

    /// Returns a description of the current data source.
    pub fn source_description(&self) -> &str {
        self.refresh.description()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < STATUS_MESSAGE_TTL {
                return Some(msg);
            }
        }
        None
    }

    /// Apply every refresh result that has arrived since the last call.
    ///
    /// Returns the number of results applied.
    pub fn poll_refresh(&mut self) -> usize {
        let mut applied = 0;
        while let Some(event) = self.refresh.try_next() {
            self.state.apply(Action::from(event));
            applied += 1;
        }
        applied
    }

    /// Ask the refresh loop for an immediate fetch.
    pub fn refresh_now(&mut self) {
        self.refresh.refresh_now();
        self.set_status_message("Refreshing...".to_string());
    }

    /// Switch to the next view.
    pub fn next_view(&mut self) {
        self.current_view = self.current_view.next();
    }

    /// Switch to the previous view.
    pub fn prev_view(&mut self) {
        self.current_view = self.current_view.prev();
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
    }

    /// Navigate the event log.
    pub fn page(&mut self, action: PageAction) {
        self.state.apply(Action::Page(action));
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export current state to a file.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        if self.state.history().is_empty() {
            anyhow::bail!("No data to export");
        }
        write_export(path, &self.state, self.source_description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::RefreshScheduler;
    use crate::source::{ChannelSource, Sample};
    use std::sync::Arc;
    use tokio::sync::watch;

    fn sample(ts: &str, status: &str) -> Sample {
        Sample {
            timestamp: Some(ts.into()),
            status: Some(status.into()),
            latency: Some("25".into()),
            ..Default::default()
        }
    }

    fn app() -> (watch::Sender<Vec<Sample>>, App) {
        let (tx, source) = ChannelSource::create("test");
        let handle = RefreshScheduler::new(
            Arc::new(source),
            Duration::from_secs(10),
            Duration::from_secs(5),
        )
        .start();
        (tx, App::with_theme(handle, 2, Theme::dark()))
    }

    /// Let the refresh loop run until `n` results have been applied.
    async fn settle(app: &mut App, n: usize) {
        let mut applied = 0;
        while applied < n {
            tokio::time::sleep(Duration::from_millis(10)).await;
            applied += app.poll_refresh();
        }
    }

    #[test]
    fn test_view_cycle() {
        assert_eq!(View::Overview.next(), View::Events);
        assert_eq!(View::Events.next(), View::Overview);
        assert_eq!(View::Overview.prev(), View::Events);
        assert_eq!(View::Events.label(), "Events");
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_refresh_applies_events() {
        let (tx, mut app) = app();
        tx.send(vec![
            sample("2025-03-01T10:00:00Z", "UP"),
            sample("2025-03-01T10:00:30Z", "DOWN"),
        ])
        .unwrap();

        settle(&mut app, 1).await;
        assert_eq!(app.state.history().len(), 2);
        assert_eq!(app.state.current_status().as_str(), "DOWN");
        assert_eq!(app.source_description(), "channel: test");
    }

    #[tokio::test(start_paused = true)]
    async fn test_paging_and_refresh_now() {
        let (tx, mut app) = app();
        tx.send(vec![sample("2025-03-01T10:00:00Z", "UP")]).unwrap();
        settle(&mut app, 1).await;

        tx.send(
            (0..5)
                .map(|i| sample(&format!("2025-03-01T10:0{}:00Z", i), "UP"))
                .collect(),
        )
        .unwrap();
        app.refresh_now();
        assert_eq!(app.get_status_message(), Some("Refreshing..."));
        settle(&mut app, 1).await;
        assert_eq!(app.state.history().len(), 5);

        app.page(PageAction::Last);
        assert_eq!(app.state.pagination().current_page(), 3);
        app.page(PageAction::Next);
        assert_eq!(app.state.pagination().current_page(), 3);
        app.page(PageAction::First);
        assert_eq!(app.state.pagination().current_page(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_export_requires_data() {
        let (tx, mut app) = app();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");

        assert!(app.export_state(&path).is_err());

        tx.send(vec![sample("2025-03-01T10:00:00Z", "UP")]).unwrap();
        settle(&mut app, 1).await;
        app.export_state(&path).unwrap();
        assert!(path.exists());
    }
}
