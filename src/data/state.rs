//! Dashboard view state and its update operations.
//!
//! All mutable view state lives in [`DashboardState`]. It changes only
//! through [`Action`]s, each applied by the pure [`DashboardState::reduce`].
//! Refresh results carry the generation of the fetch that produced them so a
//! late result from a superseded fetch can never overwrite newer data.

use chrono::{DateTime, Utc};

use super::history::ConnectionHistory;
use super::normalize::{CanonicalEntry, Status};
use super::pagination::{PageAction, PageControls, PageView, Pagination};
use super::series::LatencySeries;
use super::stats::Stats;
use super::status::{current_status, StatusWindow};

/// An update to the dashboard state.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// A fetch succeeded with a normalized history.
    Refreshed {
        generation: u64,
        at: DateTime<Utc>,
        entries: Vec<CanonicalEntry>,
    },
    /// A fetch succeeded but the source had nothing yet.
    NotReady { generation: u64 },
    /// A fetch failed.
    Failed { generation: u64, error: String },
    /// The user navigated the event log.
    Page(PageAction),
}

/// Process-wide dashboard state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardState {
    history: ConnectionHistory,
    status_window: Option<StatusWindow>,
    pagination: Pagination,
    last_updated: Option<DateTime<Utc>>,
    last_error: Option<String>,
    generation: u64,
}

impl DashboardState {
    pub fn new(page_size: usize) -> Self {
        Self {
            pagination: Pagination::new(page_size),
            ..Default::default()
        }
    }

    /// Apply an action, returning the next state.
    pub fn reduce(mut self, action: Action) -> Self {
        match action {
            Action::Refreshed {
                generation,
                at,
                entries,
            } => {
                if !self.accept(generation) || entries.is_empty() {
                    return self;
                }
                self.history.replace(entries);
                self.status_window =
                    StatusWindow::observe(self.status_window.as_ref(), &self.history, at);
                self.last_updated = Some(at);
                self.last_error = None;
                self.pagination.clamp(self.history.len());
            }
            Action::NotReady { generation } => {
                self.accept(generation);
            }
            Action::Failed { generation, error } => {
                if self.accept(generation) {
                    self.last_error = Some(error);
                }
            }
            Action::Page(page) => {
                self.pagination.apply(page, self.history.len());
            }
        }
        self
    }

    /// Apply an action in place.
    pub fn apply(&mut self, action: Action) {
        *self = std::mem::take(self).reduce(action);
    }

    /// Record `generation` as applied if it is newer than the last one.
    fn accept(&mut self, generation: u64) -> bool {
        if generation <= self.generation {
            return false;
        }
        self.generation = generation;
        true
    }

    pub fn history(&self) -> &ConnectionHistory {
        &self.history
    }

    pub fn status_window(&self) -> Option<&StatusWindow> {
        self.status_window.as_ref()
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    /// Time of the last successful, non-empty refresh.
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    /// Error of the most recent fetch, cleared by the next success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn current_status(&self) -> Status {
        current_status(&self.history)
    }

    /// Uptime label while UP, downtime label otherwise.
    pub fn current_duration_label(&self) -> Option<&str> {
        self.history.latest().map(CanonicalEntry::duration_label)
    }

    pub fn stats(&self) -> Stats {
        Stats::from_history(&self.history)
    }

    pub fn page(&self) -> PageView<'_> {
        self.pagination.view(&self.history)
    }

    pub fn page_controls(&self) -> PageControls {
        self.pagination.controls(self.history.len())
    }

    pub fn latency_series(&self) -> LatencySeries {
        LatencySeries::from_history(&self.history)
    }
}
