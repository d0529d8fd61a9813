//! Current status and the window it has held for.

use chrono::{DateTime, Utc};

use super::history::ConnectionHistory;
use super::normalize::{CanonicalEntry, Status};

/// Status of the latest entry, or `UNKNOWN` for an empty history.
pub fn current_status(history: &ConnectionHistory) -> Status {
    history.latest().map(|e| e.status.clone()).unwrap_or_default()
}

/// The current status plus the instant it was first observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusWindow {
    pub status: Status,
    pub since: DateTime<Utc>,
    /// History length and tail entry at the last update, used to tell a new
    /// transition apart from a re-delivered one. Timestamps alone are not
    /// enough: missing ones all normalize to the epoch.
    tail: (usize, CanonicalEntry),
}

impl StatusWindow {
    /// Compute the window after a history update observed at `at`.
    ///
    /// A new window starts when there was none, when the tail status differs
    /// from the window's status, or when the two newest entries differ and
    /// the tail is a sample not seen before. Re-observing the same history
    /// keeps `since` where it was.
    pub fn observe(
        previous: Option<&StatusWindow>,
        history: &ConnectionHistory,
        at: DateTime<Utc>,
    ) -> Option<StatusWindow> {
        let Some(latest) = history.latest() else {
            return previous.cloned();
        };

        let transition = match previous {
            None => true,
            Some(window) if window.status != latest.status => true,
            Some(window) => {
                let fresh_tail = window.tail.0 != history.len() || window.tail.1 != *latest;
                let changed_at_tail =
                    history.previous().is_some_and(|prev| prev.status != latest.status);
                fresh_tail && changed_at_tail
            }
        };

        let since = match previous {
            Some(window) if !transition => window.since,
            _ => at,
        };

        Some(StatusWindow {
            status: latest.status.clone(),
            since,
            tail: (history.len(), latest.clone()),
        })
    }

    /// Time spent in the current status as of `now`.
    pub fn elapsed(&self, now: DateTime<Utc>) -> chrono::Duration {
        (now - self.since).max(chrono::Duration::zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::normalize::{normalize, CanonicalEntry};
    use crate::source::Sample;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    /// Build a history of (status, sample time offset) pairs.
    fn history(items: &[(&str, i64)]) -> ConnectionHistory {
        let samples: Vec<Sample> = items
            .iter()
            .map(|(status, t)| Sample {
                timestamp: Some(at(*t).to_rfc3339().into()),
                status: Some((*status).into()),
                ..Default::default()
            })
            .collect();
        let entries: Vec<CanonicalEntry> = normalize(&samples);
        ConnectionHistory::from(entries)
    }

    #[test]
    fn test_current_status() {
        assert_eq!(current_status(&ConnectionHistory::new()), Status::Unknown);
        assert_eq!(current_status(&history(&[("UP", 0), ("DOWN", 30)])), Status::Down);
    }

    #[test]
    fn test_empty_history_leaves_window_unset() {
        assert!(StatusWindow::observe(None, &ConnectionHistory::new(), at(100)).is_none());
    }

    #[test]
    fn test_first_history_opens_window() {
        let window = StatusWindow::observe(None, &history(&[("UP", 0)]), at(100)).unwrap();
        assert_eq!(window.status, Status::Up);
        assert_eq!(window.since, at(100));
    }

    #[test]
    fn test_same_status_samples_keep_since() {
        let first = StatusWindow::observe(None, &history(&[("UP", 0)]), at(100)).unwrap();
        let second =
            StatusWindow::observe(Some(&first), &history(&[("UP", 0), ("UP", 30)]), at(130))
                .unwrap();
        assert_eq!(second.since, at(100));
    }

    #[test]
    fn test_tail_change_advances_since() {
        let first = StatusWindow::observe(None, &history(&[("UP", 0)]), at(100)).unwrap();
        let second =
            StatusWindow::observe(Some(&first), &history(&[("UP", 0), ("DOWN", 30)]), at(130))
                .unwrap();
        assert_eq!(second.status, Status::Down);
        assert_eq!(second.since, at(130));
    }

    #[test]
    fn test_tail_change_across_refresh_with_multiple_new_samples() {
        let first = StatusWindow::observe(None, &history(&[("UP", 0)]), at(100)).unwrap();
        // Two DOWN samples arrived between refreshes: the newest pair agrees,
        // but the tail still changed relative to the prior tail.
        let h = history(&[("UP", 0), ("DOWN", 30), ("DOWN", 60)]);
        let second = StatusWindow::observe(Some(&first), &h, at(160)).unwrap();
        assert_eq!(second.since, at(160));
    }

    #[test]
    fn test_unchanged_history_does_not_move_since() {
        let h = history(&[("UP", 0), ("DOWN", 30)]);
        let first = StatusWindow::observe(None, &h, at(100)).unwrap();
        let again = StatusWindow::observe(Some(&first), &h, at(200)).unwrap();
        assert_eq!(again.since, at(100));
    }

    #[test]
    fn test_flap_inside_newest_pair_is_a_transition() {
        let first = StatusWindow::observe(None, &history(&[("DOWN", 0)]), at(100)).unwrap();
        let h = history(&[("DOWN", 0), ("UP", 30), ("DOWN", 60)]);
        let second = StatusWindow::observe(Some(&first), &h, at(160)).unwrap();
        assert_eq!(second.status, Status::Down);
        assert_eq!(second.since, at(160));
    }

    #[test]
    fn test_reverted_earlier_transition_is_not_reflagged() {
        let first = StatusWindow::observe(None, &history(&[("DOWN", 0)]), at(100)).unwrap();
        let h = history(&[("DOWN", 0), ("UP", 30), ("DOWN", 60), ("DOWN", 90)]);
        let second = StatusWindow::observe(Some(&first), &h, at(190)).unwrap();
        assert_eq!(second.since, at(100));
    }

    #[test]
    fn test_flap_without_timestamps_is_a_transition() {
        let untimed = |statuses: &[&str]| {
            let samples: Vec<Sample> = statuses
                .iter()
                .map(|status| Sample {
                    status: Some((*status).into()),
                    ..Default::default()
                })
                .collect();
            ConnectionHistory::from(normalize(&samples))
        };

        let first = StatusWindow::observe(None, &untimed(&["DOWN"]), at(100)).unwrap();
        let h = untimed(&["DOWN", "UP", "DOWN"]);
        let second = StatusWindow::observe(Some(&first), &h, at(160)).unwrap();
        assert_eq!(second.since, at(160));

        // Seeing the same untimed history again is not a new transition
        let again = StatusWindow::observe(Some(&second), &h, at(220)).unwrap();
        assert_eq!(again.since, at(160));
    }

    #[test]
    fn test_elapsed_never_negative() {
        let window = StatusWindow::observe(None, &history(&[("UP", 0)]), at(100)).unwrap();
        assert_eq!(window.elapsed(at(160)), chrono::Duration::seconds(60));
        assert_eq!(window.elapsed(at(50)), chrono::Duration::zero());
    }
}
