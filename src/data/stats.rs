//! Aggregate statistics over the connection history.

use serde::Serialize;

use super::history::ConnectionHistory;
use super::normalize::DEFAULT_DURATION_LABEL;

/// Aggregate statistics shown in the stats row.
///
/// Latency figures only consider `UP` entries. The duration labels and the
/// change count come verbatim from the newest entry: the backend keeps the
/// cumulative books, not the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub avg_latency_ms: u64,
    pub max_latency_ms: u64,
    /// Latency of the newest entry if it is `UP`, otherwise 0.
    pub last_latency_ms: u64,
    pub uptime: String,
    pub downtime: String,
    pub changes: u64,
    pub samples: usize,
    pub down_samples: usize,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            avg_latency_ms: 0,
            max_latency_ms: 0,
            last_latency_ms: 0,
            uptime: DEFAULT_DURATION_LABEL.to_string(),
            downtime: DEFAULT_DURATION_LABEL.to_string(),
            changes: 0,
            samples: 0,
            down_samples: 0,
        }
    }
}

impl Stats {
    pub fn from_history(history: &ConnectionHistory) -> Self {
        let Some(latest) = history.latest() else {
            return Self::default();
        };

        let up_latencies: Vec<u64> = history
            .entries()
            .iter()
            .filter(|e| e.status.is_up())
            .map(|e| e.latency_ms)
            .collect();

        let avg_latency_ms = match up_latencies.len() as u64 {
            0 => 0,
            // Rounded mean, halves round up. Summed wide so that saturated
            // latencies cannot overflow.
            n => {
                let n = n as u128;
                let sum: u128 = up_latencies.iter().map(|&ms| ms as u128).sum();
                ((sum + n / 2) / n) as u64
            }
        };

        Self {
            avg_latency_ms,
            max_latency_ms: up_latencies.iter().copied().max().unwrap_or(0),
            last_latency_ms: if latest.status.is_up() { latest.latency_ms } else { 0 },
            uptime: latest.uptime_label.clone(),
            downtime: latest.downtime_label.clone(),
            changes: latest.total_changes,
            samples: history.len(),
            down_samples: history.entries().iter().filter(|e| e.is_down).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::normalize::normalize;
    use crate::source::{FieldValue, Sample};

    fn sample(status: &str, latency: u64) -> Sample {
        Sample {
            status: Some(status.into()),
            latency: Some(latency.into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_stats_example() {
        let history = ConnectionHistory::from(normalize(&[
            sample("UP", 50),
            sample("UP", 70),
            sample("DOWN", 0),
            sample("UP", 60),
        ]));

        let stats = Stats::from_history(&history);
        assert_eq!(stats.avg_latency_ms, 60);
        assert_eq!(stats.max_latency_ms, 70);
        assert_eq!(stats.last_latency_ms, 60);
        assert_eq!(stats.samples, 4);
        assert_eq!(stats.down_samples, 1);
    }

    #[test]
    fn test_avg_rounds_half_up() {
        let history = ConnectionHistory::from(normalize(&[sample("UP", 10), sample("UP", 11)]));
        assert_eq!(Stats::from_history(&history).avg_latency_ms, 11);
    }

    #[test]
    fn test_down_latency_is_excluded() {
        // A DOWN sample carrying a stale latency must not skew the figures.
        let history =
            ConnectionHistory::from(normalize(&[sample("UP", 20), sample("DOWN", 900)]));
        let stats = Stats::from_history(&history);
        assert_eq!(stats.avg_latency_ms, 20);
        assert_eq!(stats.max_latency_ms, 20);
        assert_eq!(stats.last_latency_ms, 0);
    }

    #[test]
    fn test_no_up_entries() {
        let history = ConnectionHistory::from(normalize(&[sample("DOWN", 0), sample("UNKNOWN", 5)]));
        let stats = Stats::from_history(&history);
        assert_eq!(stats.avg_latency_ms, 0);
        assert_eq!(stats.max_latency_ms, 0);
    }

    #[test]
    fn test_labels_come_from_latest_entry() {
        let mut latest = sample("UP", 15);
        latest.uptime = Some("1h2m3s".into());
        latest.downtime = Some("4m".into());
        latest.total_changes = Some("7".into());

        let history = ConnectionHistory::from(normalize(&[sample("UP", 10), latest]));
        let stats = Stats::from_history(&history);
        assert_eq!(stats.uptime, "1h2m3s");
        assert_eq!(stats.downtime, "4m");
        assert_eq!(stats.changes, 7);
    }

    #[test]
    fn test_oversized_latencies_do_not_overflow() {
        let huge = |status: &str| Sample {
            status: Some(status.into()),
            latency: serde_json::Number::from_f64(1e19).map(FieldValue::Number),
            ..Default::default()
        };
        let history = ConnectionHistory::from(normalize(&[huge("UP"), huge("UP"), huge("UP")]));

        let stats = Stats::from_history(&history);
        assert_eq!(stats.avg_latency_ms, i64::MAX as u64);
        assert_eq!(stats.max_latency_ms, i64::MAX as u64);
    }

    #[test]
    fn test_empty_history() {
        assert_eq!(Stats::from_history(&ConnectionHistory::new()), Stats::default());
    }
}
