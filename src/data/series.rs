//! Chart series for the latency graph.

use chrono::{DateTime, Utc};

use super::history::ConnectionHistory;

/// Headroom added above the highest latency on the y axis.
const Y_HEADROOM_MS: f64 = 5.0;

/// Latency points plus outage markers, ready for a chart widget.
///
/// The x coordinate is seconds since the first entry in the history.
#[derive(Debug, Clone, PartialEq)]
pub struct LatencySeries {
    pub points: Vec<(f64, f64)>,
    /// One marker on the x axis for every DOWN entry.
    pub outages: Vec<(f64, f64)>,
    pub origin: Option<DateTime<Utc>>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

impl LatencySeries {
    pub fn from_history(history: &ConnectionHistory) -> Self {
        let origin = history.entries().first().map(|e| e.timestamp);

        let offset = |at: DateTime<Utc>| -> f64 {
            origin
                .map(|o| (at - o).num_milliseconds() as f64 / 1000.0)
                .unwrap_or(0.0)
        };

        let points: Vec<(f64, f64)> = history
            .entries()
            .iter()
            .map(|e| (offset(e.timestamp), e.latency_ms as f64))
            .collect();

        let outages = history
            .entries()
            .iter()
            .filter(|e| e.is_down)
            .map(|e| (offset(e.timestamp), 0.0))
            .collect();

        let x_min = points.iter().map(|p| p.0).fold(0.0, f64::min);
        let x_max = points.iter().map(|p| p.0).fold(x_min, f64::max);
        // A single sample still needs a non-empty axis.
        let x_max = if x_max > x_min { x_max } else { x_min + 1.0 };

        let y_max = points.iter().map(|p| p.1).fold(0.0, f64::max) + Y_HEADROOM_MS;

        Self {
            points,
            outages,
            origin,
            x_bounds: [x_min, x_max],
            y_bounds: [0.0, y_max],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
