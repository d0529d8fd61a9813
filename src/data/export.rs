//! JSON export of the dashboard state.

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::state::DashboardState;
use super::stats::Stats;
use crate::source::Sample;

/// Exported snapshot of what the dashboard shows.
///
/// `entries` use the wire shape, oldest first, so the array can be saved on
/// its own and replayed with `--file`.
#[derive(Debug, Serialize)]
pub struct ExportDocument {
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub current_status: String,
    pub status_since: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
    pub stats: Stats,
    pub entries: Vec<Sample>,
}

impl ExportDocument {
    pub fn new(state: &DashboardState, source: &str, generated_at: DateTime<Utc>) -> Self {
        Self {
            generated_at,
            source: source.to_string(),
            current_status: state.current_status().to_string(),
            status_since: state.status_window().map(|w| w.since),
            last_updated: state.last_updated(),
            stats: state.stats(),
            entries: state.history().entries().iter().map(Sample::from).collect(),
        }
    }
}

/// Write the export document for `state` to `path` as pretty JSON.
pub fn write_export(path: &Path, state: &DashboardState, source: &str) -> Result<()> {
    let document = ExportDocument::new(state, source, Utc::now());
    let json = serde_json::to_string_pretty(&document)?;
    let mut file = std::fs::File::create(path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}
