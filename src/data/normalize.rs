//! Conversion of raw samples into canonical entries.
//!
//! Normalization is total: every sample yields exactly one entry, and
//! missing or malformed fields fall back to fixed defaults.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::source::{FieldValue, Sample};

/// Default label for absent uptime/downtime fields.
pub const DEFAULT_DURATION_LABEL: &str = "0s";

/// Connection status as reported by the backend.
///
/// Unrecognised strings are kept verbatim in [`Status::Other`]; the UI
/// renders them like `UNKNOWN`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    Up,
    Down,
    #[default]
    Unknown,
    Other(String),
}

impl Status {
    /// Parse a status string. Matching is exact and case-sensitive.
    pub fn parse(s: &str) -> Self {
        match s {
            "UP" => Status::Up,
            "DOWN" => Status::Down,
            "UNKNOWN" => Status::Unknown,
            other => Status::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Status::Up => "UP",
            Status::Down => "DOWN",
            Status::Unknown => "UNKNOWN",
            Status::Other(s) => s,
        }
    }

    pub fn is_up(&self) -> bool {
        matches!(self, Status::Up)
    }

    pub fn is_down(&self) -> bool {
        matches!(self, Status::Down)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Status {
    fn from(s: String) -> Self {
        Status::parse(&s)
    }
}

impl From<Status> for String {
    fn from(status: Status) -> Self {
        status.as_str().to_string()
    }
}

/// Normalized, type-safe representation of a [`Sample`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalEntry {
    pub timestamp: DateTime<Utc>,
    pub status: Status,
    /// Always 0 while the connection is down.
    pub latency_ms: u64,
    pub uptime_label: String,
    pub downtime_label: String,
    pub total_changes: u64,
    pub message: String,
    pub is_down: bool,
}

impl CanonicalEntry {
    /// The cumulative duration label matching the entry's status.
    pub fn duration_label(&self) -> &str {
        if self.status.is_up() {
            &self.uptime_label
        } else {
            &self.downtime_label
        }
    }
}

/// Normalize a raw sample sequence, preserving order.
pub fn normalize(samples: &[Sample]) -> Vec<CanonicalEntry> {
    samples.iter().map(normalize_sample).collect()
}

/// Normalize a single sample.
pub fn normalize_sample(sample: &Sample) -> CanonicalEntry {
    let status = sample
        .status
        .as_ref()
        .and_then(FieldValue::as_text)
        .map(|s| Status::parse(&s))
        .unwrap_or_default();
    let is_down = status.is_down();

    let latency_ms = if is_down {
        0
    } else {
        non_negative(sample.latency.as_ref())
    };

    CanonicalEntry {
        timestamp: sample.timestamp.as_ref().and_then(parse_timestamp).unwrap_or_default(),
        status,
        latency_ms,
        uptime_label: label_or_default(sample.uptime.as_ref()),
        downtime_label: label_or_default(sample.downtime.as_ref()),
        total_changes: non_negative(sample.total_changes.as_ref()),
        message: sample.message.as_ref().and_then(FieldValue::as_text).unwrap_or_default(),
        is_down,
    }
}

impl From<&CanonicalEntry> for Sample {
    fn from(entry: &CanonicalEntry) -> Self {
        Sample {
            timestamp: Some(entry.timestamp.to_rfc3339().into()),
            status: Some(entry.status.as_str().into()),
            latency: Some(entry.latency_ms.into()),
            uptime: Some(entry.uptime_label.clone().into()),
            downtime: Some(entry.downtime_label.clone().into()),
            total_changes: Some(entry.total_changes.into()),
            message: Some(entry.message.clone().into()),
        }
    }
}

fn non_negative(value: Option<&FieldValue>) -> u64 {
    value.and_then(FieldValue::as_integer).map(|n| n.max(0) as u64).unwrap_or(0)
}

fn label_or_default(value: Option<&FieldValue>) -> String {
    value
        .and_then(FieldValue::as_text)
        .unwrap_or_else(|| DEFAULT_DURATION_LABEL.to_string())
}

/// Parse an ISO-8601 timestamp; naive timestamps are taken as UTC.
fn parse_timestamp(value: &FieldValue) -> Option<DateTime<Utc>> {
    let text = value.as_text()?;
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|naive| naive.and_utc())
}
