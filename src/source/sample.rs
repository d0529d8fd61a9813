//! Wire types for connection samples.
//!
//! These types match the JSON produced by the watchdog backend's
//! `/api/connection-data` endpoint: an array of flat objects, oldest first.
//! The backend serves its CSV log as string maps, so every field may arrive
//! as a string, a number, or not at all.

use serde::{Deserialize, Serialize};

use super::FetchError;

/// A single field value as received on the wire.
///
/// Decoding is deliberately lenient: anything that is not a number or a
/// string is kept as raw JSON so one odd field never rejects a whole sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(serde_json::Number),
    Text(String),
    Other(serde_json::Value),
}

impl FieldValue {
    /// Interpret the value as an integer.
    ///
    /// Strings use the leading-integer rule: optional whitespace and sign,
    /// then as many digits as are present ("42ms" is 42, "12.9" is 12).
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
            FieldValue::Text(s) => parse_leading_int(s),
            FieldValue::Other(_) => None,
        }
    }

    /// Interpret the value as display text.
    pub fn as_text(&self) -> Option<String> {
        match self {
            FieldValue::Number(n) => Some(n.to_string()),
            FieldValue::Text(s) => Some(s.clone()),
            FieldValue::Other(_) => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<u64> for FieldValue {
    fn from(n: u64) -> Self {
        FieldValue::Number(n.into())
    }
}

/// One raw connectivity measurement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sample {
    /// ISO-8601 timestamp of the check.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<FieldValue>,

    /// `UP`, `DOWN` or `UNKNOWN` (other values are preserved).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<FieldValue>,

    /// Round-trip latency in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency: Option<FieldValue>,

    /// Cumulative uptime label, e.g. "2h3m4s".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime: Option<FieldValue>,

    /// Cumulative downtime label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub downtime: Option<FieldValue>,

    /// Number of UP/DOWN transitions seen by the backend.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_changes: Option<FieldValue>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<FieldValue>,
}

/// Decode a response body into samples.
///
/// Returns an empty vector when the body is valid JSON but not an array
/// (the backend is not warmed up yet). Bodies that are not JSON at all, or
/// arrays holding something other than objects, are payload errors.
pub fn decode_payload(bytes: &[u8]) -> Result<Vec<Sample>, FetchError> {
    let value: serde_json::Value =
        serde_json::from_slice(bytes).map_err(|e| FetchError::Payload(e.to_string()))?;

    let serde_json::Value::Array(items) = value else {
        return Ok(Vec::new());
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            if !item.is_object() {
                return Err(FetchError::Payload(format!(
                    "sample {} is not an object",
                    index
                )));
            }
            serde_json::from_value(item)
                .map_err(|e| FetchError::Payload(format!("sample {}: {}", index, e)))
        })
        .collect()
}

fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let end = digits.bytes().take_while(|b| b.is_ascii_digit()).count();
    if end == 0 {
        return None;
    }

    let value: i64 = digits[..end].parse().ok()?;
    Some(if negative { -value } else { value })
}
