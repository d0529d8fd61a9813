//! Data source abstraction for receiving connection samples.
//!
//! This module provides a trait-based abstraction over where the sample
//! history comes from: the watchdog HTTP API, a saved JSON file, or an
//! in-memory channel. Every source hands back the full history snapshot on
//! each fetch; there is no incremental protocol.

mod channel;
mod file;
mod http;
mod sample;

pub use channel::ChannelSource;
pub use file::FileSource;
pub use http::HttpSource;
pub use sample::{decode_payload, FieldValue, Sample};

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Reasons a fetch can fail.
///
/// A payload that is valid JSON but not an array is *not* an error; it
/// comes back as an empty sample list ("not ready yet").
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("fetch timed out after {0:?}")]
    Timeout(Duration),
    #[error("server responded with HTTP {0}")]
    Status(u16),
    #[error("malformed payload: {0}")]
    Payload(String),
}

/// Trait for fetching the connection history from various sources.
///
/// # Example
///
/// ```no_run
/// use watchdog_tui::{FileSource, SampleSource};
///
/// # tokio_test::block_on(async {
/// let source = FileSource::new("connection-data.json");
/// match source.fetch().await {
///     Ok(samples) => println!("Got {} samples", samples.len()),
///     Err(e) => eprintln!("{}", e),
/// }
/// # });
/// ```
#[async_trait]
pub trait SampleSource: Send + Sync + Debug {
    /// Fetch the complete sample history, oldest first.
    ///
    /// `Ok` with an empty vector means the source has nothing to offer yet.
    async fn fetch(&self) -> Result<Vec<Sample>, FetchError>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;
}
