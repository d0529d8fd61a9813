//! Channel-based data source.
//!
//! Serves sample histories pushed through a tokio watch channel. Useful when
//! the dashboard is embedded in a process that already has the samples, and
//! for driving the refresh loop in tests.

use async_trait::async_trait;
use tokio::sync::watch;

use super::{FetchError, Sample, SampleSource};

/// A data source that returns the latest history sent through a channel.
///
/// # Example
///
/// ```
/// use watchdog_tui::ChannelSource;
///
/// // Create a channel pair
/// let (tx, source) = ChannelSource::create("in-process");
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    receiver: watch::Receiver<Vec<Sample>>,
    description: String,
}

impl ChannelSource {
    /// Create a new channel source.
    ///
    /// # Arguments
    ///
    /// * `receiver` - The receiving end of a watch channel
    /// * `source_description` - A description of where samples come from
    pub fn new(receiver: watch::Receiver<Vec<Sample>>, source_description: &str) -> Self {
        let description = format!("channel: {}", source_description);
        Self {
            receiver,
            description,
        }
    }

    /// Create a channel pair for sending histories to a ChannelSource.
    ///
    /// The channel starts out empty, so fetches report "not ready" until
    /// the first history is sent.
    pub fn create(source_description: &str) -> (watch::Sender<Vec<Sample>>, Self) {
        let (tx, rx) = watch::channel(Vec::new());
        let source = Self::new(rx, source_description);
        (tx, source)
    }
}

#[async_trait]
impl SampleSource for ChannelSource {
    async fn fetch(&self) -> Result<Vec<Sample>, FetchError> {
        if self.receiver.has_changed().is_err() && self.receiver.borrow().is_empty() {
            return Err(FetchError::Transport("channel closed".to_string()));
        }
        Ok(self.receiver.borrow().clone())
    }

    fn description(&self) -> &str {
        &self.description
    }
}
