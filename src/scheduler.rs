//! Periodic refresh of the connection history.
//!
//! A [`RefreshScheduler`] fetches from a [`SampleSource`] once immediately and
//! then on every tick of a fixed interval. At most one fetch is in flight at a
//! time: a tick that fires while a fetch is still running is skipped. Every
//! completed fetch is delivered as a [`RefreshEvent`] tagged with the
//! generation it was started with, ready to be turned into an [`Action`].

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot, Notify, Semaphore};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;

use crate::data::{normalize, Action, CanonicalEntry};
use crate::source::{FetchError, SampleSource};

/// Result of one fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    Updated(Vec<CanonicalEntry>),
    /// The source answered with no samples.
    NotReady,
    Failed(FetchError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RefreshEvent {
    pub generation: u64,
    pub completed_at: DateTime<Utc>,
    pub outcome: RefreshOutcome,
}

impl From<RefreshEvent> for Action {
    fn from(event: RefreshEvent) -> Self {
        let generation = event.generation;
        match event.outcome {
            RefreshOutcome::Updated(entries) => Action::Refreshed {
                generation,
                at: event.completed_at,
                entries,
            },
            RefreshOutcome::NotReady => Action::NotReady { generation },
            RefreshOutcome::Failed(error) => Action::Failed {
                generation,
                error: error.to_string(),
            },
        }
    }
}

/// Drives periodic fetches from a sample source.
pub struct RefreshScheduler {
    source: Arc<dyn SampleSource>,
    interval: Duration,
    timeout: Duration,
}

impl RefreshScheduler {
    pub fn new(source: Arc<dyn SampleSource>, interval: Duration, timeout: Duration) -> Self {
        Self {
            source,
            interval,
            timeout,
        }
    }

    /// Spawn the refresh loop on the current tokio runtime.
    ///
    /// The first fetch starts right away. The loop runs until the returned
    /// handle is shut down or dropped.
    pub fn start(self) -> RefreshHandle {
        let (events_tx, events_rx) = mpsc::channel(16);
        let (stop_tx, stop_rx) = oneshot::channel();
        let notify = Arc::new(Notify::new());
        let description = self.source.description().to_string();

        let task = tokio::spawn(run_refresh_loop(self, events_tx, stop_rx, notify.clone()));

        RefreshHandle {
            events: events_rx,
            stop: Some(stop_tx),
            task,
            notify,
            description,
        }
    }
}

/// Handle to a running refresh loop.
///
/// Dropping the handle stops the loop and abandons any fetch in flight, so no
/// event is delivered afterwards.
pub struct RefreshHandle {
    events: mpsc::Receiver<RefreshEvent>,
    stop: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
    notify: Arc<Notify>,
    description: String,
}

impl RefreshHandle {
    /// Next completed fetch, if one is waiting.
    pub fn try_next(&mut self) -> Option<RefreshEvent> {
        self.events.try_recv().ok()
    }

    /// Wait for the next completed fetch. Returns `None` once the loop stopped.
    pub async fn next(&mut self) -> Option<RefreshEvent> {
        self.events.recv().await
    }

    /// Start a fetch now instead of waiting for the next tick.
    ///
    /// Still skipped if a fetch is in flight.
    pub fn refresh_now(&self) {
        self.notify.notify_one();
    }

    /// Description of the source being polled.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Stop the loop and wait for it to exit.
    pub async fn shutdown(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Err(e) = (&mut self.task).await {
            if e.is_panic() {
                tracing::error!("Refresh loop panicked: {}", e);
            }
        }
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        self.task.abort();
    }
}

async fn run_refresh_loop(
    scheduler: RefreshScheduler,
    events: mpsc::Sender<RefreshEvent>,
    mut stop_rx: oneshot::Receiver<()>,
    notify: Arc<Notify>,
) {
    let RefreshScheduler {
        source,
        interval,
        timeout,
    } = scheduler;

    tracing::info!(
        "Starting refresh loop for {} (every {:?}, timeout {:?})",
        source.description(),
        interval,
        timeout
    );

    // One permit: held by the fetch in flight.
    let in_flight = Arc::new(Semaphore::new(1));
    // Owns the fetch tasks so they are aborted with the loop.
    let mut fetches = JoinSet::new();
    let mut generation = 0u64;

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = &mut stop_rx => break,
            Some(joined) = fetches.join_next(), if !fetches.is_empty() => {
                if let Err(e) = joined {
                    if e.is_panic() {
                        tracing::error!("Fetch task panicked: {}", e);
                    }
                }
                continue;
            }
            _ = ticker.tick() => {}
            _ = notify.notified() => {
                tracing::debug!("Manual refresh requested");
            }
        }

        let permit = match in_flight.clone().try_acquire_owned() {
            Ok(p) => p,
            Err(_) => {
                tracing::debug!("Skipping refresh, previous fetch still in flight");
                continue;
            }
        };

        generation += 1;
        tracing::debug!("Starting fetch (generation {})", generation);
        let source = source.clone();
        let events = events.clone();

        fetches.spawn(async move {
            let event = fetch_once(source.as_ref(), generation, timeout).await;
            drop(permit);
            // Receiver gone means the handle was dropped; nothing to deliver to.
            let _ = events.send(event).await;
        });
    }

    fetches.abort_all();
    tracing::info!("Stopped refresh loop for {}", source.description());
}

/// Run one fetch with a timeout and normalize the result.
async fn fetch_once(source: &dyn SampleSource, generation: u64, timeout: Duration) -> RefreshEvent {
    let outcome = match tokio::time::timeout(timeout, source.fetch()).await {
        Ok(Ok(samples)) if samples.is_empty() => {
            tracing::debug!("No samples available yet from {}", source.description());
            RefreshOutcome::NotReady
        }
        Ok(Ok(samples)) => {
            tracing::debug!("Fetched {} samples (generation {})", samples.len(), generation);
            RefreshOutcome::Updated(normalize(&samples))
        }
        Ok(Err(e)) => {
            tracing::warn!("Fetch from {} failed: {}", source.description(), e);
            RefreshOutcome::Failed(e)
        }
        Err(_) => {
            tracing::warn!("Fetch from {} timed out after {:?}", source.description(), timeout);
            RefreshOutcome::Failed(FetchError::Timeout(timeout))
        }
    };

    RefreshEvent {
        generation,
        completed_at: Utc::now(),
        outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Status;
    use crate::source::{ChannelSource, Sample};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sample(status: &str, latency: u64) -> Sample {
        Sample {
            timestamp: Some("2025-03-01T10:00:00Z".into()),
            status: Some(status.into()),
            latency: Some(latency.into()),
            ..Default::default()
        }
    }

    /// Source whose fetches take a fixed time and are counted.
    #[derive(Debug)]
    struct SlowSource {
        delay: Duration,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl SampleSource for SlowSource {
        async fn fetch(&self) -> Result<Vec<Sample>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(vec![sample("UP", 10)])
        }

        fn description(&self) -> &str {
            "slow"
        }
    }

    #[derive(Debug)]
    struct FailingSource;

    #[async_trait]
    impl SampleSource for FailingSource {
        async fn fetch(&self) -> Result<Vec<Sample>, FetchError> {
            Err(FetchError::Status(500))
        }

        fn description(&self) -> &str {
            "failing"
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_fetch_is_immediate() {
        let (tx, source) = ChannelSource::create("test");
        tx.send(vec![sample("UP", 42)]).unwrap();

        let mut handle =
            RefreshScheduler::new(Arc::new(source), Duration::from_secs(10), Duration::from_secs(5))
                .start();
        assert_eq!(handle.description(), "channel: test");

        let event = handle.next().await.unwrap();
        assert_eq!(event.generation, 1);
        match event.outcome {
            RefreshOutcome::Updated(entries) => {
                assert_eq!(entries.len(), 1);
                assert_eq!(entries[0].status, Status::Up);
                assert_eq!(entries[0].latency_ms, 42);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_source_is_not_ready() {
        let (_tx, source) = ChannelSource::create("empty");
        let mut handle =
            RefreshScheduler::new(Arc::new(source), Duration::from_secs(10), Duration::from_secs(5))
                .start();

        let event = handle.next().await.unwrap();
        assert_eq!(event.outcome, RefreshOutcome::NotReady);
        assert_eq!(Action::from(event), Action::NotReady { generation: 1 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_becomes_failed_action() {
        let mut handle = RefreshScheduler::new(
            Arc::new(FailingSource),
            Duration::from_secs(10),
            Duration::from_secs(5),
        )
        .start();

        let event = handle.next().await.unwrap();
        assert_eq!(event.outcome, RefreshOutcome::Failed(FetchError::Status(500)));
        assert_eq!(
            Action::from(event),
            Action::Failed {
                generation: 1,
                error: "server responded with HTTP 500".to_string(),
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout() {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = SlowSource {
            delay: Duration::from_secs(60),
            calls: calls.clone(),
        };
        let mut handle =
            RefreshScheduler::new(Arc::new(source), Duration::from_secs(10), Duration::from_secs(5))
                .start();

        let event = handle.next().await.unwrap();
        assert_eq!(
            event.outcome,
            RefreshOutcome::Failed(FetchError::Timeout(Duration::from_secs(5)))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_skipped_while_fetch_in_flight() {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = SlowSource {
            delay: Duration::from_secs(25),
            calls: calls.clone(),
        };
        // Timeout longer than the interval so the fetch spans several ticks.
        let mut handle =
            RefreshScheduler::new(Arc::new(source), Duration::from_secs(10), Duration::from_secs(60))
                .start();

        tokio::time::sleep(Duration::from_secs(21)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let event = handle.next().await.unwrap();
        assert_eq!(event.generation, 1);

        // The next fetch starts on the following tick with the next generation.
        let event = handle.next().await.unwrap();
        assert_eq!(event.generation, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_now() {
        let (tx, source) = ChannelSource::create("test");
        tx.send(vec![sample("UP", 1)]).unwrap();
        let mut handle =
            RefreshScheduler::new(Arc::new(source), Duration::from_secs(3600), Duration::from_secs(5))
                .start();

        assert_eq!(handle.next().await.unwrap().generation, 1);
        assert!(handle.try_next().is_none());

        tx.send(vec![sample("DOWN", 0)]).unwrap();
        handle.refresh_now();

        let event = handle.next().await.unwrap();
        assert_eq!(event.generation, 2);
        match event.outcome {
            RefreshOutcome::Updated(entries) => assert_eq!(entries[0].status, Status::Down),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_fetch_after_shutdown() {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = SlowSource {
            delay: Duration::from_millis(10),
            calls: calls.clone(),
        };
        let mut handle =
            RefreshScheduler::new(Arc::new(source), Duration::from_secs(10), Duration::from_secs(5))
                .start();

        handle.next().await.unwrap();
        handle.shutdown().await;

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_fetch_after_drop() {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = SlowSource {
            delay: Duration::from_millis(10),
            calls: calls.clone(),
        };
        let handle =
            RefreshScheduler::new(Arc::new(source), Duration::from_secs(10), Duration::from_secs(5))
                .start();

        tokio::time::sleep(Duration::from_secs(1)).await;
        drop(handle);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
