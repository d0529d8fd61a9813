//! # watchdog-tui
//!
//! A terminal dashboard and library for an internet connection watchdog.
//!
//! A watchdog backend pings the internet on a schedule and records each
//! check as a sample (status, latency, uptime/downtime labels, change
//! counter, message). This crate polls that log, normalizes it into a
//! canonical history and derives everything the dashboard displays: the
//! current status and how long it has held, latency and uptime stats, a
//! latency chart with outage markers, and a paginated event log.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                           Application                            │
//! │  ┌───────────┐    ┌──────────┐    ┌─────────┐    ┌──────────┐    │
//! │  │ scheduler │───▶│   data   │───▶│   ui    │───▶│ Terminal │    │
//! │  │ (refresh) │    │ (state)  │    │(render) │    │          │    │
//! │  └─────┬─────┘    └──────────┘    └─────────┘    └──────────┘    │
//! │        │                                                         │
//! │        ▼                                                         │
//! │  ┌───────────┐                                                   │
//! │  │  source   │◀── HttpSource | FileSource | ChannelSource         │
//! │  │  (input)  │                                                   │
//! │  └───────────┘                                                   │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`source`]**: Data source abstraction ([`SampleSource`] trait) with
//!   implementations for the HTTP endpoint, saved files and channels
//! - **[`data`]**: Normalization into [`CanonicalEntry`] values, the
//!   [`DashboardState`] reducer and the views derived from it
//! - **[`scheduler`]**: Periodic, non-overlapping fetches delivered as
//!   [`RefreshEvent`]s
//! - **[`config`]**: Layered [`DashboardConfig`] (defaults, file, environment)
//! - **[`app`]**, **[`events`]**, **[`ui`]**: Terminal UI state, key
//!   handling and ratatui rendering
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Poll a local watchdog backend
//! watchdog --url http://localhost:8080
//!
//! # Replay a saved sample log
//! watchdog --file samples.json
//!
//! # Fetch once and export the dashboard state
//! watchdog --export state.json
//! ```
//!
//! ### Deriving the dashboard from samples
//!
//! ```
//! use chrono::Utc;
//! use watchdog_tui::{normalize, Action, DashboardState, Sample, Status};
//!
//! let samples = vec![Sample {
//!     status: Some("UP".into()),
//!     latency: Some("42".into()),
//!     ..Default::default()
//! }];
//!
//! let state = DashboardState::new(10).reduce(Action::Refreshed {
//!     generation: 1,
//!     at: Utc::now(),
//!     entries: normalize(&samples),
//! });
//!
//! assert_eq!(state.current_status(), Status::Up);
//! assert_eq!(state.stats().avg_latency_ms, 42);
//! ```
//!
//! ### Driving the refresh loop from a channel
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use watchdog_tui::{ChannelSource, RefreshScheduler};
//!
//! # tokio_test::block_on(async {
//! let (_tx, source) = ChannelSource::create("in-process");
//! let mut handle = RefreshScheduler::new(
//!     Arc::new(source),
//!     Duration::from_secs(10),
//!     Duration::from_secs(5),
//! )
//! .start();
//!
//! // Nothing has been pushed yet, so the first fetch is "not ready"
//! let event = handle.next().await;
//! assert!(event.is_some());
//! handle.shutdown().await;
//! # });
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod events;
pub mod scheduler;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use config::{ConfigError, DashboardConfig};
pub use data::{
    normalize, Action, CanonicalEntry, ConnectionHistory, DashboardState, LatencySeries,
    PageAction, Stats, Status, StatusWindow,
};
pub use scheduler::{RefreshEvent, RefreshHandle, RefreshOutcome, RefreshScheduler};
pub use source::{
    ChannelSource, FetchError, FieldValue, FileSource, HttpSource, Sample, SampleSource,
};
