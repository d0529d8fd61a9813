//! Data models and processing for connection samples.
//!
//! This module turns raw samples into canonical entries and derives
//! everything the dashboard displays from them.
//!
//! ## Submodules
//!
//! - [`normalize`]: Sample → [`CanonicalEntry`] conversion with per-field defaults
//! - [`history`]: The [`ConnectionHistory`], replaced wholesale on every refresh
//! - [`status`]: Current status and the [`StatusWindow`] it has held for
//! - [`stats`]: Latency aggregates and the backend's cumulative counters
//! - [`pagination`]: Newest-first paging of the event log
//! - [`series`]: Chart points for the latency graph
//! - [`state`]: The [`DashboardState`] container and its reducer
//! - [`duration`]: Parsing of CLI durations and formatting of elapsed time
//! - [`export`]: JSON export of the current state
//!
//! ## Data Flow
//!
//! ```text
//! Vec<Sample> (raw JSON)
//!        │
//!        ▼
//! normalize()  ──▶ Vec<CanonicalEntry>
//!        │
//!        ▼
//! DashboardState::reduce(Action::Refreshed)
//!        │
//!        ├──▶ current_status() / StatusWindow
//!        ├──▶ stats()
//!        ├──▶ latency_series()
//!        └──▶ page() / page_controls()
//! ```

pub mod duration;
pub mod export;
pub mod history;
pub mod normalize;
pub mod pagination;
pub mod series;
pub mod state;
pub mod stats;
pub mod status;

pub use history::ConnectionHistory;
pub use normalize::{normalize, normalize_sample, CanonicalEntry, Status};
pub use pagination::{PageAction, PageControls, PageItem, PageView, Pagination, PAGE_SIZE};
pub use series::LatencySeries;
pub use state::{Action, DashboardState};
pub use stats::Stats;
pub use status::{current_status, StatusWindow};
