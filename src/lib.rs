// src/lib.rs
// Public library surface for integration tests (and the shuttle binary).

pub mod api;
pub mod config;
pub mod datasets;
pub mod extract;
pub mod feed;
pub mod freshness;
pub mod metrics;
pub mod monitor;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::datasets::{DatasetRecord, DatasetStore, FileDatasetCache, UpdateStatus};
pub use crate::extract::{
    extract_activities, extract_coordinates, extract_timestamp, parse_modified, Coordinates,
    TimestampError,
};
pub use crate::feed::transport::{FeedFetcher, FeedTransport};
pub use crate::feed::{FeedPage, PaginationMode};
pub use crate::freshness::{
    is_page_recent, uses_modified_timestamps, FreshnessEvaluator, FreshnessReport,
};
pub use crate::monitor::{check_datasets, check_feed, check_page, FeedCheck, ItemSummary};

use std::sync::Arc;
use tracing::{info, warn};

/// Build the service state from config: file-backed dataset cache plus the
/// HTTP transport. A missing/unreadable catalogue is logged and leaves the
/// cache empty; the service still starts.
pub async fn build_state(cfg: &config::MonitorConfig) -> anyhow::Result<api::AppState> {
    let cache = FileDatasetCache::new(&cfg.datasets_path);
    match cache.update().await {
        Ok(status) => info!(target: "datasets", %status, "initial datasets load"),
        Err(e) => warn!(target: "datasets", error = ?e, "initial datasets load failed"),
    }
    let transport = FeedFetcher::http(cfg.http_timeout(), &cfg.user_agent)?;

    Ok(api::AppState {
        datasets: Arc::new(cache),
        transport: Arc::new(transport),
        evaluator: cfg.evaluator(),
    })
}
