// src/monitor.rs
//! One fetch-and-check cycle: fetch a page, judge its freshness and flatten
//! its items for whoever consumes them. Scheduling repeated cycles is left
//! to the caller.

use metrics::{counter, describe_counter, describe_histogram};
use once_cell::sync::OnceCell;
use serde::Serialize;
use serde_json::Value;

use crate::datasets::DatasetStore;
use crate::extract::{
    extract_activities, extract_coordinates, extract_timestamp, parse_modified_value, Coordinates,
};
use crate::feed::transport::FeedTransport;
use crate::feed::FeedPage;
use crate::freshness::{FreshnessEvaluator, FreshnessReport};

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("feed_pages_checked_total", "Feed pages fetched and evaluated.");
        describe_counter!(
            "feed_pages_recent_total",
            "Feed pages judged recent enough to keep polling."
        );
        describe_counter!(
            "feed_items_skipped_total",
            "Items skipped during freshness evaluation (unreadable dates)."
        );
        describe_counter!(
            "feed_transport_errors_total",
            "Feed fetch/parse errors."
        );
        describe_histogram!("feed_fetch_ms", "Feed fetch + parse time in milliseconds.");
    });
}

/// Flattened view of one feed item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemSummary {
    pub id: Option<String>,
    pub state: Option<String>,
    pub kind: Option<String>,
    /// `modified`, normalized to epoch seconds.
    pub modified: Option<i64>,
    pub activities: Vec<String>,
    pub coordinates: Option<Coordinates>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl ItemSummary {
    pub fn from_item(item: &Value) -> Self {
        let modified = item.get("modified").and_then(|m| match parse_modified_value(m) {
            Ok(ts) => Some(ts),
            Err(e) => {
                tracing::debug!(target: "feed", error = %e, "unreadable modified value");
                None
            }
        });
        Self {
            id: scalar_string(item.get("id")),
            state: scalar_string(item.get("state")),
            kind: scalar_string(item.get("kind")),
            modified,
            activities: extract_activities(item),
            coordinates: extract_coordinates(item),
            start_date: extract_timestamp(item, "startDate"),
            end_date: extract_timestamp(item, "endDate"),
        }
    }
}

fn scalar_string(v: Option<&Value>) -> Option<String> {
    match v? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedCheck {
    pub url: String,
    pub next_url: Option<String>,
    pub freshness: FreshnessReport,
    pub items: Vec<ItemSummary>,
}

impl FeedCheck {
    /// Keep polling only if the page is recent and points somewhere new.
    pub fn should_continue(&self) -> bool {
        self.freshness.recent
            && self
                .next_url
                .as_deref()
                .is_some_and(|next| next != self.url)
    }
}

/// Evaluate an already-fetched page.
pub fn check_page(page: &FeedPage, evaluator: &FreshnessEvaluator, now: i64) -> FeedCheck {
    ensure_metrics_described();

    let freshness = evaluator.evaluate(page, now);
    counter!("feed_pages_checked_total").increment(1);
    if freshness.recent {
        counter!("feed_pages_recent_total").increment(1);
    }
    counter!("feed_items_skipped_total").increment(freshness.items_skipped as u64);

    tracing::info!(
        target: "feed",
        url = %page.source_url,
        mode = ?freshness.mode,
        recent = freshness.recent,
        items = page.items.len(),
        skipped = freshness.items_skipped,
        "page checked"
    );

    FeedCheck {
        url: page.source_url.clone(),
        next_url: page.next_url.clone(),
        freshness,
        items: page.items.iter().map(ItemSummary::from_item).collect(),
    }
}

/// Fetch `url` once and check it.
pub async fn check_feed(
    transport: &dyn FeedTransport,
    url: &str,
    evaluator: &FreshnessEvaluator,
    now: i64,
) -> anyhow::Result<FeedCheck> {
    ensure_metrics_described();
    let page = transport.fetch(url).await?;
    Ok(check_page(&page, evaluator, now))
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetStatus {
    pub id: String,
    pub title: String,
    pub data_url: String,
    pub recent: Option<bool>,
    pub items: usize,
    pub error: Option<String>,
}

/// Check the first page of every known dataset. A failing feed is reported
/// on its own row and does not stop the others.
pub async fn check_datasets(
    store: &dyn DatasetStore,
    transport: &dyn FeedTransport,
    evaluator: &FreshnessEvaluator,
    now: i64,
) -> Vec<DatasetStatus> {
    let records = store.all();
    let mut out = Vec::with_capacity(records.len());
    for rec in records {
        let result = check_feed(transport, &rec.data_url, evaluator, now).await;
        let status = match result {
            Ok(check) => DatasetStatus {
                recent: Some(check.freshness.recent),
                items: check.items.len(),
                error: None,
                id: rec.id,
                title: rec.title,
                data_url: rec.data_url,
            },
            Err(e) => {
                tracing::warn!(
                    target: "datasets",
                    error = ?e,
                    dataset = %rec.id,
                    transport = transport.name(),
                    "dataset check failed"
                );
                DatasetStatus {
                    recent: None,
                    items: 0,
                    error: Some(format!("{e:#}")),
                    id: rec.id,
                    title: rec.title,
                    data_url: rec.data_url,
                }
            }
        };
        out.push(status);
    }
    out
}
