// src/freshness.rs
//! # Freshness
//! Decides whether a fetched page is still worth polling.
//!
//! Timestamp-cursor feeds are fresh by construction: the cursor itself
//! only returns changes after the given instant. Change-number feeds (and
//! URLs with no cursor at all) have to be judged by their content: a page
//! is fresh if any item ended within the window, or has not ended yet.

use serde::Serialize;
use serde_json::Value;

use crate::extract::{extract_timestamp, parse_iso8601, TimestampError};
use crate::feed::{FeedPage, PaginationMode};

/// 365 days.
pub const DEFAULT_RECENCY_WINDOW_SECS: i64 = 365 * 24 * 3600;

/// How one item contributes to the page verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemRecency {
    /// Has a start date but no end date.
    Ongoing,
    /// Ended at this epoch second.
    Ended(i64),
    /// Neither date present.
    Undated,
}

/// Outcome of evaluating one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FreshnessReport {
    pub mode: PaginationMode,
    pub recent: bool,
    /// Items whose dates could be read.
    pub items_considered: usize,
    /// Items dropped because a date failed to parse.
    pub items_skipped: usize,
    pub ongoing_items: usize,
    /// Latest end date seen, epoch seconds.
    pub latest_end: Option<i64>,
}

#[derive(Debug, Clone, Copy)]
pub struct FreshnessEvaluator {
    window_secs: i64,
}

impl Default for FreshnessEvaluator {
    fn default() -> Self {
        Self {
            window_secs: DEFAULT_RECENCY_WINDOW_SECS,
        }
    }
}

impl FreshnessEvaluator {
    /// Non-positive windows fall back to the default.
    pub fn with_window_secs(window_secs: i64) -> Self {
        if window_secs <= 0 {
            tracing::warn!(
                target: "feed",
                window_secs,
                "non-positive recency window, using default"
            );
            return Self::default();
        }
        Self { window_secs }
    }

    pub fn window_secs(&self) -> i64 {
        self.window_secs
    }

    pub fn is_page_recent(&self, page: &FeedPage, now: i64) -> bool {
        self.evaluate(page, now).recent
    }

    pub fn evaluate(&self, page: &FeedPage, now: i64) -> FreshnessReport {
        let mode = page.pagination_mode();
        let mut report = FreshnessReport {
            mode,
            recent: false,
            items_considered: 0,
            items_skipped: 0,
            ongoing_items: 0,
            latest_end: None,
        };

        if mode == PaginationMode::TimestampCursor {
            report.recent = true;
            return report;
        }

        for item in &page.items {
            match item_recency(item) {
                Ok(ItemRecency::Undated) => {}
                Ok(ItemRecency::Ongoing) => {
                    report.items_considered += 1;
                    report.ongoing_items += 1;
                    report.recent = true;
                }
                Ok(ItemRecency::Ended(end)) => {
                    report.items_considered += 1;
                    report.latest_end = report.latest_end.max(Some(end));
                    if now.saturating_sub(end) <= self.window_secs {
                        report.recent = true;
                    }
                }
                Err(e) => {
                    report.items_skipped += 1;
                    tracing::debug!(
                        target: "feed",
                        error = %e,
                        id = ?item.get("id"),
                        "skipping item with unreadable date"
                    );
                }
            }
        }

        report
    }
}

/// Effective date of an item: its end date, or ongoing if it only has a
/// start date.
pub fn item_recency(item: &Value) -> Result<ItemRecency, TimestampError> {
    if let Some(end) = extract_timestamp(item, "endDate") {
        return parse_iso8601(&end).map(ItemRecency::Ended);
    }
    if extract_timestamp(item, "startDate").is_some() {
        return Ok(ItemRecency::Ongoing);
    }
    Ok(ItemRecency::Undated)
}

/// True iff the page URL carries an `afterTimestamp` cursor.
pub fn uses_modified_timestamps(page: &FeedPage) -> bool {
    page.pagination_mode() == PaginationMode::TimestampCursor
}

/// [`FreshnessEvaluator::is_page_recent`] with the default one-year window.
pub fn is_page_recent(page: &FeedPage, now: i64) -> bool {
    FreshnessEvaluator::default().is_page_recent(page, now)
}
