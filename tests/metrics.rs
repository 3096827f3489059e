// tests/metrics.rs
#![cfg(feature = "strict-metrics")]
use activity_feed_monitor::metrics::Metrics;
use activity_feed_monitor::{check_page, FeedPage, FreshnessEvaluator};
use serde_json::json;

#[test]
fn metrics_exposed_after_check() {
    let metrics = Metrics::init(3600).expect("recorder");

    let page = FeedPage::new(
        "http://www.example.com?afterChangeNumber=1",
        vec![
            json!({"data": {"endDate": "garbage"}}),
            json!({"data": {"startDate": "2017-09-22T12:35:02Z"}}),
        ],
    );
    let check = check_page(&page, &FreshnessEvaluator::default(), 1_506_335_263);
    assert!(check.freshness.recent);

    let out = metrics.handle.render();
    assert!(out.contains("feed_pages_checked_total"));
    assert!(out.contains("feed_pages_recent_total"));
    assert!(out.contains("feed_items_skipped_total"));
    assert!(out.contains("feed_recency_window_secs"));
}
