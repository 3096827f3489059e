// tests/metrics_counters.rs
// Runs without `strict-metrics`: each test renders its own thread-local
// recorder, so no global install is needed.
use activity_feed_monitor::monitor::check_datasets;
use activity_feed_monitor::{
    check_feed, check_page, FeedFetcher, FeedPage, FileDatasetCache, FreshnessEvaluator,
};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde_json::json;
use std::fs;
use std::future::Future;

const ITEMS: &str = include_str!("fixtures/multiple-items.json");
const DATASETS: &str = include_str!("fixtures/datasets.json");
const RIVERSIDE: &str = "http://feeds.example.com/riverside?afterChangeNumber=1000";
const NEAR: i64 = 1_506_335_263;

/// Drive `fut` on this thread with a fresh recorder active; return the
/// rendered exposition text.
fn render_after<F: Future>(fut: F) -> (F::Output, String) {
    let recorder = PrometheusBuilder::new().build_recorder();
    let handle: PrometheusHandle = recorder.handle();
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime");
    let out = metrics::with_local_recorder(&recorder, || rt.block_on(fut));
    (out, handle.render())
}

fn sample(out: &str, name: &str) -> Option<f64> {
    out.lines()
        .filter(|l| !l.starts_with('#'))
        .find_map(|l| l.strip_prefix(name)?.strip_prefix(' ')?.trim().parse().ok())
}

#[test]
fn page_counters_reach_the_exporter() {
    let page = FeedPage::new(
        "http://www.example.com?afterChangeNumber=1",
        vec![
            json!({"data": {"endDate": "garbage"}}),
            json!({"data": {"startDate": "2017-09-22T12:35:02Z"}}),
        ],
    );
    let (check, out) =
        render_after(async { check_page(&page, &FreshnessEvaluator::default(), NEAR) });
    assert!(check.freshness.recent);

    assert_eq!(sample(&out, "feed_pages_checked_total"), Some(1.0));
    assert_eq!(sample(&out, "feed_pages_recent_total"), Some(1.0));
    assert_eq!(sample(&out, "feed_items_skipped_total"), Some(1.0));
}

#[test]
fn one_failed_fetch_counts_one_error() {
    let fetcher = FeedFetcher::from_fixtures([(RIVERSIDE, ITEMS)]);
    let ev = FreshnessEvaluator::default();

    let ((ok, missing), out) = render_after(async {
        let ok = check_feed(&fetcher, RIVERSIDE, &ev, NEAR).await;
        let missing = check_feed(&fetcher, "http://feeds.example.com/nowhere", &ev, NEAR).await;
        (ok, missing)
    });
    assert!(ok.is_ok());
    assert!(missing.is_err());

    assert_eq!(sample(&out, "feed_transport_errors_total"), Some(1.0));
    assert_eq!(sample(&out, "feed_pages_checked_total"), Some(1.0));
}

#[test]
fn failing_dataset_row_counts_one_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("datasets.json");
    fs::write(&path, DATASETS).unwrap();

    // hillside has no fixture, riverside does, broken never loads
    let fetcher = FeedFetcher::from_fixtures([(RIVERSIDE, ITEMS)]);
    let (rows, out) = render_after(async {
        let cache = FileDatasetCache::open(&path).await.unwrap();
        check_datasets(&cache, &fetcher, &FreshnessEvaluator::default(), NEAR).await
    });
    assert_eq!(rows.iter().filter(|r| r.error.is_some()).count(), 1);

    assert_eq!(sample(&out, "feed_transport_errors_total"), Some(1.0));
}

#[test]
fn unparseable_body_is_counted_too() {
    let fetcher = FeedFetcher::from_fixtures([("u", "{not json")]);
    let (res, out) = render_after(async {
        check_feed(&fetcher, "u", &FreshnessEvaluator::default(), NEAR).await
    });
    assert!(res.is_err());
    assert_eq!(sample(&out, "feed_transport_errors_total"), Some(1.0));
}
