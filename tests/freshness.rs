// tests/freshness.rs
//
// Page-level freshness against the shared multi-item fixture.
// 1506335263 = 2017-09-25, a few days after the fixture's sessions.
// 1577836800 = 2020-01-01, more than a year after every session ended.

use activity_feed_monitor::freshness::{FreshnessEvaluator, DEFAULT_RECENCY_WINDOW_SECS};
use activity_feed_monitor::{is_page_recent, uses_modified_timestamps, FeedPage, PaginationMode};
use serde_json::Value;

const FIXTURE: &str = include_str!("fixtures/multiple-items.json");
const NEAR: i64 = 1_506_335_263;
const FAR: i64 = 1_577_836_800;

fn body() -> Value {
    serde_json::from_str(FIXTURE).expect("fixture json")
}

fn page(url: &str) -> FeedPage {
    FeedPage::from_body(url, body()).expect("fixture page")
}

#[test]
fn recent_within_a_year_with_timestamp_cursor() {
    assert!(is_page_recent(&page("http://www.example.com?afterTimestamp=1506335000"), NEAR));
}

#[test]
fn timestamp_cursor_is_recent_at_any_instant() {
    let p = page("http://www.example.com?afterTimestamp=1506335000");
    assert!(is_page_recent(&p, FAR));
    assert!(is_page_recent(&p, i64::MAX));
}

#[test]
fn recent_within_a_year_from_extracted_date() {
    assert!(is_page_recent(&page("http://www.example.com?afterChangeNumber=1000"), NEAR));
}

#[test]
fn recent_when_ongoing_without_end_date() {
    let mut b = body();
    b["items"][1]["data"]["subEvent"][0]
        .as_object_mut()
        .expect("subEvent object")
        .remove("endDate");
    let p = FeedPage::from_body("http://www.example.com?afterChangeNumber=1000", b).unwrap();
    assert!(is_page_recent(&p, NEAR));
    assert!(is_page_recent(&p, FAR));
}

#[test]
fn not_recent_from_extracted_date_after_a_year() {
    assert!(!is_page_recent(&page("http://www.example.com?afterChangeNumber=1000"), FAR));
}

#[test]
fn no_cursor_behaves_like_change_number() {
    let p = page("http://www.example.com");
    assert_eq!(p.pagination_mode(), PaginationMode::None);
    assert!(is_page_recent(&p, NEAR));
    assert!(!is_page_recent(&p, FAR));
}

#[test]
fn report_details_for_change_number_page() {
    let p = page("http://www.example.com?afterChangeNumber=1000");
    let r = FreshnessEvaluator::default().evaluate(&p, NEAR);
    assert_eq!(r.mode, PaginationMode::ChangeNumberCursor);
    // the deleted item carries no dates
    assert_eq!(r.items_considered, 2);
    assert_eq!(r.items_skipped, 0);
    assert_eq!(r.latest_end, Some(1_506_852_000));
    assert!(r.recent);
}

#[test]
fn latest_end_plus_window_is_the_cutoff() {
    let p = page("http://www.example.com?afterChangeNumber=1000");
    let cutoff = 1_506_852_000 + DEFAULT_RECENCY_WINDOW_SECS;
    assert!(is_page_recent(&p, cutoff));
    assert!(!is_page_recent(&p, cutoff + 1));
}

#[test]
fn malformed_dates_do_not_flip_a_recent_page() {
    let mut b = body();
    b["items"][0]["data"]["endDate"] = Value::from("sometime soon");
    let p = FeedPage::from_body("http://www.example.com?afterChangeNumber=1000", b).unwrap();
    let r = FreshnessEvaluator::default().evaluate(&p, NEAR);
    assert!(r.recent);
    assert_eq!(r.items_skipped, 1);
}

#[test]
fn empty_page_is_not_recent() {
    let p = FeedPage::new("http://www.example.com?afterChangeNumber=1000", vec![]);
    assert!(!is_page_recent(&p, NEAR));
}

#[test]
fn uses_modified_timestamps_false_without_params() {
    assert!(!uses_modified_timestamps(&page("http://www.example.com")));
}

#[test]
fn uses_modified_timestamps_false_with_change_number_only() {
    assert!(!uses_modified_timestamps(&page("http://www.example.com?afterChangeNumber=1000")));
}

#[test]
fn uses_modified_timestamps_true_with_after_timestamp() {
    assert!(uses_modified_timestamps(&page("http://www.example.com?afterTimestamp=1506335000")));
    assert!(uses_modified_timestamps(&page(
        "http://www.example.com?afterChangeNumber=1000&afterTimestamp=1506335000"
    )));
}
