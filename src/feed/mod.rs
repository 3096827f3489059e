// src/feed/mod.rs
//! Feed page model and the transport that produces it.

pub mod transport;

use serde::Deserialize;
use serde_json::Value;
use std::borrow::Cow;

/// Query parameter of a timestamp-cursor feed URL.
pub const AFTER_TIMESTAMP: &str = "afterTimestamp";
/// Query parameter of a change-number-cursor feed URL.
pub const AFTER_CHANGE_NUMBER: &str = "afterChangeNumber";

/// Which cursor the page URL is paging with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaginationMode {
    None,
    TimestampCursor,
    ChangeNumberCursor,
}

/// One fetched page: where it came from and what it held.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedPage {
    pub source_url: String,
    pub items: Vec<Value>,
    /// RPDE `next` link, if the publisher sent one.
    pub next_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PageBody {
    #[serde(default)]
    items: Vec<Value>,
    #[serde(default)]
    next: Option<String>,
}

impl FeedPage {
    pub fn new(source_url: impl Into<String>, items: Vec<Value>) -> Self {
        Self {
            source_url: source_url.into(),
            items,
            next_url: None,
        }
    }

    /// Build a page from a parsed JSON body (`{"items": [...], "next": "..."}`).
    /// A body without `items` yields an empty page.
    pub fn from_body(source_url: impl Into<String>, body: Value) -> anyhow::Result<Self> {
        let body: PageBody = serde_json::from_value(body)?;
        Ok(Self {
            source_url: source_url.into(),
            items: body.items,
            next_url: body.next.filter(|n| !n.trim().is_empty()),
        })
    }

    /// Decoded query parameters of `source_url`, in order.
    pub fn query_pairs(&self) -> Vec<(Cow<'_, str>, Cow<'_, str>)> {
        query_string(&self.source_url)
            .map(|q| url::form_urlencoded::parse(q.as_bytes()).collect())
            .unwrap_or_default()
    }

    /// First value of query parameter `name` (empty string if present without value).
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.query_pairs()
            .into_iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }

    pub fn has_query_param(&self, name: &str) -> bool {
        self.query_pairs().iter().any(|(k, _)| k == name)
    }

    /// Timestamp cursor wins when both cursor params are present.
    pub fn pagination_mode(&self) -> PaginationMode {
        if self.has_query_param(AFTER_TIMESTAMP) {
            PaginationMode::TimestampCursor
        } else if self.has_query_param(AFTER_CHANGE_NUMBER) {
            PaginationMode::ChangeNumberCursor
        } else {
            PaginationMode::None
        }
    }
}

fn query_string(url: &str) -> Option<&str> {
    let (_, rest) = url.split_once('?')?;
    // drop a fragment, if any
    Some(rest.split_once('#').map_or(rest, |(q, _)| q))
}
