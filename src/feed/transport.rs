// src/feed/transport.rs
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use std::collections::HashMap;
use std::time::Duration;

use crate::feed::FeedPage;

#[async_trait]
pub trait FeedTransport: Send + Sync {
    /// GET `url` and parse the body into a page.
    async fn fetch(&self, url: &str) -> Result<FeedPage>;
    fn name(&self) -> &'static str;
}

pub struct FeedFetcher {
    mode: Mode,
}

enum Mode {
    // URL -> raw JSON body
    Fixture(HashMap<String, String>),
    Http { client: reqwest::Client },
}

impl FeedFetcher {
    pub fn from_fixtures<I, K, V>(pages: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            mode: Mode::Fixture(
                pages
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    pub fn http(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .context("building feed http client")?;
        Ok(Self {
            mode: Mode::Http { client },
        })
    }

    async fn fetch_page(&self, url: &str) -> Result<FeedPage> {
        match &self.mode {
            Mode::Fixture(pages) => {
                let body = pages
                    .get(url)
                    .ok_or_else(|| anyhow!("no fixture registered for {url}"))?;
                Self::parse_page(url, body)
            }
            Mode::Http { client } => {
                let resp = client.get(url).send().await.context("feed http get()")?;
                let status = resp.status();
                if !status.is_success() {
                    anyhow::bail!("feed {url} returned status {status}");
                }
                let body = resp.text().await.context("feed http .text()")?;
                Self::parse_page(url, &body)
            }
        }
    }

    fn parse_page(url: &str, body: &str) -> Result<FeedPage> {
        let json: serde_json::Value =
            serde_json::from_str(body).with_context(|| format!("parsing feed json from {url}"))?;
        FeedPage::from_body(url, json).with_context(|| format!("reading feed page {url}"))
    }
}

#[async_trait]
impl FeedTransport for FeedFetcher {
    /// Every failure (miss, http error, bad status, bad body) bumps
    /// `feed_transport_errors_total` exactly once, here.
    async fn fetch(&self, url: &str) -> Result<FeedPage> {
        let t0 = std::time::Instant::now();
        let page = self.fetch_page(url).await;

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("feed_fetch_ms").record(ms);
        if let Err(e) = &page {
            tracing::warn!(target: "feed", error = ?e, %url, provider = self.name(), "feed fetch failed");
            counter!("feed_transport_errors_total").increment(1);
        }
        page
    }

    fn name(&self) -> &'static str {
        match self.mode {
            Mode::Fixture(_) => "fixture",
            Mode::Http { .. } => "http",
        }
    }
}
