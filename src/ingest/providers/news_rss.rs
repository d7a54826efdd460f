// src/ingest/providers/news_rss.rs
//! News-search RSS provider (Google News RSS format).
//!
//! One provider per query group. HTTP mode queries the search feed; fixture
//! mode parses a given XML string (tests, offline runs).

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use metrics::histogram;
use quick_xml::de::from_str;
use serde::Deserialize;
use time::{format_description::well_known::Rfc2822, OffsetDateTime, UtcOffset};

use crate::config::monitor::QueryGroup;
use crate::ingest::normalize_text;
use crate::ingest::types::{RawHit, SearchProvider};

pub const SEARCH_FEED_URL: &str = "https://news.google.com/rss/search";

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
    source: Option<ItemSource>,
}

#[derive(Debug, Deserialize)]
struct ItemSource {
    #[serde(rename = "$text", default)]
    name: Option<String>,
}

fn parse_rfc2822_date(ts: &str) -> Option<NaiveDate> {
    let dt = OffsetDateTime::parse(ts.trim(), &Rfc2822)
        .ok()?
        .to_offset(UtcOffset::UTC);
    NaiveDate::from_ymd_opt(dt.year(), u8::from(dt.month()) as u32, dt.day() as u32)
}

pub struct NewsRssProvider {
    query: QueryGroup,
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http { url: String, client: reqwest::Client },
}

impl NewsRssProvider {
    pub fn from_fixture(query: QueryGroup, xml: &str) -> Self {
        Self {
            query,
            mode: Mode::Fixture(xml.to_string()),
        }
    }

    pub fn http(query: QueryGroup) -> Result<Self> {
        let url = search_url(&query.query)?;
        Self::from_url(query, url)
    }

    /// HTTP mode against an explicit feed URL (mirrors, local servers).
    pub fn from_url(query: QueryGroup, url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(10))
            .build()
            .context("building search http client")?;
        let url = url.into();
        Ok(Self {
            query,
            mode: Mode::Http { url, client },
        })
    }

    pub fn query(&self) -> &QueryGroup {
        &self.query
    }

    fn parse_items_from_str(&self, s: &str, today: NaiveDate) -> Result<Vec<RawHit>> {
        let t0 = std::time::Instant::now();
        let xml_clean = scrub_html_entities_for_xml(s);
        let rss: Rss = from_str(&xml_clean).context("parsing search rss xml")?;

        let mut out = Vec::with_capacity(rss.channel.item.len());
        for it in rss.channel.item {
            let source = it
                .source
                .and_then(|s| s.name)
                .map(|s| normalize_text(&s))
                .unwrap_or_default();
            let title = strip_source_suffix(
                &normalize_text(it.title.as_deref().unwrap_or_default()),
                &source,
            );
            if title.is_empty() {
                continue;
            }
            let mut snippet = normalize_text(it.description.as_deref().unwrap_or_default());
            // Search feeds often repeat the headline (+ source) as the description.
            if snippet.starts_with(&title) {
                snippet.clear();
            }

            out.push(RawHit {
                title,
                snippet,
                url: it.link.map(|l| l.trim().to_string()).unwrap_or_default(),
                source,
                date: it
                    .pub_date
                    .as_deref()
                    .and_then(parse_rfc2822_date)
                    .unwrap_or(today),
                group: Some(self.query.group.clone()),
            });
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("ingest_parse_ms").record(ms);
        Ok(out)
    }
}

#[async_trait]
impl SearchProvider for NewsRssProvider {
    async fn fetch_hits(&self, today: NaiveDate) -> Result<Vec<RawHit>> {
        match &self.mode {
            Mode::Fixture(s) => self.parse_items_from_str(s, today),
            Mode::Http { url, client } => {
                // errors are counted once, by the ingest loop
                let resp = client
                    .get(url.as_str())
                    .send()
                    .await
                    .context("search http get()")?;
                let status = resp.status();
                if !status.is_success() {
                    anyhow::bail!("search feed returned status {status}");
                }
                let body = resp.text().await.context("search http .text()")?;
                self.parse_items_from_str(&body, today)
            }
        }
    }

    fn name(&self) -> &str {
        &self.query.query
    }
}

/// Feed URL for a free-text query.
pub fn search_url(query: &str) -> Result<String> {
    let url = reqwest::Url::parse_with_params(
        SEARCH_FEED_URL,
        &[("q", query), ("hl", "en-US"), ("gl", "US"), ("ceid", "US:en")],
    )
    .context("building search url")?;
    Ok(url.to_string())
}

/// Feed titles look like "Headline - Publisher"; drop the publisher part.
fn strip_source_suffix(title: &str, source: &str) -> String {
    if !source.is_empty() {
        if let Some(head) = title.strip_suffix(source) {
            if let Some(head) = head.trim_end().strip_suffix('-') {
                return head.trim().to_string();
            }
        }
    }
    title.to_string()
}

fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
        .replace("&hellip;", "...")
}
