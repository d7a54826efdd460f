// src/ingest/types.rs
use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One search result before classification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawHit {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub source: String, // display name, e.g. "Modern Machine Shop"
    #[serde(default = "today_utc")]
    pub date: NaiveDate,
    /// Query group that produced the hit, e.g. "forum_problems".
    #[serde(default)]
    pub group: Option<String>,
}

fn today_utc() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

impl RawHit {
    pub fn new(title: impl Into<String>, source: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            snippet: String::new(),
            url: String::new(),
            source: source.into(),
            date,
            group: None,
        }
    }

    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = snippet.into();
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// `title + " " + snippet`, the text classification and scoring look at.
    pub fn combined_text(&self) -> String {
        if self.snippet.is_empty() {
            self.title.clone()
        } else {
            format!("{} {}", self.title, self.snippet)
        }
    }

    /// Where the hit came from (group tag, source, url), for origin signals.
    pub fn origin(&self) -> String {
        format!(
            "{} {} {}",
            self.group.as_deref().unwrap_or_default(),
            self.source,
            self.url
        )
    }
}

#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    /// Fetch hits for this provider's query. `today` is the date assigned to
    /// hits that carry none.
    async fn fetch_hits(&self, today: NaiveDate) -> Result<Vec<RawHit>>;
    fn name(&self) -> &str;
}
