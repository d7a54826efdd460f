// tests/ingest_providers.rs
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use edm_news_monitor::analyze::classify_heuristic;
use edm_news_monitor::config::QueryGroup;
use edm_news_monitor::ingest::providers::news_rss::NewsRssProvider;
use edm_news_monitor::ingest::run_once;
use edm_news_monitor::{MonitorConfig, RawHit, SearchProvider};

const FIXTURE: &str = include_str!("fixtures/news_rss.xml");

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 5).unwrap()
}

fn rss_provider() -> NewsRssProvider {
    NewsRssProvider::from_fixture(
        QueryGroup {
            query: "wire EDM".into(),
            group: "news".into(),
        },
        FIXTURE,
    )
}

struct Failing;

#[async_trait]
impl SearchProvider for Failing {
    async fn fetch_hits(&self, _today: NaiveDate) -> Result<Vec<RawHit>> {
        Err(anyhow!("connection reset"))
    }
    fn name(&self) -> &str {
        "failing"
    }
}

struct Empty;

#[async_trait]
impl SearchProvider for Empty {
    async fn fetch_hits(&self, _today: NaiveDate) -> Result<Vec<RawHit>> {
        Ok(Vec::new())
    }
    fn name(&self) -> &str {
        "empty"
    }
}

#[tokio::test]
async fn fixture_feed_parses_into_hits() {
    let hits = rss_provider().fetch_hits(today()).await.unwrap();
    assert_eq!(hits.len(), 3);

    let sodick = &hits[0];
    assert_eq!(
        sodick.title,
        "Sodick unveils revolutionary wire EDM with 30% faster cutting"
    );
    assert_eq!(sodick.source, "Modern Machine Shop");
    assert!(sodick.snippet.is_empty(), "headline echo should be dropped");
    assert_eq!(sodick.date, NaiveDate::from_ymd_opt(2025, 3, 4).unwrap());
    assert_eq!(sodick.group.as_deref(), Some("news"));

    let gf = &hits[1];
    assert!(gf.snippet.contains("improved generator"));
    assert_eq!(gf.date, NaiveDate::from_ymd_opt(2025, 3, 3).unwrap());

    let bakery = &hits[2];
    assert_eq!(bakery.source, "");
    assert_eq!(bakery.date, today());
}

#[tokio::test]
async fn fixture_feed_keeps_only_relevant_items() {
    let hits = rss_provider().fetch_hits(today()).await.unwrap();
    let items = classify_heuristic(&hits, &MonitorConfig::default());
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|i| i.title != "Local bakery wins award"));
}

#[tokio::test]
async fn failing_and_empty_providers_do_not_abort_collection() {
    let providers: Vec<Box<dyn SearchProvider>> =
        vec![Box::new(Failing), Box::new(rss_provider()), Box::new(Empty)];
    let hits = run_once(&providers, today()).await;
    assert_eq!(hits.len(), 3);
}

#[tokio::test]
async fn all_providers_failing_yields_no_hits() {
    let providers: Vec<Box<dyn SearchProvider>> = vec![Box::new(Failing), Box::new(Empty)];
    assert!(run_once(&providers, today()).await.is_empty());
}
