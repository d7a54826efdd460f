// tests/metrics_provider_errors.rs
#![cfg(feature = "strict-metrics")]

use chrono::NaiveDate;
use edm_news_monitor::config::QueryGroup;
use edm_news_monitor::ingest::providers::news_rss::NewsRssProvider;
use edm_news_monitor::ingest::run_once;
use edm_news_monitor::SearchProvider;
use metrics_exporter_prometheus::PrometheusBuilder;

#[tokio::test]
async fn unreachable_feed_counts_one_error() {
    let handle = PrometheusBuilder::new().install_recorder().expect("recorder");

    // nothing listens on the discard port
    let provider = NewsRssProvider::from_url(
        QueryGroup {
            query: "wire EDM".into(),
            group: "news".into(),
        },
        "http://127.0.0.1:9/rss",
    )
    .expect("client");
    let providers: Vec<Box<dyn SearchProvider>> = vec![Box::new(provider)];

    let hits = run_once(&providers, NaiveDate::from_ymd_opt(2025, 3, 4).unwrap()).await;
    assert!(hits.is_empty());

    let out = handle.render();
    assert!(
        out.lines().any(|l| l == "ingest_provider_errors_total 1"),
        "{out}"
    );
}
