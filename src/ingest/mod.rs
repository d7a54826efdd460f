// src/ingest/mod.rs
pub mod dedup;
pub mod providers;
pub mod types;

use crate::config::monitor::QueryGroup;
use crate::ingest::providers::news_rss::NewsRssProvider;
use crate::ingest::types::{RawHit, SearchProvider};
use chrono::NaiveDate;
use metrics::{counter, describe_counter, describe_histogram};
use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;

pub use dedup::{dedup_hits, dedup_key};

/// One-time metrics registration (so series show up once a recorder is installed).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_hits_total", "Total hits parsed from providers.");
        describe_counter!(
            "ingest_empty_queries_total",
            "Provider queries that returned zero hits."
        );
        describe_counter!(
            "ingest_provider_errors_total",
            "Provider fetch/parse errors."
        );
        describe_counter!("ingest_dedup_total", "Hits removed by title deduplication.");
        describe_histogram!("ingest_parse_ms", "Provider parse time in milliseconds.");
        describe_counter!(
            "pipeline_items_total",
            "News items selected and persisted."
        );
        describe_counter!(
            "pipeline_ai_fallback_total",
            "Runs where enrichment was unavailable and the keyword path ran."
        );
    });
}

static RE_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// Normalize text: decode entities, strip tags, fold quotes, collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    out = RE_TAGS.replace_all(&out, " ").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace (incl. NBSP)
    out = RE_WS.replace_all(&out, " ").trim().to_string();

    // 5) Length cap: 2000 chars
    if out.chars().count() > 2000 {
        out = out.chars().take(2000).collect();
    }

    out
}

/// Normalize the text fields of a hit coming from any provider.
pub fn normalize_hit(mut hit: RawHit) -> RawHit {
    hit.title = normalize_text(&hit.title);
    hit.snippet = normalize_text(&hit.snippet);
    hit.source = normalize_text(&hit.source);
    hit.url = hit.url.trim().to_string();
    hit.group = hit
        .group
        .map(|g| g.trim().to_string())
        .filter(|g| !g.is_empty());
    hit
}

/// Build HTTP providers for the configured query groups. A provider that cannot
/// be built is logged and skipped.
pub fn providers_for(queries: &[QueryGroup]) -> Vec<Box<dyn SearchProvider>> {
    let mut out: Vec<Box<dyn SearchProvider>> = Vec::with_capacity(queries.len());
    for q in queries {
        match NewsRssProvider::http(q.clone()) {
            Ok(p) => out.push(Box::new(p)),
            Err(e) => {
                tracing::warn!(target: "ingest", error = ?e, query = %q.query, "provider setup failed")
            }
        }
    }
    out
}

/// Run every provider once and collect normalized hits.
/// Errors and empty queries are logged and counted; they never abort the run.
pub async fn run_once(providers: &[Box<dyn SearchProvider>], today: NaiveDate) -> Vec<RawHit> {
    ensure_metrics_described();

    let mut raw = Vec::new();
    for p in providers {
        match p.fetch_hits(today).await {
            Ok(v) if v.is_empty() => {
                tracing::warn!(target: "ingest", provider = p.name(), "query returned no hits");
                counter!("ingest_empty_queries_total").increment(1);
            }
            Ok(v) => {
                tracing::info!(target: "ingest", provider = p.name(), hits = v.len(), "query ok");
                counter!("ingest_hits_total").increment(v.len() as u64);
                raw.extend(v.into_iter().map(normalize_hit));
            }
            Err(e) => {
                tracing::warn!(target: "ingest", error = ?e, provider = p.name(), "provider error");
                counter!("ingest_provider_errors_total").increment(1);
            }
        }
    }

    raw
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_text_decodes_and_collapses() {
        let s = "  <b>Wire&nbsp;EDM</b>&nbsp;&nbsp; “upgrade”  ";
        assert_eq!(normalize_text(s), r#"Wire EDM "upgrade""#);
    }

    #[test]
    fn normalize_text_keeps_sentence_punctuation() {
        assert_eq!(normalize_text("New EDM. Faster!"), "New EDM. Faster!");
    }

    #[test]
    fn normalize_hit_drops_blank_group() {
        let hit = RawHit::new(" A ", " B ", chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
            .with_group("  ");
        let n = normalize_hit(hit);
        assert_eq!(n.title, "A");
        assert_eq!(n.source, "B");
        assert!(n.group.is_none());
    }
}
