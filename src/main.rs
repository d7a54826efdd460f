//! EDM News Monitor — Binary Entrypoint
//! Loads configuration, searches the configured query groups, classifies and
//! persists one batch, then prints the run summary.
//!
//! Usage: `edm-monitor [hits.json]`. With a path, hits are read from that JSON
//! array instead of the live search feeds.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use edm_news_monitor::{
    ingest, AiConfig, Classifier, MonitorConfig, Pipeline, RawHit, RunReport,
};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact logs by default; `LOG_FORMAT=json` for structured output.
/// `RUST_LOG` overrides the filter.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("ingest=info,classify=info,pipeline=info,history=info,config=info,warn")
    });

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}

fn load_hits_file(path: &Path) -> Result<Vec<RawHit>> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("reading hits from {}", path.display()))?;
    let hits: Vec<RawHit> = serde_json::from_str(&data)
        .with_context(|| format!("parsing hits file {}", path.display()))?;
    Ok(hits.into_iter().map(ingest::normalize_hit).collect())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = MonitorConfig::load_default().context("loading monitor config")?;
    let ai = AiConfig::load_default().context("loading AI config")?;
    let top_k = cfg.report_top_k;
    let now = Utc::now();

    info!(target: "pipeline", at = %now.to_rfc3339(), "EDM monitor starting");

    let classifier = Classifier::from_config(&ai);
    info!(
        target: "classify",
        ai = classifier.is_ai(),
        provider = classifier.provider_name(),
        "classifier selected"
    );
    let pipeline = Pipeline::new(cfg, classifier);
    let outcome = match std::env::args().nth(1) {
        Some(path) => {
            let hits = load_hits_file(Path::new(&path))?;
            pipeline.run(hits, now).await
        }
        None => {
            let providers = ingest::providers_for(&pipeline.config().queries);
            pipeline.run_with_providers(&providers, now).await
        }
    };

    info!(
        target: "pipeline",
        fetched = outcome.fetched,
        duplicates = outcome.duplicates,
        classified = outcome.classified,
        path = outcome.path.as_str(),
        stored = ?outcome.stored_entries,
        "run complete"
    );
    println!("{}", RunReport::from_items(&outcome.selected, top_k));
    if outcome.stored_entries.is_some() {
        println!("Saved to {}", pipeline.store().path().display());
    }

    Ok(())
}
