//! # Pipeline
//! One monitoring run: dedup → classify (AI or keywords) → rank/select → persist.
//!
//! Nothing here aborts a run: provider errors, enrichment failures and a
//! corrupt history are all recovered where they happen. A failed history
//! write is reported in `RunOutcome::stored_entries`.

use chrono::{DateTime, Utc};
use metrics::counter;
use tracing::{error, info};

use crate::analyze::{rank_and_select, ClassifyPath, Classifier};
use crate::config::MonitorConfig;
use crate::history::HistoryStore;
use crate::ingest::types::{RawHit, SearchProvider};
use crate::ingest::{self, dedup_hits};
use crate::news::NewsItem;

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub fetched: usize,
    pub duplicates: usize,
    /// Items produced by classification, before the top-N cut.
    pub classified: usize,
    pub selected: Vec<NewsItem>,
    pub path: ClassifyPath,
    /// Entries in the history after this run; `None` if the write failed.
    pub stored_entries: Option<usize>,
}

pub struct Pipeline {
    cfg: MonitorConfig,
    classifier: Classifier,
    store: HistoryStore,
}

impl Pipeline {
    pub fn new(cfg: MonitorConfig, classifier: Classifier) -> Self {
        let store = HistoryStore::from_config(&cfg);
        Self {
            cfg,
            classifier,
            store,
        }
    }

    pub fn with_store(mut self, store: HistoryStore) -> Self {
        self.store = store;
        self
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.cfg
    }

    pub fn store(&self) -> &HistoryStore {
        &self.store
    }

    /// Fetch from every provider, then run the pipeline on the collected hits.
    pub async fn run_with_providers(
        &self,
        providers: &[Box<dyn SearchProvider>],
        now: DateTime<Utc>,
    ) -> RunOutcome {
        let hits = ingest::run_once(providers, now.date_naive()).await;
        self.run(hits, now).await
    }

    /// Run on hits that were already fetched.
    pub async fn run(&self, hits: Vec<RawHit>, now: DateTime<Utc>) -> RunOutcome {
        ingest::ensure_metrics_described();
        let fetched = hits.len();

        let (unique, duplicates) = dedup_hits(hits, self.cfg.dedup_prefix_chars);
        counter!("ingest_dedup_total").increment(duplicates as u64);
        info!(target: "pipeline", fetched, duplicates, unique = unique.len(), "hits deduplicated");

        let classified = self
            .classifier
            .classify_batch(&unique, &self.cfg, now.date_naive())
            .await;
        if classified.path == ClassifyPath::Fallback {
            counter!("pipeline_ai_fallback_total").increment(1);
        }
        let classified_count = classified.items.len();

        let selected = rank_and_select(classified.items, self.cfg.top_n);
        counter!("pipeline_items_total").increment(selected.len() as u64);
        info!(
            target: "pipeline",
            path = classified.path.as_str(),
            classified = classified_count,
            selected = selected.len(),
            "batch classified"
        );

        // Empty runs are stored too, so every run leaves one entry.
        let stored_entries = match self.store.append(selected.clone(), now) {
            Ok(n) => Some(n),
            Err(e) => {
                error!(target: "history", error = ?e, "failed to persist batch");
                None
            }
        };

        RunOutcome {
            fetched,
            duplicates,
            classified: classified_count,
            selected,
            path: classified.path,
            stored_entries,
        }
    }
}
