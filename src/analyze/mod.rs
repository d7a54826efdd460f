// src/analyze/mod.rs
//! Classification entry: AI enrichment when available, keyword path otherwise.

pub mod ai_adapter;
pub mod builder;
pub mod classifier;
pub mod rank;
pub mod scoring;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::analyze::ai_adapter::{build_provider, AiClassifier};
use crate::config::ai::AiConfig;
use crate::config::MonitorConfig;
use crate::ingest::types::RawHit;
use crate::news::NewsItem;

// Re-export convenient helpers.
pub use crate::analyze::builder::build_item;
pub use crate::analyze::classifier::classify;
pub use crate::analyze::rank::rank_and_select;
pub use crate::analyze::scoring::importance;

/// Which path produced a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifyPath {
    Ai,
    Heuristic,
    /// Enrichment was attempted and failed; the keyword path ran instead.
    Fallback,
}

impl ClassifyPath {
    pub fn as_str(self) -> &'static str {
        match self {
            ClassifyPath::Ai => "ai",
            ClassifyPath::Heuristic => "heuristic",
            ClassifyPath::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Classified {
    pub items: Vec<NewsItem>,
    pub path: ClassifyPath,
}

/// Strategy chosen once at startup by availability.
pub enum Classifier {
    Ai(AiClassifier),
    Heuristic,
}

impl Classifier {
    pub fn from_config(ai: &AiConfig) -> Self {
        match build_provider(ai) {
            Some(provider) => {
                info!(target: "classify", provider = provider.name(), "AI enrichment enabled");
                Classifier::Ai(AiClassifier::new(provider, ai.max_items))
            }
            None => {
                info!(target: "classify", "AI enrichment unavailable; keyword classification only");
                Classifier::Heuristic
            }
        }
    }

    pub fn is_ai(&self) -> bool {
        matches!(self, Classifier::Ai(_))
    }

    /// "heuristic" when no AI provider is configured.
    pub fn provider_name(&self) -> &'static str {
        match self {
            Classifier::Ai(ai) => ai.provider_name(),
            Classifier::Heuristic => "heuristic",
        }
    }

    /// Classify and score a deduplicated batch. Never fails.
    ///
    /// An empty batch never reaches the provider and is reported as
    /// `ClassifyPath::Heuristic`.
    pub async fn classify_batch(
        &self,
        hits: &[RawHit],
        cfg: &MonitorConfig,
        today: NaiveDate,
    ) -> Classified {
        if hits.is_empty() {
            return Classified {
                items: Vec::new(),
                path: ClassifyPath::Heuristic,
            };
        }
        match self {
            Classifier::Heuristic => Classified {
                items: classify_heuristic(hits, cfg),
                path: ClassifyPath::Heuristic,
            },
            Classifier::Ai(ai) => match ai.enrich(hits, cfg, today).await {
                Some(items) => Classified {
                    items,
                    path: ClassifyPath::Ai,
                },
                None => {
                    warn!(target: "classify", "AI enrichment unavailable; using keyword classification");
                    Classified {
                        items: classify_heuristic(hits, cfg),
                        path: ClassifyPath::Fallback,
                    }
                }
            },
        }
    }
}

/// Keyword path: relevance gate, category, importance and cleaning per hit.
pub fn classify_heuristic(hits: &[RawHit], cfg: &MonitorConfig) -> Vec<NewsItem> {
    hits.iter().filter_map(|h| build_item(h, cfg)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::ai_adapter::MockProvider;
    use std::sync::Arc;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 4).unwrap()
    }

    fn mock(answer: Option<&str>) -> Classifier {
        Classifier::Ai(AiClassifier::new(
            Arc::new(MockProvider {
                fixed: answer.map(str::to_string),
            }),
            25,
        ))
    }

    #[test]
    fn strategy_names() {
        assert!(mock(None).is_ai());
        assert_eq!(mock(None).provider_name(), "mock");
        assert!(!Classifier::Heuristic.is_ai());
        assert_eq!(Classifier::Heuristic.provider_name(), "heuristic");
    }

    #[tokio::test]
    async fn empty_batch_skips_enrichment() {
        let cfg = MonitorConfig::default();
        let out = mock(Some("not json")).classify_batch(&[], &cfg, today()).await;
        assert_eq!(out.path, ClassifyPath::Heuristic);
        assert!(out.items.is_empty());
    }

    #[tokio::test]
    async fn unusable_answer_is_a_fallback() {
        let cfg = MonitorConfig::default();
        let hits = vec![RawHit::new("Wire EDM news", "s", today())];
        let out = mock(Some("not json")).classify_batch(&hits, &cfg, today()).await;
        assert_eq!(out.path, ClassifyPath::Fallback);
        assert_eq!(out.items, classify_heuristic(&hits, &cfg));
    }
}
