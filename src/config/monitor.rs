// src/config/monitor.rs
//! Monitor configuration: keyword tables, brand list, limits and query groups.
//!
//! Loaded once at startup and passed by reference into the classifier, scorer
//! and builder. Lookup order:
//! 1) `$MONITOR_CONFIG_PATH` (must exist)
//! 2) `config/monitor.toml`
//! 3) built-in defaults (`MonitorConfig::default()`)
//!
//! Every field has a default, so a partial TOML file overlays the built-in seed.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::taxonomy::Category;

pub const ENV_MONITOR_CONFIG_PATH: &str = "MONITOR_CONFIG_PATH";
pub const DEFAULT_MONITOR_CONFIG_PATH: &str = "config/monitor.toml";

/// One search query and the group tag its hits carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryGroup {
    pub query: String,
    pub group: String,
}

/// Keyword literals that vote for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryKeywords {
    pub category: Category,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Items kept per run after ranking.
    pub top_n: usize,
    /// Items shown in the CLI report.
    pub report_top_k: usize,
    pub history_path: PathBuf,
    /// Batch entries retained in the history file.
    pub history_cap: usize,
    pub dedup_prefix_chars: usize,
    pub title_max_chars: usize,
    pub summary_max_chars: usize,
    /// Score added per matched category keyword.
    pub keyword_weight: u32,
    /// Head start for the category mapped from a hit's group tag.
    pub group_boost: u32,
    pub queries: Vec<QueryGroup>,
    pub categories: Vec<CategoryKeywords>,
    pub group_categories: HashMap<String, Category>,
    pub high_impact: Vec<String>,
    pub medium_impact: Vec<String>,
    pub problem_keywords: Vec<String>,
    pub forum_markers: Vec<String>,
    /// Canonical brand spellings, matched case-insensitively, first match wins.
    pub brands: Vec<String>,
    pub relevance_keywords: Vec<String>,
}

fn strs(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for MonitorConfig {
    fn default() -> Self {
        let queries = [
            ("EDM machine news", "news"),
            ("elettroerosione novità", "news"),
            ("wire EDM innovation", "technology"),
            ("EDM technology breakthrough", "technology"),
            ("Sodick EDM new model", "new_models"),
            ("GF Machining Solutions EDM", "new_models"),
            ("Mitsubishi EDM updates", "new_models"),
            ("EDM trade show exhibition", "events"),
            ("wire EDM problem forum", "forum_problems"),
            ("EDM machine feature request", "feature_requests"),
        ]
        .into_iter()
        .map(|(q, g)| QueryGroup {
            query: q.to_string(),
            group: g.to_string(),
        })
        .collect();

        let categories = vec![
            CategoryKeywords {
                category: Category::ProblemsSolutions,
                keywords: strs(&[
                    "problem",
                    "issue",
                    "troubleshoot",
                    "solution",
                    "solved",
                    "wire break",
                    "broken",
                    "failure",
                    "error",
                    "alarm",
                    "help",
                ]),
            },
            CategoryKeywords {
                category: Category::NewModels,
                keywords: strs(&[
                    "new model",
                    "launch",
                    "unveil",
                    "introduces",
                    "new series",
                    "new machine",
                    "released",
                    "debut",
                ]),
            },
            CategoryKeywords {
                category: Category::TechnologyInnovations,
                keywords: strs(&[
                    "innovation",
                    "technology",
                    "breakthrough",
                    "artificial intelligence",
                    "automation",
                    "patent",
                    "research",
                    "digital",
                    "generator",
                ]),
            },
            CategoryKeywords {
                category: Category::EventsTradeShows,
                keywords: strs(&[
                    "trade show",
                    "exhibition",
                    "expo",
                    "trade fair",
                    "imts",
                    "jimtof",
                    "emo hannover",
                    "conference",
                    "booth",
                    "webinar",
                ]),
            },
            CategoryKeywords {
                category: Category::FeatureRequests,
                keywords: strs(&[
                    "feature request",
                    "wish list",
                    "wishlist",
                    "would be nice",
                    "suggestion",
                    "please add",
                ]),
            },
            CategoryKeywords {
                category: Category::MarketApplications,
                keywords: strs(&[
                    "market",
                    "aerospace",
                    "medical",
                    "automotive",
                    "mould",
                    "mold making",
                    "demand",
                    "growth",
                    "acquisition",
                ]),
            },
        ];

        let group_categories = [
            ("forum_problems", Category::ProblemsSolutions),
            ("new_models", Category::NewModels),
            ("technology", Category::TechnologyInnovations),
            ("events", Category::EventsTradeShows),
            ("feature_requests", Category::FeatureRequests),
        ]
        .into_iter()
        .map(|(g, c)| (g.to_string(), c))
        .collect();

        Self {
            top_n: 15,
            report_top_k: 5,
            history_path: PathBuf::from("data/edm_news.json"),
            history_cap: 100,
            dedup_prefix_chars: 60,
            title_max_chars: 120,
            summary_max_chars: 250,
            keyword_weight: 2,
            group_boost: 3,
            queries,
            categories,
            group_categories,
            high_impact: strs(&[
                "breakthrough",
                "revolutionary",
                "first",
                "patent",
                "award",
                "record",
                "unprecedented",
            ]),
            medium_impact: strs(&[
                "improved",
                "enhanced",
                "optimized",
                "upgraded",
                "faster",
                "more accurate",
                "efficiency",
            ]),
            problem_keywords: strs(&[
                "broken",
                "breakage",
                "wire break",
                "failure",
                "fault",
                "error",
                "alarm",
                "crash",
                "not working",
            ]),
            forum_markers: strs(&[
                "forum",
                "reddit",
                "practicalmachinist",
                "cnczone",
                "community",
            ]),
            brands: strs(&[
                "Sodick",
                "GF Machining Solutions",
                "AgieCharmilles",
                "Mitsubishi Electric",
                "Mitsubishi",
                "Makino",
                "Fanuc",
                "Excetek",
                "Accutex",
                "Seibu",
                "Chmer",
            ]),
            relevance_keywords: strs(&[
                "edm",
                "electrical discharge",
                "electro-discharge",
                "spark erosion",
                "wire cut",
                "wire-cut",
                "die sinking",
                "sinker",
                "elettroerosione",
            ]),
        }
    }
}

impl MonitorConfig {
    /// Load using env var + fallbacks (see module docs).
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_MONITOR_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!(
                    "{ENV_MONITOR_CONFIG_PATH} points to non-existent path {}",
                    pb.display()
                ));
            }
            return Self::load_from(&pb);
        }
        let default_path = Path::new(DEFAULT_MONITOR_CONFIG_PATH);
        if default_path.exists() {
            return Self::load_from(default_path);
        }
        info!(target: "config", "no monitor config file found, using built-in defaults");
        Ok(Self::default())
    }

    /// Load from an explicit TOML file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading monitor config from {}", path.display()))?;
        let cfg: MonitorConfig = toml::from_str(&content)
            .with_context(|| format!("parsing monitor config {}", path.display()))?;
        info!(target: "config", path = %path.display(), "monitor config loaded");
        Ok(cfg.normalized())
    }

    /// Trim and lower-case keyword lists, drop empties, and repair limits.
    /// Brands keep their canonical spelling (trim only).
    pub fn normalized(mut self) -> Self {
        for ck in &mut self.categories {
            ck.keywords = clean_keywords(std::mem::take(&mut ck.keywords));
        }
        self.high_impact = clean_keywords(std::mem::take(&mut self.high_impact));
        self.medium_impact = clean_keywords(std::mem::take(&mut self.medium_impact));
        self.problem_keywords = clean_keywords(std::mem::take(&mut self.problem_keywords));
        self.forum_markers = clean_keywords(std::mem::take(&mut self.forum_markers));
        self.relevance_keywords = clean_keywords(std::mem::take(&mut self.relevance_keywords));
        self.brands = self
            .brands
            .into_iter()
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty())
            .collect();
        self.group_categories = self
            .group_categories
            .into_iter()
            .map(|(g, c)| (g.trim().to_ascii_lowercase(), c))
            .collect();

        let defaults = Self::default();
        if self.top_n == 0 {
            self.top_n = defaults.top_n;
        }
        if self.history_cap == 0 {
            self.history_cap = defaults.history_cap;
        }
        if self.dedup_prefix_chars == 0 {
            self.dedup_prefix_chars = defaults.dedup_prefix_chars;
        }
        // Room for at least a word plus the ellipsis marker.
        self.title_max_chars = self.title_max_chars.max(10);
        self.summary_max_chars = self.summary_max_chars.max(10);
        self
    }

    /// Keywords configured for `category` (all entries naming it, in file order).
    pub fn keywords_for(&self, category: Category) -> impl Iterator<Item = &str> {
        self.categories
            .iter()
            .filter(move |ck| ck.category == category)
            .flat_map(|ck| ck.keywords.iter().map(String::as_str))
    }

    /// Category a group tag maps to, if any.
    pub fn category_for_group(&self, group: &str) -> Option<Category> {
        self.group_categories
            .get(&group.trim().to_ascii_lowercase())
            .copied()
    }
}

fn clean_keywords(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for it in items {
        let t = it.trim().to_lowercase();
        if !t.is_empty() && !out.contains(&t) {
            out.push(t);
        }
    }
    out
}
