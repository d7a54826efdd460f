// src/lib.rs
// Public library surface for the CLI and integration tests.

pub mod analyze;
pub mod config;
pub mod history;
pub mod ingest;
pub mod news;
pub mod pipeline;
pub mod report;
pub mod taxonomy;

// ---- Re-exports for stable public API ----
pub use crate::analyze::ai_adapter;
pub use crate::analyze::{ClassifyPath, Classifier};
pub use crate::config::{AiConfig, MonitorConfig};
pub use crate::history::{BatchEntry, HistoryStore};
pub use crate::ingest::types::{RawHit, SearchProvider};
pub use crate::news::NewsItem;
pub use crate::pipeline::{Pipeline, RunOutcome};
pub use crate::report::RunReport;
pub use crate::taxonomy::Category;
