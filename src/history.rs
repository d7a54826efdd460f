//! history.rs — rolling on-disk history of run batches.
//!
//! Layout: a JSON array of `{ "timestamp": ..., "data": { "items": [...] } }`,
//! oldest first, capped at the most recent `cap` entries. The file is rewritten
//! in full on every append (temp file + rename).

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::MonitorConfig;
use crate::news::NewsItem;

pub const DEFAULT_HISTORY_CAP: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchData {
    #[serde(default)]
    pub items: Vec<NewsItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchEntry {
    /// Written as RFC 3339; offset-less timestamps from older files read as UTC.
    #[serde(deserialize_with = "de_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub data: BatchData,
}

fn de_timestamp<'de, D>(deserializer: D) -> std::result::Result<DateTime<Utc>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).ok_or_else(|| {
        serde::de::Error::custom(format!("invalid history timestamp: {raw:?}"))
    })
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|n| n.and_utc())
}

impl BatchEntry {
    pub fn new(timestamp: DateTime<Utc>, items: Vec<NewsItem>) -> Self {
        Self {
            timestamp,
            data: BatchData { items },
        }
    }
}

#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
    cap: usize,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>, cap: usize) -> Self {
        Self {
            path: path.into(),
            cap: cap.max(1),
        }
    }

    pub fn from_config(cfg: &MonitorConfig) -> Self {
        Self::new(cfg.history_path.clone(), cfg.history_cap)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Load stored entries. A missing file is empty history; an unreadable or
    /// non-array file is logged and treated as empty; individual malformed
    /// entries are skipped.
    pub fn load(&self) -> Vec<BatchEntry> {
        let content = match fs::read_to_string(&self.path) {
            Ok(s) => s,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(target: "history", error = %e, path = %self.path.display(), "history unreadable; starting fresh");
                return Vec::new();
            }
        };

        let raw: Vec<serde_json::Value> = match serde_json::from_str(&content) {
            Ok(v) => v,
            Err(e) => {
                warn!(target: "history", error = %e, path = %self.path.display(), "history corrupt; starting fresh");
                return Vec::new();
            }
        };

        let total = raw.len();
        let entries: Vec<BatchEntry> = raw
            .into_iter()
            .filter_map(|v| serde_json::from_value(v).ok())
            .collect();
        if entries.len() < total {
            warn!(
                target: "history",
                skipped = total - entries.len(),
                "malformed history entries skipped"
            );
        }
        entries
    }

    /// Append one batch, evict the oldest beyond `cap`, rewrite the file.
    /// Returns the number of stored entries.
    pub fn append(&self, items: Vec<NewsItem>, now: DateTime<Utc>) -> Result<usize> {
        let mut entries = self.load();
        entries.push(BatchEntry::new(now, items));
        if entries.len() > self.cap {
            let excess = entries.len() - self.cap;
            entries.drain(0..excess);
        }

        self.write_all(&entries)?;
        info!(
            target: "history",
            path = %self.path.display(),
            entries = entries.len(),
            "history saved"
        );
        Ok(entries.len())
    }

    fn write_all(&self, entries: &[BatchEntry]) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating history dir {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(entries).context("serializing history")?;
        let tmp = self.path.with_extension("json.tmp");
        let mut f = fs::File::create(&tmp)
            .with_context(|| format!("creating {}", tmp.display()))?;
        f.write_all(json.as_bytes())
            .with_context(|| format!("writing {}", tmp.display()))?;
        f.sync_all().ok();
        drop(f);
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("replacing {}", self.path.display()))?;
        Ok(())
    }
}
