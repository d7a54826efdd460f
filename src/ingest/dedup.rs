// src/ingest/dedup.rs
//! Title-prefix deduplication.
//!
//! Key = title lower-cased and cut to the first `prefix_chars` characters.
//! Headlines sharing that prefix collapse to the first one seen, even when the
//! full titles differ.

use std::collections::HashSet;

use crate::ingest::types::RawHit;

pub const DEFAULT_PREFIX_CHARS: usize = 60;

pub fn dedup_key(title: &str, prefix_chars: usize) -> String {
    title.to_lowercase().chars().take(prefix_chars).collect()
}

/// Returns `(kept, dropped)`; `kept` preserves first-seen order.
/// Hits whose key is blank are dropped as well.
pub fn dedup_hits(hits: Vec<RawHit>, prefix_chars: usize) -> (Vec<RawHit>, usize) {
    let mut seen: HashSet<String> = HashSet::with_capacity(hits.len());
    let mut kept = Vec::with_capacity(hits.len());
    let mut dropped = 0usize;

    for hit in hits {
        let key = dedup_key(&hit.title, prefix_chars);
        if key.trim().is_empty() || !seen.insert(key) {
            dropped += 1;
            continue;
        }
        kept.push(hit);
    }

    (kept, dropped)
}
