//! News item builder: relevance gate, text cleaning and field assembly.
//!
//! The helpers here are shared by the keyword path and by enrichment results
//! so both produce the same `NewsItem` shape.

use tracing::debug;

use crate::analyze::classifier::classify;
use crate::analyze::scoring::importance;
use crate::config::MonitorConfig;
use crate::ingest::types::RawHit;
use crate::news::NewsItem;

/// Punctuation kept in summaries besides letters, digits and spaces.
const SUMMARY_PUNCT: &str = ".,;:!?'\"()[]-/%&+*#@_°€$£¥–";
const ELLIPSIS: &str = "...";

/// Short anonymized id for logging (never log raw headlines at debug level).
pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(text.as_bytes());
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// True if any domain keyword appears in `text` (case-insensitive).
pub fn is_relevant(text: &str, cfg: &MonitorConfig) -> bool {
    let lower = text.to_lowercase();
    cfg.relevance_keywords
        .iter()
        .any(|kw| lower.contains(kw.as_str()))
}

/// First configured brand found in `text`, in its canonical spelling.
pub fn detect_manufacturer(text: &str, cfg: &MonitorConfig) -> Option<String> {
    let lower = text.to_lowercase();
    cfg.brands
        .iter()
        .find(|b| lower.contains(&b.to_lowercase()))
        .cloned()
}

/// Canonical brand for a free-form manufacturer name, if it is a known brand.
pub fn canonical_brand(name: &str, cfg: &MonitorConfig) -> Option<String> {
    let needle = name.trim();
    cfg.brands
        .iter()
        .find(|b| b.eq_ignore_ascii_case(needle))
        .cloned()
}

fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First `max` chars of `s`, trailing whitespace trimmed.
fn take_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect::<String>().trim_end().to_string()
}

pub fn clean_title(title: &str, max_chars: usize) -> String {
    let no_ctrl: String = title
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    take_chars(&collapse_ws(&no_ctrl), max_chars)
}

/// Whitelist-filter, collapse whitespace and cap at `max_chars`.
///
/// Over-long text is cut at the last sentence end (`.`, `!`, `?`) inside the
/// limit when that keeps at least half of it; otherwise it is hard-truncated
/// and marked with `...`.
pub fn clean_summary(text: &str, max_chars: usize) -> String {
    let filtered: String = text
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || SUMMARY_PUNCT.contains(c) {
                c
            } else {
                ' '
            }
        })
        .collect();
    let s = collapse_ws(&filtered);

    if s.chars().count() <= max_chars {
        return s;
    }

    let chars: Vec<char> = s.chars().collect();
    let window = &chars[..max_chars];
    // the char after the mark decides, even when it lies past the window
    let boundary = window
        .iter()
        .enumerate()
        .rev()
        .find(|&(i, c)| {
            matches!(*c, '.' | '!' | '?') && chars.get(i + 1).map_or(true, |n| n.is_whitespace())
        })
        .map(|(i, _)| i);

    match boundary {
        Some(i) if i + 1 >= max_chars / 2 => window[..=i].iter().collect(),
        _ => {
            let keep = max_chars.saturating_sub(ELLIPSIS.len());
            let mut out = take_chars(&s, keep);
            out.push_str(ELLIPSIS);
            out
        }
    }
}

/// Strip typographic artifacts search results attach to source names.
pub fn clean_source(source: &str) -> String {
    let stripped = source
        .replace("...", " ")
        .replace(['›', '→', '»', '«', '‹', '<', '>', '…', '▸'], " ");
    let out = collapse_ws(&stripped);
    let out = out
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, '-' | '|' | '·' | ':' | ','))
        .to_string();
    if out.is_empty() {
        "Unknown".to_string()
    } else {
        out
    }
}

/// Build an item from one hit; `None` if the hit fails the relevance gate.
pub fn build_item(hit: &RawHit, cfg: &MonitorConfig) -> Option<NewsItem> {
    let text = hit.combined_text();
    if !is_relevant(&text, cfg) {
        debug!(target: "classify", id = %anon_hash(&hit.title), "dropped: not domain relevant");
        return None;
    }

    let summary_src = if hit.snippet.trim().is_empty() {
        &hit.title
    } else {
        &hit.snippet
    };

    Some(NewsItem {
        title: clean_title(&hit.title, cfg.title_max_chars),
        category: classify(&text, hit.group.as_deref(), cfg),
        summary: clean_summary(summary_src, cfg.summary_max_chars),
        importance: importance(&text, &hit.origin(), cfg),
        source: clean_source(&hit.source),
        date: hit.date.format("%Y-%m-%d").to_string(),
        url: Some(hit.url.trim().to_string()).filter(|u| !u.is_empty()),
        manufacturer: detect_manufacturer(&text, cfg),
    })
}
