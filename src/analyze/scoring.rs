//! Importance scoring from lexical signals.
//!
//! Base 5, then:
//! - +2 per high-impact keyword present
//! - +1 per medium-impact keyword present
//! - +1 if any known brand appears
//! - +1 for a quantified claim (percentage, multiplier, currency amount)
//! - +1 for a practical-problem signal (breakage/failure/error keywords)
//! - +1 for a forum/community origin
//!
//! Result is clamped into `[1, 10]`. Only keyword-set membership counts, so the
//! score does not depend on keyword order or repetition.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::MonitorConfig;
use crate::news::clamp_importance;

pub const BASE_SCORE: i64 = 5;
const HIGH_IMPACT_POINTS: i64 = 2;
const MEDIUM_IMPACT_POINTS: i64 = 1;

static RE_QUANTIFIED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?ix)
        \d+(?:[.,]\d+)?\s*%                                   # 30%, 12.5 %
        | \b\d+(?:[.,]\d+)?\s*(?:x|times)\b                   # 3x, 2 times
        | [$€£¥]\s*\d                                          # $5, € 10
        | \b\d+(?:[.,]\d+)?\s*(?:usd|eur|dollars|euros|million|billion|mln|bn)\b
        | \b(?:usd|eur)\s*\d
        ",
    )
    .expect("quantified-claim regex")
});

/// Signals that contributed to a score (diagnostics and tests).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreBreakdown {
    pub high_hits: usize,
    pub medium_hits: usize,
    pub brand: bool,
    pub quantified: bool,
    pub problem: bool,
    pub forum: bool,
}

impl ScoreBreakdown {
    /// Unclamped total.
    pub fn raw_total(&self) -> i64 {
        BASE_SCORE
            + HIGH_IMPACT_POINTS * self.high_hits as i64
            + MEDIUM_IMPACT_POINTS * self.medium_hits as i64
            + i64::from(self.brand)
            + i64::from(self.quantified)
            + i64::from(self.problem)
            + i64::from(self.forum)
    }
}

/// Collect the lexical signals for `text`; `origin` is where the hit came from
/// (group tag, source name, url).
pub fn breakdown(text: &str, origin: &str, cfg: &MonitorConfig) -> ScoreBreakdown {
    let lower = text.to_lowercase();
    let origin = origin.to_lowercase();
    let present = |kw: &String| lower.contains(kw.as_str());

    ScoreBreakdown {
        high_hits: cfg.high_impact.iter().filter(|k| present(k)).count(),
        medium_hits: cfg.medium_impact.iter().filter(|k| present(k)).count(),
        brand: cfg
            .brands
            .iter()
            .any(|b| lower.contains(&b.to_lowercase())),
        quantified: has_quantified_claim(text),
        problem: cfg.problem_keywords.iter().any(present),
        forum: cfg
            .forum_markers
            .iter()
            .any(|m| origin.contains(m.as_str())),
    }
}

/// Importance in `[1, 10]`.
pub fn importance(text: &str, origin: &str, cfg: &MonitorConfig) -> u8 {
    clamp_importance(breakdown(text, origin, cfg).raw_total())
}

pub fn has_quantified_claim(text: &str) -> bool {
    RE_QUANTIFIED.is_match(text)
}
