//! Keyword-weighted category classifier.
//!
//! Each category accumulates `keyword_weight` per configured keyword found in
//! the text (case-insensitive substring). The category mapped from the hit's
//! group tag gets `group_boost` on top. Highest score wins; ties go to the
//! earlier category in `Category::ALL`; all-zero falls back to
//! `Category::FALLBACK`.

use crate::config::MonitorConfig;
use crate::taxonomy::Category;

/// Per-category scores in taxonomy order.
pub fn category_scores(
    text: &str,
    group: Option<&str>,
    cfg: &MonitorConfig,
) -> Vec<(Category, u32)> {
    let lower = text.to_lowercase();
    let boosted = group.and_then(|g| cfg.category_for_group(g));

    Category::ALL
        .into_iter()
        .map(|cat| {
            let hits = cfg
                .keywords_for(cat)
                .filter(|kw| lower.contains(kw))
                .count() as u32;
            let mut score = hits * cfg.keyword_weight;
            if boosted == Some(cat) {
                score += cfg.group_boost;
            }
            (cat, score)
        })
        .collect()
}

/// Pick one category for `text`. Pure; never fails.
pub fn classify(text: &str, group: Option<&str>, cfg: &MonitorConfig) -> Category {
    let mut best = (Category::FALLBACK, 0u32);
    for (cat, score) in category_scores(text, group, cfg) {
        // strict `>` keeps the first maximal category
        if score > best.1 {
            best = (cat, score);
        }
    }
    best.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> MonitorConfig {
        MonitorConfig::default()
    }

    #[test]
    fn picks_category_with_most_keywords() {
        let c = classify(
            "Makino to exhibit at IMTS booth during the trade show",
            None,
            &cfg(),
        );
        assert_eq!(c, Category::EventsTradeShows);
    }

    #[test]
    fn no_match_falls_back() {
        assert_eq!(classify("zzz qqq", None, &cfg()), Category::FALLBACK);
        assert_eq!(classify("", None, &cfg()), Category::FALLBACK);
    }

    #[test]
    fn ties_resolve_in_taxonomy_order() {
        // one keyword each for New Models ("launch") and Technology ("innovation")
        let c = classify("launch of an innovation", None, &cfg());
        assert_eq!(c, Category::NewModels);
    }

    #[test]
    fn group_tag_gives_head_start() {
        let text = "new wire edm generator"; // "generator" -> Technology (+2)
        assert_eq!(classify(text, None, &cfg()), Category::TechnologyInnovations);
        assert_eq!(
            classify(text, Some("forum_problems"), &cfg()),
            Category::ProblemsSolutions
        );
        // unknown groups change nothing
        assert_eq!(
            classify(text, Some("misc"), &cfg()),
            Category::TechnologyInnovations
        );
    }

    #[test]
    fn deterministic() {
        let text = "Sodick launches new model with improved generator technology";
        let a = classify(text, Some("news"), &cfg());
        let b = classify(text, Some("news"), &cfg());
        assert_eq!(a, b);
        assert_eq!(
            category_scores(text, Some("news"), &cfg()),
            category_scores(text, Some("news"), &cfg())
        );
    }
}
