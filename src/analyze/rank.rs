//! Ranking and top-N selection.

use crate::news::NewsItem;

/// Stable sort by importance (descending), then keep the first `top_n`.
/// Equal scores keep their incoming order.
pub fn rank_and_select(mut items: Vec<NewsItem>, top_n: usize) -> Vec<NewsItem> {
    items.sort_by(|a, b| b.importance.cmp(&a.importance));
    items.truncate(top_n);
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::Category;

    fn item(title: &str, importance: u8) -> NewsItem {
        NewsItem {
            title: title.into(),
            category: Category::FALLBACK,
            summary: String::new(),
            importance,
            source: "s".into(),
            date: "2025-01-01".into(),
            url: None,
            manufacturer: None,
        }
    }

    #[test]
    fn sorts_descending_and_keeps_tie_order() {
        let items = vec![item("a", 5), item("b", 9), item("c", 9), item("d", 5)];
        let out = rank_and_select(items, 10);
        let titles: Vec<_> = out.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["b", "c", "a", "d"]);
        assert!(out.windows(2).all(|w| w[0].importance >= w[1].importance));
    }

    #[test]
    fn truncates_to_top_n() {
        let items = (0..30).map(|i| item(&i.to_string(), (i % 10) as u8 + 1)).collect();
        let out = rank_and_select(items, 15);
        assert_eq!(out.len(), 15);
        assert_eq!(out[0].importance, 10);
        assert!(rank_and_select(Vec::new(), 15).is_empty());
    }
}
