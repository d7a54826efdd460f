//! Run summary printed by the CLI: counts per category and manufacturer, top items.

use std::collections::BTreeMap;
use std::fmt;

use crate::news::NewsItem;
use crate::taxonomy::Category;

#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub total: usize,
    /// Taxonomy order; categories with no items are omitted.
    pub by_category: Vec<(Category, usize)>,
    /// Highest count first, then name.
    pub by_manufacturer: Vec<(String, usize)>,
    pub top: Vec<NewsItem>,
}

impl RunReport {
    /// `items` is expected ranked already; `top` takes the first `top_k`.
    pub fn from_items(items: &[NewsItem], top_k: usize) -> Self {
        let by_category = Category::ALL
            .into_iter()
            .map(|c| (c, items.iter().filter(|i| i.category == c).count()))
            .filter(|(_, n)| *n > 0)
            .collect();

        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for m in items.iter().filter_map(|i| i.manufacturer.as_deref()) {
            *counts.entry(m).or_default() += 1;
        }
        let mut by_manufacturer: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(m, n)| (m.to_string(), n))
            .collect();
        // BTreeMap gives name order; stable sort keeps it within equal counts.
        by_manufacturer.sort_by(|a, b| b.1.cmp(&a.1));

        Self {
            total: items.len(),
            by_category,
            by_manufacturer,
            top: items.iter().take(top_k).cloned().collect(),
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Items selected: {}", self.total)?;
        if self.total == 0 {
            return writeln!(f, "No relevant news found in this run.");
        }

        writeln!(f, "\nBy category:")?;
        for (c, n) in &self.by_category {
            writeln!(f, "  {c}: {n}")?;
        }

        if !self.by_manufacturer.is_empty() {
            writeln!(f, "\nBy manufacturer:")?;
            for (m, n) in &self.by_manufacturer {
                writeln!(f, "  {m}: {n}")?;
            }
        }

        writeln!(f, "\nTop {}:", self.top.len())?;
        for (i, it) in self.top.iter().enumerate() {
            writeln!(
                f,
                "  {}. [{}/10] {} ({}, {})",
                i + 1,
                it.importance,
                it.title,
                it.category,
                it.source
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str, category: Category, importance: u8, m: Option<&str>) -> NewsItem {
        NewsItem {
            title: title.into(),
            category,
            summary: String::new(),
            importance,
            source: "src".into(),
            date: "2025-03-04".into(),
            url: None,
            manufacturer: m.map(str::to_string),
        }
    }

    #[test]
    fn counts_and_top_k() {
        let items = vec![
            item("a", Category::NewModels, 9, Some("Sodick")),
            item("b", Category::ProblemsSolutions, 8, Some("Makino")),
            item("c", Category::NewModels, 7, Some("Makino")),
            item("d", Category::FALLBACK, 6, None),
        ];
        let r = RunReport::from_items(&items, 2);
        assert_eq!(r.total, 4);
        assert_eq!(
            r.by_category,
            vec![
                (Category::ProblemsSolutions, 1),
                (Category::NewModels, 2),
                (Category::MarketApplications, 1)
            ]
        );
        assert_eq!(
            r.by_manufacturer,
            vec![("Makino".to_string(), 2), ("Sodick".to_string(), 1)]
        );
        assert_eq!(r.top.len(), 2);
        let text = r.to_string();
        assert!(text.contains("New Models: 2"));
        assert!(text.contains("1. [9/10] a"));
    }

    #[test]
    fn empty_report() {
        let r = RunReport::from_items(&[], 5);
        assert!(r.to_string().contains("No relevant news"));
    }
}
