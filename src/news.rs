//! # News Item
//! Classified, scored output record: the unit ranked, reported and persisted.

use serde::{Deserialize, Serialize};

use crate::taxonomy::Category;

/// Importance bounds shared by the keyword scorer and enrichment results.
pub const MIN_IMPORTANCE: u8 = 1;
pub const MAX_IMPORTANCE: u8 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub category: Category,
    pub summary: String,
    /// 1..=10
    pub importance: u8,
    pub source: String,
    /// Calendar date, `YYYY-MM-DD` when known.
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
}

/// Clamp any integer score into the importance range.
pub fn clamp_importance(raw: i64) -> u8 {
    raw.clamp(MIN_IMPORTANCE as i64, MAX_IMPORTANCE as i64) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_fields_are_omitted_and_defaulted() {
        let item = NewsItem {
            title: "t".into(),
            category: Category::NewModels,
            summary: "s".into(),
            importance: 7,
            source: "src".into(),
            date: "2025-03-04".into(),
            url: None,
            manufacturer: None,
        };
        let json = serde_json::to_string(&item).unwrap();
        assert!(!json.contains("url"));
        assert!(!json.contains("manufacturer"));
        let back: NewsItem = serde_json::from_str(&json).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn clamp_importance_bounds() {
        assert_eq!(clamp_importance(-3), 1);
        assert_eq!(clamp_importance(0), 1);
        assert_eq!(clamp_importance(7), 7);
        assert_eq!(clamp_importance(42), 10);
    }
}
