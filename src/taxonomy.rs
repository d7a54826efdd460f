//! # Taxonomy
//! Fixed, ordered set of news categories.
//!
//! Order matters: the keyword classifier resolves ties to the first maximal
//! category in `Category::ALL`. `MarketApplications` is the least specific
//! label and acts as the fallback for text nothing else matches.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    ProblemsSolutions,
    NewModels,
    TechnologyInnovations,
    EventsTradeShows,
    FeatureRequests,
    MarketApplications,
}

impl Category {
    /// All categories in tie-break order.
    pub const ALL: [Category; 6] = [
        Category::ProblemsSolutions,
        Category::NewModels,
        Category::TechnologyInnovations,
        Category::EventsTradeShows,
        Category::FeatureRequests,
        Category::MarketApplications,
    ];

    /// Category assigned when no keyword matches.
    pub const FALLBACK: Category = Category::MarketApplications;

    pub fn label(self) -> &'static str {
        match self {
            Category::ProblemsSolutions => "Problems & Solutions",
            Category::NewModels => "New Models",
            Category::TechnologyInnovations => "Technology Innovations",
            Category::EventsTradeShows => "Events & Trade Shows",
            Category::FeatureRequests => "Feature Requests",
            Category::MarketApplications => "Market & Applications",
        }
    }

    /// Case-insensitive label lookup. Unknown labels yield `None`.
    pub fn from_label(s: &str) -> Option<Category> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(needle))
    }

    /// Labels joined for prompts and diagnostics.
    pub fn labels_joined(sep: &str) -> String {
        Self::ALL
            .iter()
            .map(|c| c.label())
            .collect::<Vec<_>>()
            .join(sep)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Category::from_label(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown category: {raw}")))
    }
}
