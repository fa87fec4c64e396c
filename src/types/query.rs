//! Read-only view types handed to the presentation layer.

use serde::{Deserialize, Serialize};

use super::common::{ItemKey, PageId, Season};
use super::item::Category;

/// Filter for item listings. Both conditions must hold when set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemFilter {
    /// Only items in this category (matched case-insensitively).
    #[serde(default)]
    pub category: Option<String>,
    /// Case-insensitive substring of the display name.
    #[serde(default)]
    pub contains: Option<String>,
}

impl ItemFilter {
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn contains(mut self, needle: impl Into<String>) -> Self {
        self.contains = Some(needle.into());
        self
    }
}

/// One item as listed by the browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemSummary {
    pub key: ItemKey,
    /// Stored display name.
    pub name: String,
    /// Display name without a trailing `(Category)` suffix.
    pub label: String,
    pub category: Category,
    /// Pages ascending.
    pub pages: Vec<PageId>,
}

impl ItemSummary {
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Items of one category, most frequently worn first.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryGroup {
    pub category: Category,
    pub items: Vec<ItemSummary>,
}

/// Fall/winter browsing slice: pages tagged with the season (or `both`) and the items on them.
#[derive(Debug, Clone, Serialize)]
pub struct SeasonView {
    pub season: Season,
    pub pages: Vec<PageId>,
    /// Page lists are restricted to the season's pages.
    pub items: Vec<ItemSummary>,
}
