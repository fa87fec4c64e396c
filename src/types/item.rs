//! Item, category, and index value types.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use super::common::{CollectionId, ItemKey, PageId};
use crate::constants::OTHER_CATEGORY;
use crate::error::{CatalogError, Result};
use crate::normalize::Normalizer;

/// Forward index: page → items in display order. Authoritative.
pub type ForwardIndex = BTreeMap<PageId, Vec<ItemEntry>>;

/// Inverse index: item key → record with the pages it appears on. Derived.
pub type InverseIndex = BTreeMap<ItemKey, ItemRecord>;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    #[must_use]
    pub fn other() -> Self {
        Self(OTHER_CATEGORY.to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_other(&self) -> bool {
        self.0 == OTHER_CATEGORY
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fixed, ordered category enum of one collection. `Other` is always present and last
/// unless the configuration places it elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Taxonomy {
    collection: CollectionId,
    categories: Vec<Category>,
}

impl Taxonomy {
    pub fn new<I, S>(collection: CollectionId, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut categories: Vec<Category> = Vec::new();
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty()
                || categories
                    .iter()
                    .any(|existing| existing.0.eq_ignore_ascii_case(name))
            {
                continue;
            }
            categories.push(Category(name.to_string()));
        }
        if !categories.iter().any(Category::is_other) {
            categories.push(Category::other());
        }
        Self {
            collection,
            categories,
        }
    }

    #[must_use]
    pub fn collection(&self) -> CollectionId {
        self.collection
    }

    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Canonical spelling of `name` if it belongs to the taxonomy (ASCII case-insensitive).
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Category> {
        let name = name.trim();
        self.categories
            .iter()
            .find(|category| category.0.eq_ignore_ascii_case(name))
    }

    /// Resolve a stored category, defaulting missing or unknown values to `Other`.
    #[must_use]
    pub fn resolve(&self, name: Option<&str>) -> Category {
        name.and_then(|name| self.lookup(name))
            .cloned()
            .unwrap_or_else(Category::other)
    }

    /// Validate a caller-supplied category; unknown values are rejected.
    pub fn validate(&self, name: &str) -> Result<Category> {
        self.lookup(name)
            .cloned()
            .ok_or_else(|| CatalogError::InvalidCategory {
                collection: self.collection,
                category: name.to_string(),
            })
    }

    pub(crate) fn position(&self, category: &Category) -> usize {
        self.categories
            .iter()
            .position(|candidate| candidate == category)
            .unwrap_or(self.categories.len())
    }
}

/// One occurrence of an item on a page. Category is stored per occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemEntry {
    pub name: String,
    pub category: Category,
}

impl ItemEntry {
    #[must_use]
    pub fn new(name: impl Into<String>, category: Category) -> Self {
        Self {
            name: name.into(),
            category,
        }
    }

    /// Identity of this occurrence under `normalizer`'s cleaning rules.
    #[must_use]
    pub fn key(&self, normalizer: &Normalizer) -> ItemKey {
        normalizer.key_of(&self.name)
    }
}

/// Inverse-index record: the item's display attributes plus every page it appears on.
///
/// Display name and category come from the item's first occurrence in page order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemRecord {
    pub key: ItemKey,
    pub name: String,
    pub category: Category,
    pub pages: BTreeSet<PageId>,
}

/// Distinct-item counts per category, in taxonomy order. Derived, never edited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryStats {
    counts: Vec<(Category, usize)>,
}

impl CategoryStats {
    pub(crate) fn tally(taxonomy: &Taxonomy, inverse: &InverseIndex) -> Self {
        let mut counts: Vec<(Category, usize)> = taxonomy
            .categories()
            .iter()
            .map(|category| (category.clone(), 0))
            .collect();
        for record in inverse.values() {
            match counts
                .iter_mut()
                .find(|(category, _)| *category == record.category)
            {
                Some((_, count)) => *count += 1,
                None => counts.push((record.category.clone(), 1)),
            }
        }
        counts.retain(|(_, count)| *count > 0);
        Self { counts }
    }

    #[must_use]
    pub fn get(&self, category: &str) -> usize {
        self.counts
            .iter()
            .find(|(candidate, _)| candidate.as_str() == category)
            .map_or(0, |(_, count)| *count)
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, count)| count).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Category, usize)> {
        self.counts.iter().map(|(category, count)| (category, *count))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl Serialize for CategoryStats {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.counts.len()))?;
        for (category, count) in &self.counts {
            map.serialize_entry(category.as_str(), count)?;
        }
        map.end()
    }
}
