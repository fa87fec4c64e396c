//! Read-only views over a [`Catalog`] for browsing and rendering.

use std::cmp::Ordering;

use crate::catalog::Catalog;
use crate::error::{CatalogError, Result};
use crate::normalize::canonical_key;
use crate::schema::display_label;
use crate::types::{
    CategoryGroup, ItemEntry, ItemFilter, ItemKey, ItemRecord, ItemSummary, PageId,
};

impl Catalog {
    /// All items matching `filter`, sorted by name case-insensitively.
    ///
    /// The category filter is case-insensitive; `contains` is a case-insensitive substring
    /// match on the display name.
    #[must_use]
    pub fn items(&self, filter: &ItemFilter) -> Vec<ItemSummary> {
        let needle = filter.contains.as_deref().map(str::to_lowercase);
        let mut items: Vec<ItemSummary> = self
            .inverse
            .values()
            .filter(|record| {
                filter
                    .category
                    .as_deref()
                    .is_none_or(|category| record.category.as_str().eq_ignore_ascii_case(category.trim()))
            })
            .filter(|record| {
                needle
                    .as_deref()
                    .is_none_or(|needle| record.name.to_lowercase().contains(needle))
            })
            .map(|record| self.summarize(record))
            .collect();
        items.sort_by(by_name);
        items
    }

    /// Entries of `page` in stored display order.
    pub fn items_for_page(&self, page: PageId) -> Result<&[ItemEntry]> {
        self.forward
            .get(&page)
            .map(Vec::as_slice)
            .ok_or(CatalogError::PageNotFound { page })
    }

    /// Pages carrying `key`, ascending. Empty when the item does not exist.
    #[must_use]
    pub fn pages_for_item(&self, key: &ItemKey) -> Vec<PageId> {
        self.inverse
            .get(key)
            .map(|record| record.pages.iter().copied().collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn item(&self, key: &ItemKey) -> Option<&ItemRecord> {
        self.inverse.get(key)
    }

    /// Look an item up by any spelling of its name.
    #[must_use]
    pub fn find_item(&self, name: &str) -> Option<&ItemRecord> {
        self.inverse.get(&self.normalizer.key_of(name))
    }

    pub fn pages(&self) -> impl Iterator<Item = PageId> + '_ {
        self.forward.keys().copied()
    }

    /// Punctuation- and case-insensitive search: every query word must occur in the item
    /// key. Results are ranked by page count, then name.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<ItemSummary> {
        let terms: Vec<String> = canonical_key(query)
            .split_whitespace()
            .map(str::to_string)
            .collect();
        if terms.is_empty() {
            return Vec::new();
        }
        let mut hits: Vec<ItemSummary> = self
            .inverse
            .values()
            .filter(|record| terms.iter().all(|term| record.key.as_str().contains(term.as_str())))
            .map(|record| self.summarize(record))
            .collect();
        hits.sort_by(by_popularity);
        hits
    }

    /// Items grouped in taxonomy order, most-seen first inside each group.
    #[must_use]
    pub fn grouped_by_category(&self) -> Vec<CategoryGroup> {
        let mut groups: Vec<CategoryGroup> = self
            .taxonomy
            .categories()
            .iter()
            .map(|category| CategoryGroup {
                category: category.clone(),
                items: Vec::new(),
            })
            .collect();
        for record in self.inverse.values() {
            let summary = self.summarize(record);
            match groups
                .iter_mut()
                .find(|group| group.category == record.category)
            {
                Some(group) => group.items.push(summary),
                None => groups.push(CategoryGroup {
                    category: record.category.clone(),
                    items: vec![summary],
                }),
            }
        }
        groups.retain(|group| !group.items.is_empty());
        for group in &mut groups {
            group.items.sort_by(by_popularity);
        }
        groups
    }

    pub(crate) fn summarize(&self, record: &ItemRecord) -> ItemSummary {
        ItemSummary {
            key: record.key.clone(),
            name: record.name.clone(),
            label: display_label(&record.name, &self.taxonomy),
            category: record.category.clone(),
            pages: record.pages.iter().copied().collect(),
        }
    }
}

fn by_name(a: &ItemSummary, b: &ItemSummary) -> Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| a.name.cmp(&b.name))
}

fn by_popularity(a: &ItemSummary, b: &ItemSummary) -> Ordering {
    b.page_count()
        .cmp(&a.page_count())
        .then_with(|| by_name(a, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::Normalizer;
    use crate::types::{CollectionId, SchemaTag, Taxonomy};

    fn sample() -> Catalog {
        let mut catalog = Catalog::new(
            CollectionId::Spring,
            SchemaTag::Categorized,
            Taxonomy::new(CollectionId::Spring, ["Tops", "Footwear"]),
            Normalizer::default(),
        );
        catalog.add_item_to_page(PageId::new(1), "Alden loafer", Some("Footwear")).unwrap();
        catalog.add_item_to_page(PageId::new(1), "Sunspel tee", Some("Tops")).unwrap();
        catalog.add_item_to_page(PageId::new(2), "Sunspel tee", Some("Tops")).unwrap();
        catalog.add_item_to_page(PageId::new(2), "auralee knit", Some("Tops")).unwrap();
        catalog.add_item_to_page(PageId::new(3), "Prada cape", None).unwrap();
        catalog
    }

    #[test]
    fn items_filter_and_sort() {
        let catalog = sample();
        let all: Vec<String> = catalog.items(&ItemFilter::all()).into_iter().map(|i| i.name).collect();
        assert_eq!(all, vec!["Alden loafer", "auralee knit", "Prada cape", "Sunspel tee"]);
        let tops = catalog.items(&ItemFilter::all().category("tops").contains("SUN"));
        assert_eq!(tops.len(), 1);
        assert_eq!(tops[0].pages, vec![PageId::new(1), PageId::new(2)]);
    }

    #[test]
    fn page_lookup_preserves_order_and_reports_missing_pages() {
        let catalog = sample();
        let names: Vec<&str> = catalog
            .items_for_page(PageId::new(1))
            .unwrap()
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, vec!["Alden loafer", "Sunspel tee"]);
        assert!(catalog.items_for_page(PageId::new(9)).is_err());
        assert!(catalog.pages_for_item(&ItemKey::from_name("missing")).is_empty());
    }

    #[test]
    fn search_ignores_punctuation_and_ranks_by_pages() {
        let catalog = sample();
        let hits = catalog.search("sunspel, TEE");
        assert_eq!(hits.len(), 1);
        assert!(catalog.search("  ").is_empty());
        let all = catalog.search("e");
        assert_eq!(all[0].name, "Sunspel tee");
    }

    #[test]
    fn groups_follow_taxonomy_and_skip_empty() {
        let catalog = sample();
        let groups = catalog.grouped_by_category();
        let layout: Vec<(&str, Vec<&str>)> = groups
            .iter()
            .map(|g| (g.category.as_str(), g.items.iter().map(|i| i.name.as_str()).collect()))
            .collect();
        assert_eq!(
            layout,
            vec![
                ("Tops", vec!["Sunspel tee", "auralee knit"]),
                ("Footwear", vec!["Alden loafer"]),
                ("Other", vec!["Prada cape"]),
            ]
        );
    }
}
