//! Mutators for [`Catalog`].
//!
//! Each operation validates everything it needs before touching the forward index, then
//! edits it and rebuilds the derived views. A returned error therefore always means the
//! catalog is unchanged.

use tracing::instrument;

use crate::catalog::{Catalog, index};
use crate::error::{CatalogError, Result};
use crate::normalize::NormalizedName;
use crate::schema::split_category_suffix;
use crate::types::{
    AmbiguousName, Category, ItemEntry, ItemKey, ItemRecord, MergeReport, NormalizationReport,
    PageId, RenameOutcome,
};

impl Catalog {
    /// Clean `raw_name` and append the result to `page`, creating the page if needed.
    ///
    /// A glued dual-item line becomes two entries. Without an explicit category the
    /// category comes from a `"(Category)"` suffix, else `Other`. Returns the added keys.
    #[instrument(
        target = "lookbook::mutation",
        skip_all,
        fields(collection = %self.id, page = %page)
    )]
    pub fn add_item_to_page(
        &mut self,
        page: PageId,
        raw_name: &str,
        category: Option<&str>,
    ) -> Result<Vec<ItemKey>> {
        if page.number() == 0 {
            return Err(CatalogError::InvalidPageKey {
                key: page.number().to_string(),
            });
        }
        let names = self.normalizer.normalize(raw_name)?;
        let explicit = category
            .map(|category| self.taxonomy.validate(category))
            .transpose()?;
        if let Some(existing) = self.forward.get(&page) {
            for name in &names {
                if existing
                    .iter()
                    .any(|entry| entry.key(&self.normalizer) == name.key)
                {
                    return Err(CatalogError::DuplicateItemOnPage {
                        page,
                        key: name.key.clone(),
                    });
                }
            }
        }

        let entries: Vec<ItemEntry> = names
            .iter()
            .map(|name| {
                let category = explicit.clone().unwrap_or_else(|| self.inferred_category(name));
                ItemEntry::new(name.name.clone(), category)
            })
            .collect();
        let keys = names.iter().map(|name| name.key.clone()).collect();
        self.forward.entry(page).or_default().extend(entries);
        self.rebuild_inverse_index();
        tracing::info!(added = names.len(), "items added");
        Ok(keys)
    }

    fn inferred_category(&self, name: &NormalizedName) -> Category {
        split_category_suffix(&name.name)
            .map_or_else(Category::other, |(_, suffix)| self.taxonomy.resolve(Some(suffix)))
    }

    /// Drop one occurrence. An item left without pages disappears from the inverse index.
    ///
    /// Fails with `ItemNotFound` when the page does not carry the item, including when the
    /// page itself does not exist.
    #[instrument(
        target = "lookbook::mutation",
        skip_all,
        fields(collection = %self.id, page = %page, key = %key)
    )]
    pub fn remove_item_from_page(&mut self, page: PageId, key: &ItemKey) -> Result<ItemEntry> {
        let normalizer = &self.normalizer;
        let (entries, position) = self
            .forward
            .get_mut(&page)
            .and_then(|entries| {
                let position = entries
                    .iter()
                    .position(|entry| entry.key(normalizer) == *key)?;
                Some((entries, position))
            })
            .ok_or_else(|| CatalogError::ItemNotFound { key: key.clone() })?;
        let removed = entries.remove(position);
        self.rebuild_inverse_index();
        Ok(removed)
    }

    /// Rename every occurrence of `old`.
    ///
    /// When the new name's key belongs to another existing item the two are merged, and
    /// the merged item keeps `old`'s category.
    #[instrument(
        target = "lookbook::mutation",
        skip_all,
        fields(collection = %self.id, key = %old)
    )]
    pub fn rename_item(&mut self, old: &ItemKey, new_name: &str) -> Result<RenameOutcome> {
        self.require_item(old)?;
        let cleaned = self.normalizer.clean(new_name)?;
        if cleaned.key != *old && self.inverse.contains_key(&cleaned.key) {
            tracing::info!(target_key = %cleaned.key, "rename collides with existing item, merging");
            let report = self.merge_into(&[old.clone(), cleaned.key.clone()], &cleaned)?;
            return Ok(RenameOutcome::Merged(report));
        }

        let mut occurrences = 0;
        let mut changed = false;
        for entry in self.forward.values_mut().flatten() {
            if entry.key(&self.normalizer) == *old {
                occurrences += 1;
                if entry.name != cleaned.name {
                    entry.name.clone_from(&cleaned.name);
                    changed = true;
                }
            }
        }
        if !changed {
            return Ok(RenameOutcome::Unchanged { key: cleaned.key });
        }
        self.rebuild_inverse_index();
        Ok(RenameOutcome::Renamed {
            key: cleaned.key,
            occurrences,
        })
    }

    /// Merge `a` and `b` into one item named `result_name`.
    ///
    /// Pages carrying both keep a single entry at the first one's position. If the result
    /// name's key matches a third item, that item is absorbed as well.
    #[instrument(
        target = "lookbook::mutation",
        skip_all,
        fields(collection = %self.id, a = %a, b = %b)
    )]
    pub fn merge_items(
        &mut self,
        a: &ItemKey,
        b: &ItemKey,
        result_name: &str,
    ) -> Result<MergeReport> {
        self.require_item(a)?;
        self.require_item(b)?;
        let cleaned = self.normalizer.clean(result_name)?;
        self.merge_into(&[a.clone(), b.clone()], &cleaned)
    }

    fn merge_into(&mut self, keys: &[ItemKey], result: &NormalizedName) -> Result<MergeReport> {
        let mut participants: Vec<ItemKey> = Vec::with_capacity(keys.len() + 1);
        for key in keys.iter().chain(std::iter::once(&result.key)) {
            if self.inverse.contains_key(key) && !participants.contains(key) {
                participants.push(key.clone());
            }
        }
        let category = participants
            .first()
            .and_then(|key| self.inverse.get(key))
            .map(|record| record.category.clone())
            .ok_or_else(|| CatalogError::ItemNotFound {
                key: result.key.clone(),
            })?;

        let normalizer = &self.normalizer;
        let mut pages = 0;
        let mut collapsed = 0;
        for entries in self.forward.values_mut() {
            let mut kept = false;
            let before = entries.len();
            entries.retain_mut(|entry| {
                if !participants.contains(&entry.key(normalizer)) {
                    return true;
                }
                if kept {
                    return false;
                }
                kept = true;
                entry.name.clone_from(&result.name);
                entry.category = category.clone();
                true
            });
            if kept {
                pages += 1;
                collapsed += before - entries.len();
            }
        }
        self.rebuild_inverse_index();

        let absorbed: Vec<ItemKey> = participants
            .into_iter()
            .filter(|key| *key != result.key)
            .collect();
        tracing::info!(key = %result.key, absorbed = absorbed.len(), pages, collapsed, "items merged");
        Ok(MergeReport {
            key: result.key.clone(),
            absorbed,
            pages,
            collapsed,
        })
    }

    /// Move every occurrence of `key` to `category`, which must belong to the taxonomy.
    #[instrument(
        target = "lookbook::mutation",
        skip_all,
        fields(collection = %self.id, key = %key)
    )]
    pub fn recategorize(&mut self, key: &ItemKey, category: &str) -> Result<Category> {
        self.require_item(key)?;
        let category = self.taxonomy.validate(category)?;
        for entry in self.forward.values_mut().flatten() {
            if entry.key(&self.normalizer) == *key {
                entry.category = category.clone();
            }
        }
        self.rebuild_inverse_index();
        Ok(category)
    }

    /// Remove the item from every page. Returns the pages it was on.
    #[instrument(
        target = "lookbook::mutation",
        skip_all,
        fields(collection = %self.id, key = %key)
    )]
    pub fn delete_item(&mut self, key: &ItemKey) -> Result<Vec<PageId>> {
        let pages: Vec<PageId> = self.require_item(key)?.pages.iter().copied().collect();
        for page in &pages {
            if let Some(entries) = self.forward.get_mut(page) {
                entries.retain(|entry| entry.key(&self.normalizer) != *key);
            }
        }
        self.rebuild_inverse_index();
        tracing::info!(pages = pages.len(), "item deleted");
        Ok(pages)
    }

    /// Remove a page with all its occurrences and its season assignment.
    #[instrument(
        target = "lookbook::mutation",
        skip_all,
        fields(collection = %self.id, page = %page)
    )]
    pub fn delete_page(&mut self, page: PageId) -> Result<Vec<ItemEntry>> {
        let removed = self
            .forward
            .remove(&page)
            .ok_or(CatalogError::PageNotFound { page })?;
        if let Some(seasons) = self.seasons.as_mut() {
            seasons.remove(&page);
        }
        self.rebuild_inverse_index();
        Ok(removed)
    }

    /// Run the cleaning rules over every stored name.
    ///
    /// Dual-item names are split in place, duplicates created by cleaning are collapsed.
    /// Names the rules cannot split safely stay as they are and are listed in the report.
    #[instrument(target = "lookbook::mutation", skip_all, fields(collection = %self.id))]
    pub fn apply_normalization(&mut self) -> NormalizationReport {
        let mut report = NormalizationReport::default();
        for (page, entries) in &mut self.forward {
            let mut rewritten = Vec::with_capacity(entries.len());
            for entry in entries.drain(..) {
                match self.normalizer.normalize(&entry.name) {
                    Ok(names) if names.len() > 1 => {
                        report.split += 1;
                        rewritten.extend(
                            names
                                .into_iter()
                                .map(|name| ItemEntry::new(name.name, entry.category.clone())),
                        );
                    }
                    Ok(names) => {
                        let cleaned = names.into_iter().next().map(|name| name.name);
                        match cleaned {
                            Some(name) if name != entry.name => {
                                report.cleaned += 1;
                                rewritten.push(ItemEntry::new(name, entry.category));
                            }
                            _ => rewritten.push(entry),
                        }
                    }
                    Err(CatalogError::NormalizationAmbiguous { brands, .. }) => {
                        report.ambiguous.push(AmbiguousName {
                            page: *page,
                            name: entry.name.clone(),
                            brands,
                        });
                        rewritten.push(entry);
                    }
                    Err(err) => {
                        tracing::warn!(%page, item = %entry.name, error = %err, "name left as is");
                        rewritten.push(entry);
                    }
                }
            }
            *entries = rewritten;
        }
        report.collapsed = index::collapse_duplicates(&mut self.forward, &self.normalizer);
        self.rebuild_inverse_index();
        if report.changed() || !report.ambiguous.is_empty() {
            tracing::info!(
                cleaned = report.cleaned,
                split = report.split,
                collapsed = report.collapsed,
                ambiguous = report.ambiguous.len(),
                "normalization applied"
            );
        }
        report
    }

    fn require_item(&self, key: &ItemKey) -> Result<&ItemRecord> {
        self.inverse
            .get(key)
            .ok_or_else(|| CatalogError::ItemNotFound { key: key.clone() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::Normalizer;
    use crate::types::{CollectionId, ForwardIndex, SchemaTag, Taxonomy};

    fn spring() -> Catalog {
        Catalog::new(
            CollectionId::Spring,
            SchemaTag::Categorized,
            Taxonomy::new(CollectionId::Spring, ["Tops", "Bottoms", "Footwear"]),
            Normalizer::default(),
        )
    }

    fn key(name: &str) -> ItemKey {
        ItemKey::from_name(name)
    }

    fn names_on(catalog: &Catalog, page: u32) -> Vec<String> {
        catalog.forward()[&PageId::new(page)]
            .iter()
            .map(|e| e.name.clone())
            .collect()
    }

    #[test]
    fn add_rejects_duplicates_and_leaves_state_unchanged() {
        let mut catalog = spring();
        catalog
            .add_item_to_page(PageId::new(1), "i The Row loafer", Some("Footwear"))
            .unwrap();
        let before = catalog.forward().clone();
        let err = catalog
            .add_item_to_page(PageId::new(1), "the row  LOAFER", None)
            .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateItemOnPage { .. }));
        assert_eq!(catalog.forward(), &before);
        assert_eq!(names_on(&catalog, 1), vec!["The Row loafer"]);
    }

    #[test]
    fn add_splits_dual_item_lines() {
        let mut catalog = spring();
        let keys = catalog
            .add_item_to_page(PageId::new(2), "Prada bag Alden loafer", None)
            .unwrap();
        assert_eq!(keys, vec![key("Prada bag"), key("Alden loafer")]);
        assert_eq!(catalog.pages_for_item(&key("Alden loafer")), vec![PageId::new(2)]);
    }

    #[test]
    fn invalid_category_is_rejected_before_any_change() {
        let mut catalog = spring();
        let err = catalog
            .add_item_to_page(PageId::new(1), "Prada cape", Some("Capes"))
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidCategory { .. }));
        assert_eq!(catalog.page_count(), 0);
    }

    #[test]
    fn removing_last_occurrence_drops_the_item() {
        let mut catalog = spring();
        catalog.add_item_to_page(PageId::new(1), "Prada bag", None).unwrap();
        catalog.remove_item_from_page(PageId::new(1), &key("Prada bag")).unwrap();
        assert!(catalog.inverse().is_empty());
        assert!(catalog.forward()[&PageId::new(1)].is_empty());
        let err = catalog
            .remove_item_from_page(PageId::new(1), &key("Prada bag"))
            .unwrap_err();
        assert!(matches!(err, CatalogError::ItemNotFound { .. }));
    }

    #[test]
    fn removing_from_a_missing_page_is_item_not_found() {
        let mut catalog = spring();
        catalog.add_item_to_page(PageId::new(1), "Prada bag", None).unwrap();
        let err = catalog
            .remove_item_from_page(PageId::new(9), &key("Prada bag"))
            .unwrap_err();
        assert!(matches!(err, CatalogError::ItemNotFound { .. }));
        assert_eq!(err.kind(), crate::error::ErrorKind::ItemNotFound);
        assert_eq!(catalog.item_count(), 1);
    }

    #[test]
    fn hand_edited_artifact_names_match_their_clean_key() {
        let mut forward = ForwardIndex::new();
        forward.insert(
            PageId::new(1),
            vec![ItemEntry::new("i The Row brown tassel loafer", Category::other())],
        );
        forward.insert(
            PageId::new(2),
            vec![ItemEntry::new("The Row brown tassel loafer", Category::other())],
        );
        let mut catalog = Catalog::from_forward(
            CollectionId::Summer,
            SchemaTag::Simple,
            Taxonomy::new(CollectionId::Summer, ["Tops"]),
            Normalizer::default(),
            forward,
        );
        let loafer = catalog
            .normalizer()
            .clean("The Row brown tassel loafer")
            .unwrap()
            .key;
        assert_eq!(catalog.item_count(), 1);
        assert_eq!(catalog.pages_for_item(&loafer), vec![PageId::new(1), PageId::new(2)]);

        let err = catalog
            .add_item_to_page(PageId::new(1), "The Row brown tassel loafer", None)
            .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateItemOnPage { .. }));

        let removed = catalog.remove_item_from_page(PageId::new(1), &loafer).unwrap();
        assert_eq!(removed.name, "i The Row brown tassel loafer");
        assert_eq!(catalog.pages_for_item(&loafer), vec![PageId::new(2)]);
    }

    #[test]
    fn rename_onto_existing_key_merges_and_keeps_first_category() {
        let mut catalog = spring();
        catalog.add_item_to_page(PageId::new(1), "Sunspel tee", Some("Tops")).unwrap();
        catalog.add_item_to_page(PageId::new(1), "Sunspel t-shirt", None).unwrap();
        catalog.add_item_to_page(PageId::new(2), "Sunspel t-shirt", None).unwrap();
        let outcome = catalog.rename_item(&key("Sunspel tee"), "Sunspel T-shirt").unwrap();
        let RenameOutcome::Merged(report) = outcome else {
            panic!("expected merge, got {outcome:?}");
        };
        assert_eq!(report.collapsed, 1);
        assert_eq!(names_on(&catalog, 1), vec!["Sunspel T-shirt"]);
        let record = &catalog.inverse()[&key("Sunspel T-shirt")];
        assert_eq!(record.category.as_str(), "Tops");
        assert_eq!(record.pages.len(), 2);
    }

    #[test]
    fn rename_to_same_name_is_unchanged() {
        let mut catalog = spring();
        catalog.add_item_to_page(PageId::new(1), "Prada bag", None).unwrap();
        let outcome = catalog.rename_item(&key("Prada bag"), " Prada   bag ").unwrap();
        assert_eq!(outcome, RenameOutcome::Unchanged { key: key("Prada bag") });
    }

    #[test]
    fn merge_absorbs_a_third_item_with_the_result_key() {
        let mut catalog = spring();
        catalog.add_item_to_page(PageId::new(1), "Alden loafer", None).unwrap();
        catalog.add_item_to_page(PageId::new(2), "Alden penny loafer", None).unwrap();
        catalog.add_item_to_page(PageId::new(3), "Alden 986 loafer", None).unwrap();
        let report = catalog
            .merge_items(&key("Alden loafer"), &key("Alden penny loafer"), "Alden 986 loafer")
            .unwrap();
        assert_eq!(report.absorbed.len(), 2);
        assert_eq!(catalog.item_count(), 1);
        assert_eq!(catalog.inverse()[&key("Alden 986 loafer")].pages.len(), 3);
    }

    #[test]
    fn recategorize_updates_every_occurrence() {
        let mut catalog = spring();
        catalog.add_item_to_page(PageId::new(1), "Incotex chino", None).unwrap();
        catalog.add_item_to_page(PageId::new(4), "Incotex chino", None).unwrap();
        catalog.recategorize(&key("Incotex chino"), "bottoms").unwrap();
        assert!(catalog
            .forward()
            .values()
            .flatten()
            .all(|e| e.category.as_str() == "Bottoms"));
        assert_eq!(catalog.category_stats().unwrap().get("Bottoms"), 1);
        assert!(catalog.recategorize(&key("Incotex chino"), "Capes").is_err());
    }

    #[test]
    fn delete_page_cascades_to_items() {
        let mut catalog = spring();
        catalog.add_item_to_page(PageId::new(1), "Prada bag", None).unwrap();
        catalog.add_item_to_page(PageId::new(2), "Prada bag", None).unwrap();
        catalog.add_item_to_page(PageId::new(2), "Alden loafer", None).unwrap();
        catalog.delete_page(PageId::new(2)).unwrap();
        assert_eq!(catalog.item_count(), 1);
        assert!(matches!(
            catalog.delete_page(PageId::new(2)),
            Err(CatalogError::PageNotFound { .. })
        ));
    }

    #[test]
    fn bulk_normalization_cleans_splits_and_collapses() {
        let mut forward = ForwardIndex::new();
        forward.insert(
            PageId::new(1),
            vec![
                ItemEntry::new("i The Row loafer", Category::other()),
                ItemEntry::new("The Row loafer,", Category::other()),
                ItemEntry::new("Prada bag Alden loafer", Category::other()),
                ItemEntry::new("Prada bag Gucci belt Celine sunglasses", Category::other()),
            ],
        );
        let mut catalog = Catalog::from_forward(
            CollectionId::Summer,
            SchemaTag::Simple,
            Taxonomy::new(CollectionId::Summer, ["Tops"]),
            Normalizer::default(),
            forward,
        );
        // The two loafer spellings already share a key, so loading kept only the first.
        let report = catalog.apply_normalization();
        assert_eq!(report.cleaned, 1);
        assert_eq!(report.split, 1);
        assert_eq!(report.collapsed, 0);
        assert_eq!(report.ambiguous.len(), 1);
        assert_eq!(
            names_on(&catalog, 1),
            vec![
                "The Row loafer",
                "Prada bag",
                "Alden loafer",
                "Prada bag Gucci belt Celine sunglasses"
            ]
        );
        assert!(!catalog.apply_normalization().changed());
    }
}
