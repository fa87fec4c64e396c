//! Derivation of the inverse index and category stats from the forward index.

use std::collections::{BTreeSet, HashSet};

use crate::catalog::Catalog;
use crate::normalize::Normalizer;
use crate::types::{
    Category, CategoryStats, ForwardIndex, InverseIndex, ItemKey, ItemRecord, Taxonomy,
};

/// Pure rebuild: item key → record with every page the item appears on.
///
/// Items are identified by the key of their cleaned name, so an entry still carrying OCR
/// artifacts joins the same record as its clean spelling. An item's display name and
/// category come from its first occurrence in page order.
#[must_use]
pub fn build_inverse_index(forward: &ForwardIndex, normalizer: &Normalizer) -> InverseIndex {
    let mut inverse = InverseIndex::new();
    for (page, entries) in forward {
        for entry in entries {
            let key = entry.key(normalizer);
            if key.is_empty() {
                continue;
            }
            inverse
                .entry(key.clone())
                .or_insert_with(|| ItemRecord {
                    key,
                    name: entry.name.clone(),
                    category: entry.category.clone(),
                    pages: BTreeSet::new(),
                })
                .pages
                .insert(*page);
        }
    }
    inverse
}

/// Drop entries whose name has no usable key (`"***"`). Each one is logged.
pub(crate) fn drop_unnamed(forward: &mut ForwardIndex, normalizer: &Normalizer) -> usize {
    let mut removed = 0;
    for (page, entries) in forward.iter_mut() {
        entries.retain(|entry| {
            if entry.key(normalizer).is_empty() {
                tracing::warn!(%page, item = %entry.name, "dropping entry without a usable name");
                removed += 1;
                return false;
            }
            true
        });
    }
    removed
}

/// Keep the first entry per key on every page. Returns how many entries were removed.
pub(crate) fn collapse_duplicates(forward: &mut ForwardIndex, normalizer: &Normalizer) -> usize {
    let mut removed = 0;
    for entries in forward.values_mut() {
        let mut seen: HashSet<ItemKey> = HashSet::with_capacity(entries.len());
        let before = entries.len();
        entries.retain(|entry| {
            let key = entry.key(normalizer);
            key.is_empty() || seen.insert(key)
        });
        removed += before - entries.len();
    }
    removed
}

/// Reset categories outside the taxonomy to `Other`, canonicalising case on the way.
pub(crate) fn coerce_categories(forward: &mut ForwardIndex, taxonomy: &Taxonomy) -> usize {
    let mut coerced = 0;
    for entry in forward.values_mut().flatten() {
        let known = taxonomy.lookup(entry.category.as_str()).cloned();
        if known.is_none() {
            coerced += 1;
        }
        let canonical = known.unwrap_or_else(Category::other);
        if canonical != entry.category {
            entry.category = canonical;
        }
    }
    coerced
}

impl Catalog {
    /// Recompute the inverse index and category stats from the forward index alone.
    ///
    /// Idempotent; this is also the recovery step after the forward-index file was edited
    /// by hand.
    pub fn rebuild_inverse_index(&mut self) {
        self.inverse = build_inverse_index(&self.forward, &self.normalizer);
        self.stats = self
            .schema
            .has_categories()
            .then(|| CategoryStats::tally(&self.taxonomy, &self.inverse));
        tracing::debug!(
            collection = %self.id,
            pages = self.forward.len(),
            items = self.inverse.len(),
            "inverse index rebuilt"
        );
    }
}
