//! Construction and accessors for [`Catalog`].

use std::collections::BTreeMap;

use crate::catalog::index;
use crate::config::{CollectionConfig, NormalizationConfig};
use crate::normalize::Normalizer;
use crate::types::{
    CategoryStats, CollectionId, ForwardIndex, InverseIndex, PageId, SchemaTag, Season, Taxonomy,
};

/// In-memory state of one collection.
///
/// The forward index is authoritative; the inverse index and category stats are rebuilt
/// from it after every mutation, so both views are always mutually consistent. Each
/// collection gets its own instance; nothing is shared between them.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub(crate) id: CollectionId,
    pub(crate) schema: SchemaTag,
    pub(crate) taxonomy: Taxonomy,
    pub(crate) normalizer: Normalizer,
    pub(crate) forward: ForwardIndex,
    pub(crate) inverse: InverseIndex,
    pub(crate) stats: Option<CategoryStats>,
    pub(crate) seasons: Option<BTreeMap<PageId, Season>>,
}

impl Catalog {
    /// Empty collection.
    #[must_use]
    pub fn new(
        id: CollectionId,
        schema: SchemaTag,
        taxonomy: Taxonomy,
        normalizer: Normalizer,
    ) -> Self {
        Self::from_forward(id, schema, taxonomy, normalizer, ForwardIndex::new())
    }

    /// Adopt a decoded forward index.
    ///
    /// Categories outside the taxonomy fall back to `Other`, entries without a usable name
    /// are dropped, and repeated items on one page (compared by cleaned key) are collapsed
    /// to their first occurrence. Each correction is logged.
    #[must_use]
    pub fn from_forward(
        id: CollectionId,
        schema: SchemaTag,
        taxonomy: Taxonomy,
        normalizer: Normalizer,
        mut forward: ForwardIndex,
    ) -> Self {
        let coerced = index::coerce_categories(&mut forward, &taxonomy);
        if coerced > 0 {
            tracing::warn!(collection = %id, coerced, "unknown categories reset to Other");
        }
        let unnamed = index::drop_unnamed(&mut forward, &normalizer);
        if unnamed > 0 {
            tracing::warn!(collection = %id, unnamed, "entries without a usable name dropped on load");
        }
        let collapsed = index::collapse_duplicates(&mut forward, &normalizer);
        if collapsed > 0 {
            tracing::warn!(collection = %id, collapsed, "duplicate items collapsed on load");
        }
        let mut catalog = Self {
            id,
            schema,
            taxonomy,
            normalizer,
            forward,
            inverse: InverseIndex::new(),
            stats: None,
            seasons: None,
        };
        catalog.rebuild_inverse_index();
        catalog
    }

    /// Build from configuration; seasons are tracked when the collection names a seasons file.
    #[must_use]
    pub fn from_config(
        config: &CollectionConfig,
        normalization: &NormalizationConfig,
        forward: ForwardIndex,
    ) -> Self {
        let mut catalog = Self::from_forward(
            config.id,
            config.schema,
            config.taxonomy(),
            Normalizer::new(normalization),
            forward,
        );
        if config.page_seasons_file.is_some() {
            catalog.seasons = Some(BTreeMap::new());
        }
        catalog
    }

    /// Start tracking page seasons, replacing any existing assignments.
    ///
    /// Entries for pages the forward index does not contain are ignored.
    pub fn with_seasons(mut self, seasons: BTreeMap<PageId, Season>) -> Self {
        let (known, unknown): (BTreeMap<_, _>, BTreeMap<_, _>) = seasons
            .into_iter()
            .partition(|(page, _)| self.forward.contains_key(page));
        if !unknown.is_empty() {
            tracing::warn!(collection = %self.id, ignored = unknown.len(), "season entries for unknown pages");
        }
        self.seasons = Some(known);
        self
    }

    #[must_use]
    pub fn id(&self) -> CollectionId {
        self.id
    }

    #[must_use]
    pub fn schema(&self) -> SchemaTag {
        self.schema
    }

    #[must_use]
    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    #[must_use]
    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    #[must_use]
    pub fn forward(&self) -> &ForwardIndex {
        &self.forward
    }

    #[must_use]
    pub fn inverse(&self) -> &InverseIndex {
        &self.inverse
    }

    /// Derived category counts; only categorized collections keep them.
    #[must_use]
    pub fn category_stats(&self) -> Option<&CategoryStats> {
        self.stats.as_ref()
    }

    #[must_use]
    pub fn seasons(&self) -> Option<&BTreeMap<PageId, Season>> {
        self.seasons.as_ref()
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        self.forward.len()
    }

    #[must_use]
    pub fn item_count(&self) -> usize {
        self.inverse.len()
    }
}
