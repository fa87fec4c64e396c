//! Outcomes returned by engine mutators.

use serde::Serialize;

use super::common::{ItemKey, PageId};

/// Result of a rename; a rename onto an existing key becomes a merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RenameOutcome {
    /// Display name updated in place on every occurrence.
    Renamed { key: ItemKey, occurrences: usize },
    /// The new name collided with another item and both were folded together.
    Merged(MergeReport),
    /// New name equals the current display name.
    Unchanged { key: ItemKey },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    /// Key of the surviving item.
    pub key: ItemKey,
    /// Keys folded into it (excluding the survivor when it was already present).
    pub absorbed: Vec<ItemKey>,
    /// Pages the merged item now appears on.
    pub pages: usize,
    /// Duplicate occurrences removed from pages that carried more than one participant.
    pub collapsed: usize,
}

/// A stored name the brand heuristic could not split safely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AmbiguousName {
    pub page: PageId,
    pub name: String,
    pub brands: Vec<String>,
}

/// Summary of a bulk normalization pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NormalizationReport {
    /// Occurrences whose display name changed after cleaning.
    pub cleaned: usize,
    /// Occurrences split into two items.
    pub split: usize,
    /// Occurrences dropped because cleaning made them duplicates on their page.
    pub collapsed: usize,
    pub ambiguous: Vec<AmbiguousName>,
}

impl NormalizationReport {
    #[must_use]
    pub fn changed(&self) -> bool {
        self.cleaned > 0 || self.split > 0 || self.collapsed > 0
    }
}
