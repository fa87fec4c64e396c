//! Doctor findings produced when comparing persisted and derived indexes.

use serde::Serialize;

use super::common::{CollectionId, PageId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DoctorFindingCode {
    /// Persisted inverse index lists an item no page carries.
    OrphanIndexItem,
    /// An item on some page is absent from the persisted inverse index.
    MissingIndexItem,
    /// Persisted page list for an item differs from the forward index.
    StalePageList,
    /// Occurrences of one item disagree on category.
    CategoryDrift,
    /// Stored name still carries OCR artifacts the cleaner would remove.
    UncleanName,
    /// Stored name looks like two items glued together.
    DualItemName,
    /// Persisted inverse index references a malformed page key.
    InvalidPageRef,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DoctorSeverity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DoctorFinding {
    pub code: DoctorFindingCode,
    pub severity: DoctorSeverity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<PageId>,
}

impl DoctorFinding {
    pub(crate) fn new(
        code: DoctorFindingCode,
        severity: DoctorSeverity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code,
            severity,
            message: message.into(),
            item: None,
            page: None,
        }
    }

    pub(crate) fn with_item(mut self, item: impl Into<String>) -> Self {
        self.item = Some(item.into());
        self
    }

    pub(crate) fn with_page(mut self, page: PageId) -> Self {
        self.page = Some(page);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DoctorStatus {
    /// Persisted index matches the forward index and no data issues were seen.
    Clean,
    /// Persisted inverse index is stale; `rebuild_inverse_index` + save repairs it.
    NeedsRebuild,
    /// Forward-index data needs an operator decision (drift, artifacts, glued names).
    NeedsReview,
}

#[derive(Debug, Clone, Serialize)]
pub struct DoctorReport {
    pub collection: CollectionId,
    pub status: DoctorStatus,
    pub findings: Vec<DoctorFinding>,
    /// Items in the derived inverse index.
    pub derived_items: usize,
    /// Entries in the persisted inverse index.
    pub persisted_items: usize,
}

impl DoctorReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.status == DoctorStatus::Clean
    }

    pub fn findings_with(&self, code: DoctorFindingCode) -> impl Iterator<Item = &DoctorFinding> {
        self.findings.iter().filter(move |finding| finding.code == code)
    }
}
