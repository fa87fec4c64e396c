//! Error taxonomy shared by the engine, the store, and the normalization rules.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::{CollectionId, ItemKey, PageId};

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Operator-facing bucket an error belongs to.
///
/// Callers (CLI, edit UI) report on the bucket; the variant carries the detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ItemNotFound,
    PageNotFound,
    DuplicateItemOnPage,
    InvalidCategory,
    StoreIo,
    NormalizationAmbiguous,
    Usage,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("item '{key}' not found")]
    ItemNotFound { key: ItemKey },

    #[error("{page} not found")]
    PageNotFound { page: PageId },

    #[error("item '{key}' already present on {page}")]
    DuplicateItemOnPage { page: PageId, key: ItemKey },

    #[error("category '{category}' is not part of the {collection} taxonomy")]
    InvalidCategory {
        collection: CollectionId,
        category: String,
    },

    #[error("store I/O failed for {}: {source}", path.display())]
    StoreIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed collection file {}: {reason}", path.display())]
    MalformedStore { path: PathBuf, reason: String },

    #[error("cannot split '{raw}' safely: found brands {brands:?}")]
    NormalizationAmbiguous { raw: String, brands: Vec<String> },

    #[error("invalid page key '{key}'")]
    InvalidPageKey { key: String },

    #[error("unknown collection '{id}'")]
    UnknownCollection { id: String },

    #[error("collection {id} is not configured in this library")]
    CollectionNotLoaded { id: CollectionId },

    #[error("item name is empty after cleaning")]
    EmptyName,

    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CatalogError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ItemNotFound { .. } => ErrorKind::ItemNotFound,
            Self::PageNotFound { .. } => ErrorKind::PageNotFound,
            Self::DuplicateItemOnPage { .. } => ErrorKind::DuplicateItemOnPage,
            Self::InvalidCategory { .. } => ErrorKind::InvalidCategory,
            Self::StoreIo { .. } | Self::MalformedStore { .. } => ErrorKind::StoreIo,
            Self::NormalizationAmbiguous { .. } => ErrorKind::NormalizationAmbiguous,
            Self::InvalidPageKey { .. }
            | Self::UnknownCollection { .. }
            | Self::CollectionNotLoaded { .. }
            | Self::EmptyName
            | Self::InvalidConfig { .. }
            | Self::Json(_) => ErrorKind::Usage,
        }
    }

    /// True for failures at the persistence boundary (missing, unreadable, or malformed files).
    #[must_use]
    pub fn is_store_error(&self) -> bool {
        self.kind() == ErrorKind::StoreIo
    }

    pub(crate) fn store_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::StoreIo {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::MalformedStore {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
