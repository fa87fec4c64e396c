#![deny(clippy::all, clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![cfg_attr(
    test,
    allow(
        clippy::useless_vec,
        clippy::uninlined_format_args,
        clippy::cast_possible_truncation
    )
)]
#![allow(clippy::module_name_repetitions)]
//
// Documentation lints: self-describing accessors don't need error/panic sections.
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
//
// Pattern matching: these pedantic lints often reduce clarity.
#![allow(clippy::manual_let_else)]
#![allow(clippy::match_same_arms)]
//
// Builders and mutators return values callers often ignore.
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::assigning_clones)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unnecessary_wraps)]

//! Index consistency engine for OCR-derived outfit catalogs.
//!
//! A [`Catalog`] owns one collection's forward index (page → items) and keeps the
//! derived inverse index (item → pages) and category stats consistent under every edit.
//! [`Normalizer`] cleans OCR-derived names, [`CollectionStore`] persists collections as
//! JSON with atomic replacement, and [`Library`] holds the independent collections behind
//! per-collection locks.

/// The lookbook-core crate version (matches `Cargo.toml`).
pub const LOOKBOOK_CORE_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod catalog;
pub mod config;
pub mod constants;
pub mod error;
pub mod ingest;
pub mod library;
pub mod normalize;
pub mod schema;
pub mod store;
pub mod types;

pub use catalog::{Catalog, build_inverse_index};
pub use config::{CatalogConfig, CollectionConfig, NormalizationConfig};
pub use error::{CatalogError, ErrorKind, Result};
pub use ingest::{IngestReport, PageImages, TextProducer, ingest_page};
pub use library::Library;
pub use normalize::{NormalizedName, NormalizedNames, Normalizer, canonical_key};
pub use schema::{RawEntry, RawForwardIndex, RawInverseIndex, RawPageRef, decode, encode};
pub use store::CollectionStore;
pub use types::{
    AmbiguousName, Category, CategoryGroup, CategoryStats, CollectionId, DoctorFinding,
    DoctorFindingCode, DoctorReport, DoctorSeverity, DoctorStatus, ForwardIndex, InverseIndex,
    ItemEntry, ItemFilter, ItemKey, ItemRecord, ItemSummary, MergeReport, NormalizationReport,
    PageId, RenameOutcome, SchemaTag, Season, SeasonView, Taxonomy,
};
