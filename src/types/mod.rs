//! Public types exposed by the `lookbook-core` crate.

pub mod common;
pub mod item;
pub mod query;
pub mod report;
pub mod verification;

pub use common::{CollectionId, ItemKey, PageId, SchemaTag, Season};
pub use item::{
    Category, CategoryStats, ForwardIndex, InverseIndex, ItemEntry, ItemRecord, Taxonomy,
};
pub use query::{CategoryGroup, ItemFilter, ItemSummary, SeasonView};
pub use report::{AmbiguousName, MergeReport, NormalizationReport, RenameOutcome};
pub use verification::{
    DoctorFinding, DoctorFindingCode, DoctorReport, DoctorSeverity, DoctorStatus,
};
