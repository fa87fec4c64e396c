//! Core `Catalog` type: one collection's forward index and the views derived from it.

pub mod doctor;
pub mod index;
pub mod lifecycle;
pub mod mutation;
pub mod query;
pub mod season;

pub use index::build_inverse_index;
pub use lifecycle::Catalog;
