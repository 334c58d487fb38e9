//! `parkdb-core`: data model and canonicalization for the nuclear
//! reaction reference corpus.
//!
//! Pure crate: receives raw cell grids, returns canonical tables.
//! No file IO or database dependencies.

pub mod canonical;
pub mod error;
pub mod layout;
pub mod model;

pub use canonical::{merge_fragments, slice_table};
pub use error::Error;
pub use model::{RawTable, SourceWarning};
