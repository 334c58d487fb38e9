//! `parkdb-store`: the relational store behind the lookup application.
//!
//! Declares the canonical schema, streams canonicalized CSV rows into it,
//! orchestrates the all-or-nothing rebuild cycle, and runs the post-rebuild
//! verification battery. The store is disposable: a rebuild always deletes
//! any prior database file and reloads from the CSV intermediates.

pub mod load;
pub mod rebuild;
pub mod schema;
pub mod verify;

pub use rebuild::{LoadMode, Phase, Rebuild, TableCount};
pub use verify::{CheckStatus, VerifyReport};

pub(crate) fn sql_err(e: rusqlite::Error) -> parkdb_core::Error {
    parkdb_core::Error::Sql(e.to_string())
}
