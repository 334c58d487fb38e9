//! `parkdb-io`: source readers for the ingest pipeline.
//!
//! One module per physical source kind: spreadsheet sheet regions
//! (calamine), crawled HTML result tables (quick-xml, single file or glob
//! group), and the UTF-8 CSV intermediate that connects the phases.

pub mod csv;
pub mod html;
pub mod xlsx;
