//! Fixed repository layout. The pipeline runs from the repository root and
//! every stage reads and writes these well-known locations.

/// Curated spreadsheet with both reaction families.
pub const WORKBOOK: &str = "docs/FusFis.xlsx";

/// Crawled HTML result pages.
pub const CRAWL_DIR: &str = "crawl";

/// CSV intermediates, the only input the store loader accepts.
pub const DATA_DIR: &str = "data";

/// The published SQLite store.
pub const DB_PATH: &str = "public/parkhomov.db";

/// JSON verification report published next to the store.
pub const VERIFY_REPORT: &str = "public/verify_report.json";
