use std::fmt;

#[derive(Debug)]
pub enum Error {
    /// Input file or directory is absent. Fatal for single-file sources.
    SourceNotFound { path: String },
    /// The workbook exists but the named sheet does not.
    SheetNotFound { path: String, sheet: String },
    /// A crawl page contains no `<table class="results">`.
    NoResultsTable { file: String },
    /// A numeric-typed column holds text that does not parse. Fails the
    /// whole table load; the sources guarantee well-formed numerics.
    MalformedNumericField {
        table: String,
        column: String,
        row: usize,
        value: String,
    },
    /// A CSV header names a column the schema does not declare.
    UndeclaredColumn { table: String, column: String },
    /// Rows written to the store differ from rows the canonicalizer produced.
    RowCountMismatch {
        table: String,
        loaded: usize,
        expected: usize,
    },
    /// Rebuild phase called out of order.
    PhaseOrder {
        expected: &'static str,
        actual: &'static str,
    },
    /// Filesystem error (read, delete, create dir).
    Io(String),
    /// CSV read/write error.
    Csv(String),
    /// SQLite error.
    Sql(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceNotFound { path } => write!(f, "source not found: {path}"),
            Self::SheetNotFound { path, sheet } => {
                write!(f, "workbook '{path}' has no sheet '{sheet}'")
            }
            Self::NoResultsTable { file } => {
                write!(f, "no results table found in {file}")
            }
            Self::MalformedNumericField { table, column, row, value } => {
                write!(
                    f,
                    "table '{table}', column '{column}', row {row}: cannot parse numeric value '{value}'"
                )
            }
            Self::UndeclaredColumn { table, column } => {
                write!(f, "table '{table}': source column '{column}' is not declared in the schema")
            }
            Self::RowCountMismatch { table, loaded, expected } => {
                write!(f, "table '{table}': loaded {loaded} rows, canonicalizer produced {expected}")
            }
            Self::PhaseOrder { expected, actual } => {
                write!(f, "rebuild phase out of order: expected {expected}, store is at {actual}")
            }
            Self::Io(msg) => write!(f, "IO error: {msg}"),
            Self::Csv(msg) => write!(f, "CSV error: {msg}"),
            Self::Sql(msg) => write!(f, "SQL error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}
