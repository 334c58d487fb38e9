use std::fmt;

use serde::Serialize;

/// One logical table as read from a source: a header line plus data rows.
///
/// Cells are `Option<String>`, where `None` is a null cell. Empty and
/// whitespace-only source cells normalize to `None` (the CSV intermediate
/// writes them back as empty fields).
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    pub fn new(name: impl Into<String>, headers: Vec<String>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows: Vec::new(),
        }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Trim a source cell; empty becomes null.
pub fn normalize_cell(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Non-fatal conditions raised while reading or merging a source.
///
/// These are warnings by design: fragment files are known to have drifted
/// historically, so rows are still appended and an operator decides whether
/// the drift is acceptable.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum SourceWarning {
    /// A fragment file's header differs from the first fragment's header.
    HeaderMismatch {
        file: String,
        expected: Vec<String>,
        found: Vec<String>,
    },
    /// One file of a multi-file group has no results table; it is skipped.
    NoResultsTable { file: String },
}

impl fmt::Display for SourceWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HeaderMismatch { file, expected, found } => {
                write!(
                    f,
                    "header mismatch in {file}: expected [{}], got [{}]",
                    expected.join(", "),
                    found.join(", ")
                )
            }
            Self::NoResultsTable { file } => {
                write!(f, "no results table in {file} (skipped)")
            }
        }
    }
}
