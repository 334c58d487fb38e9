//! Canonicalization: positional raw columns to named logical fields.

use crate::layout::TableSlice;
use crate::model::{normalize_cell, RawTable, SourceWarning};

/// Carve one logical table out of a raw cell grid.
///
/// Takes the slice's fixed column range from every physical row, renames
/// positionally, and retains a row only when every key column is non-null.
/// Two slices of the same grid therefore end up with different row counts;
/// a row validly populated on one side may be empty on the other.
pub fn slice_table(grid: &[Vec<Option<String>>], slice: &TableSlice) -> RawTable {
    let headers: Vec<String> = slice.columns.iter().map(|c| c.to_string()).collect();
    let mut table = RawTable::new(slice.table, headers);

    let key_indices: Vec<usize> = slice
        .columns
        .iter()
        .enumerate()
        .filter(|(_, c)| slice.key_columns.contains(c))
        .map(|(i, _)| i)
        .collect();

    for raw_row in grid {
        let row: Vec<Option<String>> = (0..slice.width())
            .map(|i| {
                raw_row
                    .get(slice.start_col + i)
                    .and_then(|cell| cell.as_deref())
                    .and_then(normalize_cell)
            })
            .collect();

        if key_indices.iter().all(|&i| row[i].is_some()) {
            table.rows.push(row);
        }
    }

    table
}

/// Merge multi-file table fragments into one table.
///
/// Headers come from the first fragment. A later fragment whose header
/// differs produces a warning but its rows are still appended; columns are
/// never silently re-aligned by position. Row order follows file order;
/// order within a file is preserved. No deduplication happens here.
pub fn merge_fragments(
    name: &str,
    fragments: Vec<(String, RawTable)>,
) -> (RawTable, Vec<SourceWarning>) {
    let mut warnings = Vec::new();
    let mut merged = RawTable::new(name, Vec::new());

    for (file, fragment) in fragments {
        if merged.headers.is_empty() {
            merged.headers = fragment.headers.clone();
        } else if merged.headers != fragment.headers {
            warnings.push(SourceWarning::HeaderMismatch {
                file,
                expected: merged.headers.clone(),
                found: fragment.headers.clone(),
            });
        }
        merged.rows.extend(fragment.rows);
    }

    (merged, warnings)
}
