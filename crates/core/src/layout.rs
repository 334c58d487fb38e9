//! Declarative layouts for the spreadsheet sources.
//!
//! The workbook packs two reaction families side-by-side on one physical
//! sheet, at fixed column offsets that are not self-describing. Rather than
//! inline magic indices in the canonicalizer, each (sheet, logical table)
//! pair is declared here so the mapping is testable in isolation.

/// One logical table carved out of a fixed column range of a sheet.
#[derive(Debug, Clone, Copy)]
pub struct TableSlice {
    /// Logical table name (also the CSV intermediate's base name).
    pub table: &'static str,
    /// First physical column of the range.
    pub start_col: usize,
    /// Logical column names, in physical order.
    pub columns: &'static [&'static str],
    /// Columns that must be non-null for a row to be retained.
    pub key_columns: &'static [&'static str],
}

impl TableSlice {
    pub fn width(&self) -> usize {
        self.columns.len()
    }
}

/// A sheet region: name, rows to discard before the header line, and the
/// table slices sharing its physical rows.
#[derive(Debug, Clone, Copy)]
pub struct SheetLayout {
    pub sheet: &'static str,
    pub skip_rows: usize,
    pub slices: &'static [TableSlice],
}

/// The `Fus_Fis` sheet: fusion on the left, fission on the right, two blank
/// spacer columns between them. Six banner rows precede the header line.
pub const FUS_FIS: SheetLayout = SheetLayout {
    sheet: "Fus_Fis",
    skip_rows: 6,
    slices: &[
        TableSlice {
            table: "Fusion",
            start_col: 0,
            columns: &["E1", "A1", "Z1", "E2", "A2", "Z2", "E", "A", "Z", "MeV"],
            key_columns: &["E1", "E2", "E", "MeV"],
        },
        TableSlice {
            table: "Fission",
            start_col: 12,
            columns: &["E", "A", "Z", "E1", "A1", "Z1", "E2", "A2", "Z2", "MeV"],
            key_columns: &["E", "E1", "E2", "MeV"],
        },
    ],
};

/// The `2--->2` sheet: a single table, two stacked banner/header rows.
pub const TWO_TO_TWO: SheetLayout = SheetLayout {
    sheet: "2--->2",
    skip_rows: 8,
    slices: &[TableSlice {
        table: "TwoToTwo",
        start_col: 0,
        columns: &[
            "E1", "A1", "Z1", "E2", "A2", "Z2", "E3", "A3", "Z3", "E4", "A4", "Z4", "MeV",
        ],
        key_columns: &["E1", "E2", "E3", "E4", "MeV"],
    }],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_columns_are_declared_columns() {
        for layout in [&FUS_FIS, &TWO_TO_TWO] {
            for slice in layout.slices {
                for key in slice.key_columns {
                    assert!(
                        slice.columns.contains(key),
                        "{}: key column {key} not in column list",
                        slice.table
                    );
                }
            }
        }
    }

    #[test]
    fn fus_fis_slices_are_disjoint() {
        let fusion = &FUS_FIS.slices[0];
        let fission = &FUS_FIS.slices[1];
        assert!(fusion.start_col + fusion.width() <= fission.start_col);
    }

    #[test]
    fn slice_widths_match_column_lists() {
        assert_eq!(FUS_FIS.slices[0].width(), 10);
        assert_eq!(FUS_FIS.slices[1].width(), 10);
        assert_eq!(TWO_TO_TWO.slices[0].width(), 13);
    }
}
