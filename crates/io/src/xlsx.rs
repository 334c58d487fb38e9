//! Spreadsheet region reader.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use parkdb_core::layout::SheetLayout;
use parkdb_core::Error;

/// A sheet region after skipping banner rows: the header line plus the raw
/// data rows beneath it. Cells are null-normalized but not yet sliced into
/// logical tables; that is the canonicalizer's job.
#[derive(Debug)]
pub struct SheetRegion {
    pub header: Vec<Option<String>>,
    pub rows: Vec<Vec<Option<String>>>,
}

/// Read the sheet region a layout describes.
///
/// Discards `skip_rows` physical rows, takes the next row as the header
/// line, and returns the rest as a cell grid.
pub fn read_region(path: &Path, layout: &SheetLayout) -> Result<SheetRegion, Error> {
    if !path.exists() {
        return Err(Error::SourceNotFound {
            path: path.display().to_string(),
        });
    }

    let mut workbook = open_workbook_auto(path)
        .map_err(|e| Error::Io(format!("failed to open workbook {}: {e}", path.display())))?;

    if !workbook.sheet_names().iter().any(|s| s == layout.sheet) {
        return Err(Error::SheetNotFound {
            path: path.display().to_string(),
            sheet: layout.sheet.to_string(),
        });
    }

    let range = workbook
        .worksheet_range(layout.sheet)
        .map_err(|e| Error::Io(format!("failed to read sheet '{}': {e}", layout.sheet)))?;

    let mut rows = range.rows().skip(layout.skip_rows);
    let header = rows.next().map(convert_row).unwrap_or_default();
    let rows = rows.map(convert_row).collect();

    Ok(SheetRegion { header, rows })
}

fn convert_row(row: &[Data]) -> Vec<Option<String>> {
    row.iter().map(convert_cell).collect()
}

fn convert_cell(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Data::Float(n) => {
            // Format integers without a trailing .0 so mass and proton
            // numbers round-trip cleanly through the CSV intermediate
            if n.fract() == 0.0 && n.abs() < 1e15 {
                Some(format!("{}", *n as i64))
            } else {
                Some(format!("{}", n))
            }
        }
        Data::Int(n) => Some(format!("{}", n)),
        Data::Bool(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::DateTime(dt) => Some(format!("{}", dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
        Data::Error(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parkdb_core::canonical::slice_table;
    use parkdb_core::layout::FUS_FIS;
    use rust_xlsxwriter::Workbook;
    use tempfile::tempdir;

    fn write_fixture(path: &Path) {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name("Fus_Fis").unwrap();

        // Six banner rows, then the header line on row 6
        for r in 0..6u32 {
            sheet.write_string(r, 0, "banner").unwrap();
        }
        let header = ["E1", "A1", "Z1", "E2", "A2", "Z2", "E", "A", "Z", "MeV"];
        for (c, h) in header.iter().enumerate() {
            sheet.write_string(6, c as u16, *h).unwrap();
        }
        // Fission header on the right half
        let fis_header = ["E", "A", "Z", "E1", "A1", "Z1", "E2", "A2", "Z2", "MeV"];
        for (c, h) in fis_header.iter().enumerate() {
            sheet.write_string(6, 12 + c as u16, *h).unwrap();
        }

        // Data row 7: fusion side only
        sheet.write_string(7, 0, "H").unwrap();
        sheet.write_number(7, 1, 1.0).unwrap();
        sheet.write_number(7, 2, 1.0).unwrap();
        sheet.write_string(7, 3, "H").unwrap();
        sheet.write_number(7, 4, 2.0).unwrap();
        sheet.write_number(7, 5, 1.0).unwrap();
        sheet.write_string(7, 6, "H").unwrap();
        sheet.write_number(7, 7, 3.0).unwrap();
        sheet.write_number(7, 8, 1.0).unwrap();
        sheet.write_number(7, 9, 5.494).unwrap();

        workbook.save(path).unwrap();
    }

    #[test]
    fn reads_region_past_banner_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fixture.xlsx");
        write_fixture(&path);

        let region = read_region(&path, &FUS_FIS).unwrap();
        assert_eq!(region.header[0], Some("E1".to_string()));
        assert_eq!(region.rows.len(), 1);
        assert_eq!(region.rows[0][0], Some("H".to_string()));
        // Integral floats come back without a decimal point
        assert_eq!(region.rows[0][1], Some("1".to_string()));
        assert_eq!(region.rows[0][9], Some("5.494".to_string()));
    }

    #[test]
    fn slicing_the_region_filters_the_empty_side() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fixture.xlsx");
        write_fixture(&path);

        let region = read_region(&path, &FUS_FIS).unwrap();
        let fusion = slice_table(&region.rows, &FUS_FIS.slices[0]);
        let fission = slice_table(&region.rows, &FUS_FIS.slices[1]);
        assert_eq!(fusion.rows.len(), 1);
        assert_eq!(fission.rows.len(), 0);
    }

    #[test]
    fn missing_file_is_source_not_found() {
        let err = read_region(Path::new("no/such/workbook.xlsx"), &FUS_FIS).unwrap_err();
        assert!(matches!(err, Error::SourceNotFound { .. }));
    }

    #[test]
    fn missing_sheet_is_sheet_not_found() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("other.xlsx");
        let mut workbook = Workbook::new();
        workbook.add_worksheet().set_name("Other").unwrap();
        workbook.save(&path).unwrap();

        let err = read_region(&path, &FUS_FIS).unwrap_err();
        match err {
            Error::SheetNotFound { sheet, .. } => assert_eq!(sheet, "Fus_Fis"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
