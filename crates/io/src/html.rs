//! Crawled HTML result-table reader.
//!
//! Each crawl page carries exactly one `<table class="results">` whose first
//! row is the header and remaining rows are data. Large tables are split
//! across many numbered files; those are read as a glob group and merged
//! with header-consistency checking.

use std::io::Read;
use std::path::{Path, PathBuf};

use quick_xml::events::Event;
use quick_xml::Reader;

use parkdb_core::canonical::merge_fragments;
use parkdb_core::model::normalize_cell;
use parkdb_core::{Error, RawTable, SourceWarning};

/// Read the results table from a single crawl page.
///
/// A missing file is `SourceNotFound`; a page without a results table is
/// `NoResultsTable`. Both are fatal for single-file sources.
pub fn read_table(path: &Path, name: &str) -> Result<RawTable, Error> {
    if !path.exists() {
        return Err(Error::SourceNotFound {
            path: path.display().to_string(),
        });
    }
    let content = read_file_as_utf8(path)?;
    extract_results_table(&content, name).ok_or_else(|| Error::NoResultsTable {
        file: path.display().to_string(),
    })
}

/// Read a multi-file table group resolved from a glob pattern.
///
/// Files merge in lexicographic order. Zero matches is an *empty* source,
/// not a missing one, `Ok(None)`. A fragment whose header differs from the
/// first fragment's, or a fragment with no results table, yields a warning;
/// rows from mismatched fragments are still appended.
pub fn read_table_group(
    pattern: &str,
    name: &str,
) -> Result<(Option<RawTable>, Vec<SourceWarning>), Error> {
    let mut files: Vec<PathBuf> = glob::glob(pattern)
        .map_err(|e| Error::Io(format!("bad glob pattern '{pattern}': {e}")))?
        .filter_map(|entry| entry.ok())
        .collect();
    files.sort();

    if files.is_empty() {
        return Ok((None, Vec::new()));
    }

    let mut warnings = Vec::new();
    let mut fragments = Vec::new();
    for file in &files {
        let label = file.display().to_string();
        let content = read_file_as_utf8(file)?;
        match extract_results_table(&content, name) {
            Some(fragment) => fragments.push((label, fragment)),
            None => warnings.push(SourceWarning::NoResultsTable { file: label }),
        }
    }

    let (merged, mut merge_warnings) = merge_fragments(name, fragments);
    warnings.append(&mut merge_warnings);
    Ok((Some(merged), warnings))
}

/// Read file bytes and decode as UTF-8, falling back to Windows-1252.
/// The crawl pages are ISO-8859-1.
fn read_file_as_utf8(path: &Path) -> Result<String, Error> {
    let mut file = std::fs::File::open(path)
        .map_err(|e| Error::Io(format!("{}: {e}", path.display())))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| Error::Io(format!("{}: {e}", path.display())))?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

/// Extract the first `<table class="results">` from a page.
///
/// First `<tr>` is the header, the rest are data rows; cell text is
/// whitespace-trimmed and empty cells become null. Returns `None` when the
/// page has no results table.
fn extract_results_table(html: &str, name: &str) -> Option<RawTable> {
    let mut reader = Reader::from_str(html);
    reader.config_mut().check_end_names = false;
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut in_table = false;
    let mut in_cell = false;
    let mut cell_text = String::new();
    let mut current_row: Option<Vec<Option<String>>> = None;
    let mut raw_rows: Vec<Vec<Option<String>>> = Vec::new();
    let mut found = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"table" if !in_table => {
                    let class = e
                        .try_get_attribute("class")
                        .ok()
                        .flatten()
                        .map(|attr| attr.value.to_vec());
                    if class.as_deref() == Some(b"results") {
                        in_table = true;
                        found = true;
                    }
                }
                b"tr" if in_table => current_row = Some(Vec::new()),
                b"td" | b"th" if in_table => {
                    in_cell = true;
                    cell_text.clear();
                }
                _ => {}
            },
            Ok(Event::Text(ref e)) if in_cell => {
                cell_text.push_str(&String::from_utf8_lossy(e.as_ref()));
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"td" | b"th" if in_cell => {
                    in_cell = false;
                    if let Some(row) = current_row.as_mut() {
                        row.push(normalize_cell(&cell_text));
                    }
                }
                b"tr" if in_table => {
                    if let Some(row) = current_row.take() {
                        if !row.is_empty() {
                            raw_rows.push(row);
                        }
                    }
                }
                b"table" if in_table => break,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    if !found {
        return None;
    }

    let mut rows = raw_rows.into_iter();
    let headers: Vec<String> = rows
        .next()
        .map(|header_row| {
            header_row
                .into_iter()
                .map(|cell| cell.unwrap_or_default())
                .collect()
        })
        .unwrap_or_default();

    let mut table = RawTable::new(name, headers);
    table.rows = rows.collect();
    Some(table)
}
