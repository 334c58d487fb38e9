//! CSV intermediate: UTF-8, comma-delimited, header row, empty cell = null.

use std::path::Path;

use parkdb_core::model::normalize_cell;
use parkdb_core::{Error, RawTable};

pub fn write_table(path: &Path, table: &RawTable) -> Result<(), Error> {
    let mut writer = csv::WriterBuilder::new()
        .from_path(path)
        .map_err(|e| Error::Csv(format!("{}: {e}", path.display())))?;

    writer
        .write_record(&table.headers)
        .map_err(|e| Error::Csv(e.to_string()))?;

    for row in &table.rows {
        let record: Vec<&str> = row.iter().map(|cell| cell.as_deref().unwrap_or("")).collect();
        writer
            .write_record(&record)
            .map_err(|e| Error::Csv(e.to_string()))?;
    }

    writer.flush().map_err(|e| Error::Csv(e.to_string()))?;
    Ok(())
}

pub fn read_table(path: &Path, name: &str) -> Result<RawTable, Error> {
    if !path.exists() {
        return Err(Error::SourceNotFound {
            path: path.display().to_string(),
        });
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| Error::Csv(format!("{}: {e}", path.display())))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| Error::Csv(e.to_string()))?
        .iter()
        .map(String::from)
        .collect();

    let mut table = RawTable::new(name, headers);
    for result in reader.records() {
        let record = result.map_err(|e| Error::Csv(e.to_string()))?;
        table
            .rows
            .push(record.iter().map(normalize_cell).collect());
    }

    Ok(table)
}
