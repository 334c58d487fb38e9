//! Loader: canonicalized CSV rows into the store.

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};

use parkdb_core::{Error, RawTable};

use crate::schema::{ColumnSpec, ColumnType, TableSpec};
use crate::sql_err;

enum Target<'a> {
    /// The table's own id column, present in scraped CSVs.
    Id,
    Column(&'a ColumnSpec),
}

/// Stream one canonical table into its store table.
///
/// Columns map by header name; headers the schema does not declare abort
/// the load. Empty cells become SQL NULL. Numeric parsing is loud:
/// anything unparseable in an integer or real column fails the whole
/// table, since the sources guarantee well-formed numerics. The table is
/// guaranteed empty by the orchestrator, so this is pure append.
///
/// Returns the number of rows written, which the caller asserts against
/// the canonicalizer's row count.
pub fn load_table(conn: &Connection, spec: &TableSpec, table: &RawTable) -> Result<usize, Error> {
    let mut targets: Vec<Target> = Vec::with_capacity(table.headers.len());
    for header in &table.headers {
        if header == "id" && spec.has_id_key() {
            targets.push(Target::Id);
        } else if let Some(column) = spec.column(header) {
            targets.push(Target::Column(column));
        } else {
            return Err(Error::UndeclaredColumn {
                table: spec.name.to_string(),
                column: header.clone(),
            });
        }
    }

    let placeholders: Vec<String> = (1..=targets.len()).map(|i| format!("?{i}")).collect();
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        spec.name,
        table.headers.join(", "),
        placeholders.join(", ")
    );

    conn.execute("BEGIN TRANSACTION", []).map_err(sql_err)?;
    let result = insert_rows(conn, spec, table, &targets, &sql);
    match result {
        Ok(written) => {
            conn.execute("COMMIT", []).map_err(sql_err)?;
            Ok(written)
        }
        Err(e) => {
            let _ = conn.execute("ROLLBACK", []);
            Err(e)
        }
    }
}

fn insert_rows(
    conn: &Connection,
    spec: &TableSpec,
    table: &RawTable,
    targets: &[Target],
    sql: &str,
) -> Result<usize, Error> {
    let mut stmt = conn.prepare(sql).map_err(sql_err)?;
    let mut written = 0usize;

    for (row_idx, row) in table.rows.iter().enumerate() {
        let mut values: Vec<Value> = Vec::with_capacity(targets.len());
        for (i, target) in targets.iter().enumerate() {
            // Ragged rows are padded with nulls on the right
            let cell = row.get(i).and_then(|c| c.as_deref());
            values.push(convert_cell(spec, target, cell, row_idx, &table.headers[i])?);
        }
        stmt.execute(params_from_iter(values)).map_err(sql_err)?;
        written += 1;
    }

    Ok(written)
}

fn convert_cell(
    spec: &TableSpec,
    target: &Target,
    cell: Option<&str>,
    row_idx: usize,
    column: &str,
) -> Result<Value, Error> {
    let Some(text) = cell else {
        return Ok(Value::Null);
    };

    let ty = match target {
        Target::Id => ColumnType::Integer,
        Target::Column(c) => c.ty,
    };

    match ty {
        ColumnType::Text => Ok(Value::Text(text.to_string())),
        ColumnType::Integer => parse_integer(text)
            .map(Value::Integer)
            .ok_or_else(|| malformed(spec, column, row_idx, text)),
        ColumnType::Real => text
            .parse::<f64>()
            .map(Value::Real)
            .map_err(|_| malformed(spec, column, row_idx, text)),
    }
}

fn malformed(spec: &TableSpec, column: &str, row_idx: usize, value: &str) -> Error {
    Error::MalformedNumericField {
        table: spec.name.to_string(),
        column: column.to_string(),
        row: row_idx,
        value: value.to_string(),
    }
}

/// Integer parse accepting integral floats; the spreadsheet extract writes
/// mass numbers like "34.0".
fn parse_integer(text: &str) -> Option<i64> {
    if let Ok(n) = text.parse::<i64>() {
        return Some(n);
    }
    text.parse::<f64>()
        .ok()
        .filter(|f| f.fract() == 0.0 && f.abs() < 9e15)
        .map(|f| f as i64)
}
