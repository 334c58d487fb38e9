//! Rebuild orchestrator.
//!
//! The store is rebuilt from scratch or not at all: delete any prior
//! database file, recreate the schema, load every table, build indexes and
//! views, verify. The phases form a strict one-way sequence carried by a
//! [`Rebuild`] handle that owns the connection. There is no ambient global
//! store, and no way to resume a failed rebuild other than starting over
//! from `NotStarted`.

use std::path::{Path, PathBuf};

use rusqlite::Connection;
use serde::Serialize;

use parkdb_core::Error;
use parkdb_io::csv;

use crate::load::load_table;
use crate::schema;
use crate::sql_err;
use crate::verify::{self, VerifyReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    SchemaDropped,
    SchemaCreated,
    TablesLoaded,
    IndexesBuilt,
    ViewsBuilt,
    Verified,
    Done,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Self::NotStarted => "NotStarted",
            Self::SchemaDropped => "SchemaDropped",
            Self::SchemaCreated => "SchemaCreated",
            Self::TablesLoaded => "TablesLoaded",
            Self::IndexesBuilt => "IndexesBuilt",
            Self::ViewsBuilt => "ViewsBuilt",
            Self::Verified => "Verified",
            Self::Done => "Done",
        }
    }
}

/// Which CSV intermediates feed the rebuild.
///
/// Bootstrap loads the minimal spreadsheet extract (key columns only,
/// flags from schema defaults) and synthesizes an identity-only element
/// relation from the reaction participants. Full loads the scraped CSVs
/// with every flag and provenance column explicit. Both produce the same
/// schema, so the verifier never branches on mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    Bootstrap,
    Full,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableCount {
    pub table: String,
    pub rows: usize,
}

pub struct Rebuild {
    db_path: PathBuf,
    conn: Option<Connection>,
    phase: Phase,
}

impl Rebuild {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            conn: None,
            phase: Phase::NotStarted,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn ensure(&self, expected: Phase) -> Result<(), Error> {
        if self.phase != expected {
            return Err(Error::PhaseOrder {
                expected: expected.name(),
                actual: self.phase.name(),
            });
        }
        Ok(())
    }

    fn conn(&self) -> Result<&Connection, Error> {
        self.conn.as_ref().ok_or(Error::PhaseOrder {
            expected: "SchemaCreated",
            actual: self.phase.name(),
        })
    }

    /// Delete any prior store file. Mandatory: a rebuild is never layered
    /// on an existing store.
    pub fn drop_store(&mut self) -> Result<(), Error> {
        self.ensure(Phase::NotStarted)?;
        if self.db_path.exists() {
            std::fs::remove_file(&self.db_path)
                .map_err(|e| Error::Io(format!("{}: {e}", self.db_path.display())))?;
        }
        self.phase = Phase::SchemaDropped;
        Ok(())
    }

    pub fn create_schema(&mut self) -> Result<(), Error> {
        self.ensure(Phase::SchemaDropped)?;
        if let Some(parent) = self.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| Error::Io(format!("{}: {e}", parent.display())))?;
            }
        }
        let conn = Connection::open(&self.db_path).map_err(sql_err)?;
        for spec in schema::TABLES {
            conn.execute(&spec.create_sql(), []).map_err(sql_err)?;
        }
        self.conn = Some(conn);
        self.phase = Phase::SchemaCreated;
        Ok(())
    }

    /// Load every table the mode covers, in registry order. Asserts that
    /// rows written equal rows read from each CSV intermediate.
    pub fn load_tables(
        &mut self,
        data_dir: &Path,
        mode: LoadMode,
    ) -> Result<Vec<TableCount>, Error> {
        self.ensure(Phase::SchemaCreated)?;
        let conn = self.conn()?;

        let mut counts = Vec::new();
        for spec in schema::TABLES {
            let Some(file) = spec.source_csv(mode) else {
                continue;
            };
            let table = csv::read_table(&data_dir.join(file), spec.name)?;
            let expected = table.rows.len();
            let written = load_table(conn, spec, &table)?;
            if written != expected {
                return Err(Error::RowCountMismatch {
                    table: spec.name.to_string(),
                    loaded: written,
                    expected,
                });
            }
            counts.push(TableCount {
                table: spec.name.to_string(),
                rows: written,
            });
        }

        if mode == LoadMode::Bootstrap {
            let synthesized = synthesize_elements(conn)?;
            counts.push(TableCount {
                table: "ElementPropertiesPlus".to_string(),
                rows: synthesized,
            });
        }

        self.phase = Phase::TablesLoaded;
        Ok(counts)
    }

    pub fn build_indexes(&mut self) -> Result<(), Error> {
        self.ensure(Phase::TablesLoaded)?;
        let conn = self.conn()?;
        for spec in schema::TABLES {
            for sql in spec.index_sql() {
                conn.execute(&sql, []).map_err(sql_err)?;
            }
        }
        self.phase = Phase::IndexesBuilt;
        Ok(())
    }

    pub fn build_views(&mut self) -> Result<(), Error> {
        self.ensure(Phase::IndexesBuilt)?;
        self.conn()?
            .execute(schema::ELEMENTS_VIEW_SQL, [])
            .map_err(sql_err)?;
        self.phase = Phase::ViewsBuilt;
        Ok(())
    }

    /// Run the verification battery. Failed checks do not fail the
    /// rebuild; the report is diagnostic and the decision to re-run is
    /// the operator's.
    pub fn verify(&mut self) -> Result<VerifyReport, Error> {
        self.ensure(Phase::ViewsBuilt)?;
        let report = verify::run_checks(self.conn()?, &self.db_path.display().to_string())?;
        self.phase = Phase::Verified;
        Ok(report)
    }

    pub fn finish(mut self) -> Result<(), Error> {
        self.ensure(Phase::Verified)?;
        self.conn.take();
        self.phase = Phase::Done;
        Ok(())
    }
}

/// Bootstrap sources carry no element table; derive an identity-only one
/// from the distinct (symbol, proton number) participants of the loaded
/// reactions, with the symbol standing in for the element name. Z is the
/// primary key, so when several symbols share a proton number (hydrogen
/// isotopes) the alphabetically first symbol wins; the tie order is part
/// of the rebuild's determinism.
fn synthesize_elements(conn: &Connection) -> Result<usize, Error> {
    conn.execute(
        "INSERT OR IGNORE INTO ElementPropertiesPlus (Z, E, EName)
         SELECT DISTINCT Z, E, E FROM (
             SELECT E1 AS E, Z1 AS Z FROM FusionAll
             UNION SELECT E2, Z2 FROM FusionAll
             UNION SELECT E, Z FROM FusionAll
             UNION SELECT E, Z FROM FissionAll
             UNION SELECT E1, Z1 FROM FissionAll
             UNION SELECT E2, Z2 FROM FissionAll
             UNION SELECT E1, Z1 FROM TwoToTwoAll
             UNION SELECT E2, Z2 FROM TwoToTwoAll
             UNION SELECT E3, Z3 FROM TwoToTwoAll
             UNION SELECT E4, Z4 FROM TwoToTwoAll
         )
         WHERE E IS NOT NULL AND Z IS NOT NULL
         ORDER BY Z, E",
        [],
    )
    .map_err(sql_err)
}

/// Drive a complete rebuild: drop, create, load, index, view, verify.
pub fn run(
    db_path: &Path,
    data_dir: &Path,
    mode: LoadMode,
) -> Result<(Vec<TableCount>, VerifyReport), Error> {
    let mut rebuild = Rebuild::new(db_path);
    rebuild.drop_store()?;
    rebuild.create_schema()?;
    let counts = rebuild.load_tables(data_dir, mode)?;
    rebuild.build_indexes()?;
    rebuild.build_views()?;
    let report = rebuild.verify()?;
    rebuild.finish()?;
    Ok((counts, report))
}
