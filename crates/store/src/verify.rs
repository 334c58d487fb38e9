//! Post-rebuild verification battery.
//!
//! Five checks run against the finished store, none of which short-circuit
//! the others. The battery is diagnostic: it reports pass/warn/fail per
//! check and never mutates the store. Callers serialize the report to JSON
//! for the publishing pipeline.

use std::collections::BTreeSet;

use chrono::Utc;
use rusqlite::Connection;
use serde::Serialize;

use parkdb_core::Error;

use crate::schema::{self, TableSpec};
use crate::sql_err;

/// Element count the curated sources are expected to cover (hydrogen
/// through plutonium).
pub const EXPECTED_ELEMENTS: i64 = 94;

/// Participant symbols that are legal without an element row of their own.
/// Heavy hydrogen appears under its own symbols in the reaction tables.
pub const HYDROGEN_ALIASES: &[&str] = &["H", "D", "T"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

impl CheckStatus {
    fn rank(self) -> u8 {
        match self {
            Self::Pass => 0,
            Self::Warn => 1,
            Self::Fail => 2,
        }
    }

    pub fn worst(self, other: Self) -> Self {
        if other.rank() > self.rank() {
            other
        } else {
            self
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TableSymbols {
    pub table: String,
    pub symbols: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub rows: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableTags {
    pub table: String,
    pub rows: i64,
    pub tags: Vec<TagCount>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AliasCount {
    pub alias: String,
    pub rows: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum CheckDetail {
    /// Reaction participants whose symbol resolves to no known element or
    /// nuclide.
    ReferentialCompleteness { unknown: Vec<TableSymbols> },
    /// Emission-tag breakdown per reaction table.
    TagDistribution { tables: Vec<TableTags> },
    /// Row counts for the hydrogen isotope symbols in the nuclide table.
    HydrogenAliases { aliases: Vec<AliasCount> },
    /// Elements present versus the expected periodic-table coverage.
    ElementCount { found: i64, expected: i64 },
    /// Symbols carrying markup residue or non-ASCII characters.
    SymbolHygiene { offenders: Vec<String> },
}

#[derive(Debug, Clone, Serialize)]
pub struct Check {
    pub name: &'static str,
    pub status: CheckStatus,
    pub detail: CheckDetail,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportMeta {
    pub store: String,
    pub run_at: String,
    pub version: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyReport {
    pub meta: ReportMeta,
    pub checks: Vec<Check>,
}

impl VerifyReport {
    pub fn worst_status(&self) -> CheckStatus {
        self.checks
            .iter()
            .fold(CheckStatus::Pass, |acc, c| acc.worst(c.status))
    }
}

/// Run every check against an open store.
pub fn run_checks(conn: &Connection, store: &str) -> Result<VerifyReport, Error> {
    let checks = vec![
        referential_completeness(conn)?,
        tag_distribution(conn)?,
        hydrogen_aliases(conn)?,
        element_count(conn)?,
        symbol_hygiene(conn)?,
    ];
    Ok(VerifyReport {
        meta: ReportMeta {
            store: store.to_string(),
            run_at: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION"),
        },
        checks,
    })
}

fn reaction_tables() -> impl Iterator<Item = &'static TableSpec> {
    schema::TABLES.iter().filter(|t| !t.symbol_columns.is_empty())
}

/// Distinct participant symbols of one reaction table.
fn distinct_symbols(conn: &Connection, spec: &TableSpec) -> Result<BTreeSet<String>, Error> {
    let mut symbols = BTreeSet::new();
    for column in spec.symbol_columns {
        let sql = format!(
            "SELECT DISTINCT {column} FROM {} WHERE {column} IS NOT NULL",
            spec.name
        );
        let mut stmt = conn.prepare(&sql).map_err(sql_err)?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(sql_err)?;
        for symbol in rows {
            symbols.insert(symbol.map_err(sql_err)?);
        }
    }
    Ok(symbols)
}

fn column_set(conn: &Connection, sql: &str) -> Result<BTreeSet<String>, Error> {
    let mut stmt = conn.prepare(sql).map_err(sql_err)?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .map_err(sql_err)?;
    let mut set = BTreeSet::new();
    for value in rows {
        set.insert(value.map_err(sql_err)?);
    }
    Ok(set)
}

/// Every reaction participant must resolve to a symbol in the element
/// relation. Hydrogen isotope aliases are the one carve-out; a symbol that
/// exists only as a nuclide row is still a defect.
fn referential_completeness(conn: &Connection) -> Result<Check, Error> {
    let mut known = column_set(conn, "SELECT E FROM ElementsPlus WHERE E IS NOT NULL")?;
    for alias in HYDROGEN_ALIASES {
        known.insert((*alias).to_string());
    }

    let mut unknown = Vec::new();
    for spec in reaction_tables() {
        let missing: Vec<String> = distinct_symbols(conn, spec)?
            .into_iter()
            .filter(|s| !known.contains(s))
            .collect();
        if !missing.is_empty() {
            unknown.push(TableSymbols {
                table: spec.name.to_string(),
                symbols: missing,
            });
        }
    }

    Ok(Check {
        name: "referential_completeness",
        status: if unknown.is_empty() {
            CheckStatus::Pass
        } else {
            CheckStatus::Fail
        },
        detail: CheckDetail::ReferentialCompleteness { unknown },
    })
}

/// Emission-tag breakdown per reaction table. Counts are reported for
/// inspection, never asserted against thresholds. The one extra signal is
/// a warning for an empty reaction table, which would make the rest of
/// the battery vacuous.
fn tag_distribution(conn: &Connection) -> Result<Check, Error> {
    let mut tables = Vec::new();
    let mut status = CheckStatus::Pass;

    for spec in reaction_tables() {
        let sql = format!(
            "SELECT IFNULL(neutrino, '(null)') AS tag, COUNT(*) FROM {}
             GROUP BY tag ORDER BY tag",
            spec.name
        );
        let mut stmt = conn.prepare(&sql).map_err(sql_err)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(TagCount {
                    tag: row.get(0)?,
                    rows: row.get(1)?,
                })
            })
            .map_err(sql_err)?;
        let mut tags = Vec::new();
        for tag in rows {
            tags.push(tag.map_err(sql_err)?);
        }
        let total: i64 = tags.iter().map(|t| t.rows).sum();
        if total == 0 {
            status = status.worst(CheckStatus::Warn);
        }
        tables.push(TableTags {
            table: spec.name.to_string(),
            rows: total,
            tags,
        });
    }

    Ok(Check {
        name: "tag_distribution",
        status,
        detail: CheckDetail::TagDistribution { tables },
    })
}

/// The nuclide table should carry all three hydrogen isotope symbols.
/// Absence is a warning, not a failure: bootstrap sources carry no nuclide
/// table at all.
fn hydrogen_aliases(conn: &Connection) -> Result<Check, Error> {
    let mut aliases = Vec::new();
    let mut missing = false;
    for alias in HYDROGEN_ALIASES {
        let rows: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM NuclidesPlus WHERE E = ?1",
                [alias],
                |row| row.get(0),
            )
            .map_err(sql_err)?;
        if rows == 0 {
            missing = true;
        }
        aliases.push(AliasCount {
            alias: (*alias).to_string(),
            rows,
        });
    }

    Ok(Check {
        name: "hydrogen_aliases",
        status: if missing {
            CheckStatus::Warn
        } else {
            CheckStatus::Pass
        },
        detail: CheckDetail::HydrogenAliases { aliases },
    })
}

fn element_count(conn: &Connection) -> Result<Check, Error> {
    let found: i64 = conn
        .query_row("SELECT COUNT(*) FROM ElementsPlus", [], |row| row.get(0))
        .map_err(sql_err)?;
    Ok(Check {
        name: "element_count",
        status: if found == EXPECTED_ELEMENTS {
            CheckStatus::Pass
        } else {
            CheckStatus::Warn
        },
        detail: CheckDetail::ElementCount {
            found,
            expected: EXPECTED_ELEMENTS,
        },
    })
}

/// Symbols must be clean ASCII with no markup residue. The scraped pages
/// historically leaked footnote asterisks and Cyrillic homoglyphs of "H"
/// and "He" into participant columns.
fn symbol_hygiene(conn: &Connection) -> Result<Check, Error> {
    let mut offenders = BTreeSet::new();
    for spec in reaction_tables() {
        for symbol in distinct_symbols(conn, spec)? {
            if symbol.contains('*') || symbol.chars().any(|c| !c.is_ascii()) {
                offenders.insert(symbol);
            }
        }
    }
    let offenders: Vec<String> = offenders.into_iter().collect();
    Ok(Check {
        name: "symbol_hygiene",
        status: if offenders.is_empty() {
            CheckStatus::Pass
        } else {
            CheckStatus::Fail
        },
        detail: CheckDetail::SymbolHygiene { offenders },
    })
}
