//! Canonical schema registry.
//!
//! Every logical table is declared here once: columns, types, defaults for
//! columns absent from legacy sources, primary-key form, index columns, and
//! which CSV intermediate feeds it in each loading mode. The DDL is
//! rendered from these declarations so the loader and verifier share one
//! source of truth.

use crate::rebuild::LoadMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
}

impl ColumnType {
    pub fn sql(&self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Real => "REAL",
            Self::Text => "TEXT",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub ty: ColumnType,
    pub not_null: bool,
    /// SQL literal filled in when the source CSV does not carry the column.
    pub default: Option<&'static str>,
}

/// Primary-key form. Reaction tables get a synthetic surrogate key with no
/// semantic meaning; property tables keep their natural key where one
/// exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// `id INTEGER PRIMARY KEY AUTOINCREMENT`
    Surrogate,
    /// `id INTEGER PRIMARY KEY` (scraped row id, stable across rebuilds)
    RowId,
    /// A declared column is the primary key (e.g. proton number Z).
    Natural(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub struct TableSpec {
    pub name: &'static str,
    pub key: KeyKind,
    pub columns: &'static [ColumnSpec],
    /// Columns to index after loading.
    pub indexed: &'static [&'static str],
    /// Participant symbol columns, used by the verifier. Empty for
    /// non-reaction tables.
    pub symbol_columns: &'static [&'static str],
    /// CSV intermediate for a full rebuild (scraped sources).
    pub full_csv: &'static str,
    /// CSV intermediate for a bootstrap rebuild (spreadsheet extract);
    /// `None` means the table is not loaded in bootstrap mode.
    pub bootstrap_csv: Option<&'static str>,
}

impl TableSpec {
    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_id_key(&self) -> bool {
        matches!(self.key, KeyKind::Surrogate | KeyKind::RowId)
    }

    pub fn source_csv(&self, mode: LoadMode) -> Option<&'static str> {
        match mode {
            LoadMode::Full => Some(self.full_csv),
            LoadMode::Bootstrap => self.bootstrap_csv,
        }
    }

    pub fn create_sql(&self) -> String {
        let mut defs: Vec<String> = Vec::new();
        match self.key {
            KeyKind::Surrogate => defs.push("id INTEGER PRIMARY KEY AUTOINCREMENT".to_string()),
            KeyKind::RowId => defs.push("id INTEGER PRIMARY KEY".to_string()),
            KeyKind::Natural(_) => {}
        }
        for col in self.columns {
            let mut def = format!("{} {}", col.name, col.ty.sql());
            if matches!(self.key, KeyKind::Natural(key) if key == col.name) {
                def.push_str(" PRIMARY KEY");
            }
            if col.not_null {
                def.push_str(" NOT NULL");
            }
            if let Some(default) = col.default {
                def.push_str(" DEFAULT ");
                def.push_str(default);
            }
            defs.push(def);
        }
        format!("CREATE TABLE {} (\n    {}\n)", self.name, defs.join(",\n    "))
    }

    pub fn index_sql(&self) -> Vec<String> {
        self.indexed
            .iter()
            .map(|col| {
                format!(
                    "CREATE INDEX idx_{}_{} ON {}({})",
                    self.name.to_lowercase(),
                    col.to_lowercase(),
                    self.name,
                    col
                )
            })
            .collect()
    }
}

const fn col(name: &'static str, ty: ColumnType) -> ColumnSpec {
    ColumnSpec {
        name,
        ty,
        not_null: false,
        default: None,
    }
}

/// Per-participant classification flag, `'b'` ("both/unknown") when the
/// source does not carry it.
const fn flag(name: &'static str) -> ColumnSpec {
    ColumnSpec {
        name,
        ty: ColumnType::Text,
        not_null: true,
        default: Some("'b'"),
    }
}

/// Emission-type tag, `'none'` when the source does not carry it.
const NEUTRINO: ColumnSpec = ColumnSpec {
    name: "neutrino",
    ty: ColumnType::Text,
    not_null: true,
    default: Some("'none'"),
};

/// Binding-energy input, `0` when the source does not carry it.
const BEIN: ColumnSpec = ColumnSpec {
    name: "BEin",
    ty: ColumnType::Real,
    not_null: false,
    default: Some("0"),
};

pub static TABLES: &[TableSpec] = &[
    TableSpec {
        name: "FusionAll",
        key: KeyKind::Surrogate,
        columns: &[
            NEUTRINO,
            col("id_sub", ColumnType::Integer),
            col("E1", ColumnType::Text),
            col("A1", ColumnType::Integer),
            flag("nBorF1"),
            col("Z1", ColumnType::Integer),
            flag("aBorF1"),
            col("E2", ColumnType::Text),
            col("A2", ColumnType::Integer),
            flag("nBorF2"),
            col("Z2", ColumnType::Integer),
            flag("aBorF2"),
            col("E", ColumnType::Text),
            col("A", ColumnType::Integer),
            flag("nBorF"),
            col("Z", ColumnType::Integer),
            flag("aBorF"),
            col("MeV", ColumnType::Real),
            BEIN,
        ],
        indexed: &["E1", "E2", "E", "neutrino"],
        symbol_columns: &["E1", "E2", "E"],
        full_csv: "fusion_all.csv",
        bootstrap_csv: Some("fusion.csv"),
    },
    TableSpec {
        name: "FissionAll",
        key: KeyKind::Surrogate,
        columns: &[
            NEUTRINO,
            col("E", ColumnType::Text),
            col("A", ColumnType::Integer),
            flag("nBorF"),
            col("Z", ColumnType::Integer),
            flag("aBorF"),
            col("E1", ColumnType::Text),
            col("A1", ColumnType::Integer),
            flag("nBorF1"),
            col("Z1", ColumnType::Integer),
            flag("aBorF1"),
            col("E2", ColumnType::Text),
            col("A2", ColumnType::Integer),
            flag("nBorF2"),
            col("Z2", ColumnType::Integer),
            flag("aBorF2"),
            col("MeV", ColumnType::Real),
            BEIN,
        ],
        indexed: &["E", "E1", "E2", "neutrino"],
        symbol_columns: &["E", "E1", "E2"],
        full_csv: "fission_all.csv",
        bootstrap_csv: Some("fission.csv"),
    },
    TableSpec {
        name: "TwoToTwoAll",
        key: KeyKind::Surrogate,
        columns: &[
            NEUTRINO,
            col("id_sub", ColumnType::Integer),
            col("E1", ColumnType::Text),
            col("A1", ColumnType::Integer),
            flag("nBorF1"),
            col("Z1", ColumnType::Integer),
            flag("aBorF1"),
            col("E2", ColumnType::Text),
            col("A2", ColumnType::Integer),
            flag("nBorF2"),
            col("Z2", ColumnType::Integer),
            flag("aBorF2"),
            col("E3", ColumnType::Text),
            col("A3", ColumnType::Integer),
            flag("nBorF3"),
            col("Z3", ColumnType::Integer),
            flag("aBorF3"),
            col("E4", ColumnType::Text),
            col("A4", ColumnType::Integer),
            flag("nBorF4"),
            col("Z4", ColumnType::Integer),
            flag("aBorF4"),
            col("MeV", ColumnType::Real),
            BEIN,
        ],
        indexed: &["E1", "E2", "E3", "E4", "neutrino"],
        symbol_columns: &["E1", "E2", "E3", "E4"],
        full_csv: "twotwo_all.csv",
        bootstrap_csv: Some("twotwo.csv"),
    },
    TableSpec {
        name: "NuclidesPlus",
        key: KeyKind::RowId,
        columns: &[
            col("A", ColumnType::Integer),
            col("Z", ColumnType::Integer),
            col("nBorF", ColumnType::Text),
            col("aBorF", ColumnType::Text),
            col("E", ColumnType::Text),
            col("AMU", ColumnType::Real),
            col("BE", ColumnType::Real),
            col("BEN", ColumnType::Real),
            col("SUS", ColumnType::Text),
            col("LHL", ColumnType::Text),
            col("RDM", ColumnType::Text),
            col("DEMeV", ColumnType::Real),
            col("pcaNCrust", ColumnType::Real),
            col("ppmNCrust", ColumnType::Real),
            col("ppmNSolar", ColumnType::Real),
            col("SP", ColumnType::Text),
            col("MD", ColumnType::Text),
            col("EQ", ColumnType::Text),
            col("RCPT", ColumnType::Text),
            col("Inova_MHz", ColumnType::Real),
            col("MagGR", ColumnType::Real),
        ],
        indexed: &["E"],
        symbol_columns: &[],
        full_csv: "nuclides_plus.csv",
        bootstrap_csv: None,
    },
    TableSpec {
        name: "ElementPropertiesPlus",
        key: KeyKind::Natural("Z"),
        columns: &[
            col("Z", ColumnType::Integer),
            col("E", ColumnType::Text),
            col("EName", ColumnType::Text),
            col("P", ColumnType::Integer),
            col("G", ColumnType::Integer),
            col("AWeight", ColumnType::Real),
            col("ARadius", ColumnType::Real),
            col("MolarVol", ColumnType::Real),
            col("Melting", ColumnType::Real),
            col("Boiling", ColumnType::Real),
            col("Negativity", ColumnType::Real),
            col("Affinity", ColumnType::Real),
            col("Val", ColumnType::Text),
            col("MxInum", ColumnType::Integer),
            col("MxInize", ColumnType::Real),
            col("STPDensity", ColumnType::Real),
            col("ElectG", ColumnType::Real),
            col("ThermG", ColumnType::Real),
            col("SpecHeat", ColumnType::Real),
            col("ppmECrust", ColumnType::Real),
            col("ppmEStellar", ColumnType::Real),
            col("MagType", ColumnType::Text),
            col("CuriePtK", ColumnType::Real),
            col("MagVolSus", ColumnType::Real),
        ],
        indexed: &["E"],
        symbol_columns: &[],
        full_csv: "element_properties_plus.csv",
        bootstrap_csv: None,
    },
    TableSpec {
        name: "AtomicRadii",
        key: KeyKind::Natural("Z"),
        columns: &[
            col("Z", ColumnType::Integer),
            col("E", ColumnType::Text),
            col("EName", ColumnType::Text),
            col("AtRadEmpirical", ColumnType::Real),
            col("AtRadCalculated", ColumnType::Real),
            col("AtRadVanDerWaals", ColumnType::Real),
            col("AtRadCovalent", ColumnType::Real),
        ],
        indexed: &[],
        symbol_columns: &[],
        full_csv: "atomic_radii.csv",
        bootstrap_csv: None,
    },
    TableSpec {
        name: "RadioNuclides",
        key: KeyKind::RowId,
        columns: &[
            col("A", ColumnType::Integer),
            col("E", ColumnType::Text),
            col("Z", ColumnType::Integer),
            col("RDM", ColumnType::Text),
            col("HL", ColumnType::Real),
            col("Units", ColumnType::Text),
            col("LHL", ColumnType::Real),
            col("RT", ColumnType::Text),
            col("DEKeV", ColumnType::Real),
            col("RI", ColumnType::Real),
        ],
        indexed: &[],
        symbol_columns: &[],
        full_csv: "radionuclides.csv",
        bootstrap_csv: None,
    },
];

/// Identity-only projection of the element table. Consumers that need just
/// (key, symbol, name) read this view; both loading modes populate it the
/// same way.
pub const ELEMENTS_VIEW_SQL: &str =
    "CREATE VIEW ElementsPlus AS SELECT Z, E, EName FROM ElementPropertiesPlus";

pub fn table(name: &str) -> Option<&'static TableSpec> {
    TABLES.iter().find(|t| t.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn ddl_is_valid_sqlite() {
        let conn = Connection::open_in_memory().unwrap();
        for spec in TABLES {
            conn.execute(&spec.create_sql(), []).unwrap();
            for sql in spec.index_sql() {
                conn.execute(&sql, []).unwrap();
            }
        }
        conn.execute(ELEMENTS_VIEW_SQL, []).unwrap();
    }

    #[test]
    fn reaction_defaults_fill_absent_columns() {
        let conn = Connection::open_in_memory().unwrap();
        let spec = table("FusionAll").unwrap();
        conn.execute(&spec.create_sql(), []).unwrap();
        conn.execute(
            "INSERT INTO FusionAll (E1, A1, Z1, E2, A2, Z2, E, A, Z, MeV)
             VALUES ('H', 1, 1, 'H', 2, 1, 'H', 3, 1, 5.494)",
            [],
        )
        .unwrap();

        let (neutrino, flag, bein): (String, String, f64) = conn
            .query_row(
                "SELECT neutrino, nBorF1, BEin FROM FusionAll",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .unwrap();
        assert_eq!(neutrino, "none");
        assert_eq!(flag, "b");
        assert_eq!(bein, 0.0);
    }

    #[test]
    fn natural_key_rejects_duplicate_proton_number() {
        let conn = Connection::open_in_memory().unwrap();
        let spec = table("ElementPropertiesPlus").unwrap();
        conn.execute(&spec.create_sql(), []).unwrap();
        conn.execute(
            "INSERT INTO ElementPropertiesPlus (Z, E, EName) VALUES (1, 'H', 'Hydrogen')",
            [],
        )
        .unwrap();
        let dup = conn.execute(
            "INSERT INTO ElementPropertiesPlus (Z, E, EName) VALUES (1, 'H', 'Hydrogen')",
            [],
        );
        assert!(dup.is_err());
    }

    #[test]
    fn symbol_columns_are_declared() {
        for spec in TABLES {
            for sym in spec.symbol_columns {
                assert!(spec.column(sym).is_some(), "{}: {sym}", spec.name);
            }
        }
    }
}
