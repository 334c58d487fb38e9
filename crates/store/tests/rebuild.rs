//! End-to-end rebuild cycles against real files in a temp directory.

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::types::Value;
use rusqlite::Connection;
use tempfile::TempDir;

use parkdb_core::Error;
use parkdb_store::verify::{run_checks, CheckDetail};
use parkdb_store::{rebuild, CheckStatus, LoadMode, Phase, Rebuild};

fn write_full_sources(dir: &Path) {
    fs::write(
        dir.join("fusion_all.csv"),
        "id,neutrino,E1,A1,Z1,E2,A2,Z2,E,A,Z,MeV\n\
         1,none,H,1,1,H,2,1,He,3,2,5.494\n\
         2,left,D,2,1,D,2,1,He,4,2,23.85\n",
    )
    .unwrap();
    fs::write(
        dir.join("fission_all.csv"),
        "id,neutrino,E,A,Z,E1,A1,Z1,E2,A2,Z2,MeV\n\
         1,none,He,4,2,H,2,1,H,2,1,-23.85\n",
    )
    .unwrap();
    fs::write(
        dir.join("twotwo_all.csv"),
        "id,neutrino,E1,A1,Z1,E2,A2,Z2,E3,A3,Z3,E4,A4,Z4,MeV\n\
         1,none,H,2,1,He,4,2,H,1,1,He,5,2,0.5\n",
    )
    .unwrap();
    fs::write(
        dir.join("nuclides_plus.csv"),
        "id,A,Z,E,AMU\n\
         1,1,1,H,1.00782503\n\
         2,2,1,D,2.01410178\n\
         3,3,1,T,3.01604928\n\
         4,4,2,He,4.00260325\n",
    )
    .unwrap();
    fs::write(
        dir.join("element_properties_plus.csv"),
        "Z,E,EName\n\
         1,H,Hydrogen\n\
         2,He,Helium\n",
    )
    .unwrap();
    fs::write(
        dir.join("atomic_radii.csv"),
        "Z,E,EName,AtRadEmpirical\n\
         1,H,Hydrogen,25\n",
    )
    .unwrap();
    fs::write(
        dir.join("radionuclides.csv"),
        "id,A,E,Z,RDM,HL,Units\n\
         1,3,T,1,B-,12.32,y\n",
    )
    .unwrap();
}

fn write_bootstrap_sources(dir: &Path) {
    fs::write(
        dir.join("fusion.csv"),
        "E1,A1,Z1,E2,A2,Z2,E,A,Z,MeV\n\
         H,1,1,H,2,1,He,3,2,5.494\n",
    )
    .unwrap();
    fs::write(
        dir.join("fission.csv"),
        "E,A,Z,E1,A1,Z1,E2,A2,Z2,MeV\n\
         He,4,2,H,2,1,H,2,1,-23.85\n",
    )
    .unwrap();
    fs::write(
        dir.join("twotwo.csv"),
        "E1,A1,Z1,E2,A2,Z2,E3,A3,Z3,E4,A4,Z4,MeV\n\
         H,2,1,He,4,2,H,1,1,He,5,2,0.5\n",
    )
    .unwrap();
}

fn paths(tmp: &TempDir) -> (PathBuf, PathBuf) {
    let data = tmp.path().join("data");
    fs::create_dir_all(&data).unwrap();
    (tmp.path().join("public").join("store.db"), data)
}

#[test]
fn full_rebuild_loads_every_table_and_verifies() {
    let tmp = TempDir::new().unwrap();
    let (db, data) = paths(&tmp);
    write_full_sources(&data);

    let (counts, report) = rebuild::run(&db, &data, LoadMode::Full).unwrap();

    let count = |name: &str| counts.iter().find(|c| c.table == name).unwrap().rows;
    assert_eq!(count("FusionAll"), 2);
    assert_eq!(count("FissionAll"), 1);
    assert_eq!(count("TwoToTwoAll"), 1);
    assert_eq!(count("NuclidesPlus"), 4);
    assert_eq!(count("ElementPropertiesPlus"), 2);
    assert_eq!(count("AtomicRadii"), 1);
    assert_eq!(count("RadioNuclides"), 1);

    let status = |name: &str| {
        report
            .checks
            .iter()
            .find(|c| c.name == name)
            .unwrap()
            .status
    };
    assert_eq!(status("referential_completeness"), CheckStatus::Pass);
    assert_eq!(status("tag_distribution"), CheckStatus::Pass);
    assert_eq!(status("hydrogen_aliases"), CheckStatus::Pass);
    assert_eq!(status("symbol_hygiene"), CheckStatus::Pass);
    // Only two of the expected ninety-four elements are present.
    assert_eq!(status("element_count"), CheckStatus::Warn);

    // Source-carried tags survive, and the view is queryable.
    let conn = Connection::open(&db).unwrap();
    let tag: String = conn
        .query_row("SELECT neutrino FROM FusionAll WHERE id = 2", [], |r| {
            r.get(0)
        })
        .unwrap();
    assert_eq!(tag, "left");
    let he: String = conn
        .query_row("SELECT EName FROM ElementsPlus WHERE Z = 2", [], |r| {
            r.get(0)
        })
        .unwrap();
    assert_eq!(he, "Helium");
}

#[test]
fn bootstrap_rebuild_fills_defaults_and_synthesizes_elements() {
    let tmp = TempDir::new().unwrap();
    let (db, data) = paths(&tmp);
    write_bootstrap_sources(&data);

    let (counts, report) = rebuild::run(&db, &data, LoadMode::Bootstrap).unwrap();

    let count = |name: &str| counts.iter().find(|c| c.table == name).unwrap().rows;
    assert_eq!(count("FusionAll"), 1);
    assert_eq!(count("FissionAll"), 1);
    assert_eq!(count("TwoToTwoAll"), 1);
    // H (Z=1) and He (Z=2) derived from the reaction participants.
    assert_eq!(count("ElementPropertiesPlus"), 2);

    let conn = Connection::open(&db).unwrap();
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

    let symbols: Vec<(i64, String)> = conn
        .prepare("SELECT Z, E FROM ElementsPlus ORDER BY Z")
        .unwrap()
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(symbols, vec![(1, "H".to_string()), (2, "He".to_string())]);

    let mev: f64 = conn
        .query_row(
            "SELECT MeV FROM FusionAll WHERE E1 = 'H' AND A1 = 1 AND A2 = 2",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert!((mev - 5.494).abs() < 1e-9);

    // No nuclide table in bootstrap sources, so the alias check warns.
    let aliases = report
        .checks
        .iter()
        .find(|c| c.name == "hydrogen_aliases")
        .unwrap();
    assert_eq!(aliases.status, CheckStatus::Warn);
}

#[test]
fn shared_proton_number_synthesizes_one_deterministic_symbol() {
    let tmp = TempDir::new().unwrap();
    let (db, data) = paths(&tmp);
    write_bootstrap_sources(&data);
    // All three hydrogen isotope symbols compete for the Z=1 row.
    fs::write(
        data.join("fusion.csv"),
        "E1,A1,Z1,E2,A2,Z2,E,A,Z,MeV\n\
         T,3,1,D,2,1,H,1,1,4.03\n",
    )
    .unwrap();

    rebuild::run(&db, &data, LoadMode::Bootstrap).unwrap();

    let conn = Connection::open(&db).unwrap();
    let z1: String = conn
        .query_row("SELECT E FROM ElementsPlus WHERE Z = 1", [], |r| r.get(0))
        .unwrap();
    assert_eq!(z1, "D");
}

fn dump(conn: &Connection, table: &str) -> Vec<Vec<Value>> {
    let mut stmt = conn
        .prepare(&format!("SELECT * FROM {table} ORDER BY rowid"))
        .unwrap();
    let width = stmt.column_count();
    stmt.query_map([], |row| {
        (0..width).map(|i| row.get::<_, Value>(i)).collect()
    })
    .unwrap()
    .collect::<Result<_, _>>()
    .unwrap()
}

#[test]
fn rerunning_a_full_rebuild_reproduces_the_store_byte_for_byte() {
    let tmp = TempDir::new().unwrap();
    let (db, data) = paths(&tmp);
    write_full_sources(&data);

    let tables = [
        "FusionAll",
        "FissionAll",
        "TwoToTwoAll",
        "NuclidesPlus",
        "ElementPropertiesPlus",
        "AtomicRadii",
        "RadioNuclides",
    ];

    rebuild::run(&db, &data, LoadMode::Full).unwrap();
    let first: Vec<Vec<Vec<Value>>> = {
        let conn = Connection::open(&db).unwrap();
        tables.iter().map(|t| dump(&conn, t)).collect()
    };

    rebuild::run(&db, &data, LoadMode::Full).unwrap();
    let second: Vec<Vec<Vec<Value>>> = {
        let conn = Connection::open(&db).unwrap();
        tables.iter().map(|t| dump(&conn, t)).collect()
    };

    assert_eq!(first, second);
}

#[test]
fn malformed_numeric_aborts_the_rebuild() {
    let tmp = TempDir::new().unwrap();
    let (db, data) = paths(&tmp);
    write_full_sources(&data);
    fs::write(
        data.join("fusion_all.csv"),
        "id,neutrino,E1,A1,Z1,MeV\n\
         1,none,H,four,1,5.494\n",
    )
    .unwrap();

    let err = rebuild::run(&db, &data, LoadMode::Full).unwrap_err();
    match err {
        Error::MalformedNumericField { table, column, value, .. } => {
            assert_eq!(table, "FusionAll");
            assert_eq!(column, "A1");
            assert_eq!(value, "four");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn phases_cannot_run_out_of_order() {
    let tmp = TempDir::new().unwrap();
    let (db, _data) = paths(&tmp);

    let mut rebuild = Rebuild::new(&db);
    assert_eq!(rebuild.phase(), Phase::NotStarted);

    let err = rebuild.create_schema().unwrap_err();
    match err {
        Error::PhaseOrder { expected, actual } => {
            assert_eq!(expected, "SchemaDropped");
            assert_eq!(actual, "NotStarted");
        }
        other => panic!("unexpected error: {other}"),
    }

    rebuild.drop_store().unwrap();
    let err = rebuild.build_indexes().unwrap_err();
    assert!(matches!(err, Error::PhaseOrder { .. }));
}

#[test]
fn verifier_catches_defects_injected_after_a_clean_rebuild() {
    let tmp = TempDir::new().unwrap();
    let (db, data) = paths(&tmp);
    write_full_sources(&data);

    let (_, report) = rebuild::run(&db, &data, LoadMode::Full).unwrap();
    assert_ne!(report.worst_status(), CheckStatus::Fail);

    // A Cyrillic homoglyph with a footnote star, as leaked by the scraper.
    let conn = Connection::open(&db).unwrap();
    conn.execute(
        "INSERT INTO FusionAll (E1, A1, Z1, E2, A2, Z2, E, A, Z, MeV)
         VALUES ('Н*', 1, 1, 'H', 2, 1, 'He', 3, 2, 5.494)",
        [],
    )
    .unwrap();

    let report = run_checks(&conn, "injected").unwrap();
    assert_eq!(report.worst_status(), CheckStatus::Fail);

    let hygiene = report
        .checks
        .iter()
        .find(|c| c.name == "symbol_hygiene")
        .unwrap();
    assert_eq!(hygiene.status, CheckStatus::Fail);
    match &hygiene.detail {
        CheckDetail::SymbolHygiene { offenders } => {
            assert_eq!(offenders, &vec!["Н*".to_string()]);
        }
        other => panic!("unexpected detail: {other:?}"),
    }

    let referential = report
        .checks
        .iter()
        .find(|c| c.name == "referential_completeness")
        .unwrap();
    assert_eq!(referential.status, CheckStatus::Fail);
}
