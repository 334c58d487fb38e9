//! `parkdb` - pipeline driver for the reaction reference store.
//!
//! Each subcommand is one pipeline stage over the fixed repository layout
//! in [`paths`]: extract the curated workbook or parse the crawled pages
//! into CSV intermediates, then rebuild the SQLite store from those
//! intermediates and verify it.

mod paths;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use rusqlite::Connection;

use parkdb_core::{layout, slice_table, Error, SourceWarning};
use parkdb_io::{csv, html, xlsx};
use parkdb_store::verify::run_checks;
use parkdb_store::{rebuild, CheckStatus, LoadMode, TableCount, VerifyReport};

#[derive(Parser)]
#[command(name = "parkdb")]
#[command(about = "Nuclear reaction reference data pipeline")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract reaction tables from the curated workbook into CSV
    Extract,
    /// Parse crawled HTML result pages into CSV
    ParseHtml,
    /// Rebuild the store from the minimal spreadsheet extract
    Bootstrap,
    /// Rebuild the store from the full scraped CSV set
    Rebuild,
    /// Run the verification battery against an existing store
    Verify,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Extract => cmd_extract(),
        Commands::ParseHtml => cmd_parse_html(),
        Commands::Bootstrap => cmd_rebuild(LoadMode::Bootstrap),
        Commands::Rebuild => cmd_rebuild(LoadMode::Full),
        Commands::Verify => cmd_verify(),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

// ── extract ──

fn cmd_extract() -> Result<(), Error> {
    let workbook = Path::new(paths::WORKBOOK);
    let data_dir = Path::new(paths::DATA_DIR);
    std::fs::create_dir_all(data_dir).map_err(|e| Error::Io(format!("{}: {e}", data_dir.display())))?;

    println!("=== Extracting {} ===", workbook.display());
    for layout in [&layout::FUS_FIS, &layout::TWO_TO_TWO] {
        let region = xlsx::read_region(workbook, layout)?;
        for slice in layout.slices {
            let table = slice_table(&region.rows, slice);
            let out = data_dir.join(format!("{}.csv", slice.table.to_lowercase()));
            csv::write_table(&out, &table)?;
            println!("{}: {} rows -> {}", slice.table, table.rows.len(), out.display());
        }
    }
    Ok(())
}

// ── parse-html ──

/// Single-file result pages: (crawled page, CSV intermediate, table name).
const SINGLE_TABLES: &[(&str, &str, &str)] = &[
    ("fusion_table.html", "fusion.csv", "Fusion"),
    ("fusion_all_table.html", "fusion_all.csv", "FusionAll"),
    ("fission_table.html", "fission.csv", "Fission"),
    ("fission_all_table.html", "fission_all.csv", "FissionAll"),
    ("nuclides_table.html", "nuclides.csv", "Nuclides"),
    ("nuclides_plus_table.html", "nuclides_plus.csv", "NuclidesPlus"),
    ("element_properties_table.html", "element_properties.csv", "ElementProperties"),
    (
        "element_properties_plus_table.html",
        "element_properties_plus.csv",
        "ElementPropertiesPlus",
    ),
    ("atomic_radii_table.html", "atomic_radii.csv", "AtomicRadii"),
    ("radionuclides_table.html", "radionuclides.csv", "RadioNuclides"),
];

/// Result sets large enough to be paginated across several crawled files.
const MULTI_TABLES: &[(&str, &str, &str)] = &[
    ("two_to_two_table_*.html", "twotwo.csv", "TwoToTwo"),
    ("two_to_two_all_table_*.html", "twotwo_all.csv", "TwoToTwoAll"),
];

fn cmd_parse_html() -> Result<(), Error> {
    parse_html(Path::new(paths::CRAWL_DIR), Path::new(paths::DATA_DIR))
}

fn parse_html(crawl_dir: &Path, data_dir: &Path) -> Result<(), Error> {
    std::fs::create_dir_all(data_dir).map_err(|e| Error::Io(format!("{}: {e}", data_dir.display())))?;

    println!("=== Parsing crawled pages in {} ===", crawl_dir.display());

    // A missing single-file page is fatal: skipping it would let a stale
    // CSV intermediate from an earlier crawl feed the next rebuild.
    for (page, out, name) in SINGLE_TABLES {
        let table = html::read_table(&crawl_dir.join(page), name)?;
        let out = data_dir.join(out);
        csv::write_table(&out, &table)?;
        println!("{name}: {} rows -> {}", table.rows.len(), out.display());
    }

    for (pattern, out, name) in MULTI_TABLES {
        let pattern = crawl_dir.join(pattern);
        let (table, warnings) = html::read_table_group(&pattern.to_string_lossy(), name)?;
        print_warnings(&warnings);
        let Some(table) = table else {
            println!("{name}: no pages matching {}, skipped", pattern.display());
            continue;
        };
        let out = data_dir.join(out);
        csv::write_table(&out, &table)?;
        println!("{name}: {} rows -> {}", table.rows.len(), out.display());
    }

    Ok(())
}

fn print_warnings(warnings: &[SourceWarning]) {
    for warning in warnings {
        println!("warning: {warning}");
    }
}

// ── rebuild / verify ──

fn cmd_rebuild(mode: LoadMode) -> Result<(), Error> {
    let label = match mode {
        LoadMode::Bootstrap => "bootstrap",
        LoadMode::Full => "full",
    };
    println!("=== Rebuilding {} ({label}) ===", paths::DB_PATH);

    let (counts, report) =
        rebuild::run(Path::new(paths::DB_PATH), Path::new(paths::DATA_DIR), mode)?;
    print_counts(&counts);
    print_report(&report);
    write_report(&report)?;
    Ok(())
}

fn cmd_verify() -> Result<(), Error> {
    let db_path = Path::new(paths::DB_PATH);
    if !db_path.exists() {
        return Err(Error::SourceNotFound {
            path: db_path.display().to_string(),
        });
    }
    println!("=== Verifying {} ===", db_path.display());

    let conn = Connection::open(db_path).map_err(|e| Error::Sql(e.to_string()))?;
    let report = run_checks(&conn, &db_path.display().to_string())?;
    print_report(&report);
    write_report(&report)?;
    Ok(())
}

fn print_counts(counts: &[TableCount]) {
    for count in counts {
        println!("{}: {} rows", count.table, count.rows);
    }
}

fn print_report(report: &VerifyReport) {
    println!("=== Verification ===");
    for check in &report.checks {
        println!("[{}] {}", status_label(check.status), check.name);
    }
    println!("overall: {}", status_label(report.worst_status()));
}

fn status_label(status: CheckStatus) -> &'static str {
    match status {
        CheckStatus::Pass => "pass",
        CheckStatus::Warn => "warn",
        CheckStatus::Fail => "fail",
    }
}

fn write_report(report: &VerifyReport) -> Result<(), Error> {
    let path = PathBuf::from(paths::VERIFY_REPORT);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::Io(format!("{}: {e}", parent.display())))?;
    }
    let json = serde_json::to_string_pretty(report)
        .map_err(|e| Error::Io(format!("report serialization: {e}")))?;
    std::fs::write(&path, json).map_err(|e| Error::Io(format!("{}: {e}", path.display())))?;
    println!("report -> {}", path.display());
    Ok(())
}
