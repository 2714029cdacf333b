use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use swift_registry::config::DEFAULT_DB_PATH;
use swift_registry::operations;
use swift_registry::{count_codes, import_file, logging, open_database, SwiftCodeDetail};

/// SWIFT code registry maintenance commands
#[derive(Parser, Debug)]
#[command(name = "swift-registry")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// SQLite database file
    #[arg(long = "db", env = "SWIFT_DB_PATH", default_value = DEFAULT_DB_PATH, global = true)]
    db_path: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Import a SWIFT code spreadsheet, .xlsx or .csv (existing codes are skipped)
    Import {
        /// Spreadsheet with SWIFT CODE, NAME, ADDRESS, COUNTRY ISO2 CODE, COUNTRY NAME columns
        file: PathBuf,
    },

    /// Print the number of stored codes
    Count,

    /// Print one code (and its branches) as JSON
    Show {
        code: String,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    logging::init("info");

    let cli = Cli::parse();

    match &cli.command {
        Commands::Import { file } => run_import(&cli.db_path, file),
        Commands::Count => run_count(&cli.db_path),
        Commands::Show { code } => run_show(&cli.db_path, code),
    }
}

fn run_import(db_path: &Path, file: &Path) -> Result<()> {
    println!("🗄️  SWIFT code import: spreadsheet → SQLite");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let mut conn = open_database(db_path)
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;

    let summary = import_file(&mut conn, file)
        .with_context(|| format!("Failed to import {}", file.display()))?;

    let total = count_codes(&conn)?;

    println!("✓ Parsed rows:    {}", summary.parsed);
    println!("✓ Skipped rows:   {}", summary.skipped);
    println!("✓ Inserted codes: {}", summary.inserted);
    println!("✓ Database now contains {} codes", total);

    Ok(())
}

fn run_count(db_path: &Path) -> Result<()> {
    let conn = open_database(db_path)?;
    println!("{}", count_codes(&conn)?);
    Ok(())
}

fn run_show(db_path: &Path, code: &str) -> Result<()> {
    let conn = open_database(db_path)?;

    let Some(record) = operations::get_by_code(&conn, code)? else {
        bail!("SWIFT code not found: {}", code);
    };

    let branches = if record.is_headquarter {
        operations::get_branches_for_headquarter(&conn, code)?
    } else {
        Vec::new()
    };

    let detail = SwiftCodeDetail::new(record, branches);
    println!("{}", serde_json::to_string_pretty(&detail)?);

    Ok(())
}
