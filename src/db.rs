use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::codes;

/// How long a connection waits on a locked database before giving up
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Stored SWIFT code record
///
/// `id` is the store-assigned surrogate key and never leaves the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwiftCode {
    #[serde(skip)]
    pub id: i64,

    #[serde(rename = "swiftCode")]
    pub swift_code: String,

    #[serde(rename = "bankName")]
    pub bank_name: String,

    pub address: String,

    #[serde(rename = "countryISO2")]
    pub country_iso2: String,

    #[serde(rename = "countryName")]
    pub country_name: String,

    #[serde(rename = "isHeadquarter")]
    pub is_headquarter: bool,
}

/// A record as submitted for insertion (API create or import row)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSwiftCode {
    #[serde(rename = "swiftCode")]
    pub swift_code: String,

    #[serde(rename = "bankName")]
    pub bank_name: String,

    pub address: String,

    #[serde(rename = "countryISO2")]
    pub country_iso2: String,

    #[serde(rename = "countryName")]
    pub country_name: String,

    #[serde(rename = "isHeadquarter")]
    pub is_headquarter: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("SWIFT code already exists: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

pub fn setup_database(conn: &Connection) -> StoreResult<()> {
    // WAL lets readers proceed while a request is writing
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS swift_codes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            swift_code TEXT UNIQUE NOT NULL,
            bank_name TEXT NOT NULL,
            address TEXT NOT NULL,
            country_iso2 TEXT NOT NULL,
            country_name TEXT NOT NULL,
            is_headquarter INTEGER NOT NULL DEFAULT 0
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_country_iso2 ON swift_codes(country_iso2)",
        [],
    )?;

    Ok(())
}

/// Open a connection without touching the schema (per-request use)
pub fn connect(db_path: &Path) -> StoreResult<Connection> {
    let conn = Connection::open(db_path)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    Ok(conn)
}

/// Open a connection and make sure the schema exists (startup use)
pub fn open_database(db_path: &Path) -> StoreResult<Connection> {
    let conn = connect(db_path)?;
    setup_database(&conn)?;
    Ok(conn)
}

const SELECT_COLUMNS: &str =
    "SELECT id, swift_code, bank_name, address, country_iso2, country_name, is_headquarter
     FROM swift_codes";

fn row_to_swift_code(row: &Row) -> rusqlite::Result<SwiftCode> {
    Ok(SwiftCode {
        id: row.get(0)?,
        swift_code: row.get(1)?,
        bank_name: row.get(2)?,
        address: row.get(3)?,
        country_iso2: row.get(4)?,
        country_name: row.get(5)?,
        is_headquarter: row.get(6)?,
    })
}

/// Exact match on code
pub fn find_by_code(conn: &Connection, code: &str) -> StoreResult<Option<SwiftCode>> {
    let record = conn
        .query_row(
            &format!("{SELECT_COLUMNS} WHERE swift_code = ?1"),
            [code],
            row_to_swift_code,
        )
        .optional()?;

    Ok(record)
}

/// All records for a country; the input is upper-cased before matching
pub fn find_by_country(conn: &Connection, iso2: &str) -> StoreResult<Vec<SwiftCode>> {
    let mut stmt = conn.prepare(&format!(
        "{SELECT_COLUMNS} WHERE country_iso2 = ?1 ORDER BY swift_code"
    ))?;

    let records = stmt
        .query_map([iso2.to_uppercase()], row_to_swift_code)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(records)
}

/// Non-headquarter records sharing the root (first 8 chars) of `root_code`
///
/// The prefix comparison is literal and case-sensitive.
pub fn find_branches(conn: &Connection, root_code: &str) -> StoreResult<Vec<SwiftCode>> {
    let root = codes::root_of(root_code);

    let mut stmt = conn.prepare(&format!(
        "{SELECT_COLUMNS}
         WHERE substr(swift_code, 1, length(?1)) = ?1
           AND is_headquarter = 0
         ORDER BY swift_code"
    ))?;

    let records = stmt
        .query_map([root], row_to_swift_code)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(records)
}

/// Insert a record; a UNIQUE violation on the code becomes `StoreError::Duplicate`
pub fn insert(conn: &Connection, record: &NewSwiftCode) -> StoreResult<SwiftCode> {
    let result = conn.execute(
        "INSERT INTO swift_codes (
            swift_code, bank_name, address, country_iso2, country_name, is_headquarter
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            record.swift_code,
            record.bank_name,
            record.address,
            record.country_iso2,
            record.country_name,
            record.is_headquarter,
        ],
    );

    match result {
        Ok(_) => Ok(SwiftCode {
            id: conn.last_insert_rowid(),
            swift_code: record.swift_code.clone(),
            bank_name: record.bank_name.clone(),
            address: record.address.clone(),
            country_iso2: record.country_iso2.clone(),
            country_name: record.country_name.clone(),
            is_headquarter: record.is_headquarter,
        }),
        Err(e) => Err(classify_insert_error(e, &record.swift_code)),
    }
}

/// Only a UNIQUE violation means the code is taken; other constraint
/// failures (NOT NULL, CHECK) stay database errors
fn classify_insert_error(err: rusqlite::Error, code: &str) -> StoreError {
    match err {
        rusqlite::Error::SqliteFailure(ref failure, _)
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            StoreError::Duplicate(code.to_string())
        }
        other => StoreError::Sqlite(other),
    }
}

/// Delete by exact code; returns false when nothing matched
pub fn delete(conn: &Connection, code: &str) -> StoreResult<bool> {
    let affected = conn.execute("DELETE FROM swift_codes WHERE swift_code = ?1", [code])?;
    Ok(affected > 0)
}

pub fn count_codes(conn: &Connection) -> StoreResult<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM swift_codes", [], |row| row.get(0))?;

    Ok(count)
}
