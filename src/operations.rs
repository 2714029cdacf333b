// 🔎 Lookup / Mutation Operations
// Thin contracts over the record store: duplicates are skipped, never overwritten

use rusqlite::Connection;
use std::collections::HashSet;

use crate::codes;
use crate::db::{self, NewSwiftCode, StoreError, StoreResult, SwiftCode};

/// Result of a single create
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    Created(SwiftCode),
    AlreadyExists,
}

/// Result of a delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

pub fn get_by_code(conn: &Connection, code: &str) -> StoreResult<Option<SwiftCode>> {
    db::find_by_code(conn, code)
}

pub fn get_by_country(conn: &Connection, iso2: &str) -> StoreResult<Vec<SwiftCode>> {
    db::find_by_country(conn, &iso2.to_uppercase())
}

/// Branches share the first 8 characters of `code`; shorter input matches on
/// whatever prefix it has.
pub fn get_branches_for_headquarter(conn: &Connection, code: &str) -> StoreResult<Vec<SwiftCode>> {
    let branches = db::find_branches(conn, codes::root_of(code))?
        .into_iter()
        .filter(|r| codes::is_branch_of(&r.swift_code, r.is_headquarter, code))
        .collect();

    Ok(branches)
}

/// Insert directly and let the UNIQUE constraint decide.
///
/// Two concurrent creates for the same code cannot both succeed: the loser
/// gets `AlreadyExists`, same as a sequential duplicate.
pub fn create(conn: &Connection, data: &NewSwiftCode) -> StoreResult<CreateOutcome> {
    match db::insert(conn, data) {
        Ok(record) => {
            tracing::debug!(code = %record.swift_code, id = record.id, "created SWIFT code");
            Ok(CreateOutcome::Created(record))
        }
        Err(StoreError::Duplicate(code)) => {
            tracing::debug!(%code, "create skipped, code already exists");
            Ok(CreateOutcome::AlreadyExists)
        }
        Err(e) => Err(e),
    }
}

pub fn delete(conn: &Connection, code: &str) -> StoreResult<DeleteOutcome> {
    if db::delete(conn, code)? {
        Ok(DeleteOutcome::Deleted)
    } else {
        Ok(DeleteOutcome::NotFound)
    }
}

/// Insert a batch in one transaction, committed once at the end.
///
/// Entries whose code is already stored, or already inserted earlier in this
/// same batch, are skipped. Returns how many entries were actually added.
pub fn bulk_insert(conn: &mut Connection, entries: &[NewSwiftCode]) -> StoreResult<usize> {
    let tx = conn.transaction()?;

    let mut seen: HashSet<&str> = HashSet::new();
    let mut inserted = 0;
    let mut skipped = 0;

    for entry in entries {
        if !seen.insert(entry.swift_code.as_str()) {
            skipped += 1;
            continue;
        }

        match db::insert(&tx, entry) {
            Ok(_) => inserted += 1,
            Err(StoreError::Duplicate(_)) => skipped += 1,
            Err(e) => return Err(e),
        }
    }

    tx.commit()?;

    tracing::info!(inserted, skipped, "bulk insert complete");

    Ok(inserted)
}
