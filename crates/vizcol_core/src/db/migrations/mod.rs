//! Versioned schema scripts for the collection store.
//!
//! # Responsibility
//! - Hold the ordered list of schema scripts compiled into the binary.
//! - Bring a store up to the newest known schema in one transaction.
//!
//! # Invariants
//! - Script versions start at 1 and increase by exactly one.
//! - `PRAGMA user_version` equals the newest script applied to the store.
//! - A store stamped with a version this binary does not know is refused,
//!   never downgraded.
//! - Scripts only create missing objects, so re-running one keeps rows.

use crate::db::{DbError, DbResult};
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct SchemaScript {
    version: u32,
    sql: &'static str,
}

const SCHEMA_SCRIPTS: &[SchemaScript] = &[SchemaScript {
    version: 1,
    sql: include_str!("0001_init.sql"),
}];

/// Newest schema version this binary can create and read.
pub fn latest_version() -> u32 {
    SCHEMA_SCRIPTS.last().map_or(0, |script| script.version)
}

/// Schema version currently stamped on the store.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

/// Runs every script newer than the store's version.
///
/// Returns how many scripts ran; `0` means the store was already current.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<usize> {
    let stamped = schema_version(conn)?;
    let latest = latest_version();
    if stamped > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: stamped,
            latest_supported: latest,
        });
    }

    let pending = pending_scripts(stamped);
    if pending.is_empty() {
        return Ok(0);
    }

    let tx = conn.transaction()?;
    for script in pending {
        tx.execute_batch(script.sql)?;
        tx.pragma_update(None, "user_version", script.version)?;
    }
    tx.commit()?;

    Ok(pending.len())
}

fn pending_scripts(stamped: u32) -> &'static [SchemaScript] {
    let first_pending = SCHEMA_SCRIPTS
        .iter()
        .position(|script| script.version > stamped)
        .unwrap_or(SCHEMA_SCRIPTS.len());
    &SCHEMA_SCRIPTS[first_pending..]
}
