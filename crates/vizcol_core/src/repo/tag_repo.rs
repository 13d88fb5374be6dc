//! Tag persistence helpers.
//!
//! # Responsibility
//! - Resolve human-entered tag names to stable tag ids (create-if-absent).
//! - Provide single-row tag lookups and inserts shared by repositories.
//!
//! # Invariants
//! - Lookups match on `tags.name_key`, the Rust-computed `canonical_key`.
//! - A new tag keeps the trimmed spelling it was first entered with.
//! - `resolve_tags` only runs inside a caller-owned transaction, so newly
//!   created tags disappear when that transaction rolls back.

use crate::model::collection::CollectionId;
use crate::model::tag::{canonical_key, normalize_tag_name, validate_tag_name, TagId};
use crate::repo::collection_repo::RepoResult;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::collections::{BTreeSet, HashSet};

/// Maps tag names to tag ids, creating missing tags.
///
/// Blank names are skipped and names that fold to the same key collapse to one
/// id (the first spelling wins when the tag is new). Returned ids are unique
/// and ascending.
///
/// # Errors
/// - `RepoError::Validation` when a name contains the tag delimiter.
/// - `RepoError::Db` on SQL failure; the caller must roll back.
pub fn resolve_tags(tx: &Transaction<'_>, names: &[String]) -> RepoResult<Vec<TagId>> {
    let mut seen_keys = HashSet::new();
    let mut tag_ids = BTreeSet::new();

    for raw in names {
        let Some(name) = normalize_tag_name(raw) else {
            continue;
        };
        validate_tag_name(name)?;

        let key = canonical_key(name);
        if !seen_keys.insert(key.clone()) {
            continue;
        }

        let tag_id = match find_tag_id(tx, &key)? {
            Some(existing) => existing,
            None => insert_tag(tx, name, &key)?,
        };
        tag_ids.insert(tag_id);
    }

    Ok(tag_ids.into_iter().collect())
}

/// Looks up a tag id by canonical key.
pub fn find_tag_id(conn: &Connection, key: &str) -> RepoResult<Option<TagId>> {
    let tag_id = conn
        .query_row(
            "SELECT id FROM tags WHERE name_key = ?1;",
            [key],
            |row| row.get::<_, TagId>(0),
        )
        .optional()?;
    Ok(tag_id)
}

/// Inserts one tag row and returns its id.
pub fn insert_tag(conn: &Connection, name: &str, key: &str) -> RepoResult<TagId> {
    conn.execute(
        "INSERT INTO tags (name, name_key) VALUES (?1, ?2);",
        params![name, key],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Returns all tag names in binary (case-sensitive) order.
pub fn load_all_tag_names(conn: &Connection) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM tags ORDER BY name ASC;")?;
    let mut rows = stmt.query([])?;
    let mut names = Vec::new();
    while let Some(row) = rows.next()? {
        names.push(row.get("name")?);
    }
    Ok(names)
}

/// Returns the tag names linked to one collection, sorted by name.
pub fn load_tag_names_for_collection(
    conn: &Connection,
    collection_id: CollectionId,
) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT t.name
         FROM collection_tags ct
         INNER JOIN tags t ON t.id = ct.tag_id
         WHERE ct.collection_id = ?1
         ORDER BY t.name ASC;",
    )?;
    let mut rows = stmt.query([collection_id])?;
    let mut names = Vec::new();
    while let Some(row) = rows.next()? {
        names.push(row.get(0)?);
    }
    Ok(names)
}
