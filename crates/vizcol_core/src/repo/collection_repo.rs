//! Collection repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist collections together with their tag associations.
//! - Serve the collection grid and tag list read paths.
//!
//! # Invariants
//! - `create_collection` is one IMMEDIATE transaction: tag resolution, the
//!   collection row, its `tag_id_cache` and every `collection_tags` row commit
//!   together or not at all.
//! - Collection names are unique under `canonical_key` (`name_key` column).
//! - Read paths reject malformed persisted state instead of masking it.

use crate::db::DbError;
use crate::model::collection::{
    format_tag_id_cache, parse_tag_id_cache, CollectionId, CollectionRecord, CollectionSummary,
    CollectionValidationError, NewCollection,
};
use crate::model::tag::{canonical_key, normalize_tag_name, validate_tag_name};
use crate::repo::tag_repo::{
    find_tag_id, insert_tag, load_all_tag_names, load_tag_names_for_collection, resolve_tags,
};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

const COLLECTION_SUMMARY_SQL: &str = "SELECT
    c.id,
    c.name,
    c.cover_image_path,
    c.folder_path,
    GROUP_CONCAT(t.name, ',') AS tags
FROM collections c
LEFT JOIN collection_tags ct ON ct.collection_id = c.id
LEFT JOIN tags t ON t.id = ct.tag_id
GROUP BY c.id, c.name, c.cover_image_path, c.folder_path, c.created_at
ORDER BY c.created_at DESC, c.id DESC;";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for collection/tag persistence and queries.
#[derive(Debug)]
pub enum RepoError {
    Validation(CollectionValidationError),
    Db(DbError),
    DuplicateCollectionName(String),
    InvalidData(String),
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl RepoError {
    /// Returns whether the operation was declined on its input rather than
    /// failed by storage.
    pub fn is_declined(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::DuplicateCollectionName(_)
        )
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::DuplicateCollectionName(name) => {
                write!(f, "a collection named `{name}` already exists")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted collection data: {message}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "store is missing required table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "store table `{table}` is missing column `{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CollectionValidationError> for RepoError {
    fn from(value: CollectionValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for collection and tag operations.
pub trait CollectionRepository {
    /// Persists a collection with its tags atomically and returns its id.
    fn create_collection(&mut self, input: &NewCollection) -> RepoResult<CollectionId>;
    /// Gets one collection by id.
    fn get_collection(&self, id: CollectionId) -> RepoResult<Option<CollectionRecord>>;
    /// Lists collections newest first with joined tag names.
    fn list_collections(&self) -> RepoResult<Vec<CollectionSummary>>;
    /// Returns all tag names in case-sensitive alphabetical order.
    fn list_tags(&self) -> RepoResult<Vec<String>>;
    /// Creates a standalone tag. Returns `false` when it already exists.
    fn add_tag(&self, name: &str) -> RepoResult<bool>;
}

/// SQLite-backed collection repository.
pub struct SqliteCollectionRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteCollectionRepository<'conn> {
    /// Constructs a repository from an initialized connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl CollectionRepository for SqliteCollectionRepository<'_> {
    fn create_collection(&mut self, input: &NewCollection) -> RepoResult<CollectionId> {
        input.validate()?;
        let name = input.name.trim();
        let name_key = canonical_key(name);

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        if collection_name_exists(&tx, &name_key)? {
            return Err(RepoError::DuplicateCollectionName(name.to_string()));
        }

        let tag_ids = resolve_tags(&tx, &input.tag_names)?;

        tx.execute(
            "INSERT INTO collections (
                name,
                name_key,
                folder_path,
                cover_image_path,
                tag_id_cache
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                name,
                name_key,
                input.folder_path.as_str(),
                input.cover_image_path.as_deref(),
                format_tag_id_cache(&tag_ids),
            ],
        )
        .map_err(|err| map_collection_insert_error(err, name))?;
        let collection_id = tx.last_insert_rowid();

        for tag_id in &tag_ids {
            tx.execute(
                "INSERT INTO collection_tags (collection_id, tag_id) VALUES (?1, ?2);",
                params![collection_id, tag_id],
            )?;
        }

        tx.commit()?;
        Ok(collection_id)
    }

    fn get_collection(&self, id: CollectionId) -> RepoResult<Option<CollectionRecord>> {
        let row = self
            .conn
            .query_row(
                "SELECT
                    id,
                    name,
                    folder_path,
                    cover_image_path,
                    created_at,
                    tag_id_cache
                 FROM collections
                 WHERE id = ?1;",
                [id],
                |row| {
                    Ok((
                        row.get::<_, CollectionId>("id")?,
                        row.get::<_, String>("name")?,
                        row.get::<_, String>("folder_path")?,
                        row.get::<_, Option<String>>("cover_image_path")?,
                        row.get::<_, i64>("created_at")?,
                        row.get::<_, String>("tag_id_cache")?,
                    ))
                },
            )
            .optional()?;

        let Some((id, name, folder_path, cover_image_path, created_at, cache)) = row else {
            return Ok(None);
        };

        let tag_ids = parse_tag_id_cache(&cache).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid tag id cache `{cache}` in collections.tag_id_cache"
            ))
        })?;
        let tag_names = load_tag_names_for_collection(self.conn, id)?;

        Ok(Some(CollectionRecord {
            id,
            name,
            folder_path,
            cover_image_path,
            created_at,
            tag_ids,
            tag_names,
        }))
    }

    fn list_collections(&self) -> RepoResult<Vec<CollectionSummary>> {
        let mut stmt = self.conn.prepare(COLLECTION_SUMMARY_SQL)?;
        let mut rows = stmt.query([])?;
        let mut collections = Vec::new();
        while let Some(row) = rows.next()? {
            collections.push(CollectionSummary {
                id: row.get("id")?,
                name: row.get("name")?,
                cover_image_path: row.get("cover_image_path")?,
                folder_path: row.get("folder_path")?,
                tags: row.get("tags")?,
            });
        }
        Ok(collections)
    }

    fn list_tags(&self) -> RepoResult<Vec<String>> {
        load_all_tag_names(self.conn)
    }

    fn add_tag(&self, name: &str) -> RepoResult<bool> {
        let Some(name) = normalize_tag_name(name) else {
            return Err(CollectionValidationError::EmptyTagName.into());
        };
        validate_tag_name(name)?;

        let key = canonical_key(name);
        if find_tag_id(self.conn, &key)?.is_some() {
            return Ok(false);
        }

        match insert_tag(self.conn, name, &key) {
            Ok(_) => Ok(true),
            Err(RepoError::Db(DbError::Sqlite(err))) if is_unique_violation(&err) => Ok(false),
            Err(err) => Err(err),
        }
    }
}

fn collection_name_exists(conn: &Connection, name_key: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM collections
            WHERE name_key = ?1
        );",
        [name_key],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn map_collection_insert_error(err: rusqlite::Error, name: &str) -> RepoError {
    let duplicate_name = match &err {
        rusqlite::Error::SqliteFailure(_, Some(message)) => {
            is_unique_violation(&err) && message.contains("collections.name_key")
        }
        _ => false,
    };

    if duplicate_name {
        RepoError::DuplicateCollectionName(name.to_string())
    } else {
        err.into()
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(failure, _) => {
            failure.code == ErrorCode::ConstraintViolation
                && failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        }
        _ => false,
    }
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    for table in ["collections", "tags", "collection_tags"] {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }

    let required_columns: [(&'static str, &[&'static str]); 3] = [
        (
            "collections",
            &[
                "id",
                "name",
                "name_key",
                "folder_path",
                "cover_image_path",
                "created_at",
                "tag_id_cache",
            ],
        ),
        ("tags", &["id", "name", "name_key"]),
        ("collection_tags", &["collection_id", "tag_id"]),
    ];
    for (table, columns) in required_columns {
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
