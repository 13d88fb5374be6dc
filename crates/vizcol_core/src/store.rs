//! Per-call unit-of-work facade over the collection store.
//!
//! # Responsibility
//! - Expose the store operations used by the presentation layer.
//! - Open one connection per call and release it on every exit path.
//!
//! # Invariants
//! - No connection or transaction outlives a single call.
//! - Failures are reported once; nothing is retried here.
//! - Log events carry ids, counts and error codes only.

use crate::config::StoreConfig;
use crate::db::{open_db, DbResult};
use crate::model::collection::{CollectionId, CollectionRecord, CollectionSummary, NewCollection};
use crate::model::draft::CollectionDraft;
use crate::repo::collection_repo::SqliteCollectionRepository;
use crate::service::collection_service::{CollectionService, CollectionServiceError};
use log::{error, info, warn};
use std::path::Path;
use std::time::Instant;

pub type StoreResult<T> = Result<T, CollectionServiceError>;

/// Entry point for every store operation.
#[derive(Debug, Clone)]
pub struct CollectionStore {
    config: StoreConfig,
}

impl CollectionStore {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    pub fn db_path(&self) -> &Path {
        self.config.db_path.as_path()
    }

    /// Creates the schema when absent. Safe to call on every startup.
    ///
    /// # Errors
    /// Any error is fatal: the store cannot be used.
    pub fn initialize(&self) -> DbResult<()> {
        let started_at = Instant::now();
        match open_db(self.db_path()) {
            Ok(_conn) => {
                info!(
                    "event=store_initialize module=store status=ok duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=store_initialize module=store status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Persists a collection with its tags as one atomic unit of work.
    pub fn create_collection(&self, input: &NewCollection) -> StoreResult<CollectionId> {
        let tag_count = input.tag_names.len();
        let collection_id = self.run("collection_create", |service| {
            Ok(service.create_collection(input)?)
        })?;
        info!(
            "event=collection_created module=store collection_id={} tag_inputs={}",
            collection_id, tag_count
        );
        Ok(collection_id)
    }

    /// Validates and persists a draft, returning the stored row.
    pub fn submit_draft(
        &self,
        draft: CollectionDraft,
        require_cover_image: bool,
    ) -> StoreResult<CollectionRecord> {
        let record = self.run("collection_submit_draft", |service| {
            service.submit_draft(draft, require_cover_image)
        })?;
        info!(
            "event=collection_created module=store collection_id={} tag_count={}",
            record.id,
            record.tag_ids.len()
        );
        Ok(record)
    }

    /// Gets one collection by id.
    pub fn get_collection(&self, id: CollectionId) -> StoreResult<Option<CollectionRecord>> {
        self.run("collection_get", |service| Ok(service.get_collection(id)?))
    }

    /// Lists collections, most recently created first.
    pub fn list_collections(&self) -> StoreResult<Vec<CollectionSummary>> {
        let collections = self.run("collection_list", |service| {
            Ok(service.list_collections()?)
        })?;
        info!(
            "event=collection_listed module=store count={}",
            collections.len()
        );
        Ok(collections)
    }

    /// Lists tag names alphabetically.
    pub fn list_tags(&self) -> StoreResult<Vec<String>> {
        self.run("tag_list", |service| Ok(service.list_tags()?))
    }

    /// Creates a standalone tag. `Ok(false)` means it already existed.
    pub fn add_tag(&self, name: &str) -> StoreResult<bool> {
        let created = self.run("tag_add", |service| Ok(service.add_tag(name)?))?;
        info!("event=tag_added module=store created={created}");
        Ok(created)
    }

    fn run<T>(
        &self,
        operation: &'static str,
        f: impl FnOnce(
            &mut CollectionService<SqliteCollectionRepository<'_>>,
        ) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let started_at = Instant::now();
        let result = self.with_service(f);
        let duration_ms = started_at.elapsed().as_millis();

        match &result {
            Ok(_) => info!(
                "event={} module=store status=ok duration_ms={}",
                operation, duration_ms
            ),
            Err(err) if err.is_declined() => warn!(
                "event={} module=store status=declined duration_ms={} error_code={}",
                operation,
                duration_ms,
                err.code()
            ),
            Err(err) => error!(
                "event={} module=store status=error duration_ms={} error_code={} error={}",
                operation,
                duration_ms,
                err.code(),
                err
            ),
        }
        result
    }

    fn with_service<T>(
        &self,
        f: impl FnOnce(
            &mut CollectionService<SqliteCollectionRepository<'_>>,
        ) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut conn = open_db(self.db_path())?;
        let repo = SqliteCollectionRepository::try_new(&mut conn)?;
        let mut service = CollectionService::new(repo);
        f(&mut service)
    }
}
