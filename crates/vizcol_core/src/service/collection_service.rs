//! Collection use-case service.
//!
//! # Responsibility
//! - Turn a finished `CollectionDraft` into a persisted collection.
//! - Provide the grid/tag read paths and standalone tag creation.
//!
//! # Invariants
//! - Service APIs never bypass repository validation or transactions.
//! - A successful draft submission is always followed by a read-back of the
//!   created row.

use crate::db::DbError;
use crate::model::collection::{CollectionId, CollectionRecord, CollectionSummary, NewCollection};
use crate::model::draft::{CollectionDraft, DraftError};
use crate::repo::collection_repo::{CollectionRepository, RepoError, RepoResult};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for collection use-cases.
#[derive(Debug)]
pub enum CollectionServiceError {
    /// Draft is missing a required selection.
    Draft(DraftError),
    /// Persistence-layer failure or declined write.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl CollectionServiceError {
    /// Returns whether the caller should treat this as a declined request
    /// (re-prompt) rather than a storage fault.
    pub fn is_declined(&self) -> bool {
        match self {
            Self::Draft(_) => true,
            Self::Repo(err) => err.is_declined(),
            Self::InconsistentState(_) => false,
        }
    }

    /// Stable metadata-only code for log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Draft(_) => "draft_incomplete",
            Self::Repo(RepoError::Validation(_)) => "validation_failed",
            Self::Repo(RepoError::DuplicateCollectionName(_)) => "duplicate_collection_name",
            Self::Repo(RepoError::Db(err)) => err.code(),
            Self::Repo(RepoError::InvalidData(_)) => "invalid_data",
            Self::Repo(RepoError::MissingRequiredTable(_))
            | Self::Repo(RepoError::MissingRequiredColumn { .. }) => "schema_mismatch",
            Self::InconsistentState(_) => "inconsistent_state",
        }
    }
}

impl Display for CollectionServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Draft(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => {
                write!(f, "inconsistent collection state: {details}")
            }
        }
    }
}

impl Error for CollectionServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Draft(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::InconsistentState(_) => None,
        }
    }
}

impl From<DraftError> for CollectionServiceError {
    fn from(value: DraftError) -> Self {
        Self::Draft(value)
    }
}

impl From<RepoError> for CollectionServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<DbError> for CollectionServiceError {
    fn from(value: DbError) -> Self {
        Self::Repo(RepoError::Db(value))
    }
}

/// Collection service facade over repository implementations.
pub struct CollectionService<R: CollectionRepository> {
    repo: R,
}

impl<R: CollectionRepository> CollectionService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Persists one collection with its tags and returns the new id.
    pub fn create_collection(&mut self, input: &NewCollection) -> RepoResult<CollectionId> {
        self.repo.create_collection(input)
    }

    /// Validates and persists a draft, returning the stored row.
    ///
    /// The draft is consumed whatever the outcome; callers re-prompt with a
    /// fresh draft on a declined result.
    pub fn submit_draft(
        &mut self,
        draft: CollectionDraft,
        require_cover_image: bool,
    ) -> Result<CollectionRecord, CollectionServiceError> {
        let input = draft.into_new_collection(require_cover_image)?;
        let collection_id = self.repo.create_collection(&input)?;
        self.repo
            .get_collection(collection_id)?
            .ok_or(CollectionServiceError::InconsistentState(
                "created collection not found in read-back",
            ))
    }

    /// Gets one collection by id.
    pub fn get_collection(&self, id: CollectionId) -> RepoResult<Option<CollectionRecord>> {
        self.repo.get_collection(id)
    }

    /// Lists collections, most recently created first.
    pub fn list_collections(&self) -> RepoResult<Vec<CollectionSummary>> {
        self.repo.list_collections()
    }

    /// Lists tag names alphabetically.
    pub fn list_tags(&self) -> RepoResult<Vec<String>> {
        self.repo.list_tags()
    }

    /// Creates a tag unless one already exists under case-insensitive match.
    pub fn add_tag(&self, name: &str) -> RepoResult<bool> {
        self.repo.add_tag(name)
    }
}
