//! Storage engine for visual collections.
//! This crate is the single source of truth for collection/tag invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use config::StoreConfig;
pub use logging::{default_log_level, init_logging, logging_status, LogConfig, LoggingError};
pub use model::collection::{
    CollectionId, CollectionRecord, CollectionSummary, CollectionValidationError, NewCollection,
};
pub use model::draft::{CollectionDraft, DraftError};
pub use model::tag::{canonical_key, parse_tag_input, TagId, TAG_DELIMITER};
pub use repo::collection_repo::{
    CollectionRepository, RepoError, RepoResult, SqliteCollectionRepository,
};
pub use repo::tag_repo::resolve_tags;
pub use service::collection_service::{CollectionService, CollectionServiceError};
pub use store::{CollectionStore, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
