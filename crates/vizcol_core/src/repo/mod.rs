//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repository writes validate input before any SQL mutation.
//! - Repository APIs return semantic errors (`DuplicateCollectionName`,
//!   `InvalidData`) in addition to DB transport errors.

pub mod collection_repo;
pub mod tag_repo;
