//! Domain model for visual collections and their tags.
//!
//! # Responsibility
//! - Define the data structures shared by repository, service and callers.
//! - Own the canonical case-folding used for every case-insensitive match.
//!
//! # Invariants
//! - Collections and tags are identified by system-assigned integer ids.
//! - Case-insensitive uniqueness is decided on `canonical_key`, never on
//!   engine-specific collation.

pub mod collection;
pub mod draft;
pub mod tag;
