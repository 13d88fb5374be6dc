//! Collection domain model.
//!
//! # Responsibility
//! - Define the write model (`NewCollection`) and read models
//!   (`CollectionSummary`, `CollectionRecord`) for collections.
//! - Validate write input before it reaches SQL.
//!
//! # Invariants
//! - A persisted collection name is never empty after trimming.
//! - `folder_path` is stored verbatim; existence on disk is the caller's job.
//! - `CollectionSummary::tags` is `None` when the collection has no tags.

use crate::model::tag::{TagId, TAG_DELIMITER};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable identifier assigned by storage to every collection.
pub type CollectionId = i64;

/// Input validation failures. These decline an operation without touching
/// storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionValidationError {
    EmptyName,
    EmptyFolderPath,
    EmptyTagName,
    TagNameContainsDelimiter(String),
}

impl Display for CollectionValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "collection name cannot be empty"),
            Self::EmptyFolderPath => write!(f, "collection folder path cannot be empty"),
            Self::EmptyTagName => write!(f, "tag name cannot be empty"),
            Self::TagNameContainsDelimiter(name) => {
                write!(f, "tag name `{name}` must not contain `{TAG_DELIMITER}`")
            }
        }
    }
}

impl Error for CollectionValidationError {}

/// Write model for the create-collection operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewCollection {
    /// Display name; trimmed before persistence.
    pub name: String,
    /// Filesystem location of the collection contents.
    pub folder_path: String,
    /// Optional cover thumbnail path, stored as given.
    pub cover_image_path: Option<String>,
    /// Human-entered tag names, resolved to tag ids on create.
    pub tag_names: Vec<String>,
}

impl NewCollection {
    pub fn new(name: impl Into<String>, folder_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            folder_path: folder_path.into(),
            cover_image_path: None,
            tag_names: Vec::new(),
        }
    }

    pub fn with_cover_image(mut self, path: impl Into<String>) -> Self {
        self.cover_image_path = Some(path.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tag_names = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Checks write input. Tag names are validated during resolution.
    pub fn validate(&self) -> Result<(), CollectionValidationError> {
        if self.name.trim().is_empty() {
            return Err(CollectionValidationError::EmptyName);
        }
        if self.folder_path.trim().is_empty() {
            return Err(CollectionValidationError::EmptyFolderPath);
        }
        Ok(())
    }
}

/// One row of the collection grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSummary {
    pub id: CollectionId,
    pub name: String,
    pub cover_image_path: Option<String>,
    pub folder_path: String,
    /// Tag names joined with `TAG_DELIMITER`, `None` when untagged.
    pub tags: Option<String>,
}

impl CollectionSummary {
    /// Splits the joined tag string for display.
    pub fn tag_names(&self) -> Vec<&str> {
        match self.tags.as_deref() {
            Some(joined) => joined
                .split(TAG_DELIMITER)
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .collect(),
            None => Vec::new(),
        }
    }
}

/// Full collection row including denormalized and audit fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionRecord {
    pub id: CollectionId,
    pub name: String,
    pub folder_path: String,
    pub cover_image_path: Option<String>,
    /// Creation time in epoch milliseconds.
    pub created_at: i64,
    /// Parsed `tag_id_cache`, ascending.
    pub tag_ids: Vec<TagId>,
    /// Tag names from the association table, sorted by name.
    pub tag_names: Vec<String>,
}

/// Formats tag ids as the denormalized cache column value.
pub fn format_tag_id_cache(tag_ids: &[TagId]) -> String {
    let delimiter = TAG_DELIMITER.to_string();
    tag_ids
        .iter()
        .map(TagId::to_string)
        .collect::<Vec<_>>()
        .join(delimiter.as_str())
}

/// Parses the denormalized cache column value. Returns `None` on malformed
/// input.
pub fn parse_tag_id_cache(value: &str) -> Option<Vec<TagId>> {
    if value.trim().is_empty() {
        return Some(Vec::new());
    }
    value
        .split(TAG_DELIMITER)
        .map(|part| part.trim().parse::<TagId>().ok())
        .collect()
}
