//! Tag model and name normalization.
//!
//! # Invariants
//! - Stored tag names keep the casing the user first entered.
//! - Two names are the same tag iff their `canonical_key` values are equal.
//! - Tag names never contain `TAG_DELIMITER`, so joined tag strings can be
//!   split back without ambiguity.

use crate::model::collection::CollectionValidationError;

/// Stable identifier assigned by storage to every tag.
pub type TagId = i64;

/// Separator used for joined tag strings and comma-separated user input.
pub const TAG_DELIMITER: char = ',';

/// Returns the canonical case-folded form of a name.
///
/// Used for both tag names and collection names.
pub fn canonical_key(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Trims one tag name, returning `None` when nothing is left.
pub fn normalize_tag_name(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Validates one trimmed tag name before persistence.
pub fn validate_tag_name(value: &str) -> Result<(), CollectionValidationError> {
    if value.trim().is_empty() {
        return Err(CollectionValidationError::EmptyTagName);
    }
    if value.contains(TAG_DELIMITER) {
        return Err(CollectionValidationError::TagNameContainsDelimiter(
            value.to_string(),
        ));
    }
    Ok(())
}

/// Splits comma-separated user input into trimmed, non-empty tag names.
///
/// Duplicates are kept; they collapse during tag resolution.
pub fn parse_tag_input(input: &str) -> Vec<String> {
    input
        .split(TAG_DELIMITER)
        .filter_map(normalize_tag_name)
        .map(str::to_string)
        .collect()
}
