//! New-collection draft carried through the create flow.
//!
//! # Responsibility
//! - Hold folder/cover/tag selections while a user composes a collection.
//! - Convert the finished selection into a validated `NewCollection`.
//!
//! # Invariants
//! - A draft is owned by one create flow and consumed on submission; it is
//!   dropped on cancellation.
//! - Selected tags are unique under `canonical_key`.

use crate::model::collection::NewCollection;
use crate::model::tag::{canonical_key, normalize_tag_name};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// Reasons a draft cannot be submitted yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftError {
    MissingName,
    MissingFolder,
    MissingCoverImage,
}

impl Display for DraftError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingName => write!(f, "Collection name cannot be empty."),
            Self::MissingFolder => write!(f, "Please select a folder."),
            Self::MissingCoverImage => write!(f, "Please select a cover image."),
        }
    }
}

impl Error for DraftError {}

/// Short-lived selection state for one new collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionDraft {
    name: String,
    folder_path: Option<String>,
    cover_image_path: Option<String>,
    tags: Vec<String>,
}

impl CollectionDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn folder_path(&self) -> Option<&str> {
        self.folder_path.as_deref()
    }

    pub fn cover_image_path(&self) -> Option<&str> {
        self.cover_image_path.as_deref()
    }

    /// Selected tags in selection order.
    pub fn selected_tags(&self) -> &[String] {
        &self.tags
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Records the chosen folder.
    ///
    /// When no name has been typed yet, the folder's last path component
    /// becomes the name.
    pub fn select_folder(&mut self, path: impl Into<String>) {
        let path = path.into();
        if self.name.trim().is_empty() {
            if let Some(base) = Path::new(&path).file_name().and_then(|name| name.to_str()) {
                self.name = base.to_string();
            }
        }
        self.folder_path = Some(path);
    }

    pub fn select_cover_image(&mut self, path: impl Into<String>) {
        self.cover_image_path = Some(path.into());
    }

    /// Selects one tag unless an equal tag is already selected.
    ///
    /// Returns whether the selection changed.
    pub fn select_tag(&mut self, name: &str) -> bool {
        let Some(trimmed) = normalize_tag_name(name) else {
            return false;
        };
        if self.position_of(trimmed).is_some() {
            return false;
        }
        self.tags.push(trimmed.to_string());
        true
    }

    /// Toggles one tag and returns whether it is selected afterwards.
    ///
    /// Matching is case-insensitive; blank names are ignored and reported as
    /// not selected.
    pub fn toggle_tag(&mut self, name: &str) -> bool {
        let Some(trimmed) = normalize_tag_name(name) else {
            return false;
        };
        if let Some(index) = self.position_of(trimmed) {
            self.tags.remove(index);
            false
        } else {
            self.tags.push(trimmed.to_string());
            true
        }
    }

    fn position_of(&self, name: &str) -> Option<usize> {
        let key = canonical_key(name);
        self.tags.iter().position(|tag| canonical_key(tag) == key)
    }

    /// Consumes the draft into a create request.
    ///
    /// `require_cover_image` selects the caller's cover policy; storage itself
    /// accepts collections without a cover.
    pub fn into_new_collection(
        self,
        require_cover_image: bool,
    ) -> Result<NewCollection, DraftError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(DraftError::MissingName);
        }
        let folder_path = match self.folder_path {
            Some(path) if !path.trim().is_empty() => path,
            _ => return Err(DraftError::MissingFolder),
        };
        let cover_image_path = self
            .cover_image_path
            .filter(|path| !path.trim().is_empty());
        if require_cover_image && cover_image_path.is_none() {
            return Err(DraftError::MissingCoverImage);
        }

        Ok(NewCollection {
            name: name.to_string(),
            folder_path,
            cover_image_path,
            tag_names: self.tags,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{CollectionDraft, DraftError};

    #[test]
    fn select_folder_prefills_blank_name_only() {
        let mut draft = CollectionDraft::new();
        draft.select_folder("/photos/Old Posters");
        assert_eq!(draft.name(), "Old Posters");

        draft.set_name("Posters");
        draft.select_folder("/photos/Other");
        assert_eq!(draft.name(), "Posters");
        assert_eq!(draft.folder_path(), Some("/photos/Other"));
    }

    #[test]
    fn toggle_tag_is_case_insensitive() {
        let mut draft = CollectionDraft::new();
        assert!(draft.toggle_tag("Retro"));
        assert!(!draft.toggle_tag("retro"));
        assert!(draft.selected_tags().is_empty());
        assert!(!draft.toggle_tag("   "));
    }

    #[test]
    fn select_tag_keeps_first_spelling() {
        let mut draft = CollectionDraft::new();
        assert!(draft.select_tag("Retro"));
        assert!(!draft.select_tag(" RETRO "));
        assert!(draft.select_tag("80s"));
        assert_eq!(
            draft.selected_tags(),
            &["Retro".to_string(), "80s".to_string()]
        );
    }

    #[test]
    fn into_new_collection_applies_validation_policy() {
        let empty = CollectionDraft::new();
        let mut named = empty.clone();
        named.set_name("A");
        assert_eq!(
            empty.into_new_collection(false),
            Err(DraftError::MissingName)
        );
        assert_eq!(
            named.clone().into_new_collection(false),
            Err(DraftError::MissingFolder)
        );

        named.select_folder("/f");
        assert_eq!(
            named.clone().into_new_collection(true),
            Err(DraftError::MissingCoverImage)
        );

        named.select_cover_image("/img.png");
        named.toggle_tag("x");
        let request = named.into_new_collection(true).unwrap();
        assert_eq!(request.name, "A");
        assert_eq!(request.folder_path, "/f");
        assert_eq!(request.cover_image_path.as_deref(), Some("/img.png"));
        assert_eq!(request.tag_names, vec!["x".to_string()]);
    }
}
