//! Bulk mutation engine for admin multi-select edits.
//!
//! One `BulkEdit` describes the change; `apply_bulk_edit` walks the
//! selection photo by photo, applying every requested aspect before
//! moving on. Processing stops at the first photo whose edits fail, so
//! a remote outage leaves a clean prefix applied rather than a random
//! subset.

use photo_metadata::{HiddenStore, PublicStore, RatingStore, StoreError, TagStore};
use std::collections::HashSet;

/// Requested visibility change for every photo in the selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisibilityChange {
    #[default]
    Unchanged,
    Hide,
    Unhide,
}

/// Requested public-gallery change for every photo in the selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PublicChange {
    #[default]
    Unchanged,
    Add,
    Remove,
}

/// One bulk edit over a photo selection. Every field defaults to
/// "leave alone"; only the aspects set are touched.
#[derive(Debug, Clone, Default)]
pub struct BulkEdit {
    /// Set (and clamp) the rating on every photo
    pub rating: Option<u8>,
    /// Tags merged into each photo's existing set
    pub tags_to_add: Vec<String>,
    /// Tags stripped from each photo's existing set. A tag in both
    /// lists ends up present: removals run first, additions win.
    pub tags_to_remove: Vec<String>,
    pub visibility: VisibilityChange,
    pub public_gallery: PublicChange,
}

impl BulkEdit {
    pub fn is_noop(&self) -> bool {
        self.rating.is_none()
            && self.tags_to_add.is_empty()
            && self.tags_to_remove.is_empty()
            && self.visibility == VisibilityChange::Unchanged
            && self.public_gallery == PublicChange::Unchanged
    }
}

/// Outcome of a bulk edit run
#[derive(Debug)]
pub struct BulkOutcome {
    /// Photos fully processed before any failure
    pub applied: usize,
    /// The failure that stopped the run, if any
    pub error: Option<StoreError>,
}

impl BulkOutcome {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// Apply one edit across a selection, stopping at the first photo whose
/// mutations fail. Visibility and public-gallery changes are idempotent
/// against the current state, so re-running after a partial failure is
/// safe.
pub async fn apply_bulk_edit(
    edit: &BulkEdit,
    photo_ids: &[String],
    event_id: &str,
    ratings: &RatingStore,
    tags: &TagStore,
    hidden: &HiddenStore,
    public: &PublicStore,
) -> BulkOutcome {
    for (applied, photo_id) in photo_ids.iter().enumerate() {
        if let Err(e) = apply_to_photo(edit, photo_id, event_id, ratings, tags, hidden, public).await
        {
            return BulkOutcome {
                applied,
                error: Some(e),
            };
        }
    }
    BulkOutcome {
        applied: photo_ids.len(),
        error: None,
    }
}

async fn apply_to_photo(
    edit: &BulkEdit,
    photo_id: &str,
    event_id: &str,
    ratings: &RatingStore,
    tags: &TagStore,
    hidden: &HiddenStore,
    public: &PublicStore,
) -> Result<(), StoreError> {
    if let Some(rating) = edit.rating {
        ratings.rate_photo(photo_id, event_id, rating, None).await?;
    }

    if !edit.tags_to_add.is_empty() || !edit.tags_to_remove.is_empty() {
        let remove: HashSet<&str> = edit.tags_to_remove.iter().map(String::as_str).collect();
        let mut next: Vec<String> = tags
            .photo_tags(photo_id)
            .map(|pt| pt.tags)
            .unwrap_or_default();
        next.retain(|t| !remove.contains(t.as_str()));
        // Removals first, then additions: a tag in both lists survives
        next.extend(edit.tags_to_add.iter().cloned());
        tags.tag_photo(photo_id, event_id, next).await?;
    }

    match edit.visibility {
        VisibilityChange::Unchanged => {}
        VisibilityChange::Hide => {
            if !hidden.is_hidden(photo_id) {
                hidden.hide_photo(photo_id, event_id, None).await?;
            }
        }
        VisibilityChange::Unhide => {
            if hidden.is_hidden(photo_id) {
                hidden.unhide_photo(photo_id).await?;
            }
        }
    }

    match edit.public_gallery {
        PublicChange::Unchanged => {}
        PublicChange::Add => {
            if !public.is_public(photo_id) {
                public.add_to_public(photo_id, event_id, None).await?;
            }
        }
        PublicChange::Remove => {
            if public.is_public(photo_id) {
                public.remove_from_public(photo_id).await?;
            }
        }
    }

    Ok(())
}
