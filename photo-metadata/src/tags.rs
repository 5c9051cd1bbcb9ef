//! Tag sets per photo, de-duplicated against repeat writes.

use crate::models::{PhotoTag, TagCount, TagStats};
use crate::remote::{now_timestamp, DataType, RemoteStore};
use crate::storage::LocalStore;
use crate::store::{MetadataStore, StoreError};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Drop duplicate tags, keeping first occurrence order
fn dedupe(tags: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.into_iter().filter(|t| seen.insert(t.clone())).collect()
}

pub struct TagStore {
    inner: MetadataStore<PhotoTag>,
}

impl TagStore {
    pub fn local(medium: LocalStore) -> Self {
        Self {
            inner: MetadataStore::new_local(
                medium,
                DataType::Tags.map_key(),
                DataType::Tags.storage_key(),
            ),
        }
    }

    pub fn synced(remote: Arc<dyn RemoteStore>, fallback: LocalStore) -> Self {
        Self {
            inner: MetadataStore::new_synced(remote, DataType::Tags, fallback),
        }
    }

    pub async fn load(&self) -> Result<(), StoreError> {
        self.inner.load().await
    }

    /// Replace a photo's tag set. Duplicates are removed; an empty set
    /// is stored as-is (the record still exists).
    pub async fn tag_photo(
        &self,
        photo_id: &str,
        event_id: &str,
        tags: Vec<String>,
    ) -> Result<(), StoreError> {
        self.inner
            .upsert(PhotoTag {
                photo_id: photo_id.to_string(),
                event_id: event_id.to_string(),
                tags: dedupe(tags),
                timestamp: now_timestamp(),
            })
            .await
    }

    pub async fn remove_tags(&self, photo_id: &str) -> Result<(), StoreError> {
        self.inner.remove(photo_id).await
    }

    pub fn photo_tags(&self, photo_id: &str) -> Option<PhotoTag> {
        self.inner.get(photo_id)
    }

    pub fn event_tags(&self, event_id: &str) -> Vec<PhotoTag> {
        self.inner.by_event(event_id)
    }

    /// Photos of an event carrying a given tag
    pub fn photos_with_tag(&self, event_id: &str, tag: &str) -> Vec<PhotoTag> {
        self.inner
            .by_event(event_id)
            .into_iter()
            .filter(|pt| pt.tags.iter().any(|t| t == tag))
            .collect()
    }

    /// Per-event tag counts plus the ten most used tags
    pub fn stats(&self, event_id: &str) -> TagStats {
        let event_tags = self.event_tags(event_id);
        let mut tag_counts: HashMap<String, usize> = HashMap::new();
        for photo_tag in &event_tags {
            for tag in &photo_tag.tags {
                *tag_counts.entry(tag.clone()).or_insert(0) += 1;
            }
        }

        let mut popular_tags: Vec<TagCount> = tag_counts
            .iter()
            .map(|(tag, count)| TagCount {
                tag: tag.clone(),
                count: *count,
            })
            .collect();
        popular_tags.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.cmp(&b.tag)));
        popular_tags.truncate(10);

        TagStats {
            total_tagged_photos: event_tags.len(),
            tag_counts,
            popular_tags,
        }
    }

    pub fn export(&self) -> Result<String, StoreError> {
        self.inner.export()
    }

    pub async fn import(&self, json_data: &str) -> bool {
        self.inner.import(json_data).await
    }

    pub async fn clear_all(&self) {
        self.inner.clear_all().await
    }

    pub fn snapshot(&self) -> Arc<HashMap<String, PhotoTag>> {
        self.inner.snapshot()
    }
}
