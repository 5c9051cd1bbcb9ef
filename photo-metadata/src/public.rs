//! Public-gallery set: presence in the map means the photo is part of
//! the event's unauthenticated gallery. Local-only persistence.

use crate::models::PublicPhoto;
use crate::remote::now_timestamp;
use crate::storage::LocalStore;
use crate::store::{MetadataStore, StoreError};
use std::collections::HashMap;
use std::sync::Arc;

pub struct PublicStore {
    inner: MetadataStore<PublicPhoto>,
}

impl PublicStore {
    pub fn local(medium: LocalStore) -> Self {
        Self {
            inner: MetadataStore::new_local(medium, "publicPhotos", "public-photos"),
        }
    }

    pub async fn load(&self) -> Result<(), StoreError> {
        self.inner.load().await
    }

    pub async fn add_to_public(
        &self,
        photo_id: &str,
        event_id: &str,
        added_by: Option<String>,
    ) -> Result<(), StoreError> {
        self.inner
            .upsert(PublicPhoto {
                photo_id: photo_id.to_string(),
                event_id: event_id.to_string(),
                added_at: now_timestamp(),
                added_by,
            })
            .await
    }

    pub async fn remove_from_public(&self, photo_id: &str) -> Result<(), StoreError> {
        self.inner.remove(photo_id).await
    }

    pub fn is_public(&self, photo_id: &str) -> bool {
        self.inner.contains(photo_id)
    }

    /// Flip membership: absent → added with defaults, present → removed
    pub async fn toggle(&self, photo_id: &str, event_id: &str) -> Result<(), StoreError> {
        if self.is_public(photo_id) {
            self.remove_from_public(photo_id).await
        } else {
            self.add_to_public(photo_id, event_id, None).await
        }
    }

    /// Add a whole selection with one shared timestamp
    pub async fn add_many(&self, photo_ids: &[String], event_id: &str) -> Result<(), StoreError> {
        let added_at = now_timestamp();
        let records = photo_ids
            .iter()
            .map(|photo_id| PublicPhoto {
                photo_id: photo_id.clone(),
                event_id: event_id.to_string(),
                added_at: added_at.clone(),
                added_by: None,
            })
            .collect();
        self.inner.upsert_many(records).await
    }

    /// Empty the public gallery, or only one event's share of it
    pub async fn remove_all(&self, event_id: Option<&str>) -> Result<(), StoreError> {
        self.inner.remove_by_event(event_id).await
    }

    pub fn public_photos(&self, event_id: Option<&str>) -> Vec<PublicPhoto> {
        match event_id {
            Some(event_id) => self.inner.by_event(event_id),
            None => self.inner.snapshot().values().cloned().collect(),
        }
    }

    pub fn count(&self, event_id: &str) -> usize {
        self.inner.by_event(event_id).len()
    }

    pub fn export(&self) -> Result<String, StoreError> {
        self.inner.export()
    }

    pub async fn import(&self, json_data: &str) -> bool {
        self.inner.import(json_data).await
    }

    pub fn snapshot(&self) -> Arc<HashMap<String, PublicPhoto>> {
        self.inner.snapshot()
    }
}
