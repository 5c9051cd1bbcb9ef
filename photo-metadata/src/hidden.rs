//! Hidden-photo set: presence in the map means the photo is hidden.

use crate::models::HiddenPhoto;
use crate::remote::{now_timestamp, DataType, RemoteStore};
use crate::storage::LocalStore;
use crate::store::{MetadataStore, StoreError};
use std::collections::HashMap;
use std::sync::Arc;

pub struct HiddenStore {
    inner: MetadataStore<HiddenPhoto>,
}

impl HiddenStore {
    pub fn local(medium: LocalStore) -> Self {
        Self {
            inner: MetadataStore::new_local(
                medium,
                DataType::Hidden.map_key(),
                DataType::Hidden.storage_key(),
            ),
        }
    }

    pub fn synced(remote: Arc<dyn RemoteStore>, fallback: LocalStore) -> Self {
        Self {
            inner: MetadataStore::new_synced(remote, DataType::Hidden, fallback),
        }
    }

    pub async fn load(&self) -> Result<(), StoreError> {
        self.inner.load().await
    }

    pub async fn hide_photo(
        &self,
        photo_id: &str,
        event_id: &str,
        reason: Option<String>,
    ) -> Result<(), StoreError> {
        self.inner
            .upsert(HiddenPhoto {
                photo_id: photo_id.to_string(),
                event_id: event_id.to_string(),
                hidden_at: now_timestamp(),
                reason,
            })
            .await
    }

    pub async fn unhide_photo(&self, photo_id: &str) -> Result<(), StoreError> {
        self.inner.remove(photo_id).await
    }

    pub fn is_hidden(&self, photo_id: &str) -> bool {
        self.inner.contains(photo_id)
    }

    /// Flip the hidden state: absent → hidden with defaults, present → visible
    pub async fn toggle(&self, photo_id: &str, event_id: &str) -> Result<(), StoreError> {
        if self.is_hidden(photo_id) {
            self.unhide_photo(photo_id).await
        } else {
            self.hide_photo(photo_id, event_id, None).await
        }
    }

    /// Hide a whole selection with one shared timestamp
    pub async fn hide_many(
        &self,
        photo_ids: &[String],
        event_id: &str,
        reason: Option<String>,
    ) -> Result<(), StoreError> {
        let hidden_at = now_timestamp();
        let records = photo_ids
            .iter()
            .map(|photo_id| HiddenPhoto {
                photo_id: photo_id.clone(),
                event_id: event_id.to_string(),
                hidden_at: hidden_at.clone(),
                reason: reason.clone(),
            })
            .collect();
        self.inner.upsert_many(records).await
    }

    /// Unhide everything, or only one event's photos
    pub async fn unhide_all(&self, event_id: Option<&str>) -> Result<(), StoreError> {
        self.inner.remove_by_event(event_id).await
    }

    pub fn hidden_photos(&self, event_id: Option<&str>) -> Vec<HiddenPhoto> {
        match event_id {
            Some(event_id) => self.inner.by_event(event_id),
            None => self.inner.snapshot().values().cloned().collect(),
        }
    }

    pub fn export(&self) -> Result<String, StoreError> {
        self.inner.export()
    }

    pub async fn import(&self, json_data: &str) -> bool {
        self.inner.import(json_data).await
    }

    pub fn snapshot(&self) -> Arc<HashMap<String, HiddenPhoto>> {
        self.inner.snapshot()
    }
}
