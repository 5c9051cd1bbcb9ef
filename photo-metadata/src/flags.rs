//! Moderation flags raised against photos. Local-only persistence;
//! forwarding to the external form-capture endpoint is tracked with
//! the `submitted` bit but handled by the application layer.

use crate::models::FlaggedPhoto;
use crate::remote::{now_timestamp, DataType};
use crate::storage::LocalStore;
use crate::store::{MetadataStore, StoreError};
use std::collections::HashMap;
use std::sync::Arc;

pub struct FlagStore {
    inner: MetadataStore<FlaggedPhoto>,
}

impl FlagStore {
    pub fn local(medium: LocalStore) -> Self {
        Self {
            inner: MetadataStore::new_local(
                medium,
                DataType::Flags.map_key(),
                DataType::Flags.storage_key(),
            ),
        }
    }

    pub async fn load(&self) -> Result<(), StoreError> {
        self.inner.load().await
    }

    /// Record a report against a photo. A repeat flag replaces the
    /// earlier one and resets `submitted`.
    pub async fn flag_photo(
        &self,
        photo_id: &str,
        event_id: &str,
        reason: &str,
        reporter_email: Option<String>,
        reporter_name: Option<String>,
    ) -> Result<(), StoreError> {
        self.inner
            .upsert(FlaggedPhoto {
                photo_id: photo_id.to_string(),
                event_id: event_id.to_string(),
                reason: reason.to_string(),
                reporter_email,
                reporter_name,
                flagged_at: now_timestamp(),
                submitted: false,
            })
            .await
    }

    /// Mark a flag as forwarded to the form-capture endpoint; no-op
    /// when the photo is not flagged
    pub async fn mark_submitted(&self, photo_id: &str) -> Result<(), StoreError> {
        self.inner
            .update(photo_id, |flag| flag.submitted = true)
            .await
    }

    pub fn is_flagged(&self, photo_id: &str) -> bool {
        self.inner.contains(photo_id)
    }

    pub fn photo_flag(&self, photo_id: &str) -> Option<FlaggedPhoto> {
        self.inner.get(photo_id)
    }

    pub fn event_flags(&self, event_id: &str) -> Vec<FlaggedPhoto> {
        self.inner.by_event(event_id)
    }

    pub async fn remove_flag(&self, photo_id: &str) -> Result<(), StoreError> {
        self.inner.remove(photo_id).await
    }

    pub async fn clear_all(&self) {
        self.inner.clear_all().await
    }

    pub fn export(&self) -> Result<String, StoreError> {
        self.inner.export()
    }

    pub async fn import(&self, json_data: &str) -> bool {
        self.inner.import(json_data).await
    }

    pub fn snapshot(&self) -> Arc<HashMap<String, FlaggedPhoto>> {
        self.inner.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> FlagStore {
        FlagStore::local(LocalStore::open_in_memory().unwrap())
    }

    #[tokio::test]
    async fn test_flag_then_mark_submitted() {
        let store = store();
        store
            .flag_photo("p1", "e1", "inappropriate", None, Some("A. Resident".to_string()))
            .await
            .unwrap();

        let flag = store.photo_flag("p1").unwrap();
        assert!(!flag.submitted);

        store.mark_submitted("p1").await.unwrap();
        assert!(store.photo_flag("p1").unwrap().submitted);
    }

    #[tokio::test]
    async fn test_mark_submitted_noop_when_missing() {
        let store = store();
        store.mark_submitted("ghost").await.unwrap();
        assert!(!store.is_flagged("ghost"));
    }

    #[tokio::test]
    async fn test_reflag_resets_submitted() {
        let store = store();
        store.flag_photo("p1", "e1", "first", None, None).await.unwrap();
        store.mark_submitted("p1").await.unwrap();

        store.flag_photo("p1", "e1", "second", None, None).await.unwrap();
        let flag = store.photo_flag("p1").unwrap();
        assert_eq!(flag.reason, "second");
        assert!(!flag.submitted);
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let store = store();
        store.flag_photo("p1", "e1", "r", None, None).await.unwrap();
        store.flag_photo("p2", "e1", "r", None, None).await.unwrap();

        store.remove_flag("p1").await.unwrap();
        assert!(!store.is_flagged("p1"));
        assert!(store.is_flagged("p2"));

        store.clear_all().await;
        assert!(store.event_flags("e1").is_empty());
    }
}
