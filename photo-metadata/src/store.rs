//! Generic keyed-metadata store.
//!
//! One map from photo id to a record, with two persistence variants:
//! a local mirror into the key-value storage medium (fire-and-forget)
//! and server synchronization through a [`RemoteStore`], applied
//! optimistically with rollback on failure.
//!
//! Every mutation replaces the whole map reference, so readers holding
//! a snapshot never observe a partially-applied change.

use crate::models::PhotoRecord;
use crate::remote::{now_timestamp, DataType, RemoteStore, DOCUMENT_VERSION};
use crate::storage::LocalStore;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// Errors surfaced by store operations
#[derive(Debug)]
pub enum StoreError {
    /// Local storage medium error (rusqlite)
    Database(rusqlite::Error),
    /// Filesystem-level storage error
    Storage(String),
    /// Record (de)serialization error
    Serialization(serde_json::Error),
    /// Remote persistence failure (transport or server-side)
    Remote(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Database(e) => write!(f, "Database error: {}", e),
            StoreError::Storage(msg) => write!(f, "Storage error: {}", msg),
            StoreError::Serialization(e) => write!(f, "Serialization error: {}", e),
            StoreError::Remote(msg) => write!(f, "Remote error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e)
    }
}

/// How a store's map is persisted
pub enum Persistence {
    /// Mirror every state change into the local medium; no server round trip
    Local {
        medium: LocalStore,
        storage_key: String,
    },
    /// Save through the remote document store; the local medium is only
    /// a degraded read path when the initial load fails
    Server {
        remote: Arc<dyn RemoteStore>,
        data_type: DataType,
        fallback: LocalStore,
    },
}

/// Map of photo id → record with pluggable persistence
pub struct MetadataStore<R: PhotoRecord> {
    records: Mutex<Arc<HashMap<String, R>>>,
    map_key: &'static str,
    persistence: Persistence,
}

impl<R: PhotoRecord> MetadataStore<R> {
    /// Store persisted only into the local medium
    pub fn new_local(
        medium: LocalStore,
        map_key: &'static str,
        storage_key: impl Into<String>,
    ) -> Self {
        Self {
            records: Mutex::new(Arc::new(HashMap::new())),
            map_key,
            persistence: Persistence::Local {
                medium,
                storage_key: storage_key.into(),
            },
        }
    }

    /// Store synchronized through the remote document store, with the
    /// local medium as fallback read path
    pub fn new_synced(remote: Arc<dyn RemoteStore>, data_type: DataType, fallback: LocalStore) -> Self {
        Self {
            records: Mutex::new(Arc::new(HashMap::new())),
            map_key: data_type.map_key(),
            persistence: Persistence::Server {
                remote,
                data_type,
                fallback,
            },
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Arc<HashMap<String, R>>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn install(&self, map: Arc<HashMap<String, R>>) {
        *self.lock() = map;
    }

    /// Cheap consistent snapshot of the current map
    pub fn snapshot(&self) -> Arc<HashMap<String, R>> {
        self.lock().clone()
    }

    pub fn get(&self, photo_id: &str) -> Option<R> {
        self.snapshot().get(photo_id).cloned()
    }

    pub fn contains(&self, photo_id: &str) -> bool {
        self.snapshot().contains_key(photo_id)
    }

    /// Full-scan filter by event; fine for single-event map sizes
    pub fn by_event(&self, event_id: &str) -> Vec<R> {
        self.snapshot()
            .values()
            .filter(|r| r.event_id() == event_id)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    /// Optimistic mutation: apply locally, persist, roll back and
    /// re-raise when the persist fails.
    ///
    /// Two overlapping mutations to the same store are not serialized
    /// against each other; a late-failing save restores its own
    /// pre-mutation snapshot even if another mutation landed meanwhile.
    async fn mutate<F>(&self, apply: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut HashMap<String, R>),
    {
        let previous = self.snapshot();
        let mut next = (*previous).clone();
        apply(&mut next);
        let next = Arc::new(next);
        self.install(next.clone());

        if let Err(e) = self.persist(&next).await {
            self.install(previous);
            return Err(e);
        }
        Ok(())
    }

    /// Insert or replace the record for its photo id
    pub async fn upsert(&self, record: R) -> Result<(), StoreError> {
        self.mutate(|map| {
            map.insert(record.photo_id().to_string(), record);
        })
        .await
    }

    /// Insert or replace several records in one persisted step
    pub async fn upsert_many(&self, records: Vec<R>) -> Result<(), StoreError> {
        self.mutate(|map| {
            for record in records {
                map.insert(record.photo_id().to_string(), record);
            }
        })
        .await
    }

    /// Delete the record for `photo_id`; no-op when absent
    pub async fn remove(&self, photo_id: &str) -> Result<(), StoreError> {
        self.mutate(|map| {
            map.remove(photo_id);
        })
        .await
    }

    /// Delete records scoped to one event, or everything when `None`
    pub async fn remove_by_event(&self, event_id: Option<&str>) -> Result<(), StoreError> {
        self.mutate(|map| match event_id {
            None => map.clear(),
            Some(event_id) => map.retain(|_, r| r.event_id() != event_id),
        })
        .await
    }

    /// Modify the record in place when present; no-op otherwise
    pub async fn update<F>(&self, photo_id: &str, f: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut R),
    {
        self.mutate(|map| {
            if let Some(record) = map.get_mut(photo_id) {
                f(record);
            }
        })
        .await
    }

    /// Drop every record. The follow-up save is fire-and-forget: a
    /// persistence failure is logged, not rolled back.
    pub async fn clear_all(&self) {
        let empty = Arc::new(HashMap::new());
        self.install(empty.clone());
        if let Err(e) = self.persist(&empty).await {
            log::error!("failed to persist cleared '{}' map: {}", self.map_key, e);
        }
    }

    fn document_for(&self, map: &HashMap<String, R>) -> Result<Value, StoreError> {
        let mut doc = Map::new();
        doc.insert(self.map_key.to_string(), serde_json::to_value(map)?);
        Ok(Value::Object(doc))
    }

    async fn persist(&self, map: &HashMap<String, R>) -> Result<(), StoreError> {
        let document = self.document_for(map)?;
        match &self.persistence {
            Persistence::Local {
                medium,
                storage_key,
            } => {
                if let Err(e) = medium.put(storage_key, &document.to_string()) {
                    log::warn!("local mirror write for '{}' failed: {}", storage_key, e);
                }
                Ok(())
            }
            Persistence::Server {
                remote, data_type, ..
            } => remote.save(*data_type, document).await,
        }
    }

    fn map_from_document(&self, document: &Value) -> Result<HashMap<String, R>, StoreError> {
        match document.get(self.map_key) {
            Some(value) => Ok(serde_json::from_value(value.clone())?),
            None => Ok(HashMap::new()),
        }
    }

    /// Load the authoritative map.
    ///
    /// Server stores fetch from the remote document store and degrade
    /// to whatever the local medium holds when the fetch fails; local
    /// stores read the medium directly. A corrupt local document is
    /// logged and skipped rather than surfaced.
    pub async fn load(&self) -> Result<(), StoreError> {
        match &self.persistence {
            Persistence::Local {
                medium,
                storage_key,
            } => {
                if let Some(raw) = medium.get(storage_key)? {
                    match serde_json::from_str::<Value>(&raw)
                        .map_err(StoreError::from)
                        .and_then(|doc| self.map_from_document(&doc))
                    {
                        Ok(map) => self.install(Arc::new(map)),
                        Err(e) => {
                            log::warn!("discarding corrupt local '{}' document: {}", storage_key, e)
                        }
                    }
                }
                Ok(())
            }
            Persistence::Server {
                remote,
                data_type,
                fallback,
            } => {
                match remote.load(*data_type).await {
                    Ok(document) => {
                        let map = self.map_from_document(&document)?;
                        self.install(Arc::new(map));
                    }
                    Err(e) => {
                        log::error!("failed to load '{}' from server: {}", data_type, e);
                        if let Ok(Some(raw)) = fallback.get(data_type.storage_key()) {
                            match serde_json::from_str::<Value>(&raw)
                                .map_err(StoreError::from)
                                .and_then(|doc| self.map_from_document(&doc))
                            {
                                Ok(map) => {
                                    log::info!(
                                        "using local fallback for '{}' ({} records)",
                                        data_type,
                                        map.len()
                                    );
                                    self.install(Arc::new(map));
                                }
                                Err(e) => log::warn!(
                                    "local fallback for '{}' unreadable: {}",
                                    data_type,
                                    e
                                ),
                            }
                        }
                    }
                }
                Ok(())
            }
        }
    }

    /// Serialize the full map as a downloadable backup document
    pub fn export(&self) -> Result<String, StoreError> {
        let mut doc = Map::new();
        doc.insert("version".to_string(), Value::from(DOCUMENT_VERSION));
        doc.insert("exportDate".to_string(), Value::from(now_timestamp()));
        doc.insert(
            self.map_key.to_string(),
            serde_json::to_value(&*self.snapshot())?,
        );
        Ok(serde_json::to_string_pretty(&Value::Object(doc))?)
    }

    /// Replace the whole map from an exported document.
    ///
    /// Returns false and leaves state untouched when the payload is
    /// malformed or missing the version / expected map key. The
    /// follow-up save is fire-and-forget, like the original import.
    pub async fn import(&self, json_data: &str) -> bool {
        let parsed: Value = match serde_json::from_str(json_data) {
            Ok(v) => v,
            Err(e) => {
                log::error!("failed to parse imported '{}' document: {}", self.map_key, e);
                return false;
            }
        };
        let has_version = matches!(parsed.get("version"), Some(v) if !v.is_null());
        if !has_version || parsed.get(self.map_key).is_none() {
            return false;
        }
        let map: HashMap<String, R> = match self.map_from_document(&parsed) {
            Ok(map) => map,
            Err(e) => {
                log::error!("imported '{}' map is unreadable: {}", self.map_key, e);
                return false;
            }
        };
        let map = Arc::new(map);
        self.install(map.clone());
        if let Err(e) = self.persist(&map).await {
            log::error!("failed to persist imported '{}' map: {}", self.map_key, e);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PhotoRating;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn rating(photo_id: &str, event_id: &str, stars: u8) -> PhotoRating {
        PhotoRating {
            photo_id: photo_id.to_string(),
            event_id: event_id.to_string(),
            rating: stars,
            timestamp: now_timestamp(),
            comment: None,
        }
    }

    fn local_store() -> MetadataStore<PhotoRating> {
        MetadataStore::new_local(
            LocalStore::open_in_memory().unwrap(),
            "ratings",
            "photo-ratings",
        )
    }

    /// Remote fake that can be flipped into a failing state
    struct FlakyRemote {
        fail: AtomicBool,
        saved: Mutex<Option<Value>>,
    }

    impl FlakyRemote {
        fn new() -> Self {
            Self {
                fail: AtomicBool::new(false),
                saved: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl RemoteStore for FlakyRemote {
        async fn load(&self, data_type: DataType) -> Result<Value, StoreError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(StoreError::Remote("load refused".to_string()));
            }
            let saved = self.saved.lock().unwrap().clone();
            Ok(saved.unwrap_or_else(|| data_type.empty_document()))
        }

        async fn save(&self, _data_type: DataType, document: Value) -> Result<(), StoreError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(StoreError::Remote("save refused".to_string()));
            }
            *self.saved.lock().unwrap() = Some(document);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_upsert_get_by_event() {
        let store = local_store();
        store.upsert(rating("p1", "e1", 5)).await.unwrap();
        store.upsert(rating("p2", "e2", 3)).await.unwrap();

        assert_eq!(store.get("p1").unwrap().rating, 5);
        assert!(store.get("p3").is_none());
        let e1 = store.by_event("e1");
        assert_eq!(e1.len(), 1);
        assert_eq!(e1[0].photo_id, "p1");
    }

    #[tokio::test]
    async fn test_upsert_replaces_last_write_wins() {
        let store = local_store();
        store.upsert(rating("p1", "e1", 2)).await.unwrap();
        store.upsert(rating("p1", "e1", 4)).await.unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("p1").unwrap().rating, 4);
    }

    #[tokio::test]
    async fn test_remove_is_noop_when_absent() {
        let store = local_store();
        store.remove("ghost").await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_failed_save_rolls_back() {
        let remote = Arc::new(FlakyRemote::new());
        let store: MetadataStore<PhotoRating> = MetadataStore::new_synced(
            remote.clone(),
            DataType::Ratings,
            LocalStore::open_in_memory().unwrap(),
        );

        store.upsert(rating("p1", "e1", 5)).await.unwrap();
        let before = store.snapshot();

        remote.fail.store(true, Ordering::SeqCst);
        let err = store.upsert(rating("p2", "e1", 3)).await;
        assert!(err.is_err());

        // State equals the pre-mutation snapshot
        let after = store.snapshot();
        assert_eq!(after.len(), before.len());
        assert!(after.get("p2").is_none());
        assert_eq!(after.get("p1").unwrap().rating, 5);
    }

    #[tokio::test]
    async fn test_failed_remove_rolls_back() {
        let remote = Arc::new(FlakyRemote::new());
        let store: MetadataStore<PhotoRating> = MetadataStore::new_synced(
            remote.clone(),
            DataType::Ratings,
            LocalStore::open_in_memory().unwrap(),
        );
        store.upsert(rating("p1", "e1", 5)).await.unwrap();

        remote.fail.store(true, Ordering::SeqCst);
        assert!(store.remove("p1").await.is_err());
        assert_eq!(store.get("p1").unwrap().rating, 5);
    }

    #[tokio::test]
    async fn test_load_falls_back_to_local_medium() {
        let fallback = LocalStore::open_in_memory().unwrap();
        fallback
            .put(
                DataType::Ratings.storage_key(),
                r#"{"ratings":{"p9":{"photoId":"p9","eventId":"e1","rating":2,"timestamp":"t"}}}"#,
            )
            .unwrap();

        let remote = Arc::new(FlakyRemote::new());
        remote.fail.store(true, Ordering::SeqCst);
        let store: MetadataStore<PhotoRating> =
            MetadataStore::new_synced(remote, DataType::Ratings, fallback);

        store.load().await.unwrap();
        assert_eq!(store.get("p9").unwrap().rating, 2);
    }

    #[tokio::test]
    async fn test_export_import_roundtrip_is_identity() {
        let store = local_store();
        store.upsert(rating("p1", "e1", 5)).await.unwrap();
        store.upsert(rating("p2", "e1", 1)).await.unwrap();
        let before = store.snapshot();

        let exported = store.export().unwrap();
        assert!(store.import(&exported).await);

        let after = store.snapshot();
        assert_eq!(*after, *before);
    }

    #[tokio::test]
    async fn test_import_rejects_malformed_payloads() {
        let store = local_store();
        store.upsert(rating("p1", "e1", 5)).await.unwrap();

        assert!(!store.import("not json").await);
        assert!(!store.import(r#"{"ratings":{}}"#).await); // missing version
        assert!(!store.import(r#"{"version":"1.0","photoTags":{}}"#).await); // wrong map key

        // State untouched by failed imports
        assert_eq!(store.get("p1").unwrap().rating, 5);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_local_persist_survives_reload() {
        let medium = LocalStore::open_in_memory().unwrap();
        let store = MetadataStore::new_local(medium.clone(), "ratings", "photo-ratings");
        store.upsert(rating("p1", "e1", 3)).await.unwrap();

        let fresh: MetadataStore<PhotoRating> =
            MetadataStore::new_local(medium, "ratings", "photo-ratings");
        fresh.load().await.unwrap();
        assert_eq!(fresh.get("p1").unwrap().rating, 3);
    }
}
