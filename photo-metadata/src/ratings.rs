//! Star ratings, one per photo, last write wins.

use crate::models::{PhotoRating, RatingStats};
use crate::remote::{now_timestamp, DataType, RemoteStore};
use crate::storage::LocalStore;
use crate::store::{MetadataStore, StoreError};
use std::collections::HashMap;
use std::sync::Arc;

pub struct RatingStore {
    inner: MetadataStore<PhotoRating>,
}

impl RatingStore {
    /// Local-only variant, mirrored into the storage medium
    pub fn local(medium: LocalStore) -> Self {
        Self {
            inner: MetadataStore::new_local(
                medium,
                DataType::Ratings.map_key(),
                DataType::Ratings.storage_key(),
            ),
        }
    }

    /// Server-synchronized variant with local fallback reads
    pub fn synced(remote: Arc<dyn RemoteStore>, fallback: LocalStore) -> Self {
        Self {
            inner: MetadataStore::new_synced(remote, DataType::Ratings, fallback),
        }
    }

    pub async fn load(&self) -> Result<(), StoreError> {
        self.inner.load().await
    }

    /// Rate a photo. The value is clamped into 1..=5 before storing.
    pub async fn rate_photo(
        &self,
        photo_id: &str,
        event_id: &str,
        rating: u8,
        comment: Option<String>,
    ) -> Result<(), StoreError> {
        self.inner
            .upsert(PhotoRating {
                photo_id: photo_id.to_string(),
                event_id: event_id.to_string(),
                rating: rating.clamp(1, 5),
                timestamp: now_timestamp(),
                comment,
            })
            .await
    }

    pub async fn remove_rating(&self, photo_id: &str) -> Result<(), StoreError> {
        self.inner.remove(photo_id).await
    }

    pub fn photo_rating(&self, photo_id: &str) -> Option<PhotoRating> {
        self.inner.get(photo_id)
    }

    pub fn event_ratings(&self, event_id: &str) -> Vec<PhotoRating> {
        self.inner.by_event(event_id)
    }

    /// Highest-rated photos of an event, descending, at most `limit`
    pub fn top_rated(&self, event_id: &str, limit: usize) -> Vec<(String, u8)> {
        let mut ratings = self.event_ratings(event_id);
        ratings.sort_by(|a, b| b.rating.cmp(&a.rating));
        ratings
            .into_iter()
            .take(limit)
            .map(|r| (r.photo_id, r.rating))
            .collect()
    }

    /// Average / total / per-star distribution for one event
    pub fn stats(&self, event_id: &str) -> RatingStats {
        let ratings = self.event_ratings(event_id);
        if ratings.is_empty() {
            return RatingStats::default();
        }

        let mut stats = RatingStats::default();
        let mut total_score = 0usize;
        for rating in &ratings {
            *stats.distribution.entry(rating.rating).or_insert(0) += 1;
            total_score += rating.rating as usize;
        }
        stats.total_ratings = ratings.len();
        stats.average_rating = total_score as f64 / ratings.len() as f64;
        stats
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

    pub fn snapshot(&self) -> Arc<HashMap<String, PhotoRating>> {
        self.inner.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> RatingStore {
        RatingStore::local(LocalStore::open_in_memory().unwrap())
    }

    #[tokio::test]
    async fn test_rating_clamped_into_range() {
        let store = store();
        store.rate_photo("low", "e1", 0, None).await.unwrap();
        store.rate_photo("high", "e1", 9, None).await.unwrap();
        store.rate_photo("ok", "e1", 3, None).await.unwrap();

        assert_eq!(store.photo_rating("low").unwrap().rating, 1);
        assert_eq!(store.photo_rating("high").unwrap().rating, 5);
        assert_eq!(store.photo_rating("ok").unwrap().rating, 3);
    }

    #[tokio::test]
    async fn test_stats_empty_event() {
        let store = store();
        let stats = store.stats("nothing");
        assert_eq!(stats.total_ratings, 0);
        assert_eq!(stats.average_rating, 0.0);
        assert_eq!(stats.distribution[&1], 0);
        assert_eq!(stats.distribution[&5], 0);
    }

    #[tokio::test]
    async fn test_stats_distribution_and_average() {
        let store = store();
        store.rate_photo("p1", "e1", 5, None).await.unwrap();
        store.rate_photo("p2", "e1", 5, None).await.unwrap();
        store.rate_photo("p3", "e1", 2, None).await.unwrap();
        store.rate_photo("px", "other", 1, None).await.unwrap();

        let stats = store.stats("e1");
        assert_eq!(stats.total_ratings, 3);
        assert_eq!(stats.distribution[&5], 2);
        assert_eq!(stats.distribution[&2], 1);
        assert_eq!(stats.distribution[&1], 0);
        assert!((stats.average_rating - 4.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_top_rated_orders_and_limits() {
        let store = store();
        store.rate_photo("p1", "e1", 3, None).await.unwrap();
        store.rate_photo("p2", "e1", 5, None).await.unwrap();
        store.rate_photo("p3", "e1", 4, None).await.unwrap();

        let top = store.top_rated("e1", 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0], ("p2".to_string(), 5));
        assert_eq!(top[1], ("p3".to_string(), 4));
    }
}
