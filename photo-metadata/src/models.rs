use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A record that can live in a metadata store, keyed by photo id and
/// scoped to a single event.
pub trait PhotoRecord: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    fn photo_id(&self) -> &str;
    fn event_id(&self) -> &str;
}

/// Star rating attached to a photo (1-5, last write wins)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoRating {
    pub photo_id: String,
    pub event_id: String,
    pub rating: u8,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl PhotoRecord for PhotoRating {
    fn photo_id(&self) -> &str {
        &self.photo_id
    }
    fn event_id(&self) -> &str {
        &self.event_id
    }
}

/// Tag set attached to a photo (de-duplicated on write)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoTag {
    pub photo_id: String,
    pub event_id: String,
    pub tags: Vec<String>,
    pub timestamp: String,
}

impl PhotoRecord for PhotoTag {
    fn photo_id(&self) -> &str {
        &self.photo_id
    }
    fn event_id(&self) -> &str {
        &self.event_id
    }
}

/// Presence of this record means the photo is hidden from galleries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HiddenPhoto {
    pub photo_id: String,
    pub event_id: String,
    pub hidden_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl PhotoRecord for HiddenPhoto {
    fn photo_id(&self) -> &str {
        &self.photo_id
    }
    fn event_id(&self) -> &str {
        &self.event_id
    }
}

/// Presence of this record means the photo is part of the event's
/// unauthenticated public gallery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicPhoto {
    pub photo_id: String,
    pub event_id: String,
    pub added_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub added_by: Option<String>,
}

impl PhotoRecord for PublicPhoto {
    fn photo_id(&self) -> &str {
        &self.photo_id
    }
    fn event_id(&self) -> &str {
        &self.event_id
    }
}

/// Moderation report against a photo.
///
/// `submitted` tracks whether the report has additionally been forwarded
/// to the external form-capture endpoint; the local record exists either way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlaggedPhoto {
    pub photo_id: String,
    pub event_id: String,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reporter_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reporter_name: Option<String>,
    pub flagged_at: String,
    pub submitted: bool,
}

impl PhotoRecord for FlaggedPhoto {
    fn photo_id(&self) -> &str {
        &self.photo_id
    }
    fn event_id(&self) -> &str {
        &self.event_id
    }
}

/// Aggregate rating statistics for one event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingStats {
    pub average_rating: f64,
    pub total_ratings: usize,
    /// Count per star value, always populated for 1..=5
    pub distribution: HashMap<u8, usize>,
}

impl Default for RatingStats {
    fn default() -> Self {
        Self {
            average_rating: 0.0,
            total_ratings: 0,
            distribution: (1..=5).map(|star| (star, 0)).collect(),
        }
    }
}

/// Aggregate tag statistics for one event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagStats {
    pub total_tagged_photos: usize,
    pub tag_counts: HashMap<String, usize>,
    /// Top tags by count, descending, at most ten entries
    pub popular_tags: Vec<TagCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

/// Fixed tag vocabulary grouped by category.
///
/// Tags outside the catalog are storable but not offered through the
/// discovery facets.
pub const TAG_CATEGORIES: [(&str, &[&str]); 6] = [
    ("people", &["Family", "Kids", "Friends", "Crowd", "Portrait"]),
    ("animals", &["Dog", "Cat", "Pet", "Wildlife"]),
    ("food", &["Food", "Food Truck", "Drinks", "Dessert", "BBQ"]),
    (
        "location",
        &["Building", "Rooftop", "Pool", "Garden", "Indoor", "Outdoor"],
    ),
    ("activities", &["Games", "Music", "Dancing", "Sports", "Art"]),
    ("mood", &["Fun", "Candid", "Formal", "Sunset", "Night"]),
];

/// Every catalog tag across all categories, in catalog order
pub fn all_tags() -> Vec<&'static str> {
    TAG_CATEGORIES
        .iter()
        .flat_map(|(_, tags)| tags.iter().copied())
        .collect()
}

/// Whether a tag belongs to the fixed catalog
pub fn is_catalog_tag(tag: &str) -> bool {
    TAG_CATEGORIES
        .iter()
        .any(|(_, tags)| tags.contains(&tag))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_tags_unique() {
        let tags = all_tags();
        let mut seen = std::collections::HashSet::new();
        for tag in &tags {
            assert!(seen.insert(*tag), "duplicate catalog tag: {}", tag);
        }
        assert_eq!(tags.len(), 30);
    }

    #[test]
    fn test_is_catalog_tag() {
        assert!(is_catalog_tag("Rooftop"));
        assert!(is_catalog_tag("Food Truck"));
        assert!(!is_catalog_tag("rooftop"));
        assert!(!is_catalog_tag("Llama"));
    }

    #[test]
    fn test_rating_serializes_camel_case() {
        let rating = PhotoRating {
            photo_id: "fred-2025-001".to_string(),
            event_id: "fred-2025".to_string(),
            rating: 4,
            timestamp: "2025-06-21T12:00:00.000Z".to_string(),
            comment: None,
        };
        let json = serde_json::to_value(&rating).unwrap();
        assert_eq!(json["photoId"], "fred-2025-001");
        assert_eq!(json["eventId"], "fred-2025");
        assert!(json.get("comment").is_none());
    }
}
