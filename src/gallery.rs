//! Gallery query engine.
//!
//! Joins one event's raw photo sequence with snapshots of the metadata
//! stores and derives the filtered, sorted projection the gallery
//! renders. The pipeline order is fixed: join → public-mode gate →
//! admin visibility filter → tag filter → rating filter → sort.
//!
//! Facet widgets are computed over the post-join, pre-filter visible
//! set, so the counts describe the event, not the active filter.

use crate::events::EventPhoto;
use photo_metadata::{HiddenPhoto, PhotoRating, PhotoTag, RatingStats, TagCount, TagStats};
use std::collections::HashMap;

/// Password gating the public gallery page.
///
/// A plain shared constant checked client-side; a convenience gate for
/// residents, not an authentication boundary.
pub const PUBLIC_GALLERY_PASSWORD: &str = "solhem2025";

/// A photo joined with its metadata
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoWithMeta {
    pub photo: EventPhoto,
    pub rating: Option<u8>,
    pub tags: Vec<String>,
    pub hidden: bool,
}

/// Whether the viewer is on the admin surface. Hidden photos are never
/// observable outside admin mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GalleryMode {
    #[default]
    Public,
    Admin,
}

/// Admin-only handling of hidden photos
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisibilityFilter {
    #[default]
    ExcludeHidden,
    IncludeAll,
    OnlyHidden,
}

/// Tag facet selector; `All` is the pass-through sentinel
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TagFilter {
    #[default]
    All,
    Tag(String),
}

/// Rating comparator. A photo with no rating never satisfies anything
/// but `Any` — unrated is not "rated zero".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RatingFilter {
    #[default]
    Any,
    Equal(u8),
    Greater(u8),
    Less(u8),
    GreaterEqual(u8),
    LessEqual(u8),
}

impl RatingFilter {
    fn matches(&self, rating: Option<u8>) -> bool {
        match (self, rating) {
            (RatingFilter::Any, _) => true,
            (_, None) => false,
            (RatingFilter::Equal(v), Some(r)) => r == *v,
            (RatingFilter::Greater(v), Some(r)) => r > *v,
            (RatingFilter::Less(v), Some(r)) => r < *v,
            (RatingFilter::GreaterEqual(v), Some(r)) => r >= *v,
            (RatingFilter::LessEqual(v), Some(r)) => r <= *v,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Stable input order
    #[default]
    Default,
    /// Descending rating, missing rating sorts as 0
    RatingHigh,
    /// Ascending rating, missing rating sorts as 0
    RatingLow,
    /// Descending tag count
    MostTagged,
}

/// Alternate renderings fed by the same projection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

/// One gallery filter configuration
#[derive(Debug, Clone, Default)]
pub struct GalleryQuery {
    pub mode: GalleryMode,
    pub visibility: VisibilityFilter,
    pub tag: TagFilter,
    pub rating: RatingFilter,
    pub sort: SortOrder,
}

/// Join photos with store snapshots and apply the public-mode gate.
///
/// The result is the "visible set" facets are computed over; in public
/// mode it already excludes every hidden photo.
pub fn join_photos(
    photos: &[EventPhoto],
    ratings: &HashMap<String, PhotoRating>,
    tags: &HashMap<String, PhotoTag>,
    hidden: &HashMap<String, HiddenPhoto>,
    mode: GalleryMode,
) -> Vec<PhotoWithMeta> {
    photos
        .iter()
        .map(|photo| PhotoWithMeta {
            rating: ratings.get(&photo.id).map(|r| r.rating),
            tags: tags.get(&photo.id).map(|t| t.tags.clone()).unwrap_or_default(),
            hidden: hidden.contains_key(&photo.id),
            photo: photo.clone(),
        })
        .filter(|p| mode == GalleryMode::Admin || !p.hidden)
        .collect()
}

impl GalleryQuery {
    /// Run the full pipeline over one event's photo sequence
    pub fn run(
        &self,
        photos: &[EventPhoto],
        ratings: &HashMap<String, PhotoRating>,
        tags: &HashMap<String, PhotoTag>,
        hidden: &HashMap<String, HiddenPhoto>,
    ) -> Vec<PhotoWithMeta> {
        let joined = join_photos(photos, ratings, tags, hidden, self.mode);
        self.filter_and_sort(joined)
    }

    /// Filter and sort an already-joined visible set
    pub fn filter_and_sort(&self, joined: Vec<PhotoWithMeta>) -> Vec<PhotoWithMeta> {
        let mut result: Vec<PhotoWithMeta> = joined
            .into_iter()
            .filter(|p| {
                // Visibility filter only exists on the admin surface
                if self.mode == GalleryMode::Admin {
                    match self.visibility {
                        VisibilityFilter::ExcludeHidden if p.hidden => return false,
                        VisibilityFilter::OnlyHidden if !p.hidden => return false,
                        _ => {}
                    }
                }
                if let TagFilter::Tag(tag) = &self.tag {
                    if !p.tags.iter().any(|t| t == tag) {
                        return false;
                    }
                }
                self.rating.matches(p.rating)
            })
            .collect();

        match self.sort {
            SortOrder::Default => {}
            SortOrder::RatingHigh => {
                result.sort_by(|a, b| b.rating.unwrap_or(0).cmp(&a.rating.unwrap_or(0)))
            }
            SortOrder::RatingLow => {
                result.sort_by(|a, b| a.rating.unwrap_or(0).cmp(&b.rating.unwrap_or(0)))
            }
            SortOrder::MostTagged => result.sort_by(|a, b| b.tags.len().cmp(&a.tags.len())),
        }
        result
    }
}

/// Facet counts for one event, computed over the visible set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventFacets {
    pub tag_stats: TagStats,
    pub rating_stats: RatingStats,
}

/// Compute facets from the post-join, pre-filter visible set
pub fn event_facets(visible: &[PhotoWithMeta]) -> EventFacets {
    let mut tag_counts: HashMap<String, usize> = HashMap::new();
    let mut total_tagged = 0usize;
    for photo in visible {
        if !photo.tags.is_empty() {
            total_tagged += 1;
        }
        for tag in &photo.tags {
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

    let mut rating_stats = RatingStats::default();
    let mut total_score = 0usize;
    for photo in visible {
        if let Some(rating) = photo.rating {
            *rating_stats.distribution.entry(rating).or_insert(0) += 1;
            rating_stats.total_ratings += 1;
            total_score += rating as usize;
        }
    }
    if rating_stats.total_ratings > 0 {
        rating_stats.average_rating = total_score as f64 / rating_stats.total_ratings as f64;
    }

    EventFacets {
        tag_stats: TagStats {
            total_tagged_photos: total_tagged,
            tag_counts,
            popular_tags,
        },
        rating_stats,
    }
}

/// Lightbox over the already-filtered-and-sorted sequence. Navigation
/// wraps at both ends so it stays consistent with the current view.
#[derive(Debug, Clone)]
pub struct Lightbox {
    photos: Vec<PhotoWithMeta>,
    index: usize,
}

impl Lightbox {
    /// `start` is clamped into range; an empty sequence yields `None`
    pub fn open(photos: Vec<PhotoWithMeta>, start: usize) -> Option<Self> {
        if photos.is_empty() {
            return None;
        }
        let index = start.min(photos.len() - 1);
        Some(Self { photos, index })
    }

    pub fn current(&self) -> &PhotoWithMeta {
        &self.photos[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        false // construction rejects empty sequences
    }

    pub fn next(&mut self) -> &PhotoWithMeta {
        self.index = if self.index == self.photos.len() - 1 {
            0
        } else {
            self.index + 1
        };
        self.current()
    }

    pub fn prev(&mut self) -> &PhotoWithMeta {
        self.index = if self.index == 0 {
            self.photos.len() - 1
        } else {
            self.index - 1
        };
        self.current()
    }

    pub fn jump_to(&mut self, index: usize) {
        self.index = index.min(self.photos.len() - 1);
    }
}
