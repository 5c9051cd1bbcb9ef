//! # Photo Metadata
//!
//! Keyed per-photo metadata stores for event galleries: ratings, tags,
//! hidden/public visibility sets and moderation flags.
//!
//! All five stores share one generic map component with pluggable
//! persistence:
//! - **local**: mutations are mirrored into a SQLite key-value medium,
//!   fire-and-forget
//! - **server-synchronized**: mutations are applied optimistically and
//!   saved through a remote document store; a failed save rolls the
//!   in-memory state back and re-raises, and the local medium serves as
//!   a degraded read path when the initial load fails
//!
//! The `sync` feature adds the reqwest-based client for the
//! `/data-store/{data_type}` façade.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use photo_metadata::{LocalStore, RatingStore};
//!
//! let medium = LocalStore::open("./data/metadata.db")?;
//! let ratings = RatingStore::local(medium);
//! ratings.rate_photo("fred-2025-001", "fred-2025", 5, None).await?;
//! ```

pub mod flags;
pub mod hidden;
pub mod models;
pub mod public;
pub mod ratings;
pub mod remote;
pub mod storage;
pub mod store;
pub mod tags;

#[cfg(feature = "sync")]
pub mod sync;

pub use flags::FlagStore;
pub use hidden::HiddenStore;
pub use models::{
    all_tags, is_catalog_tag, FlaggedPhoto, HiddenPhoto, PhotoRating, PhotoRecord, PhotoTag,
    PublicPhoto, RatingStats, TagCount, TagStats, TAG_CATEGORIES,
};
pub use public::PublicStore;
pub use ratings::RatingStore;
pub use remote::{now_timestamp, DataType, RemoteStore, DOCUMENT_VERSION};
pub use storage::LocalStore;
pub use store::{MetadataStore, Persistence, StoreError};
pub use tags::TagStore;

#[cfg(feature = "sync")]
pub use sync::{DataApi, DataApiConfig};
