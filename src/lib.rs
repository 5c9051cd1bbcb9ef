//! # Solhem Archive
//!
//! Core of the resident event-photo archive: event catalog access,
//! gallery querying over the metadata stores, bulk admin edits, flag
//! reporting, and the data-store persistence service backed by a
//! GitHub repository.
//!
//! The metadata stores themselves live in the `photo-metadata` crate;
//! this crate wires them to events and exposes the HTTP surface.

pub mod bulk;
pub mod config;
pub mod error;
pub mod events;
pub mod gallery;
pub mod moderation;
pub mod server;

pub use bulk::{apply_bulk_edit, BulkEdit, BulkOutcome, PublicChange, VisibilityChange};
pub use config::{AppConfig, GitHubConfig};
pub use error::AppError;
pub use events::{EventCatalog, EventPhoto, EventSource, EventYear, PropertyEvent};
pub use gallery::{
    event_facets, join_photos, EventFacets, GalleryMode, GalleryQuery, Lightbox, PhotoWithMeta,
    RatingFilter, SortOrder, TagFilter, ViewMode, VisibilityFilter, PUBLIC_GALLERY_PASSWORD,
};
pub use moderation::{FlagReport, FlagReporter, SubmitStatus};
pub use server::{data_file_path, router, ContentStore, GitHubContentStore, ServerState, StoredDocument};
