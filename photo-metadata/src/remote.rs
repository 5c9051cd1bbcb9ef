//! Wire contract shared by the façade client and the data-store backend.

use crate::store::StoreError;
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};
use std::fmt;

/// Document format version written into every envelope
pub const DOCUMENT_VERSION: &str = "1.0";

/// The fixed set of documents the data store knows about.
///
/// Each variant maps 1:1 to one JSON file in the backing repository and
/// to one top-level map key inside that file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Hidden,
    Ratings,
    Tags,
    Flags,
}

impl DataType {
    pub const ALL: [DataType; 4] = [
        DataType::Hidden,
        DataType::Ratings,
        DataType::Tags,
        DataType::Flags,
    ];

    /// Path segment used in `/data-store/{data_type}` URLs
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Hidden => "hidden",
            DataType::Ratings => "ratings",
            DataType::Tags => "tags",
            DataType::Flags => "flags",
        }
    }

    pub fn parse(s: &str) -> Option<DataType> {
        DataType::ALL.into_iter().find(|dt| dt.as_str() == s)
    }

    /// Top-level map key inside the stored document
    pub fn map_key(&self) -> &'static str {
        match self {
            DataType::Hidden => "hiddenPhotos",
            DataType::Ratings => "ratings",
            DataType::Tags => "photoTags",
            DataType::Flags => "flaggedPhotos",
        }
    }

    /// Key the matching store uses in the local storage medium
    pub fn storage_key(&self) -> &'static str {
        match self {
            DataType::Hidden => "hidden-photos",
            DataType::Ratings => "photo-ratings",
            DataType::Tags => "photo-tags",
            DataType::Flags => "flagged-photos-storage",
        }
    }

    /// Document returned when nothing has been stored yet.
    ///
    /// Absence is not an error: a missing file reads as an empty map.
    pub fn empty_document(&self) -> Value {
        json!({
            "version": DOCUMENT_VERSION,
            "lastUpdated": now_timestamp(),
            self.map_key(): {},
        })
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ISO-8601 UTC timestamp with millisecond precision, matching the
/// format the stored documents already use
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Remote document store the server-synchronized stores persist through.
///
/// The production implementation is the HTTP façade client in
/// [`crate::sync`]; tests substitute in-memory fakes.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetch the full stored document for `data_type`
    async fn load(&self, data_type: DataType) -> Result<Value, StoreError>;

    /// Overwrite the stored document for `data_type` with `document`
    /// (a partial document; the transport wraps it in an envelope)
    async fn save(&self, data_type: DataType, document: Value) -> Result<(), StoreError>;
}
