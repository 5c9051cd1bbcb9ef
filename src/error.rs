use photo_metadata::StoreError;
use std::fmt;

/// Central error types for the archive application
#[derive(Debug)]
pub enum AppError {
    /// Configuration error (missing or malformed environment)
    Config(String),
    /// Metadata store error
    Store(StoreError),
    /// HTTP transport or upstream API error
    Http(String),
    /// JSON (de)serialization error
    Json(serde_json::Error),
    /// Filesystem error
    Io(std::io::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Store(e) => write!(f, "Store error: {}", e),
            AppError::Http(msg) => write!(f, "HTTP error: {}", msg),
            AppError::Json(e) => write!(f, "JSON error: {}", e),
            AppError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for AppError {}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Store(e)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Json(e)
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Io(e)
    }
}
