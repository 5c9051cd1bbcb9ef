//! Data-store persistence service.
//!
//! Serves the `/data-store/{data_type}` façade the synchronized stores
//! talk to, backed by a [`ContentStore`]. GET of a never-written type
//! answers with the empty document template; PUT re-reads the current
//! revision for its SHA and commits the new document on top of it.

pub mod github;

use crate::error::AppError;
use axum::extract::{Path, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::{Json, Router};
use photo_metadata::DataType;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

pub use github::{ContentStore, GitHubContentStore, StoredDocument};

#[derive(Clone)]
pub struct ServerState {
    pub content: Arc<dyn ContentStore>,
}

/// Repository path of the JSON document backing one data type
pub fn data_file_path(data_type: DataType) -> &'static str {
    match data_type {
        DataType::Hidden => "data/hidden-photos.json",
        DataType::Ratings => "data/photo-ratings.json",
        DataType::Tags => "data/photo-tags.json",
        DataType::Flags => "data/flagged-photos.json",
    }
}

pub fn router(state: ServerState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/data-store/{data_type}", any(handle_data_store))
        .layer(cors)
        .with_state(state)
}

fn error_body(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

async fn handle_data_store(
    State(state): State<ServerState>,
    Path(data_type): Path<String>,
    method: Method,
    body: Option<Json<Value>>,
) -> Response {
    let Some(data_type) = DataType::parse(&data_type) else {
        return error_body(
            StatusCode::BAD_REQUEST,
            format!("Invalid data type: {}", data_type),
        );
    };

    match method {
        Method::GET => get_document(&state, data_type).await,
        Method::PUT => {
            let Some(Json(document)) = body else {
                return error_body(
                    StatusCode::BAD_REQUEST,
                    "Request body must be JSON".to_string(),
                );
            };
            put_document(&state, data_type, document).await
        }
        // CORS preflight
        Method::OPTIONS => StatusCode::OK.into_response(),
        _ => error_body(
            StatusCode::METHOD_NOT_ALLOWED,
            "Method not allowed".to_string(),
        ),
    }
}

async fn get_document(state: &ServerState, data_type: DataType) -> Response {
    match state.content.load(data_file_path(data_type)).await {
        Ok(Some(document)) => match serde_json::from_str::<Value>(&document.content) {
            Ok(value) => Json(value).into_response(),
            Err(e) => {
                log::error!("Stored {} document is not valid JSON: {}", data_type, e);
                error_body(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Stored {} document is corrupt", data_type),
                )
            }
        },
        // A file that was never written reads as the empty template
        Ok(None) => Json(data_type.empty_document()).into_response(),
        Err(e) => {
            log::error!("Failed to load {} document: {}", data_type, e);
            error_body(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to load {} data", data_type),
            )
        }
    }
}

async fn put_document(state: &ServerState, data_type: DataType, document: Value) -> Response {
    let path = data_file_path(data_type);

    // Current revision's SHA, required for updating an existing file.
    // A failed read is treated as "no file yet" and left for the
    // commit itself to reject.
    let sha = match state.content.load(path).await {
        Ok(Some(existing)) => Some(existing.sha),
        Ok(None) => None,
        Err(e) => {
            log::warn!("Could not read current {} revision: {}", data_type, e);
            None
        }
    };

    let content = match serde_json::to_string_pretty(&document) {
        Ok(content) => content,
        Err(e) => {
            return error_body(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to serialize document: {}", e),
            )
        }
    };

    let message = format!("Update {} data via Netlify Function", data_type);
    match state
        .content
        .save(path, &content, sha.as_deref(), &message)
        .await
    {
        Ok(()) => Json(json!({
            "success": true,
            "message": format!("{} data updated", data_type),
        }))
        .into_response(),
        Err(e) => {
            log::error!("Failed to save {} document: {}", data_type, e);
            error_body(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to save {} data", data_type),
            )
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error_body(StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
    }
}
