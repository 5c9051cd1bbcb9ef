//! Integration tests for the data-store persistence service.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use http_body_util::BodyExt;
use photo_metadata::{DataType, DOCUMENT_VERSION};
use serde_json::{json, Value};
use solhem_archive::{router, AppError, ContentStore, ServerState, StoredDocument};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::Arc;
use tower::ServiceExt;

/// In-memory stand-in for the repository contents API. Each save bumps
/// a revision counter that doubles as the SHA, and saves presenting a
/// stale SHA are rejected the way the real API rejects them.
#[derive(Default)]
struct InMemoryContentStore {
    files: Mutex<HashMap<String, (String, u64)>>,
}

impl InMemoryContentStore {
    fn revision(&self, path: &str) -> Option<u64> {
        self.files.lock().unwrap().get(path).map(|(_, rev)| *rev)
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn load(&self, path: &str) -> Result<Option<StoredDocument>, AppError> {
        Ok(self.files.lock().unwrap().get(path).map(|(content, rev)| {
            StoredDocument {
                content: content.clone(),
                sha: format!("rev-{}", rev),
            }
        }))
    }

    async fn save(
        &self,
        path: &str,
        content: &str,
        sha: Option<&str>,
        _message: &str,
    ) -> Result<(), AppError> {
        let mut files = self.files.lock().unwrap();
        match files.get(path).map(|(_, rev)| *rev) {
            Some(rev) => {
                let expected = format!("rev-{}", rev);
                if sha != Some(expected.as_str()) {
                    return Err(AppError::Http("contents commit returned 409 Conflict".to_string()));
                }
                files.insert(path.to_string(), (content.to_string(), rev + 1));
            }
            None => {
                if sha.is_some() {
                    return Err(AppError::Http("contents commit returned 422".to_string()));
                }
                files.insert(path.to_string(), (content.to_string(), 1));
            }
        }
        Ok(())
    }
}

fn app() -> (axum::Router, Arc<InMemoryContentStore>) {
    let content = Arc::new(InMemoryContentStore::default());
    let state = ServerState {
        content: content.clone(),
    };
    (router(state), content)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn put_request(data_type: &str, document: &Value) -> Request<Body> {
    Request::builder()
        .method(Method::PUT)
        .uri(format!("/data-store/{}", data_type))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(document.to_string()))
        .unwrap()
}

fn get_request(data_type: &str) -> Request<Body> {
    Request::builder()
        .uri(format!("/data-store/{}", data_type))
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_unknown_data_type_rejected() {
    let (app, _) = app();
    let response = app.oneshot(get_request("passwords")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Invalid data type: passwords");
}

#[tokio::test]
async fn test_get_missing_document_returns_empty_template() {
    let (app, _) = app();
    let response = app.oneshot(get_request("ratings")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["version"], DOCUMENT_VERSION);
    assert!(body["lastUpdated"].is_string());
    assert!(body["ratings"].as_object().unwrap().is_empty());
}

#[tokio::test]
async fn test_put_then_get_roundtrip() {
    let (app, _) = app();
    let document = json!({
        "version": DOCUMENT_VERSION,
        "lastUpdated": "2025-06-21T12:00:00.000Z",
        "hiddenPhotos": {
            "fred-2025-003": {
                "photoId": "fred-2025-003",
                "eventId": "fred-2025",
                "hiddenAt": "2025-06-21T12:00:00.000Z"
            }
        }
    });

    let response = app
        .clone()
        .oneshot(put_request("hidden", &document))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "hidden data updated");

    let response = app.oneshot(get_request("hidden")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body, document);
}

#[tokio::test]
async fn test_put_updates_existing_revision() {
    let (app, content) = app();
    let path = "data/photo-tags.json";

    let first = json!({ "version": "1.0", "photoTags": {} });
    let response = app
        .clone()
        .oneshot(put_request("tags", &first))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(content.revision(path), Some(1));

    // Second PUT must pick up the current SHA and commit on top of it
    let second = json!({
        "version": "1.0",
        "photoTags": { "p1": { "photoId": "p1", "eventId": "e1", "tags": ["Dog"] } }
    });
    let response = app
        .clone()
        .oneshot(put_request("tags", &second))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(content.revision(path), Some(2));
}

#[tokio::test]
async fn test_save_failure_surfaces_as_server_error() {
    struct RejectingStore;

    #[async_trait]
    impl ContentStore for RejectingStore {
        async fn load(&self, _path: &str) -> Result<Option<StoredDocument>, AppError> {
            Ok(None)
        }
        async fn save(
            &self,
            _path: &str,
            _content: &str,
            _sha: Option<&str>,
            _message: &str,
        ) -> Result<(), AppError> {
            Err(AppError::Http("contents commit returned 409 Conflict".to_string()))
        }
    }

    let app = router(ServerState {
        content: Arc::new(RejectingStore),
    });
    let response = app
        .oneshot(put_request("flags", &json!({ "flaggedPhotos": {} })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Failed to save flags data");
}

#[tokio::test]
async fn test_post_not_allowed() {
    let (app, _) = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/data-store/ratings")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Method not allowed");
}

#[tokio::test]
async fn test_options_preflight_ok() {
    let (app, _) = app();
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/data-store/ratings")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_every_data_type_has_a_distinct_file() {
    let (app, content) = app();
    for dt in DataType::ALL {
        let response = app
            .clone()
            .oneshot(put_request(dt.as_str(), &dt.empty_document()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{}", dt);
    }
    assert_eq!(content.files.lock().unwrap().len(), 4);
}
