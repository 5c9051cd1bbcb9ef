//! GitHub contents-API backend for the data-store service.
//!
//! Documents live as JSON files in a repository; each save is a commit
//! through `PUT /repos/{owner}/{repo}/contents/{path}`. The file's
//! blob SHA doubles as the optimistic-concurrency token: updates must
//! present the SHA of the revision they read, and GitHub rejects the
//! commit when it no longer matches.

use crate::config::GitHubConfig;
use crate::error::AppError;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Deserialize;
use serde_json::json;

/// A stored document revision
#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub content: String,
    /// Revision token to present on the next save
    pub sha: String,
}

/// Persistence backend for the data-store service
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Fetch a document; `None` when the path does not exist yet
    async fn load(&self, path: &str) -> Result<Option<StoredDocument>, AppError>;

    /// Commit a document. `sha` must be the revision read beforehand,
    /// or `None` when creating the file.
    async fn save(
        &self,
        path: &str,
        content: &str,
        sha: Option<&str>,
        message: &str,
    ) -> Result<(), AppError>;
}

#[derive(Deserialize)]
struct ContentsResponse {
    content: String,
    sha: String,
}

pub struct GitHubContentStore {
    config: GitHubConfig,
    client: reqwest::Client,
}

impl GitHubContentStore {
    pub fn new(config: GitHubConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn contents_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.config.api_base, self.config.owner, self.config.repo, path
        )
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("Authorization", format!("Bearer {}", self.config.token))
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "solhem-archive")
    }
}

#[async_trait]
impl ContentStore for GitHubContentStore {
    async fn load(&self, path: &str) -> Result<Option<StoredDocument>, AppError> {
        let url = format!("{}?ref={}", self.contents_url(path), self.config.branch);
        let response = self
            .request(self.client.get(&url))
            .send()
            .await
            .map_err(|e| AppError::Http(format!("contents fetch failed: {}", e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(AppError::Http(format!(
                "contents fetch returned {}",
                response.status()
            )));
        }

        let body: ContentsResponse = response
            .json()
            .await
            .map_err(|e| AppError::Http(format!("malformed contents response: {}", e)))?;

        // The API wraps base64 at 60 columns
        let encoded: String = body.content.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = BASE64
            .decode(encoded.as_bytes())
            .map_err(|e| AppError::Http(format!("invalid base64 content: {}", e)))?;
        let content = String::from_utf8(bytes)
            .map_err(|e| AppError::Http(format!("non-UTF-8 content: {}", e)))?;

        Ok(Some(StoredDocument {
            content,
            sha: body.sha,
        }))
    }

    async fn save(
        &self,
        path: &str,
        content: &str,
        sha: Option<&str>,
        message: &str,
    ) -> Result<(), AppError> {
        let mut body = json!({
            "message": message,
            "content": BASE64.encode(content.as_bytes()),
            "branch": self.config.branch,
        });
        if let Some(sha) = sha {
            body["sha"] = json!(sha);
        }

        let response = self
            .request(self.client.put(self.contents_url(path)))
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Http(format!("contents commit failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Http(format!(
                "contents commit returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contents_url_shape() {
        let store = GitHubContentStore::new(GitHubConfig {
            owner: "solhem-mgmt".to_string(),
            repo: "solhem-digital-archive".to_string(),
            branch: "main".to_string(),
            token: "t".to_string(),
            api_base: "https://api.github.com".to_string(),
        });
        assert_eq!(
            store.contents_url("data/photo-ratings.json"),
            "https://api.github.com/repos/solhem-mgmt/solhem-digital-archive/contents/data/photo-ratings.json"
        );
    }
}
