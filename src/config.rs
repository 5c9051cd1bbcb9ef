//! Environment-driven application configuration.

use crate::error::AppError;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Where the data-store backend keeps its JSON documents
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    pub owner: String,
    pub repo: String,
    pub branch: String,
    pub token: String,
    /// Overridable for tests against a local stand-in
    pub api_base: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Listen address for the data-store service
    pub bind_addr: SocketAddr,
    /// Directory for the local storage medium
    pub data_dir: PathBuf,
    pub github: GitHubConfig,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

impl AppConfig {
    /// Read configuration from the environment. Only `GITHUB_TOKEN` is
    /// required; everything else has a default.
    pub fn from_env() -> Result<Self, AppError> {
        let token = env::var("GITHUB_TOKEN")
            .map_err(|_| AppError::Config("GITHUB_TOKEN environment variable is required".to_string()))?;

        let bind_addr = env_or("ARCHIVE_BIND_ADDR", "0.0.0.0:8888")
            .parse()
            .map_err(|e| AppError::Config(format!("invalid ARCHIVE_BIND_ADDR: {}", e)))?;

        Ok(Self {
            bind_addr,
            data_dir: PathBuf::from(env_or("ARCHIVE_DATA_DIR", "./data")),
            github: GitHubConfig {
                owner: env_or("ARCHIVE_REPO_OWNER", "solhem-mgmt"),
                repo: env_or("ARCHIVE_REPO_NAME", "solhem-digital-archive"),
                branch: env_or("ARCHIVE_REPO_BRANCH", "main"),
                token,
                api_base: env_or("ARCHIVE_GITHUB_API", "https://api.github.com"),
            },
        })
    }
}
