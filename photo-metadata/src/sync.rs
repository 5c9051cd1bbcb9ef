//! HTTP client for the data-store façade.
//!
//! Speaks the `GET/PUT /data-store/{data_type}` contract. Saves wrap the
//! partial document in a versioned envelope before sending.

use crate::remote::{now_timestamp, DataType, RemoteStore, DOCUMENT_VERSION};
use crate::store::StoreError;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Configuration for the façade client
#[derive(Debug, Clone)]
pub struct DataApiConfig {
    /// Base URL of the functions host, e.g.
    /// `https://example.netlify.app/.netlify/functions`
    pub base_url: String,
}

/// Typed client for the serverless data store
pub struct DataApi {
    config: DataApiConfig,
    client: reqwest::Client,
}

impl DataApi {
    pub fn new(config: DataApiConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, data_type: DataType) -> String {
        format!(
            "{}/data-store/{}",
            self.config.base_url.trim_end_matches('/'),
            data_type
        )
    }

    /// Fetch the full stored document; any non-2xx status is an error
    pub async fn get(&self, data_type: DataType) -> Result<Value, StoreError> {
        let response = self
            .client
            .get(self.url(data_type))
            .send()
            .await
            .map_err(|e| StoreError::Remote(format!("fetch {} failed: {}", data_type, e)))?;

        if !response.status().is_success() {
            return Err(StoreError::Remote(format!(
                "fetch {} failed: {}",
                data_type,
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| StoreError::Remote(format!("decode {} failed: {}", data_type, e)))
    }

    /// Overwrite the stored document. `partial` carries the map fields;
    /// the envelope (`version`, `lastUpdated`) is added here.
    pub async fn save(&self, data_type: DataType, partial: Value) -> Result<(), StoreError> {
        let mut envelope = Map::new();
        envelope.insert("version".to_string(), Value::from(DOCUMENT_VERSION));
        envelope.insert("lastUpdated".to_string(), Value::from(now_timestamp()));
        if let Value::Object(fields) = partial {
            for (key, value) in fields {
                envelope.insert(key, value);
            }
        }

        let response = self
            .client
            .put(self.url(data_type))
            .json(&Value::Object(envelope))
            .send()
            .await
            .map_err(|e| StoreError::Remote(format!("save {} failed: {}", data_type, e)))?;

        if !response.status().is_success() {
            return Err(StoreError::Remote(format!(
                "save {} failed: {}",
                data_type,
                response.status()
            )));
        }

        log::debug!("{} saved to data store", data_type);
        Ok(())
    }

    /// Probe whether the data store function is deployed at all
    pub async fn health_check(&self) -> bool {
        match self.client.get(self.url(DataType::Hidden)).send().await {
            Ok(response) => response.status() != reqwest::StatusCode::NOT_FOUND,
            Err(_) => false,
        }
    }
}

#[async_trait]
impl RemoteStore for DataApi {
    async fn load(&self, data_type: DataType) -> Result<Value, StoreError> {
        self.get(data_type).await
    }

    async fn save(&self, data_type: DataType, document: Value) -> Result<(), StoreError> {
        DataApi::save(self, data_type, document).await
    }
}
