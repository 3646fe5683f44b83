use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::Owner;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Rejected(String),
}

#[derive(Debug, Deserialize)]
struct StorageErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Object storage for chart images, addressed through the managed
/// backend's storage REST surface.
#[derive(Debug, Clone)]
pub struct ChartStorage {
    http: Client,
    base_url: String,
    bucket: String,
    service_key: Option<String>,
    max_bytes: usize,
}

impl ChartStorage {
    pub fn new(
        http: Client,
        base_url: String,
        bucket: String,
        service_key: Option<String>,
        max_bytes: usize,
    ) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            bucket,
            service_key,
            max_bytes,
        }
    }

    /// Largest accepted upload, in bytes.
    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Fresh key scoped under the owner's prefix: `{owner}/{uuid}.{ext}`.
    pub fn object_key(owner: Owner, extension: &str) -> String {
        format!("{owner}/{}.{extension}", Uuid::new_v4())
    }

    /// Upload an object (never overwriting) and return its public URL.
    pub async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let url = format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, key);

        let mut req = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .body(bytes);
        if let Some(service_key) = &self.service_key {
            req = req.bearer_auth(service_key).header("apikey", service_key);
        }

        let resp = req.send().await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let message = resp
                .json::<StorageErrorBody>()
                .await
                .ok()
                .and_then(|b| b.message.or(b.error))
                .unwrap_or_else(|| format!("storage responded with {status}"));
            return Err(StorageError::Rejected(message));
        }

        tracing::debug!(bucket = %self.bucket, key, "Chart image stored");
        Ok(self.public_url(key))
    }

    pub fn public_url(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, key
        )
    }
}
