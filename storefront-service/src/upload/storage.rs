//! Object storage backends for uploaded files

use async_trait::async_trait;
use axum::body::Bytes;
use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors raised by an object storage backend
#[derive(Debug, Error)]
pub enum StorageError {
    /// Could not obtain credentials for the storage API
    #[error("storage credentials unavailable: {0}")]
    Credentials(String),

    /// Storage API rejected or failed the request
    #[error("storage request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Binary object storage with publicly readable objects
#[async_trait]
pub trait ObjectStorage: Send + Sync + 'static {
    /// Store `data` at `path`, readable by anyone
    async fn put_public(&self, path: &str, data: Bytes, content_type: &str)
        -> Result<(), StorageError>;

    /// Public URL of the object at `path`
    fn public_url(&self, path: &str) -> String;
}

/// Where the Cloud Storage client gets its OAuth access token
#[derive(Debug, Clone)]
pub enum TokenSource {
    /// A fixed token, e.g. from `gcloud auth print-access-token`
    Static(String),
    /// The GCE/Cloud Run metadata server of the default service account
    Metadata,
}

const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

#[derive(Deserialize)]
struct MetadataToken {
    access_token: String,
}

/// Google Cloud Storage through its JSON API
#[derive(Debug, Clone)]
pub struct GcsObjectStorage {
    http: reqwest::Client,
    bucket: String,
    upload_base_url: String,
    public_base_url: String,
    token: TokenSource,
}

impl GcsObjectStorage {
    pub fn new(
        http: reqwest::Client,
        bucket: impl Into<String>,
        upload_base_url: impl Into<String>,
        public_base_url: impl Into<String>,
        token: TokenSource,
    ) -> Self {
        Self {
            http,
            bucket: bucket.into(),
            upload_base_url: upload_base_url.into().trim_end_matches('/').to_string(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    async fn access_token(&self) -> Result<String, StorageError> {
        match &self.token {
            TokenSource::Static(token) => Ok(token.clone()),
            TokenSource::Metadata => {
                let response = self
                    .http
                    .get(METADATA_TOKEN_URL)
                    .header("Metadata-Flavor", "Google")
                    .send()
                    .await
                    .map_err(|e| StorageError::Credentials(e.to_string()))?
                    .error_for_status()
                    .map_err(|e| StorageError::Credentials(e.to_string()))?;
                let token: MetadataToken = response
                    .json()
                    .await
                    .map_err(|e| StorageError::Credentials(e.to_string()))?;
                Ok(token.access_token)
            }
        }
    }
}

#[async_trait]
impl ObjectStorage for GcsObjectStorage {
    async fn put_public(
        &self,
        path: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let token = self.access_token().await?;
        let url = format!("{}/b/{}/o", self.upload_base_url, self.bucket);

        self.http
            .post(url)
            .query(&[
                ("uploadType", "media"),
                ("name", path),
                ("predefinedAcl", "publicRead"),
            ])
            .bearer_auth(token)
            .header(http::header::CONTENT_TYPE, content_type)
            .body(data)
            .send()
            .await?
            .error_for_status()?;

        tracing::debug!(bucket = %self.bucket, path, "Stored object");
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}/{}", self.public_base_url, self.bucket, path)
    }
}

/// Object storage kept in process memory
#[derive(Debug, Default)]
pub struct MemoryObjectStorage {
    objects: RwLock<HashMap<String, (Bytes, String)>>,
}

impl MemoryObjectStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored bytes and content type of an object
    pub async fn object(&self, path: &str) -> Option<(Bytes, String)> {
        self.objects.read().await.get(path).cloned()
    }
}

#[async_trait]
impl ObjectStorage for MemoryObjectStorage {
    async fn put_public(
        &self,
        path: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError> {
        self.objects
            .write()
            .await
            .insert(path.to_string(), (data, content_type.to_string()));
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("memory://{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gcs_public_url() {
        let storage = GcsObjectStorage::new(
            reqwest::Client::new(),
            "shop.appspot.com",
            "https://storage.googleapis.com/upload/storage/v1/",
            "https://storage.googleapis.com/",
            TokenSource::Static("token".into()),
        );
        assert_eq!(
            storage.public_url("banner/abc_200x200.png"),
            "https://storage.googleapis.com/shop.appspot.com/banner/abc_200x200.png"
        );
    }

    #[tokio::test]
    async fn test_memory_storage_keeps_objects() {
        let storage = MemoryObjectStorage::new();
        storage
            .put_public("banner/a.png", Bytes::from_static(b"png"), "image/png")
            .await
            .unwrap();

        let (data, content_type) = storage.object("banner/a.png").await.unwrap();
        assert_eq!(&data[..], b"png");
        assert_eq!(content_type, "image/png");
        assert!(storage.object("banner/missing.png").await.is_none());
    }
}
