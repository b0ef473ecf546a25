use axum::body::Bytes;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use super::image::ImageType;
use super::storage::{ObjectStorage, StorageError};

/// Reasons an upload is refused or fails
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Missing required field: type")]
    MissingType,

    #[error("Invalid upload type: use only letters, digits, '-' and '_'")]
    InvalidUploadType,

    #[error("Missing required field: file")]
    MissingFile,

    #[error("Invalid file type. Allowed types: jpeg, png, gif, webp, svg")]
    UnsupportedImage,

    #[error("File too large: maximum size is {max_bytes} bytes")]
    TooLarge { max_bytes: usize },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Location of a stored upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    pub id: String,
    /// Public URL of the resized rendition
    pub url: String,
    #[serde(rename = "type")]
    pub upload_type: String,
}

/// Validates uploads and writes them to object storage
#[derive(Clone)]
pub struct UploadService {
    storage: Arc<dyn ObjectStorage>,
    resized_suffix: String,
    max_bytes: usize,
}

impl UploadService {
    pub fn new(storage: Arc<dyn ObjectStorage>, resized_suffix: impl Into<String>, max_bytes: usize) -> Self {
        Self {
            storage,
            resized_suffix: resized_suffix.into(),
            max_bytes,
        }
    }

    /// Largest accepted file, in bytes
    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Store an image under `{upload_type}/{id}{ext}`
    pub async fn upload_image(
        &self,
        data: Bytes,
        content_type: &str,
        upload_type: &str,
    ) -> Result<UploadResult, UploadError> {
        if upload_type.is_empty() {
            return Err(UploadError::MissingType);
        }
        if !upload_type
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(UploadError::InvalidUploadType);
        }
        let image = ImageType::from_content_type(content_type).ok_or(UploadError::UnsupportedImage)?;
        if data.len() > self.max_bytes {
            return Err(UploadError::TooLarge {
                max_bytes: self.max_bytes,
            });
        }

        let id = uuid::Uuid::new_v4().to_string();
        let ext = image.extension();
        let object_path = format!("{upload_type}/{id}{ext}");

        self.storage
            .put_public(&object_path, data, image.content_type())
            .await?;

        let resized_path = format!("{upload_type}/{id}{}{ext}", self.resized_suffix);
        tracing::info!(path = %object_path, "Uploaded image");

        Ok(UploadResult {
            url: self.storage.public_url(&resized_path),
            id,
            upload_type: upload_type.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::MemoryObjectStorage;

    fn service(storage: Arc<MemoryObjectStorage>) -> UploadService {
        UploadService::new(storage, "_200x200", 16)
    }

    #[tokio::test]
    async fn test_stores_original_and_links_resized() {
        let storage = Arc::new(MemoryObjectStorage::new());
        let result = service(storage.clone())
            .upload_image(Bytes::from_static(b"png-bytes"), "image/png", "banner")
            .await
            .unwrap();

        assert_eq!(result.upload_type, "banner");
        assert_eq!(
            result.url,
            format!("memory://banner/{}_200x200.png", result.id)
        );
        let (data, content_type) = storage
            .object(&format!("banner/{}.png", result.id))
            .await
            .unwrap();
        assert_eq!(&data[..], b"png-bytes");
        assert_eq!(content_type, "image/png");
    }

    #[tokio::test]
    async fn test_rejects_unsupported_content_type() {
        let storage = Arc::new(MemoryObjectStorage::new());
        let err = service(storage)
            .upload_image(Bytes::from_static(b"%PDF"), "application/pdf", "banner")
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::UnsupportedImage));
        assert_eq!(
            err.to_string(),
            "Invalid file type. Allowed types: jpeg, png, gif, webp, svg"
        );
    }

    #[tokio::test]
    async fn test_rejects_oversized_file() {
        let storage = Arc::new(MemoryObjectStorage::new());
        let err = service(storage)
            .upload_image(Bytes::from(vec![0u8; 17]), "image/gif", "product")
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::TooLarge { max_bytes: 16 }));
    }

    #[tokio::test]
    async fn test_rejects_path_like_upload_type() {
        let storage = Arc::new(MemoryObjectStorage::new());
        let upload = service(storage);
        let err = upload
            .upload_image(Bytes::from_static(b"x"), "image/png", "../secrets")
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::InvalidUploadType));

        let err = upload
            .upload_image(Bytes::from_static(b"x"), "image/png", "")
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::MissingType));
    }
}
