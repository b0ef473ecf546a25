//! Error types and HTTP response conversion

use axum::{
    extract::{multipart::MultipartError, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::orders::PatchError;
use crate::repository::{RepositoryError, RepositoryErrorKind};
use crate::responses::Envelope;
use crate::upload::{StorageError, UploadError};

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the service
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Well-formed request the domain refuses
    #[error("Validation error: {0}")]
    Validation(String),

    /// Authentication error
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// A backing service (store, object storage, key server) failed
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::BadRequest(_) | Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Config(_) | Error::Io(_) | Error::Upstream(_) | Error::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message sent to the caller; server-side details stay in the logs
    fn public_message(&self) -> String {
        match self {
            Error::BadRequest(msg)
            | Error::Validation(msg)
            | Error::Unauthorized(msg)
            | Error::NotFound(msg) => msg.clone(),
            Error::Upstream(_) => "Upstream service failed".to_string(),
            Error::Config(_) | Error::Io(_) | Error::Internal(_) => {
                "Internal server error".to_string()
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "{}", self);
        } else {
            tracing::debug!(status = status.as_u16(), "{}", self);
        }

        let body = Envelope::<()>::error(status, self.public_message());
        (status, Json(body)).into_response()
    }
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}

impl From<RepositoryError> for Error {
    fn from(err: RepositoryError) -> Self {
        match err.kind {
            RepositoryErrorKind::NotFound => Error::NotFound(err.message),
            RepositoryErrorKind::ValidationFailed => Error::Validation(err.message),
            RepositoryErrorKind::DatabaseError | RepositoryErrorKind::SerializationError => {
                Error::Upstream(err.to_string())
            }
        }
    }
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        Error::Upstream(err.to_string())
    }
}

impl From<UploadError> for Error {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Storage(e) => e.into(),
            other => Error::BadRequest(other.to_string()),
        }
    }
}

impl From<PatchError> for Error {
    fn from(err: PatchError) -> Self {
        Error::BadRequest(err.to_string())
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("Rejected JSON body: {}", rejection.body_text());
        Error::BadRequest("Invalid request payload".to_string())
    }
}

impl From<MultipartError> for Error {
    fn from(err: MultipartError) -> Self {
        tracing::debug!("Rejected multipart body: {}", err.body_text());
        Error::BadRequest("Failed to parse form: file too large or invalid format".to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for Error {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        tracing::debug!("Identity token rejected: {}", err);
        Error::Unauthorized("Invalid identity token".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::RepositoryOperation;

    #[test]
    fn test_repository_errors_map_to_status() {
        let not_found: Error = RepositoryError::not_found("Product", "p1").into();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        assert_eq!(not_found.public_message(), "Product not found");

        let invalid: Error =
            RepositoryError::validation_failed(RepositoryOperation::Create, "mail is required")
                .into();
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
        assert_eq!(invalid.public_message(), "mail is required");

        let db: Error =
            RepositoryError::database_error(RepositoryOperation::FindAll, "connection reset")
                .into();
        assert_eq!(db.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!db.public_message().contains("connection reset"));
    }

    #[test]
    fn test_upload_errors_map_to_bad_request() {
        let err: Error = UploadError::UnsupportedImage.into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.public_message(),
            "Invalid file type. Allowed types: jpeg, png, gif, webp, svg"
        );

        let err: Error = UploadError::Storage(StorageError::Credentials("no token".into())).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_error_response_envelope() {
        let response = Error::NotFound("Order not found".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "Order not found");
        assert_eq!(json["code"], 404);
        assert!(json.get("data").is_none());
    }
}
