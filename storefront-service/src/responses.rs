//! Response envelope shared by every endpoint
//!
//! Every body has the shape `{data?, pagination?, message, code}`. Successful
//! responses carry `message: "success"` and `code: 0`; errors carry the HTTP
//! status as `code`.
//!
//! ```rust,ignore
//! use storefront_service::responses::{Created, Envelope};
//!
//! async fn create_banner() -> Created<Banner> {
//!     Created::new(banner)
//! }
//!
//! async fn list_banners() -> Envelope<Vec<BannerView>> {
//!     Envelope::success(views)
//! }
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::pagination::PaginationMeta;
use crate::repository::Page;

/// Message of every successful response
pub const SUCCESS_MESSAGE: &str = "success";

/// JSON body of every response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationMeta>,

    pub message: String,

    pub code: u16,
}

impl<T> Envelope<T> {
    /// Single item or unpaginated list
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            pagination: None,
            message: SUCCESS_MESSAGE.to_string(),
            code: 0,
        }
    }

    /// Success without a payload, e.g. after a delete
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            data: None,
            pagination: None,
            message: message.into(),
            code: 0,
        }
    }

    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            data: None,
            pagination: None,
            message: message.into(),
            code: status.as_u16(),
        }
    }
}

impl<T> Envelope<Vec<T>> {
    /// One page of a list with its pagination block
    pub fn paged(page: Page<T>) -> Self {
        Self {
            pagination: Some(page.window.meta()),
            data: Some(page.items),
            message: SUCCESS_MESSAGE.to_string(),
            code: 0,
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// HTTP 201 Created with the enveloped resource
#[derive(Debug)]
pub struct Created<T> {
    data: T,
}

impl<T> Created<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> Response {
        (StatusCode::CREATED, Json(Envelope::success(self.data))).into_response()
    }
}
