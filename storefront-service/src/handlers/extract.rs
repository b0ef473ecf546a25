//! Request extractors that answer in the response envelope

use axum::extract::FromRequest;

use crate::error::Error;

/// JSON body extractor whose rejection is an [`Error::BadRequest`]
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct ApiJson<T>(pub T);
