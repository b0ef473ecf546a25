//! Identity token claims and header extraction

use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Header the admin console sends its identity token in
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// Claims of a verified identity token
///
/// Inserted into request extensions by [`require_identity`](super::require_identity).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (the signed-in user's uid)
    pub sub: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Identity provider's copy of the uid
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

/// Extract the bearer token from the `X-Auth-Token` header
pub fn extract_token(headers: &HeaderMap) -> Result<String, Error> {
    let header = headers
        .get(AUTH_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::Unauthorized("X-Auth-Token header required".to_string()))?;

    header
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
        .ok_or_else(|| {
            Error::Unauthorized("Could not find bearer token in X-Auth-Token header".to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTH_TOKEN_HEADER, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_extracts_bearer_token() {
        assert_eq!(extract_token(&headers("Bearer abc.def")).unwrap(), "abc.def");
    }

    #[test]
    fn test_missing_header() {
        let err = extract_token(&HeaderMap::new()).unwrap_err();
        assert!(matches!(err, Error::Unauthorized(msg) if msg == "X-Auth-Token header required"));
    }

    #[test]
    fn test_missing_bearer_prefix() {
        let err = extract_token(&headers("abc.def")).unwrap_err();
        assert!(matches!(
            err,
            Error::Unauthorized(msg) if msg == "Could not find bearer token in X-Auth-Token header"
        ));
    }

    #[test]
    fn test_authorization_header_is_not_used() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer abc"));
        assert!(extract_token(&headers).is_err());
    }
}
