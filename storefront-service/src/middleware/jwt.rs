//! Identity token verification and the admin guard

use async_trait::async_trait;
use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, decode_header, jwk::JwkSet, Algorithm, DecodingKey, Validation};
use moka::future::Cache;
use std::{
    collections::HashMap,
    fs,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::Mutex;

use super::token::{extract_token, Claims};
use crate::{config::Config, error::Error};

/// Upper bound on cached JWKS keys; providers publish a handful at a time
const JWKS_CACHE_CAPACITY: u64 = 64;

/// Verifies identity tokens issued by the identity provider
#[async_trait]
pub trait IdentityVerifier: Send + Sync + 'static {
    /// Verify signature, expiry, issuer and audience, returning the claims
    async fn verify(&self, token: &str) -> Result<Claims, Error>;
}

enum KeySource {
    /// One key loaded at startup
    Fixed(Arc<DecodingKey>),
    /// Keys published at a JWKS endpoint
    Jwks(JwksKeys),
}

/// JWKS keys cached by key id
///
/// A miss refetches the key set at most once per `min_refresh_interval`.
/// Concurrent misses queue on `last_refresh` and re-check the cache after
/// the first one has refreshed it.
struct JwksKeys {
    url: String,
    http: reqwest::Client,
    cache: Cache<String, Arc<DecodingKey>>,
    last_refresh: Mutex<Option<Instant>>,
    min_refresh_interval: Duration,
}

impl JwksKeys {
    fn new(
        url: String,
        http: reqwest::Client,
        ttl: Duration,
        min_refresh_interval: Duration,
    ) -> Self {
        Self {
            url,
            http,
            cache: Cache::builder()
                .time_to_live(ttl)
                .max_capacity(JWKS_CACHE_CAPACITY)
                .build(),
            last_refresh: Mutex::new(None),
            min_refresh_interval,
        }
    }

    async fn key(&self, kid: &str) -> Result<Arc<DecodingKey>, Error> {
        if let Some(key) = self.cache.get(kid).await {
            return Ok(key);
        }

        let mut last_refresh = self.last_refresh.lock().await;
        if let Some(key) = self.cache.get(kid).await {
            return Ok(key);
        }
        if last_refresh.is_some_and(|at| at.elapsed() < self.min_refresh_interval) {
            tracing::debug!(kid = %kid, "Unknown identity key id, refresh suppressed");
            return Err(invalid_token());
        }

        // Failed fetches count against the interval too
        *last_refresh = Some(Instant::now());
        let fresh = fetch_jwks(&self.http, &self.url).await?;

        // Keys dropped from the set age out with the TTL
        let found = fresh.get(kid).cloned();
        for (id, key) in fresh {
            self.cache.insert(id, key).await;
        }
        found.ok_or_else(invalid_token)
    }
}

/// JWT verifier backed by a key file or a JWKS endpoint
pub struct JwtIdentityVerifier {
    keys: KeySource,
    validation: Validation,
}

impl JwtIdentityVerifier {
    /// Build the verifier described by the `auth` configuration
    ///
    /// A `public_key_path` wins over `jwks_url`.
    pub fn from_config(config: &Config, http: reqwest::Client) -> Result<Self, Error> {
        let algorithm = parse_algorithm(&config.auth.algorithm)?;
        let validation = validation(
            algorithm,
            Some(config.token_issuer()),
            Some(config.token_audience()),
        );

        let keys = if let Some(path) = &config.auth.public_key_path {
            let key = fs::read(path).map_err(|e| {
                config_error(format!(
                    "Failed to read identity key from path '{}': {}",
                    path.display(),
                    e
                ))
            })?;
            KeySource::Fixed(Arc::new(decoding_key(algorithm, &key)?))
        } else if let Some(url) = &config.auth.jwks_url {
            KeySource::Jwks(JwksKeys::new(
                url.clone(),
                http,
                Duration::from_secs(config.auth.jwks_cache_ttl_secs),
                Duration::from_secs(config.auth.jwks_min_refresh_secs),
            ))
        } else {
            return Err(config_error(
                "auth needs either public_key_path or jwks_url".to_string(),
            ));
        };

        Ok(Self { keys, validation })
    }

    /// HS256 verifier with a shared secret
    pub fn from_secret(secret: &[u8], issuer: Option<String>, audience: Option<String>) -> Self {
        Self {
            keys: KeySource::Fixed(Arc::new(DecodingKey::from_secret(secret))),
            validation: validation(Algorithm::HS256, issuer, audience),
        }
    }

    async fn key_for(&self, kid: Option<&str>) -> Result<Arc<DecodingKey>, Error> {
        match &self.keys {
            KeySource::Fixed(key) => Ok(Arc::clone(key)),
            KeySource::Jwks(jwks) => jwks.key(kid.ok_or_else(invalid_token)?).await,
        }
    }
}

#[async_trait]
impl IdentityVerifier for JwtIdentityVerifier {
    async fn verify(&self, token: &str) -> Result<Claims, Error> {
        let header = decode_header(token)?;
        let key = self.key_for(header.kid.as_deref()).await?;
        let token_data = decode::<Claims>(token, &key, &self.validation)?;
        Ok(token_data.claims)
    }
}

/// Middleware guarding the admin API
///
/// Rejects the request with 401 unless `X-Auth-Token: Bearer <token>` carries a
/// valid identity token; on success the [`Claims`] are added to the request extensions.
pub async fn require_identity(
    State(verifier): State<Arc<dyn IdentityVerifier>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, Error> {
    let token = extract_token(request.headers())?;
    let claims = verifier.verify(&token).await.map_err(|e| match e {
        Error::Upstream(_) => e,
        _ => invalid_token(),
    })?;

    tracing::debug!(subject = %claims.sub, "Verified identity token");
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

fn invalid_token() -> Error {
    Error::Unauthorized("Invalid identity token".to_string())
}

fn config_error(message: String) -> Error {
    Error::Config(Box::new(figment::Error::from(message)))
}

fn parse_algorithm(name: &str) -> Result<Algorithm, Error> {
    match name.to_uppercase().as_str() {
        "RS256" => Ok(Algorithm::RS256),
        "RS384" => Ok(Algorithm::RS384),
        "RS512" => Ok(Algorithm::RS512),
        "ES256" => Ok(Algorithm::ES256),
        "ES384" => Ok(Algorithm::ES384),
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        alg => Err(config_error(format!("Unsupported JWT algorithm: {}", alg))),
    }
}

fn decoding_key(algorithm: Algorithm, key: &[u8]) -> Result<DecodingKey, Error> {
    let parsed = match algorithm {
        Algorithm::RS256 | Algorithm::RS384 | Algorithm::RS512 => DecodingKey::from_rsa_pem(key),
        Algorithm::ES256 | Algorithm::ES384 => DecodingKey::from_ec_pem(key),
        _ => Ok(DecodingKey::from_secret(key)),
    };
    parsed.map_err(|e| config_error(format!("Invalid identity key: {}", e)))
}

fn validation(algorithm: Algorithm, issuer: Option<String>, audience: Option<String>) -> Validation {
    let mut validation = Validation::new(algorithm);
    if let Some(issuer) = issuer {
        validation.set_issuer(&[issuer]);
    }
    match audience {
        Some(audience) => validation.set_audience(&[audience]),
        None => validation.validate_aud = false,
    }
    validation
}

async fn fetch_jwks(
    http: &reqwest::Client,
    url: &str,
) -> Result<HashMap<String, Arc<DecodingKey>>, Error> {
    let set: JwkSet = http
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| Error::Upstream(format!("Failed to fetch identity keys: {}", e)))?
        .json()
        .await
        .map_err(|e| Error::Upstream(format!("Invalid identity key set: {}", e)))?;

    let mut keys = HashMap::new();
    for jwk in &set.keys {
        let Some(kid) = jwk.common.key_id.clone() else {
            continue;
        };
        match DecodingKey::from_jwk(jwk) {
            Ok(key) => {
                keys.insert(kid, Arc::new(key));
            }
            Err(e) => tracing::warn!(kid = %kid, "Skipping unusable identity key: {}", e),
        }
    }

    tracing::info!(count = keys.len(), "Refreshed identity keys");
    Ok(keys)
}
