//! Configuration management using Figment
//!
//! Configuration is loaded from multiple sources with the following precedence (highest to lowest):
//! 1. Environment variables (prefix: STOREFRONT_, nested keys split on `__`)
//! 2. Deployment variables: GOOGLE_CLOUD_PROJECT, FIRESTORE_DATABASE_ID, STORAGE_BUCKET, PORT
//! 3. Current working directory: ./config.toml
//! 4. XDG config directory: ~/.config/storefront-service/config.toml
//! 5. System directory: /etc/storefront-service/config.toml
//! 6. Default values

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

const APP_NAME: &str = "storefront-service";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Service configuration
    pub service: ServiceConfig,

    /// Cloud project the shop runs in
    #[serde(default)]
    pub project: ProjectConfig,

    /// Document store backend
    #[serde(default)]
    pub store: StoreConfig,

    /// Object storage for uploads
    #[serde(default)]
    pub storage: StorageConfig,

    /// Identity token verification for the admin API
    #[serde(default)]
    pub auth: AuthConfig,

    /// Cross-origin callers
    #[serde(default)]
    pub cors: CorsConfig,

    /// Upload limits
    #[serde(default)]
    pub upload: UploadConfig,

    /// Middleware configuration
    #[serde(default)]
    pub middleware: MiddlewareConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name
    pub name: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error) or a full filter directive
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Cloud project identifier; required
    #[serde(default)]
    pub project_id: String,

    /// Database within the project
    #[serde(default = "default_database_id")]
    pub database_id: String,
}

/// Which document store to use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process memory; data is lost on restart
    #[default]
    Memory,
    /// SurrealDB (requires the `surrealdb` feature)
    Surrealdb,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    /// Connection URL (ws://, http://, mem://)
    #[serde(default = "default_store_url")]
    pub url: String,

    /// Namespace; defaults to the project id
    #[serde(default)]
    pub namespace: Option<String>,

    /// Database; defaults to the project's database id
    #[serde(default)]
    pub database: Option<String>,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    /// Connection attempts after the first one
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay between connection attempts, doubled each retry
    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            url: default_store_url(),
            namespace: None,
            database: None,
            username: None,
            password: None,
            max_retries: default_max_retries(),
            retry_delay_secs: default_retry_delay(),
        }
    }
}

/// Which object storage to use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process memory; for local development
    #[default]
    Memory,
    /// Google Cloud Storage
    Gcs,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Bucket name; defaults to `{project_id}.appspot.com`
    #[serde(default)]
    pub bucket: Option<String>,

    /// Static OAuth token; the metadata server is used when absent
    #[serde(default)]
    pub access_token: Option<String>,

    #[serde(default = "default_upload_base_url")]
    pub upload_base_url: String,

    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,

    /// Suffix the resize extension appends to rendition names
    #[serde(default = "default_resized_suffix")]
    pub resized_suffix: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            bucket: None,
            access_token: None,
            upload_base_url: default_upload_base_url(),
            public_base_url: default_public_base_url(),
            resized_suffix: default_resized_suffix(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// JWKS endpoint publishing the token signing keys
    #[serde(default = "default_jwks_url")]
    pub jwks_url: Option<String>,

    /// Local key file (PEM for RS/ES algorithms, raw secret for HS); wins over `jwks_url`
    #[serde(default)]
    pub public_key_path: Option<PathBuf>,

    /// JWT algorithm (RS256, ES256, HS256, ...)
    #[serde(default = "default_jwt_algorithm")]
    pub algorithm: String,

    /// Expected issuer; defaults to `https://securetoken.google.com/{project_id}`
    #[serde(default)]
    pub issuer: Option<String>,

    /// Expected audience; defaults to the project id
    #[serde(default)]
    pub audience: Option<String>,

    /// How long fetched JWKS keys stay cached
    #[serde(default = "default_jwks_cache_ttl")]
    pub jwks_cache_ttl_secs: u64,

    /// Minimum gap between JWKS refetches triggered by unknown key ids
    #[serde(default = "default_jwks_refresh_interval")]
    pub jwks_min_refresh_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwks_url: default_jwks_url(),
            public_key_path: None,
            algorithm: default_jwt_algorithm(),
            issuer: None,
            audience: None,
            jwks_cache_ttl_secs: default_jwks_cache_ttl(),
            jwks_min_refresh_secs: default_jwks_refresh_interval(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Origins allowed to call the API; `*` mirrors any origin
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Largest accepted image in MB
    #[serde(default = "default_max_file_mb")]
    pub max_file_mb: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_mb: default_max_file_mb(),
        }
    }
}

impl UploadConfig {
    pub fn max_file_bytes(&self) -> usize {
        self.max_file_mb * 1024 * 1024
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MiddlewareConfig {
    /// Request body size limit in MB
    #[serde(default = "default_body_limit_mb")]
    pub body_limit_mb: usize,

    /// Enable compression
    #[serde(default = "default_true")]
    pub compression: bool,
}

impl Default for MiddlewareConfig {
    fn default() -> Self {
        Self {
            body_limit_mb: default_body_limit_mb(),
            compression: true,
        }
    }
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_database_id() -> String {
    "(default)".to_string()
}

fn default_store_url() -> String {
    "mem://".to_string()
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    2
}

fn default_upload_base_url() -> String {
    "https://storage.googleapis.com/upload/storage/v1".to_string()
}

fn default_public_base_url() -> String {
    "https://storage.googleapis.com".to_string()
}

fn default_resized_suffix() -> String {
    "_200x200".to_string()
}

fn default_jwks_url() -> Option<String> {
    Some(
        "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com"
            .to_string(),
    )
}

fn default_jwt_algorithm() -> String {
    "RS256".to_string()
}

fn default_jwks_cache_ttl() -> u64 {
    3600
}

fn default_jwks_refresh_interval() -> u64 {
    60
}

fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:5173".to_string()]
}

fn default_max_file_mb() -> usize {
    10
}

fn default_body_limit_mb() -> usize {
    10
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from all sources
    pub fn load() -> Result<Self> {
        let config_paths = Self::find_config_paths();

        tracing::debug!("Searching for config files in order:");
        for path in &config_paths {
            tracing::debug!("  - {}", path.display());
        }

        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        // Lowest priority first so higher priority files override
        for path in config_paths.iter().rev() {
            if path.exists() {
                tracing::info!("Loading configuration from: {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
        }

        Self::extract(figment.merge(Self::deployment_env()).merge(Self::prefixed_env()))
    }

    /// Load configuration from a specific file, still honoring environment overrides
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Self::deployment_env())
            .merge(Self::prefixed_env());

        Self::extract(figment)
    }

    fn extract(figment: Figment) -> Result<Self> {
        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Variables the service has always been deployed with
    fn deployment_env() -> Env {
        Env::raw()
            .only(&[
                "GOOGLE_CLOUD_PROJECT",
                "FIRESTORE_DATABASE_ID",
                "STORAGE_BUCKET",
                "PORT",
            ])
            .map(|key| match key.as_str() {
                "GOOGLE_CLOUD_PROJECT" => "project.project_id".into(),
                "FIRESTORE_DATABASE_ID" => "project.database_id".into(),
                "STORAGE_BUCKET" => "storage.bucket".into(),
                "PORT" => "service.port".into(),
                _ => key.into(),
            })
    }

    fn prefixed_env() -> Env {
        Env::prefixed("STOREFRONT_").split("__")
    }

    /// Paths in priority order (highest first)
    fn find_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        let xdg_dirs = xdg::BaseDirectories::with_prefix(APP_NAME);
        if let Ok(path) = xdg_dirs.place_config_file("config.toml") {
            paths.push(path);
        }

        paths.push(PathBuf::from("/etc").join(APP_NAME).join("config.toml"));
        paths
    }

    /// Reject configurations the service cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.project.project_id.trim().is_empty() {
            return Err(Error::Config(Box::new(figment::Error::from(
                "project.project_id is required (set GOOGLE_CLOUD_PROJECT or STOREFRONT_PROJECT__PROJECT_ID)"
                    .to_string(),
            ))));
        }
        if self.auth.public_key_path.is_none() && self.auth.jwks_url.is_none() {
            return Err(Error::Config(Box::new(figment::Error::from(
                "auth needs either public_key_path or jwks_url".to_string(),
            ))));
        }
        Ok(())
    }

    /// Bucket uploads go to
    pub fn storage_bucket(&self) -> String {
        self.storage
            .bucket
            .clone()
            .filter(|bucket| !bucket.is_empty())
            .unwrap_or_else(|| format!("{}.appspot.com", self.project.project_id))
    }

    /// Issuer identity tokens must carry
    pub fn token_issuer(&self) -> String {
        self.auth
            .issuer
            .clone()
            .unwrap_or_else(|| format!("https://securetoken.google.com/{}", self.project.project_id))
    }

    /// Audience identity tokens must carry
    pub fn token_audience(&self) -> String {
        self.auth
            .audience
            .clone()
            .unwrap_or_else(|| self.project.project_id.clone())
    }

    /// SurrealDB namespace and database
    pub fn store_location(&self) -> (String, String) {
        (
            self.store
                .namespace
                .clone()
                .unwrap_or_else(|| self.project.project_id.clone()),
            self.store
                .database
                .clone()
                .unwrap_or_else(|| self.project.database_id.clone()),
        )
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.service.timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                name: APP_NAME.to_string(),
                port: default_port(),
                log_level: default_log_level(),
                timeout_secs: default_timeout(),
            },
            project: ProjectConfig {
                project_id: String::new(),
                database_id: default_database_id(),
            },
            store: StoreConfig::default(),
            storage: StorageConfig::default(),
            auth: AuthConfig::default(),
            cors: CorsConfig::default(),
            upload: UploadConfig::default(),
            middleware: MiddlewareConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service.port, 8080);
        assert_eq!(config.service.log_level, "info");
        assert_eq!(config.upload.max_file_bytes(), 10 * 1024 * 1024);
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.auth.jwks_cache_ttl_secs, 3600);
        assert_eq!(config.auth.jwks_min_refresh_secs, 60);
        assert!(config.validate().is_err(), "project id is required");
    }

    #[test]
    fn test_derived_defaults_follow_project() {
        let mut config = Config::default();
        config.project.project_id = "suto-shop".to_string();

        assert_eq!(config.storage_bucket(), "suto-shop.appspot.com");
        assert_eq!(
            config.token_issuer(),
            "https://securetoken.google.com/suto-shop"
        );
        assert_eq!(config.token_audience(), "suto-shop");
        assert_eq!(
            config.store_location(),
            ("suto-shop".to_string(), "(default)".to_string())
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[service]
name = "shop-api"
port = 9090

[project]
project_id = "file-project"

[storage]
bucket = "assets"

[cors]
allowed_origins = ["https://shop.example.com"]
"#
        )
        .unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.service.name, "shop-api");
        assert_eq!(config.service.port, 9090);
        assert_eq!(config.storage_bucket(), "assets");
        assert_eq!(config.cors.allowed_origins, vec!["https://shop.example.com"]);
        assert_eq!(config.service.timeout_secs, 30);
    }
}
