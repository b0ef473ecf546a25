use anyhow::Context;
use std::sync::Arc;

use storefront_service::{
    config::{Config, StorageBackend, StoreBackend},
    middleware::JwtIdentityVerifier,
    observability::init_tracing,
    routes::build_router,
    server::Server,
    state::AppState,
    store::{DocumentStore, MemoryDocumentStore},
    upload::{GcsObjectStorage, MemoryObjectStorage, ObjectStorage, TokenSource},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;
    init_tracing(&config)?;

    let http = reqwest::Client::new();

    let store = build_store(&config).await?;
    let storage = build_object_storage(&config, http.clone());
    let verifier = JwtIdentityVerifier::from_config(&config, http)
        .context("failed to configure identity verification")?;

    let state = AppState::builder()
        .config(config.clone())
        .store(store)
        .object_storage(storage)
        .verifier(Arc::new(verifier))
        .build()?;

    Server::new(config).serve(build_router(state)).await?;

    Ok(())
}

async fn build_store(config: &Config) -> anyhow::Result<Arc<dyn DocumentStore>> {
    match config.store.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory document store; data is lost on restart");
            Ok(Arc::new(MemoryDocumentStore::new()))
        }
        #[cfg(feature = "surrealdb")]
        StoreBackend::Surrealdb => {
            let (namespace, database) = config.store_location();
            let store = storefront_service::store::SurrealDocumentStore::connect(
                &config.store,
                &namespace,
                &database,
            )
            .await
            .context("failed to connect to SurrealDB")?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "surrealdb"))]
        StoreBackend::Surrealdb => {
            anyhow::bail!("store.backend = \"surrealdb\" requires the `surrealdb` feature")
        }
    }
}

fn build_object_storage(config: &Config, http: reqwest::Client) -> Arc<dyn ObjectStorage> {
    match config.storage.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory object storage; uploads are not publicly served");
            Arc::new(MemoryObjectStorage::new())
        }
        StorageBackend::Gcs => {
            let token = match &config.storage.access_token {
                Some(token) => TokenSource::Static(token.clone()),
                None => TokenSource::Metadata,
            };
            Arc::new(GcsObjectStorage::new(
                http,
                config.storage_bucket(),
                config.storage.upload_base_url.clone(),
                config.storage.public_base_url.clone(),
                token,
            ))
        }
    }
}
