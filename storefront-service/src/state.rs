//! Application state management

use std::sync::Arc;

use crate::{
    config::Config,
    error::{Error, Result},
    middleware::IdentityVerifier,
    orders::OrderService,
    repository::{CollectionRepository, Resource},
    store::DocumentStore,
    upload::{ObjectStorage, UploadService},
};

/// Application state shared across handlers
///
/// Holds only shared handles, so cloning per request is cheap.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    store: Arc<dyn DocumentStore>,
    verifier: Arc<dyn IdentityVerifier>,
    orders: OrderService,
    uploads: UploadService,
}

impl AppState {
    /// Create a new builder for AppState
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::new()
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> Arc<dyn DocumentStore> {
        Arc::clone(&self.store)
    }

    pub fn verifier(&self) -> Arc<dyn IdentityVerifier> {
        Arc::clone(&self.verifier)
    }

    pub fn orders(&self) -> &OrderService {
        &self.orders
    }

    pub fn uploads(&self) -> &UploadService {
        &self.uploads
    }

    /// Repository over one catalog collection
    pub fn collection<E: Resource>(&self) -> CollectionRepository<E> {
        CollectionRepository::new(self.store())
    }
}

/// Builder for AppState
#[derive(Default)]
pub struct AppStateBuilder {
    config: Option<Config>,
    store: Option<Arc<dyn DocumentStore>>,
    storage: Option<Arc<dyn ObjectStorage>>,
    verifier: Option<Arc<dyn IdentityVerifier>>,
}

impl AppStateBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the configuration
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    pub fn store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn object_storage(mut self, storage: Arc<dyn ObjectStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn verifier(mut self, verifier: Arc<dyn IdentityVerifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    /// Build the AppState
    pub fn build(self) -> Result<AppState> {
        let config = self.config.unwrap_or_default();
        let store = self.store.ok_or_else(|| missing("document store"))?;
        let storage = self.storage.ok_or_else(|| missing("object storage"))?;
        let verifier = self.verifier.ok_or_else(|| missing("identity verifier"))?;

        let uploads = UploadService::new(
            storage,
            config.storage.resized_suffix.clone(),
            config.upload.max_file_bytes(),
        );

        Ok(AppState {
            orders: OrderService::new(Arc::clone(&store)),
            uploads,
            store,
            verifier,
            config: Arc::new(config),
        })
    }
}

fn missing(component: &str) -> Error {
    Error::Internal(format!("AppState built without a {component}"))
}
