//! # storefront-service
//!
//! HTTP backend for a small online shop: a public storefront API and an admin API
//! guarded by identity tokens.
//!
//! ## Features
//!
//! - **Catalog**: products, categories, coupons, banners and advertisements with
//!   generic admin CRUD and reduced public projections
//! - **Orders**: shopper checkout, lookup by name or email, and admin flag updates
//!   whose first transition stamps `paid_at` / `picked_at` / `disabled_at`
//! - **Uploads**: image upload to public object storage
//! - **Middleware stack**: identity verification, request tracking, panic recovery,
//!   body size limits, CORS, compression
//! - **Storage**: pluggable document store (in-memory, or SurrealDB with the
//!   `surrealdb` feature)
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use storefront_service::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!
//!     let verifier = JwtIdentityVerifier::from_config(&config, reqwest::Client::new())?;
//!     let state = AppState::builder()
//!         .config(config.clone())
//!         .store(Arc::new(MemoryDocumentStore::new()))
//!         .object_storage(Arc::new(MemoryObjectStorage::new()))
//!         .verifier(Arc::new(verifier))
//!         .build()?;
//!
//!     Server::new(config).serve(build_router(state)).await
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod handlers;
pub mod health;
pub mod middleware;
pub mod observability;
pub mod orders;
pub mod pagination;
pub mod repository;
pub mod responses;
pub mod routes;
pub mod search;
pub mod server;
pub mod state;
pub mod store;
pub mod upload;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::catalog::{
        Advertise, AdvertiseView, Banner, BannerView, Category, CategoryView, Coupon, Product,
        ProductView,
    };
    pub use crate::config::{Config, StorageBackend, StoreBackend};
    pub use crate::error::{Error, Result};
    pub use crate::health::{health, readiness};
    pub use crate::middleware::{
        require_identity, Claims, IdentityVerifier, JwtIdentityVerifier, SENSITIVE_HEADERS,
    };
    pub use crate::observability::init_tracing;
    pub use crate::orders::{NewOrder, Order, OrderFlag, OrderPatch, OrderService};
    pub use crate::pagination::{ListQuery, PaginationMeta};
    pub use crate::repository::{
        CollectionRepository, Page, Repository, RepositoryError, RepositoryResult, Resource,
    };
    pub use crate::responses::{Created, Envelope};
    pub use crate::routes::build_router;
    pub use crate::server::Server;
    pub use crate::state::{AppState, AppStateBuilder};
    pub use crate::store::{DocumentStore, MemoryDocumentStore};
    pub use crate::upload::{
        GcsObjectStorage, MemoryObjectStorage, ObjectStorage, TokenSource, UploadService,
    };

    #[cfg(feature = "surrealdb")]
    pub use crate::store::SurrealDocumentStore;

    pub use axum::{
        extract::{Path, Query, State},
        routing::{delete, get, post, put},
        Router,
    };
}
