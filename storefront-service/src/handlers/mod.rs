//! HTTP handlers for the storefront and admin APIs
//!
//! Catalog handlers are generic over [`Resource`](crate::repository::Resource) and
//! instantiated once per collection in [`routes`](crate::routes).

pub mod catalog;
pub mod extract;
pub mod orders;
pub mod session;
pub mod upload;

pub use extract::ApiJson;
