//! Repository trait definitions
//!
//! [`Repository`] uses RPITIT (Return Position Impl Trait In Traits) so that
//! implementations can be plain `async fn`s while the returned futures stay `Send`.
//! [`Resource`] describes an entity kind that lives in its own collection.

use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;

use super::error::RepositoryError;
use crate::pagination::{ListQuery, PageWindow};
use crate::search::Searchable;

pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

/// An entity kind persisted in its own collection
pub trait Resource:
    Serialize + DeserializeOwned + Searchable + Clone + Send + Sync + 'static
{
    /// Collection holding the documents of this kind
    const COLLECTION: &'static str;

    /// Name used in messages, e.g. `"Product"` in `"Product not found"`
    const KIND: &'static str;

    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);

    /// Whether non-admin callers may see this entity
    fn is_enabled(&self) -> bool;
}

/// Resources with a reduced public projection
pub trait ClientView: Resource {
    /// Public shape of the resource, without the `is_enabled` flag
    type View: Serialize + From<Self> + Send;
}

/// One page of a filtered listing
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Items inside the page window
    pub items: Vec<T>,
    /// Window and totals computed over the post-filter collection
    pub window: PageWindow,
}

impl<T> Page<T> {
    /// Convert every item, keeping the window
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            window: self.window,
        }
    }
}

/// CRUD over one entity kind
pub trait Repository<Entity>: Send + Sync {
    /// Persist a new entity under a freshly generated id
    ///
    /// Any id already present on `entity` is replaced.
    fn create(&self, entity: Entity) -> impl Future<Output = RepositoryResult<Entity>> + Send;

    /// Search, then paginate
    fn list(&self, query: &ListQuery) -> impl Future<Output = RepositoryResult<Page<Entity>>> + Send;

    /// Fetch by id, failing with NotFound when absent
    fn get(&self, id: &str) -> impl Future<Output = RepositoryResult<Entity>> + Send;

    /// Fully overwrite an existing entity, keeping its id
    fn replace(
        &self,
        id: &str,
        entity: Entity,
    ) -> impl Future<Output = RepositoryResult<Entity>> + Send;

    /// Remove an existing entity, failing with NotFound when absent
    fn delete(&self, id: &str) -> impl Future<Output = RepositoryResult<()>> + Send;
}
