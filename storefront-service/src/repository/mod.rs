//! Repositories over the document store
//!
//! - [`Repository`]: CRUD contract for one entity kind
//! - [`Resource`] / [`ClientView`]: what an entity kind must describe about itself
//! - [`CollectionRepository`]: the store-backed implementation shared by the catalog
//! - [`RepositoryError`]: structured failures with operation and entity context

mod collection;
mod error;
mod traits;

pub use collection::CollectionRepository;
pub(crate) use collection::{decode, encode};
pub use error::{RepositoryError, RepositoryErrorKind, RepositoryOperation};
pub use traits::{ClientView, Page, Repository, RepositoryResult, Resource};
